use crate::bench_error::BenchError;
use crate::configs::bench_config::TopologyConfig;
use crate::input::role::{RoleCounts, RoleInstance};
use crate::input::Input;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Placement strategy requested by an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyKind {
    /// Every instance on one host and one broadcast domain, with distinct ports.
    #[default]
    SingleSwitch,
    /// Instances spread round-robin over the configured hosts. Colocated placements ignore the
    /// per-host slot limit.
    Distributed { colocated: bool },
}

impl Display for TopologyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyKind::SingleSwitch => write!(f, "single_switch"),
            TopologyKind::Distributed { colocated: true } => write!(f, "distributed (colocated)"),
            TopologyKind::Distributed { colocated: false } => write!(f, "distributed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Network address of every role instance of one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    kind: TopologyKind,
    placements: BTreeMap<RoleInstance, Address>,
}

impl Topology {
    /// Places every instance of `input`. `slot` selects the port range, so concurrently
    /// running trials must use distinct slots.
    pub fn build(input: &Input, config: &TopologyConfig, slot: u32) -> Result<Self, BenchError> {
        let base_port = u32::from(config.base_port) + slot * u32::from(config.port_stride);
        let hosts = match input.topology {
            TopologyKind::SingleSwitch => vec![config.host.clone()],
            TopologyKind::Distributed { .. } => config.hosts.clone(),
        };
        if hosts.is_empty() || hosts.iter().any(|host| host.is_empty()) {
            return Err(BenchError::ConfigurationError(format!(
                "{} topology requires a non-empty host list",
                input.topology
            )));
        }

        let total = input.roles.total();
        if let TopologyKind::Distributed { colocated: false } = input.topology {
            let slots_per_host = config.slots_per_host.max(1);
            let available = slots_per_host as usize * hosts.len();
            if (total as usize) > available {
                return Err(BenchError::ConfigurationError(format!(
                    "{total} processes do not fit on {} hosts with {slots_per_host} slots each",
                    hosts.len()
                )));
            }
        }

        let per_host = total.div_ceil(hosts.len() as u32);
        let past_last_port = base_port + per_host > u32::from(u16::MAX) + 1;
        if per_host > u32::from(config.port_stride) || past_last_port {
            return Err(BenchError::ConfigurationError(format!(
                "port range overflow: {per_host} ports per host from base port {base_port} \
                with stride {}",
                config.port_stride
            )));
        }

        let placements = Self::place(&input.roles, &hosts, base_port);
        debug!(
            "Built {} topology with {} instances on {} host(s) from port {base_port}",
            input.topology,
            placements.len(),
            hosts.len()
        );
        Ok(Self {
            kind: input.topology,
            placements,
        })
    }

    fn place(
        roles: &RoleCounts,
        hosts: &[String],
        base_port: u32,
    ) -> BTreeMap<RoleInstance, Address> {
        roles
            .instances()
            .enumerate()
            .map(|(position, instance)| {
                let host = &hosts[position % hosts.len()];
                let port = base_port as usize + position / hosts.len();
                (
                    instance,
                    Address {
                        host: host.clone(),
                        port: port as u16,
                    },
                )
            })
            .collect()
    }

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn address(&self, instance: &RoleInstance) -> Option<&Address> {
        self.placements.get(instance)
    }

    /// Instances in launch order: every non-client role first, then clients.
    pub fn instances(&self) -> impl Iterator<Item = (&RoleInstance, &Address)> {
        self.placements.iter()
    }

    /// Link cost between two instances, or `None` when either is not part of the topology.
    pub fn link_cost(&self, from: &RoleInstance, to: &RoleInstance) -> Option<u32> {
        let from_address = self.placements.get(from)?;
        let to_address = self.placements.get(to)?;
        if from == to {
            return Some(0);
        }
        Some(match self.kind {
            TopologyKind::SingleSwitch => 1,
            TopologyKind::Distributed { .. } if from_address.host == to_address.host => 0,
            TopologyKind::Distributed { .. } => 1,
        })
    }

    /// Addressing handed to role processes: role name to the ordered list of `host:port`,
    /// plus the link cost from every instance to every other one.
    pub fn to_json(&self) -> Value {
        let mut roles: Map<String, Value> = Map::new();
        for (instance, address) in &self.placements {
            let entry = roles
                .entry(instance.kind.as_str())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(addresses) = entry {
                addresses.push(Value::String(address.to_string()));
            }
        }
        let mut link_costs: Map<String, Value> = Map::new();
        for from in self.placements.keys() {
            let costs: Map<String, Value> = self
                .placements
                .keys()
                .filter(|to| *to != from)
                .filter_map(|to| {
                    self.link_cost(from, to)
                        .map(|cost| (to.to_string(), json!(cost)))
                })
                .collect();
            link_costs.insert(from.to_string(), Value::Object(costs));
        }
        json!({
            "kind": self.kind.to_string(),
            "roles": roles,
            "link_costs": link_costs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::role::RoleKind;
    use crate::input::tests::multipaxos_input;

    fn config() -> TopologyConfig {
        TopologyConfig {
            host: "127.0.0.1".to_owned(),
            hosts: vec!["10.0.0.1".to_owned(), "10.0.0.2".to_owned()],
            slots_per_host: 4,
            base_port: 10000,
            port_stride: 100,
        }
    }

    #[test]
    fn single_switch_should_assign_distinct_ports_on_one_host() {
        let input = multipaxos_input();
        let topology = Topology::build(&input, &config(), 0).unwrap();

        assert_eq!(topology.len(), 8);
        let leader = topology.address(&RoleInstance::new(RoleKind::Leader, 0)).unwrap();
        assert_eq!(leader.host, "127.0.0.1");
        let mut ports: Vec<u16> = topology.instances().map(|(_, a)| a.port).collect();
        ports.dedup();
        assert_eq!(ports, (10000..10008).collect::<Vec<u16>>());
        assert_eq!(
            topology.link_cost(
                &RoleInstance::new(RoleKind::Leader, 0),
                &RoleInstance::new(RoleKind::Acceptor, 2)
            ),
            Some(1)
        );
    }

    #[test]
    fn slot_should_shift_port_range() {
        let topology = Topology::build(&multipaxos_input(), &config(), 2).unwrap();
        let first = topology.instances().next().unwrap().1;
        assert_eq!(first.port, 10200);
    }

    #[test]
    fn distributed_should_place_round_robin_with_host_local_cost() {
        let mut input = multipaxos_input();
        input.topology = TopologyKind::Distributed { colocated: false };
        let topology = Topology::build(&input, &config(), 0).unwrap();

        let acceptor_0 = RoleInstance::new(RoleKind::Acceptor, 0);
        let acceptor_1 = RoleInstance::new(RoleKind::Acceptor, 1);
        let acceptor_2 = RoleInstance::new(RoleKind::Acceptor, 2);
        assert_eq!(topology.address(&acceptor_0).unwrap().host, "10.0.0.1");
        assert_eq!(topology.address(&acceptor_1).unwrap().host, "10.0.0.2");
        assert_eq!(topology.link_cost(&acceptor_0, &acceptor_2), Some(0));
        assert_eq!(topology.link_cost(&acceptor_0, &acceptor_1), Some(1));
        assert_eq!(topology.address(&acceptor_2).unwrap().port, 10001);
    }

    #[test]
    fn distributed_should_reject_too_few_slots_unless_colocated() {
        let mut input = multipaxos_input();
        let mut config = config();
        config.slots_per_host = 3;
        input.topology = TopologyKind::Distributed { colocated: false };
        assert!(matches!(
            Topology::build(&input, &config, 0),
            Err(BenchError::ConfigurationError(_))
        ));

        input.topology = TopologyKind::Distributed { colocated: true };
        assert!(Topology::build(&input, &config, 0).is_ok());
    }

    #[test]
    fn empty_host_list_should_be_rejected() {
        let mut input = multipaxos_input();
        input.topology = TopologyKind::Distributed { colocated: true };
        let mut config = config();
        config.hosts.clear();
        assert!(matches!(
            Topology::build(&input, &config, 0),
            Err(BenchError::ConfigurationError(_))
        ));
    }

    #[test]
    fn port_overflow_should_be_rejected() {
        let mut config = config();
        config.base_port = 65530;
        assert!(Topology::build(&multipaxos_input(), &config, 0).is_err());

        let mut config = self::config();
        config.port_stride = 4;
        assert!(Topology::build(&multipaxos_input(), &config, 0).is_err());
    }

    #[test]
    fn json_should_group_addresses_by_role() {
        let topology = Topology::build(&multipaxos_input(), &config(), 0).unwrap();
        let json = topology.to_json();
        assert_eq!(json["kind"], "single_switch");
        assert_eq!(json["roles"]["acceptor"][1], "127.0.0.1:10001");
        assert_eq!(json["roles"]["client"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn json_should_carry_host_local_link_costs() {
        let mut input = multipaxos_input();
        input.topology = TopologyKind::Distributed { colocated: true };
        let topology = Topology::build(&input, &config(), 0).unwrap();
        let json = topology.to_json();

        let acceptor_0 = &json["link_costs"]["acceptor_0"];
        assert_eq!(acceptor_0["acceptor_2"], 0);
        assert_eq!(acceptor_0["acceptor_1"], 1);
        assert!(acceptor_0.get("acceptor_0").is_none());
        assert_eq!(acceptor_0.as_object().unwrap().len(), topology.len() - 1);
    }
}
