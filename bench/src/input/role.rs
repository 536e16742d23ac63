use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Function a deployed process performs in the protocol under test. Declaration order is
/// launch order, so clients come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Server,
    Aggregator,
    DepServiceNode,
    Acceptor,
    Leader,
    ProxyLeader,
    Replica,
    ProxyReplica,
    Batcher,
    ReadBatcher,
    Client,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Server => "server",
            RoleKind::Aggregator => "aggregator",
            RoleKind::DepServiceNode => "dep_service_node",
            RoleKind::Acceptor => "acceptor",
            RoleKind::Leader => "leader",
            RoleKind::ProxyLeader => "proxy_leader",
            RoleKind::Replica => "replica",
            RoleKind::ProxyReplica => "proxy_replica",
            RoleKind::Batcher => "batcher",
            RoleKind::ReadBatcher => "read_batcher",
            RoleKind::Client => "client",
        }
    }

    pub fn is_client(&self) -> bool {
        *self == RoleKind::Client
    }
}

impl Display for RoleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One deployed process, e.g. `acceptor_3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleInstance {
    pub kind: RoleKind,
    pub index: u32,
}

impl RoleInstance {
    pub fn new(kind: RoleKind, index: u32) -> Self {
        Self { kind, index }
    }
}

impl Display for RoleInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.kind, self.index)
    }
}

/// Number of processes deployed per role. Roles that are absent have zero instances.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleCounts(BTreeMap<RoleKind, u32>);

impl RoleCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: RoleKind, count: u32) -> Self {
        self.set(kind, count);
        self
    }

    pub fn set(&mut self, kind: RoleKind, count: u32) {
        if count == 0 {
            self.0.remove(&kind);
        } else {
            self.0.insert(kind, count);
        }
    }

    pub fn get(&self, kind: RoleKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn kinds(&self) -> impl Iterator<Item = RoleKind> + '_ {
        self.0.keys().copied()
    }

    /// Every instance in launch order: by role kind, then by index.
    pub fn instances(&self) -> impl Iterator<Item = RoleInstance> + '_ {
        self.0
            .iter()
            .flat_map(|(kind, count)| (0..*count).map(move |index| RoleInstance::new(*kind, index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_should_be_ordered_with_clients_last() {
        let counts = RoleCounts::new()
            .with(RoleKind::Client, 2)
            .with(RoleKind::Leader, 1)
            .with(RoleKind::Acceptor, 2);

        let names: Vec<String> = counts.instances().map(|i| i.to_string()).collect();

        assert_eq!(
            names,
            vec!["acceptor_0", "acceptor_1", "leader_0", "client_0", "client_1"]
        );
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn zero_count_should_remove_role() {
        let counts = RoleCounts::new()
            .with(RoleKind::Batcher, 3)
            .with(RoleKind::Batcher, 0);
        assert_eq!(counts.get(RoleKind::Batcher), 0);
        assert_eq!(counts.kinds().count(), 0);
    }

    #[test]
    fn counts_should_serialize_as_role_map() {
        let counts = RoleCounts::new().with(RoleKind::ProxyLeader, 3);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"proxy_leader":3}"#);
    }
}
