use super::role::{RoleCounts, RoleKind};
use crate::bench_error::BenchError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionScheme {
    #[default]
    Hash,
    Colocated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundSystem {
    #[default]
    ClassicRoundRobin,
    RoundZeroFast,
    MixedRoundRobin,
}

/// Protocol under test together with the deployment shape that is specific to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Protocol {
    /// MultiPaxos, including its compartmentalized form (batchers, proxy leaders, acceptor
    /// groups, proxy replicas). Acceptors are split evenly into `num_acceptor_groups`.
    MultiPaxos {
        num_acceptor_groups: u32,
        flexible: bool,
        distribution_scheme: DistributionScheme,
    },
    FastMultiPaxos {
        round_system: RoundSystem,
    },
    SimpleBPaxos,
    /// Servers are split evenly into `num_shards`.
    Scalog {
        num_shards: u32,
    },
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Protocol::MultiPaxos { .. } => "MultiPaxos",
            Protocol::FastMultiPaxos { .. } => "FastMultiPaxos",
            Protocol::SimpleBPaxos => "SimpleBPaxos",
            Protocol::Scalog { .. } => "Scalog",
        };
        write!(f, "{name}")
    }
}

struct QuorumCheck<'a> {
    protocol: Protocol,
    f: u32,
    roles: &'a RoleCounts,
}

impl QuorumCheck<'_> {
    fn at_least(&self, role: RoleKind, minimum: u32) -> Result<(), BenchError> {
        let count = self.roles.get(role);
        if count < minimum {
            return Err(BenchError::ConfigurationError(format!(
                "{} with f={} needs at least {minimum} {role} instance(s), got {count}",
                self.protocol, self.f
            )));
        }
        Ok(())
    }

    fn exactly(&self, role: RoleKind, expected: u32) -> Result<(), BenchError> {
        let count = self.roles.get(role);
        if count != expected {
            return Err(BenchError::ConfigurationError(format!(
                "{} needs exactly {expected} {role} instance(s), got {count}",
                self.protocol
            )));
        }
        Ok(())
    }

    /// Fails when a role outside `allowed` has instances.
    fn only(&self, allowed: &[RoleKind]) -> Result<(), BenchError> {
        match self.roles.kinds().find(|kind| !allowed.contains(kind)) {
            Some(kind) => Err(BenchError::ConfigurationError(format!(
                "{} does not deploy {kind} instances",
                self.protocol
            ))),
            None => Ok(()),
        }
    }

    /// `count` instances of `role` split into `groups` equal groups of at least `minimum`.
    fn groups(&self, role: RoleKind, groups: u32, minimum: u32) -> Result<(), BenchError> {
        let count = self.roles.get(role);
        if groups == 0 || count % groups != 0 {
            return Err(BenchError::ConfigurationError(format!(
                "{count} {role} instance(s) cannot be split into {groups} equal group(s)"
            )));
        }
        let per_group = count / groups;
        if per_group < minimum {
            return Err(BenchError::ConfigurationError(format!(
                "{} with f={} needs at least {minimum} {role} instance(s) per group, got {per_group}",
                self.protocol, self.f
            )));
        }
        Ok(())
    }
}

impl Protocol {
    /// Rejects deployments that cannot form the quorums the protocol relies on.
    pub fn validate_roles(&self, f: u32, roles: &RoleCounts) -> Result<(), BenchError> {
        if f == 0 {
            return Err(BenchError::ConfigurationError(
                "f must be at least 1".to_owned(),
            ));
        }
        let check = QuorumCheck {
            protocol: *self,
            f,
            roles,
        };
        let majority = 2 * f + 1;
        check.at_least(RoleKind::Client, 1)?;

        match *self {
            Protocol::MultiPaxos {
                num_acceptor_groups,
                flexible,
                ..
            } => {
                check.only(&[
                    RoleKind::Batcher,
                    RoleKind::ReadBatcher,
                    RoleKind::Leader,
                    RoleKind::ProxyLeader,
                    RoleKind::Acceptor,
                    RoleKind::Replica,
                    RoleKind::ProxyReplica,
                    RoleKind::Client,
                ])?;
                check.at_least(RoleKind::Leader, f + 1)?;
                check.at_least(RoleKind::Replica, f + 1)?;
                if flexible {
                    if num_acceptor_groups < f + 1 {
                        return Err(BenchError::ConfigurationError(format!(
                            "flexible MultiPaxos with f={f} needs at least {} acceptor groups, got {num_acceptor_groups}",
                            f + 1
                        )));
                    }
                    check.groups(RoleKind::Acceptor, num_acceptor_groups, f + 1)
                } else {
                    check.groups(RoleKind::Acceptor, num_acceptor_groups, majority)
                }
            }
            Protocol::FastMultiPaxos { .. } => {
                check.only(&[RoleKind::Leader, RoleKind::Acceptor, RoleKind::Client])?;
                check.at_least(RoleKind::Leader, f + 1)?;
                check.at_least(RoleKind::Acceptor, majority)
            }
            Protocol::SimpleBPaxos => {
                check.only(&[
                    RoleKind::Leader,
                    RoleKind::DepServiceNode,
                    RoleKind::Acceptor,
                    RoleKind::Replica,
                    RoleKind::Client,
                ])?;
                check.at_least(RoleKind::Leader, f + 1)?;
                check.at_least(RoleKind::DepServiceNode, majority)?;
                check.at_least(RoleKind::Acceptor, majority)?;
                check.at_least(RoleKind::Replica, f + 1)
            }
            Protocol::Scalog { num_shards } => {
                check.only(&[
                    RoleKind::Server,
                    RoleKind::Aggregator,
                    RoleKind::Leader,
                    RoleKind::Acceptor,
                    RoleKind::Replica,
                    RoleKind::Client,
                ])?;
                check.groups(RoleKind::Server, num_shards, 1)?;
                check.exactly(RoleKind::Aggregator, 1)?;
                check.at_least(RoleKind::Leader, f + 1)?;
                check.at_least(RoleKind::Acceptor, majority)?;
                check.at_least(RoleKind::Replica, f + 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multipaxos(groups: u32, flexible: bool) -> Protocol {
        Protocol::MultiPaxos {
            num_acceptor_groups: groups,
            flexible,
            distribution_scheme: DistributionScheme::Hash,
        }
    }

    fn multipaxos_roles(acceptors: u32) -> RoleCounts {
        RoleCounts::new()
            .with(RoleKind::Leader, 2)
            .with(RoleKind::Acceptor, acceptors)
            .with(RoleKind::Replica, 2)
            .with(RoleKind::Client, 1)
    }

    #[test]
    fn majority_acceptors_should_be_accepted() {
        assert!(multipaxos(1, false)
            .validate_roles(1, &multipaxos_roles(3))
            .is_ok());
    }

    #[test]
    fn too_few_acceptors_should_be_rejected() {
        let result = multipaxos(1, false).validate_roles(1, &multipaxos_roles(2));
        assert!(matches!(result, Err(BenchError::ConfigurationError(_))));
    }

    #[test]
    fn flexible_grid_should_accept_small_groups() {
        assert!(multipaxos(6, true)
            .validate_roles(1, &multipaxos_roles(12))
            .is_ok());
        assert!(multipaxos(6, false)
            .validate_roles(1, &multipaxos_roles(12))
            .is_err());
    }

    #[test]
    fn uneven_groups_should_be_rejected() {
        assert!(multipaxos(2, false)
            .validate_roles(1, &multipaxos_roles(7))
            .is_err());
    }

    #[test]
    fn foreign_roles_should_be_rejected() {
        let roles = multipaxos_roles(3).with(RoleKind::Aggregator, 1);
        assert!(multipaxos(1, false).validate_roles(1, &roles).is_err());
    }

    #[test]
    fn scalog_needs_single_aggregator() {
        let roles = RoleCounts::new()
            .with(RoleKind::Server, 2)
            .with(RoleKind::Aggregator, 2)
            .with(RoleKind::Leader, 2)
            .with(RoleKind::Acceptor, 3)
            .with(RoleKind::Replica, 2)
            .with(RoleKind::Client, 1);
        let protocol = Protocol::Scalog { num_shards: 1 };
        assert!(protocol.validate_roles(1, &roles).is_err());
        let roles = roles.with(RoleKind::Aggregator, 1);
        assert!(protocol.validate_roles(1, &roles).is_ok());
    }

    #[test]
    fn zero_f_should_be_rejected() {
        assert!(multipaxos(1, false)
            .validate_roles(0, &multipaxos_roles(3))
            .is_err());
    }
}
