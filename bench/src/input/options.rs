//! Per-role option bundles. The harness never interprets them beyond validation: they are
//! serialized into each role's configuration blob.

use super::role::RoleKind;
use crate::bench_error::BenchError;
use crate::utils::duration::BenchDuration;
use crate::validatable::Validatable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::serde_as;
use serde_with::DisplayFromStr;

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectionOptions {
    #[serde_as(as = "DisplayFromStr")]
    pub ping_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub no_ping_timeout_min: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub no_ping_timeout_max: BenchDuration,
}

impl Default for ElectionOptions {
    fn default() -> Self {
        Self {
            ping_period: BenchDuration::from_secs(60),
            no_ping_timeout_min: BenchDuration::from_secs(120),
            no_ping_timeout_max: BenchDuration::from_secs(240),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThriftySystem {
    #[default]
    NotThrifty,
    Random,
    Closest,
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaderOptions {
    #[serde_as(as = "DisplayFromStr")]
    pub resend_phase1as_period: BenchDuration,
    pub flush_phase2as_every_n: u32,
    pub thrifty_system: ThriftySystem,
    pub election_options: ElectionOptions,
}

impl Default for LeaderOptions {
    fn default() -> Self {
        Self {
            resend_phase1as_period: BenchDuration::from_secs(1),
            flush_phase2as_every_n: 1,
            thrifty_system: ThriftySystem::NotThrifty,
            election_options: ElectionOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProxyLeaderOptions {
    pub flush_phase2as_every_n: u32,
}

impl Default for ProxyLeaderOptions {
    fn default() -> Self {
        Self {
            flush_phase2as_every_n: 1,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AcceptorOptions {
    #[serde_as(as = "DisplayFromStr")]
    pub wait_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub wait_stagger: BenchDuration,
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicaOptions {
    pub log_grow_size: u32,
    pub batch_flush: bool,
    pub unsafe_dont_use_client_table: bool,
    pub send_chosen_watermark_every_n_entries: u32,
    #[serde_as(as = "DisplayFromStr")]
    pub recover_log_entry_min_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub recover_log_entry_max_period: BenchDuration,
    pub unsafe_dont_recover: bool,
}

impl Default for ReplicaOptions {
    fn default() -> Self {
        Self {
            log_grow_size: 5000,
            batch_flush: false,
            unsafe_dont_use_client_table: false,
            send_chosen_watermark_every_n_entries: 100,
            recover_log_entry_min_period: BenchDuration::from_secs(10),
            recover_log_entry_max_period: BenchDuration::from_secs(20),
            unsafe_dont_recover: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProxyReplicaOptions {
    pub flush_every_n: u32,
    pub batch_flush: bool,
}

impl Default for ProxyReplicaOptions {
    fn default() -> Self {
        Self {
            flush_every_n: 1,
            batch_flush: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BatcherOptions {
    pub batch_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadBatcherOptions {
    pub read_batching_scheme: String,
    pub unsafe_read_at_first_slot: bool,
    pub unsafe_read_at_i: bool,
}

impl Default for ReadBatcherOptions {
    fn default() -> Self {
        Self {
            read_batching_scheme: "size,1,10s".to_owned(),
            unsafe_read_at_first_slot: false,
            unsafe_read_at_i: false,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerOptions {
    #[serde_as(as = "DisplayFromStr")]
    pub push_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub recover_period: BenchDuration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            push_period: BenchDuration::from_millis(1),
            recover_period: BenchDuration::from_secs(60),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatorOptions {
    pub num_shard_cuts_per_proposal: u32,
    #[serde_as(as = "DisplayFromStr")]
    pub recover_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub leader_info_period: BenchDuration,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            num_shard_cuts_per_proposal: 2,
            recover_period: BenchDuration::from_secs(60),
            leader_info_period: BenchDuration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DepServiceNodeOptions {
    pub top_k_dependencies: u32,
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    #[serde_as(as = "DisplayFromStr")]
    pub resend_client_request_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub resend_max_slot_requests_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub resend_read_request_period: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub repropose_period: BenchDuration,
    pub unsafe_read_at_first_slot: bool,
    pub unsafe_read_at_i: bool,
    pub flush_writes_every_n: u32,
    pub flush_reads_every_n: u32,
    /// Commands each client sends per request batch.
    pub num_commands_per_batch: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            resend_client_request_period: BenchDuration::from_secs(1),
            resend_max_slot_requests_period: BenchDuration::from_secs(1),
            resend_read_request_period: BenchDuration::from_secs(1),
            repropose_period: BenchDuration::from_millis(50),
            unsafe_read_at_first_slot: false,
            unsafe_read_at_i: false,
            flush_writes_every_n: 1,
            flush_reads_every_n: 1,
            num_commands_per_batch: 1,
        }
    }
}

/// Option bundles of the roles a protocol deploys. Roles without a bundle get `{}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<LeaderOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_leader: Option<ProxyLeaderOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptor: Option<AcceptorOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica: Option<ReplicaOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_replica: Option<ProxyReplicaOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batcher: Option<BatcherOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_batcher: Option<ReadBatcherOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<AggregatorOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dep_service_node: Option<DepServiceNodeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientOptions>,
}

impl RoleOptions {
    pub fn blob_for(&self, role: RoleKind) -> Result<Value, BenchError> {
        let value = match role {
            RoleKind::Leader => serde_json::to_value(self.leader)?,
            RoleKind::ProxyLeader => serde_json::to_value(self.proxy_leader)?,
            RoleKind::Acceptor => serde_json::to_value(self.acceptor)?,
            RoleKind::Replica => serde_json::to_value(self.replica)?,
            RoleKind::ProxyReplica => serde_json::to_value(self.proxy_replica)?,
            RoleKind::Batcher => serde_json::to_value(self.batcher)?,
            RoleKind::ReadBatcher => serde_json::to_value(&self.read_batcher)?,
            RoleKind::Server => serde_json::to_value(self.server)?,
            RoleKind::Aggregator => serde_json::to_value(self.aggregator)?,
            RoleKind::DepServiceNode => serde_json::to_value(self.dep_service_node)?,
            RoleKind::Client => serde_json::to_value(self.client)?,
        };
        Ok(match value {
            Value::Null => Value::Object(Default::default()),
            value => value,
        })
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), BenchError> {
    if condition {
        Ok(())
    } else {
        Err(BenchError::ConfigurationError(message()))
    }
}

impl Validatable<BenchError> for ElectionOptions {
    fn validate(&self) -> Result<(), BenchError> {
        ensure(
            self.no_ping_timeout_min <= self.no_ping_timeout_max,
            || {
                format!(
                    "election no_ping_timeout_min ({}) exceeds no_ping_timeout_max ({})",
                    self.no_ping_timeout_min, self.no_ping_timeout_max
                )
            },
        )
    }
}

impl Validatable<BenchError> for LeaderOptions {
    fn validate(&self) -> Result<(), BenchError> {
        ensure(self.flush_phase2as_every_n >= 1, || {
            "leader flush_phase2as_every_n must be at least 1".to_owned()
        })?;
        self.election_options.validate()
    }
}

impl Validatable<BenchError> for ReplicaOptions {
    fn validate(&self) -> Result<(), BenchError> {
        ensure(self.log_grow_size >= 1, || {
            "replica log_grow_size must be at least 1".to_owned()
        })?;
        ensure(
            self.recover_log_entry_min_period <= self.recover_log_entry_max_period,
            || {
                format!(
                    "replica recover_log_entry_min_period ({}) exceeds recover_log_entry_max_period ({})",
                    self.recover_log_entry_min_period, self.recover_log_entry_max_period
                )
            },
        )
    }
}

impl Validatable<BenchError> for ClientOptions {
    fn validate(&self) -> Result<(), BenchError> {
        ensure(
            self.flush_writes_every_n >= 1 && self.flush_reads_every_n >= 1,
            || "client flush_writes_every_n and flush_reads_every_n must be at least 1".to_owned(),
        )?;
        ensure(self.num_commands_per_batch >= 1, || {
            "client num_commands_per_batch must be at least 1".to_owned()
        })
    }
}

impl Validatable<BenchError> for RoleOptions {
    fn validate(&self) -> Result<(), BenchError> {
        if let Some(leader) = &self.leader {
            leader.validate()?;
        }
        if let Some(proxy_leader) = &self.proxy_leader {
            ensure(proxy_leader.flush_phase2as_every_n >= 1, || {
                "proxy leader flush_phase2as_every_n must be at least 1".to_owned()
            })?;
        }
        if let Some(replica) = &self.replica {
            replica.validate()?;
        }
        if let Some(proxy_replica) = &self.proxy_replica {
            ensure(proxy_replica.flush_every_n >= 1, || {
                "proxy replica flush_every_n must be at least 1".to_owned()
            })?;
        }
        if let Some(read_batcher) = &self.read_batcher {
            ensure(!read_batcher.read_batching_scheme.is_empty(), || {
                "read batcher read_batching_scheme cannot be empty".to_owned()
            })?;
        }
        if let Some(client) = &self.client {
            client.validate()?;
        }
        Ok(())
    }
}
