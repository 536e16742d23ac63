use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, Default)]
pub enum TrialStatus {
    #[default]
    #[display("completed")]
    #[serde(rename = "completed")]
    Completed,
    #[display("failed")]
    #[serde(rename = "failed")]
    Failed,
}
