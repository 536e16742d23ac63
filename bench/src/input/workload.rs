use crate::bench_error::BenchError;
use crate::validatable::Validatable;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const READ_PHASE: &str = "read";
pub const WRITE_PHASE: &str = "write";

/// Workload descriptor handed to client processes. Clients that run a read/write workload
/// label every completion with `read` or `write`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Workload {
    UniformSingleKey {
        num_keys: u32,
        size_mean: u32,
        size_std: u32,
    },
    UniformReadWrite {
        num_keys: u32,
        read_fraction: f64,
        write_size_mean: u32,
        write_size_std: u32,
    },
    PointSkewedReadWrite {
        num_keys: u32,
        read_fraction: f64,
        point_fraction: f64,
        write_size_mean: u32,
        write_size_std: u32,
    },
}

impl Default for Workload {
    fn default() -> Self {
        Workload::UniformSingleKey {
            num_keys: 1,
            size_mean: 16,
            size_std: 0,
        }
    }
}

impl Workload {
    /// Labels of the logical completion streams this workload produces.
    pub fn phase_labels(&self) -> &'static [&'static str] {
        match self {
            Workload::UniformSingleKey { .. } => &[],
            Workload::UniformReadWrite { .. } | Workload::PointSkewedReadWrite { .. } => {
                &[READ_PHASE, WRITE_PHASE]
            }
        }
    }

    pub fn num_keys(&self) -> u32 {
        match self {
            Workload::UniformSingleKey { num_keys, .. }
            | Workload::UniformReadWrite { num_keys, .. }
            | Workload::PointSkewedReadWrite { num_keys, .. } => *num_keys,
        }
    }
}

fn validate_fraction(name: &str, value: f64) -> Result<(), BenchError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BenchError::ConfigurationError(format!(
            "workload {name} must be within [0, 1], got {value}"
        )))
    }
}

impl Validatable<BenchError> for Workload {
    fn validate(&self) -> Result<(), BenchError> {
        if self.num_keys() == 0 {
            return Err(BenchError::ConfigurationError(
                "workload needs at least one key".to_owned(),
            ));
        }
        match self {
            Workload::UniformSingleKey { .. } => Ok(()),
            Workload::UniformReadWrite { read_fraction, .. } => {
                validate_fraction("read_fraction", *read_fraction)
            }
            Workload::PointSkewedReadWrite {
                read_fraction,
                point_fraction,
                ..
            } => {
                validate_fraction("read_fraction", *read_fraction)?;
                validate_fraction("point_fraction", *point_fraction)
            }
        }
    }
}

impl Display for Workload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Workload::UniformSingleKey {
                num_keys,
                size_mean,
                size_std,
            } => write!(
                f,
                "UniformSingleKey(num_keys={num_keys}, size_mean={size_mean}, size_std={size_std})"
            ),
            Workload::UniformReadWrite {
                num_keys,
                read_fraction,
                write_size_mean,
                write_size_std,
            } => write!(
                f,
                "UniformReadWrite(num_keys={num_keys}, read_fraction={read_fraction}, \
                write_size_mean={write_size_mean}, write_size_std={write_size_std})"
            ),
            Workload::PointSkewedReadWrite {
                num_keys,
                read_fraction,
                point_fraction,
                write_size_mean,
                write_size_std,
            } => write!(
                f,
                "PointSkewedReadWrite(num_keys={num_keys}, read_fraction={read_fraction}, \
                point_fraction={point_fraction}, write_size_mean={write_size_mean}, \
                write_size_std={write_size_std})"
            ),
        }
    }
}
