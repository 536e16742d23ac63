use super::output::Output;
use super::report_error::ReportError;
use super::trial_status::TrialStatus;
use serde_json::{Map, Value};
use std::fmt::Display;

pub const TRIAL_INDEX_COLUMN: &str = "trial_index";
pub const STATUS_COLUMN: &str = "status";
pub const FAILURE_PHASE_COLUMN: &str = "failure_phase";
pub const FAILURE_REASON_COLUMN: &str = "failure_reason";
pub const OUTPUT_PREFIX: &str = "output.";

/// One line of the result table. Input and output columns are already flattened to dotted
/// names; output columns are stored without the `output.` prefix used on disk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    pub trial_index: usize,
    pub status: TrialStatus,
    pub input: Map<String, Value>,
    pub output: Map<String, Value>,
    pub failure_phase: Option<String>,
    pub failure_reason: String,
}

impl ResultRow {
    pub fn completed(trial_index: usize, input: Map<String, Value>, output: &Output) -> Self {
        Self {
            trial_index,
            status: TrialStatus::Completed,
            input,
            output: output.columns(),
            failure_phase: None,
            failure_reason: String::new(),
        }
    }

    pub fn failed(
        trial_index: usize,
        input: Map<String, Value>,
        phase: impl Display,
        reason: impl Display,
    ) -> Self {
        Self {
            trial_index,
            status: TrialStatus::Failed,
            input,
            output: Map::new(),
            failure_phase: Some(phase.to_string()),
            failure_reason: reason.to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TrialStatus::Completed
    }

    /// Looks a column up among the input columns first, then among the output columns.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.input.get(column).or_else(|| self.output.get(column))
    }

    pub fn to_columns(&self) -> Map<String, Value> {
        let mut columns = Map::new();
        columns.insert(TRIAL_INDEX_COLUMN.to_owned(), Value::from(self.trial_index));
        columns.insert(STATUS_COLUMN.to_owned(), Value::from(self.status.to_string()));
        for (key, value) in &self.input {
            columns.insert(key.clone(), value.clone());
        }
        for (key, value) in &self.output {
            columns.insert(format!("{OUTPUT_PREFIX}{key}"), value.clone());
        }
        columns.insert(
            FAILURE_PHASE_COLUMN.to_owned(),
            self.failure_phase
                .as_ref()
                .map(|phase| Value::from(phase.as_str()))
                .unwrap_or(Value::Null),
        );
        columns.insert(
            FAILURE_REASON_COLUMN.to_owned(),
            Value::from(self.failure_reason.as_str()),
        );
        columns
    }

    pub fn to_json_line(&self) -> Result<String, ReportError> {
        serde_json::to_string(&Value::Object(self.to_columns()))
            .map_err(|error| ReportError::CannotSerialize(error.to_string()))
    }

    pub fn from_json_line(line_number: usize, line: &str) -> Result<Self, ReportError> {
        let value: Value = serde_json::from_str(line)
            .map_err(|error| ReportError::InvalidRow(line_number, error.to_string()))?;
        let Value::Object(columns) = value else {
            return Err(ReportError::InvalidRow(
                line_number,
                "expected a JSON object".to_owned(),
            ));
        };

        let mut row = ResultRow::default();
        for (key, value) in columns {
            match key.as_str() {
                TRIAL_INDEX_COLUMN => {
                    row.trial_index = value.as_u64().ok_or_else(|| {
                        ReportError::InvalidRow(line_number, "invalid trial index".to_owned())
                    })? as usize;
                }
                STATUS_COLUMN => {
                    row.status = match value.as_str() {
                        Some("completed") => TrialStatus::Completed,
                        Some("failed") => TrialStatus::Failed,
                        _ => {
                            return Err(ReportError::InvalidRow(
                                line_number,
                                format!("invalid status: {value}"),
                            ))
                        }
                    };
                }
                FAILURE_PHASE_COLUMN => row.failure_phase = value.as_str().map(str::to_owned),
                FAILURE_REASON_COLUMN => {
                    row.failure_reason = value.as_str().unwrap_or_default().to_owned()
                }
                _ => match key.strip_prefix(OUTPUT_PREFIX) {
                    Some(output_key) => {
                        row.output.insert(output_key.to_owned(), value);
                    }
                    None => {
                        row.input.insert(key, value);
                    }
                },
            }
        }
        Ok(row)
    }
}

/// Flattens nested JSON objects into a single level map with dotted keys.
/// Arrays and scalars are kept as values.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut columns = Map::new();
    flatten_into("", value, &mut columns);
    columns
}

pub fn flatten_into(prefix: &str, value: &Value, columns: &mut Map<String, Value>) {
    match value {
        Value::Object(fields) => {
            for (key, value) in fields {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&key, value, columns);
            }
        }
        _ => {
            columns.insert(prefix.to_owned(), value.clone());
        }
    }
}
