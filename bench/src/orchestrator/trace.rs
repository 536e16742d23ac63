use crate::bench_error::BenchError;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// One request recorded by a client: `request_id,issue_time_us,completion_time_us[,label]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    pub request_id: u64,
    pub issue_time_us: u64,
    pub completion_time_us: u64,
    pub label: Option<String>,
}

impl CompletionEvent {
    pub fn latency_us(&self) -> u64 {
        self.completion_time_us - self.issue_time_us
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency_us() as f64 / 1_000.0
    }

    fn parse(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if !(3..=4).contains(&fields.len()) {
            return Err(format!("expected 3 or 4 fields, got {}", fields.len()));
        }
        let number = |index: usize, name: &str| {
            fields[index]
                .parse::<u64>()
                .map_err(|error| format!("invalid {name} '{}': {error}", fields[index]))
        };
        let event = CompletionEvent {
            request_id: number(0, "request_id")?,
            issue_time_us: number(1, "issue_time_us")?,
            completion_time_us: number(2, "completion_time_us")?,
            label: fields
                .get(3)
                .filter(|label| !label.is_empty())
                .map(|label| label.to_string()),
        };
        if event.completion_time_us < event.issue_time_us {
            return Err(format!(
                "completion time {} precedes issue time {}",
                event.completion_time_us, event.issue_time_us
            ));
        }
        Ok(event)
    }
}

/// Completion events of one client process, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTrace {
    pub events: Vec<CompletionEvent>,
}

impl RawTrace {
    pub fn new(events: Vec<CompletionEvent>) -> Self {
        Self { events }
    }

    /// Parses trace text. A malformed final line without a terminating newline is a write cut
    /// short by termination and is dropped; any other malformed line rejects the trace.
    pub fn parse(source: &str, content: &str) -> Result<Self, BenchError> {
        let complete = content.is_empty() || content.ends_with('\n');
        let lines: Vec<&str> = content.lines().collect();
        let mut events = Vec::with_capacity(lines.len());
        for (number, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match CompletionEvent::parse(line) {
                Ok(event) => events.push(event),
                Err(reason) if !complete && number + 1 == lines.len() => {
                    warn!("Dropping truncated last line of {source}: {reason}");
                }
                Err(reason) => {
                    return Err(BenchError::InvalidTrace(format!(
                        "{source}, line {}: {reason}",
                        number + 1
                    )));
                }
            }
        }
        Ok(Self { events })
    }

    /// Reads a client trace file. A client killed before writing anything leaves no file,
    /// which reads as an empty trace.
    pub async fn read(path: &Path) -> Result<Self, BenchError> {
        let source = path.display().to_string();
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                warn!("Trace file {source} does not exist, treating it as empty");
                return Ok(Self::default());
            }
            Err(error) => return Err(error.into()),
        };
        let trace = Self::parse(&source, &content)?;
        debug!("Read {} completion events from {source}", trace.len());
        Ok(trace)
    }

    pub fn merge(traces: impl IntoIterator<Item = RawTrace>) -> Self {
        let mut events: Vec<CompletionEvent> = traces.into_iter().flat_map(|t| t.events).collect();
        events.sort_by_key(|event| event.completion_time_us);
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of one logical stream, or all of them when `label` is `None`.
    pub fn filter_label<'a>(
        &'a self,
        label: Option<&'a str>,
    ) -> impl Iterator<Item = &'a CompletionEvent> + 'a {
        self.events
            .iter()
            .filter(move |event| label.is_none() || event.label.as_deref() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_events_with_and_without_labels() {
        let trace = RawTrace::parse(
            "client_0.trace",
            "# request_id,issue,completion,label\n1,100,1100,read\n\n2,200,2200\n",
        )
        .unwrap();

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.events[0].label.as_deref(), Some("read"));
        assert_eq!(trace.events[1].label, None);
        assert_eq!(trace.events[1].latency_us(), 2000);
        assert_eq!(trace.events[0].latency_ms(), 1.0);
    }

    #[test]
    fn truncated_last_line_should_be_dropped() {
        let trace = RawTrace::parse("client_0.trace", "1,100,1100\n2,200,2200").unwrap();
        assert_eq!(trace.len(), 2);

        let trace = RawTrace::parse("client_0.trace", "1,100,1100\n2,20").unwrap();
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn malformed_complete_line_should_reject_trace() {
        let result = RawTrace::parse("client_0.trace", "1,100,1100\nnot,a,number\n3,300,3300\n");
        assert!(matches!(result, Err(BenchError::InvalidTrace(_))));

        let result = RawTrace::parse("client_0.trace", "1,100,1100\n2,20\n");
        assert!(matches!(result, Err(BenchError::InvalidTrace(_))));
    }

    #[test]
    fn completion_before_issue_should_be_rejected() {
        let result = RawTrace::parse("client_0.trace", "1,500,100\n");
        assert!(matches!(result, Err(BenchError::InvalidTrace(_))));
    }

    #[test]
    fn merge_should_order_by_completion_time() {
        let a = RawTrace::parse("a", "1,0,300\n2,0,100\n").unwrap();
        let b = RawTrace::parse("b", "1,0,200\n").unwrap();
        let merged = RawTrace::merge([a, b]);
        let times: Vec<u64> = merged.events.iter().map(|e| e.completion_time_us).collect();
        assert_eq!(times, vec![100, 200, 300]);
        assert_eq!(merged.filter_label(Some("read")).count(), 0);
        assert_eq!(merged.filter_label(None).count(), 3);
    }

    #[tokio::test]
    async fn missing_file_should_read_as_empty_trace() {
        let dir = tempfile::tempdir().unwrap();
        let trace = RawTrace::read(&dir.path().join("client_9.trace")).await.unwrap();
        assert!(trace.is_empty());
    }
}
