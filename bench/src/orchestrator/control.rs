use super::process::Fleet;
use crate::bench_error::BenchError;
use crate::input::role::RoleInstance;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::fs;
use tokio::time::Instant;

/// Why waiting for control files ended early.
#[derive(Debug)]
pub enum AwaitFailure {
    /// A process exited before creating its file.
    Exited(RoleInstance, ExitStatus),
    /// The deadline passed with these files still missing.
    Missing(Vec<RoleInstance>),
    Io(BenchError),
}

impl From<BenchError> for AwaitFailure {
    fn from(error: BenchError) -> Self {
        AwaitFailure::Io(error)
    }
}

impl From<std::io::Error> for AwaitFailure {
    fn from(error: std::io::Error) -> Self {
        AwaitFailure::Io(error.into())
    }
}

/// Polls until every instance has created its control file, any pending instance exits, or
/// `within` elapses.
pub async fn await_files(
    fleet: &mut Fleet,
    files: &[(RoleInstance, PathBuf)],
    within: Duration,
    poll_interval: Duration,
) -> Result<(), AwaitFailure> {
    let deadline = Instant::now() + within;
    let mut pending: Vec<&(RoleInstance, PathBuf)> = files.iter().collect();
    loop {
        let mut still_pending = Vec::with_capacity(pending.len());
        for entry in pending {
            if !fs::try_exists(&entry.1).await? {
                still_pending.push(entry);
            }
        }
        pending = still_pending;
        if pending.is_empty() {
            return Ok(());
        }

        let instances: Vec<RoleInstance> = pending.iter().map(|(instance, _)| *instance).collect();
        if let Some((instance, status)) = fleet.first_exited(&instances)? {
            return Err(AwaitFailure::Exited(instance, status));
        }
        if Instant::now() >= deadline {
            return Err(AwaitFailure::Missing(instances));
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Publishes the measurement start so that clients never observe a partially written file.
pub async fn write_measure_file(path: &Path, start_unix_micros: u64) -> Result<(), BenchError> {
    let staging = path.with_extension("measure.tmp");
    fs::write(&staging, format!("{start_unix_micros}\n")).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::role::RoleKind;

    #[tokio::test]
    async fn measure_file_should_hold_start_instant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_0.measure");
        write_measure_file(&path, 1_700_000_000_123_456).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim().parse::<u64>().unwrap(), 1_700_000_000_123_456);
        assert!(!dir.path().join("client_0.measure.tmp").exists());
    }

    #[tokio::test]
    async fn await_files_should_report_missing_instances_after_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let present = RoleInstance::new(RoleKind::Acceptor, 0);
        let absent = RoleInstance::new(RoleKind::Acceptor, 1);
        std::fs::write(dir.path().join("acceptor_0.ready"), "").unwrap();
        let files = vec![
            (present, dir.path().join("acceptor_0.ready")),
            (absent, dir.path().join("acceptor_1.ready")),
        ];

        let result = await_files(
            &mut Fleet::default(),
            &files,
            Duration::from_millis(100),
            Duration::from_millis(10),
        )
        .await;

        match result {
            Err(AwaitFailure::Missing(missing)) => assert_eq!(missing, vec![absent]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn await_files_should_succeed_once_all_files_exist() {
        let dir = tempfile::tempdir().unwrap();
        let instance = RoleInstance::new(RoleKind::Client, 0);
        let path = dir.path().join("client_0.warm");
        let writer = {
            let path = path.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                fs::write(path, "").await.unwrap();
            })
        };

        await_files(
            &mut Fleet::default(),
            &[(instance, path)],
            Duration::from_secs(5),
            Duration::from_millis(10),
        )
        .await
        .unwrap();
        writer.await.unwrap();
    }
}
