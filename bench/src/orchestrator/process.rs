use super::launch::LaunchPlan;
use crate::bench_error::BenchError;
use crate::input::role::RoleInstance;
use futures::future::join_all;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::collections::BTreeMap;
use std::fs::File;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// A spawned role instance, leading its own process group so that wrapper scripts and
/// everything they start are signalled together. The whole group is killed if the handle is
/// dropped before shutdown, so an unwinding trial never leaks processes.
#[derive(Debug)]
pub struct RoleProcess {
    instance: RoleInstance,
    child: Child,
    group: Option<Pid>,
    exit_status: Option<ExitStatus>,
    shutdowns: u32,
}

impl RoleProcess {
    pub fn spawn(plan: &LaunchPlan) -> Result<Self, BenchError> {
        let stdout = File::create(&plan.paths.stdout)?;
        let stderr = File::create(&plan.paths.stderr)?;
        let child = Command::new(&plan.program)
            .args(&plan.args)
            .envs(&plan.env)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| {
                BenchError::LaunchError(format!(
                    "cannot spawn {} ({}): {error}",
                    plan.instance, plan.program
                ))
            })?;
        debug!(
            "Spawned {} as pid {:?}: {} {}",
            plan.instance,
            child.id(),
            plan.program,
            plan.args.join(" ")
        );
        let group = child.id().map(|pid| Pid::from_raw(pid as i32));
        Ok(Self {
            instance: plan.instance,
            child,
            group,
            exit_status: None,
            shutdowns: 0,
        })
    }

    pub fn instance(&self) -> RoleInstance {
        self.instance
    }

    /// Exit status if the process has already terminated, without blocking.
    pub fn try_exit_status(&mut self) -> Result<Option<ExitStatus>, BenchError> {
        if self.exit_status.is_none() {
            self.exit_status = self.child.try_wait()?;
        }
        Ok(self.exit_status)
    }

    pub fn shutdowns(&self) -> u32 {
        self.shutdowns
    }

    /// SIGTERM to the process group, then SIGKILL to the group once `grace` elapses. The group
    /// is killed even when its leader already exited, so nothing it started outlives the
    /// trial. Only the first call has any effect.
    pub async fn shutdown(&mut self, grace: Duration) {
        if self.shutdowns > 0 {
            return;
        }
        self.shutdowns += 1;

        match self.try_exit_status() {
            Ok(Some(status)) => {
                debug!("{} already exited with {status}", self.instance);
                self.signal_group(Signal::SIGKILL);
                return;
            }
            Ok(None) => {}
            Err(error) => warn!("Cannot poll {}: {error}", self.instance),
        }

        self.signal_group(Signal::SIGTERM);
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!("{} terminated with {status}", self.instance);
                self.exit_status = Some(status);
            }
            Ok(Err(error)) => warn!("Cannot wait for {}: {error}", self.instance),
            Err(_) => {
                warn!(
                    "{} did not exit within {grace:?} after SIGTERM, killing it",
                    self.instance
                );
                if let Err(error) = self.child.kill().await {
                    warn!("Cannot kill {}: {error}", self.instance);
                }
                self.exit_status = self.child.try_wait().ok().flatten();
            }
        }
        self.signal_group(Signal::SIGKILL);
    }

    fn signal_group(&self, signal: Signal) {
        let Some(group) = self.group else {
            return;
        };
        if let Err(error) = signal::killpg(group, signal) {
            if error != Errno::ESRCH {
                warn!("{signal} to {} (group {group}) failed: {error}", self.instance);
            }
        }
    }
}

impl Drop for RoleProcess {
    fn drop(&mut self) {
        if self.shutdowns == 0 {
            self.signal_group(Signal::SIGKILL);
        }
    }
}

/// Every process spawned for one trial, in spawn order.
#[derive(Debug, Default)]
pub struct Fleet {
    processes: Vec<RoleProcess>,
}

impl Fleet {
    pub fn push(&mut self, process: RoleProcess) {
        self.processes.push(process);
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// First process among `instances` that has already exited, with its status.
    pub fn first_exited(
        &mut self,
        instances: &[RoleInstance],
    ) -> Result<Option<(RoleInstance, ExitStatus)>, BenchError> {
        for process in self
            .processes
            .iter_mut()
            .filter(|process| instances.contains(&process.instance))
        {
            if let Some(status) = process.try_exit_status()? {
                return Ok(Some((process.instance, status)));
            }
        }
        Ok(None)
    }

    /// Instances among `instances` that are still running.
    pub fn running(&mut self, instances: &[RoleInstance]) -> Result<Vec<RoleInstance>, BenchError> {
        let mut running = Vec::new();
        for process in self
            .processes
            .iter_mut()
            .filter(|process| instances.contains(&process.instance))
        {
            if process.try_exit_status()?.is_none() {
                running.push(process.instance);
            }
        }
        Ok(running)
    }

    /// Shuts every process down concurrently, each at most once.
    pub async fn shutdown_all(&mut self, grace: Duration) {
        if self.processes.is_empty() {
            return;
        }
        info!("Shutting down {} role process(es)", self.processes.len());
        join_all(
            self.processes
                .iter_mut()
                .map(|process| process.shutdown(grace)),
        )
        .await;
    }

    /// How many times shutdown was invoked for each spawned process.
    pub fn shutdown_counts(&self) -> BTreeMap<RoleInstance, u32> {
        self.processes
            .iter()
            .map(|process| (process.instance, process.shutdowns))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::bench_config::LaunchTemplate;
    use crate::input::role::RoleKind;
    use crate::input::tests::multipaxos_input;
    use crate::topology::Address;
    use std::path::Path;

    fn plan(dir: &Path, script: &str) -> LaunchPlan {
        let template = LaunchTemplate {
            program: "/bin/sh".to_owned(),
            args: vec!["-c".to_owned(), script.to_owned()],
            env: Default::default(),
        };
        let address = Address {
            host: "127.0.0.1".to_owned(),
            port: 10000,
        };
        LaunchPlan::new(
            &template,
            &multipaxos_input(),
            RoleInstance::new(RoleKind::Leader, 0),
            &address,
            dir,
        )
    }

    #[tokio::test]
    async fn shutdown_should_terminate_running_process_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = RoleProcess::spawn(&plan(dir.path(), "sleep 30")).unwrap();
        assert!(process.try_exit_status().unwrap().is_none());

        process.shutdown(Duration::from_secs(5)).await;
        process.shutdown(Duration::from_secs(5)).await;

        assert_eq!(process.shutdowns(), 1);
        assert!(process.try_exit_status().unwrap().is_some());
    }

    #[tokio::test]
    async fn process_ignoring_sigterm_should_be_killed_after_grace() {
        let dir = tempfile::tempdir().unwrap();
        let script = "trap '' TERM; while true; do sleep 1; done";
        let mut process = RoleProcess::spawn(&plan(dir.path(), script)).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        process.shutdown(Duration::from_millis(300)).await;

        assert!(process.try_exit_status().unwrap().is_some());
    }

    #[tokio::test]
    async fn output_should_be_captured_in_trial_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut fleet = Fleet::default();
        let script = "echo $BENCH_ROLE; echo oops >&2";
        fleet.push(RoleProcess::spawn(&plan(dir.path(), script)).unwrap());
        let leader = [RoleInstance::new(RoleKind::Leader, 0)];
        while fleet.first_exited(&leader).unwrap().is_none() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        fleet.shutdown_all(Duration::from_secs(1)).await;

        let out = std::fs::read_to_string(dir.path().join("leader_0.out")).unwrap();
        let err = std::fs::read_to_string(dir.path().join("leader_0.err")).unwrap();
        assert_eq!(out.trim(), "leader");
        assert_eq!(err.trim(), "oops");
        assert_eq!(fleet.shutdown_counts()[&leader[0]], 1);
    }

    /// Live, non-zombie process per procfs.
    fn is_running(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.trim_start().chars().next())
                .is_some_and(|state| state != 'Z' && state != 'X'),
            Err(_) => false,
        }
    }

    async fn grandchild_pid(dir: &Path) -> i32 {
        let path = dir.join("grandchild.pid");
        for _ in 0..100 {
            if let Ok(content) = std::fs::read_to_string(&path) {
                if let Ok(pid) = content.trim().parse() {
                    return pid;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("grandchild pid was never written");
    }

    async fn wait_until_gone(pid: i32) -> bool {
        for _ in 0..100 {
            if !is_running(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    const WRAPPER_SCRIPT: &str = "sleep 300 & echo $! > \"$BENCH_TRIAL_DIR/grandchild.pid\"; wait";

    #[tokio::test]
    async fn shutdown_should_terminate_processes_started_by_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = RoleProcess::spawn(&plan(dir.path(), WRAPPER_SCRIPT)).unwrap();
        let grandchild = grandchild_pid(dir.path()).await;
        assert!(is_running(grandchild));

        process.shutdown(Duration::from_secs(2)).await;

        assert!(wait_until_gone(grandchild).await);
        assert_eq!(process.shutdowns(), 1);
    }

    #[tokio::test]
    async fn shutdown_should_kill_group_left_behind_by_exited_leader() {
        let dir = tempfile::tempdir().unwrap();
        let script = "sleep 300 & echo $! > \"$BENCH_TRIAL_DIR/grandchild.pid\"; exit 0";
        let mut process = RoleProcess::spawn(&plan(dir.path(), script)).unwrap();
        let grandchild = grandchild_pid(dir.path()).await;
        while process.try_exit_status().unwrap().is_none() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(is_running(grandchild));

        process.shutdown(Duration::from_secs(2)).await;

        assert!(wait_until_gone(grandchild).await);
    }

    #[tokio::test]
    async fn dropped_process_should_take_its_group_down() {
        let dir = tempfile::tempdir().unwrap();
        let process = RoleProcess::spawn(&plan(dir.path(), WRAPPER_SCRIPT)).unwrap();
        let grandchild = grandchild_pid(dir.path()).await;

        drop(process);

        assert!(wait_until_gone(grandchild).await);
    }

    #[tokio::test]
    async fn missing_program_should_be_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = plan(dir.path(), "true");
        plan.program = "/nonexistent/role-binary".to_owned();
        assert!(matches!(
            RoleProcess::spawn(&plan),
            Err(BenchError::LaunchError(_))
        ));
    }
}
