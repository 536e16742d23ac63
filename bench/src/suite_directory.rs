use crate::bench_error::BenchError;
use chrono::Local;
use paxos_bench_report::result_row::ResultRow;
use paxos_bench_report::result_table::RESULT_TABLE_FILE_NAME;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ARGS_FILE_NAME: &str = "args.json";
pub const HARDWARE_FILE_NAME: &str = "hardware.json";
pub const INPUTS_FILE_NAME: &str = "inputs.txt";
pub const INPUT_FILE_NAME: &str = "input.json";
pub const OUTPUT_FILE_NAME: &str = "output.json";

/// Artifact directory of one suite run, holding the result table and one subdirectory per
/// trial. The table is flushed after every row and again when the directory is dropped.
#[derive(Debug)]
pub struct SuiteDirectory {
    root: PathBuf,
    table: Option<BufWriter<File>>,
    rows: usize,
}

impl SuiteDirectory {
    /// Creates `<timestamp>_<random>_<suite_name>` under `parent`.
    pub fn acquire(parent: &Path, suite_name: &str) -> Result<Self, BenchError> {
        Self::acquire_at(parent.join(Self::generate_dir_name(suite_name)))
    }

    /// Creates exactly `root`. An existing directory is never reused.
    pub fn acquire_at(root: PathBuf) -> Result<Self, BenchError> {
        if let Some(parent) = root.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::create_dir(&root) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                return Err(BenchError::DirectoryExistsError(root));
            }
            Err(error) => return Err(error.into()),
        }

        let table = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(root.join(RESULT_TABLE_FILE_NAME))?;
        info!("Suite directory: {}", root.display());
        Ok(Self {
            root,
            table: Some(BufWriter::new(table)),
            rows: 0,
        })
    }

    pub fn generate_dir_name(suite_name: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S%.6f");
        let random = Uuid::new_v4().simple().to_string();
        format!("{timestamp}_{}_{suite_name}", &random[..8])
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn result_table_path(&self) -> PathBuf {
        self.root.join(RESULT_TABLE_FILE_NAME)
    }

    pub fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<(), BenchError> {
        write_json(&self.root.join(file_name), value)
    }

    /// Debug form of every input, one per line, in trial order.
    pub fn write_inputs<T: Debug>(
        &self,
        inputs: impl IntoIterator<Item = T>,
    ) -> Result<(), BenchError> {
        let mut writer = BufWriter::new(File::create(self.root.join(INPUTS_FILE_NAME))?);
        for input in inputs {
            writeln!(writer, "{input:?}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Creates the directory of trial `index`; fails if it already exists.
    pub fn create_trial_dir(root: &Path, index: usize) -> Result<PathBuf, BenchError> {
        let trial_dir = root.join(format!("{index:03}"));
        match fs::create_dir(&trial_dir) {
            Ok(()) => Ok(trial_dir),
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                Err(BenchError::DirectoryExistsError(trial_dir))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Appends one row and flushes it, so a crash never loses finished trials.
    pub fn append_row(&mut self, row: &ResultRow) -> Result<(), BenchError> {
        let line = row.to_json_line()?;
        let table = self.table.as_mut().ok_or_else(|| {
            BenchError::CannotSerialize("result table is already closed".to_owned())
        })?;
        writeln!(table, "{line}")?;
        table.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes and closes the result table.
    pub fn close(mut self) -> Result<PathBuf, BenchError> {
        if let Some(mut table) = self.table.take() {
            table.flush()?;
            table.get_ref().sync_all()?;
        }
        debug!("Closed result table with {} row(s)", self.rows);
        Ok(std::mem::take(&mut self.root))
    }
}

impl Drop for SuiteDirectory {
    fn drop(&mut self) {
        if let Some(mut table) = self.table.take() {
            if let Err(error) = table.flush() {
                warn!("Cannot flush result table in {}: {error}", self.root.display());
            }
        }
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BenchError> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paxos_bench_report::output::Output;
    use paxos_bench_report::result_table::ResultTable;
    use serde_json::Map;

    #[test]
    fn acquiring_existing_root_should_fail_and_create_nothing() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("suite");
        fs::create_dir(&root).unwrap();

        let result = SuiteDirectory::acquire_at(root.clone());

        assert!(matches!(result, Err(BenchError::DirectoryExistsError(_))));
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn generated_name_should_end_with_suite_name() {
        let name = SuiteDirectory::generate_dir_name("smoke");
        let parts: Vec<&str> = name.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), "2024-01-01".len());
        assert_eq!(parts[2].len(), 8);
        assert_eq!(parts[3], "smoke");
    }

    #[test]
    fn trial_directories_should_never_be_reused() {
        let parent = tempfile::tempdir().unwrap();
        let directory = SuiteDirectory::acquire(parent.path(), "smoke").unwrap();

        let first = SuiteDirectory::create_trial_dir(directory.root(), 7).unwrap();
        assert!(first.ends_with("007"));
        assert!(matches!(
            SuiteDirectory::create_trial_dir(directory.root(), 7),
            Err(BenchError::DirectoryExistsError(_))
        ));
    }

    #[test]
    fn rows_should_be_readable_after_drop() {
        let parent = tempfile::tempdir().unwrap();
        let mut directory = SuiteDirectory::acquire(parent.path(), "smoke").unwrap();
        let table_path = directory.result_table_path();
        directory
            .append_row(&ResultRow::completed(0, Map::new(), &Output::default()))
            .unwrap();
        directory
            .append_row(&ResultRow::failed(1, Map::new(), "launching", "boom"))
            .unwrap();
        drop(directory);

        let table = ResultTable::read(&table_path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.failed().count(), 1);
    }
}
