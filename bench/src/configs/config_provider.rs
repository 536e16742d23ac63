use crate::bench_error::BenchError;
use crate::configs::bench_config::BenchConfig;
use crate::validatable::Validatable;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "configs/bench.toml";
pub const ENV_PREFIX: &str = "PAXOS_BENCH_";

pub trait ConfigProvider {
    fn load_config(&self) -> Result<BenchConfig, BenchError>;
}

/// Built-in defaults, overridden by a TOML or JSON file, overridden by `PAXOS_BENCH_*`
/// environment variables (`__` separates nested keys, e.g. `PAXOS_BENCH_SUITE__PARALLELISM`).
#[derive(Debug)]
pub struct FileConfigProvider {
    path: String,
    required: bool,
}

impl FileConfigProvider {
    pub fn new(path: String) -> Self {
        Self {
            path,
            required: true,
        }
    }

    /// A provider that falls back to defaults when the file does not exist.
    pub fn optional(path: String) -> Self {
        Self {
            path,
            required: false,
        }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load_config(&self) -> Result<BenchConfig, BenchError> {
        let mut config_builder = Figment::from(Serialized::defaults(BenchConfig::default()));

        if file_exists(&self.path) {
            info!("Loading config from path: '{}'...", self.path);
            let extension = Path::new(&self.path)
                .extension()
                .and_then(|extension| extension.to_str())
                .unwrap_or("");
            config_builder = match extension {
                "json" => config_builder.merge(Json::file(&self.path)),
                "toml" => config_builder.merge(Toml::file(&self.path)),
                e => {
                    return Err(BenchError::CannotLoadConfiguration(format!(
                        "invalid file extension: {e}, only .json and .toml are supported."
                    )));
                }
            };
        } else if self.required {
            return Err(BenchError::CannotLoadConfiguration(format!(
                "Cannot find configuration file at path: '{}'.",
                self.path,
            )));
        } else {
            warn!(
                "Config file '{}' not found, using built-in defaults.",
                self.path
            );
        }

        let config: BenchConfig = config_builder
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|figment_error| {
                BenchError::CannotLoadConfiguration(format!(
                    "Failed to load configuration: {figment_error}"
                ))
            })?;

        config.validate()?;
        info!("Using config: {config}");
        Ok(config)
    }
}

/// Resolves relative paths against the current directory and its ancestors, the same way
/// figment looks files up.
fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();

    if path.is_absolute() {
        return path.is_file();
    }

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(_) => return false,
    };

    let mut current_dir = cwd.as_path();
    loop {
        if current_dir.join(path).is_file() {
            return true;
        }

        current_dir = match current_dir.parent() {
            Some(parent) => parent,
            None => return false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::role::RoleKind;
    use crate::utils::duration::BenchDuration;
    use std::io::Write;

    #[test]
    fn missing_optional_file_should_yield_defaults() {
        let provider = FileConfigProvider::optional("definitely/not/here.toml".to_owned());
        let config = provider.load_config().unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn missing_required_file_should_fail() {
        let provider = FileConfigProvider::new("definitely/not/here.toml".to_owned());
        assert!(matches!(
            provider.load_config(),
            Err(BenchError::CannotLoadConfiguration(_))
        ));
    }

    #[test]
    fn toml_file_should_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[suite]
parallelism = 2

[orchestrator]
launch_timeout = "5s"

[topology]
base_port = 20000

[roles.client]
program = "/bin/sh"
args = ["client.sh", "{{index}}"]
"#
        )
        .unwrap();

        let provider = FileConfigProvider::new(path.to_string_lossy().to_string());
        let config = provider.load_config().unwrap();

        assert_eq!(config.suite.parallelism, 2);
        assert_eq!(
            config.orchestrator.launch_timeout,
            BenchDuration::from_secs(5)
        );
        assert_eq!(
            config.orchestrator.shutdown_grace,
            BenchConfig::default().orchestrator.shutdown_grace
        );
        assert_eq!(config.topology.base_port, 20000);
        assert_eq!(config.roles.template_for(RoleKind::Client).program, "/bin/sh");
        assert_eq!(
            config.roles.template_for(RoleKind::Leader),
            &BenchConfig::default().roles.default
        );
    }

    #[test]
    fn unsupported_extension_should_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.yaml");
        std::fs::write(&path, "suite: {}").unwrap();
        let provider = FileConfigProvider::new(path.to_string_lossy().to_string());
        assert!(matches!(
            provider.load_config(),
            Err(BenchError::CannotLoadConfiguration(_))
        ));
    }
}
