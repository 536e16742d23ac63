pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_PROFILE: bool = false;
pub const DEFAULT_MONITOR: bool = false;
pub const DEFAULT_DRY_RUN: bool = false;
