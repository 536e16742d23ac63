pub mod common;
pub mod defaults;
