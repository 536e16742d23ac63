pub mod prints;
mod types;
mod utils;

pub use types::*;
pub use utils::round_float;
