pub mod amount;
pub mod constants;
pub mod error;
pub mod types;

pub use amount::*;
pub use constants::*;
pub use error::*;
pub use types::*;
