pub mod bounds;
pub mod config;
pub mod error;
pub mod file_utils;
pub mod font;
pub mod layout;
pub mod types;

pub use bounds::*;
pub use config::*;
pub use error::*;
pub use file_utils::*;
pub use font::*;
pub use layout::*;
pub use types::*;
