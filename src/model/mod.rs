pub mod board;
pub mod config;
pub mod status;
pub mod workspace;

pub use board::*;
pub use config::*;
pub use status::*;
pub use workspace::*;
