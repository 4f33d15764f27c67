pub mod backend;
pub mod board_io;
pub mod config_io;
pub mod dispatch;
pub mod lock;
pub mod watcher;
