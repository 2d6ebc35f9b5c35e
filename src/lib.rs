pub mod board;
pub mod db;
pub mod filter;
pub mod generation;
pub mod logging;
pub mod model;
pub mod output;
pub mod paths;
pub mod persist;
pub mod store;
pub mod suggest;
pub mod tui;
pub mod watch;
