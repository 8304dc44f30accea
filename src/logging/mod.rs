//! Logging infrastructure: a stderr console layer and a per-command log file.
//!
//! Standard output belongs to the JSON-RPC stream while serving, so nothing
//! in here ever writes to it.

mod subscriber;
mod utils;

pub use subscriber::init_subscriber;
