// Library module for hashcheck
// Re-exports modules for use in integration tests and the binary

pub mod app;
pub mod cli;
pub mod config;
pub mod digest;
pub mod events;
pub mod logging;
pub mod task;
pub mod ui;
