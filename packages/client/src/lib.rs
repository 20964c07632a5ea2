pub mod command;
pub mod error;
pub mod formatter;
pub mod identity;
pub mod remote;
pub mod runner;
pub mod session;
mod ui;

pub use runner::run_client;
