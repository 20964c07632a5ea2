//! Document store hosting over HTTP and WebSocket.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
