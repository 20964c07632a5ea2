//! Shared utilities for the Yoriai workspace.
//!
//! Both the server (document store host) and the client (voting CLI) use
//! these helpers for logging and time handling.

pub mod logger;
pub mod time;
