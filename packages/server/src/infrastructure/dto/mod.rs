//! Data Transfer Objects (DTOs) for the document store API.
//!
//! DTOs are organized by protocol:
//! - `http`: HTTP request/response DTOs
//! - `websocket`: WebSocket push message DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
