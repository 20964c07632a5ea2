//! Infrastructure layer.

pub mod dto;
pub mod store;
