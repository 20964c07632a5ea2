//! Room Store implementations.

pub mod inmemory;

pub use inmemory::InMemoryRoomStore;
