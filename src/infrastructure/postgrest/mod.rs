//! REST gateway adapter for the hosted data store.

mod client;
mod dto;
mod query;

pub use client::PostgrestClient;
