//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest blocking client for the Transport port
//! - an in-process mock of the bank account data API for tests

pub mod http;

#[cfg(test)]
pub mod mock_server;
