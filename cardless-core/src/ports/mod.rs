//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The dispatcher
//! depends only on these traits, not on a concrete HTTP stack.

mod transport;

pub use transport::{HttpRequest, HttpResponse, Method, Transport};
