//! Request handling services
//!
//! - **credentials**: the shared credential slot and its refresh guard
//! - **dispatcher**: request building, bearer auth, response classification
//! - **decoder**: JSON to domain entity mapping

pub mod credentials;
pub mod decoder;
pub mod dispatcher;

pub use credentials::CredentialStore;
pub use dispatcher::{ApiResponse, Auth, Dispatcher};
