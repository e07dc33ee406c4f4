pub mod client;
pub mod credentials;
pub mod types;

pub use client::*;
pub use credentials::CredentialStore;
pub use types::*;
