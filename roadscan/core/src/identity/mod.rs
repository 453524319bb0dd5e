//! Identity Integration
//!
//! Sign-in and account creation against an external authentication
//! provider, plus the observable session state the navigation shell reads.
//!
//! # Available Providers
//!
//! - **Firebase**: Identity Toolkit REST API (email/password)
//! - **In-memory**: process-local accounts for development and tests
//!
//! # Usage
//!
//! ```ignore
//! use roadscan_core::identity::{IdentityClient, InMemoryProvider};
//!
//! let client = IdentityClient::new(InMemoryProvider::new());
//! client.start();
//! let mut sub = client.subscribe();
//! client.register("driver@example.com", "hunter22").await?;
//! assert!(sub.current().is_authenticated());
//! ```

mod client;
mod error;
mod firebase;
mod memory;
mod traits;

pub use client::IdentityClient;
pub use error::{auth_notice, AuthError, AuthOperation, FILL_ALL_FIELDS_NOTICE};
pub use firebase::FirebaseProvider;
pub use memory::InMemoryProvider;
pub use traits::{Credentials, IdentityProvider, ProviderConfig};
