//! Authentication: input validation, the identity gateway, and the store.
//!
//! ARCHITECTURE
//! ============
//! ```text
//! view ──validated input──▶ AuthStore ──▶ dyn AuthGateway
//!                               │              ├─ SupabaseGateway (HTTP)
//!                               ▼              └─ FakeGateway (offline)
//!                         AuthSnapshot (watch)
//! ```
//! `SessionClient` picks the gateway once from configuration.

pub mod client;
pub mod fake;
pub mod gateway;
pub mod store;
pub mod supabase;
pub mod types;
pub mod validation;

pub use client::SessionClient;
pub use fake::FakeGateway;
pub use gateway::AuthGateway;
pub use store::{AuthOperation, AuthSnapshot, AuthStore, OperationState, RequestPhase};
pub use supabase::SupabaseGateway;
pub use types::{AuthError, AuthEvent, ProfilePatch, RemoteUser, Session, UserMetadata, UserProfile};
pub use validation::{Credentials, Field, FieldError, Registration, ValidationErrors};
