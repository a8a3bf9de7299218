//! Credential issuance and validation core for a resume-as-an-API service:
//! bcrypt password verification in front of signed, time-bounded bearer
//! tokens. The embedding application wires an `AuthGate` over a
//! `CredentialStore` and calls `login` / `authorize` / `rotate_password`;
//! everything else (routing, resume data, deployment) lives outside this
//! crate.

pub mod auth;
pub mod configuration;
pub mod error;
pub mod gate;
pub mod store;
pub mod telemetry;
pub mod validators;

pub use configuration::{get_configuration, Settings};
pub use error::{AuthError, ConfigError, DenialResponse, StoreError};
pub use gate::{AuthGate, TokenResponse};
pub use store::{CredentialHash, CredentialStore, Identity, MemoryCredentialStore, PgCredentialStore};
