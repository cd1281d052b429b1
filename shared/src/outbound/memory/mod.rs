//! In-process adapters for the auth and document store ports.
//!
//! Used by the integration tests and by embedders that run without Firebase.
//! Behaviour follows the remote
//! services where callers can observe it: writes replace whole documents,
//! listing is ordered by document id, weak passwords and duplicate emails are
//! rejected at sign-up.

mod auth;
mod store;

pub use auth::InMemoryAuthGateway;
pub use store::InMemoryDocumentStore;
