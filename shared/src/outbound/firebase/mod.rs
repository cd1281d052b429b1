//! Firebase REST adapters.
//!
//! `FirebaseAuthHttpGateway` talks to the Identity Toolkit API and records the
//! signed-in session in a shared [`FirebaseSession`]; `FirestoreHttpStore`
//! reads the id token from the same session to authorise Firestore calls.

mod auth_http;
mod firestore_http;
mod firestore_value;
mod session;

pub use auth_http::{DEFAULT_IDENTITY_TOOLKIT_URL, FirebaseAuthHttpGateway};
pub use firestore_http::{DEFAULT_FIRESTORE_URL, FirestoreHttpStore};
pub use session::FirebaseSession;
