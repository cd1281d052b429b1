//! Error taxonomy at the Firebase repository boundary.
//!
//! The three kinds carry only a message and differ by call site: `Auth` for
//! sign-in, sign-up and profile operations, `Dog` for dog CRUD, `Db` for any
//! other persistence failure. View models surface [`RepositoryError::message`]
//! to the user.

use super::ports::define_port_error;

define_port_error! {
    /// Failure returned by every [`FirebaseRepository`](crate::domain::ports::FirebaseRepository) operation.
    pub enum RepositoryError {
        /// Authentication or profile operation failed.
        Auth { message: String } => "auth error: {message}",
        /// Dog create, update or delete failed.
        Dog { message: String } => "dog error: {message}",
        /// Generic persistence failure.
        Db { message: String } => "database error: {message}",
    }
}

impl RepositoryError {
    /// User-facing message without the kind prefix.
    ///
    /// # Examples
    /// ```
    /// use pupfiesta::domain::RepositoryError;
    ///
    /// let err = RepositoryError::dog("Dog 'Rex' could not be resolved");
    /// assert_eq!(err.message(), "Dog 'Rex' could not be resolved");
    /// assert_eq!(err.to_string(), "dog error: Dog 'Rex' could not be resolved");
    /// ```
    pub fn message(&self) -> &str {
        match self {
            Self::Auth { message } | Self::Dog { message } | Self::Db { message } => {
                message.as_str()
            }
        }
    }
}

/// Best-effort message for an adapter error, falling back to `fallback` when
/// the adapter produced an empty description.
pub(crate) fn message_or(error: &impl std::fmt::Display, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}
