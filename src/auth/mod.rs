//! Authentication seam: the [`AuthProvider`] trait and an in-memory provider.

pub mod local;
pub mod watch;

pub use local::LocalAuth;
pub use watch::{Listener, SubjectWatch, Subscription};

use crate::domain::UserData;
use crate::errors::AuthError;

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Identity provider exposing a reactive "current subject".
pub trait AuthProvider: Send + Sync {
    /// Registers a new account, signs it in and returns the new subject.
    fn sign_up(&self, email: &str, password: &str, name: &str) -> AuthResult<UserData>;
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<UserData>;
    fn sign_out(&self) -> AuthResult<()>;
    fn current(&self) -> UserData;
    /// Calls `listener` with the current subject now and on every change
    /// until the returned guard is dropped.
    fn subscribe(&self, listener: Listener) -> Subscription;
    fn update_profile(&self, name: Option<&str>, photo: Option<&str>) -> AuthResult<UserData>;
}
