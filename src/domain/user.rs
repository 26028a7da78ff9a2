use serde::{Deserialize, Serialize};

/// The current auth subject as seen by the rest of the application.
///
/// A signed-out subject has every field set to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
}

impl UserData {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Profile document written under `users/{uid}` on sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}
