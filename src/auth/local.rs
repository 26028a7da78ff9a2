use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{AuthProvider, AuthResult, Listener, SubjectWatch, Subscription};
use crate::domain::{new_id, UserData, UserProfile};
use crate::errors::AuthError;
use crate::storage::{fields, paths, write, DocumentStore};

pub const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user_id: String,
    email: String,
    name: String,
    photo: Option<String>,
    salt: String,
    digest: String,
}

impl Account {
    fn subject(&self) -> UserData {
        UserData {
            user_id: Some(self.user_id.clone()),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            photo: self.photo.clone(),
        }
    }
}

/// In-memory email/password provider with salted SHA-256 digests.
///
/// When constructed with a store, sign-up writes the `users/{uid}` profile
/// document and profile edits keep its `name` in sync.
pub struct LocalAuth {
    accounts: Mutex<HashMap<String, Account>>,
    watch: SubjectWatch,
    store: Option<Arc<dyn DocumentStore>>,
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuth {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            watch: SubjectWatch::new(),
            store: None,
        }
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new()
        }
    }

    fn accounts(&self) -> AuthResult<std::sync::MutexGuard<'_, HashMap<String, Account>>> {
        self.accounts
            .lock()
            .map_err(|_| AuthError::Backend("account table poisoned".into()))
    }

    fn write_profile(&self, user_id: &str, profile: &UserProfile) -> AuthResult<()> {
        if let Some(store) = &self.store {
            write(store.as_ref(), &paths::user(user_id), profile)
                .map_err(|err| AuthError::Backend(err.to_string()))?;
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl AuthProvider for LocalAuth {
    fn sign_up(&self, email: &str, password: &str, name: &str) -> AuthResult<UserData> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }
        let subject = {
            let mut accounts = self.accounts()?;
            if accounts.contains_key(&email) {
                return Err(AuthError::EmailInUse(email));
            }
            let salt = new_id();
            let account = Account {
                user_id: new_id(),
                email: email.clone(),
                name: name.trim().to_string(),
                photo: None,
                digest: digest(&salt, password),
                salt,
            };
            self.write_profile(
                &account.user_id,
                &UserProfile {
                    email: account.email.clone(),
                    name: account.name.clone(),
                },
            )?;
            let subject = account.subject();
            accounts.insert(email, account);
            subject
        };
        info!(user = ?subject.user_id, "account created");
        self.watch.publish(subject.clone());
        Ok(subject)
    }

    fn sign_in(&self, email: &str, password: &str) -> AuthResult<UserData> {
        let email = normalize_email(email)?;
        let subject = {
            let accounts = self.accounts()?;
            let account = accounts.get(&email).ok_or(AuthError::InvalidCredentials)?;
            if digest(&account.salt, password) != account.digest {
                return Err(AuthError::InvalidCredentials);
            }
            account.subject()
        };
        debug!(user = ?subject.user_id, "signed in");
        self.watch.publish(subject.clone());
        Ok(subject)
    }

    fn sign_out(&self) -> AuthResult<()> {
        if self.watch.current().is_signed_in() {
            debug!("signed out");
            self.watch.publish(UserData::signed_out());
        }
        Ok(())
    }

    fn current(&self) -> UserData {
        self.watch.current()
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.watch.subscribe(listener)
    }

    fn update_profile(&self, name: Option<&str>, photo: Option<&str>) -> AuthResult<UserData> {
        let email = self.watch.current().email.ok_or(AuthError::NotSignedIn)?;
        let subject = {
            let mut accounts = self.accounts()?;
            let account = accounts.get_mut(&email).ok_or(AuthError::NotSignedIn)?;
            if let Some(name) = name {
                if let Some(store) = &self.store {
                    store
                        .update(
                            &paths::user(&account.user_id),
                            fields([("name", serde_json::Value::from(name))]),
                        )
                        .map_err(|err| AuthError::Backend(err.to_string()))?;
                }
                account.name = name.to_string();
            }
            if let Some(photo) = photo {
                account.photo = Some(photo.to_string());
            }
            account.subject()
        };
        self.watch.publish(subject.clone());
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{read, MemoryStore};

    #[test]
    fn sign_up_then_sign_in() {
        let auth = LocalAuth::new();
        let created = auth.sign_up("Ann@Example.com", "secret1", "Ann").unwrap();
        assert!(created.is_signed_in());
        auth.sign_out().unwrap();
        assert!(!auth.current().is_signed_in());
        let again = auth.sign_in("ann@example.com", "secret1").unwrap();
        assert_eq!(again.user_id, created.user_id);
    }

    #[test]
    fn rejects_bad_credentials_and_input() {
        let auth = LocalAuth::new();
        auth.sign_up("a@b.c", "secret1", "A").unwrap();
        assert_eq!(
            auth.sign_in("a@b.c", "wrong-pass").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth.sign_up("a@b.c", "secret1", "A").unwrap_err().code(),
            "auth/email-already-in-use"
        );
        assert!(matches!(
            auth.sign_up("nobody", "secret1", "N"),
            Err(AuthError::InvalidEmail(_))
        ));
        assert_eq!(
            auth.sign_up("x@y.z", "12345", "X").unwrap_err(),
            AuthError::WeakPassword { min: 6 }
        );
    }

    #[test]
    fn sign_up_writes_profile_document() {
        let store = Arc::new(MemoryStore::new());
        let auth = LocalAuth::with_store(store.clone());
        let user = auth.sign_up("c@d.e", "secret1", "Cee").unwrap();
        let uid = user.user_id.unwrap();
        let profile: UserProfile = read(store.as_ref(), &paths::user(&uid)).unwrap().unwrap();
        assert_eq!(profile.name, "Cee");

        auth.update_profile(Some("Cecilia"), None).unwrap();
        let profile: UserProfile = read(store.as_ref(), &paths::user(&uid)).unwrap().unwrap();
        assert_eq!(profile.name, "Cecilia");
        assert_eq!(auth.current().name.as_deref(), Some("Cecilia"));
    }

    #[test]
    fn update_profile_requires_a_subject() {
        let auth = LocalAuth::new();
        assert_eq!(
            auth.update_profile(Some("x"), None).unwrap_err(),
            AuthError::NotSignedIn
        );
    }
}
