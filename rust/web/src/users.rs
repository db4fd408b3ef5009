//! In-memory user directory: username validation, identity allocation and
//! online tracking. Long-term persistence (accounts, leaderboards) is the
//! job of an external store and is not handled here.

use std::collections::HashMap;
use std::sync::RwLock;

use bluffpoker_engine::player::User;
use thiserror::Error;
use uuid::Uuid;

/// Maximum accepted username length.
pub const MAX_USERNAME_LEN: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("Username cannot be empty")]
    EmptyUsername,
    #[error("Username too long (max {MAX_USERNAME_LEN} characters)")]
    UsernameTooLong,
    #[error("This username exists and is online, choose another username")]
    UsernameOnline,
    #[error("user directory lock poisoned")]
    StoragePoisoned,
}

#[derive(Debug, Default)]
struct DirectoryInner {
    by_id: HashMap<String, User>,
    id_by_name: HashMap<String, String>,
}

/// Registry of currently connected users.
#[derive(Debug, Default)]
pub struct UserDirectory {
    inner: RwLock<DirectoryInner>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the username and bring the user online with a fresh id.
    pub fn connect(&self, username: &str) -> Result<User, UserError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserError::EmptyUsername);
        }
        if username.len() > MAX_USERNAME_LEN {
            return Err(UserError::UsernameTooLong);
        }

        let mut inner = self
            .inner
            .write()
            .map_err(|_| UserError::StoragePoisoned)?;
        if inner.id_by_name.contains_key(username) {
            return Err(UserError::UsernameOnline);
        }

        let user = User::new(Uuid::new_v4().to_string(), username);
        inner.id_by_name.insert(username.to_string(), user.id.clone());
        inner.by_id.insert(user.id.clone(), user.clone());

        tracing::info!(user_id = %user.id, username = %user.username, "user connected");
        Ok(user)
    }

    /// Take the user offline; returns the departed identity if it was known.
    pub fn disconnect(&self, user_id: &str) -> Result<Option<User>, UserError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| UserError::StoragePoisoned)?;
        let user = inner.by_id.remove(user_id);
        if let Some(user) = &user {
            inner.id_by_name.remove(&user.username);
            tracing::info!(user_id = %user.id, username = %user.username, "user disconnected");
        }
        Ok(user)
    }

    pub fn get(&self, user_id: &str) -> Result<Option<User>, UserError> {
        let inner = self.inner.read().map_err(|_| UserError::StoragePoisoned)?;
        Ok(inner.by_id.get(user_id).cloned())
    }

    pub fn is_online(&self, username: &str) -> Result<bool, UserError> {
        let inner = self.inner.read().map_err(|_| UserError::StoragePoisoned)?;
        Ok(inner.id_by_name.contains_key(username))
    }

    pub fn online_count(&self) -> Result<usize, UserError> {
        let inner = self.inner.read().map_err(|_| UserError::StoragePoisoned)?;
        Ok(inner.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_allocates_distinct_ids() {
        let dir = UserDirectory::new();
        let a = dir.connect("alice").unwrap();
        let b = dir.connect("bob").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(dir.online_count().unwrap(), 2);
    }

    #[test]
    fn username_validation() {
        let dir = UserDirectory::new();
        assert_eq!(dir.connect(""), Err(UserError::EmptyUsername));
        assert_eq!(dir.connect("   "), Err(UserError::EmptyUsername));
        assert_eq!(
            dir.connect("abcdefghijklmnopqrstu"),
            Err(UserError::UsernameTooLong)
        );
        assert!(dir.connect("  alice  ").is_ok(), "whitespace is trimmed");
    }

    #[test]
    fn online_username_cannot_be_taken() {
        let dir = UserDirectory::new();
        dir.connect("alice").unwrap();
        assert_eq!(dir.connect("alice"), Err(UserError::UsernameOnline));
    }

    #[test]
    fn disconnect_frees_the_username() {
        let dir = UserDirectory::new();
        let alice = dir.connect("alice").unwrap();
        assert!(dir.is_online("alice").unwrap());

        let departed = dir.disconnect(&alice.id).unwrap();
        assert_eq!(departed.map(|u| u.username), Some("alice".to_string()));
        assert!(!dir.is_online("alice").unwrap());
        assert!(dir.connect("alice").is_ok());
    }
}
