//! Account store consulted by [`crate::ReservationSystem`].
//!
//! Passwords are kept as a bare SHA-256 digest. This is not hardened storage.

use railway_ledger_core::sha256_hex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ServiceError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserAccount {
    pub username: String,
    pub password_digest: String,
    pub personal_info: PersonalInfo,
    pub registration_time: u64,
}

/// User and admin credentials. The ledger and the contract never see this.
pub trait UserDirectory {
    /// Fails with [`ServiceError::UserAlreadyExists`] for a taken username.
    fn register(
        &mut self,
        username: &str,
        password: &str,
        personal_info: PersonalInfo,
        registration_time: u64,
    ) -> Result<(), ServiceError>;

    fn authenticate(&self, username: &str, password: &str) -> bool;

    fn contains(&self, username: &str) -> bool;

    fn verify_admin(&self, username: &str, password: &str) -> bool;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, UserAccount>,
    admins: HashMap<String, String>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(mut self, username: impl Into<String>, password: &str) -> Self {
        self.admins.insert(username.into(), password_digest(password));
        self
    }

    pub fn account(&self, username: &str) -> Option<&UserAccount> {
        self.users.get(username)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn register(
        &mut self,
        username: &str,
        password: &str,
        personal_info: PersonalInfo,
        registration_time: u64,
    ) -> Result<(), ServiceError> {
        if self.users.contains_key(username) {
            return Err(ServiceError::UserAlreadyExists(username.to_string()));
        }
        self.users.insert(
            username.to_string(),
            UserAccount {
                username: username.to_string(),
                password_digest: password_digest(password),
                personal_info,
                registration_time,
            },
        );
        Ok(())
    }

    fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|account| account.password_digest == password_digest(password))
    }

    fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    fn verify_admin(&self, username: &str, password: &str) -> bool {
        self.admins
            .get(username)
            .is_some_and(|digest| *digest == password_digest(password))
    }
}

pub fn password_digest(password: &str) -> String {
    sha256_hex(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> PersonalInfo {
        PersonalInfo {
            name: "Alice Smith".to_string(),
            email: "alice@example.com".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[test]
    fn register_and_authenticate() {
        let mut directory = InMemoryUserDirectory::new();
        directory.register("alice", "s3cret", info(), 42).unwrap();
        assert!(directory.contains("alice"));
        assert!(directory.authenticate("alice", "s3cret"));
        assert!(!directory.authenticate("alice", "wrong"));
        assert!(!directory.authenticate("bob", "s3cret"));

        let account = directory.account("alice").unwrap();
        assert_eq!(account.password_digest, sha256_hex("s3cret"));
        assert_eq!(account.registration_time, 42);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let mut directory = InMemoryUserDirectory::new();
        directory.register("alice", "one", info(), 1).unwrap();
        let err = directory.register("alice", "two", info(), 2).unwrap_err();
        assert_eq!(err, ServiceError::UserAlreadyExists("alice".to_string()));
        assert!(directory.authenticate("alice", "one"));
        assert_eq!(directory.user_count(), 1);
    }

    #[test]
    fn admin_credentials() {
        let directory = InMemoryUserDirectory::new().with_admin("admin", "letmein");
        assert!(directory.verify_admin("admin", "letmein"));
        assert!(!directory.verify_admin("admin", "nope"));
        assert!(!directory.verify_admin("root", "letmein"));
        assert!(!directory.contains("admin"));
    }
}
