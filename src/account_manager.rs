// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use crate::account::errors::AccountError;
use crate::account::models::{Account, Registration};
use crate::account::store::CredentialStore;
use chrono::Utc;
use uuid::Uuid;

/// Deterministic one-way digest for stored credentials.
///
/// No per-account salt is used, so login can verify by digest equality and
/// the digest for a given password is stable across calls. This also means
/// the store is vulnerable to precomputed-hash lookups; see DESIGN.md.
pub fn hash_password(password: &str) -> String {
    blake3::hash(password.as_bytes()).to_hex().to_string()
}

/// Registration, login verification, and password reset over the
/// credential store.
///
/// Input validity (password strength, phone format, confirm-password
/// equality) is the caller's concern; this component does not re-validate.
pub struct AccountManager {
    store: CredentialStore,
}

impl AccountManager {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    /// Create a new account. Fails with [`AccountError::Duplicate`] when
    /// the username OR the email matches any existing account's username
    /// or email; no write occurs in that case. The check is deliberately
    /// cross-field: login accepts either column as the identifier, so a
    /// username equal to another account's email would make that
    /// identifier ambiguous. Within each column the store's unique
    /// indexes back this pre-check up, so a racing same-column duplicate
    /// still cannot produce two rows.
    pub fn register(&self, reg: &Registration) -> Result<Account, AccountError> {
        if self.store.find_by_identifier(&reg.username)?.is_some()
            || self.store.find_by_identifier(&reg.email)?.is_some()
        {
            return Err(AccountError::Duplicate);
        }

        let account = Account {
            account_id: Uuid::new_v4(),
            firstname: reg.firstname.clone(),
            lastname: reg.lastname.clone(),
            username: reg.username.clone(),
            email: reg.email.clone(),
            mobile: reg.mobile.clone(),
            password_hash: hash_password(&reg.password),
            created_at: Utc::now(),
        };
        self.store.insert(&account)?;
        tracing::info!(username = %account.username, "account registered");
        Ok(account)
    }

    /// Verify credentials. Wrong identifier and wrong password are
    /// indistinguishable: both yield `None`, and callers surface a single
    /// generic invalid-credentials message.
    pub fn login(&self, identifier: &str, password: &str) -> Result<Option<Account>, AccountError> {
        let digest = hash_password(password);
        self.store.find_by_identifier_and_digest(identifier, &digest)
    }

    /// Whether any account matches the identifier by username or email.
    pub fn identifier_exists(&self, identifier: &str) -> Result<bool, AccountError> {
        Ok(self.store.find_by_identifier(identifier)?.is_some())
    }

    /// Hash and write a new password for the matched account.
    pub fn reset_password(&self, identifier: &str, new_password: &str) -> Result<(), AccountError> {
        let digest = hash_password(new_password);
        self.store.update_password(identifier, &digest)?;
        tracing::info!(identifier = %identifier, "password reset");
        Ok(())
    }
}
