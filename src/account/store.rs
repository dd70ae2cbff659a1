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
use super::errors::AccountError;
use super::models::Account;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

const ACCOUNT_COLUMNS: &str =
    "account_id, firstname, lastname, username, email, mobile, password_hash, created_at";

/// Adapter over the account collection.
///
/// Identifier lookups match on username OR email equality. Uniqueness of
/// both columns is enforced at the store layer, so a racing duplicate
/// registration fails on insert even when the manager's pre-check passed.
pub struct CredentialStore {
    conn: Mutex<Connection>,
}

impl CredentialStore {
    /// Open (or create) the account store at the given path and ensure the
    /// schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AccountError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, AccountError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, AccountError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                account_id    BLOB PRIMARY KEY,
                firstname     TEXT NOT NULL,
                lastname      TEXT NOT NULL,
                username      TEXT NOT NULL UNIQUE,
                email         TEXT NOT NULL UNIQUE,
                mobile        TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at    TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Match an account whose username OR email equals `identifier` AND
    /// whose stored digest equals `digest`.
    pub fn find_by_identifier_and_digest(
        &self,
        identifier: &str,
        digest: &str,
    ) -> Result<Option<Account>, AccountError> {
        let conn = self.conn.lock().expect("credential store mutex poisoned");
        let account = conn
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE (username = ?1 OR email = ?1) AND password_hash = ?2"
                ),
                (identifier, digest),
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    /// Match on username OR email equality only. Used for the reset flow
    /// and for duplicate pre-checks.
    pub fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, AccountError> {
        let conn = self.conn.lock().expect("credential store mutex poisoned");
        let account = conn
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE username = ?1 OR email = ?1"
                ),
                (identifier,),
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    /// Insert a new account. A unique-constraint violation on username or
    /// email surfaces as [`AccountError::Duplicate`].
    pub fn insert(&self, account: &Account) -> Result<(), AccountError> {
        let conn = self.conn.lock().expect("credential store mutex poisoned");
        conn.execute(
            &format!("INSERT INTO accounts ({ACCOUNT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            (
                account.account_id,
                &account.firstname,
                &account.lastname,
                &account.username,
                &account.email,
                &account.mobile,
                &account.password_hash,
                account.created_at,
            ),
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AccountError::Duplicate
            }
            other => AccountError::Store(other),
        })?;
        Ok(())
    }

    /// Update the password digest of the account matched by username OR
    /// email equality. Silently a no-op when no account matches.
    pub fn update_password(&self, identifier: &str, new_digest: &str) -> Result<(), AccountError> {
        let conn = self.conn.lock().expect("credential store mutex poisoned");
        conn.execute(
            "UPDATE accounts SET password_hash = ?2 WHERE username = ?1 OR email = ?1",
            (identifier, new_digest),
        )?;
        Ok(())
    }
}

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get(0)?,
        firstname: row.get(1)?,
        lastname: row.get(2)?,
        username: row.get(3)?,
        email: row.get(4)?,
        mobile: row.get(5)?,
        password_hash: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample(username: &str, email: &str) -> Account {
        Account {
            account_id: Uuid::new_v4(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            mobile: "9876543210".to_string(),
            password_hash: "digest".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_find_by_identifier() {
        let store = CredentialStore::open_in_memory().unwrap();
        let account = sample("alice", "alice@x.com");
        store.insert(&account).unwrap();

        let by_username = store.find_by_identifier("alice").unwrap().unwrap();
        let by_email = store.find_by_identifier("alice@x.com").unwrap().unwrap();
        assert_eq!(by_username.account_id, account.account_id);
        assert_eq!(by_email.account_id, account.account_id);
        assert_eq!(by_username.password_hash, "digest");

        assert!(store.find_by_identifier("nobody").unwrap().is_none());
    }

    #[test]
    fn test_find_requires_matching_digest() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.insert(&sample("alice", "alice@x.com")).unwrap();

        assert!(store
            .find_by_identifier_and_digest("alice", "digest")
            .unwrap()
            .is_some());
        assert!(store
            .find_by_identifier_and_digest("alice", "wrong")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_duplicate_username_or_email_rejected() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.insert(&sample("alice", "alice@x.com")).unwrap();

        let same_username = store.insert(&sample("alice", "other@x.com"));
        assert!(matches!(same_username, Err(AccountError::Duplicate)));

        let same_email = store.insert(&sample("bob", "alice@x.com"));
        assert!(matches!(same_email, Err(AccountError::Duplicate)));

        // The failed inserts must not have left partial rows behind.
        assert!(store.find_by_identifier("bob").unwrap().is_none());
        assert!(store.find_by_identifier("other@x.com").unwrap().is_none());
    }

    #[test]
    fn test_update_password_matches_either_identifier() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.insert(&sample("alice", "alice@x.com")).unwrap();

        store.update_password("alice@x.com", "new-digest").unwrap();
        let account = store.find_by_identifier("alice").unwrap().unwrap();
        assert_eq!(account.password_hash, "new-digest");
    }

    #[test]
    fn test_update_password_unknown_identifier_is_noop() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.insert(&sample("alice", "alice@x.com")).unwrap();

        store.update_password("nobody", "new-digest").unwrap();
        let account = store.find_by_identifier("alice").unwrap().unwrap();
        assert_eq!(account.password_hash, "digest");
    }

    #[test]
    fn test_open_at_path_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.db");
        {
            let store = CredentialStore::open(&path).unwrap();
            store.insert(&sample("alice", "alice@x.com")).unwrap();
        }
        let reopened = CredentialStore::open(&path).unwrap();
        assert!(reopened.find_by_identifier("alice").unwrap().is_some());
    }
}
