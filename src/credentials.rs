use crate::store::Store;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name of the per-user credentials file
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// User data structure representing a registered application user
///
/// This structure contains all the information collected at sign-up. The
/// password is stored as it was entered; login compares it byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name, also the key the marks table is stored under
    pub name: String,

    /// Email address the identity key is derived from
    pub email: String,

    /// Password in plain text
    pub password: String,

    /// Phone number
    pub phone: String,

    /// Date of birth
    pub dob: NaiveDate,
}

/// Derive the identity key from an email address
///
/// The key is the text before the first `@`. An address without an `@`
/// derives to the whole string, so derivation never fails; the empty email
/// derives to the empty key, which can never hold a record.
///
/// # Arguments
/// * `email` - Email address as entered
///
/// # Returns
/// * `&str` - The identity key used to namespace the user's files
///
/// # Examples
/// ```
/// use scorecard::credentials::identity_key;
///
/// assert_eq!(identity_key("alice@example.com"), "alice");
/// ```
pub fn identity_key(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

fn credentials_key(key: &str) -> String {
    format!("{}/{}", key, CREDENTIALS_FILE)
}

/// Check whether a credential record exists for an email's identity key
pub fn credentials_exist(store: &dyn Store, email: &str) -> bool {
    store.exists(&credentials_key(identity_key(email)))
}

/// Persist a user record
///
/// Derives the identity key from the record's email and writes the record as
/// pretty-printed JSON, silently overwriting any existing content. Callers
/// that care about conflicts must check [`credentials_exist`] first.
///
/// # Arguments
/// * `store` - Storage backend
/// * `record` - The user record to persist
///
/// # Returns
/// * `Result<(), String>` - Success or an error message
///
/// # Errors
/// * Returns an error if the record cannot be serialized or written
pub fn save_credentials(store: &dyn Store, record: &UserRecord) -> Result<(), String> {
    let json = match serde_json::to_string_pretty(record) {
        Ok(json) => json,
        Err(_) => return Err("Failed to serialize user data".to_string()),
    };

    let key = credentials_key(identity_key(&record.email));
    if store.put(&key, &json).is_err() {
        return Err("Failed to write user data".to_string());
    }

    Ok(())
}

/// Load a user record by identity key
///
/// # Arguments
/// * `store` - Storage backend
/// * `key` - Identity key (text before the `@` of the user's email)
///
/// # Returns
/// * `Result<Option<UserRecord>, String>` - The record, `None` when no record
///   is stored under the key, or an error message
///
/// # Errors
/// * Returns an error if the stored record cannot be read or parsed
pub fn load_credentials(store: &dyn Store, key: &str) -> Result<Option<UserRecord>, String> {
    let contents = match store.get(&credentials_key(key)) {
        Ok(Some(contents)) => contents,
        Ok(None) => return Ok(None),
        Err(_) => return Err("Failed to read user data".to_string()),
    };

    match serde_json::from_str(&contents) {
        Ok(record) => Ok(Some(record)),
        Err(_) => Err("Failed to parse user data".to_string()),
    }
}
