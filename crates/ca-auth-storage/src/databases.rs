//! Database and index definitions.

/// Account records: account id → Account
pub const DB_USER_ACCOUNTS: &str = "useraccount";

/// Fields indexed on the account database
pub const ACCOUNT_INDEX_FIELDS: &[&str] = &["username", "role", "valid", "created", "updated"];
