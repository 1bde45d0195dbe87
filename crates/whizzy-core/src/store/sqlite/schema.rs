//! SQLite schema for the local backend.
//!
//! - `accounts` holds one row per email/password account
//! - `session` holds at most one row: the signed-in account
//! - `documents` stores `usuarios` and `grupos` documents as JSON bodies
//! - `store_meta` mirrors the schema version for diagnostics

/// Migration v1: accounts, session, documents and metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS accounts (
    user_id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_salt TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    user_id TEXT NOT NULL REFERENCES accounts(user_id) ON DELETE CASCADE,
    signed_in_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL CHECK (collection IN ('usuarios', 'grupos')),
    doc_id TEXT NOT NULL CHECK (length(doc_id) > 0),
    body TEXT NOT NULL CHECK (json_valid(body)),
    updated_at_us INTEGER NOT NULL,
    PRIMARY KEY (collection, doc_id)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 0);
";

/// Migration v2: lookup index for joining by invite code.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_documents_invite_code
    ON documents(json_extract(body, '$.codigoInvitacion'))
    WHERE collection = 'grupos';
";

/// Migration v3, first half: a normalized lookup key for emails.
///
/// `COLLATE NOCASE` only folds ASCII, so accounts are matched on this key
/// instead. Existing rows are backfilled in Rust before the index is built.
pub const MIGRATION_V3_SQL: &str = r"
ALTER TABLE accounts ADD COLUMN email_key TEXT;
";

/// Migration v3, second half: runs after the backfill.
pub const MIGRATION_V3_INDEX_SQL: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_email_key ON accounts(email_key);
";

/// Indexes that must exist after all migrations have run.
pub const REQUIRED_INDEXES: &[&str] = &["idx_documents_invite_code", "idx_accounts_email_key"];
