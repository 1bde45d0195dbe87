//! Forward-only schema migrations for the local backend.

use super::schema;
use crate::store::credentials::normalize_email;
use rusqlite::{Connection, Transaction, params, types::Type};

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 3;

/// Data fix-up run inside a migration's transaction, after its SQL.
type Backfill = fn(&Transaction<'_>) -> rusqlite::Result<()>;

const MIGRATIONS: &[(u32, &str, Option<Backfill>)] = &[
    (1, schema::MIGRATION_V1_SQL, None),
    (2, schema::MIGRATION_V2_SQL, None),
    (3, schema::MIGRATION_V3_SQL, Some(backfill_email_keys)),
];

/// Fill `accounts.email_key` for rows written before v3, then index it.
fn backfill_email_keys(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare("SELECT user_id, email FROM accounts WHERE email_key IS NULL")?;
    let accounts = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    drop(stmt);

    for (user_id, email) in accounts {
        tx.execute(
            "UPDATE accounts SET email_key = ?1 WHERE user_id = ?2",
            params![normalize_email(&email), user_id],
        )?;
    }
    tx.execute_batch(schema::MIGRATION_V3_INDEX_SQL)
}

/// Read `PRAGMA user_version` as a `u32`.
///
/// # Errors
///
/// Returns an error if querying SQLite fails or the stored value is negative
/// or too large.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error))
    })
}

/// Apply all pending migrations in ascending order, each in its own
/// transaction. Already-applied versions are skipped.
///
/// # Errors
///
/// Returns an error if any migration fails.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let mut current = current_schema_version(conn)?;

    for (version, sql, backfill) in MIGRATIONS {
        if *version <= current {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        if let Some(backfill) = backfill {
            backfill(&tx)?;
        }
        tx.pragma_update(None, "user_version", i64::from(*version))?;
        tx.execute(
            "UPDATE store_meta SET schema_version = ?1 WHERE id = 1",
            [i64::from(*version)],
        )?;
        tx.commit()?;
        current = *version;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::{LATEST_SCHEMA_VERSION, current_schema_version, migrate};
    use crate::store::sqlite::schema;
    use rusqlite::{Connection, params};

    fn sqlite_object_exists(conn: &Connection, kind: &str, name: &str) -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2)",
            params![kind, name],
            |row| row.get(0),
        )
    }

    #[test]
    fn migrate_empty_db_to_latest() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);
        assert_eq!(current_schema_version(&conn)?, LATEST_SCHEMA_VERSION);

        for table in ["accounts", "session", "documents", "store_meta"] {
            assert!(sqlite_object_exists(&conn, "table", table)?, "missing {table}");
        }
        for index in schema::REQUIRED_INDEXES {
            assert!(sqlite_object_exists(&conn, "index", index)?, "missing {index}");
        }
        Ok(())
    }

    #[test]
    fn migrate_is_idempotent() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);
        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);

        let rows: i64 = conn.query_row("SELECT COUNT(*) FROM store_meta", [], |row| row.get(0))?;
        assert_eq!(rows, 1);
        let version: i64 = conn.query_row(
            "SELECT schema_version FROM store_meta WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(version, i64::from(LATEST_SCHEMA_VERSION));
        Ok(())
    }

    #[test]
    fn upgrade_from_v1_keeps_documents() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::MIGRATION_V1_SQL)?;
        conn.pragma_update(None, "user_version", 1_i64)?;
        conn.execute(
            "INSERT INTO documents (collection, doc_id, body, updated_at_us)
             VALUES ('grupos', 'g1', '{\"codigoInvitacion\":\"k3x9qa\"}', 1)",
            [],
        )?;

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);

        let hits: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents
             WHERE collection = 'grupos'
               AND json_extract(body, '$.codigoInvitacion') = 'k3x9qa'",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(hits, 1);
        Ok(())
    }

    #[test]
    fn upgrade_from_v2_backfills_email_keys() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::MIGRATION_V1_SQL)?;
        conn.execute_batch(schema::MIGRATION_V2_SQL)?;
        conn.pragma_update(None, "user_version", 2_i64)?;
        conn.execute(
            "INSERT INTO accounts (user_id, email, password_salt, password_hash, created_at_us)
             VALUES ('u1', ' ÁLVARO@Example.com', 's', 'h', 1)",
            [],
        )?;

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);

        let key: String = conn.query_row(
            "SELECT email_key FROM accounts WHERE user_id = 'u1'",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(key, "álvaro@example.com");

        let duplicate = conn.execute(
            "INSERT INTO accounts
                 (user_id, email, email_key, password_salt, password_hash, created_at_us)
             VALUES ('u2', 'álvaro@example.com', 'álvaro@example.com', 's', 'h', 2)",
            [],
        );
        assert!(duplicate.is_err());
        Ok(())
    }

    #[test]
    fn documents_reject_invalid_json() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;
        let result = conn.execute(
            "INSERT INTO documents (collection, doc_id, body, updated_at_us)
             VALUES ('grupos', 'g1', 'not json', 1)",
            [],
        );
        assert!(result.is_err());
        Ok(())
    }
}
