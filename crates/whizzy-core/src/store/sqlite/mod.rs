//! SQLite-backed implementation of the backend traits.
//!
//! Runtime pragmas match every other connection we open:
//! - `journal_mode = WAL` so a second CLI process can read while one writes
//! - `busy_timeout = 5s` to ride out short lock contention
//! - `foreign_keys = ON` so the session row follows its account

pub mod migrations;
pub mod schema;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tracing::debug;

use super::credentials::{self, PasswordDigest};
use super::document::{Collection, GroupDocument, ProfileDocument};
use super::{AuthService, AuthUser, DocumentStore, GroupPatch, NewGroup, ProfileFields, StoreError};
use crate::error::{Result, WhizzyError};
use crate::model::{Group, GroupId, Profile, UserId};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Accounts, session and documents in one SQLite file.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Open (or create) the store at `path` and migrate it to the latest schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or opening,
    /// configuring, or migrating the database fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path).map_err(StoreError::from)?;
        let backend = Self::from_connection(conn, Some(path.to_path_buf()))?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(backend)
    }

    /// A private in-memory database, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if migrating the database fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        Self::from_connection(conn, None)
    }

    fn from_connection(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        configure_connection(&conn).map_err(StoreError::from)?;
        migrations::migrate(&mut conn).map_err(StoreError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// File backing this store, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

fn now_us() -> i64 {
    Utc::now().timestamp_micros()
}

fn read_doc<T: DeserializeOwned>(
    conn: &Connection,
    collection: Collection,
    id: &str,
) -> StoreResult<Option<T>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![collection.as_str(), id],
            |row| row.get(0),
        )
        .optional()?;
    body.map(|body| serde_json::from_str(&body))
        .transpose()
        .map_err(StoreError::from)
}

fn write_doc<T: Serialize>(
    conn: &Connection,
    collection: Collection,
    id: &str,
    doc: &T,
) -> StoreResult<()> {
    let body = serde_json::to_string(doc)?;
    conn.execute(
        "INSERT INTO documents (collection, doc_id, body, updated_at_us)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (collection, doc_id)
         DO UPDATE SET body = excluded.body, updated_at_us = excluded.updated_at_us",
        params![collection.as_str(), id, body, now_us()],
    )?;
    Ok(())
}

fn query_groups<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<Group>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut groups = Vec::new();
    for row in rows {
        let (id, body) = row?;
        let doc: GroupDocument = serde_json::from_str(&body)?;
        groups.push(doc.into_group(GroupId::from(id)));
    }
    Ok(groups)
}

fn update_profile_doc(
    conn: &Connection,
    user: &UserId,
    edit: impl FnOnce(&mut ProfileDocument),
) -> StoreResult<()> {
    let tx = conn.unchecked_transaction()?;
    let mut doc: ProfileDocument =
        read_doc(&tx, Collection::Profiles, user.as_str())?.unwrap_or_default();
    edit(&mut doc);
    write_doc(&tx, Collection::Profiles, user.as_str(), &doc)?;
    tx.commit()?;
    Ok(())
}

fn set_session(conn: &Connection, user: &UserId) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO session (id, user_id, signed_in_at_us) VALUES (1, ?1, ?2)
         ON CONFLICT (id) DO UPDATE SET
             user_id = excluded.user_id,
             signed_in_at_us = excluded.signed_in_at_us",
        params![user.as_str(), now_us()],
    )?;
    Ok(())
}

/// Insert a new account row. A unique-key clash means the email is taken,
/// even when another process won the race after our lookup.
fn insert_account(
    conn: &Connection,
    user: &AuthUser,
    email_key: &str,
    digest: &PasswordDigest,
) -> Result<()> {
    conn.execute(
        "INSERT INTO accounts
             (user_id, email, email_key, password_salt, password_hash, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.as_str(),
            user.email,
            email_key,
            digest.salt,
            digest.hash,
            now_us()
        ],
    )
    .map_err(|err| match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            WhizzyError::EmailInUse(email_key.to_string())
        }
        other => StoreError::from(other).into(),
    })?;
    Ok(())
}

impl AuthService for SqliteBackend {
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        credentials::check_signup_input(email, password)?;
        let email = email.trim();
        let email_key = credentials::normalize_email(email);
        let conn = self.conn();

        let taken: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE email_key = ?1)",
                [&email_key],
                |row| row.get(0),
            )
            .map_err(StoreError::from)?;
        if taken {
            return Err(WhizzyError::EmailInUse(email_key));
        }

        let user = AuthUser {
            id: UserId::generate(),
            email: email.to_string(),
        };
        insert_account(&conn, &user, &email_key, &PasswordDigest::derive(password))?;
        set_session(&conn, &user.id)?;
        debug!(user = %user.id, "account created");
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let conn = self.conn();
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT user_id, email, password_salt, password_hash
                 FROM accounts WHERE email_key = ?1",
                [credentials::normalize_email(email)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(StoreError::from)?;

        let Some((id, stored_email, salt, hash)) = row else {
            return Err(WhizzyError::InvalidCredentials);
        };
        let digest = PasswordDigest { salt, hash };
        if !digest.verify(password) {
            return Err(WhizzyError::InvalidCredentials);
        }

        let user = AuthUser {
            id: UserId::from(id),
            email: stored_email,
        };
        set_session(&conn, &user.id)?;
        Ok(user)
    }

    fn sign_out(&self) -> Result<()> {
        self.conn()
            .execute("DELETE FROM session", [])
            .map_err(StoreError::from)?;
        Ok(())
    }

    fn current_user(&self) -> Result<Option<AuthUser>> {
        let user = self
            .conn()
            .query_row(
                "SELECT a.user_id, a.email
                 FROM session s JOIN accounts a ON a.user_id = s.user_id
                 WHERE s.id = 1",
                [],
                |row| {
                    Ok(AuthUser {
                        id: UserId::from(row.get::<_, String>(0)?),
                        email: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(user)
    }
}

impl DocumentStore for SqliteBackend {
    fn get_profile(&self, user: &UserId) -> Result<Option<Profile>> {
        let doc: Option<ProfileDocument> =
            read_doc(&self.conn(), Collection::Profiles, user.as_str())?;
        Ok(doc.map(|doc| doc.into_profile(user.clone())))
    }

    fn set_profile(&self, user: &UserId, fields: &ProfileFields) -> Result<()> {
        update_profile_doc(&self.conn(), user, |doc| doc.merge(fields))?;
        Ok(())
    }

    fn set_group_ref(&self, user: &UserId, group: &GroupId) -> Result<()> {
        update_profile_doc(&self.conn(), user, |doc| {
            doc.group_id = Some(group.to_string());
        })?;
        Ok(())
    }

    fn create_group(&self, group: &NewGroup) -> Result<GroupId> {
        let id = GroupId::generate();
        write_doc(
            &self.conn(),
            Collection::Groups,
            id.as_str(),
            &GroupDocument::from(group),
        )?;
        debug!(group = %id, "group document created");
        Ok(id)
    }

    fn get_group(&self, group: &GroupId) -> Result<Option<Group>> {
        let doc: Option<GroupDocument> = read_doc(&self.conn(), Collection::Groups, group.as_str())?;
        Ok(doc.map(|doc| doc.into_group(group.clone())))
    }

    fn update_group(&self, group: &GroupId, patch: &GroupPatch) -> Result<()> {
        let conn = self.conn();
        let tx = conn.unchecked_transaction().map_err(StoreError::from)?;
        let mut doc: GroupDocument = read_doc(&tx, Collection::Groups, group.as_str())?
            .ok_or_else(|| StoreError::Missing {
                collection: Collection::Groups,
                id: group.to_string(),
            })?;
        doc.apply(patch);
        write_doc(&tx, Collection::Groups, group.as_str(), &doc)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    fn query_groups_by_member(&self, user: &UserId) -> Result<Vec<Group>> {
        let groups = query_groups(
            &self.conn(),
            "SELECT d.doc_id, d.body FROM documents d
             WHERE d.collection = 'grupos'
               AND EXISTS (
                   SELECT 1 FROM json_each(d.body, '$.miembros') m WHERE m.value = ?1
               )
             ORDER BY d.doc_id",
            [user.as_str()],
        )?;
        Ok(groups)
    }

    fn query_groups_by_invite_code(&self, code: &str) -> Result<Vec<Group>> {
        let groups = query_groups(
            &self.conn(),
            "SELECT doc_id, body FROM documents
             WHERE collection = 'grupos'
               AND json_extract(body, '$.codigoInvitacion') = ?1
             ORDER BY doc_id",
            [code],
        )?;
        Ok(groups)
    }

    fn delete_group(&self, group: &GroupId) -> Result<()> {
        self.conn()
            .execute(
                "DELETE FROM documents WHERE collection = 'grupos' AND doc_id = ?1",
                [group.as_str()],
            )
            .map_err(StoreError::from)?;
        Ok(())
    }
}
