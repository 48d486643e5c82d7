//! SQLite-based persistence layer
//!
//! This module provides:
//! - Database initialization and migrations
//! - CRUD operations for sessions, messages and artifacts
//! - Connection pooling
//! - `SqliteSessionStore`, the durable `SessionStore`

mod migrations;
mod queries;

pub use migrations::run_migrations;
pub use queries::*;

use crate::error::{Error, Result, StorageError};
use crate::services::SessionStore;
use crate::types::{GeneratedArtifact, Message, Session, SessionId, SessionRecord};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::{Path, PathBuf};
use tracing::info;

/// Database connection pool type
pub type DbPool = Pool<SqliteConnectionManager>;

const DB_FILE_NAME: &str = "crafti.db";

/// Storage manager for database operations
pub struct Storage {
    pool: DbPool,
    db_path: PathBuf,
}

impl Storage {
    /// Create a new storage instance with a directory path
    pub fn new_with_path(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();

        std::fs::create_dir_all(data_dir).map_err(|e| {
            Error::Storage(StorageError::Database(format!(
                "Failed to create data directory: {}",
                e
            )))
        })?;

        Self::from_path(data_dir.join(DB_FILE_NAME))
    }

    /// Create storage from a specific database file
    pub fn from_path(db_path: PathBuf) -> Result<Self> {
        let manager = SqliteConnectionManager::file(&db_path)
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| Error::Storage(StorageError::Pool(e.to_string())))?;

        let storage = Self { pool, db_path };
        storage.initialize()?;

        Ok(storage)
    }

    /// Create in-memory storage (for testing)
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| Error::Storage(StorageError::Pool(e.to_string())))?;

        let storage = Self {
            pool,
            db_path: PathBuf::from(":memory:"),
        };

        storage.initialize()?;

        Ok(storage)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.pool.get()?;
        run_migrations(&conn)?;
        info!("Database initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| Error::Storage(StorageError::Pool(e.to_string())))
    }

    /// Database file, `:memory:` for in-memory storage
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Durable session store on top of `Storage`
pub struct SqliteSessionStore {
    storage: Storage,
}

impl SqliteSessionStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    fn ensure_exists(conn: &rusqlite::Connection, id: &SessionId) -> Result<()> {
        match get_session(conn, id)? {
            Some(_) => Ok(()),
            None => Err(Error::Storage(StorageError::NotFound(id.to_string()))),
        }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn list(&self) -> Result<Vec<Session>> {
        let conn = self.storage.connection()?;
        list_sessions(&conn)
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let conn = self.storage.connection()?;
        let Some(session) = get_session(&conn, id)? else {
            return Ok(None);
        };

        Ok(Some(SessionRecord {
            transcript: get_session_messages(&conn, id)?,
            artifact: get_artifact(&conn, id)?,
            session,
        }))
    }

    async fn create(&self, record: &SessionRecord) -> Result<()> {
        let mut conn = self.storage.connection()?;
        if get_session(&conn, record.id())?.is_some() {
            return Err(Error::Storage(StorageError::DuplicateKey(record.id().to_string())));
        }

        let tx = conn.transaction()?;
        insert_session(&tx, &record.session)?;
        for message in &record.transcript {
            insert_message(&tx, record.id(), message)?;
        }
        if let Some(artifact) = &record.artifact {
            upsert_artifact(&tx, record.id(), artifact)?;
        }
        tx.commit()?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let conn = self.storage.connection()?;
        if update_session(&conn, session)? == 0 {
            return Err(Error::Storage(StorageError::NotFound(session.id.to_string())));
        }
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<()> {
        let conn = self.storage.connection()?;
        delete_session(&conn, id)
    }

    async fn append_message(&self, id: &SessionId, message: &Message) -> Result<()> {
        let conn = self.storage.connection()?;
        Self::ensure_exists(&conn, id)?;
        insert_message(&conn, id, message)
    }

    async fn set_artifact(&self, id: &SessionId, artifact: &GeneratedArtifact) -> Result<()> {
        let conn = self.storage.connection()?;
        Self::ensure_exists(&conn, id)?;
        upsert_artifact(&conn, id, artifact)
    }
}
