//! Session persistence interface and the in-memory store

use crate::error::{Error, Result, StorageError};
use crate::types::{GeneratedArtifact, Message, Session, SessionId, SessionRecord};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Where session records live. Listing order is newest-created first.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Session metadata, newest first
    async fn list(&self) -> Result<Vec<Session>>;

    /// Full record including transcript and artifact
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>>;

    /// Insert a record at the front of the collection
    async fn create(&self, record: &SessionRecord) -> Result<()>;

    /// Replace the metadata of an existing session
    async fn update(&self, session: &Session) -> Result<()>;

    async fn delete(&self, id: &SessionId) -> Result<()>;

    async fn append_message(&self, id: &SessionId, message: &Message) -> Result<()>;

    /// Attach or replace the session's artifact
    async fn set_artifact(&self, id: &SessionId, artifact: &GeneratedArtifact) -> Result<()>;
}

fn not_found(id: &SessionId) -> Error {
    Error::Storage(StorageError::NotFound(id.to_string()))
}

/// Volatile store backed by a vector
#[derive(Default)]
pub struct InMemorySessionStore {
    records: RwLock<Vec<SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn list(&self) -> Result<Vec<Session>> {
        let records = self.records.read().await;
        Ok(records.iter().map(|r| r.session.clone()).collect())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn create(&self, record: &SessionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(Error::Storage(StorageError::DuplicateKey(record.id().to_string())));
        }
        debug!("Storing session {}", record.id());
        records.insert(0, record.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == &session.id)
            .ok_or_else(|| not_found(&session.id))?;
        record.session = session.clone();
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<()> {
        let mut records = self.records.write().await;
        records.retain(|r| r.id() != id);
        Ok(())
    }

    async fn append_message(&self, id: &SessionId, message: &Message) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found(id))?;
        record.transcript.push(message.clone());
        Ok(())
    }

    async fn set_artifact(&self, id: &SessionId, artifact: &GeneratedArtifact) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found(id))?;
        record.artifact = Some(artifact.clone());
        Ok(())
    }
}
