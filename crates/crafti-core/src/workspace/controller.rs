//! Workspace controller
//!
//! Owns the `WorkspaceState`, feeds intents through `reduce`, and carries out
//! the resulting effects against the session store and generation service.
//! Generation runs as one tokio task per session; results come back over a
//! channel and are applied by `apply_completion`.

use super::intent::{Effect, Intent, Notification};
use super::reducer::reduce;
use super::state::{GenerationTicket, WorkspaceState};
use crate::demo;
use crate::error::{Error, ExportError, Result, WorkspaceError};
use crate::presentation::{self, ChatView, PropertyEditorView, SessionListView};
use crate::services::*;
use crate::storage::{SqliteSessionStore, Storage};
use crate::types::*;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Outcome of a background generation, addressed to its originating session
#[derive(Debug)]
pub struct Completion {
    pub session_id: SessionId,
    pub ticket: GenerationTicket,
    pub outcome: std::result::Result<Generation, String>,
}

impl From<Completion> for Intent {
    fn from(c: Completion) -> Self {
        match c.outcome {
            Ok(generation) => Intent::GenerationFinished {
                session_id: c.session_id,
                ticket: c.ticket,
                generation,
            },
            Err(reason) => Intent::GenerationFailed {
                session_id: c.session_id,
                ticket: c.ticket,
                reason,
            },
        }
    }
}

/// Broadcast to subscribed presentation surfaces
#[derive(Debug, Clone)]
pub enum WorkspaceEvent {
    /// New state snapshot after a transition
    Changed(Arc<WorkspaceState>),
    Notified(Notification),
}

pub struct WorkspaceController {
    state: WorkspaceState,
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn GenerationService>,
    exporter: Arc<dyn Exporter>,
    policy: RetryPolicy,
    tasks: HashMap<SessionId, (GenerationTicket, JoinHandle<()>)>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    events: broadcast::Sender<WorkspaceEvent>,
}

impl WorkspaceController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn GenerationService>,
        exporter: Arc<dyn Exporter>,
        policy: RetryPolicy,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: WorkspaceState::default(),
            store,
            generator,
            exporter,
            policy,
            tasks: HashMap::new(),
            completion_tx,
            completion_rx,
            events,
        }
    }

    /// Build a controller from settings: pick the store backend, seed demo
    /// sessions into an empty store and load the session list.
    pub async fn open(settings: &StudioSettings) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match settings.storage_backend {
            StorageBackend::Memory => Arc::new(InMemorySessionStore::new()),
            StorageBackend::Sqlite => {
                let storage = Storage::new_with_path(settings.resolved_data_dir())?;
                info!("Session database: {}", storage.db_path().display());
                Arc::new(SqliteSessionStore::new(storage))
            }
        };
        let generator = Arc::new(CannedGenerationService::new(settings.generation_delay()));
        let policy = RetryPolicy {
            timeout: settings.generation_timeout(),
            max_attempts: settings.max_generation_attempts,
        };

        let mut controller = Self::new(store, generator, Arc::new(JsonBundleExporter), policy);
        if settings.seed_demo_sessions {
            controller.seed_if_empty().await?;
        }
        controller.reload().await?;

        info!(
            "Workspace opened with {} sessions ({:?} store)",
            controller.state.sessions.len(),
            settings.storage_backend
        );
        Ok(controller)
    }

    async fn seed_if_empty(&self) -> Result<()> {
        if !self.store.list().await?.is_empty() {
            return Ok(());
        }
        // Oldest first so the newest seed ends up on top
        for record in demo::seed_records().into_iter().rev() {
            self.store.create(&record).await?;
        }
        debug!("Seeded demo sessions");
        Ok(())
    }

    /// Refresh the session list from the store
    pub async fn reload(&mut self) -> Result<()> {
        self.state.sessions = self.store.list().await?;
        self.publish();
        Ok(())
    }

    // ===== State access =====

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn view(&self) -> &View {
        &self.state.view
    }

    pub fn sessions(&self) -> &[Session] {
        &self.state.sessions
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.state.active_session()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.state.transcript
    }

    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        self.state.artifact.as_ref()
    }

    pub fn is_generating(&self, id: &SessionId) -> bool {
        self.state.is_generating(id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.events.subscribe()
    }

    pub fn session_list(&self, query: &str) -> SessionListView {
        presentation::session_list(&self.state, query)
    }

    pub fn chat_view(&self) -> Option<ChatView> {
        presentation::chat_view(&self.state)
    }

    pub fn property_editor_view(&self) -> Option<PropertyEditorView> {
        presentation::property_editor_view(&self.state)
    }

    // ===== Intents =====

    pub async fn create_session(&mut self) -> Result<SessionId> {
        self.dispatch(Intent::CreateSession).await?;
        self.state
            .active_session_id()
            .cloned()
            .ok_or_else(|| Error::Internal("created session is not active".to_string()))
    }

    pub async fn select_session(&mut self, id: &SessionId) -> Result<()> {
        self.dispatch(Intent::SelectSession(id.clone())).await
    }

    /// Unconditional delete; confirmation is up to the caller
    pub async fn delete_session(&mut self, id: &SessionId) -> Result<()> {
        self.dispatch(Intent::DeleteSession(id.clone())).await
    }

    /// Returns the id of the copy
    pub async fn duplicate_session(&mut self, id: &SessionId) -> Result<SessionId> {
        self.dispatch(Intent::DuplicateSession(id.clone())).await?;
        self.state
            .sessions
            .first()
            .map(|s| s.id.clone())
            .ok_or_else(|| Error::Internal("duplicate missing from session list".to_string()))
    }

    pub async fn rename_session(
        &mut self,
        id: &SessionId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<()> {
        self.dispatch(Intent::RenameSession {
            id: id.clone(),
            name: name.into(),
            description,
        })
        .await
    }

    pub async fn send_message(
        &mut self,
        text: impl Into<String>,
        image: Option<ImageRef>,
    ) -> Result<()> {
        self.dispatch(Intent::SendMessage {
            text: text.into(),
            image,
        })
        .await
    }

    pub async fn cancel_generation(&mut self, id: &SessionId) -> Result<()> {
        self.dispatch(Intent::CancelGeneration(id.clone())).await
    }

    pub async fn return_to_sessions(&mut self) -> Result<()> {
        self.dispatch(Intent::ReturnToSessions).await
    }

    pub async fn open_property_editor(&mut self, element: SelectedElement) -> Result<()> {
        self.dispatch(Intent::OpenPropertyEditor(element)).await
    }

    pub async fn close_property_editor(&mut self) -> Result<()> {
        self.dispatch(Intent::ClosePropertyEditor).await
    }

    pub async fn change_property(&mut self, property: ElementProperty) -> Result<()> {
        self.dispatch(Intent::ChangeProperty(property)).await
    }

    /// Package the active session's artifact
    pub fn export_active(&self) -> Result<Blob> {
        if self.state.active_session_id().is_none() {
            return Err(WorkspaceError::NoActiveSession.into());
        }
        let artifact = self.state.artifact.as_ref().ok_or(ExportError::EmptyArtifact)?;
        self.exporter.export(artifact)
    }

    // ===== Background completions =====

    /// Wait for the next finished generation. Cancel-safe; pass the result
    /// to `apply_completion`.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completion_rx.recv().await
    }

    pub async fn apply_completion(&mut self, completion: Completion) -> Result<()> {
        let session_id = completion.session_id.clone();
        let ticket = completion.ticket;
        if matches!(self.tasks.get(&session_id), Some((running, _)) if *running == ticket) {
            self.tasks.remove(&session_id);
        }

        let err = match self.dispatch(completion.into()).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        // The result could not be stored; release the session so it can be retried
        if self.state.pending_ticket(&session_id) == Some(ticket) {
            warn!("Failed to store generation result for {}: {}", session_id, err);
            self.dispatch(Intent::GenerationFailed {
                session_id,
                ticket,
                reason: err.to_string(),
            })
            .await?;
        }
        Err(err)
    }

    /// Wait for one generation to finish and apply it. Returns its session.
    pub async fn settle_next(&mut self) -> Result<Option<SessionId>> {
        let Some(completion) = self.next_completion().await else {
            return Ok(None);
        };
        let session_id = completion.session_id.clone();
        self.apply_completion(completion).await?;
        Ok(Some(session_id))
    }

    pub fn pending_generations(&self) -> usize {
        self.state.generating.len()
    }

    // ===== Internals =====

    /// Run one intent through the reducer and carry out its effects. If any
    /// effect fails the in-memory state is restored to what it was before the
    /// intent, and generations started along the way are aborted.
    pub async fn dispatch(&mut self, intent: Intent) -> Result<()> {
        let snapshot = self.state.clone();
        if let Err(err) = self.transition(intent).await {
            self.rollback(snapshot);
            return Err(err);
        }

        self.publish();
        Ok(())
    }

    async fn transition(&mut self, intent: Intent) -> Result<()> {
        let mut pending: VecDeque<Effect> = reduce(&mut self.state, intent)?.into();

        while let Some(effect) = pending.pop_front() {
            if let Some(follow_up) = self.run_effect(effect).await? {
                pending.extend(reduce(&mut self.state, follow_up)?);
            }
        }
        Ok(())
    }

    fn rollback(&mut self, snapshot: WorkspaceState) {
        self.state.restore(snapshot);
        let state = &self.state;
        self.tasks.retain(|id, (ticket, handle)| {
            let pending = state.pending_ticket(id) == Some(*ticket);
            if !pending {
                debug!("Aborting generation {} for {} after rollback", ticket, id);
                handle.abort();
            }
            pending
        });
    }

    async fn run_effect(&mut self, effect: Effect) -> Result<Option<Intent>> {
        match effect {
            Effect::CreateRecord(record) => {
                self.store.create(&record).await?;
            }
            Effect::DuplicateRecord { source, copy } => {
                let source = self
                    .store
                    .load(&source)
                    .await?
                    .ok_or_else(|| WorkspaceError::NotFound(source.to_string()))?;
                let record = SessionRecord {
                    session: copy,
                    transcript: Vec::new(),
                    artifact: source.artifact,
                };
                self.store.create(&record).await?;
            }
            Effect::UpdateSession(session) => {
                self.store.update(&session).await?;
            }
            Effect::DeleteRecord(id) => {
                self.store.delete(&id).await?;
            }
            Effect::LoadRecord(id) => {
                let record = self
                    .store
                    .load(&id)
                    .await?
                    .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;
                return Ok(Some(Intent::SessionLoaded(record)));
            }
            Effect::AppendMessage {
                session_id,
                message,
            } => {
                self.store.append_message(&session_id, &message).await?;
            }
            Effect::SetArtifact {
                session_id,
                artifact,
            } => {
                self.store.set_artifact(&session_id, &artifact).await?;
            }
            Effect::StartGeneration {
                session_id,
                ticket,
                transcript,
            } => {
                self.spawn_generation(session_id, ticket, transcript);
            }
            Effect::CancelGeneration(id) => {
                if let Some((_, handle)) = self.tasks.remove(&id) {
                    info!("Cancelling generation for {}", id);
                    handle.abort();
                }
            }
            Effect::Notify(notification) => {
                debug!("{}: {}", notification.title(), notification.description());
                let _ = self.events.send(WorkspaceEvent::Notified(notification));
            }
        }

        Ok(None)
    }

    fn spawn_generation(
        &mut self,
        session_id: SessionId,
        ticket: GenerationTicket,
        transcript: Vec<Message>,
    ) {
        let generator = Arc::clone(&self.generator);
        let tx = self.completion_tx.clone();
        let policy = self.policy;
        let id = session_id.clone();

        info!("Starting generation {} for {}", ticket, session_id);
        let handle = tokio::spawn(async move {
            let outcome = generate_with_retry(generator.as_ref(), &transcript, policy)
                .await
                .map_err(|e| e.to_string());
            let completion = Completion {
                session_id: id,
                ticket,
                outcome,
            };
            if tx.send(completion).is_err() {
                warn!("Workspace closed before generation finished");
            }
        });

        if let Some((_, previous)) = self.tasks.insert(session_id, (ticket, handle)) {
            previous.abort();
        }
    }

    fn publish(&self) {
        // No subscribers is fine
        let _ = self
            .events
            .send(WorkspaceEvent::Changed(Arc::new(self.state.clone())));
    }
}

impl Drop for WorkspaceController {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.tasks.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, StorageError};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    const DELAY: Duration = Duration::from_millis(2000);

    async fn controller() -> WorkspaceController {
        let settings = StudioSettings {
            generation_delay_ms: DELAY.as_millis() as u64,
            ..Default::default()
        };
        WorkspaceController::open(&settings).await.unwrap()
    }

    fn controller_with(generator: MockGenerationService) -> WorkspaceController {
        controller_on(Arc::new(InMemorySessionStore::new()), generator)
    }

    fn controller_on(
        store: Arc<dyn SessionStore>,
        generator: MockGenerationService,
    ) -> WorkspaceController {
        WorkspaceController::new(
            store,
            Arc::new(generator),
            Arc::new(JsonBundleExporter),
            RetryPolicy {
                timeout: Duration::from_secs(5),
                max_attempts: 2,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_seeds_demo_sessions_in_order() {
        let controller = controller().await;
        let names: Vec<&str> = controller.sessions().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Modern Button Component", "User Profile Card"]);
        assert!(controller.view().is_browsing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_loads_canned_history() {
        let mut controller = controller().await;
        let id = controller.sessions()[0].id.clone();

        controller.select_session(&id).await.unwrap();

        assert_eq!(controller.view(), &View::Editing(id));
        assert_eq!(controller.transcript().len(), 2);
        assert!(controller.artifact().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_missing_session_surfaces_not_found() {
        let mut controller = controller().await;
        let err = controller.select_session(&"ghost".into()).await.unwrap_err();
        assert_eq!(
            err.as_workspace(),
            Some(&WorkspaceError::NotFound("ghost".to_string()))
        );
        assert!(controller.view().is_browsing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_then_generation_completes_after_delay() {
        let mut controller = controller().await;
        let id = controller.create_session().await.unwrap();

        controller.send_message("build a card", None).await.unwrap();
        assert_eq!(controller.transcript().len(), 1);
        assert!(controller.is_generating(&id));

        let busy = controller.send_message("another", None).await.unwrap_err();
        assert_eq!(busy.as_workspace(), Some(&WorkspaceError::Busy(id.to_string())));
        assert_eq!(controller.transcript().len(), 1);

        let started = tokio::time::Instant::now();
        let settled = controller.settle_next().await.unwrap();
        assert_eq!(settled, Some(id.clone()));
        assert!(started.elapsed() >= DELAY);

        assert_eq!(controller.transcript().len(), 2);
        assert!(controller.active_session().unwrap().has_component);
        assert!(!controller.artifact().unwrap().is_empty());
        assert!(!controller.is_generating(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_message_is_rejected_without_side_effects() {
        let mut controller = controller().await;
        controller.create_session().await.unwrap();

        let err = controller.send_message("", None).await.unwrap_err();

        assert!(matches!(err.as_workspace(), Some(WorkspaceError::InvalidInput(_))));
        assert!(controller.transcript().is_empty());
        assert!(!controller.active_session().unwrap().has_component);
        assert_eq!(controller.pending_generations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_completion_lands_in_origin_session() {
        let mut controller = controller().await;
        let origin = controller.create_session().await.unwrap();
        controller.send_message("build a card", None).await.unwrap();

        let other = controller.create_session().await.unwrap();
        controller.settle_next().await.unwrap();

        assert_eq!(controller.active_session().unwrap().id, other);
        assert!(controller.transcript().is_empty());
        assert!(controller.artifact().is_none());

        controller.select_session(&origin).await.unwrap();
        assert_eq!(controller.transcript().len(), 2);
        assert!(controller.artifact().is_some());
        assert!(controller.active_session().unwrap().has_component);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleting_generating_session_aborts_task() {
        let mut controller = controller().await;
        let id = controller.create_session().await.unwrap();
        controller.send_message("build a card", None).await.unwrap();

        controller.delete_session(&id).await.unwrap();

        assert!(controller.view().is_browsing());
        assert_eq!(controller.pending_generations(), 0);
        tokio::time::advance(DELAY * 2).await;
        assert!(controller.completion_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_copies_artifact_but_not_transcript() {
        let mut controller = controller().await;
        let source = controller.sessions()[0].id.clone();

        let copy = controller.duplicate_session(&source).await.unwrap();

        assert!(controller.view().is_browsing());
        assert_eq!(controller.sessions()[0].name, "Modern Button Component (Copy)");
        controller.select_session(&copy).await.unwrap();
        assert!(controller.transcript().is_empty());
        assert!(controller.artifact().is_some());
        assert!(controller.active_session().unwrap().has_component);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_receive_snapshots_and_notices() {
        let mut controller = controller().await;
        let mut events = controller.subscribe();

        controller.create_session().await.unwrap();

        let mut saw_notice = false;
        let mut saw_snapshot = false;
        while let Ok(event) = events.try_recv() {
            match event {
                WorkspaceEvent::Notified(Notification::SessionCreated { .. }) => saw_notice = true,
                WorkspaceEvent::Changed(state) => saw_snapshot = !state.view.is_browsing(),
                _ => {}
            }
        }
        assert!(saw_notice);
        assert!(saw_snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_requires_artifact() {
        let mut controller = controller().await;
        assert!(matches!(
            controller.export_active().unwrap_err().as_workspace(),
            Some(WorkspaceError::NoActiveSession)
        ));

        controller.create_session().await.unwrap();
        assert!(matches!(
            controller.export_active().unwrap_err(),
            Error::Export(ExportError::EmptyArtifact)
        ));

        let seeded = controller.sessions()[1].id.clone();
        controller.select_session(&seeded).await.unwrap();
        let blob = controller.export_active().unwrap();
        assert_eq!(blob.file_name, BUNDLE_FILE_NAME);
    }

    #[tokio::test]
    async fn test_failed_generation_reports_and_unlocks() {
        let mut generator = MockGenerationService::new();
        generator
            .expect_generate()
            .times(2)
            .returning(|_| Err(Error::Generation(GenerationError::Failed("offline".to_string()))));
        let mut controller = controller_with(generator);
        let mut events = controller.subscribe();

        let id = controller.create_session().await.unwrap();
        controller.send_message("build a card", None).await.unwrap();
        controller.settle_next().await.unwrap();

        assert!(!controller.is_generating(&id));
        assert_eq!(controller.transcript().len(), 1);
        assert!(!controller.active_session().unwrap().has_component);

        let mut failed = false;
        while let Ok(event) = events.try_recv() {
            if let WorkspaceEvent::Notified(Notification::GenerationFailed { session_id, .. }) = event {
                failed = session_id == id;
            }
        }
        assert!(failed);

        // Unlocked: a new message is accepted again
        controller.send_message("try again", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_mock_generator_receives_transcript() {
        let mut generator = MockGenerationService::new();
        generator
            .expect_generate()
            .withf(|transcript| {
                transcript.len() == 1 && transcript[0].content == "build a card"
            })
            .times(1)
            .returning(|_| {
                Ok(Generation {
                    reply: "here you go".to_string(),
                    artifact: GeneratedArtifact::new("m", "s", "p"),
                })
            });
        let mut controller = controller_with(generator);

        controller.create_session().await.unwrap();
        controller.send_message("build a card", None).await.unwrap();
        controller.settle_next().await.unwrap();

        assert_eq!(controller.transcript()[1].content, "here you go");
        assert_eq!(controller.artifact(), Some(&GeneratedArtifact::new("m", "s", "p")));
    }

    /// Replies "reply N" with markup "mN" on the N-th call
    fn numbered_generator(calls: u32) -> MockGenerationService {
        let counter = Arc::new(AtomicU32::new(0));
        let mut generator = MockGenerationService::new();
        generator.expect_generate().times(calls as usize).returning(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Generation {
                reply: format!("reply {}", n),
                artifact: GeneratedArtifact::new(format!("m{}", n), "s", "p"),
            })
        });
        generator
    }

    #[tokio::test]
    async fn test_cancelled_result_does_not_answer_the_next_message() {
        let mut controller = controller_with(numbered_generator(2));
        let id = controller.create_session().await.unwrap();

        controller.send_message("first", None).await.unwrap();
        // Let the first generation finish and queue its result
        while !controller.tasks.get(&id).map_or(true, |(_, h)| h.is_finished()) {
            tokio::task::yield_now().await;
        }
        controller.cancel_generation(&id).await.unwrap();
        controller.send_message("second", None).await.unwrap();

        // The queued result of the cancelled request is discarded
        assert_eq!(controller.settle_next().await.unwrap(), Some(id.clone()));
        assert!(controller.is_generating(&id));
        assert_eq!(controller.transcript().len(), 2);
        assert_eq!(controller.pending_generations(), 1);
        assert!(controller.tasks.contains_key(&id));

        controller.settle_next().await.unwrap();
        let contents: Vec<&str> = controller.transcript().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "reply 2"]);
        assert_eq!(controller.artifact().unwrap().markup, "m2");
        assert!(!controller.is_generating(&id));
        assert!(controller.tasks.is_empty());
    }

    /// In-memory store whose loads or appends can be made to fail
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemorySessionStore,
        fail_loads: AtomicBool,
        fail_appends: AtomicBool,
    }

    fn disk_error() -> Error {
        Error::Storage(StorageError::Database("disk I/O error".to_string()))
    }

    #[async_trait]
    impl SessionStore for FlakyStore {
        async fn list(&self) -> Result<Vec<Session>> {
            self.inner.list().await
        }

        async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
            if self.fail_loads.load(Ordering::SeqCst) {
                return Err(disk_error());
            }
            self.inner.load(id).await
        }

        async fn create(&self, record: &SessionRecord) -> Result<()> {
            self.inner.create(record).await
        }

        async fn update(&self, session: &Session) -> Result<()> {
            self.inner.update(session).await
        }

        async fn delete(&self, id: &SessionId) -> Result<()> {
            self.inner.delete(id).await
        }

        async fn append_message(&self, id: &SessionId, message: &Message) -> Result<()> {
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(disk_error());
            }
            self.inner.append_message(id, message).await
        }

        async fn set_artifact(&self, id: &SessionId, artifact: &GeneratedArtifact) -> Result<()> {
            self.inner.set_artifact(id, artifact).await
        }
    }

    #[tokio::test]
    async fn test_failed_load_leaves_active_session_unchanged() {
        let store = Arc::new(FlakyStore::default());
        for record in demo::seed_records() {
            store.create(&record).await.unwrap();
        }
        let mut controller = controller_on(store.clone(), MockGenerationService::new());
        controller.reload().await.unwrap();
        let id = controller.sessions()[0].id.clone();

        store.fail_loads.store(true, Ordering::SeqCst);
        let err = controller.select_session(&id).await.unwrap_err();

        assert!(matches!(err, Error::Storage(StorageError::Database(_))));
        assert!(controller.view().is_browsing());
        assert!(controller.transcript().is_empty());
        assert!(controller.artifact().is_none());

        store.fail_loads.store(false, Ordering::SeqCst);
        controller.select_session(&id).await.unwrap();
        assert_eq!(controller.view(), &View::Editing(id));
    }

    #[tokio::test]
    async fn test_unstored_result_releases_session() {
        let store = Arc::new(FlakyStore::default());
        let mut controller = controller_on(store.clone(), numbered_generator(2));
        let mut events = controller.subscribe();
        let id = controller.create_session().await.unwrap();
        controller.send_message("build a card", None).await.unwrap();

        store.fail_appends.store(true, Ordering::SeqCst);
        let err = controller.settle_next().await.unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert!(!controller.is_generating(&id));
        assert_eq!(controller.transcript().len(), 1);
        assert!(controller.artifact().is_none());
        assert!(!controller.active_session().unwrap().has_component);

        let mut failed = false;
        let mut completed = false;
        while let Ok(event) = events.try_recv() {
            match event {
                WorkspaceEvent::Notified(Notification::GenerationFailed { .. }) => failed = true,
                WorkspaceEvent::Notified(Notification::GenerationCompleted { .. }) => completed = true,
                _ => {}
            }
        }
        assert!(failed);
        assert!(!completed);

        store.fail_appends.store(false, Ordering::SeqCst);
        controller.send_message("try again", None).await.unwrap();
        controller.settle_next().await.unwrap();
        assert_eq!(controller.transcript().len(), 3);
        assert!(controller.active_session().unwrap().has_component);
    }
}
