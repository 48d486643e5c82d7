//! Pure state transitions
//!
//! `reduce` validates an intent against the current state, applies it and
//! returns the effects the controller must carry out. A rejected intent
//! leaves the state untouched.

use super::intent::{Effect, Intent, Notification};
use super::state::{GenerationTicket, WorkspaceState};
use crate::error::WorkspaceError;
use crate::types::*;
use tracing::{debug, warn};

type Transition = std::result::Result<Vec<Effect>, WorkspaceError>;

pub fn reduce(state: &mut WorkspaceState, intent: Intent) -> Transition {
    match intent {
        Intent::CreateSession => Ok(create_session(state)),
        Intent::SelectSession(id) => select_session(state, id),
        Intent::DeleteSession(id) => delete_session(state, id),
        Intent::DuplicateSession(id) => duplicate_session(state, id),
        Intent::RenameSession {
            id,
            name,
            description,
        } => rename_session(state, id, name, description),
        Intent::SendMessage { text, image } => send_message(state, text, image),
        Intent::CancelGeneration(id) => cancel_generation(state, id),
        Intent::ReturnToSessions => {
            state.view = View::Browsing;
            state.clear_active_view();
            Ok(Vec::new())
        }
        Intent::OpenPropertyEditor(element) => {
            if state.active_session_id().is_none() {
                return Err(WorkspaceError::NoActiveSession);
            }
            state.selected_element = Some(element);
            state.property_log.clear();
            Ok(Vec::new())
        }
        Intent::ClosePropertyEditor => {
            state.selected_element = None;
            state.property_log.clear();
            Ok(Vec::new())
        }
        Intent::ChangeProperty(property) => change_property(state, property),
        Intent::SessionLoaded(record) => {
            session_loaded(state, record);
            Ok(Vec::new())
        }
        Intent::GenerationFinished {
            session_id,
            ticket,
            generation,
        } => Ok(generation_finished(state, session_id, ticket, generation)),
        Intent::GenerationFailed {
            session_id,
            ticket,
            reason,
        } => {
            if !state.settle_generation(&session_id, ticket) {
                warn!("Dropping stale failure {} for {}: {}", ticket, session_id, reason);
                return Ok(Vec::new());
            }
            Ok(vec![Effect::Notify(Notification::GenerationFailed {
                session_id,
                reason,
            })])
        }
    }
}

fn require(state: &WorkspaceState, id: &SessionId) -> std::result::Result<(), WorkspaceError> {
    if state.contains(id) {
        Ok(())
    } else {
        Err(WorkspaceError::NotFound(id.to_string()))
    }
}

fn create_session(state: &mut WorkspaceState) -> Vec<Effect> {
    let session = Session::new(
        format!("New Session {}", state.sessions.len() + 1),
        DEFAULT_SESSION_DESCRIPTION,
    );
    let id = session.id.clone();
    debug!("Creating session {}", id);

    state.sessions.insert(0, session.clone());
    state.view = View::Editing(id.clone());
    state.clear_active_view();

    vec![
        Effect::CreateRecord(SessionRecord::new(session)),
        Effect::Notify(Notification::SessionCreated { session_id: id }),
    ]
}

fn select_session(state: &mut WorkspaceState, id: SessionId) -> Transition {
    require(state, &id)?;

    state.view = View::Editing(id.clone());
    state.clear_active_view();

    Ok(vec![Effect::LoadRecord(id)])
}

fn delete_session(state: &mut WorkspaceState, id: SessionId) -> Transition {
    let index = state
        .sessions
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;

    let removed = state.sessions.remove(index);
    if state.is_active(&id) {
        state.view = View::Browsing;
        state.clear_active_view();
    }

    let mut effects = vec![Effect::DeleteRecord(id.clone())];
    if state.generating.remove(&id).is_some() {
        effects.push(Effect::CancelGeneration(id));
    }
    effects.push(Effect::Notify(Notification::SessionDeleted { name: removed.name }));

    Ok(effects)
}

fn duplicate_session(state: &mut WorkspaceState, id: SessionId) -> Transition {
    let source = state
        .session(&id)
        .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;

    let copy = source.duplicate();
    let name = source.name.clone();
    state.sessions.insert(0, copy.clone());

    Ok(vec![
        Effect::DuplicateRecord { source: id, copy },
        Effect::Notify(Notification::SessionDuplicated { name }),
    ])
}

fn rename_session(
    state: &mut WorkspaceState,
    id: SessionId,
    name: String,
    description: Option<String>,
) -> Transition {
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkspaceError::InvalidInput("Session name cannot be empty".to_string()));
    }

    let session = state
        .session_mut(&id)
        .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;

    session.name = name.to_string();
    if let Some(description) = description {
        session.description = description;
    }
    session.touch();

    Ok(vec![Effect::UpdateSession(session.clone())])
}

fn send_message(state: &mut WorkspaceState, text: String, image: Option<ImageRef>) -> Transition {
    let session_id = state
        .active_session_id()
        .cloned()
        .ok_or(WorkspaceError::NoActiveSession)?;
    require(state, &session_id)?;

    if text.trim().is_empty() && image.is_none() {
        return Err(WorkspaceError::InvalidInput(
            "Message needs text or an image".to_string(),
        ));
    }
    if state.is_generating(&session_id) {
        return Err(WorkspaceError::Busy(session_id.to_string()));
    }

    let message = Message::user(text, image);
    state.transcript.push(message.clone());
    let ticket = state.begin_generation(session_id.clone());

    let session = state
        .session_mut(&session_id)
        .ok_or_else(|| WorkspaceError::NotFound(session_id.to_string()))?;
    session.message_count = session.message_count.saturating_add(1);
    session.touch();
    let session = session.clone();

    Ok(vec![
        Effect::AppendMessage {
            session_id: session_id.clone(),
            message,
        },
        Effect::UpdateSession(session),
        Effect::StartGeneration {
            session_id,
            ticket,
            transcript: state.transcript.clone(),
        },
    ])
}

fn cancel_generation(state: &mut WorkspaceState, id: SessionId) -> Transition {
    require(state, &id)?;

    if state.generating.remove(&id).is_none() {
        return Ok(Vec::new());
    }

    Ok(vec![
        Effect::CancelGeneration(id.clone()),
        Effect::Notify(Notification::GenerationCancelled { session_id: id }),
    ])
}

fn change_property(state: &mut WorkspaceState, property: ElementProperty) -> Transition {
    let element = state
        .selected_element
        .as_mut()
        .ok_or(WorkspaceError::NoSelection)?;

    let property = property.clamped();
    element.set(property.clone());
    let change = PropertyChange {
        element_id: element.id.clone(),
        property,
        changed_at: chrono::Utc::now(),
    };
    let description = change.describe();
    debug!("Property change on {}: {}", change.element_id, description);
    state.property_log.push(change);

    Ok(vec![Effect::Notify(Notification::PropertyChanged { description })])
}

fn session_loaded(state: &mut WorkspaceState, record: SessionRecord) {
    if !state.is_active(record.id()) {
        debug!("Ignoring load of inactive session {}", record.id());
        return;
    }

    if let Some(session) = state.session_mut(record.id()) {
        *session = record.session;
    }
    state.transcript = record.transcript;
    state.artifact = record.artifact;
}

fn generation_finished(
    state: &mut WorkspaceState,
    session_id: SessionId,
    ticket: GenerationTicket,
    generation: Generation,
) -> Vec<Effect> {
    if !state.settle_generation(&session_id, ticket) {
        warn!("Dropping generation result {} for {}: no longer pending", ticket, session_id);
        return Vec::new();
    }

    let Some(session) = state.session_mut(&session_id) else {
        warn!("Dropping generation result for unknown session {}", session_id);
        return Vec::new();
    };

    let reply = Message::assistant(generation.reply);
    session.message_count = session.message_count.saturating_add(1);
    session.has_component = true;
    session.touch();
    let session = session.clone();

    let in_background = !state.is_active(&session_id);
    if !in_background {
        state.transcript.push(reply.clone());
        state.artifact = Some(generation.artifact.clone());
    }

    vec![
        Effect::AppendMessage {
            session_id: session_id.clone(),
            message: reply,
        },
        Effect::SetArtifact {
            session_id: session_id.clone(),
            artifact: generation.artifact,
        },
        Effect::UpdateSession(session),
        Effect::Notify(Notification::GenerationCompleted {
            session_id,
            in_background,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use pretty_assertions::assert_eq;

    fn seeded() -> WorkspaceState {
        WorkspaceState::with_sessions(
            demo::seed_records().into_iter().map(|r| r.session).collect(),
        )
    }

    fn generation() -> Generation {
        Generation {
            reply: demo::DEMO_REPLY.to_string(),
            artifact: demo::demo_artifact(),
        }
    }

    fn send(state: &mut WorkspaceState, text: &str) -> GenerationTicket {
        let effects = reduce(
            state,
            Intent::SendMessage {
                text: text.to_string(),
                image: None,
            },
        )
        .unwrap();
        match effects.last() {
            Some(Effect::StartGeneration { ticket, .. }) => *ticket,
            other => panic!("expected a generation to start, got {:?}", other),
        }
    }

    fn editing_new(state: &mut WorkspaceState) -> SessionId {
        reduce(state, Intent::CreateSession).unwrap();
        state.active_session_id().cloned().unwrap()
    }

    #[test]
    fn test_initial_state_is_browsing() {
        let state = WorkspaceState::default();
        assert!(state.view.is_browsing());
        assert!(state.active_session().is_none());
    }

    #[test]
    fn test_each_create_adds_one_and_activates_it() {
        let mut state = seeded();
        for n in 0..5 {
            let before = state.sessions.len();
            let effects = reduce(&mut state, Intent::CreateSession).unwrap();

            assert_eq!(state.sessions.len(), before + 1);
            let active = state.active_session().unwrap();
            assert_eq!(active.id, state.sessions[0].id);
            assert_eq!(active.name, format!("New Session {}", 3 + n));
            assert!(state.transcript.is_empty());
            assert!(state.artifact.is_none());
            assert!(matches!(effects[0], Effect::CreateRecord(_)));
        }
    }

    #[test]
    fn test_select_unknown_session_is_not_found() {
        let mut state = seeded();
        let active = editing_new(&mut state);
        let snapshot = state.clone();

        let err = reduce(&mut state, Intent::SelectSession("ghost".into())).unwrap_err();

        assert_eq!(err, WorkspaceError::NotFound("ghost".to_string()));
        assert_eq!(state.active_session_id(), Some(&active));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_select_requests_load_and_applies_record() {
        let mut state = seeded();
        let record = demo::seed_records().remove(0);

        let effects = reduce(&mut state, Intent::SelectSession(record.id().clone())).unwrap();
        assert_eq!(effects, vec![Effect::LoadRecord(record.id().clone())]);

        reduce(&mut state, Intent::SessionLoaded(record.clone())).unwrap();
        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.artifact, record.artifact);
    }

    #[test]
    fn test_load_for_inactive_session_is_ignored() {
        let mut state = seeded();
        editing_new(&mut state);
        let record = demo::seed_records().remove(0);

        reduce(&mut state, Intent::SessionLoaded(record)).unwrap();
        assert!(state.transcript.is_empty());
        assert!(state.artifact.is_none());
    }

    #[test]
    fn test_delete_active_returns_to_browsing() {
        let mut state = seeded();
        let id = editing_new(&mut state);

        reduce(&mut state, Intent::DeleteSession(id.clone())).unwrap();

        assert!(state.view.is_browsing());
        assert!(!state.contains(&id));
    }

    #[test]
    fn test_delete_other_keeps_active() {
        let mut state = seeded();
        let active = editing_new(&mut state);
        let other = state.sessions[1].id.clone();

        reduce(&mut state, Intent::DeleteSession(other.clone())).unwrap();

        assert_eq!(state.active_session_id(), Some(&active));
        assert!(!state.contains(&other));
    }

    #[test]
    fn test_delete_generating_session_cancels_task() {
        let mut state = seeded();
        let id = editing_new(&mut state);
        reduce(
            &mut state,
            Intent::SendMessage {
                text: "build a card".to_string(),
                image: None,
            },
        )
        .unwrap();

        let effects = reduce(&mut state, Intent::DeleteSession(id.clone())).unwrap();

        assert_eq!(effects[0], Effect::DeleteRecord(id.clone()));
        assert_eq!(effects[1], Effect::CancelGeneration(id.clone()));
        assert!(!state.is_generating(&id));
    }

    #[test]
    fn test_duplicate_copies_metadata_only() {
        let mut state = seeded();
        let original = state.sessions[0].clone();

        let effects = reduce(&mut state, Intent::DuplicateSession(original.id.clone())).unwrap();

        let copy = &state.sessions[0];
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, format!("{} (Copy)", original.name));
        assert_eq!(copy.description, original.description);
        assert_eq!(copy.has_component, original.has_component);
        assert_eq!(copy.message_count, 0);
        assert_eq!(state.session(&original.id), Some(&original));
        assert!(state.view.is_browsing());
        assert!(matches!(&effects[0], Effect::DuplicateRecord { source, .. } if source == &original.id));
    }

    #[test]
    fn test_duplicate_unknown_is_not_found() {
        let mut state = seeded();
        let err = reduce(&mut state, Intent::DuplicateSession("ghost".into())).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound(_)));
        assert_eq!(state.sessions.len(), 2);
    }

    #[test]
    fn test_rename_rejects_blank_name() {
        let mut state = seeded();
        let id = state.sessions[0].id.clone();
        let err = reduce(
            &mut state,
            Intent::RenameSession {
                id,
                name: "   ".to_string(),
                description: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidInput(_)));
    }

    #[test]
    fn test_rename_updates_metadata() {
        let mut state = seeded();
        let id = state.sessions[1].id.clone();
        reduce(
            &mut state,
            Intent::RenameSession {
                id: id.clone(),
                name: " Pricing Table ".to_string(),
                description: Some("Three tiers".to_string()),
            },
        )
        .unwrap();

        let session = state.session(&id).unwrap();
        assert_eq!(session.name, "Pricing Table");
        assert_eq!(session.description, "Three tiers");
    }

    #[test]
    fn test_send_requires_active_session() {
        let mut state = seeded();
        let err = reduce(
            &mut state,
            Intent::SendMessage {
                text: "hi".to_string(),
                image: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, WorkspaceError::NoActiveSession);
    }

    #[test]
    fn test_send_empty_message_is_a_no_op() {
        let mut state = seeded();
        editing_new(&mut state);
        let snapshot = state.clone();

        let err = reduce(
            &mut state,
            Intent::SendMessage {
                text: "  ".to_string(),
                image: None,
            },
        )
        .unwrap_err();

        assert!(matches!(err, WorkspaceError::InvalidInput(_)));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_send_image_without_text_is_accepted() {
        let mut state = seeded();
        editing_new(&mut state);

        reduce(
            &mut state,
            Intent::SendMessage {
                text: String::new(),
                image: Some(ImageRef::url("https://example.com/mock.png")),
            },
        )
        .unwrap();

        assert_eq!(state.transcript.len(), 1);
        assert!(state.active_is_generating());
    }

    #[test]
    fn test_send_while_generating_is_busy() {
        let mut state = seeded();
        let id = editing_new(&mut state);
        let send = || Intent::SendMessage {
            text: "build a card".to_string(),
            image: None,
        };

        let effects = reduce(&mut state, send()).unwrap();
        assert_eq!(state.transcript.len(), 1);
        assert!(matches!(
            effects.last(),
            Some(Effect::StartGeneration { session_id, transcript, .. }) if session_id == &id && transcript.len() == 1
        ));

        let err = reduce(&mut state, send()).unwrap_err();
        assert_eq!(err, WorkspaceError::Busy(id.to_string()));
        assert_eq!(state.transcript.len(), 1);
    }

    #[test]
    fn test_generation_completes_active_session() {
        let mut state = seeded();
        let id = editing_new(&mut state);
        let ticket = send(&mut state, "build a card");

        reduce(
            &mut state,
            Intent::GenerationFinished {
                session_id: id.clone(),
                ticket,
                generation: generation(),
            },
        )
        .unwrap();

        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.transcript[1].author, Author::Assistant);
        assert!(state.artifact.is_some());
        let session = state.session(&id).unwrap();
        assert!(session.has_component);
        assert_eq!(session.message_count, 2);
        assert!(!state.is_generating(&id));
    }

    #[test]
    fn test_generation_result_targets_originating_session() {
        let mut state = seeded();
        let origin = editing_new(&mut state);
        let ticket = send(&mut state, "build a card");
        let other = editing_new(&mut state);

        let effects = reduce(
            &mut state,
            Intent::GenerationFinished {
                session_id: origin.clone(),
                ticket,
                generation: generation(),
            },
        )
        .unwrap();

        assert_eq!(state.active_session_id(), Some(&other));
        assert!(state.transcript.is_empty());
        assert!(state.artifact.is_none());
        assert!(state.session(&origin).unwrap().has_component);
        assert!(!state.session(&other).unwrap().has_component);
        assert!(effects.contains(&Effect::Notify(Notification::GenerationCompleted {
            session_id: origin,
            in_background: true,
        })));
    }

    #[test]
    fn test_cancelled_generation_result_is_dropped() {
        let mut state = seeded();
        let id = editing_new(&mut state);
        let ticket = send(&mut state, "build a card");
        reduce(&mut state, Intent::CancelGeneration(id.clone())).unwrap();

        let effects = reduce(
            &mut state,
            Intent::GenerationFinished {
                session_id: id.clone(),
                ticket,
                generation: generation(),
            },
        )
        .unwrap();

        assert!(effects.is_empty());
        assert_eq!(state.transcript.len(), 1);
        assert!(!state.session(&id).unwrap().has_component);
    }

    #[test]
    fn test_result_of_cancelled_request_does_not_settle_the_next_one() {
        let mut state = seeded();
        let id = editing_new(&mut state);
        let first = send(&mut state, "first");
        reduce(&mut state, Intent::CancelGeneration(id.clone())).unwrap();
        let second = send(&mut state, "second");
        assert_ne!(first, second);

        let stale = reduce(
            &mut state,
            Intent::GenerationFinished {
                session_id: id.clone(),
                ticket: first,
                generation: generation(),
            },
        )
        .unwrap();
        assert!(stale.is_empty());
        assert_eq!(state.pending_ticket(&id), Some(second));
        assert_eq!(state.transcript.len(), 2);

        let stale_failure = reduce(
            &mut state,
            Intent::GenerationFailed {
                session_id: id.clone(),
                ticket: first,
                reason: "aborted".to_string(),
            },
        )
        .unwrap();
        assert!(stale_failure.is_empty());
        assert!(state.is_generating(&id));

        reduce(
            &mut state,
            Intent::GenerationFinished {
                session_id: id.clone(),
                ticket: second,
                generation: generation(),
            },
        )
        .unwrap();
        assert!(!state.is_generating(&id));
        assert_eq!(state.transcript.len(), 3);
        assert_eq!(state.transcript[2].author, Author::Assistant);
    }

    #[test]
    fn test_generation_failure_clears_busy_flag() {
        let mut state = seeded();
        let id = editing_new(&mut state);
        let ticket = send(&mut state, "build a card");

        reduce(
            &mut state,
            Intent::GenerationFailed {
                session_id: id.clone(),
                ticket,
                reason: "timeout".to_string(),
            },
        )
        .unwrap();

        assert!(!state.is_generating(&id));
        assert_eq!(state.transcript.len(), 1);
    }

    #[test]
    fn test_change_property_requires_selection() {
        let mut state = seeded();
        editing_new(&mut state);
        let err = reduce(&mut state, Intent::ChangeProperty(ElementProperty::Padding(8))).unwrap_err();
        assert_eq!(err, WorkspaceError::NoSelection);
    }

    #[test]
    fn test_change_property_never_touches_artifact() {
        let mut state = seeded();
        let record = demo::seed_records().remove(0);
        reduce(&mut state, Intent::SelectSession(record.id().clone())).unwrap();
        reduce(&mut state, Intent::SessionLoaded(record)).unwrap();
        let artifact_before = state.artifact.clone();

        reduce(
            &mut state,
            Intent::OpenPropertyEditor(SelectedElement::new("btn-primary", "button")),
        )
        .unwrap();
        reduce(
            &mut state,
            Intent::ChangeProperty(ElementProperty::BackgroundColor("#ff0000".to_string())),
        )
        .unwrap();

        // Edits are reported but not reconciled into the artifact
        assert_eq!(state.artifact, artifact_before);
        assert_eq!(state.property_log.len(), 1);
        assert_eq!(
            state
                .selected_element
                .as_ref()
                .unwrap()
                .resolved(PropertyKey::BackgroundColor),
            ElementProperty::BackgroundColor("#ff0000".to_string())
        );

        reduce(&mut state, Intent::ClosePropertyEditor).unwrap();
        assert!(state.selected_element.is_none());
        assert!(state.property_log.is_empty());
        assert_eq!(state.artifact, artifact_before);
    }

    #[test]
    fn test_change_property_clamps_slider_values() {
        let mut state = seeded();
        editing_new(&mut state);
        reduce(
            &mut state,
            Intent::OpenPropertyEditor(SelectedElement::new("card", "div")),
        )
        .unwrap();

        reduce(&mut state, Intent::ChangeProperty(ElementProperty::Padding(400))).unwrap();

        assert_eq!(
            state.property_log[0].property,
            ElementProperty::Padding(100)
        );
    }

    #[test]
    fn test_open_property_editor_requires_active_session() {
        let mut state = seeded();
        let err = reduce(
            &mut state,
            Intent::OpenPropertyEditor(SelectedElement::new("el", "div")),
        )
        .unwrap_err();
        assert_eq!(err, WorkspaceError::NoActiveSession);
    }

    #[test]
    fn test_return_to_sessions_keeps_generation_running() {
        let mut state = seeded();
        let id = editing_new(&mut state);
        reduce(
            &mut state,
            Intent::SendMessage {
                text: "build a card".to_string(),
                image: None,
            },
        )
        .unwrap();

        reduce(&mut state, Intent::ReturnToSessions).unwrap();

        assert!(state.view.is_browsing());
        assert!(state.is_generating(&id));
    }
}
