//! Database query implementations

use crate::error::Result;
use crate::types::*;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn parse_timestamp(raw: &str, column: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn author_str(author: Author) -> &'static str {
    match author {
        Author::User => "user",
        Author::Assistant => "assistant",
    }
}

fn parse_author(raw: &str) -> Author {
    match raw {
        "user" => Author::User,
        _ => Author::Assistant,
    }
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: SessionId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        last_modified: parse_timestamp(&row.get::<_, String>(3)?, 3)?,
        message_count: row.get(4)?,
        has_component: row.get::<_, i64>(5)? != 0,
    })
}

// ===== Session Queries =====

/// Insert a session ahead of every existing one
pub fn insert_session(conn: &Connection, session: &Session) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO sessions (id, seq, name, description, last_modified, message_count, has_component)
        VALUES (?, (SELECT COALESCE(MAX(seq), 0) + 1 FROM sessions), ?, ?, ?, ?, ?)
        "#,
        params![
            session.id.as_str(),
            session.name,
            session.description,
            session.last_modified.to_rfc3339(),
            session.message_count,
            session.has_component as i64,
        ],
    )?;

    Ok(())
}

/// Update session metadata. Returns the number of rows touched.
pub fn update_session(conn: &Connection, session: &Session) -> Result<usize> {
    let changed = conn.execute(
        r#"
        UPDATE sessions
        SET name = ?, description = ?, last_modified = ?, message_count = ?, has_component = ?
        WHERE id = ?
        "#,
        params![
            session.name,
            session.description,
            session.last_modified.to_rfc3339(),
            session.message_count,
            session.has_component as i64,
            session.id.as_str(),
        ],
    )?;

    Ok(changed)
}

/// Get session metadata by ID
pub fn get_session(conn: &Connection, id: &SessionId) -> Result<Option<Session>> {
    let result = conn
        .query_row(
            r#"
            SELECT id, name, description, last_modified, message_count, has_component
            FROM sessions
            WHERE id = ?
            "#,
            params![id.as_str()],
            session_from_row,
        )
        .optional()?;

    Ok(result)
}

/// List sessions, newest created first
pub fn list_sessions(conn: &Connection) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, name, description, last_modified, message_count, has_component
        FROM sessions
        ORDER BY seq DESC
        "#,
    )?;

    let sessions = stmt
        .query_map([], session_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(sessions)
}

/// Delete a session and its transcript and artifact
pub fn delete_session(conn: &Connection, id: &SessionId) -> Result<()> {
    conn.execute("DELETE FROM messages WHERE session_id = ?", params![id.as_str()])?;
    conn.execute("DELETE FROM artifacts WHERE session_id = ?", params![id.as_str()])?;
    conn.execute("DELETE FROM sessions WHERE id = ?", params![id.as_str()])?;
    Ok(())
}

// ===== Message Queries =====

/// Append a message to a session's transcript
pub fn insert_message(conn: &Connection, session_id: &SessionId, message: &Message) -> Result<()> {
    let image = message
        .image
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        r#"
        INSERT INTO messages (id, session_id, seq_order, author, content, image, created_at)
        VALUES (?, ?, (SELECT COALESCE(MAX(seq_order), 0) + 1 FROM messages WHERE session_id = ?), ?, ?, ?, ?)
        "#,
        params![
            message.id,
            session_id.as_str(),
            session_id.as_str(),
            author_str(message.author),
            message.content,
            image,
            message.timestamp.to_rfc3339(),
        ],
    )?;

    Ok(())
}

/// Transcript of a session in append order
pub fn get_session_messages(conn: &Connection, session_id: &SessionId) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, author, content, image, created_at
        FROM messages
        WHERE session_id = ?
        ORDER BY seq_order ASC
        "#,
    )?;

    let rows = stmt
        .query_map(params![session_id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                parse_timestamp(&row.get::<_, String>(4)?, 4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut messages = Vec::with_capacity(rows.len());
    for (id, author, content, image, timestamp) in rows {
        let image = image.map(|raw| serde_json::from_str(&raw)).transpose()?;
        messages.push(Message {
            id,
            author: parse_author(&author),
            content,
            timestamp,
            image,
        });
    }

    Ok(messages)
}

// ===== Artifact Queries =====

/// Attach or replace a session's artifact
pub fn upsert_artifact(
    conn: &Connection,
    session_id: &SessionId,
    artifact: &GeneratedArtifact,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO artifacts (session_id, markup, stylesheet, preview, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            markup = excluded.markup,
            stylesheet = excluded.stylesheet,
            preview = excluded.preview,
            updated_at = excluded.updated_at
        "#,
        params![
            session_id.as_str(),
            artifact.markup,
            artifact.stylesheet,
            artifact.preview,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;

    Ok(())
}

pub fn get_artifact(conn: &Connection, session_id: &SessionId) -> Result<Option<GeneratedArtifact>> {
    let result = conn
        .query_row(
            "SELECT markup, stylesheet, preview FROM artifacts WHERE session_id = ?",
            params![session_id.as_str()],
            |row| {
                Ok(GeneratedArtifact {
                    markup: row.get(0)?,
                    stylesheet: row.get(1)?,
                    preview: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(result)
}
