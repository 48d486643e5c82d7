//! Crafti Studio
//!
//! Line-oriented terminal client for the component studio workspace.

use anyhow::{anyhow, Result};
use crafti_core::presentation::{ChatView, PreviewSurface, SessionListSurface, SessionListView};
use crafti_core::{
    Completion, ImageRef, Notification, SelectedElement, SessionId, StudioSettings,
    WorkspaceController, WorkspaceEvent,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{Command, Target};

enum Input {
    Line(Option<String>),
    Completed(Completion),
}

struct Studio {
    controller: WorkspaceController,
    list: SessionListSurface,
    preview: PreviewSurface,
    /// Ids in the order of the last printed list
    listed: Vec<SessionId>,
}

impl Studio {
    fn new(controller: WorkspaceController) -> Self {
        Self {
            controller,
            list: SessionListSurface::default(),
            preview: PreviewSurface::default(),
            listed: Vec::new(),
        }
    }

    fn resolve(&self, target: &Target) -> Result<SessionId> {
        match target {
            Target::Id(id) => Ok(SessionId::from(id.as_str())),
            Target::Index(n) => {
                let ids: Vec<SessionId> = if self.listed.is_empty() {
                    self.controller.sessions().iter().map(|s| s.id.clone()).collect()
                } else {
                    self.listed.clone()
                };
                ids.get(n - 1)
                    .cloned()
                    .ok_or_else(|| anyhow!("no session at position {}", n))
            }
        }
    }

    /// Returns `false` when the user asked to quit
    async fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Help => println!("{}", commands::HELP),
            Command::Quit => return Ok(false),
            Command::List(query) => {
                self.list.set_query(query);
                let view = self.list.render(self.controller.state());
                self.listed = view.rows.iter().map(|r| r.id.clone()).collect();
                print_list(&view);
            }
            Command::New => {
                self.controller.create_session().await?;
                self.print_chat();
            }
            Command::Open(target) => {
                let id = self.resolve(&target)?;
                self.controller.select_session(&id).await?;
                self.print_chat();
            }
            Command::Rename(target, name) => {
                let id = self.resolve(&target)?;
                self.controller.rename_session(&id, name, None).await?;
            }
            Command::Duplicate(target) => {
                let id = self.resolve(&target)?;
                let copy = self.controller.duplicate_session(&id).await?;
                println!("copy: {}", copy);
            }
            Command::Delete(target) => {
                let id = self.resolve(&target)?;
                self.controller.delete_session(&id).await?;
                self.listed.retain(|listed| listed != &id);
            }
            Command::Send { text, image } => {
                let image = image.map(ImageRef::from_path).transpose()?;
                self.controller.send_message(text, image).await?;
                println!("generating...");
            }
            Command::Cancel => {
                let id = self
                    .controller
                    .active_session()
                    .map(|s| s.id.clone())
                    .ok_or_else(|| anyhow!("no open session"))?;
                self.controller.cancel_generation(&id).await?;
            }
            Command::Back => {
                self.controller.return_to_sessions().await?;
                self.listed.clear();
                print_list(&self.list.render(self.controller.state()));
            }
            Command::Preview(viewport, tab) => {
                if let Some(viewport) = viewport {
                    self.preview.set_viewport(viewport);
                }
                if let Some(tab) = tab {
                    self.preview.set_tab(tab);
                }
                match self.preview.render(self.controller.state()) {
                    None => println!("no open session"),
                    Some(view) if view.generating => println!("generating..."),
                    Some(view) => match view.content {
                        Some(content) => {
                            let width = view
                                .max_width
                                .map(|w| format!("{}px", w))
                                .unwrap_or_else(|| "full width".to_string());
                            println!("[Ready | {:?} | {:?} | {}]", view.tab, view.viewport, width);
                            println!("{}", content);
                        }
                        None => println!("Describe your component to see a live preview."),
                    },
                }
            }
            Command::Export(dir) => {
                let blob = self.controller.export_active()?;
                let path = blob.write_to(&dir)?;
                println!("wrote {} (sha256 {})", path.display(), blob.checksum);
            }
            Command::Edit { element_id, kind } => {
                self.controller
                    .open_property_editor(SelectedElement::new(element_id, kind))
                    .await?;
                self.print_editor();
            }
            Command::Set(property) => {
                self.controller.change_property(property).await?;
                self.print_editor();
            }
            Command::Close => self.controller.close_property_editor().await?,
        }
        Ok(true)
    }

    fn print_chat(&self) {
        match self.controller.chat_view() {
            Some(view) => print_chat(&view),
            None => println!("no open session"),
        }
    }

    fn print_editor(&self) {
        let Some(view) = self.controller.property_editor_view() else {
            return;
        };
        println!("{} <{}>", view.element_id, view.kind);
        for (tab, fields) in &view.tabs {
            println!("  {:?}", tab);
            for field in fields {
                let marker = if field.is_default { " (default)" } else { "" };
                println!("    {:<16} {}{}", field.key.name(), field.value.css_value(), marker);
            }
        }
    }

    fn print_notification(&self, notification: &Notification) {
        println!("* {}: {}", notification.title(), notification.description());
        if let Notification::GenerationCompleted {
            session_id,
            in_background: false,
        } = notification
        {
            if let Some(last) = self
                .controller
                .chat_view()
                .filter(|v| &v.session_id == session_id)
                .and_then(|v| v.messages.last().cloned())
            {
                println!("[{}] assistant: {}", last.time, last.content);
            }
        }
    }
}

fn print_list(view: &SessionListView) {
    if let Some((headline, hint)) = &view.empty_state {
        println!("{}\n  {}", headline, hint);
        return;
    }
    for (i, row) in view.rows.iter().enumerate() {
        let badge = if row.has_component { " [Component]" } else { "" };
        let busy = if row.is_generating { " (generating)" } else { "" };
        println!(
            "{:>3}. {}{}{}  - {} msgs, {}  [{}]",
            i + 1,
            row.name,
            badge,
            busy,
            row.message_count,
            row.last_modified,
            row.id
        );
        if !row.description.is_empty() {
            println!("     {}", row.description);
        }
    }
}

fn print_chat(view: &ChatView) {
    println!("== {} ==", view.session_name);
    if view.messages.is_empty() {
        println!("Start by describing the component you want to build.");
    }
    for m in &view.messages {
        let who = if matches!(m.author, crafti_core::Author::User) {
            "you"
        } else {
            "assistant"
        };
        println!("[{}] {}: {}", m.time, who, m.content);
        if let Some(src) = &m.image_src {
            println!("       image: {}", truncate(src, 60));
        }
    }
    if view.generating {
        println!("generating...");
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn drain_events(studio: &Studio, events: &mut broadcast::Receiver<WorkspaceEvent>) {
    loop {
        match events.try_recv() {
            Ok(WorkspaceEvent::Notified(notification)) => studio.print_notification(&notification),
            Ok(WorkspaceEvent::Changed(_)) => {}
            Err(broadcast::error::TryRecvError::Lagged(n)) => warn!("Skipped {} workspace events", n),
            Err(_) => break,
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => StudioSettings::load(path)?,
        None => StudioSettings::load_default()?,
    };
    info!("Starting Crafti Studio ({:?} store)", settings.storage_backend);

    let controller = WorkspaceController::open(&settings).await?;
    let mut events = controller.subscribe();
    let mut studio = Studio::new(controller);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_list(&studio.list.render(studio.controller.state()));
    println!("Type 'help' for commands.");
    prompt();

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            Some(completion) = studio.controller.next_completion() => Input::Completed(completion),
        };

        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => match commands::parse(&line) {
                Ok(None) => {}
                Ok(Some(command)) => match studio.execute(command).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("error: {}", e),
                },
                Err(e) => println!("error: {}", e),
            },
            Input::Completed(completion) => {
                if let Err(e) = studio.controller.apply_completion(completion).await {
                    warn!("Failed to apply generation result: {}", e);
                }
            }
        }

        drain_events(&studio, &mut events);
        prompt();
    }

    info!("Exiting with {} generations pending", studio.controller.pending_generations());
    Ok(())
}
