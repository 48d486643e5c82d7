//! Line commands accepted by the terminal front-end

use anyhow::{anyhow, bail, Context, Result};
use crafti_core::presentation::{PreviewTab, Viewport};
use crafti_core::{ElementProperty, FontWeight, PropertyKey};
use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  list [query]                 show sessions, optionally filtered
  new                          create a session and open it
  open <n|id>                  open a session
  rename <n|id> <name>         rename a session
  dup <n|id>                   duplicate a session
  rm <n|id>                    delete a session
  send <text> [--image <path>] send a message in the open session
  cancel                       stop the running generation
  back                         return to the session list
  preview [viewport] [tab]     show the artifact (mobile|tablet|desktop, preview|markup|css)
  export <dir>                 write the component bundle into <dir>
  edit <element-id> <kind>     open the property editor
  set <property> <value>       change a property (e.g. padding 24)
  close                        close the property editor
  help                         this text
  quit                         exit";

/// Session reference: list position (1-based) or raw id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Id(String),
}

impl Target {
    fn parse(s: &str) -> Self {
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Self::Index(n),
            _ => Self::Id(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    List(String),
    New,
    Open(Target),
    Rename(Target, String),
    Duplicate(Target),
    Delete(Target),
    Send { text: String, image: Option<PathBuf> },
    Cancel,
    Back,
    Preview(Option<Viewport>, Option<PreviewTab>),
    Export(PathBuf),
    Edit { element_id: String, kind: String },
    Set(ElementProperty),
    Close,
    Quit,
}

pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match head {
        "help" | "?" => Command::Help,
        "list" | "ls" => Command::List(rest.to_string()),
        "new" => Command::New,
        "open" => Command::Open(target(rest)?),
        "rename" => {
            let (t, name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: rename <n|id> <name>"))?;
            Command::Rename(Target::parse(t), name.trim().to_string())
        }
        "dup" => Command::Duplicate(target(rest)?),
        "rm" => Command::Delete(target(rest)?),
        "send" => parse_send(rest)?,
        "cancel" => Command::Cancel,
        "back" => Command::Back,
        "preview" => parse_preview(rest)?,
        "export" => {
            if rest.is_empty() {
                bail!("usage: export <dir>");
            }
            Command::Export(PathBuf::from(rest))
        }
        "edit" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(id), Some(kind)) => Command::Edit {
                    element_id: id.to_string(),
                    kind: kind.to_string(),
                },
                _ => bail!("usage: edit <element-id> <kind>"),
            }
        }
        "set" => {
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: set <property> <value>"))?;
            Command::Set(parse_property(name, value.trim())?)
        }
        "close" => Command::Close,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{}', try 'help'", other),
    };
    Ok(Some(command))
}

fn target(rest: &str) -> Result<Target> {
    let t = rest.split_whitespace().next().context("missing session")?;
    Ok(Target::parse(t))
}

fn parse_send(rest: &str) -> Result<Command> {
    let (text, image) = match rest.split_once("--image") {
        Some((text, path)) => {
            let path = path.trim();
            if path.is_empty() {
                bail!("--image needs a path");
            }
            (text.trim(), Some(PathBuf::from(path)))
        }
        None => (rest, None),
    };
    Ok(Command::Send {
        text: text.to_string(),
        image,
    })
}

fn parse_preview(rest: &str) -> Result<Command> {
    let mut viewport = None;
    let mut tab = None;
    for word in rest.split_whitespace() {
        match word {
            "mobile" => viewport = Some(Viewport::Mobile),
            "tablet" => viewport = Some(Viewport::Tablet),
            "desktop" => viewport = Some(Viewport::Desktop),
            "preview" => tab = Some(PreviewTab::Preview),
            "markup" | "code" => tab = Some(PreviewTab::Markup),
            "css" | "stylesheet" => tab = Some(PreviewTab::Stylesheet),
            other => bail!("unknown preview option '{}'", other),
        }
    }
    Ok(Command::Preview(viewport, tab))
}

/// Typed property value from its name and textual value
pub fn parse_property(name: &str, value: &str) -> Result<ElementProperty> {
    let key = PropertyKey::from_name(name).ok_or_else(|| anyhow!("unknown property '{}'", name))?;
    let number = || -> Result<u32> {
        value
            .trim_end_matches("px")
            .parse()
            .with_context(|| format!("{} expects a number", key))
    };

    let property = match key {
        PropertyKey::BackgroundColor => ElementProperty::BackgroundColor(value.to_string()),
        PropertyKey::Color => ElementProperty::Color(value.to_string()),
        PropertyKey::BorderRadius => ElementProperty::BorderRadius(number()?),
        PropertyKey::Padding => ElementProperty::Padding(number()?),
        PropertyKey::FontSize => ElementProperty::FontSize(number()?),
        PropertyKey::BoxShadow => match value {
            "on" | "true" => ElementProperty::BoxShadow(true),
            "off" | "false" => ElementProperty::BoxShadow(false),
            _ => bail!("boxShadow expects on/off"),
        },
        PropertyKey::Width => ElementProperty::Width(value.to_string()),
        PropertyKey::Height => ElementProperty::Height(value.to_string()),
        PropertyKey::Text => ElementProperty::Text(value.to_string()),
        PropertyKey::FontWeight => ElementProperty::FontWeight(match value {
            "normal" => FontWeight::Normal,
            "medium" => FontWeight::Medium,
            "semibold" => FontWeight::Semibold,
            "bold" => FontWeight::Bold,
            _ => bail!("fontWeight expects normal, medium, semibold or bold"),
        }),
    };
    Ok(property)
}
