//! Property editor target types

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BORDER_RADIUS: u32 = 0;
pub const DEFAULT_PADDING: u32 = 16;
pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const DEFAULT_DIMENSION: &str = "auto";
pub const SHADOW_ON: &str = "0 4px 6px rgba(0,0,0,0.1)";

/// Font weights offered by the content tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Medium,
    Semibold,
    Bold,
}

impl FontWeight {
    pub fn css_value(&self) -> u16 {
        match self {
            Self::Normal => 400,
            Self::Medium => 500,
            Self::Semibold => 600,
            Self::Bold => 700,
        }
    }
}

/// Bounds of a numeric slider control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl SliderRange {
    pub const fn new(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

/// Names of the editable properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKey {
    BackgroundColor,
    Color,
    BorderRadius,
    BoxShadow,
    Padding,
    Width,
    Height,
    Text,
    FontSize,
    FontWeight,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 10] = [
        Self::BackgroundColor,
        Self::Color,
        Self::BorderRadius,
        Self::BoxShadow,
        Self::Padding,
        Self::Width,
        Self::Height,
        Self::Text,
        Self::FontSize,
        Self::FontWeight,
    ];

    /// CSS-style property name
    pub fn name(&self) -> &'static str {
        match self {
            Self::BackgroundColor => "backgroundColor",
            Self::Color => "color",
            Self::BorderRadius => "borderRadius",
            Self::BoxShadow => "boxShadow",
            Self::Padding => "padding",
            Self::Width => "width",
            Self::Height => "height",
            Self::Text => "text",
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Slider bounds for numeric properties
    pub fn slider_range(&self) -> Option<SliderRange> {
        match self {
            Self::BorderRadius => Some(SliderRange::new(0, 50, 1)),
            Self::Padding => Some(SliderRange::new(0, 100, 4)),
            Self::FontSize => Some(SliderRange::new(8, 72, 1)),
            _ => None,
        }
    }

    /// Value used when the element does not set this property
    pub fn default_value(&self) -> ElementProperty {
        match self {
            Self::BackgroundColor => ElementProperty::BackgroundColor(DEFAULT_BACKGROUND.to_string()),
            Self::Color => ElementProperty::Color(DEFAULT_TEXT_COLOR.to_string()),
            Self::BorderRadius => ElementProperty::BorderRadius(DEFAULT_BORDER_RADIUS),
            Self::BoxShadow => ElementProperty::BoxShadow(false),
            Self::Padding => ElementProperty::Padding(DEFAULT_PADDING),
            Self::Width => ElementProperty::Width(DEFAULT_DIMENSION.to_string()),
            Self::Height => ElementProperty::Height(DEFAULT_DIMENSION.to_string()),
            Self::Text => ElementProperty::Text(String::new()),
            Self::FontSize => ElementProperty::FontSize(DEFAULT_FONT_SIZE),
            Self::FontWeight => ElementProperty::FontWeight(FontWeight::Normal),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A known style or content property with its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "camelCase")]
pub enum ElementProperty {
    BackgroundColor(String),
    Color(String),
    BorderRadius(u32),
    BoxShadow(bool),
    Padding(u32),
    Width(String),
    Height(String),
    Text(String),
    FontSize(u32),
    FontWeight(FontWeight),
}

impl ElementProperty {
    pub fn key(&self) -> PropertyKey {
        match self {
            Self::BackgroundColor(_) => PropertyKey::BackgroundColor,
            Self::Color(_) => PropertyKey::Color,
            Self::BorderRadius(_) => PropertyKey::BorderRadius,
            Self::BoxShadow(_) => PropertyKey::BoxShadow,
            Self::Padding(_) => PropertyKey::Padding,
            Self::Width(_) => PropertyKey::Width,
            Self::Height(_) => PropertyKey::Height,
            Self::Text(_) => PropertyKey::Text,
            Self::FontSize(_) => PropertyKey::FontSize,
            Self::FontWeight(_) => PropertyKey::FontWeight,
        }
    }

    /// Numeric values pulled into their slider range
    pub fn clamped(self) -> Self {
        let Some(range) = self.key().slider_range() else {
            return self;
        };
        match self {
            Self::BorderRadius(v) => Self::BorderRadius(range.clamp(v)),
            Self::Padding(v) => Self::Padding(range.clamp(v)),
            Self::FontSize(v) => Self::FontSize(range.clamp(v)),
            other => other,
        }
    }

    /// Value as it would appear in a style attribute
    pub fn css_value(&self) -> String {
        match self {
            Self::BackgroundColor(c) | Self::Color(c) => c.clone(),
            Self::BorderRadius(px) | Self::Padding(px) | Self::FontSize(px) => format!("{}px", px),
            Self::BoxShadow(true) => SHADOW_ON.to_string(),
            Self::BoxShadow(false) => "none".to_string(),
            Self::Width(v) | Self::Height(v) | Self::Text(v) => v.clone(),
            Self::FontWeight(w) => w.css_value().to_string(),
        }
    }
}

/// The element currently targeted by the property editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedElement {
    pub id: String,
    /// Element kind tag, e.g. `button`
    pub kind: String,
    /// Explicitly set properties, at most one per key
    pub properties: Vec<ElementProperty>,
}

impl SelectedElement {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: ElementProperty) -> Self {
        self.set(property);
        self
    }

    /// Explicit value, if set
    pub fn get(&self, key: PropertyKey) -> Option<&ElementProperty> {
        self.properties.iter().find(|p| p.key() == key)
    }

    /// Explicit value or the default for `key`
    pub fn resolved(&self, key: PropertyKey) -> ElementProperty {
        self.get(key).cloned().unwrap_or_else(|| key.default_value())
    }

    pub fn set(&mut self, property: ElementProperty) {
        match self.properties.iter_mut().find(|p| p.key() == property.key()) {
            Some(slot) => *slot = property,
            None => self.properties.push(property),
        }
    }
}

/// A property edit reported by the editor. Never written back to the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub element_id: String,
    pub property: ElementProperty,
    pub changed_at: chrono::DateTime<chrono::Utc>,
}

impl PropertyChange {
    pub fn describe(&self) -> String {
        format!("{} changed to {}", self.property.key(), self.property.css_value())
    }
}
