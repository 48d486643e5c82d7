//! Property editor surface

use crate::types::{ElementProperty, PropertyKey, SliderRange};
use crate::workspace::WorkspaceState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTab {
    Style,
    Layout,
    Content,
}

impl EditorTab {
    pub fn keys(&self) -> &'static [PropertyKey] {
        match self {
            Self::Style => &[
                PropertyKey::BackgroundColor,
                PropertyKey::Color,
                PropertyKey::BorderRadius,
                PropertyKey::BoxShadow,
            ],
            Self::Layout => &[PropertyKey::Padding, PropertyKey::Width, PropertyKey::Height],
            Self::Content => &[PropertyKey::Text, PropertyKey::FontSize, PropertyKey::FontWeight],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyField {
    pub key: PropertyKey,
    pub value: ElementProperty,
    /// Value comes from the defaults, not the element
    pub is_default: bool,
    pub range: Option<SliderRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEditorView {
    pub element_id: String,
    pub kind: String,
    pub tabs: Vec<(EditorTab, Vec<PropertyField>)>,
}

impl PropertyEditorView {
    pub fn field(&self, key: PropertyKey) -> Option<&PropertyField> {
        self.tabs
            .iter()
            .flat_map(|(_, fields)| fields.iter())
            .find(|f| f.key == key)
    }
}

/// Editor contents, `None` while no element is selected
pub fn property_editor_view(state: &WorkspaceState) -> Option<PropertyEditorView> {
    let element = state.selected_element.as_ref()?;

    let tabs = [EditorTab::Style, EditorTab::Layout, EditorTab::Content]
        .into_iter()
        .map(|tab| {
            let fields = tab
                .keys()
                .iter()
                .map(|&key| PropertyField {
                    key,
                    value: element.resolved(key),
                    is_default: element.get(key).is_none(),
                    range: key.slider_range(),
                })
                .collect();
            (tab, fields)
        })
        .collect();

    Some(PropertyEditorView {
        element_id: element.id.clone(),
        kind: element.kind.clone(),
        tabs,
    })
}
