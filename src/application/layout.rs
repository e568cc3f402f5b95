//! Declarative widget layouts (TOML).
//!
//! ```toml
//! [[widgets]]
//! kind = "Container"
//! id = "left"
//!
//! [[widgets.children]]
//! kind = "Button"
//! label = "ok"
//! classes = ["primary"]
//! ```

use serde::Deserialize;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::{Widget, WidgetKind};

/// One widget entry in a layout file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WidgetSpec {
    pub kind: WidgetKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Defaults to the kind's own focusability
    #[serde(default)]
    pub can_focus: Option<bool>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub children: Vec<WidgetSpec>,
}

impl From<WidgetSpec> for Widget {
    fn from(spec: WidgetSpec) -> Self {
        let mut widget = Widget::new(spec.kind);
        widget.id = spec.id;
        widget.classes = spec.classes;
        widget.label = spec.label;
        if let Some(can_focus) = spec.can_focus {
            widget.can_focus = can_focus;
        }
        widget.disabled = spec.disabled;
        widget.children = spec.children.into_iter().map(Widget::from).collect();
        widget
    }
}

/// Top-level layout document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
}

impl Layout {
    pub fn from_toml_str(content: &str) -> ApplicationResult<Self> {
        let layout: Layout = toml::from_str(content).map_err(|e| ApplicationError::Layout {
            message: e.to_string(),
        })?;
        if layout
            .widgets
            .iter()
            .any(|w| contains_kind(w, &WidgetKind::Screen))
        {
            return Err(ApplicationError::Layout {
                message: "a layout cannot contain a Screen widget".to_string(),
            });
        }
        Ok(layout)
    }

    pub fn into_widgets(self) -> Vec<Widget> {
        self.widgets.into_iter().map(Widget::from).collect()
    }
}

fn contains_kind(spec: &WidgetSpec, kind: &WidgetKind) -> bool {
    spec.kind == *kind || spec.children.iter().any(|c| contains_kind(c, kind))
}
