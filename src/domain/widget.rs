//! Widget kinds and blueprints.
//!
//! A [`Widget`] is an unmounted description of a subtree. Mounting turns it
//! into arena nodes; the blueprint itself is consumed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a node, used by type selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    Screen,
    Widget,
    Static,
    Button,
    Container,
    Custom(String),
}

impl WidgetKind {
    pub fn name(&self) -> &str {
        match self {
            WidgetKind::Screen => "Screen",
            WidgetKind::Widget => "Widget",
            WidgetKind::Static => "Static",
            WidgetKind::Button => "Button",
            WidgetKind::Container => "Container",
            WidgetKind::Custom(name) => name,
        }
    }

    /// Whether a type selector naming `type_name` matches this kind.
    ///
    /// `Widget` is the base type: it matches everything except the screen.
    pub fn is_a(&self, type_name: &str) -> bool {
        if type_name == "Widget" {
            return *self != WidgetKind::Screen;
        }
        self.name() == type_name
    }

    /// Focusable by default when built without an explicit `can_focus`.
    pub fn default_can_focus(&self) -> bool {
        matches!(self, WidgetKind::Button)
    }
}

impl From<String> for WidgetKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Screen" => WidgetKind::Screen,
            "Widget" => WidgetKind::Widget,
            "Static" => WidgetKind::Static,
            "Button" => WidgetKind::Button,
            "Container" => WidgetKind::Container,
            _ => WidgetKind::Custom(name),
        }
    }
}

impl From<WidgetKind> for String {
    fn from(kind: WidgetKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unmounted widget description with its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub kind: WidgetKind,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub label: Option<String>,
    pub can_focus: bool,
    pub disabled: bool,
    pub children: Vec<Widget>,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        let can_focus = kind.default_can_focus();
        Self {
            kind,
            id: None,
            classes: Vec::new(),
            label: None,
            can_focus,
            disabled: false,
            children: Vec::new(),
        }
    }

    /// A `Static` showing `content`.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(WidgetKind::Static).with_label(content)
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::new(WidgetKind::Button).with_label(label)
    }

    pub fn container(children: impl IntoIterator<Item = Widget>) -> Self {
        Self::new(WidgetKind::Container).with_children(children)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Widget>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn focusable(mut self, can_focus: bool) -> Self {
        self.can_focus = can_focus;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Number of nodes this blueprint mounts, itself included.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Whether this blueprint or any nested child is of `kind`.
    pub fn contains_kind(&self, kind: &WidgetKind) -> bool {
        self.iter().any(|widget| widget.kind == *kind)
    }

    /// Pre-order walk over this blueprint and its children.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let current = stack.pop()?;
            stack.extend(current.children.iter().rev());
            Some(current)
        })
    }
}
