//! Lifecycle notifications published by the app worker.

use crate::domain::{NodeId, WidgetKind};

/// Broadcast to every [`App::subscribe`](crate::application::App::subscribe) receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Mounted { node: NodeId, kind: WidgetKind },
    /// Emitted children-first, once per disposed node
    Unmounted { node: NodeId, kind: WidgetKind },
    FocusChanged {
        from: Option<NodeId>,
        to: Option<NodeId>,
    },
}
