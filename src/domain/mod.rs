//! Domain layer: the widget tree and the rules that mutate it
//!
//! This layer is independent of external concerns (no I/O, no scheduling).

pub mod arena;
pub mod error;
pub mod focus;
pub mod removal;
pub mod render;
pub mod selector;
pub mod widget;

pub use arena::{DomArena, NodeData, NodeId, TreeNode, WalkChildren};
pub use error::{DomError, DomResult};
pub use focus::{focus_chain, FocusChange, FocusPolicy, FocusState};
pub use removal::{RemovalOutcome, RemovalPlan, RemovalReport};
pub use render::{release_tree, TreeRender};
pub use selector::Selector;
pub use widget::{Widget, WidgetKind};
