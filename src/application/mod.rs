//! Application layer: the running app and its use cases
//!
//! This layer schedules domain operations on a cooperative worker and
//! exposes them as awaitable handles.

pub mod app;
pub mod error;
pub mod events;
pub mod key;
pub mod layout;
pub mod pending;
pub mod pilot;
pub mod query;

pub use app::{App, AppState};
pub use error::{ApplicationError, ApplicationResult};
pub use events::LifecycleEvent;
pub use key::Key;
pub use layout::{Layout, WidgetSpec};
pub use pending::Pending;
pub use pilot::Pilot;
pub use query::DomQuery;
