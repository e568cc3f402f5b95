//! Widget tree runtime for terminal UIs.
//!
//! Widgets are mounted into an arena-backed tree rooted at a screen, queried
//! with CSS-like selectors, and removed in batches that may overlap. Removal
//! is applied by a cooperative worker and exposed as an awaitable handle;
//! when the focused widget disappears, focus is re-targeted to a surviving
//! neighbour in tab order.
//!
//! ```ignore
//! let pilot = App::run_test();
//! let app = pilot.app();
//! app.mount([Widget::container([Widget::button("ok")])]).await?;
//! pilot.press(&["tab"]).await?;
//! app.query("Container")?.remove().await?;
//! assert!(app.focused().is_none());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{App, ApplicationError, ApplicationResult, DomQuery, Pending, Pilot};
pub use config::Settings;
pub use domain::{DomError, NodeId, RemovalReport, Widget, WidgetKind};
