//! Infrastructure layer: I/O implementations
//!
//! This layer implements I/O boundary traits and loads layout files.

pub mod error;
pub mod layout_loader;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use layout_loader::LayoutLoader;
