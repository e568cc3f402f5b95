//! Reads layout files from disk.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, Layout};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::FileSystem;

pub struct LayoutLoader {
    fs: Arc<dyn FileSystem>,
}

impl LayoutLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> InfraResult<Layout> {
        if !self.fs.is_file(path) {
            return Err(InfraError::Layout {
                path: path.to_path_buf(),
                message: "not a file".to_string(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read layout {}", path.display()), e))?;

        let layout = Layout::from_toml_str(&content).map_err(|e| match e {
            ApplicationError::Layout { message } => InfraError::Layout {
                path: path.to_path_buf(),
                message,
            },
            other => InfraError::Application(other),
        })?;
        debug!(widgets = layout.widgets.len(), "layout loaded");
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;

    /// In-memory filesystem keyed by path.
    struct MemoryFileSystem {
        files: HashMap<PathBuf, String>,
    }

    impl FileSystem for MemoryFileSystem {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }
    }

    fn loader(files: &[(&str, &str)]) -> LayoutLoader {
        let files = files
            .iter()
            .map(|(p, c)| (PathBuf::from(p), c.to_string()))
            .collect();
        LayoutLoader::new(Arc::new(MemoryFileSystem { files }))
    }

    #[test]
    fn given_valid_file_when_loading_then_returns_layout() {
        let loader = loader(&[("ui.toml", "[[widgets]]\nkind = \"Button\"\nlabel = \"go\"\n")]);
        let layout = loader.load(Path::new("ui.toml")).unwrap();
        assert_eq!(layout.widgets.len(), 1);
    }

    #[test]
    fn given_missing_file_when_loading_then_layout_error_names_path() {
        let loader = loader(&[]);
        let err = loader.load(Path::new("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn given_malformed_toml_when_loading_then_layout_error() {
        let loader = loader(&[("bad.toml", "[[widgets]\n")]);
        let err = loader.load(Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, InfraError::Layout { .. }));
    }
}
