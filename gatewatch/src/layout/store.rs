//! Layout store implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Layout, LayoutError, LayoutStore};

/// Reads `{directory}/{BASE}.json`, one layout per base.
#[derive(Debug, Clone)]
pub struct FileLayoutStore {
    directory: PathBuf,
}

impl FileLayoutStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, base: &str) -> PathBuf {
        self.directory
            .join(format!("{}.json", base.trim().to_uppercase()))
    }
}

impl LayoutStore for FileLayoutStore {
    async fn load(&self, base: &str) -> Result<Layout, LayoutError> {
        let path = self.path_for(base);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LayoutError::NotFound(base.trim().to_uppercase()));
            }
            Err(source) => return Err(LayoutError::Io { path, source }),
        };

        let layout: Layout =
            serde_json::from_slice(&bytes).map_err(|source| LayoutError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(
            path = %path.display(),
            gates = layout.gates.len(),
            taxi_nodes = layout.taxi_graph.len(),
            "Loaded layout"
        );

        Ok(layout)
    }
}

/// Layouts held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLayoutStore {
    layouts: HashMap<String, Layout>,
}

impl StaticLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, base: &str, layout: Layout) -> Self {
        self.layouts.insert(base.trim().to_uppercase(), layout);
        self
    }
}

impl LayoutStore for StaticLayoutStore {
    async fn load(&self, base: &str) -> Result<Layout, LayoutError> {
        let base = base.trim().to_uppercase();
        self.layouts
            .get(&base)
            .cloned()
            .ok_or(LayoutError::NotFound(base))
    }
}
