// Deterministic view renderer for tests

use crate::CallLog;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trellis_core::{Error, ViewRenderer};

/// Renders views as `"<path>|name=value,..."` and records what it rendered
///
/// Variables are listed in name order. String values are written raw, other
/// values as JSON. Paths registered with [`RecordingRenderer::with_missing`]
/// fail with [`Error::ViewNotFound`], the way a renderer reports a view file
/// that does not exist.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    rendered: CallLog,
    missing: Arc<HashSet<PathBuf>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `path` as a view that does not exist
    pub fn with_missing(mut self, path: impl Into<PathBuf>) -> Self {
        let mut missing = (*self.missing).clone();
        missing.insert(path.into());
        self.missing = Arc::new(missing);
        self
    }

    /// Paths rendered so far, in order
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.calls()
    }

    pub fn was_rendered(&self, path: impl AsRef<Path>) -> bool {
        self.rendered
            .was_called(&path.as_ref().display().to_string())
    }

    pub fn clear(&self) {
        self.rendered.clear();
    }
}

impl ViewRenderer for RecordingRenderer {
    fn render(&self, path: &Path, vars: &Map<String, Value>) -> Result<String, Error> {
        if self.missing.contains(path) {
            return Err(Error::ViewNotFound(path.display().to_string()));
        }
        self.rendered.record(path.display().to_string());

        let mut pairs: Vec<_> = vars
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => format!("{}={}", name, s),
                other => format!("{}={}", name, other),
            })
            .collect();
        pairs.sort();
        let vars = pairs.join(",");

        Ok(format!("{}|{}", path.display(), vars))
    }
}
