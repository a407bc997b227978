// View file locations

use std::path::{Path, PathBuf};

/// Maps (application, module, view) to view files on disk
///
/// Layout of an application tree:
///
/// ```text
/// {root}/{app}/Modules/{module}/Views/{view}.{ext}
/// {root}/{app}/Templates/{layout}.{ext}
/// ```
///
/// Locating is pure path arithmetic; whether the file exists is for the
/// renderer to find out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLocator {
    root: PathBuf,
    extension: String,
    layout: String,
    not_found: Option<PathBuf>,
}

impl ViewLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Extension of view files, without the dot
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Name of the layout template, without extension
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Page rendered for unmatched URLs, relative to the root
    pub fn with_not_found(mut self, path: impl Into<PathBuf>) -> Self {
        self.not_found = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the content view for `module`/`view` of `app`
    pub fn locate(&self, app: &str, module: &str, view: &str) -> PathBuf {
        self.root
            .join(app)
            .join("Modules")
            .join(module)
            .join("Views")
            .join(self.file_name(view))
    }

    /// Path of the layout wrapping every page of `app`
    pub fn layout(&self, app: &str) -> PathBuf {
        self.root
            .join(app)
            .join("Templates")
            .join(self.file_name(&self.layout))
    }

    pub fn not_found(&self) -> Option<PathBuf> {
        self.not_found.as_ref().map(|path| self.root.join(path))
    }

    fn file_name(&self, name: &str) -> String {
        if self.extension.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", name, self.extension)
        }
    }
}

impl Default for ViewLocator {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Applications"),
            extension: "php".to_string(),
            layout: "layout".to_string(),
            not_found: None,
        }
    }
}
