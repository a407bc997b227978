// Page assembly: view variables, content view and layout

use crate::Error;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Variable name the rendered content view is exposed under in the layout
pub const CONTENT_VAR: &str = "content";

/// Trait for template engines that turn a view file into markup
///
/// Implementations decide what a view file is and how variables are
/// substituted. A view that does not exist must be reported as
/// [`Error::ViewNotFound`].
pub trait ViewRenderer: Send + Sync {
    /// Render the view at `path` with `vars` in scope
    fn render(&self, path: &Path, vars: &Map<String, Value>) -> Result<String, Error>;
}

/// The page an action fills in
#[derive(Debug, Clone, Default)]
pub struct Page {
    content_file: Option<PathBuf>,
    vars: Map<String, Value>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page without variables showing `path`
    pub fn with_content_file(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let mut page = Self::new();
        page.set_content_file(path)?;
        Ok(page)
    }

    /// Expose a value to the views under `name`
    ///
    /// Names must be non-empty and not numeric. Setting a name twice keeps
    /// the last value.
    pub fn add_var<T: Serialize>(&mut self, name: impl Into<String>, value: T) -> Result<(), Error> {
        let name = name.into();
        if name.is_empty() || is_numeric(&name) {
            return Err(Error::InvalidArgument(format!(
                "view variable name must be a non-empty, non-numeric string (got '{}')",
                name
            )));
        }

        let value = serde_json::to_value(value).map_err(|e| {
            Error::InvalidArgument(format!("view variable '{}' is not serializable: {}", name, e))
        })?;
        self.vars.insert(name, value);
        Ok(())
    }

    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    pub fn set_content_file(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "content file must be a non-empty path".to_string(),
            ));
        }
        self.content_file = Some(path);
        Ok(())
    }

    pub fn content_file(&self) -> Option<&Path> {
        self.content_file.as_deref()
    }

    /// Render the content view, then the layout around it
    ///
    /// The layout sees every page variable plus the rendered content under
    /// [`CONTENT_VAR`].
    pub fn generate(&self, renderer: &dyn ViewRenderer, layout: &Path) -> Result<String, Error> {
        let content_file = self
            .content_file
            .as_deref()
            .ok_or_else(|| Error::ViewNotFound("no content view selected".to_string()))?;

        let content = renderer.render(content_file, &self.vars)?;

        let mut layout_vars = self.vars.clone();
        layout_vars.insert(CONTENT_VAR.to_string(), Value::String(content));
        renderer.render(layout, &layout_vars)
    }
}

fn is_numeric(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.chars().any(|c| c.is_ascii_digit()) && trimmed.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Renders `path:{vars}` and remembers the paths it was asked for
    #[derive(Default)]
    struct EchoRenderer {
        rendered: Mutex<Vec<PathBuf>>,
    }

    impl ViewRenderer for EchoRenderer {
        fn render(&self, path: &Path, vars: &Map<String, Value>) -> Result<String, Error> {
            self.rendered.lock().unwrap().push(path.to_path_buf());
            if path.ends_with("missing.php") {
                return Err(Error::ViewNotFound(path.display().to_string()));
            }
            Ok(format!("{}:{}", path.display(), Value::Object(vars.clone())))
        }
    }

    #[test]
    fn test_add_var_rejects_bad_names() {
        let mut page = Page::new();
        for name in ["", "42", "3.14", " 7", "-1e3"] {
            assert!(
                matches!(page.add_var(name, 1), Err(Error::InvalidArgument(_))),
                "{:?} should be rejected",
                name
            );
        }
        assert!(page.vars().is_empty());
    }

    #[test]
    fn test_add_var_accepts_names() {
        let mut page = Page::new();
        page.add_var("title", "Hello").unwrap();
        page.add_var("news2", vec![1, 2]).unwrap();
        page.add_var("title", "Again").unwrap();

        assert_eq!(page.var("title"), Some(&json!("Again")));
        assert_eq!(page.var("news2"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_set_content_file_rejects_empty() {
        let mut page = Page::new();
        assert!(matches!(
            page.set_content_file(""),
            Err(Error::InvalidArgument(_))
        ));
        page.set_content_file("views/show.php").unwrap();
        assert_eq!(page.content_file(), Some(Path::new("views/show.php")));
    }

    #[test]
    fn test_with_content_file() {
        let page = Page::with_content_file("Errors/404.html").unwrap();
        assert_eq!(page.content_file(), Some(Path::new("Errors/404.html")));
        assert!(page.vars().is_empty());
        assert!(Page::with_content_file("").is_err());
    }

    #[test]
    fn test_generate_wraps_content_in_layout() {
        let renderer = EchoRenderer::default();
        let mut page = Page::new();
        page.add_var("title", "News").unwrap();
        page.set_content_file("show.php").unwrap();

        let html = page.generate(&renderer, Path::new("layout.php")).unwrap();

        assert!(html.starts_with("layout.php:"));
        assert!(html.contains(r#""title":"News""#));
        assert!(html.contains(r#""content":"show.php:"#));
        assert_eq!(
            *renderer.rendered.lock().unwrap(),
            vec![PathBuf::from("show.php"), PathBuf::from("layout.php")]
        );
    }

    #[test]
    fn test_generate_without_content_file() {
        let renderer = EchoRenderer::default();
        let page = Page::new();
        assert!(matches!(
            page.generate(&renderer, Path::new("layout.php")),
            Err(Error::ViewNotFound(_))
        ));
    }

    #[test]
    fn test_generate_stops_on_missing_view() {
        let renderer = EchoRenderer::default();
        let mut page = Page::new();
        page.set_content_file("missing.php").unwrap();

        assert!(page.generate(&renderer, Path::new("layout.php")).is_err());
        assert_eq!(renderer.rendered.lock().unwrap().len(), 1);
    }
}
