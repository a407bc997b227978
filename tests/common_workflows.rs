//! Integration tests for common Trellis workflows.
//!
//! A small news site: a frontend listing and showing news, a backend with a
//! login redirect, both configured from files.

use std::io::Write;
use std::sync::Arc;
use trellis::prelude::*;
use trellis::trellis_config::FileFormat;
use trellis_testing::{RecordingRenderer, TestResponse, assert_body_contains, assert_redirect};

// =============================================================================
// Fixtures
// =============================================================================

struct Database {
    news: Vec<(&'static str, &'static str)>,
}

struct NewsManager {
    db: Arc<Database>,
}

impl NewsManager {
    fn titles(&self) -> Vec<&str> {
        self.db.news.iter().map(|(title, _)| *title).collect()
    }

    fn find(&self, id: usize) -> Option<(&str, &str)> {
        self.db.news.get(id).copied()
    }
}

#[derive(Default)]
struct NewsController;

impl NewsController {
    fn index(&mut self, ctx: &mut ControllerContext, _: &HttpRequest) -> Result<(), Error> {
        let manager = ctx.manager::<NewsManager>("News")?;
        ctx.page_mut().add_var("titles", manager.titles())
    }

    fn show(&mut self, ctx: &mut ControllerContext, req: &HttpRequest) -> Result<(), Error> {
        let id: usize = req
            .query("id")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| Error::InvalidArgument("bad id".to_string()))?;
        let manager = ctx.manager::<NewsManager>("News")?;

        match manager.find(id) {
            Some((title, body)) => {
                ctx.page_mut().add_var("title", title)?;
                ctx.page_mut().add_var("body", body)
            }
            None => {
                ctx.redirect("/");
                Ok(())
            }
        }
    }
}

impl Controller for NewsController {
    fn actions() -> ActionMap<Self> {
        ActionMap::new()
            .action("index", Self::index)
            .action("show", Self::show)
    }
}

#[derive(Default)]
struct ConnexionController;

impl ConnexionController {
    fn login(&mut self, ctx: &mut ControllerContext, req: &HttpRequest) -> Result<(), Error> {
        match req.post_data("login") {
            Some(login) => {
                ctx.response_mut()
                    .set_cookie(Cookie::new("user", login).path("/admin/"));
                ctx.redirect("/admin/");
            }
            None => ctx.page_mut().add_var("title", "Connexion")?,
        }
        Ok(())
    }
}

impl Controller for ConnexionController {
    fn actions() -> ActionMap<Self> {
        ActionMap::new().action("index", Self::login)
    }
}

const FRONTEND: &str = r#"
name = "Frontend"

[views]
root = "Applications"
not_found = "Errors/404.html"

[[routes]]
pattern = "/"
module = "News"
action = "index"

[[routes]]
pattern = "/news-(\\d+)\\.html"
module = "News"
action = "show"
vars = "id"
"#;

fn database() -> Database {
    Database {
        news: vec![("Launch", "We are live"), ("Update", "Version two")],
    }
}

fn managers() -> ManagerFactories {
    let mut managers = ManagerFactories::new();
    managers.register_typed::<Database, _, _>("News", "PDO", |db| NewsManager { db });
    managers
}

fn frontend(renderer: RecordingRenderer) -> Application {
    let config = AppConfig::from_str(FRONTEND, FileFormat::Toml).unwrap();

    Application::from_config(&config)
        .unwrap()
        .controller("News", NewsController::default)
        .managers(managers())
        .connection(database())
        .renderer(renderer)
        .build()
        .unwrap()
}

// =============================================================================
// Frontend
// =============================================================================

#[test]
fn test_home_page_lists_news() {
    let renderer = RecordingRenderer::new();
    let app = frontend(renderer.clone());

    let response = TestResponse::new(app.run(HttpRequest::get("/")));

    response.assert_status(200);
    assert_body_contains(&response, r#"titles=["Launch","Update"]"#);
    assert_eq!(
        renderer.rendered(),
        vec![
            "Applications/Frontend/Modules/News/Views/index.php",
            "Applications/Frontend/Templates/layout.php",
        ]
    );
}

#[test]
fn test_show_page_binds_id_from_url() {
    let app = frontend(RecordingRenderer::new());

    let response = TestResponse::new(app.run(HttpRequest::get("/news-1.html")));

    response
        .assert_status(200)
        .assert_body_contains("body=Version two,title=Update");
}

#[test]
fn test_missing_news_redirects_home() {
    let renderer = RecordingRenderer::new();
    let app = frontend(renderer.clone());

    let response = TestResponse::new(app.run(HttpRequest::get("/news-9.html")));

    assert_redirect(&response, "/");
    assert!(renderer.rendered().is_empty());
}

#[test]
fn test_unknown_url_renders_not_found_page() {
    let renderer = RecordingRenderer::new();
    let app = frontend(renderer.clone());

    let response = TestResponse::new(app.run(HttpRequest::get("/news-abc.html")));

    response.assert_status(404);
    assert_eq!(
        renderer.rendered(),
        vec![
            "Applications/Errors/404.html",
            "Applications/Frontend/Templates/layout.php",
        ]
    );
    assert_body_contains(&response, "content=Applications/Errors/404.html|");
}

#[test]
fn test_missing_not_found_page_falls_back_to_plain_404() {
    let renderer = RecordingRenderer::new().with_missing("Applications/Errors/404.html");
    let app = frontend(renderer);

    let response = app.run(HttpRequest::get("/nope"));

    assert_eq!(response.status, 404);
    assert_eq!(response.body_string(), "Not Found");
}

#[test]
fn test_query_string_does_not_affect_matching() {
    let app = frontend(RecordingRenderer::new());

    let dispatch = app
        .get_controller(HttpRequest::get("/news-0.html?ref=home"))
        .unwrap();

    let Dispatch::Found(resolved) = dispatch else {
        panic!("expected a match");
    };
    assert_eq!(resolved.handler.module(), "News");
    assert_eq!(resolved.request.query("id"), Some("0"));
    assert_eq!(resolved.request.query("ref"), Some("home"));
}

#[test]
fn test_unregistered_module_is_server_error() {
    let config = AppConfig::from_str(FRONTEND, FileFormat::Toml).unwrap();
    let app = Application::from_config(&config)
        .unwrap()
        .renderer(RecordingRenderer::new())
        .build()
        .unwrap();

    let response = app.run(HttpRequest::get("/"));

    assert_eq!(response.status, 500);
    assert_eq!(response.body_string(), "Internal Server Error");
}

// =============================================================================
// Backend
// =============================================================================

#[test]
fn test_backend_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "name": "Backend",
            "routes": [
                {{ "pattern": "/admin/", "module": "Connexion", "action": "index" }}
            ]
        }}"#
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    let app = Application::from_config(&config)
        .unwrap()
        .controller("Connexion", ConnexionController::default)
        .renderer(RecordingRenderer::new())
        .build()
        .unwrap();

    let form = TestResponse::new(app.run(HttpRequest::get("/admin/")));
    form.assert_status(200).assert_body_contains("title=Connexion");

    let login = TestResponse::new(
        app.run(HttpRequest::post("/admin/").with_form_body("login=admin")),
    );
    assert_redirect(&login, "/admin/");
    let cookie = login.cookie("user").unwrap();
    assert_eq!(cookie.value, "admin");
    assert_eq!(cookie.path.as_deref(), Some("/admin/"));
}

#[test]
fn test_log_settings_from_config() {
    let config = AppConfig::from_str(
        "[log]\nlevel = \"debug\"\nformat = \"pretty\"\n",
        FileFormat::Toml,
    )
    .unwrap();

    assert!(config.log_config().is_ok());
    assert_eq!(config.name, "Frontend");
}
