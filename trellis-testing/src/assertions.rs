// Test assertions for responses

use crate::TestResponse;
use trellis_core::Dispatch;

/// Assert that a response has a specific status code
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status();
    assert_eq!(
        actual, expected,
        "Expected status {}, got {} (body: {})",
        expected,
        actual,
        response.body_string()
    );
}

/// Assert that a response has a specific header
pub fn assert_header(response: &TestResponse, key: &str, expected: &str) {
    let actual = response.header(key);
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        key,
        expected,
        actual
    );
}

/// Assert that a response body contains a string
pub fn assert_body_contains(response: &TestResponse, expected: &str) {
    let body = response.body_string();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}', but it didn't. Body: {}",
        expected,
        body
    );
}

/// Assert that a response redirects to `location`
pub fn assert_redirect(response: &TestResponse, location: &str) {
    let status = response.status();
    assert!(
        (300..400).contains(&status),
        "Expected a redirect (3xx), got {}",
        status
    );
    assert_header(response, "Location", location);
}

/// Assert that a dispatch resolved to `module`/`action`
pub fn assert_dispatched(dispatch: &Dispatch, module: &str, action: &str) {
    match dispatch {
        Dispatch::Found(resolved) => {
            assert_eq!(
                (resolved.handler.module(), resolved.handler.action()),
                (module, action),
                "Dispatched to the wrong handler"
            );
        }
        Dispatch::NotFound { path } => {
            panic!("Expected {}::{} but no route matched {}", module, action, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::HttpResponse;

    #[test]
    fn test_assert_status_passes() {
        let response = TestResponse::new(HttpResponse::ok());
        assert_status(&response, 200);
    }

    #[test]
    #[should_panic(expected = "Expected status 404, got 200")]
    fn test_assert_status_fails() {
        let response = TestResponse::new(HttpResponse::ok());
        assert_status(&response, 404);
    }

    #[test]
    fn test_assert_redirect() {
        let response = TestResponse::new(HttpResponse::redirect("/news"));
        assert_redirect(&response, "/news");
    }

    #[test]
    #[should_panic(expected = "Expected body to contain")]
    fn test_assert_body_contains_fails() {
        let response = TestResponse::new(HttpResponse::html(200, "<p>hi</p>"));
        assert_body_contains(&response, "bye");
    }

    #[test]
    #[should_panic(expected = "no route matched /x")]
    fn test_assert_dispatched_not_found() {
        let dispatch = Dispatch::NotFound {
            path: "/x".to_string(),
        };
        assert_dispatched(&dispatch, "News", "list");
    }
}
