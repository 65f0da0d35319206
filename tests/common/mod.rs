#![allow(dead_code)]

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use std::time::Duration;

use email_harvest_core::{Config, ConfigBuilder};

/// Config for tests: short timeout, no config file lookup.
pub fn test_config(timeout: Duration) -> Config {
    ConfigBuilder::new()
        .without_default_locations()
        .request_timeout(timeout)
        .user_agent("email-harvest-tests/1.0")
        .build()
        .expect("test config is valid")
}

/// Serves `html` at `url_path` with a 200 status.
pub async fn mount_page(server: &MockServer, url_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Serves `html` at `url_path` only after `delay`, to simulate a hung server.
pub async fn mount_delayed_page(server: &MockServer, url_path: &str, html: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Serves `html` at `url_path` with an error status.
pub async fn mount_error_page(server: &MockServer, url_path: &str, status_code: u16, html: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status_code).set_body_string(html.to_string()))
        .mount(server)
        .await;
}

/// Answers `url_path` with a redirect to `location`.
pub async fn mount_redirect(server: &MockServer, url_path: &str, location: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(302).insert_header("location", location))
        .mount(server)
        .await;
}
