mod common;

use common::{
    mount_delayed_page, mount_error_page, mount_page, mount_redirect, test_config,
};
use email_harvest_core::utils::export::write_csv;
use email_harvest_core::{
    initialize_harvester, tasks_from_index, AppError, BatchProgress, BatchTask, ContactRecord,
    KeywordIndex, ProgressCallback,
};

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEAM_PAGE: &str = r#"<html><head><title>Acme Dental | Team</title></head><body>
  <section>
    <ul>
      <li><a href="mailto:jane@acme.com">Jane Doe</a></li>
      <li><p>Contact John Smith at john@example.org for details.</p></li>
    </ul>
  </section>
</body></html>"#;

fn contact(email: &str, name: &str) -> ContactRecord {
    ContactRecord {
        email: email.to_string(),
        name: name.to_string(),
    }
}

#[tokio::test]
async fn test_single_page_extraction() {
    let server = MockServer::start().await;
    mount_page(&server, "/team", TEAM_PAGE).await;

    let harvester = initialize_harvester(Arc::new(test_config(Duration::from_secs(5)))).unwrap();
    let contacts = harvester
        .extract_from_url(&format!("{}/team", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        contacts,
        vec![
            contact("jane@acme.com", "Jane Doe"),
            contact("john@example.org", "John Smith"),
        ]
    );
}

#[tokio::test]
async fn test_request_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .and(header("user-agent", "email-harvest-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello@acme.com</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = initialize_harvester(Arc::new(test_config(Duration::from_secs(5)))).unwrap();
    let contacts = harvester
        .extract_from_url(&format!("{}/about", server.uri()))
        .await
        .unwrap();
    assert_eq!(contacts, vec![contact("hello@acme.com", "")]);
}

#[tokio::test]
async fn test_error_status_body_is_still_extracted() {
    let server = MockServer::start().await;
    mount_error_page(
        &server,
        "/missing",
        404,
        r#"<p>Page moved. Write to <a href="mailto:web@acme.com">Site Admin</a>.</p>"#,
    )
    .await;

    let harvester = initialize_harvester(Arc::new(test_config(Duration::from_secs(5)))).unwrap();
    let contacts = harvester
        .extract_from_url(&format!("{}/missing", server.uri()))
        .await
        .unwrap();
    assert_eq!(contacts, vec![contact("web@acme.com", "Site Admin")]);
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/old-team", "/team").await;
    mount_page(&server, "/team", TEAM_PAGE).await;

    let harvester = initialize_harvester(Arc::new(test_config(Duration::from_secs(5)))).unwrap();
    let contacts = harvester
        .extract_from_url(&format!("{}/old-team", server.uri()))
        .await
        .unwrap();
    assert_eq!(contacts.len(), 2);
}

#[tokio::test]
async fn test_single_page_timeout_is_fetch_error() {
    let server = MockServer::start().await;
    mount_delayed_page(&server, "/slow", TEAM_PAGE, Duration::from_secs(3)).await;

    let harvester =
        initialize_harvester(Arc::new(test_config(Duration::from_secs(1)))).unwrap();
    let result = harvester
        .extract_from_url(&format!("{}/slow", server.uri()))
        .await;
    assert!(matches!(result, Err(AppError::Fetch { .. })));
}

#[tokio::test]
async fn test_batch_with_timed_out_task() {
    let server = MockServer::start().await;
    mount_page(&server, "/one", r#"<a href="mailto:ann@one.example">Ann Lee</a>"#).await;
    mount_delayed_page(&server, "/two", "<p>bob@two.example</p>", Duration::from_secs(3)).await;
    mount_page(&server, "/three", "<p>Carl Berg: carl@three.example</p>").await;

    let harvester =
        initialize_harvester(Arc::new(test_config(Duration::from_secs(1)))).unwrap();
    let tasks = ["/one", "/two", "/three"]
        .iter()
        .map(|p| BatchTask::new("clinics", format!("{}{}", server.uri(), p)))
        .collect();

    let seen = Arc::new(Mutex::new(Vec::<BatchProgress>::new()));
    let sink = Arc::clone(&seen);
    let progress: ProgressCallback = Arc::new(move |p: BatchProgress| sink.lock().push(p));

    let report = harvester
        .run_batch(tasks, Some(3), Some(progress))
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(!report.outcomes[0].is_failure());
    assert!(report.outcomes[1].is_failure());
    assert!(report.outcomes[1].contacts.is_empty());
    assert!(!report.outcomes[2].is_failure());
    assert_eq!(report.progress, BatchProgress { done: 3, total: 3 });

    let emails: Vec<&str> = report.rows.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, vec!["ann@one.example", "carl@three.example"]);

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen.last().map(|p| p.done), Some(3));
    assert!(seen.windows(2).all(|w| w[0].done <= w[1].done));
}

#[tokio::test]
async fn test_unreachable_host_is_contained() {
    let server = MockServer::start().await;
    mount_page(&server, "/ok", "<p>ok@acme.com</p>").await;

    let harvester = initialize_harvester(Arc::new(test_config(Duration::from_secs(2)))).unwrap();
    let tasks = vec![
        BatchTask::new("g", "http://127.0.0.1:1/"),
        BatchTask::new("g", format!("{}/ok", server.uri())),
    ];
    let report = harvester.run_batch(tasks, Some(2), None).await.unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].is_failure());
    assert_eq!(report.rows.len(), 1);
}

#[tokio::test]
async fn test_invalid_batch_is_rejected() {
    let harvester = initialize_harvester(Arc::new(test_config(Duration::from_secs(2)))).unwrap();
    assert!(matches!(
        harvester.run_batch(Vec::new(), None, None).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        harvester
            .run_batch(vec![BatchTask::new("g", "https://a.example")], Some(65), None)
            .await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_keyword_search_to_csv_rows() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "<p>Reach Ana Lopez at a@b.com</p>").await;
    mount_page(&server, "/b", "<p>a@b.com</p><p>desk@b.com</p>").await;

    let index_json = format!(
        r#"[
            {{"url": "{0}/a", "title": "Bright Smiles Dentist", "keywords": ["dentist"]}},
            {{"url": "{0}/b", "title": "Family Dentist", "keywords": ["dentist"]}}
        ]"#,
        server.uri()
    );
    let index = KeywordIndex::from_json_str(&index_json).unwrap();
    let tasks = tasks_from_index(&index, "dentist", 10).unwrap();
    assert_eq!(tasks.len(), 2);

    let harvester = initialize_harvester(Arc::new(test_config(Duration::from_secs(5)))).unwrap();
    let report = harvester.run_batch(tasks, Some(2), None).await.unwrap();

    let mut buffer = Vec::new();
    write_csv(&report.rows, &mut buffer).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "Keyword,Name,Email\ndentist,Ana Lopez,a@b.com\ndentist,,desk@b.com\n"
    );
}
