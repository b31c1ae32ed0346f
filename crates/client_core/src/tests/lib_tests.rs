use super::*;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use url::Url;

fn entry(name: &str, role: &str, region: &str, order: i64, featured: bool) -> TechnologistEntry {
    TechnologistEntry {
        name: name.to_string(),
        role: role.to_string(),
        region: region.to_string(),
        location: format!("{name}ville"),
        link: Url::parse(&format!("https://example.com/{}", name.to_lowercase())).expect("link"),
        order,
        featured,
    }
}

fn submission() -> JoinSubmission {
    JoinSubmission {
        name: "Noa Akana".to_string(),
        location: "Hilo, HI".to_string(),
        website: "https://noa.dev".to_string(),
        focuses: vec!["Engineering".to_string()],
        focus_suggested: None,
        title: None,
        years_experience: "1 – 4 years".to_string(),
    }
}

async fn spawn_app(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn seeded_client(server_url: String) -> DirectoryClient<StdRng> {
    DirectoryClient::with_rng(server_url, StdRng::seed_from_u64(11))
}

#[tokio::test]
async fn load_directory_populates_the_store() {
    let roster = vec![
        entry("Kai", "Engineer", "Oahu", 1, false),
        entry("Leilani", "Designer", "Maui", 2, true),
    ];
    let server_url = spawn_app(Router::new().route(
        "/api/technologists",
        get(move || {
            let roster = roster.clone();
            async move { Json(roster) }
        }),
    ))
    .await;

    let mut client = seeded_client(server_url);
    assert_eq!(client.load_directory().await, 2);

    let visible = client.visible().expect("visible");
    assert_eq!(visible.len(), 2);
    assert_eq!(client.store().facets().len(), 4);

    client.toggle_facet(FilterCategory::Role, "Engineer");
    let visible = client.visible().expect("visible");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Kai");
}

#[tokio::test]
async fn an_unreachable_server_initializes_a_loaded_empty_directory() {
    let mut client = seeded_client("http://127.0.0.1:1".to_string());
    assert_eq!(client.load_directory().await, 0);
    assert!(client.store().is_initialized());
    assert_eq!(client.visible(), Some(&[][..]));
    assert!(client.store().facets().is_empty());
}

#[tokio::test]
async fn a_server_error_also_falls_back_to_an_empty_directory() {
    let server_url = spawn_app(Router::new().route(
        "/api/technologists",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;

    let mut client = seeded_client(server_url);
    assert_eq!(client.load_directory().await, 0);
    assert_eq!(client.visible(), Some(&[][..]));
}

#[tokio::test]
async fn submit_join_returns_the_receipt() {
    let server_url = spawn_app(Router::new().route(
        "/api/join",
        post(|| async {
            (
                StatusCode::CREATED,
                Json(JoinSubmissionReceipt { submission_id: 42 }),
            )
        }),
    ))
    .await;

    let client = seeded_client(server_url);
    let receipt = client.submit_join(&submission()).await.expect("receipt");
    assert_eq!(receipt.submission_id, 42);
}

#[tokio::test]
async fn submit_join_surfaces_a_rejection() {
    let server_url = spawn_app(Router::new().route(
        "/api/join",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, "Name is required.")),
            )
        }),
    ))
    .await;

    let client = seeded_client(server_url);
    let err = client
        .submit_join(&submission())
        .await
        .expect_err("should fail");
    match err {
        JoinSubmitError::Rejected(exception) => {
            assert_eq!(exception.code, ErrorCode::Validation);
        }
        other => panic!("unexpected error: {other}"),
    }
}

async fn filled_wizard() -> JoinWizard<MemoryDraftStore> {
    let mut wizard = JoinWizard::new(MemoryDraftStore::default());
    wizard
        .save_you("Noa Akana", "Hilo, HI", "https://noa.dev")
        .await
        .expect("you");
    wizard
        .save_work(&["Engineering".to_string()], None)
        .await
        .expect("work");
    wizard
        .save_background(None, "1 – 4 years")
        .await
        .expect("background");
    wizard
}

#[tokio::test]
async fn submit_wizard_clears_the_draft_on_success() {
    let server_url = spawn_app(Router::new().route(
        "/api/join",
        post(|| async {
            (
                StatusCode::CREATED,
                Json(JoinSubmissionReceipt { submission_id: 7 }),
            )
        }),
    ))
    .await;

    let client = seeded_client(server_url);
    let mut wizard = filled_wizard().await;
    let receipt = client
        .submit_wizard(&mut wizard)
        .await
        .expect("receipt");
    assert_eq!(receipt.submission_id, 7);
    assert_eq!(
        wizard.load_draft().await.expect("draft"),
        JoinDraft::default()
    );
}

#[tokio::test]
async fn submit_wizard_keeps_the_draft_when_rejected() {
    let server_url = spawn_app(Router::new().route(
        "/api/join",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, "Name is required.")),
            )
        }),
    ))
    .await;

    let client = seeded_client(server_url);
    let mut wizard = filled_wizard().await;
    let err = client
        .submit_wizard(&mut wizard)
        .await
        .expect_err("should fail");
    assert!(matches!(err, JoinFlowError::Submit(_)));
    assert_eq!(wizard.load_draft().await.expect("draft").name, "Noa Akana");
}

#[tokio::test]
async fn panel_passthroughs_reach_the_store() {
    let roster = vec![entry("Kai", "Engineer", "Oahu", 1, false)];
    let server_url = spawn_app(Router::new().route(
        "/api/technologists",
        get(move || {
            let roster = roster.clone();
            async move { Json(roster) }
        }),
    ))
    .await;

    let mut client = seeded_client(server_url);
    client.load_directory().await;

    client.open_filter_panel(FilterCategory::Region);
    let panel: Vec<&str> = client
        .panel_facets()
        .iter()
        .map(|f| f.label.as_str())
        .collect();
    assert_eq!(panel, vec!["Oahu"]);

    client.close_filter_panel();
    assert!(client.panel_facets().is_empty());
}
