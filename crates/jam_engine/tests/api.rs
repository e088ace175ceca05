use std::time::Duration;

use jam_engine::{
    ApiError, ApiSettings, CollectionSummary, DashboardApi, ModifyAction, MutationResponse,
    ReqwestApi, TaskStatusPayload,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("api client")
}

#[tokio::test]
async fn task_status_parses_progress_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/t1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "PROGRESS",
            "current": 5,
            "total": 20,
            "status": "In progress"
        })))
        .mount(&server)
        .await;

    let status = api_for(&server).fetch_task_status("t1").await.unwrap();
    assert_eq!(
        status,
        TaskStatusPayload {
            state: "PROGRESS".to_string(),
            current: Some(5),
            total: Some(20),
            status: Some("In progress".to_string()),
        }
    );
}

#[tokio::test]
async fn task_status_tolerates_missing_counters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/t2/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "RETRY" })))
        .mount(&server)
        .await;

    let status = api_for(&server).fetch_task_status("t2").await.unwrap();
    assert_eq!(status.state, "RETRY");
    assert_eq!(status.total, None);
}

#[tokio::test]
async fn modify_posts_ids_and_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/liked/modify_companies"))
        .and(body_json(json!({ "company_ids": [3, 7], "action": "remove" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "in_progress", "task_id": "abc" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = api_for(&server)
        .request_mutation("liked", &[3, 7], ModifyAction::Remove)
        .await
        .unwrap();
    assert_eq!(
        response,
        MutationResponse::InProgress {
            task_id: "abc".to_string()
        }
    );
}

#[tokio::test]
async fn select_all_and_clear_use_their_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/all/select_all/liked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "completed" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/collections/liked/delete_all_associations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "in_progress", "task_id": "wipe" })),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(
        api.request_select_all("all", "liked").await.unwrap(),
        MutationResponse::Completed
    );
    assert_eq!(
        api.request_clear_collection("liked").await.unwrap(),
        MutationResponse::InProgress {
            task_id: "wipe".to_string()
        }
    );
}

#[tokio::test]
async fn unknown_mutation_status_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/all/select_all/liked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .request_select_all("all", "liked")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[tokio::test]
async fn http_errors_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/liked/modify_companies"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"detail":"No company IDs provided."}"#),
        )
        .mount(&server)
        .await;

    let err = api_for(&server)
        .request_mutation("liked", &[], ModifyAction::Add)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::HttpStatus {
            status: 400,
            body: r#"{"detail":"No company IDs provided."}"#.to_string(),
        }
    );
}

#[tokio::test]
async fn page_fetch_sends_offset_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/all"))
        .and(query_param("offset", "25"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "all",
            "collection_name": "My List",
            "companies": [
                { "id": 26, "company_name": "Acme", "liked": true }
            ],
            "total": 60
        })))
        .mount(&server)
        .await;

    let page = api_for(&server).fetch_page("all", 25, 25).await.unwrap();
    assert_eq!(page.total, 60);
    assert_eq!(page.companies[0].id, 26);
    assert!(page.companies[0].liked);
}

#[tokio::test]
async fn collections_list_parses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "all", "collection_name": "My List" },
            { "id": "liked", "collection_name": "Liked Companies" }
        ])))
        .mount(&server)
        .await;

    let collections = api_for(&server).fetch_collections().await.unwrap();
    assert_eq!(
        collections[1],
        CollectionSummary {
            id: "liked".to_string(),
            collection_name: "Liked Companies".to_string(),
        }
    );
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/slow/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "state": "PENDING" })),
        )
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.fetch_task_status("slow").await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Port 9 (discard) is closed on test machines.
    let api = ReqwestApi::new(ApiSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        connect_timeout: Duration::from_millis(200),
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.fetch_collections().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_) | ApiError::Timeout));
}
