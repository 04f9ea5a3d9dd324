//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: client → REST transport → HTTP → decoded resources

use futures::StreamExt;
use logging_config::auth::Credentials;
use logging_config::client::{CallOptions, ConfigServiceV2Client};
use logging_config::config::{load_client_options, ClientOptions, EnvSettings};
use logging_config::model::{FieldMask, GetBucketRequest, LifecycleState, LogSink};
use logging_config::resource_names::{log_sink_path, parse_log_sink_path};
use logging_config::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{
    body_json, header, header_exists, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, options: ClientOptions) -> ConfigServiceV2Client {
    ConfigServiceV2Client::builder()
        .env_settings(EnvSettings::default())
        .client_options(options.with_api_endpoint(server.uri()))
        .build()
        .unwrap()
}

fn anonymous_client(server: &MockServer) -> ConfigServiceV2Client {
    ConfigServiceV2Client::builder()
        .env_settings(EnvSettings::default())
        .client_options(ClientOptions::default().with_api_endpoint(server.uri()))
        .credentials(Credentials::Anonymous)
        .build()
        .unwrap()
}

fn sink_json(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "destination": format!("storage.googleapis.com/{name}-bucket"),
        "filter": "severity>=ERROR",
        "outputVersionFormat": "V2",
        "writerIdentity": "serviceAccount:p-123@gcp-sa-logging.iam.gserviceaccount.com"
    })
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_list_sinks_walks_every_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/sinks"))
        .and(query_param_is_missing("pageToken"))
        .and(header("x-goog-api-key", "test-key"))
        .and(header("x-goog-request-params", "parent=projects%2Fp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sinks": [sink_json("a"), sink_json("b")],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/sinks"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sinks": [sink_json("c")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ClientOptions::default().with_api_key("test-key"));
    let pager = client
        .list_sinks(None, Some("projects/p"), CallOptions::new())
        .await
        .unwrap();
    assert!(pager.has_next_page());

    let sinks: Vec<LogSink> = pager
        .items()
        .map(Result::unwrap)
        .collect()
        .await;

    let names: Vec<&str> = sinks.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(sinks[2].destination, "storage.googleapis.com/c-bucket");
}

#[tokio::test]
async fn test_pager_outlives_dropped_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/sinks"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sinks": [sink_json("a")],
            "nextPageToken": "t1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/sinks"))
        .and(query_param("pageToken", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sinks": [sink_json("b")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pager = {
        let client = anonymous_client(&server);
        client
            .list_sinks(None, Some("projects/p"), CallOptions::new())
            .await
            .unwrap()
    };

    let names: Vec<String> = pager
        .items()
        .map(|sink| sink.unwrap().name)
        .collect()
        .await;
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn test_list_error_ends_item_stream() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/exclusions"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "exclusions": [{"name": "e1", "filter": "resource.type=gce_instance"}],
            "nextPageToken": "gone"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/exclusions"))
        .and(query_param("pageToken", "gone"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "status": "INVALID_ARGUMENT", "message": "page token expired"}
        })))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let mut items = client
        .list_exclusions(None, Some("projects/p"), CallOptions::new())
        .await
        .unwrap()
        .items();

    assert_eq!(items.next().await.unwrap().unwrap().name, "e1");
    match items.next().await {
        Some(Err(Error::Api { code, status, .. })) => {
            assert_eq!(code, 400);
            assert_eq!(status, "INVALID_ARGUMENT");
        }
        other => panic!("unexpected item: {other:?}"),
    }
    assert!(items.next().await.is_none());
}

// ============================================================================
// Retry defaults
// ============================================================================

#[tokio::test]
async fn test_get_sink_retries_unavailable() {
    let server = MockServer::start().await;
    let name = log_sink_path("p", "errors");

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/sinks/errors"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/sinks/errors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sink_json(&name)))
        .expect(1)
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let sink = client
        .get_sink(None, Some(&name), CallOptions::new())
        .await
        .unwrap();

    assert_eq!(sink.name, "projects/p/sinks/errors");
    assert_eq!(
        parse_log_sink_path(&sink.name).unwrap()["sink"],
        "errors".to_string()
    );
}

#[tokio::test]
async fn test_bucket_calls_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/locations/global/buckets/b"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "status": "UNAVAILABLE", "message": "try later"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let request = GetBucketRequest {
        name: "projects/p/locations/global/buckets/b".to_string(),
    };
    let err = client
        .get_bucket(request, CallOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_update_sink_sends_mask_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/projects/p/sinks/s"))
        .and(query_param("updateMask", "filter,description"))
        .and(body_json(json!({
            "name": "s",
            "destination": "",
            "filter": "severity>=WARNING",
            "description": "warnings",
            "disabled": false,
            "outputVersionFormat": "VERSION_FORMAT_UNSPECIFIED",
            "writerIdentity": "",
            "includeChildren": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "s",
            "filter": "severity>=WARNING",
            "description": "warnings",
            "updateTime": "2024-05-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let sink = LogSink {
        name: "s".to_string(),
        filter: "severity>=WARNING".to_string(),
        description: "warnings".to_string(),
        ..Default::default()
    };
    let updated = client
        .update_sink(
            None,
            Some("projects/p/sinks/s"),
            Some(sink),
            Some("filter,description".parse::<FieldMask>().unwrap()),
            CallOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(updated.description, "warnings");
    assert!(updated.update_time.is_some());
}

#[tokio::test]
async fn test_undelete_and_get_bucket() {
    let server = MockServer::start().await;
    let name = "projects/p/locations/global/buckets/b";

    Mock::given(method("POST"))
        .and(path("/v2/projects/p/locations/global/buckets/b:undelete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/locations/global/buckets/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "retentionDays": 30,
            "lifecycleState": "ACTIVE"
        })))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    client
        .undelete_bucket(
            logging_config::model::UndeleteBucketRequest {
                name: name.to_string(),
            },
            CallOptions::new(),
        )
        .await
        .unwrap();

    let bucket = client
        .get_bucket(
            GetBucketRequest {
                name: name.to_string(),
            },
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(bucket.retention_days, 30);
    assert_eq!(bucket.lifecycle_state, LifecycleState::Active);
}

// ============================================================================
// Construction
// ============================================================================

#[tokio::test]
async fn test_service_account_client_signs_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/organizations/123/cmekSettings"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "organizations/123/cmekSettings",
            "serviceAccountId": "cmek-123@gcp-sa-logging.iam.gserviceaccount.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let builder = ConfigServiceV2Client::builder()
        .env_settings(EnvSettings::default())
        .client_options(ClientOptions::default().with_api_endpoint(server.uri()));
    let client = ConfigServiceV2Client::from_service_account_file(
        "tests/fixtures/service_account.json",
        builder,
    )
    .unwrap();

    let settings = client
        .get_cmek_settings(
            logging_config::model::GetCmekSettingsRequest {
                name: "organizations/123/cmekSettings".to_string(),
            },
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(
        settings.service_account_id,
        "cmek-123@gcp-sa-logging.iam.gserviceaccount.com"
    );

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert!(auth.to_str().unwrap().starts_with("Bearer "));
}

#[tokio::test]
async fn test_client_from_options_file() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/projects/p/exclusions/e"))
        .and(header("x-goog-api-key", "file-key"))
        .and(header("x-goog-user-project", "billing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "api_endpoint: {}\napi_key: file-key\nquota_project_id: billing",
        server.uri()
    )
    .unwrap();

    let options = load_client_options(file.path()).unwrap();
    let client = ConfigServiceV2Client::builder()
        .env_settings(EnvSettings::default())
        .client_options(options)
        .build()
        .unwrap();

    client
        .delete_exclusion(None, Some("projects/p/exclusions/e"), CallOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_closed_client_transport_rejects_calls() {
    let server = MockServer::start().await;
    let client = anonymous_client(&server);
    let transport = client.transport().clone();

    client.close();
    assert!(transport.is_closed());

    let shared = ConfigServiceV2Client::builder()
        .env_settings(EnvSettings::default())
        .transport(transport)
        .build()
        .unwrap();
    let err = shared
        .get_sink(None, Some("projects/p/sinks/s"), CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransportClosed));
    assert!(server.received_requests().await.unwrap().is_empty());
}
