//! Tests for the transport module

use super::*;
use crate::auth::Credentials;
use crate::error::Error;
use crate::model::FieldMask;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> RestTransport {
    let mut config = TransportConfig::new(server.uri());
    config.credentials = Some(Credentials::Anonymous);
    RestTransport::new(config).unwrap()
}

fn routed(key: &str, value: &str) -> CallSettings {
    CallSettings {
        metadata: vec![(
            "x-goog-request-params".to_string(),
            format!("{key}={}", value.replace('/', "%2F")),
        )],
        ..Default::default()
    }
}

fn api_client_header() -> String {
    crate::config::ClientInfo::default().to_api_client_header()
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_default_is_rest() {
    let registry = TransportRegistry::default();
    assert_eq!(registry.names(), vec!["rest"]);
    assert_eq!(registry.default_name(), Some("rest"));
    assert!(registry.get(None).is_ok());
    assert!(registry.get(Some("rest")).is_ok());
}

#[test]
fn test_registry_unknown_name() {
    let registry = TransportRegistry::default();
    let err = registry.get(Some("grpc")).err().unwrap();
    match err {
        Error::UnknownTransport { name, available } => {
            assert_eq!(name, "grpc");
            assert_eq!(available, "rest");
        }
        other => panic!("expected UnknownTransport, got {other:?}"),
    }
}

#[test]
fn test_registry_empty_has_no_default() {
    let registry = TransportRegistry::empty();
    assert!(registry.default_name().is_none());
    assert!(matches!(
        registry.get(None),
        Err(Error::UnknownTransport { .. })
    ));
}

#[test]
fn test_registry_first_entry_stays_default() {
    let mut registry = TransportRegistry::default();
    registry.register("local", |mut config: TransportConfig| {
        config.credentials = Some(Credentials::Anonymous);
        let transport: Arc<dyn ConfigServiceV2Transport> = Arc::new(RestTransport::new(config)?);
        Ok(transport)
    });

    assert_eq!(registry.names(), vec!["rest", "local"]);
    assert_eq!(registry.default_name(), Some("rest"));

    let transport = registry
        .create(Some("local"), TransportConfig::new("http://localhost:9"))
        .unwrap();
    assert_eq!(transport.host(), "http://localhost:9");
}

// ============================================================================
// REST mapping
// ============================================================================

#[tokio::test]
async fn test_list_sinks_query_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/sinks"))
        .and(query_param("pageToken", "t1"))
        .and(query_param("pageSize", "2"))
        .and(header("x-goog-request-params", "parent=projects%2Fp"))
        .and(header("x-goog-api-client", api_client_header()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sinks": [{"name": "a"}, {"name": "b"}],
            "nextPageToken": "t2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let response = transport
        .list_sinks(
            ListSinksRequest {
                parent: "projects/p".to_string(),
                page_token: "t1".to_string(),
                page_size: 2,
            },
            routed("parent", "projects/p"),
        )
        .await
        .unwrap();

    assert_eq!(response.sinks.len(), 2);
    assert_eq!(response.next_page_token, "t2");
}

#[tokio::test]
async fn test_first_list_omits_empty_page_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/p/exclusions"))
        .and(query_param_is_missing("pageToken"))
        .and(query_param_is_missing("pageSize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let response = transport
        .list_exclusions(
            ListExclusionsRequest {
                parent: "projects/p".to_string(),
                ..Default::default()
            },
            CallSettings::default(),
        )
        .await
        .unwrap();

    assert!(response.exclusions.is_empty());
}

#[tokio::test]
async fn test_create_bucket() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/projects/p/locations/global/buckets"))
        .and(query_param("bucketId", "audit"))
        .and(body_json(json!({
            "name": "",
            "description": "audit logs",
            "retentionDays": 400,
            "locked": false,
            "lifecycleState": "LIFECYCLE_STATE_UNSPECIFIED"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/p/locations/global/buckets/audit",
            "retentionDays": 400,
            "lifecycleState": "ACTIVE"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let bucket = transport
        .create_bucket(
            CreateBucketRequest {
                parent: "projects/p/locations/global".to_string(),
                bucket_id: "audit".to_string(),
                bucket: Some(LogBucket {
                    description: "audit logs".to_string(),
                    retention_days: 400,
                    ..Default::default()
                }),
            },
            CallSettings::default(),
        )
        .await
        .unwrap();

    assert_eq!(bucket.name, "projects/p/locations/global/buckets/audit");
    assert_eq!(bucket.lifecycle_state, crate::model::LifecycleState::Active);
}

#[tokio::test]
async fn test_update_sink_uses_put_with_mask() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/projects/p/sinks/s"))
        .and(query_param("updateMask", "filter,description"))
        .and(query_param("uniqueWriterIdentity", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "s",
            "filter": "severity>=WARNING"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let sink = transport
        .update_sink(
            UpdateSinkRequest {
                sink_name: "projects/p/sinks/s".to_string(),
                sink: Some(LogSink {
                    filter: "severity>=WARNING".to_string(),
                    ..Default::default()
                }),
                unique_writer_identity: true,
                update_mask: Some(FieldMask::new(["filter", "description"])),
            },
            CallSettings::default(),
        )
        .await
        .unwrap();

    assert_eq!(sink.filter, "severity>=WARNING");
}

#[tokio::test]
async fn test_update_without_mask_omits_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v2/projects/p/cmekSettings"))
        .and(query_param_is_missing("updateMask"))
        .and(body_json(json!({
            "name": "",
            "kmsKeyName": "projects/k/locations/l/keyRings/r/cryptoKeys/c",
            "serviceAccountId": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/p/cmekSettings",
            "kmsKeyName": "projects/k/locations/l/keyRings/r/cryptoKeys/c"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let settings = transport
        .update_cmek_settings(
            UpdateCmekSettingsRequest {
                name: "projects/p/cmekSettings".to_string(),
                cmek_settings: Some(CmekSettings {
                    kms_key_name: "projects/k/locations/l/keyRings/r/cryptoKeys/c".to_string(),
                    ..Default::default()
                }),
                update_mask: None,
            },
            CallSettings::default(),
        )
        .await
        .unwrap();

    assert_eq!(settings.name, "projects/p/cmekSettings");
}

#[tokio::test]
async fn test_undelete_and_delete_paths() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/projects/p/locations/global/buckets/b:undelete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v2/projects/p/locations/global/buckets/b/views/v"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    transport
        .undelete_bucket(
            UndeleteBucketRequest {
                name: "projects/p/locations/global/buckets/b".to_string(),
            },
            CallSettings::default(),
        )
        .await
        .unwrap();
    transport
        .delete_view(
            DeleteViewRequest {
                name: "projects/p/locations/global/buckets/b/views/v".to_string(),
            },
            CallSettings::default(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "denied", "status": "PERMISSION_DENIED"}
        })))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let err = transport
        .get_exclusion(
            GetExclusionRequest {
                name: "projects/p/exclusions/e".to_string(),
            },
            CallSettings::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "PERMISSION_DENIED (403): denied");
}

#[tokio::test]
async fn test_closed_transport_rejects_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    assert!(!transport.is_closed());
    transport.close();
    transport.close();
    assert!(transport.is_closed());

    let err = transport
        .get_view(GetViewRequest::default(), CallSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransportClosed));
}

#[test]
fn test_bare_host_gets_https() {
    let mut config = TransportConfig::new("logging.googleapis.com");
    config.credentials = Some(Credentials::Anonymous);
    let transport = RestTransport::new(config).unwrap();

    assert_eq!(transport.host(), "logging.googleapis.com");
    assert_eq!(
        transport.http().config().base_url.as_deref(),
        Some("https://logging.googleapis.com")
    );
}
