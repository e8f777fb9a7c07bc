//! Integration tests for the Jolokia client using wiremock
//!
//! These tests run the client and full dumps against a mocked agent,
//! covering search, list, bulk and single reads, and agent-side failures.

use jmxdump::error::{DumpError, FetchError};
use jmxdump::jolokia::{Credentials, JolokiaClient, JolokiaSettings};
use jmxdump::mbean::{
    collect_attributes, AttributeInfo, Connection, DumpOptions, Dumper, Introspector,
    ManagementValue, ResourceDirectory, SerializeOptions,
};
use serde_json::{json, Value};
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT_PATH: &str = "/jolokia/";

fn ok(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": 200, "value": value}))
}

fn agent_error(status: u16, error_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": status,
        "error_type": error_type,
        "error": format!("{} : simulated", error_type)
    }))
}

fn client_for(server: &MockServer) -> JolokiaClient {
    let settings = JolokiaSettings::new(&format!("{}/jolokia", server.uri()));
    JolokiaClient::new(&settings).expect("Client should build")
}

async fn mock(server: &MockServer, body: Value, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(body))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Agent exposing one cache MBean
async fn cache_agent() -> MockServer {
    let server = MockServer::start().await;

    mock(
        &server,
        json!({"type": "search", "mbean": "app:*"}),
        ok(json!(["app:type=Cache"])),
    )
    .await;

    mock(
        &server,
        json!({"type": "list", "path": "app/type=Cache"}),
        ok(json!({
            "desc": "Cache statistics",
            "attr": {
                "HitCount": {"type": "long", "desc": "hits", "rw": false},
                "Stats": {"type": "javax.management.openmbean.TabularData", "desc": "", "rw": false},
                "Owner": {"type": "java.lang.String", "desc": "", "rw": false}
            }
        })),
    )
    .await;

    mock(
        &server,
        json!({"type": "read", "mbean": "app:type=Cache", "attribute": ["HitCount", "Stats", "Owner"]}),
        ok(json!({"HitCount": 10, "Stats": {}, "Owner": "svc-a"})),
    )
    .await;

    server
}

mod client_tests {
    use super::*;

    /// Search returns the object names of a domain
    #[tokio::test]
    async fn test_search_lists_domain_resources() {
        let server = cache_agent().await;
        let client = client_for(&server);

        let names = client.list_resources(Some("app")).await.unwrap();

        assert_eq!(names, vec!["app:type=Cache"]);
    }

    /// List metadata yields attribute names with declared types, in reply order
    #[tokio::test]
    async fn test_list_returns_typed_attributes() {
        let server = cache_agent().await;
        let client = client_for(&server);

        let attributes = client.readable_attributes("app:type=Cache").await.unwrap();

        let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["HitCount", "Stats", "Owner"]);
        assert_eq!(attributes[0].type_name.as_deref(), Some("long"));
    }

    /// MBeans without attributes have no metadata entry
    #[tokio::test]
    async fn test_list_without_attributes_is_empty() {
        let server = MockServer::start().await;
        mock(
            &server,
            json!({"type": "list"}),
            ok(json!({"desc": "operations only", "op": {}})),
        )
        .await;

        let attributes = client_for(&server)
            .readable_attributes("app:type=Ops")
            .await
            .unwrap();

        assert!(attributes.is_empty());
    }

    /// Composite values are classified using the declared type
    #[tokio::test]
    async fn test_bulk_read_classifies_composites() {
        let server = MockServer::start().await;
        mock(
            &server,
            json!({"type": "read", "attribute": ["HeapMemoryUsage", "ObjectName"]}),
            ok(json!({
                "HeapMemoryUsage": {"init": 1, "used": 2},
                "ObjectName": {"objectName": "java.lang:type=Memory"}
            })),
        )
        .await;

        let attributes = vec![
            AttributeInfo::new(
                "HeapMemoryUsage",
                Some("javax.management.openmbean.CompositeData"),
            ),
            AttributeInfo::new("ObjectName", Some("javax.management.ObjectName")),
        ];
        let values = client_for(&server)
            .fetch_batch("java.lang:type=Memory", &attributes)
            .await
            .unwrap();

        assert!(matches!(values[0].1, Some(ManagementValue::Record(_))));
        assert_eq!(
            values[1].1,
            Some(ManagementValue::object_name("java.lang:type=Memory"))
        );
    }

    /// A non-200 status inside the reply body is a remote error
    #[tokio::test]
    async fn test_agent_status_error_is_remote() {
        let server = MockServer::start().await;
        mock(
            &server,
            json!({"type": "read"}),
            agent_error(404, "javax.management.InstanceNotFoundException"),
        )
        .await;

        let err = client_for(&server)
            .fetch_one("app:type=Missing", &AttributeInfo::untyped("Size"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
    }

    /// HTTP 401 surfaces as a remote error with that status
    #[tokio::test]
    async fn test_http_401_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).list_resources(None).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
    }

    /// A body that is not JSON is malformed
    #[tokio::test]
    async fn test_non_json_reply_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_resources(None).await.unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
    }

    /// Basic auth credentials are sent with every request
    #[tokio::test]
    async fn test_basic_auth_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .and(basic_auth("monitor", "s3cret"))
            .respond_with(ok(json!(["java.lang:type=Runtime"])))
            .mount(&server)
            .await;

        let mut settings = JolokiaSettings::new(&format!("{}/jolokia/", server.uri()));
        settings.credentials = Some(Credentials {
            user: "monitor".to_string(),
            password: Some("s3cret".to_string()),
        });
        let client = JolokiaClient::new(&settings).unwrap();

        let names = client.list_resources(None).await.unwrap();

        assert_eq!(names, vec!["java.lang:type=Runtime"]);
    }
}

mod fallback_tests {
    use super::*;

    /// Bulk failure falls back to single reads; a failing attribute is only omitted
    #[tokio::test]
    async fn test_bulk_failure_falls_back_per_attribute() {
        let server = MockServer::start().await;
        mock(
            &server,
            json!({"type": "read", "attribute": ["A", "B", "C"]}),
            agent_error(500, "javax.management.RuntimeMBeanException"),
        )
        .await;
        mock(&server, json!({"type": "read", "attribute": "A"}), ok(json!(1))).await;
        mock(
            &server,
            json!({"type": "read", "attribute": "B"}),
            agent_error(500, "javax.management.RuntimeMBeanException"),
        )
        .await;
        mock(&server, json!({"type": "read", "attribute": "C"}), ok(json!(3))).await;

        let client = client_for(&server);
        let attributes: Vec<AttributeInfo> =
            ["A", "B", "C"].iter().map(|n| AttributeInfo::untyped(n)).collect();

        let result = collect_attributes(&client, "app:type=Flaky", &attributes).await;

        let names: Vec<&str> = result.values().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(result.get("C"), Some(&ManagementValue::integer(3)));
        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].0, "B");
    }
}

mod dump_tests {
    use super::*;

    /// Normal mode drops only the empty attribute
    #[tokio::test]
    async fn test_dump_cache_normal_mode() {
        let server = cache_agent().await;
        let client = client_for(&server);
        let options = DumpOptions {
            domain: Some("app".to_string()),
            ..DumpOptions::default()
        };
        let mut sink: Vec<String> = Vec::new();

        Dumper::new(&client, options).run(&mut sink).await.unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink[0],
            r#"{"app:type=Cache":{"HitCount":10,"Owner":"svc-a"}}"#
        );
    }

    /// Values-only mode also drops the text attribute
    #[tokio::test]
    async fn test_dump_cache_values_only_mode() {
        let server = cache_agent().await;
        let client = client_for(&server);
        let options = DumpOptions {
            domain: Some("app".to_string()),
            serialize: SerializeOptions::values_only(),
            ..DumpOptions::default()
        };

        let (result, summary) = Dumper::new(&client, options).dump().await.unwrap();

        assert_eq!(Value::Object(result), json!({"app:type=Cache": {"HitCount": 10}}));
        assert_eq!(summary.dumped, 1);
    }

    /// A refused listing is fatal for the dump
    #[tokio::test]
    async fn test_dump_listing_forbidden_is_fatal() {
        let server = MockServer::start().await;
        mock(
            &server,
            json!({"type": "search"}),
            agent_error(403, "java.lang.SecurityException"),
        )
        .await;
        let client = client_for(&server);

        let err = Dumper::new(&client, DumpOptions::default())
            .dump()
            .await
            .unwrap_err();

        assert!(matches!(err, DumpError::DirectoryUnavailable(_)));
    }

    /// An unreachable agent is reported as a lost connection
    #[tokio::test]
    async fn test_dump_unreachable_agent_is_connection_lost() {
        // Bind then release a port so nothing is listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let url = format!("http://127.0.0.1:{}/jolokia/", port);

        let client = JolokiaClient::new(&JolokiaSettings::new(&url)).unwrap();
        let err = Dumper::new(&client, DumpOptions::default())
            .dump()
            .await
            .unwrap_err();

        assert!(matches!(err, DumpError::ConnectionLost(_)));
    }
}
