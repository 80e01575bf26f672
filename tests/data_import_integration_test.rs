use httpmock::prelude::*;
use migration_console::app::LogKind;
use migration_console::config::SettingsOverrides;
use migration_console::domain::ports::{DataImportBackend, Prompter};
use migration_console::{DataImportClient, ImportBoard, Settings};
use serde_json::json;
use std::sync::Arc;

fn client_for(server: &MockServer) -> DataImportClient {
    let settings = Settings::resolve(
        &SettingsOverrides {
            api_base_url: Some(server.base_url()),
            ..Default::default()
        },
        None,
        None,
    );
    DataImportClient::new(&settings)
}

struct AlwaysYes;

impl Prompter for AlwaysYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }

    fn alert(&self, _message: &str) {}
}

#[tokio::test]
async fn test_import_entity_and_refresh_count() {
    let server = MockServer::start();
    let import = server.mock(|when, then| {
        when.method(POST).path("/api/data-import/departments");
        then.status(200).json_body(json!({
            "status": "PARTIAL_SUCCESS",
            "message": "Imported with warnings",
            "totalRecords": 10,
            "successfulImports": 8,
            "failedImports": 2,
            "errors": ["dept 9 missing parent", "dept 10 missing parent"]
        }));
    });
    let count = server.mock(|when, then| {
        when.method(GET).path("/api/data-import/departments/count");
        then.status(200).json_body(json!({"count": 8}));
    });

    let mut board = ImportBoard::new(Arc::new(client_for(&server)));
    let response = board.import_entity("departments").await.unwrap();

    import.assert();
    count.assert();
    assert_eq!(response.failed_imports, 2);
    let entity = board.entity("departments").unwrap();
    assert_eq!(entity.record_count, Some(8));
    assert!(!entity.has_error);
    let last = board.logs().last().unwrap();
    assert_eq!(last.kind, LogKind::Warning);
    assert_eq!(
        last.message,
        "Departments partially imported: 8 success, 2 failed"
    );
}

#[tokio::test]
async fn test_record_counts_default_to_zero_on_error() {
    let server = MockServer::start();
    let mut board = ImportBoard::new(Arc::new(client_for(&server)));

    let users = server.mock(|when, then| {
        when.method(GET).path("/api/data-import/users/count");
        then.status(200).json_body(json!({"count": 120}));
    });
    let failing: Vec<_> = board
        .basic_entities()
        .iter()
        .map(|e| e.endpoint)
        .filter(|endpoint| *endpoint != "users")
        .chain(std::iter::once("correspondences"))
        .map(|endpoint| {
            server.mock(|when, then| {
                when.method(GET)
                    .path(format!("/api/data-import/{}/count", endpoint));
                then.status(500);
            })
        })
        .collect();

    board.load_record_counts().await;

    users.assert();
    assert_eq!(failing.len(), 14);
    for mock in &failing {
        mock.assert();
    }
    assert_eq!(board.entity("users").unwrap().record_count, Some(120));
    assert_eq!(board.entity("roles").unwrap().record_count, Some(0));
    assert_eq!(board.correspondence_import().record_count, Some(0));
}

#[tokio::test]
async fn test_bulk_import_and_related_endpoints() {
    let server = MockServer::start();
    let basic = server.mock(|when, then| {
        when.method(POST).path("/api/data-import/basic-entities");
        then.status(200).json_body(json!({
            "status": "SUCCESS",
            "message": "done",
            "successfulImports": 1400
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path_contains("/count");
        then.status(200).json_body(json!({"count": 100}));
    });
    let related = server.mock(|when, then| {
        when.method(POST)
            .path("/api/data-import/correspondence-attachments/DOC-7");
        then.status(200).json_body(json!({"status": "SUCCESS", "message": "3 attachments"}));
    });

    let mut board = ImportBoard::new(Arc::new(client_for(&server)));
    board.import_all_basic_entities(&AlwaysYes).await.unwrap();
    board
        .import_related("correspondence-attachments", "DOC-7")
        .await;

    basic.assert();
    related.assert();
    assert!(board
        .logs()
        .iter()
        .any(|log| log.message == "All basic entities imported successfully: 1400 total records"));
    assert!(board
        .basic_entities()
        .iter()
        .all(|e| e.record_count == Some(100) && e.button_text() == "Re-import"));
}

#[tokio::test]
async fn test_correspondence_import_endpoints() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/correspondence-import/statistics");
        then.status(200).json_body(json!({
            "total": 10, "completed": 6, "inProgress": 1, "failed": 2, "pending": 1
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/correspondence-import/status");
        then.status(200).json_body(json!([{
            "correspondenceGuid": "DOC-1",
            "overallStatus": "FAILED",
            "attachmentsStatus": "COMPLETED",
            "commentsStatus": "FAILED",
            "totalEntitiesCount": 10,
            "successfulEntitiesCount": 9,
            "failedEntitiesCount": 1
        }]));
    });
    let related = server.mock(|when, then| {
        when.method(POST)
            .path("/api/correspondence-import/correspondence/DOC-1/related");
        then.status(200).json_body(json!({"status": "SUCCESS"}));
    });
    let reset = server.mock(|when, then| {
        when.method(POST).path("/api/correspondence-import/reset/DOC-1");
        then.status(200).json_body(json!({"status": "SUCCESS"}));
    });
    let retry = server.mock(|when, then| {
        when.method(POST).path("/api/correspondence-import/retry-failed");
        then.status(200).json_body(json!({"status": "SUCCESS"}));
    });

    let client = client_for(&server);
    let stats = client.correspondence_import_statistics().await;
    assert_eq!(stats.in_progress, 1);

    let statuses = client.correspondence_import_statuses().await;
    assert_eq!(statuses.len(), 1);
    assert_eq!(
        statuses[0].entity_statuses(),
        vec![("attachments", "COMPLETED"), ("comments", "FAILED")]
    );

    assert!(client.import_correspondence_related("DOC-1").await.is_success());
    assert!(client.reset_correspondence_import("DOC-1").await.is_success());
    assert!(client.retry_failed_correspondence_imports().await.is_success());
    related.assert();
    reset.assert();
    retry.assert();
}

#[tokio::test]
async fn test_correspondence_queries_fall_back_on_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path_contains("/api/correspondence-import/");
        then.status(500);
    });

    let client = client_for(&server);
    assert_eq!(client.correspondence_import_statistics().await.total, 0);
    assert!(client.correspondence_import_statuses().await.is_empty());
}

#[tokio::test]
async fn test_destination_setup_and_health() {
    let server = MockServer::start();
    let agencies = server.mock(|when, then| {
        when.method(POST).path("/api/import/external-agencies");
        then.status(200).json_body(json!({"status": "SUCCESS", "successfulImports": 12}));
    });
    let users = server.mock(|when, then| {
        when.method(POST).path("/api/user-import/users-to-destination");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(200).json_body(json!({
            "status": "UP",
            "service": "data-import",
            "version": "1.4.2"
        }));
    });

    let client = client_for(&server);
    assert_eq!(client.import_external_agencies().await.successful_imports, 12);

    let failed = client.import_users_to_destination().await;
    assert_eq!(failed.status, "ERROR");
    assert!(failed.message.starts_with("Failed to import users to destination:"));

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "UP");
    assert_eq!(health.version.as_deref(), Some("1.4.2"));

    agencies.assert();
    users.assert();
}
