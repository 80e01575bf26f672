use httpmock::prelude::*;
use migration_console::config::SettingsOverrides;
use migration_console::domain::model::{ClosingDetail, CreationDetail};
use migration_console::domain::ports::Prompter;
use migration_console::domain::PhaseStatus;
use migration_console::{DetailTable, MigrationClient, Phase, PhaseBoard, Pipeline, Settings, StatisticsCache};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn settings_for(origin: String) -> Settings {
    Settings::resolve(
        &SettingsOverrides {
            api_base_url: Some(origin),
            ..Default::default()
        },
        None,
        None,
    )
}

/// 永遠確認，並記下所有提示訊息
#[derive(Default)]
struct RecordingPrompter {
    messages: Mutex<Vec<String>>,
}

impl RecordingPrompter {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Prompter for RecordingPrompter {
    fn confirm(&self, message: &str) -> bool {
        self.messages.lock().unwrap().push(message.to_string());
        true
    }

    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn closing_page(page: u32, guids: &[(&str, bool)]) -> serde_json::Value {
    let content: Vec<_> = guids
        .iter()
        .map(|(guid, need)| {
            json!({
                "correspondenceGuid": guid,
                "isNeedToClose": need,
                "closingStatus": "PENDING"
            })
        })
        .collect();
    json!({
        "content": content,
        "totalElements": 45,
        "totalPages": 3,
        "currentPage": page,
        "hasNext": page < 2,
        "hasPrevious": page > 0,
        "needToCloseCount": 30
    })
}

#[tokio::test]
async fn test_closing_table_paging_and_execute_for_selected() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/api/incoming-migration/closing/details")
            .query_param("page", "0");
        then.status(200)
            .json_body(closing_page(0, &[("DOC-1", true), ("DOC-2", false)]));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/api/incoming-migration/closing/details")
            .query_param("page", "1");
        then.status(200)
            .json_body(closing_page(1, &[("DOC-3", true), ("DOC-4", true)]));
    });
    let execute = server.mock(|when, then| {
        when.method(POST)
            .path("/api/incoming-migration/closing/execute-specific")
            .json_body(json!({"correspondenceGuids": ["DOC-1"]}));
        then.status(200).json_body(json!({
            "status": "SUCCESS",
            "message": "Closed",
            "totalRecords": 1,
            "successfulImports": 1,
            "failedImports": 0,
            "errors": []
        }));
    });

    let client = Arc::new(MigrationClient::new(
        &settings_for(server.base_url()),
        Pipeline::Incoming,
    ));
    let mut table = DetailTable::<ClosingDetail, _>::new(client, 20);

    table.load().await.unwrap();
    assert_eq!(table.current_page(), 1);
    assert_eq!(table.total_pages(), 3);
    assert_eq!(table.need_to_close_count(), Some(30));
    assert_eq!(table.pagination_pages(), vec![1, 2, 3]);

    table.go_to_page(2).await.unwrap();
    second.assert();
    assert_eq!(table.current_page(), 2);
    assert_eq!(table.visible_rows()[0].row.correspondence_guid, "DOC-3");

    // 超出範圍的頁碼不發請求
    table.go_to_page(9).await.unwrap();
    second.assert_hits(1);

    table.go_to_page(1).await.unwrap();
    table.toggle_all_selection();
    assert!(table.all_selected());

    let prompter = RecordingPrompter::default();
    let response = table.execute_for_selected(&prompter).await.unwrap();

    execute.assert();
    assert!(response.is_success());
    // 初次載入、回到第一頁、執行後重新載入
    first.assert_hits(3);
    assert!(table.selected_guids().is_empty());
    assert_eq!(
        prompter.messages(),
        vec![
            "Execute closing for 1 selected correspondences?".to_string(),
            "Closing completed successfully for 1 correspondences.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_creation_table_filters_locally() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET).path("/api/outgoing-migration/creation/details");
        then.status(200).json_body(json!({
            "content": [
                {"correspondenceGuid": "A-1", "creationStatus": "FAILED", "creationStep": "CREATE_CORRESPONDENCE", "correspondenceSubject": "Budget 2024"},
                {"correspondenceGuid": "A-2", "creationStatus": "COMPLETED", "creationStep": "COMPLETED", "correspondenceSubject": "Budget 2025"},
                {"correspondenceGuid": "A-3", "creationStatus": "FAILED", "creationStep": "UPLOAD_MAIN_ATTACHMENT", "correspondenceSubject": "Leave request"}
            ],
            "totalElements": 3
        }));
    });

    let client = Arc::new(MigrationClient::new(
        &settings_for(server.base_url()),
        Pipeline::Outgoing,
    ));
    let mut table = DetailTable::<CreationDetail, _>::new(client, 2);

    table.load().await.unwrap();
    assert_eq!(table.total_elements(), 3);
    assert_eq!(table.total_pages(), 2);
    assert_eq!(table.visible_rows().len(), 2);

    table.set_status_filter("FAILED").await.unwrap();
    assert_eq!(table.total_elements(), 2);

    table.set_search("budget").await.unwrap();
    let visible: Vec<&str> = table
        .visible_rows()
        .iter()
        .map(|r| r.row.correspondence_guid.as_str())
        .collect();
    assert_eq!(visible, vec!["A-1"]);

    table.clear_filters().await.unwrap();
    assert_eq!(table.total_elements(), 3);

    // 本地篩選不會再打 API
    listing.assert_hits(1);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_rows() {
    let server = MockServer::start();
    let mut ok = server.mock(|when, then| {
        when.method(GET).path("/api/incoming-migration/closing/details");
        then.status(200)
            .json_body(closing_page(0, &[("DOC-1", true)]));
    });

    let client = Arc::new(MigrationClient::new(
        &settings_for(server.base_url()),
        Pipeline::Incoming,
    ));
    let mut table = DetailTable::<ClosingDetail, _>::new(client, 20);
    table.load().await.unwrap();

    ok.delete();
    server.mock(|when, then| {
        when.method(GET).path("/api/incoming-migration/closing/details");
        then.status(500);
    });

    assert!(table.load().await.is_err());
    assert!(!table.is_loading());
    assert_eq!(table.loaded_rows().len(), 1);
}

#[tokio::test]
async fn test_phase_board_over_http() {
    let server = MockServer::start();
    let stats = server.mock(|when, then| {
        when.method(GET).path("/api/internal-migration/statistics");
        then.status(200).json_body(json!({
            "prepareData": 0,
            "creation": 4,
            "assignment": 2
        }));
    });
    let run = server.mock(|when, then| {
        when.method(POST).path("/api/internal-migration/creation");
        then.status(502);
    });

    let client = Arc::new(MigrationClient::new(
        &settings_for(server.base_url()),
        Pipeline::Internal,
    ));
    let cache = Arc::new(StatisticsCache::new(client));
    assert!(cache.current().is_none());

    let mut board = PhaseBoard::with_cache(cache.clone());
    board.load_statistics().await;
    assert_eq!(cache.current().map(|s| s.creation), Some(4));
    assert!(board.can_execute_phase(Phase::Creation));

    let response = board.execute_phase(Phase::Creation).await.unwrap();
    run.assert();
    assert_eq!(response.status, "ERROR");
    // 失敗後重新載入的統計決定卡片狀態
    let card = board.card(Phase::Creation).unwrap();
    assert_eq!(card.status, PhaseStatus::Pending);
    assert_eq!(card.last_result.as_ref(), Some(&response));
    stats.assert_hits(2);
}
