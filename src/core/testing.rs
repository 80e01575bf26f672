//! 單元測試用的假後端與假提示器

use crate::domain::model::{
    CorrespondenceImportStatistics, CorrespondenceImportStatus, CreationStatistics, HealthStatus,
    ImportResponse, MigrationStatistics, PaginatedResponse,
};
use crate::domain::phase::{Phase, Pipeline};
use crate::domain::ports::{DataImportBackend, DetailQuery, MigrationBackend, Prompter};
use crate::domain::row::DetailRow;
use crate::utils::error::{MigrationError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn success(count: u64) -> ImportResponse {
    ImportResponse {
        status: ImportResponse::SUCCESS.to_string(),
        message: "ok".to_string(),
        total_records: count,
        successful_imports: count,
        ..Default::default()
    }
}

pub struct MockBackend {
    pipeline: Pipeline,
    statistics: Mutex<Option<MigrationStatistics>>,
    statistics_calls: AtomicUsize,
    responses: Mutex<HashMap<Phase, ImportResponse>>,
    pages: Mutex<HashMap<Phase, Value>>,
    failing_details: Mutex<bool>,
    pub queries: Mutex<Vec<(Phase, DetailQuery)>>,
    pub executed: Mutex<Vec<(Phase, Vec<String>)>>,
    pub phase_runs: Mutex<Vec<Phase>>,
    pub retries: AtomicUsize,
}

impl MockBackend {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            statistics: Mutex::new(Some(MigrationStatistics::default())),
            statistics_calls: AtomicUsize::new(0),
            responses: Mutex::new(HashMap::new()),
            pages: Mutex::new(HashMap::new()),
            failing_details: Mutex::new(false),
            queries: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
            phase_runs: Mutex::new(Vec::new()),
            retries: AtomicUsize::new(0),
        }
    }

    pub fn set_statistics(&self, stats: MigrationStatistics) {
        *self.statistics.lock().unwrap() = Some(stats);
    }

    pub fn fail_statistics(&self) {
        *self.statistics.lock().unwrap() = None;
    }

    pub fn statistics_calls(&self) -> usize {
        self.statistics_calls.load(Ordering::SeqCst)
    }

    pub fn set_response(&self, phase: Phase, response: ImportResponse) {
        self.responses.lock().unwrap().insert(phase, response);
    }

    /// 明細回應以 JSON 保存，由 `details::<R>` 依列型別解碼
    pub fn set_page(&self, phase: Phase, page: Value) {
        self.pages.lock().unwrap().insert(phase, page);
    }

    pub fn fail_details(&self, failing: bool) {
        *self.failing_details.lock().unwrap() = failing;
    }

    pub fn executed(&self) -> Vec<(Phase, Vec<String>)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<DetailQuery> {
        self.queries.lock().unwrap().last().map(|(_, q)| q.clone())
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl MigrationBackend for MockBackend {
    fn pipeline(&self) -> Pipeline {
        self.pipeline
    }

    async fn execute_phase(&self, phase: Phase) -> ImportResponse {
        self.phase_runs.lock().unwrap().push(phase);
        self.responses
            .lock()
            .unwrap()
            .get(&phase)
            .cloned()
            .unwrap_or_else(|| success(1))
    }

    async fn execute_specific(&self, phase: Phase, guids: &[String]) -> ImportResponse {
        self.executed.lock().unwrap().push((phase, guids.to_vec()));
        self.responses
            .lock()
            .unwrap()
            .get(&phase)
            .cloned()
            .unwrap_or_else(|| success(guids.len() as u64))
    }

    async fn retry_failed(&self) -> ImportResponse {
        self.retries.fetch_add(1, Ordering::SeqCst);
        success(0)
    }

    async fn statistics(&self) -> Result<MigrationStatistics> {
        self.statistics_calls.fetch_add(1, Ordering::SeqCst);
        (*self.statistics.lock().unwrap()).ok_or_else(|| MigrationError::ApiStatus {
            status: 500,
            url: "mock://statistics".to_string(),
        })
    }

    async fn creation_statistics(&self) -> Result<CreationStatistics> {
        Ok(CreationStatistics::default())
    }

    async fn details<R: DetailRow>(&self, query: &DetailQuery) -> Result<PaginatedResponse<R>> {
        self.queries
            .lock()
            .unwrap()
            .push((R::PHASE, query.clone()));
        if *self.failing_details.lock().unwrap() {
            return Err(MigrationError::ApiStatus {
                status: 500,
                url: format!("mock://{}/details", R::PHASE),
            });
        }
        let page = self
            .pages
            .lock()
            .unwrap()
            .get(&R::PHASE)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({"content": []}));
        if !R::SERVER_PAGED {
            let rows: Vec<R> = serde_json::from_value(page)?;
            return Ok(PaginatedResponse::single_page(rows));
        }
        Ok(serde_json::from_value(page)?)
    }
}

#[derive(Default)]
pub struct MockDataImport {
    pub counts: Mutex<HashMap<String, u64>>,
    pub failing: Mutex<Vec<String>>,
    pub imported: Mutex<Vec<String>>,
    pub count_calls: AtomicUsize,
}

impl MockDataImport {
    pub fn with_counts(counts: &[(&str, u64)]) -> Self {
        let mock = Self::default();
        {
            let mut map = mock.counts.lock().unwrap();
            for (entity, count) in counts {
                map.insert(entity.to_string(), *count);
            }
        }
        mock
    }

    pub fn fail_entity(&self, entity: &str) {
        self.failing.lock().unwrap().push(entity.to_string());
    }

    pub fn imported(&self) -> Vec<String> {
        self.imported.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataImportBackend for MockDataImport {
    async fn import_entity(&self, entity: &str) -> ImportResponse {
        self.imported.lock().unwrap().push(entity.to_string());
        if self.failing.lock().unwrap().iter().any(|e| e == entity) {
            return ImportResponse::failure(&format!("import {}", entity), "HTTP 500");
        }
        success(3)
    }

    async fn entity_count(&self, entity: &str) -> u64 {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.counts
            .lock()
            .unwrap()
            .get(entity)
            .copied()
            .unwrap_or_default()
    }

    async fn import_basic_entities(&self) -> ImportResponse {
        self.imported
            .lock()
            .unwrap()
            .push("basic-entities".to_string());
        success(14)
    }

    async fn import_related(&self, related_entity: &str, doc_guid: &str) -> ImportResponse {
        self.imported
            .lock()
            .unwrap()
            .push(format!("{}/{}", related_entity, doc_guid));
        success(1)
    }

    async fn correspondence_import_statistics(&self) -> CorrespondenceImportStatistics {
        CorrespondenceImportStatistics {
            total: 4,
            completed: 2,
            in_progress: 1,
            failed: 1,
            pending: 0,
        }
    }

    async fn correspondence_import_statuses(&self) -> Vec<CorrespondenceImportStatus> {
        vec![CorrespondenceImportStatus {
            correspondence_guid: "DOC-1".to_string(),
            overall_status: "FAILED".to_string(),
            ..Default::default()
        }]
    }

    async fn import_correspondence_related(&self, correspondence_guid: &str) -> ImportResponse {
        self.imported
            .lock()
            .unwrap()
            .push(format!("related/{}", correspondence_guid));
        success(1)
    }

    async fn retry_failed_correspondence_imports(&self) -> ImportResponse {
        success(1)
    }

    async fn reset_correspondence_import(&self, correspondence_guid: &str) -> ImportResponse {
        self.imported
            .lock()
            .unwrap()
            .push(format!("reset/{}", correspondence_guid));
        success(1)
    }

    async fn import_external_agencies(&self) -> ImportResponse {
        success(5)
    }

    async fn import_users_to_destination(&self) -> ImportResponse {
        success(5)
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "UP".to_string(),
            ..Default::default()
        })
    }
}

/// 依預設答案回覆 confirm，並記下所有訊息
pub struct ScriptedPrompter {
    answer: bool,
    pub confirms: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            confirms: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn confirm_count(&self) -> usize {
        self.confirms.lock().unwrap().len()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().unwrap().push(message.to_string());
        self.answer
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
