use crate::domain::model::{
    CorrespondenceImportStatistics, CorrespondenceImportStatus, CreationStatistics, HealthStatus,
    ImportResponse, MigrationStatistics, PaginatedResponse,
};
use crate::domain::phase::{Phase, Pipeline};
use crate::domain::row::DetailRow;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 後端來源，例如 `http://localhost:8080/data-import`
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn page_size(&self) -> u32;
    fn refresh_interval(&self) -> Duration;
    fn search_debounce(&self) -> Duration;
}

/// 明細查詢參數；`page` 為 0 起算
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailQuery {
    pub page: u32,
    pub size: u32,
    pub status: String,
    pub search: String,
    /// (參數名稱, 值)，例如 `("needToClose", "true")`
    pub extra: Option<(&'static str, String)>,
}

impl DetailQuery {
    pub const ALL: &'static str = "all";

    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("status", self.status.clone()),
            ("search", self.search.clone()),
        ];
        if let Some((name, value)) = &self.extra {
            params.push((*name, value.clone()));
        }
        params
    }
}

impl Default for DetailQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            status: Self::ALL.to_string(),
            search: String::new(),
            extra: None,
        }
    }
}

/// 單一遷移管線的後端契約
///
/// 觸發類呼叫一律回傳 `ImportResponse`，失敗時由實作換成 `ERROR` 物件；
/// 只有查詢類呼叫才會回傳 `Err`。
#[async_trait]
pub trait MigrationBackend: Send + Sync {
    fn pipeline(&self) -> Pipeline;

    async fn execute_phase(&self, phase: Phase) -> ImportResponse;

    async fn execute_specific(&self, phase: Phase, guids: &[String]) -> ImportResponse;

    async fn retry_failed(&self) -> ImportResponse;

    async fn statistics(&self) -> Result<MigrationStatistics>;

    async fn creation_statistics(&self) -> Result<CreationStatistics>;

    async fn details<R: DetailRow>(&self, query: &DetailQuery) -> Result<PaginatedResponse<R>>;
}

/// 基本資料與公文關聯資料的匯入端點
#[async_trait]
pub trait DataImportBackend: Send + Sync {
    async fn import_entity(&self, entity: &str) -> ImportResponse;

    /// 失敗時為 0
    async fn entity_count(&self, entity: &str) -> u64;

    async fn import_basic_entities(&self) -> ImportResponse;

    async fn import_related(&self, related_entity: &str, doc_guid: &str) -> ImportResponse;

    async fn correspondence_import_statistics(&self) -> CorrespondenceImportStatistics;

    async fn correspondence_import_statuses(&self) -> Vec<CorrespondenceImportStatus>;

    async fn import_correspondence_related(&self, correspondence_guid: &str) -> ImportResponse;

    async fn retry_failed_correspondence_imports(&self) -> ImportResponse;

    async fn reset_correspondence_import(&self, correspondence_guid: &str) -> ImportResponse;

    async fn import_external_agencies(&self) -> ImportResponse;

    async fn import_users_to_destination(&self) -> ImportResponse;

    async fn health(&self) -> Result<HealthStatus>;
}

/// 取代瀏覽器的 `alert()` / `confirm()`
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}
