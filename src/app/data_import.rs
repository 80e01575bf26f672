use crate::domain::model::{
    CorrespondenceImportStatistics, CorrespondenceImportStatus, HealthStatus, ImportResponse,
};
use crate::domain::ports::{DataImportBackend, Prompter};
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::task::JoinSet;

/// 保留的匯入紀錄筆數
pub const MAX_LOG_ENTRIES: usize = 50;

pub const CORRESPONDENCES: &str = "correspondences";
pub const ALL_CORRESPONDENCES_WITH_RELATED: &str = "all-correspondences-with-related";

/// (endpoint, 名稱, 說明)，依匯入順序排列
const BASIC_ENTITIES: [(&str, &str, &str); 14] = [
    ("classifications", "Classifications", "Document classification categories and types"),
    ("contacts", "Contacts", "Contact information and external parties"),
    ("decisions", "Decisions", "Decision types and workflow actions"),
    ("departments", "Departments", "Organizational departments and units"),
    ("forms", "Forms", "Document forms and templates"),
    ("form-types", "Form Types", "Form type definitions and categories"),
    ("importance", "Importance", "Document importance levels"),
    ("positions", "Positions", "Job positions and organizational roles"),
    ("pos-roles", "Position Roles", "Position-role mappings and assignments"),
    ("priority", "Priority", "Document priority levels and urgency"),
    ("roles", "Roles", "User roles and permissions"),
    ("secrecy", "Secrecy", "Security classification levels"),
    ("user-positions", "User Positions", "User-position assignments and mappings"),
    ("users", "Users", "System users and account information"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ImportEntity {
    pub endpoint: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub order: usize,
    pub record_count: Option<u64>,
    pub is_importing: bool,
    pub has_error: bool,
    pub last_result: Option<ImportResponse>,
}

impl ImportEntity {
    fn new(endpoint: &'static str, name: &'static str, description: &'static str, order: usize) -> Self {
        Self {
            endpoint,
            name,
            description,
            order,
            record_count: None,
            is_importing: false,
            has_error: false,
            last_result: None,
        }
    }

    fn succeeded(&self) -> bool {
        self.last_result
            .as_ref()
            .is_some_and(|r| r.is_completed())
    }

    pub fn button_text(&self) -> &'static str {
        if self.is_importing {
            "Importing..."
        } else if self.has_error {
            "Retry Import"
        } else if self.succeeded() {
            "Re-import"
        } else {
            "Import"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
}

impl LogKind {
    pub fn icon(&self) -> &'static str {
        match self {
            LogKind::Success => "✅",
            LogKind::Error => "❌",
            LogKind::Warning => "⚠️",
            LogKind::Info => "ℹ️",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportLog {
    pub timestamp: DateTime<Local>,
    pub kind: LogKind,
    pub message: String,
    pub entity: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverallProgress {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub failed: usize,
}

/// 資料匯入頁面
pub struct ImportBoard<D: DataImportBackend> {
    backend: Arc<D>,
    basic_entities: Vec<ImportEntity>,
    correspondence_import: ImportEntity,
    related_data_import: ImportEntity,
    logs: Vec<ImportLog>,
    is_loading: bool,
}

impl<D: DataImportBackend + 'static> ImportBoard<D> {
    pub fn new(backend: Arc<D>) -> Self {
        let basic_entities = BASIC_ENTITIES
            .iter()
            .enumerate()
            .map(|(index, &(endpoint, name, description))| {
                ImportEntity::new(endpoint, name, description, index + 1)
            })
            .collect();

        let mut board = Self {
            backend,
            basic_entities,
            correspondence_import: ImportEntity::new(
                CORRESPONDENCES,
                "Correspondences",
                "Main correspondence records",
                1,
            ),
            related_data_import: ImportEntity::new(
                ALL_CORRESPONDENCES_WITH_RELATED,
                "All Related Data",
                "Attachments, comments, transactions, etc.",
                2,
            ),
            logs: Vec::new(),
            is_loading: false,
        };
        board.add_log(LogKind::Info, "Data Import page loaded", None);
        board
    }

    pub fn basic_entities(&self) -> &[ImportEntity] {
        &self.basic_entities
    }

    pub fn correspondence_import(&self) -> &ImportEntity {
        &self.correspondence_import
    }

    pub fn related_data_import(&self) -> &ImportEntity {
        &self.related_data_import
    }

    pub fn logs(&self) -> &[ImportLog] {
        &self.logs
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn entity(&self, endpoint: &str) -> Option<&ImportEntity> {
        self.all_entities().find(|e| e.endpoint == endpoint)
    }

    fn entity_mut(&mut self, endpoint: &str) -> Option<&mut ImportEntity> {
        self.basic_entities
            .iter_mut()
            .chain(std::iter::once(&mut self.correspondence_import))
            .chain(std::iter::once(&mut self.related_data_import))
            .find(|e| e.endpoint == endpoint)
    }

    fn all_entities(&self) -> impl Iterator<Item = &ImportEntity> {
        self.basic_entities
            .iter()
            .chain(std::iter::once(&self.correspondence_import))
            .chain(std::iter::once(&self.related_data_import))
    }

    pub fn add_log(&mut self, kind: LogKind, message: impl Into<String>, entity: Option<&str>) {
        self.logs.push(ImportLog {
            timestamp: Local::now(),
            kind,
            message: message.into(),
            entity: entity.map(str::to_string),
        });
        if self.logs.len() > MAX_LOG_ENTRIES {
            let excess = self.logs.len() - MAX_LOG_ENTRIES;
            self.logs.drain(..excess);
        }
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
        self.add_log(LogKind::Info, "Import log cleared", None);
    }

    /// 匯入單一實體；忙碌中或該實體正在匯入時回傳 `None`
    pub async fn import_entity(&mut self, endpoint: &str) -> Option<ImportResponse> {
        if self.is_loading {
            return None;
        }
        let entity = self.entity_mut(endpoint)?;
        if entity.is_importing {
            return None;
        }
        entity.is_importing = true;
        entity.has_error = false;
        let name = entity.name;

        self.is_loading = true;
        self.add_log(LogKind::Info, format!("Starting import of {}", name), Some(endpoint));

        let response = self.backend.import_entity(endpoint).await;
        self.is_loading = false;

        let (kind, message) = match response.status.as_str() {
            ImportResponse::SUCCESS => (
                LogKind::Success,
                format!(
                    "{} imported successfully: {} records",
                    name, response.successful_imports
                ),
            ),
            ImportResponse::PARTIAL_SUCCESS => (
                LogKind::Warning,
                format!(
                    "{} partially imported: {} success, {} failed",
                    name, response.successful_imports, response.failed_imports
                ),
            ),
            _ => (
                LogKind::Error,
                format!("{} import failed: {}", name, response.message),
            ),
        };

        if let Some(entity) = self.entity_mut(endpoint) {
            entity.is_importing = false;
            entity.has_error = kind == LogKind::Error;
            entity.last_result = Some(response.clone());
        }
        self.add_log(kind, message, Some(endpoint));

        let count = self.backend.entity_count(endpoint).await;
        if let Some(entity) = self.entity_mut(endpoint) {
            entity.record_count = Some(count);
        }

        Some(response)
    }

    pub async fn import_correspondences(&mut self) -> Option<ImportResponse> {
        self.import_entity(CORRESPONDENCES).await
    }

    pub async fn import_all_correspondences_with_related(
        &mut self,
        prompter: &dyn Prompter,
    ) -> Option<ImportResponse> {
        if self.is_loading {
            return None;
        }
        if !prompter.confirm(
            "Import all correspondences with related data? This may take a long time for large datasets.",
        ) {
            return None;
        }
        self.import_entity(ALL_CORRESPONDENCES_WITH_RELATED).await
    }

    pub async fn import_all_basic_entities(
        &mut self,
        prompter: &dyn Prompter,
    ) -> Option<ImportResponse> {
        if self.is_loading {
            return None;
        }
        if !prompter.confirm(&format!(
            "Import all basic entities? This will import all {} entity types sequentially.",
            BASIC_ENTITIES.len()
        )) {
            return None;
        }

        self.is_loading = true;
        self.add_log(LogKind::Info, "Starting bulk import of all basic entities", None);
        let response = self.backend.import_basic_entities().await;
        self.is_loading = false;

        for entity in &mut self.basic_entities {
            entity.is_importing = false;
            entity.has_error = false;
            entity.last_result = Some(response.clone());
        }

        if response.is_success() {
            self.add_log(
                LogKind::Success,
                format!(
                    "All basic entities imported successfully: {} total records",
                    response.successful_imports
                ),
                None,
            );
        } else {
            self.add_log(
                LogKind::Warning,
                format!(
                    "Basic entities import completed with some issues: {} success, {} failed",
                    response.successful_imports, response.failed_imports
                ),
                None,
            );
        }

        self.load_record_counts().await;
        Some(response)
    }

    /// 同時查詢所有實體的筆數；單筆失敗時為 0
    pub async fn load_record_counts(&mut self) {
        let endpoints: Vec<&'static str> = self
            .basic_entities
            .iter()
            .map(|e| e.endpoint)
            .chain(std::iter::once(CORRESPONDENCES))
            .collect();

        let mut tasks = JoinSet::new();
        for endpoint in endpoints {
            let backend = self.backend.clone();
            tasks.spawn(async move { (endpoint, backend.entity_count(endpoint).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((endpoint, count)) => {
                    tracing::debug!("{} record count: {}", endpoint, count);
                    if let Some(entity) = self.entity_mut(endpoint) {
                        entity.record_count = Some(count);
                    }
                }
                Err(e) => tracing::error!("❌ Record count task failed: {}", e),
            }
        }
    }

    pub async fn refresh_all_status(&mut self) {
        self.add_log(LogKind::Info, "Refreshing import status for all entities", None);
        self.load_record_counts().await;
    }

    pub fn overall_progress(&self) -> OverallProgress {
        self.all_entities()
            .fold(OverallProgress::default(), |mut progress, entity| {
                progress.total += 1;
                if entity.is_importing {
                    progress.in_progress += 1;
                } else if entity.has_error {
                    progress.failed += 1;
                } else if entity.succeeded() {
                    progress.completed += 1;
                }
                progress
            })
    }

    pub async fn correspondence_statistics(&self) -> CorrespondenceImportStatistics {
        self.backend.correspondence_import_statistics().await
    }

    pub async fn correspondence_statuses(&self) -> Vec<CorrespondenceImportStatus> {
        self.backend.correspondence_import_statuses().await
    }

    fn log_result(&mut self, action: &str, response: &ImportResponse, entity: Option<&str>) {
        if response.is_completed() {
            self.add_log(LogKind::Success, format!("{} completed: {}", action, response.message), entity);
        } else {
            self.add_log(LogKind::Error, format!("{} failed: {}", action, response.message), entity);
        }
    }

    pub async fn import_correspondence_related(&mut self, correspondence_guid: &str) -> ImportResponse {
        let response = self
            .backend
            .import_correspondence_related(correspondence_guid)
            .await;
        self.log_result("Related data import", &response, Some(correspondence_guid));
        response
    }

    /// 單一公文的附件、意見、流程等關聯資料
    pub async fn import_related(&mut self, related_entity: &str, doc_guid: &str) -> ImportResponse {
        let response = self.backend.import_related(related_entity, doc_guid).await;
        self.log_result(
            &format!("Import of {}", related_entity),
            &response,
            Some(doc_guid),
        );
        response
    }

    pub async fn retry_failed_correspondence_imports(&mut self) -> ImportResponse {
        let response = self.backend.retry_failed_correspondence_imports().await;
        self.log_result("Retry of failed correspondence imports", &response, None);
        response
    }

    pub async fn reset_correspondence_import(
        &mut self,
        correspondence_guid: &str,
        prompter: &dyn Prompter,
    ) -> Option<ImportResponse> {
        if !prompter.confirm(&format!(
            "Reset import status for correspondence {}?",
            correspondence_guid
        )) {
            return None;
        }
        let response = self
            .backend
            .reset_correspondence_import(correspondence_guid)
            .await;
        self.log_result("Reset", &response, Some(correspondence_guid));
        Some(response)
    }

    pub async fn import_external_agencies(&mut self) -> ImportResponse {
        let response = self.backend.import_external_agencies().await;
        self.log_result("External agencies import", &response, None);
        response
    }

    pub async fn import_users_to_destination(&mut self) -> ImportResponse {
        let response = self.backend.import_users_to_destination().await;
        self.log_result("Users to destination import", &response, None);
        response
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.backend.health().await
    }
}
