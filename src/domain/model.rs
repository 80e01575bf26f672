use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 後端可能送出 `null`，一律當作預設值
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 觸發階段、匯入或重試後的統一回應
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_records: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub successful_imports: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_imports: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

impl ImportResponse {
    pub const SUCCESS: &'static str = "SUCCESS";
    pub const PARTIAL_SUCCESS: &'static str = "PARTIAL_SUCCESS";
    pub const ERROR: &'static str = "ERROR";

    /// 呼叫失敗時代替真正回應的合成物件
    pub fn failure(context: &str, error: impl fmt::Display) -> Self {
        let error = error.to_string();
        Self {
            status: Self::ERROR.to_string(),
            message: format!("Failed to {}: {}", context, error),
            total_records: 0,
            successful_imports: 0,
            failed_imports: 0,
            errors: vec![error],
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }

    /// 階段卡片把部分成功也視為完成
    pub fn is_completed(&self) -> bool {
        self.status == Self::SUCCESS || self.status == Self::PARTIAL_SUCCESS
    }

    /// 批次執行後顯示給使用者的摘要
    pub fn summary(&self, action: &str, noun: &str) -> String {
        if self.is_success() {
            format!(
                "{} completed successfully for {} {}s.",
                action, self.successful_imports, noun
            )
        } else {
            format!(
                "{} completed with {} successes and {} failures.",
                action, self.successful_imports, self.failed_imports
            )
        }
    }
}

/// 儀表板卡片的各階段待處理筆數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatistics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prepare_data: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creation: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignment: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approval: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_log: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub closing: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub in_progress: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_elements: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: u32,
    /// 0 起算，與後端一致
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_previous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_to_close_count: Option<u64>,
}

impl<T> PaginatedResponse<T> {
    /// 把一份完整清單包成單頁回應，供不分頁的端點使用
    pub fn single_page(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            total_elements: len as u64,
            total_pages: u32::from(len > 0),
            current_page: 0,
            page_size: len as u32,
            has_next: false,
            has_previous: false,
            need_to_close_count: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatistic {
    #[serde(default, deserialize_with = "null_as_default")]
    pub step: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationStatistics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step_statistics: Vec<StepStatistic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correspondence_guid: String,
    #[serde(default)]
    pub current_phase: Option<String>,
    #[serde(default)]
    pub phase_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creation_step: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creation_status: String,
    #[serde(default)]
    pub creation_error: Option<String>,
    #[serde(default)]
    pub created_document_id: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub correspondence_subject: Option<String>,
    #[serde(default)]
    pub correspondence_reference_no: Option<String>,
    #[serde(default)]
    pub creation_user_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transaction_guid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correspondence_guid: String,
    #[serde(default)]
    pub from_user_name: Option<String>,
    #[serde(default)]
    pub to_user_name: Option<String>,
    #[serde(default)]
    pub action_date: Option<String>,
    #[serde(default)]
    pub decision_guid: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub migrate_status: String,
    #[serde(default)]
    pub created_document_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub correspondence_subject: Option<String>,
    #[serde(default)]
    pub correspondence_reference_no: Option<String>,
    #[serde(default)]
    pub department_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessLogDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transaction_guid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correspondence_guid: String,
    #[serde(default)]
    pub action_id: Option<i64>,
    #[serde(default)]
    pub action_english_name: Option<String>,
    #[serde(default)]
    pub action_local_name: Option<String>,
    #[serde(default)]
    pub action_date: Option<String>,
    #[serde(default)]
    pub from_user_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub migrate_status: String,
    #[serde(default)]
    pub created_document_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub correspondence_subject: Option<String>,
    #[serde(default)]
    pub correspondence_reference_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment_guid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correspondence_guid: String,
    #[serde(default)]
    pub comment_creation_date: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub comment_type: Option<String>,
    #[serde(default)]
    pub creation_user_guid: Option<String>,
    #[serde(default)]
    pub role_guid: Option<String>,
    #[serde(default)]
    pub attachment_caption: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub migrate_status: String,
    #[serde(default)]
    pub created_document_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub correspondence_subject: Option<String>,
    #[serde(default)]
    pub correspondence_reference_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correspondence_guid: String,
    /// 部分後端版本序列化成 `needToClose`
    #[serde(
        default,
        rename = "isNeedToClose",
        alias = "needToClose",
        deserialize_with = "null_as_default"
    )]
    pub is_need_to_close: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub closing_status: String,
    #[serde(default)]
    pub closing_error: Option<String>,
    #[serde(default)]
    pub created_document_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub correspondence_subject: Option<String>,
    #[serde(default)]
    pub correspondence_reference_no: Option<String>,
    #[serde(default)]
    pub correspondence_last_modified_date: Option<String>,
    #[serde(default)]
    pub creation_user_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correspondence_guid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approval_status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approval_step: String,
    #[serde(default)]
    pub approval_error: Option<String>,
    #[serde(default)]
    pub created_document_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub correspondence_subject: Option<String>,
    #[serde(default)]
    pub correspondence_reference_no: Option<String>,
    #[serde(default)]
    pub creation_user_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrespondenceImportStatistics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub in_progress: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending: u64,
}

/// 單一公文的關聯資料匯入進度
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrespondenceImportStatus {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correspondence_guid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_status: String,
    #[serde(default)]
    pub attachments_status: Option<String>,
    #[serde(default)]
    pub comments_status: Option<String>,
    #[serde(default)]
    pub copy_tos_status: Option<String>,
    #[serde(default)]
    pub current_departments_status: Option<String>,
    #[serde(default)]
    pub current_positions_status: Option<String>,
    #[serde(default)]
    pub current_users_status: Option<String>,
    #[serde(default)]
    pub custom_fields_status: Option<String>,
    #[serde(default)]
    pub links_status: Option<String>,
    #[serde(default)]
    pub send_tos_status: Option<String>,
    #[serde(default)]
    pub transactions_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_entities_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub successful_entities_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_entities_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub correspondence_subject: Option<String>,
    #[serde(default)]
    pub correspondence_reference_no: Option<String>,
}

impl CorrespondenceImportStatus {
    /// 以 (名稱, 狀態) 列出各關聯實體
    pub fn entity_statuses(&self) -> Vec<(&'static str, &str)> {
        [
            ("attachments", &self.attachments_status),
            ("comments", &self.comments_status),
            ("copy-tos", &self.copy_tos_status),
            ("current-departments", &self.current_departments_status),
            ("current-positions", &self.current_positions_status),
            ("current-users", &self.current_users_status),
            ("custom-fields", &self.custom_fields_status),
            ("links", &self.links_status),
            ("send-tos", &self.send_tos_status),
            ("transactions", &self.transactions_status),
        ]
        .into_iter()
        .filter_map(|(name, status)| status.as_deref().map(|s| (name, s)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

/// 表格中的一列；`selected` 只存在於本地，每次重新載入都歸零
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<R> {
    pub row: R,
    pub selected: bool,
}

impl<R> TableRow<R> {
    pub fn new(row: R) -> Self {
        Self {
            row,
            selected: false,
        }
    }
}
