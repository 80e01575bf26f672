//! 各階段明細列的共同介面
//!
//! 每個階段的表格只差在欄位名稱與篩選條件，這裡把差異集中在 `DetailRow`，
//! 讓 `DetailTable` 只需實作一次。

use crate::domain::model::{
    ApprovalDetail, AssignmentDetail, BusinessLogDetail, ClosingDetail, CommentDetail,
    CreationDetail,
};
use crate::domain::phase::Phase;
use crate::utils::format::{
    format_date, format_optional_date, or_dash, status_badge, step_display_name, truncate_text,
    DEFAULT_TRUNCATE_LENGTH,
};
use serde::de::DeserializeOwned;

pub trait DetailRow: DeserializeOwned + Clone + Send + Sync + 'static {
    const PHASE: Phase;

    /// false 表示端點回傳完整清單，由表格自行篩選與分頁
    const SERVER_PAGED: bool = true;

    /// 對應 `Phase::extra_filter` 的篩選參數
    const EXTRA_FILTER: Option<&'static str> = None;

    /// 提示訊息中使用的名詞
    const NOUN: &'static str;

    /// 選取的列全都不可執行時的提示
    const NONE_EXECUTABLE_MESSAGE: &'static str = "None of the selected rows can be executed.";

    /// 單列不可執行時的提示
    const NOT_EXECUTABLE_MESSAGE: &'static str = "This row cannot be executed.";

    /// `execute-specific` 送出的識別碼
    fn guid(&self) -> &str;

    fn correspondence_guid(&self) -> &str;

    fn status(&self) -> &str;

    fn step(&self) -> Option<&str> {
        None
    }

    /// 可否被送去執行，只有 closing 會擋下不需要結案的列
    fn is_executable(&self) -> bool {
        true
    }

    fn search_fields(&self) -> Vec<&str>;

    fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    fn headers() -> Vec<&'static str>;

    fn cells(&self) -> Vec<String>;
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

impl DetailRow for CreationDetail {
    const PHASE: Phase = Phase::Creation;
    const SERVER_PAGED: bool = false;
    const EXTRA_FILTER: Option<&'static str> = Some("step");
    const NOUN: &'static str = "correspondence";

    fn guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn correspondence_guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn status(&self) -> &str {
        &self.creation_status
    }

    fn step(&self) -> Option<&str> {
        Some(self.creation_step.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.correspondence_guid.as_str(),
            opt(&self.correspondence_subject),
            opt(&self.correspondence_reference_no),
            opt(&self.creation_user_name),
        ]
    }

    fn headers() -> Vec<&'static str> {
        vec![
            "Correspondence GUID",
            "Subject",
            "Reference No",
            "Step",
            "Status",
            "Retries",
            "Error",
            "Last Modified",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.correspondence_guid.clone(),
            truncate_text(opt(&self.correspondence_subject), DEFAULT_TRUNCATE_LENGTH),
            or_dash(self.correspondence_reference_no.as_deref()),
            step_display_name(&self.creation_step).to_string(),
            status_badge(&self.creation_status),
            self.retry_count.to_string(),
            truncate_text(opt(&self.creation_error), DEFAULT_TRUNCATE_LENGTH),
            format_optional_date(self.last_modified_date.as_deref()),
        ]
    }
}

impl DetailRow for AssignmentDetail {
    const PHASE: Phase = Phase::Assignment;
    const NOUN: &'static str = "assignment";

    fn guid(&self) -> &str {
        &self.transaction_guid
    }

    fn correspondence_guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn status(&self) -> &str {
        &self.migrate_status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.transaction_guid.as_str(),
            self.correspondence_guid.as_str(),
            opt(&self.from_user_name),
            opt(&self.to_user_name),
            opt(&self.correspondence_subject),
        ]
    }

    fn headers() -> Vec<&'static str> {
        vec![
            "Transaction GUID",
            "Correspondence GUID",
            "From",
            "To",
            "Department",
            "Action Date",
            "Status",
            "Retries",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.transaction_guid.clone(),
            self.correspondence_guid.clone(),
            or_dash(self.from_user_name.as_deref()),
            or_dash(self.to_user_name.as_deref()),
            or_dash(self.department_code.as_deref()),
            format_optional_date(self.action_date.as_deref()),
            status_badge(&self.migrate_status),
            self.retry_count.to_string(),
        ]
    }
}

impl DetailRow for BusinessLogDetail {
    const PHASE: Phase = Phase::BusinessLog;
    const NOUN: &'static str = "business log";

    fn guid(&self) -> &str {
        &self.transaction_guid
    }

    fn correspondence_guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn status(&self) -> &str {
        &self.migrate_status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.transaction_guid.as_str(),
            self.correspondence_guid.as_str(),
            opt(&self.action_english_name),
            opt(&self.from_user_name),
        ]
    }

    fn headers() -> Vec<&'static str> {
        vec![
            "Transaction GUID",
            "Correspondence GUID",
            "Action",
            "From",
            "Action Date",
            "Notes",
            "Status",
            "Retries",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.transaction_guid.clone(),
            self.correspondence_guid.clone(),
            or_dash(self.action_english_name.as_deref()),
            or_dash(self.from_user_name.as_deref()),
            format_optional_date(self.action_date.as_deref()),
            truncate_text(opt(&self.notes), DEFAULT_TRUNCATE_LENGTH),
            status_badge(&self.migrate_status),
            self.retry_count.to_string(),
        ]
    }
}

impl DetailRow for CommentDetail {
    const PHASE: Phase = Phase::Comment;
    const EXTRA_FILTER: Option<&'static str> = Some("commentType");
    const NOUN: &'static str = "comment";

    fn guid(&self) -> &str {
        &self.comment_guid
    }

    fn correspondence_guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn status(&self) -> &str {
        &self.migrate_status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.comment_guid.as_str(),
            self.correspondence_guid.as_str(),
            opt(&self.comment),
        ]
    }

    fn headers() -> Vec<&'static str> {
        vec![
            "Comment GUID",
            "Correspondence GUID",
            "Type",
            "Comment",
            "Created",
            "Status",
            "Retries",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.comment_guid.clone(),
            self.correspondence_guid.clone(),
            or_dash(self.comment_type.as_deref()),
            truncate_text(opt(&self.comment), DEFAULT_TRUNCATE_LENGTH),
            format_optional_date(self.comment_creation_date.as_deref()),
            status_badge(&self.migrate_status),
            self.retry_count.to_string(),
        ]
    }
}

impl DetailRow for ClosingDetail {
    const PHASE: Phase = Phase::Closing;
    const EXTRA_FILTER: Option<&'static str> = Some("needToClose");
    const NOUN: &'static str = "correspondence";
    const NONE_EXECUTABLE_MESSAGE: &'static str =
        "None of the selected correspondences need to be closed.";
    const NOT_EXECUTABLE_MESSAGE: &'static str = "This correspondence does not need to be closed.";

    fn guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn correspondence_guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn status(&self) -> &str {
        &self.closing_status
    }

    fn is_executable(&self) -> bool {
        self.is_need_to_close
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.correspondence_guid.as_str(),
            opt(&self.correspondence_subject),
            opt(&self.correspondence_reference_no),
        ]
    }

    fn headers() -> Vec<&'static str> {
        vec![
            "Correspondence GUID",
            "Subject",
            "Need To Close",
            "Status",
            "Retries",
            "Error",
            "Correspondence Modified",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.correspondence_guid.clone(),
            truncate_text(opt(&self.correspondence_subject), DEFAULT_TRUNCATE_LENGTH),
            if self.is_need_to_close { "Yes" } else { "No" }.to_string(),
            status_badge(&self.closing_status),
            self.retry_count.to_string(),
            truncate_text(opt(&self.closing_error), DEFAULT_TRUNCATE_LENGTH),
            format_date(opt(&self.correspondence_last_modified_date)),
        ]
    }
}

impl DetailRow for ApprovalDetail {
    const PHASE: Phase = Phase::Approval;
    const EXTRA_FILTER: Option<&'static str> = Some("step");
    const NOUN: &'static str = "correspondence";

    fn guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn correspondence_guid(&self) -> &str {
        &self.correspondence_guid
    }

    fn status(&self) -> &str {
        &self.approval_status
    }

    fn step(&self) -> Option<&str> {
        Some(self.approval_step.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.correspondence_guid.as_str(),
            opt(&self.correspondence_subject),
            opt(&self.correspondence_reference_no),
            opt(&self.creation_user_name),
        ]
    }

    fn headers() -> Vec<&'static str> {
        vec![
            "Correspondence GUID",
            "Subject",
            "Step",
            "Status",
            "Retries",
            "Error",
            "Last Modified",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.correspondence_guid.clone(),
            truncate_text(opt(&self.correspondence_subject), DEFAULT_TRUNCATE_LENGTH),
            or_dash(Some(self.approval_step.as_str())),
            status_badge(&self.approval_status),
            self.retry_count.to_string(),
            truncate_text(opt(&self.approval_error), DEFAULT_TRUNCATE_LENGTH),
            format_optional_date(self.last_modified_date.as_deref()),
        ]
    }
}
