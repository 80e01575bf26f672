//! 表格與卡片共用的顯示輔助函式

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 頁碼列最多顯示的頁數
pub const MAX_VISIBLE_PAGES: u32 = 5;

pub const DEFAULT_TRUNCATE_LENGTH: usize = 50;

/// 狀態字串對應的顯示色調
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Failure,
    Pending,
    Running,
    Neutral,
}

impl StatusTone {
    pub fn icon(&self) -> &'static str {
        match self {
            StatusTone::Success => "✅",
            StatusTone::Failure => "❌",
            StatusTone::Pending => "⏳",
            StatusTone::Running => "🔄",
            StatusTone::Neutral => "⭕",
        }
    }

    /// 原始儀表板使用的樣式類別
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusTone::Success => "bg-green-100 text-green-800",
            StatusTone::Failure => "bg-red-100 text-red-800",
            StatusTone::Pending => "bg-yellow-100 text-yellow-800",
            StatusTone::Running => "bg-blue-100 text-blue-800",
            StatusTone::Neutral => "bg-gray-100 text-gray-800",
        }
    }
}

/// 不分大小寫；未知狀態一律落到 Neutral
pub fn status_tone(status: &str) -> StatusTone {
    match status.trim().to_uppercase().as_str() {
        "SUCCESS" | "COMPLETED" | "PARTIAL_SUCCESS" => StatusTone::Success,
        "FAILED" | "ERROR" => StatusTone::Failure,
        "PENDING" => StatusTone::Pending,
        "IN_PROGRESS" | "RUNNING" | "PROCESSING" => StatusTone::Running,
        _ => StatusTone::Neutral,
    }
}

pub fn status_icon(status: &str) -> &'static str {
    status_tone(status).icon()
}

pub fn status_class(status: &str) -> &'static str {
    status_tone(status).css_class()
}

/// 圖示加上原始狀態字串，空值顯示 `-`
pub fn status_badge(status: &str) -> String {
    if status.is_empty() {
        return "-".to_string();
    }
    format!("{} {}", status_icon(status), status)
}

/// 建立步驟的短名稱
pub fn step_display_name(step: &str) -> &str {
    match step {
        "GET_DETAILS" => "Get Details",
        "UPLOAD_MAIN_ATTACHMENT" => "Upload Main",
        "CREATE_CORRESPONDENCE" => "Create Corr.",
        "UPLOAD_OTHER_ATTACHMENTS" => "Upload Others",
        "CREATE_PHYSICAL_ATTACHMENT" => "Physical Attach.",
        "COMPLETED" => "Completed",
        other => other,
    }
}

/// 建立步驟的先後，未知步驟排在最後
pub fn step_order(step: &str) -> u32 {
    match step {
        "GET_DETAILS" => 1,
        "UPLOAD_MAIN_ATTACHMENT" => 2,
        "CREATE_CORRESPONDENCE" => 3,
        "UPLOAD_OTHER_ATTACHMENTS" => 4,
        "CREATE_PHYSICAL_ATTACHMENT" => 5,
        "COMPLETED" => 6,
        _ => 999,
    }
}

/// 以字元為單位截斷，超過長度時補上 `...`
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.is_empty() {
        return "-".to_string();
    }
    if text.chars().count() > max_length {
        let head: String = text.chars().take(max_length).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// 後端時間可能是 RFC 3339、無時區的 ISO 字串或純日期；解析失敗時原樣回傳
pub fn format_date(date_string: &str) -> String {
    let trimmed = date_string.trim();
    if trimmed.is_empty() {
        return "-".to_string();
    }

    const OUTPUT: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.format(OUTPUT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return dt.format(OUTPUT).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    trimmed.to_string()
}

pub fn format_optional_date(date_string: Option<&str>) -> String {
    format_date(date_string.unwrap_or_default())
}

pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// 以目前頁為中心、最多五頁的連續頁碼，並夾在 `[1, total_pages]` 之內
pub fn pagination_pages(current_page: u32, total_pages: u32) -> Vec<u32> {
    let max_visible = i64::from(MAX_VISIBLE_PAGES);
    let current = i64::from(current_page);
    let total = i64::from(total_pages);

    let mut start = (current - max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total);

    if end - start + 1 < max_visible {
        start = (end - max_visible + 1).max(1);
    }

    (start..=end).map(|page| page as u32).collect()
}

/// `ceil(len / page_size)`，page_size 為 0 時視為 1
pub fn page_count(len: usize, page_size: usize) -> u32 {
    let size = page_size.max(1);
    len.div_ceil(size) as u32
}
