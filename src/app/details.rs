//! 各階段明細表格
//!
//! 伺服器分頁的階段把篩選條件帶進查詢參數；creation 的端點回傳整份清單，
//! 由表格自行篩選並以 `page_size` 切頁。

use crate::domain::model::{ImportResponse, TableRow};
use crate::domain::phase::{Phase, Pipeline};
use crate::domain::ports::{DetailQuery, MigrationBackend, Prompter};
use crate::domain::row::DetailRow;
use crate::utils::error::Result;
use crate::utils::format::{page_count, pagination_pages};
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub struct DetailTable<R: DetailRow, B: MigrationBackend> {
    backend: Arc<B>,
    rows: Vec<TableRow<R>>,
    /// 通過本地篩選的列索引，只用於不分頁的端點
    filtered: Vec<usize>,
    status_filter: String,
    extra_filter: String,
    search_term: String,
    /// 1 起算
    current_page: u32,
    page_size: u32,
    total_pages: u32,
    total_elements: u64,
    has_next: bool,
    has_previous: bool,
    need_to_close_count: Option<u64>,
    is_loading: bool,
}

impl<R: DetailRow, B: MigrationBackend> DetailTable<R, B> {
    pub fn new(backend: Arc<B>, page_size: u32) -> Self {
        Self {
            backend,
            rows: Vec::new(),
            filtered: Vec::new(),
            status_filter: DetailQuery::ALL.to_string(),
            extra_filter: DetailQuery::ALL.to_string(),
            search_term: String::new(),
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 0,
            total_elements: 0,
            has_next: false,
            has_previous: false,
            need_to_close_count: None,
            is_loading: false,
        }
    }

    /// 設定初始篩選條件，不觸發載入
    pub fn with_filters(mut self, status: &str, extra: &str, search: &str) -> Self {
        self.status_filter = status.to_string();
        self.extra_filter = extra.to_string();
        self.search_term = search.to_string();
        self
    }

    pub fn pipeline(&self) -> Pipeline {
        self.backend.pipeline()
    }

    pub fn phase(&self) -> Phase {
        R::PHASE
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub fn need_to_close_count(&self) -> Option<u64> {
        self.need_to_close_count
    }

    pub fn status_filter(&self) -> &str {
        &self.status_filter
    }

    pub fn extra_filter(&self) -> &str {
        &self.extra_filter
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    fn query(&self, page: u32) -> DetailQuery {
        DetailQuery {
            page,
            size: self.page_size,
            status: self.status_filter.clone(),
            search: self.search_term.clone(),
            extra: R::EXTRA_FILTER.map(|name| (name, self.extra_filter.clone())),
        }
    }

    /// 重新抓取第一頁；失敗時保留原本的資料
    pub async fn load(&mut self) -> Result<()> {
        self.is_loading = true;
        tracing::debug!("Loading {} {} details", self.pipeline(), R::PHASE);

        let result = self.backend.details::<R>(&self.query(0)).await;
        self.is_loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("❌ Failed to load {} details: {}", R::PHASE, e);
                return Err(e);
            }
        };

        self.rows = page.content.into_iter().map(TableRow::new).collect();
        if R::SERVER_PAGED {
            self.filtered.clear();
            self.total_elements = page.total_elements;
            self.total_pages = page.total_pages;
            self.current_page = page.current_page + 1;
            self.has_next = page.has_next;
            self.has_previous = page.has_previous;
            self.need_to_close_count = page.need_to_close_count;
        } else {
            self.apply_client_filters();
        }
        self.clear_selection();
        Ok(())
    }

    /// 載入指定頁 (1 起算)；載入中時直接略過，頁碼範圍由 `go_to_page` 把關
    async fn load_page(&mut self, page: u32) -> Result<()> {
        if self.is_loading {
            return Ok(());
        }

        if !R::SERVER_PAGED {
            self.current_page = page;
            self.has_previous = page > 1;
            self.has_next = page < self.total_pages;
            self.clear_selection();
            return Ok(());
        }

        self.is_loading = true;
        let result = self
            .backend
            .details::<R>(&self.query(page.saturating_sub(1)))
            .await;
        self.is_loading = false;

        match result {
            Ok(response) => {
                self.rows = response.content.into_iter().map(TableRow::new).collect();
                self.current_page = page;
                self.total_elements = response.total_elements;
                self.total_pages = response.total_pages;
                self.has_next = response.has_next;
                self.has_previous = response.has_previous;
                if response.need_to_close_count.is_some() {
                    self.need_to_close_count = response.need_to_close_count;
                }
                self.clear_selection();
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ Failed to load page {}: {}", page, e);
                Err(e)
            }
        }
    }

    pub async fn go_to_page(&mut self, page: u32) -> Result<()> {
        if page >= 1 && page <= self.total_pages {
            self.load_page(page).await
        } else {
            Ok(())
        }
    }

    /// 篩選條件變動後回到第一頁
    async fn refilter(&mut self) -> Result<()> {
        self.current_page = 1;
        if R::SERVER_PAGED {
            self.load().await
        } else {
            self.apply_client_filters();
            self.clear_selection();
            Ok(())
        }
    }

    pub async fn set_status_filter(&mut self, status: &str) -> Result<()> {
        self.status_filter = status.to_string();
        self.refilter().await
    }

    /// step / needToClose / commentType，視階段而定
    pub async fn set_extra_filter(&mut self, value: &str) -> Result<()> {
        self.extra_filter = value.to_string();
        self.refilter().await
    }

    /// 搜尋輸入應先經過 `Debouncer`，這裡只負責套用
    pub async fn set_search(&mut self, term: &str) -> Result<()> {
        self.search_term = term.to_string();
        self.refilter().await
    }

    pub async fn clear_filters(&mut self) -> Result<()> {
        self.status_filter = DetailQuery::ALL.to_string();
        self.extra_filter = DetailQuery::ALL.to_string();
        self.search_term.clear();
        self.refilter().await
    }

    fn apply_client_filters(&mut self) {
        let status = self.status_filter.as_str();
        let step = self.extra_filter.as_str();
        let term = self.search_term.as_str();

        self.filtered = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| status == DetailQuery::ALL || r.row.status() == status)
            .filter(|(_, r)| step == DetailQuery::ALL || r.row.step() == Some(step))
            .filter(|(_, r)| r.row.matches_search(term))
            .map(|(index, _)| index)
            .collect();

        self.total_elements = self.filtered.len() as u64;
        self.total_pages = page_count(self.filtered.len(), self.page_size as usize);
        if self.current_page > self.total_pages {
            self.current_page = 1;
        }
        self.has_previous = self.current_page > 1;
        self.has_next = self.current_page < self.total_pages;
    }

    /// 目前頁面可見列在 `rows` 中的索引
    fn visible_indices(&self) -> Vec<usize> {
        if R::SERVER_PAGED {
            return (0..self.rows.len()).collect();
        }
        let start = (self.current_page.saturating_sub(1) as usize)
            .saturating_mul(self.page_size as usize);
        self.filtered
            .iter()
            .skip(start)
            .take(self.page_size as usize)
            .copied()
            .collect()
    }

    pub fn visible_rows(&self) -> Vec<&TableRow<R>> {
        self.visible_indices()
            .into_iter()
            .map(|index| &self.rows[index])
            .collect()
    }

    pub fn loaded_rows(&self) -> &[TableRow<R>] {
        &self.rows
    }

    /// 以可見列的位置切換選取，位置超出範圍時回傳 false
    pub fn toggle_selection(&mut self, visible_index: usize) -> bool {
        match self.visible_indices().get(visible_index) {
            Some(&index) => {
                self.rows[index].selected = !self.rows[index].selected;
                true
            }
            None => false,
        }
    }

    pub fn toggle_all_selection(&mut self) {
        let select = !self.all_selected();
        for index in self.visible_indices() {
            self.rows[index].selected = select;
        }
    }

    pub fn all_selected(&self) -> bool {
        let visible = self.visible_indices();
        !visible.is_empty() && visible.iter().all(|&index| self.rows[index].selected)
    }

    pub fn clear_selection(&mut self) {
        for row in &mut self.rows {
            row.selected = false;
        }
    }

    pub fn selected_rows(&self) -> Vec<&R> {
        self.rows
            .iter()
            .filter(|r| r.selected)
            .map(|r| &r.row)
            .collect()
    }

    pub fn selected_guids(&self) -> Vec<String> {
        self.selected_rows()
            .into_iter()
            .map(|row| row.guid().to_string())
            .collect()
    }

    pub fn pagination_pages(&self) -> Vec<u32> {
        pagination_pages(self.current_page, self.total_pages)
    }

    async fn run_specific(&mut self, guids: &[String]) -> ImportResponse {
        self.is_loading = true;
        let response = self.backend.execute_specific(R::PHASE, guids).await;
        self.is_loading = false;
        response
    }

    async fn reload_after_execute(&mut self, prompter: &dyn Prompter) {
        if let Err(e) = self.load().await {
            prompter.alert(&format!("Failed to reload {} details: {}", R::PHASE, e));
        }
    }

    /// 對選取列執行目前階段；沒有可執行的列時不發出任何請求
    pub async fn execute_for_selected(&mut self, prompter: &dyn Prompter) -> Option<ImportResponse> {
        let phase_name = R::PHASE.display_name().to_lowercase();
        let selected = self.selected_rows();
        if selected.is_empty() {
            prompter.alert(&format!(
                "Please select at least one {} to execute {}.",
                R::NOUN,
                phase_name
            ));
            return None;
        }

        let guids: Vec<String> = selected
            .into_iter()
            .filter(|row| row.is_executable())
            .map(|row| row.guid().to_string())
            .collect();
        if guids.is_empty() {
            prompter.alert(R::NONE_EXECUTABLE_MESSAGE);
            return None;
        }

        if !prompter.confirm(&format!(
            "Execute {} for {} selected {}s?",
            phase_name,
            guids.len(),
            R::NOUN
        )) {
            return None;
        }

        tracing::info!("🎯 Executing {} for {} selected row(s)", R::PHASE, guids.len());
        let response = self.run_specific(&guids).await;
        self.reload_after_execute(prompter).await;
        self.clear_selection();
        prompter.alert(&response.summary(R::PHASE.display_name(), R::NOUN));
        Some(response)
    }

    fn row_at(&self, visible_index: usize) -> Option<R> {
        self.visible_indices()
            .get(visible_index)
            .map(|&index| self.rows[index].row.clone())
    }

    pub async fn execute_for_single(
        &mut self,
        visible_index: usize,
        prompter: &dyn Prompter,
    ) -> Option<ImportResponse> {
        let row = self.row_at(visible_index)?;
        if !row.is_executable() {
            prompter.alert(R::NOT_EXECUTABLE_MESSAGE);
            return None;
        }

        let phase_name = R::PHASE.display_name();
        if !prompter.confirm(&format!(
            "Execute {} for {}: {}?",
            phase_name.to_lowercase(),
            R::NOUN,
            row.guid()
        )) {
            return None;
        }

        let response = self.run_specific(&[row.guid().to_string()]).await;
        self.reload_after_execute(prompter).await;
        if response.is_success() {
            prompter.alert(&format!("{} completed successfully.", phase_name));
        } else {
            prompter.alert(&format!("{} failed: {}", phase_name, response.message));
        }
        Some(response)
    }

    pub async fn retry_row(
        &mut self,
        visible_index: usize,
        prompter: &dyn Prompter,
    ) -> Option<ImportResponse> {
        let row = self.row_at(visible_index)?;
        if !prompter.confirm(&format!(
            "Retry {} for {}: {}?",
            R::PHASE.display_name().to_lowercase(),
            R::NOUN,
            row.guid()
        )) {
            return None;
        }
        self.execute_for_single(visible_index, prompter).await
    }
}
