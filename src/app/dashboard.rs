use crate::core::statistics::{AutoRefresh, StatisticsCache};
use crate::domain::model::{ImportResponse, MigrationStatistics};
use crate::domain::phase::{Phase, PhaseStatus, Pipeline};
use crate::domain::ports::MigrationBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 儀表板上的一張階段卡片
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseCard {
    pub phase: Phase,
    pub name: &'static str,
    pub description: &'static str,
    pub status: PhaseStatus,
    /// 1 起算
    pub order: usize,
    pub count: u64,
    pub last_result: Option<ImportResponse>,
}

impl PhaseCard {
    pub fn status_icon(&self) -> &'static str {
        self.status.icon()
    }

    pub fn button_text(&self) -> &'static str {
        self.status.button_text()
    }
}

/// 單一管線的儀表板：卡片、統計與階段觸發
pub struct PhaseBoard<B: MigrationBackend> {
    cache: Arc<StatisticsCache<B>>,
    cards: Vec<PhaseCard>,
    statistics: Option<MigrationStatistics>,
    is_loading: Arc<AtomicBool>,
}

impl<B: MigrationBackend + 'static> PhaseBoard<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_cache(Arc::new(StatisticsCache::new(backend)))
    }

    /// 與其他畫面共用同一份統計快取
    pub fn with_cache(cache: Arc<StatisticsCache<B>>) -> Self {
        let pipeline = cache.backend().pipeline();
        let cards = pipeline
            .phases()
            .iter()
            .enumerate()
            .map(|(index, phase)| PhaseCard {
                phase: *phase,
                name: phase.display_name(),
                description: pipeline.phase_description(*phase),
                status: PhaseStatus::Pending,
                order: index + 1,
                count: 0,
                last_result: None,
            })
            .collect();

        let mut board = Self {
            cache,
            cards,
            statistics: None,
            is_loading: Arc::new(AtomicBool::new(false)),
        };
        board.sync_from_cache();
        board
    }

    pub fn pipeline(&self) -> Pipeline {
        self.cache.backend().pipeline()
    }

    pub fn cards(&self) -> &[PhaseCard] {
        &self.cards
    }

    pub fn card(&self, phase: Phase) -> Option<&PhaseCard> {
        self.cards.iter().find(|card| card.phase == phase)
    }

    fn card_mut(&mut self, phase: Phase) -> Option<&mut PhaseCard> {
        self.cards.iter_mut().find(|card| card.phase == phase)
    }

    pub fn statistics(&self) -> Option<&MigrationStatistics> {
        self.statistics.as_ref()
    }

    pub fn cache(&self) -> &Arc<StatisticsCache<B>> {
        &self.cache
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    /// 給自動刷新判斷是否略過本次 tick
    pub fn loading_flag(&self) -> Arc<AtomicBool> {
        self.is_loading.clone()
    }

    /// 套用快取中的最新統計，快取為空時不變
    pub fn sync_from_cache(&mut self) {
        if let Some(stats) = self.cache.current() {
            self.update_phase_statistics(stats);
        }
    }

    pub async fn load_statistics(&mut self) {
        tracing::debug!("Loading {} statistics", self.pipeline());
        if let Some(stats) = self.cache.refresh().await {
            self.update_phase_statistics(stats);
        }
    }

    pub fn update_phase_statistics(&mut self, stats: MigrationStatistics) {
        self.statistics = Some(stats);
        for card in &mut self.cards {
            card.count = card.phase.statistics_count(&stats);
            card.status = if card.count > 0 {
                PhaseStatus::Pending
            } else {
                PhaseStatus::Completed
            };
        }
    }

    pub fn can_execute_phase(&self, phase: Phase) -> bool {
        if self.is_loading() {
            return false;
        }
        let Some(card) = self.card(phase) else {
            return false;
        };
        if card.status == PhaseStatus::Running {
            return false;
        }

        let previous_completed = self
            .cards
            .iter()
            .filter(|other| other.order < card.order)
            .all(|other| other.status == PhaseStatus::Completed);

        previous_completed && card.count > 0
    }

    /// 忙碌中或卡片正在執行時不做任何事並回傳 `None`
    pub async fn execute_phase(&mut self, phase: Phase) -> Option<ImportResponse> {
        if self.is_loading() {
            return None;
        }
        let card = self.card_mut(phase)?;
        if card.status == PhaseStatus::Running {
            return None;
        }
        card.status = PhaseStatus::Running;
        self.is_loading.store(true, Ordering::SeqCst);

        tracing::info!("▶️ Executing phase: {}", phase.display_name());
        let response = self.cache.backend().execute_phase(phase).await;
        self.is_loading.store(false, Ordering::SeqCst);

        if let Some(card) = self.card_mut(phase) {
            card.status = if response.is_completed() {
                PhaseStatus::Completed
            } else {
                PhaseStatus::Error
            };
            card.last_result = Some(response.clone());
        }

        if response.is_completed() {
            tracing::info!("✅ Phase {} finished: {}", phase.display_name(), response.status);
        } else {
            tracing::error!(
                "❌ Phase {} failed: {}",
                phase.display_name(),
                response.message
            );
        }

        self.load_statistics().await;
        Some(response)
    }

    pub async fn retry_failed(&mut self) -> Option<ImportResponse> {
        if self.is_loading() {
            return None;
        }
        self.is_loading.store(true, Ordering::SeqCst);
        tracing::info!("🔁 Retrying failed {} migrations", self.pipeline());
        let response = self.cache.backend().retry_failed().await;
        self.is_loading.store(false, Ordering::SeqCst);

        self.load_statistics().await;
        Some(response)
    }

    pub fn start_auto_refresh(&self, period: Duration) -> AutoRefresh {
        AutoRefresh::spawn(self.cache.clone(), period, self.loading_flag())
    }
}
