use crate::domain::model::MigrationStatistics;
use crate::domain::phase::Pipeline;
use crate::domain::ports::MigrationBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 儀表板統計的共享快取
///
/// 以 `watch` 頻道保存最新一份統計，訂閱者永遠看得到最後一次成功的結果。
pub struct StatisticsCache<B: MigrationBackend> {
    backend: Arc<B>,
    sender: watch::Sender<Option<MigrationStatistics>>,
}

impl<B: MigrationBackend> StatisticsCache<B> {
    pub fn new(backend: Arc<B>) -> Self {
        // outgoing 管線一開始就顯示全為 0 的卡片
        let initial = match backend.pipeline() {
            Pipeline::Outgoing => Some(MigrationStatistics::default()),
            _ => None,
        };
        let (sender, _) = watch::channel(initial);
        Self { backend, sender }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<MigrationStatistics>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Option<MigrationStatistics> {
        *self.sender.borrow()
    }

    /// 抓取並發布最新統計；失敗時回傳 `None`，快取仍保留上一份
    pub async fn refresh(&self) -> Option<MigrationStatistics> {
        match self.backend.statistics().await {
            Ok(stats) => {
                self.sender.send_replace(Some(stats));
                Some(stats)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Failed to load {} statistics: {}",
                    self.backend.pipeline().label().to_lowercase(),
                    e
                );
                None
            }
        }
    }
}

/// 週期性刷新統計的背景工作，handle 被 drop 時即停止
pub struct AutoRefresh {
    handle: JoinHandle<()>,
}

impl AutoRefresh {
    pub fn spawn<B>(
        cache: Arc<StatisticsCache<B>>,
        period: Duration,
        is_loading: Arc<AtomicBool>,
    ) -> Self
    where
        B: MigrationBackend + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval 第一次 tick 會立即完成
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if is_loading.load(Ordering::SeqCst) {
                    tracing::debug!("Skipping statistics refresh while a request is in flight");
                    continue;
                }
                cache.refresh().await;
            }
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::MockBackend;

    #[tokio::test]
    async fn test_cache_starts_empty_except_outgoing() {
        let incoming = StatisticsCache::new(Arc::new(MockBackend::new(Pipeline::Incoming)));
        let outgoing = StatisticsCache::new(Arc::new(MockBackend::new(Pipeline::Outgoing)));
        assert_eq!(incoming.current(), None);
        assert_eq!(outgoing.current(), Some(MigrationStatistics::default()));
    }

    #[tokio::test]
    async fn test_refresh_publishes_and_keeps_last_value_on_error() {
        let backend = Arc::new(MockBackend::new(Pipeline::Incoming));
        backend.set_statistics(MigrationStatistics {
            creation: 7,
            ..Default::default()
        });
        let cache = StatisticsCache::new(backend.clone());
        let mut receiver = cache.subscribe();

        cache.refresh().await;
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().map(|s| s.creation), Some(7));

        backend.fail_statistics();
        assert!(cache.refresh().await.is_none());
        assert_eq!(cache.current().map(|s| s.creation), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_ticks_and_skips_while_loading() {
        let backend = Arc::new(MockBackend::new(Pipeline::Internal));
        let cache = Arc::new(StatisticsCache::new(backend.clone()));
        let is_loading = Arc::new(AtomicBool::new(false));

        let refresher = AutoRefresh::spawn(cache, Duration::from_secs(30), is_loading.clone());
        assert!(refresher.is_running());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(backend.statistics_calls(), 1);

        is_loading.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.statistics_calls(), 1);

        is_loading.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.statistics_calls(), 2);

        drop(refresher);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.statistics_calls(), 2);
    }
}
