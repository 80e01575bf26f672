use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// 輸入端，可以複製給多個來源
#[derive(Debug)]
pub struct DebounceHandle<T> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T> Clone for DebounceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> DebounceHandle<T> {
    /// 接收端已關閉時回傳 false
    pub fn push(&self, value: T) -> bool {
        self.sender.send(value).is_ok()
    }
}

/// 在 `delay` 內沒有新值時才送出最後一個值
#[derive(Debug)]
pub struct Debouncer<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    delay: Duration,
    pending: Option<T>,
}

pub fn debounce<T>(delay: Duration) -> (DebounceHandle<T>, Debouncer<T>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        DebounceHandle { sender },
        Debouncer {
            receiver,
            delay,
            pending: None,
        },
    )
}

impl<T> Debouncer<T> {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 所有輸入端都關閉且沒有待送出的值時回傳 `None`
    ///
    /// 可放進 `tokio::select!`；被取消時尚未送出的值會留到下一次呼叫，計時重新開始。
    pub async fn next(&mut self) -> Option<T> {
        if self.pending.is_none() {
            self.pending = Some(self.receiver.recv().await?);
        }
        loop {
            match tokio::time::timeout(self.delay, self.receiver.recv()).await {
                Ok(Some(value)) => self.pending = Some(value),
                // 輸入端全部關閉，直接送出手上的值
                Ok(None) => return self.pending.take(),
                Err(_) => return self.pending.take(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_collapse_to_latest() {
        let (handle, mut debouncer) = debounce(DEFAULT_SEARCH_DEBOUNCE);
        let input = handle.clone();

        tokio::spawn(async move {
            for term in ["b", "bu", "bud", "budg"] {
                input.push(term.to_string());
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });

        let start = Instant::now();
        assert_eq!(debouncer.next().await.as_deref(), Some("budg"));
        // 最後一次輸入在 300ms，再等滿 500ms
        assert!(start.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_changes_emit_separately() {
        let (handle, mut debouncer) = debounce(Duration::from_millis(500));

        handle.push(1);
        assert_eq!(debouncer.next().await, Some(1));

        handle.push(2);
        handle.push(3);
        assert_eq!(debouncer.next().await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_all_handles_ends_stream() {
        let (handle, mut debouncer) = debounce::<u32>(Duration::from_millis(500));
        handle.push(9);
        drop(handle);

        assert_eq!(debouncer.next().await, Some(9));
        assert_eq!(debouncer.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_keeps_pending_value() {
        let (handle, mut debouncer) = debounce(Duration::from_millis(500));
        handle.push("draft".to_string());

        let cancelled =
            tokio::time::timeout(Duration::from_millis(100), debouncer.next()).await;
        assert!(cancelled.is_err());

        assert_eq!(debouncer.next().await.as_deref(), Some("draft"));
    }
}
