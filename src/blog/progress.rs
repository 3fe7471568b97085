//! 進捗通知
//!
//! ページ完了ごとにスナップショットを通知する。観測専用で、制御には使わない。

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use super::types::PageProgress;

pub trait ProgressObserver: Send + Sync {
    fn page_completed(&self, progress: &PageProgress);
}

/// 何もしない通知先
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn page_completed(&self, _progress: &PageProgress) {}
}

/// ログに出力する通知先
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn page_completed(&self, progress: &PageProgress) {
        info!(
            "Page {} done ({} articles), {} articles in total",
            progress.page, progress.page_articles, progress.total_articles
        );
    }
}

/// チャネル経由でスナップショットを流す
impl ProgressObserver for UnboundedSender<PageProgress> {
    fn page_completed(&self, progress: &PageProgress) {
        if self.send(*progress).is_err() {
            debug!("Progress receiver dropped");
        }
    }
}
