//! 時間制限付き待機
//!
//! 条件が成立するかタイムアウトするまでポーリングする。

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::SettlePolicy;
use crate::error::ScraperError;
use crate::traits::PageDriver;

/// セレクタ待機のポーリング間隔
const SELECTOR_POLL_INTERVAL_MS: u64 = 100;

/// 待機の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceOutcome {
    Satisfied,
    TimedOut,
}

/// `condition` が true を返すか `timeout` が経過するまで待機
///
/// 条件チェック中のエラーは「未成立」として扱い、ポーリングを続ける。
pub async fn race<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> RaceOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ScraperError>>,
{
    let polling = async {
        loop {
            match condition().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => debug!("Condition check error: {}", e),
            }
            sleep(interval).await;
        }
    };

    match tokio::time::timeout(timeout, polling).await {
        Ok(()) => RaceOutcome::Satisfied,
        Err(_) => RaceOutcome::TimedOut,
    }
}

/// セレクタに一致する要素が現れるまで待機
pub async fn wait_for_selector(
    page: &dyn PageDriver,
    selector: &str,
    timeout: Duration,
) -> Result<(), ScraperError> {
    let outcome = race(
        timeout,
        Duration::from_millis(SELECTOR_POLL_INTERVAL_MS),
        || async move {
            let count = page.count(selector).await?;
            Ok::<_, ScraperError>(count > 0)
        },
    )
    .await;

    match outcome {
        RaceOutcome::Satisfied => Ok(()),
        RaceOutcome::TimedOut => Err(ScraperError::Timeout(format!(
            "セレクタ '{}' が{:?}以内に見つかりませんでした",
            selector, timeout
        ))),
    }
}

/// ページ遷移後の安定待機
pub async fn settle(page: &dyn PageDriver, policy: &SettlePolicy) {
    match *policy {
        SettlePolicy::None => {}
        SettlePolicy::Fixed(delay) => sleep(delay).await,
        SettlePolicy::StableDom {
            timeout,
            interval,
            required_checks,
        } => wait_stable(page, timeout, interval, required_checks).await,
    }
}

/// DOMの長さが連続して変化しなくなるまで待機（タイムアウトしても続行）
async fn wait_stable(page: &dyn PageDriver, timeout: Duration, interval: Duration, required_checks: u32) {
    debug!("Waiting for page to stabilize...");
    let start = Instant::now();

    let mut last_len: Option<usize> = None;
    let mut stable_count = 0;

    while start.elapsed() < timeout {
        match page.content_length().await {
            Ok(current_len) => {
                match last_len {
                    Some(last) if last == current_len => {
                        stable_count += 1;
                        if stable_count >= required_checks {
                            info!(
                                "Page stable after {:?} ({} consecutive checks)",
                                start.elapsed(),
                                stable_count
                            );
                            return;
                        }
                    }
                    _ => stable_count = 0,
                }
                last_len = Some(current_len);
            }
            Err(e) => {
                debug!("Page stable check error: {}", e);
                stable_count = 0;
            }
        }

        sleep(interval).await;
    }

    warn!(
        "Page stable timeout after {:?}, proceeding anyway",
        start.elapsed()
    );
}
