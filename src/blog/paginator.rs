//! ページ送り
//!
//! 「次へ」をクリックした後、実際にページが進んだかを2段階で判定する。
//! 1. URLの変化を待つ（通常のページ遷移）
//! 2. URLが変わらなければ先頭タイトルの変化を待つ（同一URLでの差し替え）

use tracing::{debug, info};

use crate::config::{ArticleSelectors, PaginationPolicy, ScrapeConfig};
use crate::error::ScraperError;
use crate::traits::PageDriver;

use super::wait::{race, RaceOutcome};

/// ページネーションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// 次ページへ進んだ
    HasNext,
    /// 「次へ」が存在しない、またはクリックできない
    NoNext,
    /// クリックしたが変化がなかった
    Done,
}

/// `advance` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    UrlChanged,
    ContentChanged,
    NoNext,
    Stalled,
}

impl Advance {
    pub fn advanced(self) -> bool {
        matches!(self, Advance::UrlChanged | Advance::ContentChanged)
    }

    pub fn state(self) -> PaginationState {
        match self {
            Advance::UrlChanged | Advance::ContentChanged => PaginationState::HasNext,
            Advance::NoNext => PaginationState::NoNext,
            Advance::Stalled => PaginationState::Done,
        }
    }
}

pub struct Paginator<'a> {
    selectors: &'a ArticleSelectors,
    policy: &'a PaginationPolicy,
}

impl<'a> Paginator<'a> {
    pub fn new(config: &'a ScrapeConfig) -> Self {
        Self {
            selectors: &config.selectors,
            policy: &config.pagination,
        }
    }

    /// 次ページへ進む
    ///
    /// 「次へ」がなければ待機せずに `NoNext` を返す。
    pub async fn advance(
        &self,
        page: &dyn PageDriver,
        previous_first_title: &str,
        previous_url: &str,
    ) -> Result<Advance, ScraperError> {
        let next_selector = self.selectors.next_page.as_str();

        match page.control_state(next_selector).await? {
            Some(state) if state.clickable() => {}
            Some(state) => {
                debug!("Next control not clickable: {:?}", state);
                return Ok(Advance::NoNext);
            }
            None => {
                debug!("Next control not found: {}", next_selector);
                return Ok(Advance::NoNext);
            }
        }

        debug!("Clicking next page...");
        page.click(next_selector).await?;

        let url_changed = race(
            self.policy.url_change_timeout,
            self.policy.poll_interval,
            || async move {
                let url = page.current_url().await?;
                Ok::<_, ScraperError>(url != previous_url)
            },
        )
        .await;

        if url_changed == RaceOutcome::Satisfied {
            debug!("URL changed after click");
            return Ok(Advance::UrlChanged);
        }

        let title_selector = self.selectors.title.as_str();
        let content_changed = race(
            self.policy.content_change_timeout,
            self.policy.poll_interval,
            || async move {
                let title = page.first_text(title_selector).await?;
                Ok::<_, ScraperError>(matches!(
                    title.as_deref(),
                    Some(t) if !t.is_empty() && t != previous_first_title
                ))
            },
        )
        .await;

        if content_changed == RaceOutcome::Satisfied {
            debug!("First title changed after click (same URL)");
            return Ok(Advance::ContentChanged);
        }

        info!("No change detected after clicking next, stopping");
        Ok(Advance::Stalled)
    }
}
