//! ページループ
//!
//! 開始URLから「次へ」がなくなるまで記事を集める。
//! 途中で失敗しても、それまでに集めた記事を結果として返す。

use base64::Engine;
use tracing::{debug, error, info, warn};

use crate::config::ScrapeConfig;
use crate::error::ScraperError;
use crate::export::to_csv;
use crate::traits::PageDriver;

use super::extractor::extract_articles;
use super::paginator::Paginator;
use super::progress::ProgressObserver;
use super::types::{Article, PageProgress, ScrapeResult, StopReason};
use super::wait::{settle, wait_for_selector};

/// 実行中に蓄積する状態
struct RunState {
    articles: Vec<Article>,
    page_counts: Vec<usize>,
    current_page: u32,
}

/// 全ページをスクレイピングして結果をまとめる
///
/// エラーは返さない。失敗時は `StopReason::Failed` と部分結果になる。
pub async fn run(
    page: &dyn PageDriver,
    config: &ScrapeConfig,
    observer: &dyn ProgressObserver,
) -> ScrapeResult {
    let mut state = RunState {
        articles: Vec::new(),
        page_counts: Vec::new(),
        current_page: 1,
    };

    let outcome = match config.run_timeout {
        Some(limit) => {
            match tokio::time::timeout(limit, scrape_pages(page, config, observer, &mut state)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Run timeout after {:?}, returning partial results", limit);
                    Ok(StopReason::TimedOut)
                }
            }
        }
        None => scrape_pages(page, config, observer, &mut state).await,
    };

    let stop_reason = match outcome {
        Ok(reason) => reason,
        Err(e) => {
            error!("Error while scraping page {}: {}", state.current_page, e);
            if config.debug {
                log_screenshot(page).await;
            }
            StopReason::Failed(e.to_string())
        }
    };

    info!(
        "Scraping finished: {} articles on {} pages ({:?})",
        state.articles.len(),
        state.current_page,
        stop_reason
    );

    let csv_data = to_csv(&state.articles);
    ScrapeResult {
        articles: state.articles,
        total_pages: state.current_page,
        page_counts: state.page_counts,
        csv_data,
        stop_reason,
    }
}

async fn scrape_pages(
    page: &dyn PageDriver,
    config: &ScrapeConfig,
    observer: &dyn ProgressObserver,
    state: &mut RunState,
) -> Result<StopReason, ScraperError> {
    info!("Navigating to {}", config.start_url);
    page.goto(&config.start_url).await?;

    let paginator = Paginator::new(config);

    loop {
        info!("Scraping page {}", state.current_page);
        wait_for_selector(page, &config.selectors.title, config.selector_timeout).await?;

        let articles = extract_articles(page, config).await?;
        let page_articles = articles.len();
        info!("{} articles found", page_articles);

        let previous_first_title = articles
            .first()
            .map(|article| article.title.clone())
            .unwrap_or_default();

        state.articles.extend(articles);
        state.page_counts.push(page_articles);

        observer.page_completed(&PageProgress {
            page: state.current_page,
            page_articles,
            total_articles: state.articles.len(),
        });

        if let Some(max_pages) = config.max_pages {
            if state.current_page >= max_pages {
                info!("Reached max pages ({})", max_pages);
                return Ok(StopReason::MaxPages);
            }
        }

        let previous_url = page.current_url().await?;
        let advance = paginator
            .advance(page, &previous_first_title, &previous_url)
            .await?;

        if !advance.advanced() {
            info!("No more pages");
            return Ok(StopReason::LastPage);
        }

        state.current_page += 1;
        settle(page, &config.settle).await;
    }
}

/// デバッグ用スクリーンショットをログ出力
async fn log_screenshot(page: &dyn PageDriver) {
    match page.screenshot().await {
        Ok(png) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
            debug!("Failure screenshot: data:image/png;base64,{}", encoded);
        }
        Err(e) => debug!("Failed to take screenshot: {}", e),
    }
}
