use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::browser::{self, ChromiumPage};
use crate::config::ScrapeConfig;
use crate::error::ScraperError;
use crate::traits::Scraper;

use super::aggregator;
use super::progress::ProgressObserver;
use super::types::ScrapeResult;

/// ブログ一覧スクレイパー
///
/// ブラウザとページを1つずつ保持し、`close` で解放する。
pub struct BlogScraper {
    config: ScrapeConfig,
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
    page: Option<Arc<ChromiumPage>>,
}

impl BlogScraper {
    pub fn new(config: ScrapeConfig) -> Self {
        Self {
            config,
            browser: None,
            handler_task: None,
            page: None,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// 初期化済みのページ（ダウンロード等に使う）
    pub fn page(&self) -> Option<&ChromiumPage> {
        self.page.as_deref()
    }

    fn get_page(&self) -> Result<&Arc<ChromiumPage>, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }
}

#[async_trait]
impl Scraper for BlogScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        let (browser, handler_task, page) = browser::launch(&self.config).await?;

        self.browser = Some(browser);
        self.handler_task = Some(handler_task);
        self.page = Some(Arc::new(page));
        Ok(())
    }

    async fn scrape(
        &mut self,
        observer: &dyn ProgressObserver,
    ) -> Result<ScrapeResult, ScraperError> {
        let page = self.get_page()?.clone();
        Ok(aggregator::run(&*page, &self.config, observer).await)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        self.page = None;

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser process: {}", e);
            }
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        info!("Browser closed");
        Ok(())
    }
}
