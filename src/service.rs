use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::blog::{BlogScraper, LogProgress, ScrapeResult};
use crate::config::{ScrapeConfig, DEFAULT_CATEGORY, DEFAULT_START_URL};
use crate::error::ScraperError;
use crate::traits::Scraper;

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub start_url: String,
    pub category: String,
    pub headless: bool,
    pub max_pages: Option<u32>,
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self::new(DEFAULT_START_URL, DEFAULT_CATEGORY)
    }
}

impl ScrapeRequest {
    pub fn new(start_url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            category: category.into(),
            headless: true,
            max_pages: None,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

impl From<ScrapeRequest> for ScrapeConfig {
    fn from(req: ScrapeRequest) -> Self {
        ScrapeConfig {
            headless: req.headless,
            max_pages: req.max_pages,
            ..ScrapeConfig::new(req.start_url, req.category)
        }
    }
}

/// tower::Serviceを実装したスクレイパーサービス
///
/// 呼び出しごとにブラウザを起動し、完了後に必ず閉じる。
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    base: Option<ScrapeConfig>,
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }

    /// リクエストにないセレクタやタイムアウトをこの設定から引き継ぐ
    pub fn with_base_config(mut self, config: ScrapeConfig) -> Self {
        self.base = Some(config);
        self
    }

    fn config_for(&self, req: ScrapeRequest) -> ScrapeConfig {
        match &self.base {
            Some(base) => ScrapeConfig {
                start_url: req.start_url,
                category: req.category,
                headless: req.headless,
                max_pages: req.max_pages.or(base.max_pages),
                ..base.clone()
            },
            None => req.into(),
        }
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("Scrape request received: url={}", req.start_url);
        let config = self.config_for(req);

        Box::pin(async move {
            let mut scraper = BlogScraper::new(config);
            let result = scraper.execute(&LogProgress).await?;

            info!(
                "Scrape completed: {} articles on {} pages",
                result.total_articles(),
                result.total_pages
            );

            Ok(result)
        })
    }
}
