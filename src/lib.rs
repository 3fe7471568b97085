//! ブログ一覧スクレイパーライブラリ
//!
//! - ヘッドレスブラウザでブログ一覧をページ送りしながら記事を抽出
//! - 記事をCSV（記事形式 / レポート形式）に変換、ダウンロード
//!
//! # 使用例
//!
//! ```rust,ignore
//! use blog_scraper::{BlogScraper, LogProgress, ScrapeConfig, Scraper};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScrapeConfig::new("https://www.therapixel.fr/blog/", "medical")
//!         .with_max_pages(3);
//!
//!     let mut scraper = BlogScraper::new(config);
//!     let result = scraper.execute(&LogProgress).await.unwrap();
//!
//!     println!("Pages: {}, Articles: {}", result.total_pages, result.total_articles());
//!     println!("{}", blog_scraper::export::preview(&result.csv_data, 5));
//! }
//! ```
//!
//! # tower::Service として使う
//!
//! ```rust,ignore
//! use blog_scraper::{ScrapeRequest, ScraperService};
//! use tower::Service;
//!
//! let mut service = ScraperService::new();
//! let result = service.call(ScrapeRequest::default().with_max_pages(1)).await?;
//! ```

pub mod blog;
pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod service;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// 主要な型をリエクスポート
pub use blog::{
    Advance, Article, BlogScraper, LogProgress, NullProgress, PageProgress, ProgressObserver,
    ScrapeResult, StopReason,
};
pub use browser::ChromiumPage;
pub use config::{ArticleSelectors, PaginationPolicy, ScrapeConfig, SettlePolicy};
pub use error::ScraperError;
pub use service::{ScrapeRequest, ScraperService};
pub use traits::{PageDriver, Scraper};
