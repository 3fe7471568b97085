//! ブログ一覧スクレイパーモジュール
//!
//! 一覧ページから記事を抽出し、「次へ」がなくなるまでページを送る。

pub mod aggregator;
pub mod extractor;
pub mod paginator;
pub mod progress;
pub mod types;
pub mod wait;

mod scraper;

pub use paginator::{Advance, PaginationState, Paginator};
pub use progress::{LogProgress, NullProgress, ProgressObserver};
pub use scraper::BlogScraper;
pub use types::{Article, ControlState, PageProgress, RawAnchor, RawGroup, ScrapeResult, StopReason};
