use async_trait::async_trait;
use tracing::warn;

use crate::blog::progress::ProgressObserver;
use crate::blog::types::{ControlState, RawAnchor, RawGroup, ScrapeResult};
use crate::config::ArticleSelectors;
use crate::error::ScraperError;

/// スクレイパーが必要とするページ操作
///
/// ブラウザエンジン（chromiumoxide）への依存をこの境界に閉じ込める。
/// 抽出・ページ送り・集約はすべてこのトレイト越しにページを扱う。
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// URLへ遷移
    async fn goto(&self, url: &str) -> Result<(), ScraperError>;

    /// 現在のURL（`window.location.href`）
    async fn current_url(&self) -> Result<String, ScraperError>;

    /// セレクタに一致する要素数
    async fn count(&self, selector: &str) -> Result<usize, ScraperError>;

    /// 一致する全要素の textContent（文書順、未トリム）
    async fn texts(&self, selector: &str) -> Result<Vec<String>, ScraperError>;

    /// 一致する全要素の textContent と href 属性
    async fn anchors(&self, selector: &str) -> Result<Vec<RawAnchor>, ScraperError>;

    /// コンテナ要素ごとにタイトル・説明・日付をまとめて取得
    async fn groups(
        &self,
        container: &str,
        selectors: &ArticleSelectors,
    ) -> Result<Vec<RawGroup>, ScraperError>;

    /// 最初の一致要素の表示・有効状態。要素がなければ None
    async fn control_state(&self, selector: &str) -> Result<Option<ControlState>, ScraperError>;

    /// 最初の一致要素をクリック
    async fn click(&self, selector: &str) -> Result<(), ScraperError>;

    /// 最初の一致要素のトリム済み textContent
    async fn first_text(&self, selector: &str) -> Result<Option<String>, ScraperError>;

    /// `document.documentElement.outerHTML.length`
    async fn content_length(&self) -> Result<usize, ScraperError>;

    /// フルページのPNGスクリーンショット
    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError>;
}

#[async_trait]
pub trait Scraper: Send + Sync {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// 全ページをスクレイピング（途中失敗時は部分結果を返す）
    async fn scrape(
        &mut self,
        observer: &dyn ProgressObserver,
    ) -> Result<ScrapeResult, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（initialize → scrape → close）
    ///
    /// close はどの経路でも必ず呼ばれる。
    async fn execute(
        &mut self,
        observer: &dyn ProgressObserver,
    ) -> Result<ScrapeResult, ScraperError> {
        if let Err(e) = self.initialize().await {
            if let Err(close_err) = self.close().await {
                warn!("Failed to close browser after init error: {}", close_err);
            }
            return Err(e);
        }

        let result = self.scrape(observer).await;

        if let Err(e) = self.close().await {
            warn!("Failed to close browser: {}", e);
        }
        result
    }
}
