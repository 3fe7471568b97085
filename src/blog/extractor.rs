//! 記事抽出
//!
//! ページから生データを読み取り、記事の列に変換する。
//! タイトル・説明・日付は通常インデックスで対応付ける（DOM上の並びが揃っている前提）。
//! コンテナセレクタが設定されていればコンテナ単位でまとめて取得する。

use tracing::debug;
use url::Url;

use crate::config::{ArticleSelectors, ScrapeConfig};
use crate::error::ScraperError;
use crate::traits::PageDriver;

use super::types::{Article, RawAnchor, RawGroup};

/// 1ページ分の生データ
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    groups: Vec<RawGroup>,
}

impl RawPage {
    /// 並列に取得した3つの列をインデックスで対応付ける
    pub fn from_parallel(titles: Vec<RawAnchor>, descriptions: Vec<String>, dates: Vec<String>) -> Self {
        let mut descriptions = descriptions.into_iter();
        let mut dates = dates.into_iter();

        let groups = titles
            .into_iter()
            .map(|title| RawGroup {
                title: Some(title),
                description: descriptions.next(),
                date: dates.next(),
            })
            .collect();

        Self { groups }
    }

    pub fn from_groups(groups: Vec<RawGroup>) -> Self {
        Self { groups }
    }

    /// 記事の列に変換（消費するので1回しか走査できない）
    ///
    /// タイトルが空白のみのものは除外する。
    pub fn into_articles<'a>(
        self,
        base: &'a Url,
        category: &'a str,
    ) -> impl Iterator<Item = Article> + 'a {
        self.groups.into_iter().filter_map(move |group| {
            let anchor = group.title?;
            let title = anchor.text.trim();
            if title.is_empty() {
                return None;
            }

            Some(Article {
                title: title.to_string(),
                description: group.description.as_deref().unwrap_or_default().trim().to_string(),
                link: resolve_link(anchor.href.as_deref(), base),
                date: group.date.as_deref().unwrap_or_default().trim().to_string(),
                category: category.to_string(),
            })
        })
    }
}

/// hrefを絶対URLに解決
///
/// `http` で始まるものはそのまま、それ以外は基準URLからの相対として結合する。
/// hrefがない場合は基準URLになる。
pub fn resolve_link(href: Option<&str>, base: &Url) -> String {
    let href = href.unwrap_or_default();
    if href.starts_with("http") {
        return href.to_string();
    }

    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            debug!("Failed to resolve link '{}': {}", href, e);
            href.to_string()
        }
    }
}

/// 現在のページから生データを取得
pub async fn snapshot(
    page: &dyn PageDriver,
    selectors: &ArticleSelectors,
) -> Result<RawPage, ScraperError> {
    if let Some(container) = &selectors.container {
        let groups = page.groups(container, selectors).await?;
        return Ok(RawPage::from_groups(groups));
    }

    let titles = page.anchors(&selectors.title).await?;
    let descriptions = page.texts(&selectors.description).await?;
    let dates = page.texts(&selectors.date).await?;

    if descriptions.len() != titles.len() || dates.len() != titles.len() {
        debug!(
            "Selector counts differ (titles={}, descriptions={}, dates={}), records may be misaligned",
            titles.len(),
            descriptions.len(),
            dates.len()
        );
    }

    Ok(RawPage::from_parallel(titles, descriptions, dates))
}

/// 現在のページの記事を抽出
pub async fn extract_articles(
    page: &dyn PageDriver,
    config: &ScrapeConfig,
) -> Result<Vec<Article>, ScraperError> {
    let base = Url::parse(&config.start_url)?;
    let raw = snapshot(page, &config.selectors).await?;

    let articles: Vec<Article> = raw
        .into_articles(&base, &config.category)
        .inspect(|article| debug!("Title: {}", article.title))
        .collect();

    Ok(articles)
}
