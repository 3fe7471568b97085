//! ブログスクレイパー関連の型定義

use serde::{Deserialize, Serialize};

use crate::export::ReportEntry;

/// 記事データ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    /// 開始URLを基準に解決済みの絶対URL
    pub link: String,
    pub date: String,
    pub category: String,
}

/// タイトル要素の生データ（ページから読んだまま）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnchor {
    pub text: String,
    pub href: Option<String>,
}

impl RawAnchor {
    pub fn new(text: impl Into<String>, href: Option<&str>) -> Self {
        Self {
            text: text.into(),
            href: href.map(str::to_string),
        }
    }
}

/// コンテナ単位で取得した1記事分の生データ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGroup {
    pub title: Option<RawAnchor>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// 「次へ」ボタンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub visible: bool,
    pub enabled: bool,
}

impl ControlState {
    pub fn clickable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// ページループの終了理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// 次ページなし、またはクリック後に変化なし
    LastPage,
    /// `max_pages` に到達
    MaxPages,
    /// 実行中のエラー（部分結果を返却）
    Failed(String),
    /// `run_timeout` 超過
    TimedOut,
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::Failed(_) | StopReason::TimedOut)
    }
}

/// ページ完了ごとの進捗スナップショット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageProgress {
    pub page: u32,
    pub page_articles: usize,
    pub total_articles: usize,
}

/// スクレイプ結果
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    /// 全ページの記事（取得順）
    pub articles: Vec<Article>,
    /// 訪問したページ数（最初のページを含む）
    pub total_pages: u32,
    /// ページごとの抽出件数
    pub page_counts: Vec<usize>,
    /// `Title,Description,Link,Date,Category` 形式のCSV
    pub csv_data: String,
    pub stop_reason: StopReason,
}

impl ScrapeResult {
    pub fn total_articles(&self) -> usize {
        self.articles.len()
    }

    /// レポートCSV用の行に変換（各記事に見つかったページ番号を付与）
    pub fn report_entries(&self) -> Vec<ReportEntry> {
        let pages = self
            .page_counts
            .iter()
            .enumerate()
            .flat_map(|(i, &count)| std::iter::repeat(i as u32 + 1).take(count));

        self.articles
            .iter()
            .zip(pages)
            .map(|(article, page)| ReportEntry {
                title: article.title.clone(),
                link: article.link.clone(),
                excerpt: article.description.clone(),
                page,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            description: format!("{} desc", title),
            link: format!("https://example.com/{}", title),
            date: "2024-01-01".to_string(),
            category: "medical".to_string(),
        }
    }

    #[test]
    fn test_report_entries_carry_page_numbers() {
        let result = ScrapeResult {
            articles: vec![article("a"), article("b"), article("c")],
            total_pages: 2,
            page_counts: vec![2, 1],
            csv_data: String::new(),
            stop_reason: StopReason::LastPage,
        };

        let entries = result.report_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].page, 1);
        assert_eq!(entries[1].page, 1);
        assert_eq!(entries[2].page, 2);
        assert_eq!(entries[2].excerpt, "c desc");
    }

    #[test]
    fn test_control_state_clickable() {
        assert!(ControlState { visible: true, enabled: true }.clickable());
        assert!(!ControlState { visible: true, enabled: false }.clickable());
        assert!(!ControlState { visible: false, enabled: true }.clickable());
    }

    #[test]
    fn test_raw_group_from_js_json() {
        let json = r#"{"title":{"text":" Hello ","href":"/post"},"description":null,"date":"Jan 1"}"#;
        let group: RawGroup = serde_json::from_str(json).unwrap();

        assert_eq!(group.title, Some(RawAnchor::new(" Hello ", Some("/post"))));
        assert!(group.description.is_none());
        assert_eq!(group.date.as_deref(), Some("Jan 1"));
    }
}
