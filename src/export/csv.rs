//! CSV生成
//!
//! 2種類の形式を扱う。
//! - 記事CSV（スクレイプ結果そのまま）: `Title,Description,Link,Date,Category`
//! - レポートCSV（番号と見つかったページ付き）: `numero,titre,lien,extrait,page_trouvee`

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::blog::types::Article;

pub const ARTICLE_HEADERS: [&str; 5] = ["Title", "Description", "Link", "Date", "Category"];
pub const REPORT_HEADERS: [&str; 5] = ["numero", "titre", "lien", "extrait", "page_trouvee"];

/// プレビューのデフォルト行数
pub const DEFAULT_PREVIEW_LINES: usize = 5;

/// レポートCSVの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub title: String,
    pub link: String,
    pub excerpt: String,
    pub page: u32,
}

fn needs_quotes(field: &str) -> bool {
    field.contains('"') || field.contains(',') || field.contains('\n')
}

/// フィールドをエスケープ
///
/// `"`、`,`、改行を含む場合のみダブルクォートで囲み、内部の `"` は二重にする。
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if needs_quotes(field) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn join_row<'a>(fields: impl IntoIterator<Item = Cow<'a, str>>) -> String {
    fields.into_iter().collect::<Vec<_>>().join(",")
}

/// 記事CSVを生成（ヘッダー + 1記事1行、改行区切り）
pub fn to_csv(articles: &[Article]) -> String {
    let mut lines = Vec::with_capacity(articles.len() + 1);
    lines.push(ARTICLE_HEADERS.join(","));

    for article in articles {
        lines.push(join_row([
            escape_field(&article.title),
            escape_field(&article.description),
            escape_field(&article.link),
            escape_field(&article.date),
            escape_field(&article.category),
        ]));
    }

    lines.join("\n")
}

/// レポートCSVを生成
///
/// `numero` は1始まりの連番。番号とページはクォートしない。
pub fn to_report_csv(entries: &[ReportEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(REPORT_HEADERS.join(","));

    for (i, entry) in entries.iter().enumerate() {
        lines.push(join_row([
            Cow::Owned((i + 1).to_string()),
            escape_field(&entry.title),
            escape_field(&entry.link),
            escape_field(&entry.excerpt),
            Cow::Owned(entry.page.to_string()),
        ]));
    }

    lines.join("\n")
}

/// 先頭 `max_lines` 行だけを返す（表示用）
pub fn preview(csv: &str, max_lines: usize) -> String {
    csv.split('\n').take(max_lines).collect::<Vec<_>>().join("\n")
}
