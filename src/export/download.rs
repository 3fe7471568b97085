//! CSVの保存
//!
//! - ブラウザ経由のダウンロード（Blob + オブジェクトURL + 非表示リンクのクリック）
//! - ローカルファイルへの書き込み

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::time::{sleep, Instant};
use tracing::{error, info};

use crate::browser::{js_string, ChromiumPage};
use crate::error::ScraperError;

const FILE_NAME_PREFIX: &str = "kommunicate_healthcare_articles_";
const DOWNLOAD_WAIT_SECS: u64 = 30;

/// 日付入りのファイル名（`kommunicate_healthcare_articles_YYYY-MM-DD.csv`）
pub fn file_name(date: NaiveDate) -> String {
    format!("{}{}.csv", FILE_NAME_PREFIX, date.format("%Y-%m-%d"))
}

/// 今日（UTC）の日付でファイル名を生成
pub fn file_name_today() -> String {
    file_name(Utc::now().date_naive())
}

/// ページ内でダウンロードを発生させるスクリプト
///
/// リンク要素とオブジェクトURLは成功・失敗どちらでも `finally` で解放する。
fn download_script(csv: &str, file_name: &str) -> String {
    format!(
        r#"
        (() => {{
            let url = null;
            let link = null;
            try {{
                const blob = new Blob([{csv}], {{ type: 'text/csv;charset=utf-8;' }});
                url = URL.createObjectURL(blob);
                link = document.createElement('a');
                link.setAttribute('href', url);
                link.setAttribute('download', {name});
                link.style.visibility = 'hidden';
                document.body.appendChild(link);
                link.click();
            }} finally {{
                if (link && link.parentNode) {{
                    link.parentNode.removeChild(link);
                }}
                if (url) {{
                    URL.revokeObjectURL(url);
                }}
            }}
        }})()
        "#,
        csv = js_string(csv),
        name = js_string(file_name),
    )
}

/// ダウンロード先にある記事CSV（`... (1).csv` のような重複名も含む）
fn article_csv_files(dir: &Path) -> HashSet<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return HashSet::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(FILE_NAME_PREFIX) && name.ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect()
}

/// ダウンロード完了を待機
///
/// `existing` に含まれるファイルは前回以前の出力なので無視する。
async fn wait_for_download(
    dir: &Path,
    existing: &HashSet<PathBuf>,
    timeout: Duration,
) -> Result<PathBuf, ScraperError> {
    let poll_interval = Duration::from_millis(500);
    let start = Instant::now();

    loop {
        let finished = article_csv_files(dir)
            .into_iter()
            .filter(|path| !existing.contains(path))
            .find(|path| !path.with_extension("csv.crdownload").exists());

        if let Some(path) = finished {
            info!("CSV file detected: {:?}", path);
            return Ok(path);
        }

        if start.elapsed() > timeout {
            return Err(ScraperError::Timeout(format!(
                "ダウンロードが{:?}以内に完了しませんでした",
                timeout
            )));
        }

        sleep(poll_interval).await;
    }
}

/// ブラウザ経由でCSVをダウンロード
pub async fn try_download(
    page: &ChromiumPage,
    csv: &str,
    download_dir: &Path,
) -> Result<PathBuf, ScraperError> {
    std::fs::create_dir_all(download_dir)?;
    let download_dir = download_dir
        .canonicalize()
        .unwrap_or_else(|_| download_dir.to_path_buf());

    page.set_download_dir(&download_dir).await?;

    let existing = article_csv_files(&download_dir);
    page.run_script(&download_script(csv, &file_name_today())).await?;

    wait_for_download(
        &download_dir,
        &existing,
        Duration::from_secs(DOWNLOAD_WAIT_SECS),
    )
    .await
}

/// ブラウザ経由でCSVをダウンロード（失敗はログのみ）
pub async fn download(
    page: &ChromiumPage,
    csv: &str,
    download_dir: &Path,
    article_count: usize,
) -> Option<PathBuf> {
    match try_download(page, csv, download_dir).await {
        Ok(path) => {
            info!("CSV downloaded: {} articles -> {:?}", article_count, path);
            Some(path)
        }
        Err(e) => {
            error!("CSV download failed: {}", e);
            None
        }
    }
}

/// CSVをファイルに書き込む
pub fn save_csv(path: &Path, csv: &str) -> Result<(), ScraperError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, csv)?;
    info!("Saved CSV to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("blog-scraper-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(file_name(date), "kommunicate_healthcare_articles_2024-03-09.csv");
    }

    #[test]
    fn test_file_name_today_pattern() {
        let name = file_name_today();
        assert!(name.starts_with(FILE_NAME_PREFIX));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), FILE_NAME_PREFIX.len() + "YYYY-MM-DD.csv".len());
    }

    #[test]
    fn test_download_script_escapes_content_and_releases() {
        let script = download_script("Title\n\"Health, Simplified\"", "out.csv");

        assert!(script.contains(r#"new Blob(["Title\n\"Health, Simplified\""]"#));
        assert!(script.contains(r#"link.setAttribute('download', "out.csv")"#));
        assert!(script.contains("finally"));
        assert!(script.contains("URL.revokeObjectURL(url)"));
        assert!(script.contains("removeChild(link)"));
        assert!(!script.contains("return"));
    }

    #[tokio::test]
    async fn test_wait_for_download_finds_new_file() {
        let dir = temp_dir("wait");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name_today());
        std::fs::write(&path, "Title").unwrap();

        let found = wait_for_download(&dir, &HashSet::new(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(found, path);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_download_ignores_previous_export() {
        let dir = temp_dir("stale");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file_name_today()), "Title\nOLD").unwrap();
        std::fs::write(dir.join("other.csv"), "x").unwrap();

        let existing = article_csv_files(&dir);
        assert_eq!(existing.len(), 1);

        let result = wait_for_download(&dir, &existing, Duration::from_secs(2)).await;
        assert!(matches!(result, Err(ScraperError::Timeout(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_download_picks_renamed_duplicate() {
        let dir = temp_dir("duplicate");
        std::fs::create_dir_all(&dir).unwrap();
        let name = file_name_today();
        std::fs::write(dir.join(&name), "Title\nOLD").unwrap();
        let existing = article_csv_files(&dir);

        let renamed = dir.join(name.replace(".csv", " (1).csv"));
        std::fs::write(&renamed, "Title\nNEW").unwrap();

        let found = wait_for_download(&dir, &existing, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(found, renamed);
        assert_eq!(std::fs::read_to_string(&found).unwrap(), "Title\nNEW");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_download_times_out() {
        let dir = temp_dir("missing");

        let result = wait_for_download(&dir, &HashSet::new(), Duration::from_secs(2)).await;
        assert!(matches!(result, Err(ScraperError::Timeout(_))));
    }

    #[test]
    fn test_save_csv_writes_file() {
        let dir = temp_dir("save");
        let path = dir.join("nested").join("articles.csv");

        save_csv(&path, "Title,Description\nA,B").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Title,Description\nA,B");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
