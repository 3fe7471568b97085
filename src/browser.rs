//! chromiumoxide によるブラウザ操作
//!
//! ページ上の読み取りはすべて JavaScript を評価して行い、
//! 構造化データは `JSON.stringify` した文字列で受け取ってパースする。

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::blog::types::{ControlState, RawAnchor, RawGroup};
use crate::config::{ArticleSelectors, ScrapeConfig};
use crate::error::ScraperError;
use crate::traits::PageDriver;

/// 文字列をJavaScriptの文字列リテラルに変換
pub fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// ブラウザを起動して空のページを開く
pub async fn launch(
    config: &ScrapeConfig,
) -> Result<(Browser, JoinHandle<()>, ChromiumPage), ScraperError> {
    info!("Initializing browser...");

    // ユニークなユーザーデータディレクトリを生成
    let unique_id = format!(
        "{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    let user_data_dir = std::env::temp_dir().join(format!("blog-scraper-{}", unique_id));

    let mut builder = BrowserConfig::builder().user_data_dir(&user_data_dir);

    // Chrome パスの指定があれば使う（なければ自動検出）
    if let Ok(chrome_path) = std::env::var("CHROME_PATH").or_else(|_| std::env::var("CHROMIUM_PATH")) {
        builder = builder.chrome_executable(chrome_path);
    }

    if !config.headless {
        builder = builder.with_head();
    }

    builder = builder
        .no_sandbox()
        .window_size(1280, 800)
        .request_timeout(Duration::from_secs(60))
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu");

    if config.debug {
        builder = builder.arg("--enable-logging=stderr").arg("--v=1");
    }

    let browser_config = builder
        .build()
        .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

    // ブラウザイベントハンドラをバックグラウンドで実行
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("Browser handler error: {:?}", e);
            }
        }
    });

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

    info!("Browser initialized");
    Ok((browser, handler_task, ChromiumPage::new(page)))
}

/// chromiumoxide のページ
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 式を評価して値を取り出す
    pub(crate) async fn eval<T: DeserializeOwned>(&self, script: &str) -> Result<T, ScraperError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    /// 戻り値を使わないスクリプトを実行（例外は `Err`）
    pub(crate) async fn run_script(&self, script: &str) -> Result<(), ScraperError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(())
    }

    /// `JSON.stringify` された結果を評価してパース
    async fn eval_json<T: DeserializeOwned>(&self, script: &str) -> Result<T, ScraperError> {
        let json: String = self.eval(script).await?;
        serde_json::from_str(&json).map_err(|e| ScraperError::Json(e.to_string()))
    }

    /// ダウンロード先ディレクトリを設定
    pub async fn set_download_dir(&self, dir: &Path) -> Result<(), ScraperError> {
        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(dir.to_string_lossy().to_string())
            .events_enabled(true)
            .build()
            .map_err(|e| ScraperError::Export(format!("ダウンロード設定エラー: {}", e)))?;

        self.page
            .execute(params)
            .await
            .map_err(|e| ScraperError::Export(format!("ダウンロード設定エラー: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScraperError> {
        self.eval("window.location.href").await
    }

    async fn count(&self, selector: &str) -> Result<usize, ScraperError> {
        self.eval(&format!(
            "document.querySelectorAll({}).length",
            js_string(selector)
        ))
        .await
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, ScraperError> {
        self.eval_json(&format!(
            "JSON.stringify(Array.from(document.querySelectorAll({}), el => el.textContent || ''))",
            js_string(selector)
        ))
        .await
    }

    async fn anchors(&self, selector: &str) -> Result<Vec<RawAnchor>, ScraperError> {
        self.eval_json(&format!(
            r#"
            JSON.stringify(Array.from(document.querySelectorAll({}), el => ({{
                text: el.textContent || '',
                href: el.getAttribute('href')
            }})))
            "#,
            js_string(selector)
        ))
        .await
    }

    async fn groups(
        &self,
        container: &str,
        selectors: &ArticleSelectors,
    ) -> Result<Vec<RawGroup>, ScraperError> {
        self.eval_json(&format!(
            r#"
            JSON.stringify(Array.from(document.querySelectorAll({container}), c => {{
                const title = c.querySelector({title});
                const description = c.querySelector({description});
                const date = c.querySelector({date});
                return {{
                    title: title ? {{ text: title.textContent || '', href: title.getAttribute('href') }} : null,
                    description: description ? description.textContent : null,
                    date: date ? date.textContent : null
                }};
            }}))
            "#,
            container = js_string(container),
            title = js_string(&selectors.title),
            description = js_string(&selectors.description),
            date = js_string(&selectors.date),
        ))
        .await
    }

    async fn control_state(&self, selector: &str) -> Result<Option<ControlState>, ScraperError> {
        self.eval_json(&format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return 'null';
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                const visible = style.display !== 'none' &&
                                style.visibility !== 'hidden' &&
                                style.opacity !== '0' &&
                                (rect.width > 0 || rect.height > 0);
                const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true';
                return JSON.stringify({{ visible, enabled }});
            }})()
            "#,
            js_string(selector)
        ))
        .await
    }

    async fn click(&self, selector: &str) -> Result<(), ScraperError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("{} クリック: {}", selector, e)))?;
        Ok(())
    }

    async fn first_text(&self, selector: &str) -> Result<Option<String>, ScraperError> {
        self.eval_json(&format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return JSON.stringify(el ? (el.textContent || '').trim() : null);
            }})()
            "#,
            js_string(selector)
        ))
        .await
    }

    async fn content_length(&self) -> Result<usize, ScraperError> {
        self.eval("document.documentElement.outerHTML.length").await
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        self.page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }
}
