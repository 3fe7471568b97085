//! ブログ一覧スクレイパー CLI
//!
//! 実行方法:
//! ```text
//! cargo run -- --max-pages 3 --preview 10
//! ```
//!
//! デフォルトではCSVをディスクに書き込まない（`--output` 指定時のみ保存）。

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use blog_scraper::config::{DEFAULT_CATEGORY, DEFAULT_START_URL};
use blog_scraper::export::{self, DEFAULT_PREVIEW_LINES};
use blog_scraper::{
    ArticleSelectors, BlogScraper, LogProgress, ScrapeConfig, ScrapeResult, Scraper, ScraperError,
    SettlePolicy,
};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// ブログ一覧の開始URL
    #[arg(long, env = "BLOG_SCRAPER_URL", default_value = DEFAULT_START_URL)]
    url: String,

    /// 記事に付けるカテゴリ
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    category: String,

    /// 記事ごとのコンテナセレクタ（指定するとコンテナ単位で抽出）
    #[arg(long)]
    container: Option<String>,

    /// 取得する最大ページ数
    #[arg(long)]
    max_pages: Option<u32>,

    /// ページ遷移後の固定待機（秒）。未指定ならDOMの安定を待つ
    #[arg(long)]
    delay_secs: Option<u64>,

    /// 実行全体のタイムアウト（秒）
    #[arg(long)]
    run_timeout_secs: Option<u64>,

    /// ブラウザを表示する
    #[arg(long)]
    headed: bool,

    /// 失敗時にスクリーンショットをログ出力
    #[arg(long)]
    debug: bool,

    /// CSVプレビューの行数（0で非表示）
    #[arg(long, default_value_t = DEFAULT_PREVIEW_LINES)]
    preview: usize,

    /// CSVの保存先
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// レポート形式（numero,titre,lien,extrait,page_trouvee）で出力
    #[arg(long)]
    report: bool,

    /// 記事をJSONで標準出力に表示
    #[arg(long)]
    json: bool,

    /// ブラウザ経由でCSVをダウンロードするディレクトリ
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

impl Cli {
    fn to_config(&self) -> ScrapeConfig {
        let selectors = ArticleSelectors {
            container: self.container.clone(),
            ..Default::default()
        };

        let mut config = ScrapeConfig::new(&self.url, &self.category)
            .with_selectors(selectors)
            .with_headless(!self.headed)
            .with_debug(self.debug);

        if let Some(max_pages) = self.max_pages {
            config = config.with_max_pages(max_pages);
        }
        if let Some(secs) = self.delay_secs {
            config = config.with_settle(SettlePolicy::Fixed(Duration::from_secs(secs)));
        }
        if let Some(secs) = self.run_timeout_secs {
            config = config.with_run_timeout(Duration::from_secs(secs));
        }
        config
    }

    fn export_text(&self, result: &ScrapeResult) -> String {
        if self.report {
            export::to_report_csv(&result.report_entries())
        } else {
            result.csv_data.clone()
        }
    }
}

/// initialize → scrape →（任意で）ダウンロード
async fn run(scraper: &mut BlogScraper, cli: &Cli) -> Result<ScrapeResult, ScraperError> {
    scraper.initialize().await?;
    let result = scraper.scrape(&LogProgress).await?;

    if let (Some(dir), Some(page)) = (&cli.download_dir, scraper.page()) {
        export::download(page, &cli.export_text(&result), dir, result.total_articles()).await;
    }

    Ok(result)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut scraper = BlogScraper::new(cli.to_config());

    let outcome = run(&mut scraper, &cli).await;

    // ブラウザはどの経路でも閉じる
    if let Err(e) = scraper.close().await {
        warn!("Failed to close browser: {}", e);
    }

    let result = outcome?;

    println!("Scraping finished!");
    println!("Articles: {}", result.total_articles());
    println!("Pages: {}", result.total_pages);
    if result.stop_reason.is_failure() {
        println!("Stopped early: {:?}", result.stop_reason);
    }

    let text = cli.export_text(&result);

    if cli.preview > 0 {
        println!();
        println!("{}", export::preview(&text, cli.preview));
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result.articles)?);
    }

    if let Some(path) = &cli.output {
        export::save_csv(path, &text)?;
        println!("CSV saved: {}", path.display());
    }

    Ok(())
}
