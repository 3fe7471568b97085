use std::time::Duration;

/// デフォルトの対象ブログ
pub const DEFAULT_START_URL: &str = "https://www.therapixel.fr/blog/";
pub const DEFAULT_CATEGORY: &str = "medical";

/// 記事抽出に使うセレクタ群
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSelectors {
    pub title: String,
    pub description: String,
    pub date: String,
    /// 記事画像のリンク（現状の抽出では未使用、タイトルのhrefを優先）
    pub link: String,
    pub next_page: String,
    /// 記事ごとのコンテナ要素。指定時はコンテナ単位で各フィールドを取得する
    pub container: Option<String>,
}

impl Default for ArticleSelectors {
    fn default() -> Self {
        Self {
            title: "h3 > a".to_string(),
            description: ".entry-content > p".to_string(),
            date: ".entry-date".to_string(),
            link: ".entry-image > a".to_string(),
            next_page: ".pagination .page-next".to_string(),
            container: None,
        }
    }
}

/// 「次へ」クリック後の遷移判定の待機時間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    /// URL変化を待つ時間
    pub url_change_timeout: Duration,
    /// URLが変わらなかった場合に先頭タイトルの変化を待つ時間
    pub content_change_timeout: Duration,
    /// 条件のポーリング間隔
    pub poll_interval: Duration,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            url_change_timeout: Duration::from_millis(2000),
            content_change_timeout: Duration::from_millis(3000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// ページ遷移成功後、次の抽出前に行う待機
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePolicy {
    /// 待機しない
    None,
    /// 固定時間スリープ
    Fixed(Duration),
    /// DOMの長さが連続 `required_checks` 回変化しなくなるまで待機（タイムアウトしても続行）
    StableDom {
        timeout: Duration,
        interval: Duration,
        required_checks: u32,
    },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        SettlePolicy::StableDom {
            timeout: Duration::from_secs(5),
            interval: Duration::from_millis(300),
            required_checks: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub start_url: String,
    pub selectors: ArticleSelectors,
    pub category: String,
    pub headless: bool,
    /// 失敗時にスクリーンショットをログ出力する
    pub debug: bool,
    /// タイトルセレクタの出現待ち上限
    pub selector_timeout: Duration,
    pub pagination: PaginationPolicy,
    pub settle: SettlePolicy,
    /// 取得ページ数の上限（None なら最終ページまで）
    pub max_pages: Option<u32>,
    /// 実行全体の上限時間
    pub run_timeout: Option<Duration>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            selectors: ArticleSelectors::default(),
            category: DEFAULT_CATEGORY.to_string(),
            headless: true,
            debug: false,
            selector_timeout: Duration::from_secs(10),
            pagination: PaginationPolicy::default(),
            settle: SettlePolicy::default(),
            max_pages: None,
            run_timeout: None,
        }
    }
}

impl ScrapeConfig {
    pub fn new(start_url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_selectors(mut self, selectors: ArticleSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_selector_timeout(mut self, timeout: Duration) -> Self {
        self.selector_timeout = timeout;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationPolicy) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_settle(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }
}
