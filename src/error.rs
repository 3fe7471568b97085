use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("JSONパースエラー: {0}")]
    Json(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("抽出エラー: {0}")]
    Extraction(String),

    #[error("エクスポートエラー: {0}")]
    Export(String),

    #[error("URLが不正です: {0}")]
    InvalidUrl(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}

impl From<url::ParseError> for ScraperError {
    fn from(e: url::ParseError) -> Self {
        ScraperError::InvalidUrl(e.to_string())
    }
}
