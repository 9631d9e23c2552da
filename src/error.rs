use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutolensError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("判定APIのURLが設定されていません。`autolens config --set-classifier-url URL` で設定してください")]
    MissingEndpoint,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] autolens_common::Error),
}

impl AutolensError {
    /// 判定・照合の一時的な失敗（再試行で回復し得る）か
    pub fn is_retryable(&self) -> bool {
        match self {
            AutolensError::Common(e) => e.is_retryable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AutolensError>;
