use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autolens")]
#[command(about = "車種判定・諸元照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真（1枚またはフォルダ）の車種を判定
    Identify {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// 判定結果をJSONで保存
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キャッシュを使用（再判定をスキップ）
        #[arg(long)]
        use_cache: bool,

        /// ヒートマップ画像の保存先フォルダ
        #[arg(long)]
        save_heatmap: Option<PathBuf>,
    },

    /// 判定ラベルから諸元を照合（判定APIは使わない）
    Lookup {
        /// 判定ラベル（例: BMW_M3_Coupe_2012）
        #[arg(required = true)]
        label: String,
    },

    /// 静的カタログを検索
    Catalog {
        /// 検索語（名前・メーカー・年式）
        #[arg(short, long, default_value = "")]
        query: String,

        /// 生産国で絞り込み（All で全件）
        #[arg(short, long, default_value = "All")]
        region: String,
    },

    /// 諸元表からカタログを生成
    Seed {
        /// 諸元表（行オブジェクトのJSON配列）
        #[arg(required = true)]
        input: PathBuf,

        /// 画像テーブルJSON（キー → 画像パス）
        #[arg(long)]
        images: Option<PathBuf>,

        /// 出力カタログJSON
        #[arg(short, long, default_value = "catalog.json")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 判定APIのURLを設定
        #[arg(long)]
        set_classifier_url: Option<String>,

        /// メタデータストアのURLを設定
        #[arg(long)]
        set_metadata_url: Option<String>,

        /// 静的カタログJSONのパスを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
