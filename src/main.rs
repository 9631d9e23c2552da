use anyhow::{Context, Result};
use autolens::cache::{self, CacheFile};
use autolens::classifier::{HttpClassifier, ImagePayload};
use autolens::pipeline::{Pipeline, Timeouts};
use autolens::resolver::{HttpMetadataStore, MetadataBackend, Resolver, StaticCatalogSource};
use autolens::session::{Session, SubmissionOutcome};
use autolens::report::{self, ReportEntry};
use autolens::{cli, config, error, scanner};
use autolens_common::{build_catalog, Catalog, IdentificationResult, ImageTable, SpecRow};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Identify { path, output, use_cache, save_heatmap } => {
            println!("🚗 autolens - 車種判定\n");
            identify(&config, &path, output.as_deref(), use_cache, save_heatmap.as_deref()).await?;
        }

        Commands::Lookup { label } => {
            let catalog = load_catalog(&config)?;
            let resolver = Resolver::new(build_backend(&config, &catalog)?, config.resolver_timeout());
            let (key, record, origin) = resolver.resolve_label(&label).await?;

            println!("キー: {}", key);
            println!("  {} {} {}", record.year, record.make, record.model);
            println!("  ボディ: {}", record.body_type);
            println!(
                "  馬力: {} / 0-60mph: {} / 燃料: {} / 生産国: {}",
                record.specs.horsepower,
                record.specs.acceleration,
                record.specs.fuel_type,
                record.specs.origin
            );
            println!("  出典: {:?}", origin);
        }

        Commands::Catalog { query, region } => {
            let catalog = load_catalog(&config)?;
            if catalog.is_empty() {
                println!("カタログが空です。`autolens config --set-catalog PATH` で設定してください");
                return Ok(());
            }

            let hits = catalog.search(&query, &region);
            println!("地域: {}", catalog.regions().join(", "));
            println!("{}件 / {}件\n", hits.len(), catalog.len());
            for entry in hits {
                println!(
                    "  {} {} {} [{}] ({})",
                    entry.year,
                    entry.make,
                    entry.model,
                    entry.body_type,
                    entry.region()
                );
            }
        }

        Commands::Seed { input, images, output } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("諸元表を読めません: {}", input.display()))?;
            let rows: Vec<SpecRow> = serde_json::from_str(&content)
                .with_context(|| format!("諸元表の形式が不正: {}", input.display()))?;

            let table = match images {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("画像テーブルを読めません: {}", path.display()))?;
                    let map: HashMap<String, String> = serde_json::from_str(&content)?;
                    ImageTable::new(map)
                }
                None => ImageTable::default(),
            };

            let catalog = build_catalog(&rows, table);
            let json = serde_json::to_string_pretty(&catalog.to_file())?;
            std::fs::write(&output, json)?;
            println!("✔ {}件のカタログを保存: {}", catalog.len(), output.display());
        }

        Commands::Config { show, set_classifier_url, set_metadata_url, set_catalog } => {
            let mut config = config;

            if let Some(url) = set_classifier_url {
                config.set_classifier_url(url)?;
                println!("✔ 判定APIのURLを設定しました");
            }
            if let Some(url) = set_metadata_url {
                config.set_metadata_url(url)?;
                println!("✔ メタデータストアのURLを設定しました");
            }
            if let Some(path) = set_catalog {
                config.set_catalog_path(path)?;
                println!("✔ カタログのパスを設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  判定API: {}",
                    config.classifier_url().unwrap_or_else(|_| "未設定".into())
                );
                println!(
                    "  メタデータストア: {}",
                    config.metadata_url().unwrap_or_else(|| "未設定（静的カタログ）".into())
                );
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  判定タイムアウト: {}秒", config.classifier_timeout().as_secs());
                println!("  照合タイムアウト: {}秒", config.resolver_timeout().as_secs());
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = CacheFile::cache_path(&target);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "autolens=debug,autolens_common=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 静的カタログ（未設定なら空）
fn load_catalog(config: &Config) -> Result<Arc<Catalog>> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("カタログを読めません: {}", path.display()))?,
        None => Catalog::default(),
    };
    Ok(Arc::new(catalog))
}

/// メタデータストアが設定されていればHTTP、なければ静的カタログ
fn build_backend(config: &Config, catalog: &Arc<Catalog>) -> error::Result<MetadataBackend> {
    match config.metadata_url() {
        Some(url) => Ok(MetadataBackend::Http(HttpMetadataStore::new(&url)?)),
        None => Ok(MetadataBackend::Catalog(StaticCatalogSource::new(Arc::clone(catalog)))),
    }
}

async fn identify(
    config: &Config,
    path: &Path,
    output: Option<&Path>,
    use_cache: bool,
    save_heatmap: Option<&Path>,
) -> Result<()> {
    // 1. 画像スキャン
    println!("[1/3] 画像をスキャン中...");
    let images = scanner::collect_images(path)?;
    if images.is_empty() {
        return Err(error::AutolensError::NoImagesFound(path.display().to_string()).into());
    }
    println!("✔ {}枚の画像を検出\n", images.len());

    let catalog = load_catalog(config)?;
    let classifier = HttpClassifier::new(&config.classifier_url()?)?;
    let backend = build_backend(config, &catalog)?;
    let pipeline = Arc::new(Pipeline::new(classifier, backend, Timeouts::from_config(config)));
    let session = Session::new(pipeline);

    let cache_dir = if path.is_file() {
        path.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        path.to_path_buf()
    };
    let mut cache_file = use_cache.then(|| CacheFile::load(&cache_dir));

    let (cached, pending) = match &cache_file {
        Some(cache_file) => cache::filter_cached_images(&images, cache_file),
        None => (
            Vec::new(),
            images.iter().map(|img| (img.clone(), String::new())).collect(),
        ),
    };

    // 2. 判定
    println!(
        "[2/3] 判定中...{}",
        if use_cache {
            format!(" (キャッシュ: {}件)", cached.len())
        } else {
            String::new()
        }
    );

    let mut identified: Vec<ReportEntry> = cached
        .into_iter()
        .map(|(img, result)| ReportEntry::new(img.file_name, result))
        .collect();
    let mut failures = 0usize;

    let progress = ProgressBar::new(pending.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for (img, hash) in pending {
        progress.set_message(img.file_name.clone());

        let outcome = match ImagePayload::from_path(&img.path) {
            Ok(payload) => session.submit(payload).await.map_err(error::AutolensError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(SubmissionOutcome::Presented(result)) => {
                let result = IdentificationResult::clone(&result);
                if let Some(cache_file) = cache_file.as_mut() {
                    if !hash.is_empty() {
                        let file_size = std::fs::metadata(&img.path).map(|m| m.len()).unwrap_or(0);
                        cache_file.insert(hash, img.file_name.clone(), file_size, result.clone());
                    }
                }
                identified.push(ReportEntry::new(img.file_name, result));
            }
            Ok(SubmissionOutcome::Superseded { seq }) => {
                tracing::debug!(seq, file = %img.file_name, "Superseded");
            }
            Err(e) => {
                failures += 1;
                let hint = match &e {
                    error::AutolensError::Common(inner) if inner.is_classifier_failure() => {
                        " (判定APIを確認してください)"
                    }
                    _ if e.is_retryable() => " (再試行可能)",
                    _ => "",
                };
                progress.println(format!("✗ {}: {}{}", img.file_name, e, hint));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();
    println!("✔ 判定完了 (成功: {}件, 失敗: {}件)\n", identified.len(), failures);

    // 3. 結果出力
    println!("[3/3] 結果を出力中...\n");
    for item in &identified {
        println!("📷 {}", item.file_name);
        println!("{}", report::render(&item.result, catalog.images()));
    }

    if let Some(dir) = save_heatmap {
        save_heatmaps(&identified, dir)?;
    }

    if let Some(cache_file) = &cache_file {
        cache_file.save(&cache_dir)?;
    }

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&identified)?;
        std::fs::write(output, json)?;
        println!("✔ 結果を保存: {}", output.display());
    }

    println!("\n✅ 完了");
    Ok(())
}

/// data URL のヒートマップを画像ファイルとして保存
fn save_heatmaps(identified: &[ReportEntry], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    for item in identified {
        let Some(map) = &item.result.attention_map else {
            continue;
        };
        let Some(decoded) = map.decode() else {
            // URL参照はそのまま（JSON出力に残る）
            continue;
        };

        let stem = Path::new(&item.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".into());
        let out = dir.join(format!("{}_heatmap.{}", stem, decoded.extension()));
        std::fs::write(&out, &decoded.bytes)
            .with_context(|| format!("ヒートマップを保存できません: {}", out.display()))?;
        println!("✔ ヒートマップを保存: {}", out.display());
    }

    Ok(())
}
