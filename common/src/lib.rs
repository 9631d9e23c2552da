//! AutoLens Common Library
//!
//! 判定結果解決パイプラインの純粋なロジック:
//! 正規化キー → メタデータ照合結果 → フォールバック解析 → 判定結果の組み立て、
//! および表示用の確信度ティア。

pub mod types;
pub mod attention;
pub mod key;
pub mod fallback;
pub mod confidence;
pub mod assembler;
pub mod parser;
pub mod catalog;
pub mod seed;
pub mod error;

pub use types::{ClassifierResponse, IdentificationResult, MetadataRecord, Prediction, RecordOrigin, Specs};
pub use attention::{AttentionMapRef, DecodedImage};
pub use key::{normalize, CanonicalKey, IntoCanonicalKey};
pub use fallback::{parse_fallback, DerivedRecord};
pub use confidence::{classify, ConfidenceTier, StatusIcon, TierDisplay};
pub use assembler::{assemble, ResolverOutcome};
pub use parser::{parse_classifier_response, parse_error_message};
pub use catalog::{Catalog, CatalogEntry, CatalogFile, ImageTable};
pub use seed::{build_catalog, parse_car_name, SpecRow};
pub use error::{Error, Result};
