//! 判定セッション
//!
//! 1セッションで表示される結果は常に最後の投稿のもの。
//! 投稿ごとに単調増加の番号を振り、古い投稿の結果（失敗も含む）は捨てる。
//! 「最新か」の確認と結果の公開は watch チャネルのロック内で同時に行う。

use crate::classifier::{Classifier, ImagePayload};
use crate::pipeline::Pipeline;
use crate::resolver::MetadataSource;
use autolens_common::IdentificationResult;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// 表示中の結果
#[derive(Debug, Clone)]
pub struct Presented {
    pub seq: u64,
    pub result: Arc<IdentificationResult>,
}

/// セッションの状態
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// 最後に受け付けた投稿番号
    pub latest: u64,
    pub presented: Option<Presented>,
}

/// 投稿1件の行き先
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// 最新の投稿として表示された
    Presented(Arc<IdentificationResult>),
    /// 後の投稿かリセットに追い越され、破棄された
    Superseded { seq: u64 },
}

impl SubmissionOutcome {
    pub fn result(&self) -> Option<&Arc<IdentificationResult>> {
        match self {
            SubmissionOutcome::Presented(result) => Some(result),
            SubmissionOutcome::Superseded { .. } => None,
        }
    }
}

pub struct Session<C, S> {
    pipeline: Arc<Pipeline<C, S>>,
    state: watch::Sender<SessionState>,
}

impl<C: Classifier, S: MetadataSource> Session<C, S> {
    pub fn new(pipeline: Arc<Pipeline<C, S>>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { pipeline, state }
    }

    /// 状態の購読（表示層用）
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// 表示中の結果
    pub fn current(&self) -> Option<Arc<IdentificationResult>> {
        self.state
            .borrow()
            .presented
            .as_ref()
            .map(|p| Arc::clone(&p.result))
    }

    pub fn latest_seq(&self) -> u64 {
        self.state.borrow().latest
    }

    /// 画像を投稿して判定する
    ///
    /// 判定中に新しい投稿かリセットがあれば、この投稿の結果は
    /// 成功でも失敗でも `Superseded` として捨てる。
    pub async fn submit(
        &self,
        image: ImagePayload,
    ) -> autolens_common::Result<SubmissionOutcome> {
        let seq = self.begin();
        info!(seq, file = %image.file_name, "Submission started");

        let outcome = self.pipeline.identify(&image).await;

        let result = match outcome {
            Ok(result) => Arc::new(result),
            Err(e) => {
                if self.latest_seq() != seq {
                    debug!(seq, error = %e, "Discarding stale failure");
                    return Ok(SubmissionOutcome::Superseded { seq });
                }
                return Err(e);
            }
        };

        let published = self.state.send_if_modified(|state| {
            if state.latest != seq {
                return false;
            }
            state.presented = Some(Presented {
                seq,
                result: Arc::clone(&result),
            });
            true
        });

        if published {
            Ok(SubmissionOutcome::Presented(result))
        } else {
            debug!(seq, "Discarding stale result");
            Ok(SubmissionOutcome::Superseded { seq })
        }
    }

    /// 表示中の結果を消し、判定中の投稿を無効にする
    pub fn reset(&self) {
        let seq = self.begin();
        debug!(seq, "Session reset");
    }

    /// 新しい投稿番号を払い出し、表示中の結果を破棄する
    fn begin(&self) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|state| {
            state.latest += 1;
            state.presented = None;
            seq = state.latest;
        });
        seq
    }
}
