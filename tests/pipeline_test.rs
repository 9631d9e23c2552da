//! 判定パイプライン・セッションのテスト
//!
//! 判定APIと照合先は台本どおりに振る舞う偽物に差し替える

use autolens::classifier::{Classifier, ImagePayload};
use autolens::pipeline::{Pipeline, Timeouts};
use autolens::resolver::MetadataSource;
use autolens::session::{Session, SubmissionOutcome};
use autolens_common::{
    CanonicalKey, ClassifierResponse, Error, MetadataRecord, Prediction, RecordOrigin, Specs,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// 判定中で止めておくための合図
#[derive(Default)]
struct Gate {
    started: Notify,
    release: Notify,
}

#[derive(Clone)]
enum Reply {
    Label(&'static str, f64),
    Unavailable,
    Malformed,
}

#[derive(Clone)]
struct Script {
    reply: Reply,
    gate: Option<Arc<Gate>>,
    delay: Option<Duration>,
}

impl Script {
    fn label(label: &'static str, confidence: f64) -> Self {
        Self { reply: Reply::Label(label, confidence), gate: None, delay: None }
    }

    fn gated(mut self, gate: &Arc<Gate>) -> Self {
        self.gate = Some(Arc::clone(gate));
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// ファイル名ごとに台本を持つ判定器
#[derive(Default)]
struct FakeClassifier {
    scripts: HashMap<String, Script>,
}

impl FakeClassifier {
    fn with(mut self, file_name: &str, script: Script) -> Self {
        self.scripts.insert(file_name.to_string(), script);
        self
    }
}

impl Classifier for FakeClassifier {
    async fn classify(&self, image: &ImagePayload) -> autolens_common::Result<ClassifierResponse> {
        let script = self
            .scripts
            .get(&image.file_name)
            .cloned()
            .ok_or_else(|| Error::ClassifierUnavailable(format!("no script for {}", image.file_name)))?;

        if let Some(gate) = &script.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }

        match script.reply {
            Reply::Label(label, confidence) => Ok(ClassifierResponse {
                car_name: label.to_string(),
                confidence,
                top_predictions: vec![Prediction { name: label.to_string(), confidence }],
                attention_map: None,
            }),
            Reply::Unavailable => Err(Error::ClassifierUnavailable("HTTP 503".into())),
            Reply::Malformed => Err(Error::MalformedClassifierResponse("missing carName".into())),
        }
    }
}

/// 正規化キー → レコードの表（遅延を指定できる）
#[derive(Default)]
struct FakeSource {
    records: HashMap<String, MetadataRecord>,
    delay: Option<Duration>,
}

impl MetadataSource for FakeSource {
    async fn lookup(&self, key: &CanonicalKey) -> autolens_common::Result<Option<MetadataRecord>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.records.get(key.as_str()).cloned())
    }
}

fn bmw_source() -> FakeSource {
    let mut records = HashMap::new();
    records.insert(
        "BMW M3 Coupe 2012".to_string(),
        MetadataRecord {
            year: "2012".into(),
            make: "BMW".into(),
            model: "M3".into(),
            body_type: "Coupe".into(),
            specs: Specs {
                horsepower: "414 HP".into(),
                acceleration: "4.1s".into(),
                fuel_type: "Gasoline".into(),
                origin: "Germany".into(),
            },
        },
    );
    FakeSource { records, delay: None }
}

fn timeouts() -> Timeouts {
    Timeouts {
        classifier: Duration::from_secs(2),
        resolver: Duration::from_secs(2),
    }
}

fn payload(file_name: &str) -> ImagePayload {
    ImagePayload::new(file_name, PNG_SIGNATURE.to_vec()).expect("PNG payload")
}

#[tokio::test]
async fn test_identify_with_database_record() {
    let classifier = FakeClassifier::default().with("m3.png", Script::label("BMW_M3_Coupe_2012", 93.0));
    let pipeline = Pipeline::new(classifier, bmw_source(), timeouts());

    let result = pipeline.identify(&payload("m3.png")).await.unwrap();
    assert_eq!(result.record_origin, RecordOrigin::Database);
    assert_eq!(result.headline(), "2012 BMW");
    assert_eq!(result.model, "M3");
    assert_eq!(result.specs.horsepower, "414 HP");
    assert_eq!(result.confidence, 93.0);
}

#[tokio::test]
async fn test_identify_falls_back_to_label() {
    let classifier = FakeClassifier::default().with("rl.png", Script::label("Acura_RL_Sedan_2012", 61.0));
    let pipeline = Pipeline::new(classifier, bmw_source(), timeouts());

    let result = pipeline.identify(&payload("rl.png")).await.unwrap();
    assert_eq!(result.record_origin, RecordOrigin::Fallback);
    assert_eq!(result.year, "2012");
    assert_eq!(result.make, "Acura");
    assert_eq!(result.model, "RL Sedan");
    assert_eq!(result.body_type, "Car");
    assert!(result.specs.is_unknown());
}

#[tokio::test]
async fn test_resolver_timeout_is_an_error() {
    let classifier = FakeClassifier::default().with("m3.png", Script::label("BMW_M3_Coupe_2012", 93.0));
    let source = FakeSource { delay: Some(Duration::from_secs(5)), ..bmw_source() };
    let timeouts = Timeouts { resolver: Duration::from_millis(50), ..timeouts() };
    let pipeline = Pipeline::new(classifier, source, timeouts);

    // 部分的な結果は返さない
    let err = pipeline.identify(&payload("m3.png")).await.unwrap_err();
    assert!(matches!(err, Error::ResolverUnavailable(_)));
}

#[tokio::test]
async fn test_classifier_timeout_is_unavailable() {
    let classifier = FakeClassifier::default().with(
        "slow.png",
        Script::label("BMW_M3_Coupe_2012", 93.0).delayed(Duration::from_secs(5)),
    );
    let timeouts = Timeouts { classifier: Duration::from_millis(50), ..timeouts() };
    let pipeline = Pipeline::new(classifier, bmw_source(), timeouts);

    let err = pipeline.identify(&payload("slow.png")).await.unwrap_err();
    assert!(matches!(err, Error::ClassifierUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_classifier_failures_reach_caller() {
    let classifier = FakeClassifier::default()
        .with("bad.png", Script { reply: Reply::Malformed, gate: None, delay: None })
        .with("down.png", Script { reply: Reply::Unavailable, gate: None, delay: None });
    let session = Session::new(Arc::new(Pipeline::new(classifier, bmw_source(), timeouts())));

    let err = session.submit(payload("bad.png")).await.unwrap_err();
    assert!(matches!(err, Error::MalformedClassifierResponse(_)));

    let err = session.submit(payload("down.png")).await.unwrap_err();
    assert!(matches!(err, Error::ClassifierUnavailable(_)));
    assert!(session.current().is_none());
}

#[tokio::test]
async fn test_last_submission_wins() {
    let gate = Arc::new(Gate::default());
    let classifier = FakeClassifier::default()
        .with("a.png", Script::label("Acura_RL_Sedan_2012", 70.0).gated(&gate))
        .with("b.png", Script::label("BMW_M3_Coupe_2012", 95.0));
    let session = Arc::new(Session::new(Arc::new(Pipeline::new(
        classifier,
        bmw_source(),
        timeouts(),
    ))));

    // 表示された結果をすべて記録する
    let mut rx = session.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            if let Some(presented) = &rx.borrow_and_update().presented {
                seen.push(presented.result.car_name.clone());
            }
        }
        seen
    });

    let first = Arc::clone(&session);
    let a = tokio::spawn(async move { first.submit(payload("a.png")).await });
    gate.started.notified().await;

    // Aの判定中にBを投稿し、Bが先に完了する
    let b = session.submit(payload("b.png")).await.unwrap();
    assert_eq!(b.result().map(|r| r.car_name.as_str()), Some("BMW_M3_Coupe_2012"));

    gate.release.notify_one();
    let a = a.await.unwrap().unwrap();
    assert!(matches!(a, SubmissionOutcome::Superseded { seq: 1 }));

    let current = session.current().expect("B stays presented");
    assert_eq!(current.car_name, "BMW_M3_Coupe_2012");
    assert_eq!(session.latest_seq(), 2);

    drop(session);
    let seen = observer.await.unwrap();
    assert!(seen.iter().all(|name| name == "BMW_M3_Coupe_2012"));
    assert!(!seen.is_empty());
}

#[tokio::test]
async fn test_reset_discards_in_flight_submission() {
    let gate = Arc::new(Gate::default());
    let classifier = FakeClassifier::default()
        .with("a.png", Script::label("BMW_M3_Coupe_2012", 95.0).gated(&gate));
    let session = Arc::new(Session::new(Arc::new(Pipeline::new(
        classifier,
        bmw_source(),
        timeouts(),
    ))));

    let first = Arc::clone(&session);
    let a = tokio::spawn(async move { first.submit(payload("a.png")).await });
    gate.started.notified().await;

    session.reset();
    gate.release.notify_one();

    let a = a.await.unwrap().unwrap();
    assert!(a.result().is_none());
    assert!(session.current().is_none());
}

#[tokio::test]
async fn test_stale_failure_is_discarded() {
    let gate = Arc::new(Gate::default());
    let classifier = FakeClassifier::default()
        .with("a.png", Script { reply: Reply::Unavailable, gate: Some(Arc::clone(&gate)), delay: None })
        .with("b.png", Script::label("BMW_M3_Coupe_2012", 95.0));
    let session = Arc::new(Session::new(Arc::new(Pipeline::new(
        classifier,
        bmw_source(),
        timeouts(),
    ))));

    let first = Arc::clone(&session);
    let a = tokio::spawn(async move { first.submit(payload("a.png")).await });
    gate.started.notified().await;

    let b = session.submit(payload("b.png")).await.unwrap();
    assert!(b.result().is_some());

    gate.release.notify_one();

    // 古い投稿の失敗はエラーとして返らない
    let a = a.await.unwrap().unwrap();
    assert!(matches!(a, SubmissionOutcome::Superseded { .. }));
    assert_eq!(
        session.current().map(|r| r.car_name.clone()),
        Some("BMW_M3_Coupe_2012".to_string())
    );
}

#[tokio::test]
async fn test_new_submission_clears_presented_result() {
    let gate = Arc::new(Gate::default());
    let classifier = FakeClassifier::default()
        .with("a.png", Script::label("BMW_M3_Coupe_2012", 95.0))
        .with("b.png", Script::label("Acura_RL_Sedan_2012", 55.0).gated(&gate));
    let session = Arc::new(Session::new(Arc::new(Pipeline::new(
        classifier,
        bmw_source(),
        timeouts(),
    ))));

    session.submit(payload("a.png")).await.unwrap();
    assert!(session.current().is_some());

    let second = Arc::clone(&session);
    let b = tokio::spawn(async move { second.submit(payload("b.png")).await });
    gate.started.notified().await;

    // 判定中は前の結果を表示しない
    assert!(session.current().is_none());

    gate.release.notify_one();
    let b = b.await.unwrap().unwrap();
    assert_eq!(b.result().map(|r| r.record_origin), Some(RecordOrigin::Fallback));
}
