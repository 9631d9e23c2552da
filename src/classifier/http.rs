use super::{Classifier, ImagePayload};
use crate::error::{AutolensError, Result};
use autolens_common::{parse_classifier_response, parse_error_message, ClassifierResponse, Error};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

const USER_AGENT: &str = concat!("autolens/", env!("CARGO_PKG_VERSION"));

/// HTTP判定API（`POST {base}/predict`, multipart `file`）
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AutolensError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;

        Ok(Self {
            client,
            endpoint: predict_url(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn predict_url(base_url: &str) -> String {
    format!("{}/predict", base_url.trim().trim_end_matches('/'))
}

impl Classifier for HttpClassifier {
    async fn classify(&self, image: &ImagePayload) -> autolens_common::Result<ClassifierResponse> {
        debug!(
            endpoint = %self.endpoint,
            file = %image.file_name,
            bytes = image.bytes.len(),
            "Sending image to classifier"
        );

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| Error::ClassifierUnavailable(format!("multipart構築エラー: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::ClassifierUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::ClassifierUnavailable(format!("response read failed: {}", e)))?;

        if !status.is_success() {
            let message = parse_error_message(&body).unwrap_or(body);
            return Err(Error::ClassifierUnavailable(format!("HTTP {}: {}", status, message)));
        }

        // 2xx でもエラー本文なら判定失敗
        if let Some(message) = parse_error_message(&body) {
            return Err(Error::ClassifierUnavailable(message));
        }

        let parsed = parse_classifier_response(&body)?;
        debug!(
            label = %parsed.car_name,
            confidence = parsed.confidence,
            alternatives = parsed.top_predictions.len(),
            "Classifier response received"
        );
        Ok(parsed)
    }
}
