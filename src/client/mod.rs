//! HTTP client for the remote document analysis service.
//!
//! Analysis is a two-step protocol: POST the raw document bytes, then
//! poll the returned operation URL until the service reports success or
//! failure. The client performs no automatic retry of failed analyses;
//! a retry is a fresh upload, decided by the caller.

use std::fmt;
use std::str::FromStr;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;

use crate::core::config::AnalysisConfig;
use crate::core::errors::DocLensError;
use crate::domain::AnalysisResult;

/// Service API version the client speaks.
pub const API_VERSION: &str = "2024-11-30";

/// Header carrying the subscription key.
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// The closed set of analysis models the service supports.
///
/// An unrecognized selector fails at parse time, before any network
/// call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Generic layout extraction.
    Layout,
    /// Receipt-specific field extraction.
    Receipt,
    /// Credit-card-specific field extraction.
    CreditCard,
}

impl ModelKind {
    /// All supported models, in display order.
    pub const ALL: [ModelKind; 3] = [ModelKind::Layout, ModelKind::Receipt, ModelKind::CreditCard];

    /// The service-side model selector string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Layout => "prebuilt-layout",
            ModelKind::Receipt => "prebuilt-receipt",
            ModelKind::CreditCard => "prebuilt-creditCard",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = DocLensError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .iter()
            .copied()
            .find(|model| model.as_str() == selector)
            .ok_or_else(|| DocLensError::UnknownModel(selector.to_string()))
    }
}

/// Status document returned while an analysis operation is in flight.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalysisResult>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl OperationError {
    fn into_message(self) -> String {
        match (self.code, self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (_, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => "unspecified service error".to_string(),
        }
    }
}

/// Client for the document analysis service.
///
/// Constructed once at process start and shared by reference; holds no
/// per-upload state.
pub struct DocumentAnalysisClient {
    http: reqwest::Client,
    config: AnalysisConfig,
}

impl DocumentAnalysisClient {
    /// Creates a client from the given configuration.
    pub fn new(config: AnalysisConfig) -> Result<Self, DocLensError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DocLensError::service("failed to construct HTTP client", e))?;

        Ok(Self { http, config })
    }

    /// Submits raw document bytes for analysis and waits for the result.
    ///
    /// This is the pipeline's sole suspension point: the call blocks (in
    /// async terms, awaits) until the service finishes or the polling
    /// budget runs out.
    ///
    /// # Errors
    ///
    /// [`DocLensError::EmptyInput`] for empty uploads,
    /// [`DocLensError::Service`] for transport failures,
    /// [`DocLensError::Analysis`] when the service rejects or fails the
    /// document, and [`DocLensError::Timeout`] when the operation never
    /// settles.
    pub async fn analyze(
        &self,
        bytes: &[u8],
        model: ModelKind,
    ) -> Result<AnalysisResult, DocLensError> {
        if bytes.is_empty() {
            return Err(DocLensError::EmptyInput);
        }

        let operation_url = self.begin_analyze(bytes, model).await?;
        self.wait_for_result(&operation_url).await
    }

    /// POSTs the document and returns the operation URL to poll.
    async fn begin_analyze(
        &self,
        bytes: &[u8],
        model: ModelKind,
    ) -> Result<String, DocLensError> {
        let url = format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}&locale={}",
            self.config.endpoint.trim_end_matches('/'),
            model.as_str(),
            API_VERSION,
            self.config.locale,
        );
        debug!(model = %model, bytes = bytes.len(), "submitting document for analysis");

        let response = self
            .http
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| DocLensError::service("analysis request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DocLensError::Analysis {
                status: status.to_string(),
                message: if message.is_empty() {
                    "check the endpoint and API key".to_string()
                } else {
                    message
                },
            });
        }

        response
            .headers()
            .get("operation-location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| DocLensError::MalformedResponse {
                context: "response carried no Operation-Location header".to_string(),
            })
    }

    /// Polls the operation URL until the analysis settles.
    async fn wait_for_result(&self, operation_url: &str) -> Result<AnalysisResult, DocLensError> {
        for _ in 0..self.config.max_polls {
            tokio::time::sleep(self.config.poll_interval).await;

            let response = self
                .http
                .get(operation_url)
                .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
                .send()
                .await
                .map_err(|e| DocLensError::service("failed to poll analysis status", e))?;

            let operation: AnalyzeOperation = response
                .json()
                .await
                .map_err(|e| DocLensError::service("failed to parse analysis status", e))?;

            match operation.status.as_str() {
                "succeeded" => {
                    return operation
                        .analyze_result
                        .ok_or_else(|| DocLensError::MalformedResponse {
                            context: "succeeded operation carried no analyzeResult".to_string(),
                        })
                }
                "failed" => {
                    let message = operation
                        .error
                        .map(OperationError::into_message)
                        .unwrap_or_else(|| "unspecified service error".to_string());
                    return Err(DocLensError::Analysis {
                        status: "failed".to_string(),
                        message,
                    });
                }
                // notStarted / running
                other => debug!(status = other, "analysis still in progress"),
            }
        }

        Err(DocLensError::Timeout {
            polls: self.config.max_polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_selectors_round_trip() {
        for model in ModelKind::ALL {
            assert_eq!(model.as_str().parse::<ModelKind>().unwrap(), model);
        }
    }

    #[test]
    fn unknown_selector_fails_fast() {
        let err = "prebuilt-passport".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, DocLensError::UnknownModel(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn selector_parsing_is_case_sensitive() {
        assert!("Prebuilt-Receipt".parse::<ModelKind>().is_err());
        assert!("prebuilt-creditCard".parse::<ModelKind>().is_ok());
    }

    #[test]
    fn empty_upload_is_rejected_before_any_network_call() {
        let client =
            DocumentAnalysisClient::new(AnalysisConfig::new("https://example.com", "key")).unwrap();
        let err = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(client.analyze(&[], ModelKind::Receipt))
            .unwrap_err();
        assert!(matches!(err, DocLensError::EmptyInput));
    }

    #[test]
    fn operation_error_message_includes_code() {
        let error = OperationError {
            code: Some("InvalidRequest".to_string()),
            message: Some("content is not a document".to_string()),
        };
        assert_eq!(
            error.into_message(),
            "InvalidRequest: content is not a document"
        );
    }
}
