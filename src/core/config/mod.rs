//! Configuration for the remote document analysis service.

use std::time::Duration;

/// Connection and polling settings for the analysis service.
///
/// Constructed once at process start and injected into
/// [`DocumentAnalysisClient`](crate::client::DocumentAnalysisClient);
/// there is no process-wide client state.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Base URL of the analysis service, e.g.
    /// `https://<resource>.cognitiveservices.azure.com`. A trailing slash
    /// is tolerated.
    pub endpoint: String,
    /// Subscription key sent with every request.
    pub api_key: String,
    /// Locale hint forwarded to the service.
    pub locale: String,
    /// Timeout applied to each individual HTTP request.
    pub timeout: Duration,
    /// Delay between operation status checks.
    pub poll_interval: Duration,
    /// Maximum number of status checks before giving up.
    pub max_polls: usize,
}

impl AnalysisConfig {
    /// Creates a configuration with default locale and polling settings.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            locale: "en-US".to_string(),
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
        }
    }

    /// Sets the locale hint forwarded to the service.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets the per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the delay between operation status checks.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the maximum number of status checks before giving up.
    pub fn with_max_polls(mut self, max_polls: usize) -> Self {
        self.max_polls = max_polls;
        self
    }
}
