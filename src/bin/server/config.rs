//! Configuration types for the analysis server.

use doc_lens::core::AnalysisConfig;

/// Configuration for the HTTP server
#[derive(Clone)]
pub struct ServerConfig {
    pub analysis: AnalysisConfig,
    pub host: String,
    pub port: u16,
}
