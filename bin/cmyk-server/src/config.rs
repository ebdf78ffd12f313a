//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

use cmyk_imaging::DEFAULT_PREVIEW_QUALITY;

/// Runtime configuration for cmyk-server.
///
/// Every field has a default so the server works out-of-the-box without any
/// environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8045"`).
    pub bind_address: String,

    /// Directory holding the original uploads (default: `"uploads"`).
    pub upload_dir: PathBuf,

    /// Directory holding the converted TIFFs (default: `"converted_images"`).
    /// Also served verbatim under `/view-images/`.
    pub output_dir: PathBuf,

    /// Base URL used for the links returned by the convert endpoint, e.g.
    /// `"https://cmyk.example.com"`. When unset the links are derived from
    /// the request's `Host` and `X-Forwarded-Proto` headers.
    pub public_url: Option<String>,

    /// JPEG quality of `/view/{id}` previews, `1..=100`.
    pub preview_quality: u8,

    /// Comma-separated CORS origin allow-list. Unset means any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("CMYK_BIND", "0.0.0.0:8045"),
            upload_dir: env_or("CMYK_UPLOAD_DIR", "uploads").into(),
            output_dir: env_or("CMYK_OUTPUT_DIR", "converted_images").into(),
            public_url: std::env::var("CMYK_PUBLIC_URL")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_owned())
                .filter(|v| !v.is_empty()),
            preview_quality: parse_env("CMYK_PREVIEW_QUALITY", DEFAULT_PREVIEW_QUALITY).clamp(1, 100),
            cors_allowed_origins: std::env::var("CMYK_CORS_ORIGINS").ok(),
            enable_docs: env_flag("CMYK_ENABLE_DOCS", true),
            log_level: env_or("CMYK_LOG", "info"),
            log_json: env_flag("CMYK_LOG_JSON", false),
        }
    }

    /// Configuration rooted at `dir`, used by tests.
    #[cfg(test)]
    pub fn for_dir(dir: &std::path::Path) -> Self {
        Self {
            bind_address: "127.0.0.1:0".into(),
            upload_dir: dir.join("uploads"),
            output_dir: dir.join("converted_images"),
            public_url: None,
            preview_quality: DEFAULT_PREVIEW_QUALITY,
            cors_allowed_origins: None,
            enable_docs: true,
            log_level: "debug".into(),
            log_json: false,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
