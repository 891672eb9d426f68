use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub token_cache: TokenCacheConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    /// Firebase project ID
    pub project_id: String,
    /// Path to the service-account JSON document
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    /// Gateway base URL (without the `/projects/...` suffix)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// OAuth2 scope requested in the assertion
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Per-request timeout for gateway and token calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// "fail_fast" (default) or "collect_all"
    #[serde(default = "default_batch_policy")]
    pub batch_policy: String,
    /// Upper bound on in-flight requests for collect_all batches
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenCacheConfig {
    /// When false every send fetches a fresh bearer token
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// "memory" (default) or "redis"
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
    /// Tenant the credential set belongs to; part of the cache key
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    /// Tokens this close to expiry are treated as expired
    #[serde(default = "default_refresh_skew")]
    pub refresh_skew_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_credentials_path() -> String {
    "firebase_credentials.json".to_string()
}

fn default_api_base_url() -> String {
    "https://fcm.googleapis.com/v1".to_string()
}

fn default_scope() -> String {
    "https://www.googleapis.com/auth/cloud-platform".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_batch_policy() -> String {
    "fail_fast".to_string()
}

fn default_max_concurrency() -> usize {
    16
}

fn default_true() -> bool {
    true
}

fn default_cache_backend() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_cache_prefix() -> String {
    "fcm_auth_token".to_string()
}

fn default_tenant_id() -> String {
    "default".to_string()
}

fn default_refresh_skew() -> u64 {
    60 // 1 minute
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "ara-fcm-push".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("firebase.api_base_url", default_api_base_url())?
            .set_default("firebase.credentials_path", default_credentials_path())?
            .set_default("delivery.batch_policy", default_batch_policy())?
            .set_default("token_cache.backend", default_cache_backend())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // FIREBASE__PROJECT_ID, DELIVERY__BATCH_POLICY, TOKEN_CACHE__BACKEND, etc.
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            // Flat variable names used by existing deployments
            .set_override_option("firebase.project_id", env::var("FIREBASE_PROJECT_ID").ok())?
            .set_override_option(
                "firebase.credentials_path",
                env::var("FIREBASE_CREDENTIALS_FILE_PATH")
                    .ok()
                    .filter(|path| !path.is_empty()),
            )?
            .set_override_option("otel.enabled", env::var("OTEL_ENABLED").ok())?
            .set_override_option("otel.endpoint", env::var("OTEL_ENDPOINT").ok())?
            .set_override_option("otel.service_name", env::var("OTEL_SERVICE_NAME").ok())?
            .set_override_option("otel.sampling_ratio", env::var("OTEL_SAMPLING_RATIO").ok())?;

        builder.build()?.try_deserialize()
    }
}

impl FirebaseConfig {
    /// Full URL of the `messages:send` endpoint for this project
    pub fn send_url(&self) -> String {
        format!(
            "{}/projects/{}/messages:send",
            self.api_base_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_policy: default_batch_policy(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: default_cache_backend(),
            redis_url: default_redis_url(),
            prefix: default_cache_prefix(),
            tenant_id: default_tenant_id(),
            refresh_skew_seconds: default_refresh_skew(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
