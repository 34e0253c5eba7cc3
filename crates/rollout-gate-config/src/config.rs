// crates/rollout-gate-config/src/config.rs
// ============================================================================
// Module: Rollout Gate Configuration
// Description: Configuration loading and validation for Rollout Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: rollout-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicit path (argument or environment variable) must exist; without one
//! the default file is read when present and built-in defaults apply
//! otherwise. Every loaded config is validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use rollout_gate_core::ComplianceRequirement;
use rollout_gate_core::DEFAULT_HEALTH_METHOD;
use rollout_gate_core::DEFAULT_HEALTH_PATH;
use rollout_gate_core::DEFAULT_REQUIRED_TAGS;
use rollout_gate_core::DEFAULT_TARGET_FUNCTION;
use rollout_gate_core::FunctionName;
use rollout_gate_core::HealthCheckRequest;
use rollout_gate_core::telemetry::DEFAULT_METRICS_NAMESPACE;
use rollout_gate_core::telemetry::DEFAULT_METRICS_SERVICE;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "rollout-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ROLLOUT_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of required tag keys.
pub(crate) const MAX_REQUIRED_TAGS: usize = 50;
/// Maximum length of a tag key.
pub(crate) const MAX_TAG_KEY_LENGTH: usize = 128;
/// Maximum length of a function name or ARN.
pub(crate) const MAX_FUNCTION_NAME_LENGTH: usize = 256;
/// Maximum length of the health-check path.
pub(crate) const MAX_HEALTH_PATH_LENGTH: usize = 2048;
/// Maximum length of a metric namespace or service label.
pub(crate) const MAX_METRIC_LABEL_LENGTH: usize = 255;
/// HTTP methods accepted for the synthetic health request.
pub(crate) const HEALTH_METHODS: &[&str] = &["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RolloutGateConfig {
    /// Tag compliance settings.
    #[serde(default)]
    pub compliance: ComplianceConfig,
    /// Pre-traffic gate settings.
    #[serde(default)]
    pub pre_traffic: PreTrafficConfig,
    /// Post-traffic gate settings.
    #[serde(default)]
    pub post_traffic: PostTrafficConfig,
    /// AWS client settings.
    #[serde(default)]
    pub aws: AwsConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Metric emission settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl RolloutGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Parses and validates configuration from raw TOML bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compliance.validate()?;
        self.pre_traffic.validate()?;
        self.aws.validate()?;
        self.audit.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Compliance
// ============================================================================

/// Tag compliance settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComplianceConfig {
    /// Tag keys every resource must carry.
    #[serde(default = "default_required_tags")]
    pub required_tags: Vec<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            required_tags: default_required_tags(),
        }
    }
}

impl ComplianceConfig {
    /// Returns the configured requirement.
    #[must_use]
    pub fn requirement(&self) -> ComplianceRequirement {
        ComplianceRequirement::new(self.required_tags.iter().map(String::as_str))
    }

    /// Validates compliance settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.required_tags.len() > MAX_REQUIRED_TAGS {
            return Err(ConfigError::Invalid("too many compliance.required_tags".to_string()));
        }
        let mut seen = BTreeSet::new();
        for key in &self.required_tags {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "compliance.required_tags entries must be non-empty".to_string(),
                ));
            }
            if key.len() > MAX_TAG_KEY_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "compliance.required_tags entry exceeds {MAX_TAG_KEY_LENGTH} bytes"
                )));
            }
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate compliance.required_tags entry: {key}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Pre-Traffic
// ============================================================================

/// Pre-traffic gate settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PreTrafficConfig {
    /// Target invoked when the trigger names none.
    #[serde(default = "default_target_function")]
    pub default_function: String,
    /// Path sent in the synthetic health request.
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// HTTP method sent in the synthetic health request.
    #[serde(default = "default_health_method")]
    pub http_method: String,
}

impl Default for PreTrafficConfig {
    fn default() -> Self {
        Self {
            default_function: default_target_function(),
            health_path: default_health_path(),
            http_method: default_health_method(),
        }
    }
}

impl PreTrafficConfig {
    /// Returns the fallback invocation target.
    #[must_use]
    pub fn default_function(&self) -> FunctionName {
        FunctionName::new(self.default_function.trim())
    }

    /// Returns the synthetic health request.
    #[must_use]
    pub fn health_request(&self) -> HealthCheckRequest {
        HealthCheckRequest {
            path: self.health_path.clone(),
            http_method: self.http_method.clone(),
        }
    }

    /// Validates pre-traffic settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let function = self.default_function.trim();
        if function.is_empty() {
            return Err(ConfigError::Invalid(
                "pre_traffic.default_function must be non-empty".to_string(),
            ));
        }
        if function.len() > MAX_FUNCTION_NAME_LENGTH {
            return Err(ConfigError::Invalid(
                "pre_traffic.default_function exceeds max length".to_string(),
            ));
        }
        if !self.health_path.starts_with('/') {
            return Err(ConfigError::Invalid(
                "pre_traffic.health_path must start with /".to_string(),
            ));
        }
        if self.health_path.len() > MAX_HEALTH_PATH_LENGTH {
            return Err(ConfigError::Invalid("pre_traffic.health_path exceeds max length".to_string()));
        }
        if !HEALTH_METHODS.contains(&self.http_method.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "pre_traffic.http_method must be one of {}",
                HEALTH_METHODS.join(", ")
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Post-Traffic
// ============================================================================

/// Post-traffic validation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostTrafficCheckKind {
    /// No blocking validation; the hook always succeeds.
    #[default]
    None,
    /// Re-run the pre-traffic health probe against the shifted target.
    HealthProbe,
}

/// Post-traffic gate settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PostTrafficConfig {
    /// Validation strategy.
    #[serde(default)]
    pub check: PostTrafficCheckKind,
}

// ============================================================================
// SECTION: AWS
// ============================================================================

/// AWS client settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    /// Region override (defaults to the environment).
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override for every client (local emulators).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl AwsConfig {
    /// Validates AWS settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when AWS settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(region) = &self.region
            && region.trim().is_empty()
        {
            return Err(ConfigError::Invalid("aws.region must be non-empty".to_string()));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "aws.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "aws.endpoint uses http:// without allow_http".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit log settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable audit logging.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Append-only JSON-lines file; stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Metric emission settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable Embedded Metric Format output.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Metric namespace.
    #[serde(default = "default_metrics_namespace")]
    pub namespace: String,
    /// Service dimension value.
    #[serde(default = "default_metrics_service")]
    pub service: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: default_metrics_namespace(),
            service: default_metrics_service(),
        }
    }
}

impl MetricsConfig {
    /// Validates metric settings.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("metrics.namespace", &self.namespace), ("metrics.service", &self.service)]
        {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
            }
            if value.len() > MAX_METRIC_LABEL_LENGTH {
                return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; `None` means built-in defaults apply.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default required tag keys.
fn default_required_tags() -> Vec<String> {
    DEFAULT_REQUIRED_TAGS.iter().map(|key| (*key).to_string()).collect()
}

/// Default pre-traffic target.
fn default_target_function() -> String {
    DEFAULT_TARGET_FUNCTION.to_string()
}

/// Default health-check path.
fn default_health_path() -> String {
    DEFAULT_HEALTH_PATH.to_string()
}

/// Default health-check method.
fn default_health_method() -> String {
    DEFAULT_HEALTH_METHOD.to_string()
}

/// Default metric namespace.
fn default_metrics_namespace() -> String {
    DEFAULT_METRICS_NAMESPACE.to_string()
}

/// Default metric service label.
fn default_metrics_service() -> String {
    DEFAULT_METRICS_SERVICE.to_string()
}

/// Serde default for opt-out flags.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
