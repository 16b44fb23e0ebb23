//! Application configuration.

use cmill_models::PlanCatalog;
use cmill_processing::{PollConfig, ProcessingConfig};
use cmill_supabase::SupabaseConfig;

use crate::error::{AppError, AppResult};

/// Top-level configuration, composed from the per-crate configs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub processing: ProcessingConfig,
    pub poll: PollConfig,
    pub supabase: SupabaseConfig,
    pub plans: PlanCatalog,
    /// Emit JSON logs instead of ANSI (`CMILL_LOG_FORMAT=json`)
    pub log_json: bool,
}

impl AppConfig {
    /// Create config from environment variables.
    ///
    /// Only the Supabase settings are hard requirements; everything else
    /// has a default.
    pub fn from_env() -> AppResult<Self> {
        let supabase = SupabaseConfig::from_env().map_err(|e| AppError::config(e.to_string()))?;

        let log_json = std::env::var("CMILL_LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);

        Ok(Self {
            processing: ProcessingConfig::from_env(),
            poll: PollConfig::from_env(),
            supabase,
            plans: PlanCatalog::from_env(),
            log_json,
        })
    }
}
