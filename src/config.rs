//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Where guards send users they turn away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTargets {
    /// Target for unauthenticated users.
    pub sign_in: String,
    /// Target for authenticated users whose profile is incomplete.
    pub onboarding: String,
    /// Target for onboarded users who land on the onboarding page.
    pub dashboard: String,
}

impl Default for RedirectTargets {
    fn default() -> Self {
        Self {
            sign_in: "/auth/signin".to_string(),
            onboarding: "/onboarding".to_string(),
            dashboard: "/dashboard".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port for the HTTP API.
    pub http_port: u16,
    /// Guard redirect targets.
    pub redirects: RedirectTargets,
    /// Step to jump to when a form has errors but none of them are mapped.
    /// `None` leaves the user on the current step.
    pub wizard_fallback_step: Option<u32>,
    /// Directory for rolling log files. Logs go to stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            redirects: RedirectTargets::default(),
            wizard_fallback_step: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Build the configuration from `FUNERAL_DESK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let http_port = match lookup("FUNERAL_DESK_HTTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "FUNERAL_DESK_HTTP_PORT".to_string(),
                message: format!("{e}"),
            })?,
            None => defaults.http_port,
        };

        let redirects = RedirectTargets {
            sign_in: redirect_path(
                &lookup,
                "FUNERAL_DESK_SIGN_IN_PATH",
                defaults.redirects.sign_in,
            )?,
            onboarding: redirect_path(
                &lookup,
                "FUNERAL_DESK_ONBOARDING_PATH",
                defaults.redirects.onboarding,
            )?,
            dashboard: redirect_path(
                &lookup,
                "FUNERAL_DESK_DASHBOARD_PATH",
                defaults.redirects.dashboard,
            )?,
        };

        let wizard_fallback_step = match lookup("FUNERAL_DESK_WIZARD_FALLBACK_STEP") {
            Some(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                    key: "FUNERAL_DESK_WIZARD_FALLBACK_STEP".to_string(),
                    message: format!("{e}"),
                })?)
            }
            _ => None,
        };

        let log_dir = lookup("FUNERAL_DESK_LOG_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            http_port,
            redirects,
            wizard_fallback_step,
            log_dir,
        })
    }
}

fn redirect_path<F>(lookup: &F, key: &str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(path) if path.starts_with('/') => Ok(path),
        Some(path) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("redirect path must start with '/', got {path:?}"),
        }),
        None => Ok(default),
    }
}
