//! CLI configuration: thin wrapper around `storefront_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --timeout, --insecure, --profile).

use storefront_core::StoreConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use storefront_config::{Config, Profile, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `StoreConfig` from the config file, active profile and flags.
///
/// Flags (and their env vars) win over the profile, the profile over
/// `[defaults]`. A missing default profile falls back to the built-in API
/// URL; a missing profile named with `--profile` is an error.
pub fn resolve_store_config(global: &GlobalOpts) -> Result<StoreConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: cfg.available_profiles(),
            });
        }
        None => Profile::default(),
    };
    apply_overrides(&mut profile, global);

    tracing::debug!(profile = %profile_name, api_url = %profile.api_url, "resolved store config");
    Ok(storefront_config::profile_to_store_config(
        &profile,
        &cfg.defaults,
    )?)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}
