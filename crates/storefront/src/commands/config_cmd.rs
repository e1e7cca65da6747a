//! Config subcommand handlers.

use dialoguer::Input;

use storefront_core::DEFAULT_API_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

/// Ask for a value, or take `default` without prompting when `--yes` is set.
fn ask(prompt: &str, default: &str, non_interactive: bool) -> Result<String, CliError> {
    if non_interactive {
        return Ok(default.to_owned());
    }
    Input::new()
        .with_prompt(prompt)
        .default(default.to_owned())
        .interact_text()
        .map_err(prompt_err)
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unable to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: add a profile ─────────────────────────────────────
        ConfigCommand::Init { name } => {
            let config_path = config::config_path();
            if !global.quiet {
                eprintln!("storefront configuration");
                eprintln!("   Config path: {}\n", config_path.display());
            }

            let profile_name = match name {
                Some(name) => name,
                None => ask("Profile name", "default", global.yes)?,
            };
            let api_url = match global.api_url {
                Some(ref url) => url.clone(),
                None => ask("Products API URL", DEFAULT_API_URL, global.yes)?,
            };
            storefront_config::parse_api_url(&api_url)?;

            let profile = Profile {
                api_url,
                insecure: global.insecure.then_some(true),
                timeout: global.timeout,
                ..Profile::default()
            };

            let mut cfg = config::load_config()?;
            cfg.profiles.insert(profile_name.clone(), profile);
            if cfg
                .default_profile
                .as_ref()
                .is_none_or(|d| !cfg.profiles.contains_key(d))
            {
                cfg.default_profile = Some(profile_name.clone());
            }

            let path = config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Profile '{profile_name}' written to {}", path.display());
                eprintln!("  Try it: storefront products list");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.available_profiles(),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
