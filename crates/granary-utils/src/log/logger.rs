use env_logger::{Builder, Env, Logger};
use log::{Level, LevelFilter};
use log_reload::{ReloadHandle, ReloadLog};
use std::sync::OnceLock;
use std::{env, fs};
use toml::Value;

static LOG_HANDLE: OnceLock<ReloadHandle<log_reload::LevelFilter<Logger>>> = OnceLock::new();

/// Initializes the logger with a specific log level for the workspace crates.
/// Will only initialize once, even if called multiple times to prevent multiple env logger initialization
pub fn init_logger(log_level: String) -> anyhow::Result<()> {
    let workspace_crates = get_workspace_crates();

    // Get the log level from the string
    let level = match log_level.to_lowercase().as_str() {
        "error" => Level::Error,
        "warn" => Level::Warn,
        "info" => Level::Info,
        "debug" => Level::Debug,
        "trace" => Level::Trace,
        _ => Level::Info, // Default to Info if invalid level is provided
    };

    let level_filter = level.to_level_filter();

    // Get or init the log handle with the specified log level
    let log_handle = LOG_HANDLE.get_or_init(|| {
        let logger = build_logger(&workspace_crates, level_filter);
        log::set_max_level(level_filter);

        // Create a new logger that will filter the logs based on the max level
        let level_filter_logger = log_reload::LevelFilter::new(level, logger);

        let reload_log = ReloadLog::new(level_filter_logger);
        let handle = reload_log.handle();

        // Register the logger to be used by the log crate
        if let Err(err) = log::set_boxed_logger(Box::new(reload_log)) {
            log::warn!("Failed to set the logger: {}", err);
        }

        return handle;
    });

    // Otherwise update the log level
    let logger = build_logger(&workspace_crates, level_filter);
    log::set_max_level(level_filter);

    let level_filter_logger = log_reload::LevelFilter::new(level, logger);

    return log_handle
        .replace(level_filter_logger)
        .map_err(|e| anyhow::anyhow!(e));
}

fn build_logger(workspace_crates: &[String], level_filter: LevelFilter) -> Logger {
    let mut builder = Builder::from_env(Env::default());

    // Set default level for dependencies
    builder.filter_level(LevelFilter::Warn);

    // Apply log level to the workspace crates
    for crate_name in workspace_crates {
        builder.filter_module(crate_name.as_str(), level_filter);
    }

    builder.build()
}

// Helper to get the module names of all crates in the workspace
// Uses the root Cargo.toml to find workspace members, reading each member's
// Cargo.toml for the package name and falling back to the directory name
fn get_workspace_crates() -> Vec<String> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let cargo_toml_path = format!("{}/Cargo.toml", manifest_dir);

    let mut module_names = vec!["granary".to_string()];

    let members = fs::read_to_string(&cargo_toml_path)
        .ok()
        .and_then(|contents| toml::from_str::<Value>(&contents).ok())
        .and_then(|cargo_toml| {
            cargo_toml
                .get("workspace")
                .and_then(|w| w.as_table())
                .and_then(|t| t.get("members"))
                .and_then(|m| m.as_array())
                .cloned()
        });

    let members = match members {
        Some(m) => m,
        None => return module_names,
    };

    for member in members {
        let path_str = match member.as_str() {
            Some(p) => p,
            None => continue,
        };

        // Try to read the member's Cargo.toml to get the actual package name
        let member_cargo_path = format!("{}/{}/Cargo.toml", manifest_dir, path_str);
        let package_name = fs::read_to_string(&member_cargo_path)
            .ok()
            .and_then(|contents| toml::from_str::<Value>(&contents).ok())
            .and_then(|member_toml| {
                member_toml
                    .get("package")
                    .and_then(|p| p.as_table())
                    .and_then(|t| t.get("name"))
                    .and_then(|n| n.as_str())
                    .map(|n| n.to_string())
            });

        match package_name {
            // Convert hyphens to underscores for Rust module compatibility
            Some(name) => module_names.push(name.replace('-', "_")),
            None => {
                // Fallback: if we can't get the actual name, use the directory name
                if let Some(name) = path_str.split('/').last() {
                    module_names.push(name.replace('-', "_"));
                }
            }
        }
    }

    module_names
}
