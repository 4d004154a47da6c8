//! Loads the static YAML configuration and injects the push credential from the environment.
//!
//! The YAML file never holds secrets. The token is read from the variable named by
//! `credential_env`, after `.env` has been loaded by the binary.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};
use url::Url;

use crate::config::{Credential, PipelineConfig};
use crate::error::PublishError;

/// Fully merged configuration: static settings plus the run's credential.
#[derive(Debug)]
pub struct LoadedConfig {
    pub pipeline: PipelineConfig,
    pub credential: Credential,
}

/// Reads and validates the YAML file only; no environment lookups.
pub fn load_pipeline_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(PublishError::Configuration(format!(
                "Failed to read config file {:?}: {}",
                path_ref, e
            ))
            .into());
        }
    };

    let config: PipelineConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(
                PublishError::Configuration(format!("Failed to parse config YAML: {e}")).into(),
            );
        }
    };

    validate(&config).with_context(|| format!("Invalid configuration in {:?}", path_ref))?;
    config.trace_loaded();
    Ok(config)
}

/// Reads the YAML file and the credential it names. A missing credential is fatal.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LoadedConfig> {
    let pipeline = load_pipeline_config(path)?;

    let credential = match Credential::from_env(&pipeline.credential_env) {
        Ok(credential) => credential,
        Err(e) => {
            error!(var = %pipeline.credential_env, "Push credential missing from environment");
            return Err(e.into());
        }
    };

    info!(
        repo_url = %pipeline.repository.url,
        "Config loaded and merged successfully"
    );
    Ok(LoadedConfig {
        pipeline,
        credential,
    })
}

fn validate(config: &PipelineConfig) -> Result<(), PublishError> {
    let url = Url::parse(&config.repository.url).map_err(|e| {
        PublishError::Configuration(format!(
            "repository.url '{}' is not a valid URL: {e}",
            config.repository.url
        ))
    })?;
    if url.scheme() != "https" {
        return Err(PublishError::Configuration(format!(
            "repository.url must use https, got '{}'",
            url.scheme()
        )));
    }
    if config.repository.clone_dir.as_os_str().is_empty() {
        return Err(PublishError::Configuration(
            "repository.clone_dir must not be empty".into(),
        ));
    }
    if !config.converter.source_extension.starts_with('.') {
        return Err(PublishError::Configuration(format!(
            "converter.source_extension must start with '.', got '{}'",
            config.converter.source_extension
        )));
    }
    if config.command_timeout_secs == 0 {
        return Err(PublishError::Configuration(
            "command_timeout_secs must be greater than zero".into(),
        ));
    }
    Ok(())
}
