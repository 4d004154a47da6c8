use std::env;
use std::fs::write;
use std::path::PathBuf;

use mercury::config::IdentifierRule;
use mercury::load_config::{load_config, load_pipeline_config};
use mercury::PublishError;
use serial_test::serial;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
source_dir: ./drafts
repository:
  url: https://github.com/ornato-t/paolo-sernini
  clone_dir: ./paolo-sernini
  author_name: Paolo Sernini
  author_email: paolo@example.com
site:
  posts_dir: src/pages/scrittura/post
  index_path: src/pages/scrittura/posts.json
  layout: ../../../layouts/Post.astro
identifier_split: last_extension
command_timeout_secs: 120
credential_env: MERCURY_TEST_TOKEN
"#;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

/// Static YAML plus the env credential produce a complete configuration.
#[test]
#[serial]
fn load_config_injects_credential_from_env() {
    let file = config_file(FULL_CONFIG);
    env::set_var("MERCURY_TEST_TOKEN", "top-secret-test-token");

    let loaded = load_config(file.path()).expect("Config should load");

    assert_eq!(loaded.pipeline.source_dir, PathBuf::from("./drafts"));
    assert_eq!(loaded.pipeline.repository.clone_dir, PathBuf::from("./paolo-sernini"));
    assert_eq!(loaded.pipeline.identifier_split, IdentifierRule::LastExtension);
    assert_eq!(loaded.pipeline.command_timeout_secs, 120);
    assert_eq!(
        loaded.pipeline.index_file(),
        PathBuf::from("./paolo-sernini/src/pages/scrittura/posts.json")
    );
    // Defaults fill the sections left out.
    assert_eq!(loaded.pipeline.converter.program, "pandoc");
    assert_eq!(
        loaded.pipeline.repository.commit_message,
        "[Automated mercury commit] Updating posts"
    );
    assert_eq!(loaded.credential.expose(), "top-secret-test-token");
    assert!(!format!("{loaded:?}").contains("top-secret"));

    env::remove_var("MERCURY_TEST_TOKEN");
}

#[test]
#[serial]
fn missing_credential_is_a_configuration_error() {
    let file = config_file(FULL_CONFIG);
    env::remove_var("MERCURY_TEST_TOKEN");

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("MERCURY_TEST_TOKEN"), "got: {err}");
    assert!(matches!(
        err.downcast_ref::<PublishError>(),
        Some(PublishError::Configuration(_))
    ));
}

#[test]
#[serial]
fn invalid_yaml_is_reported() {
    let file = config_file("not-yaml: [:::");
    let err = load_pipeline_config(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("parse") || msg.contains("YAML"), "got: {msg}");
}

#[test]
#[serial]
fn ssh_remote_is_rejected() {
    let file = config_file(
        r#"
repository:
  url: git@github.com:ornato-t/paolo-sernini.git
  clone_dir: ./paolo-sernini
  author_name: Paolo Sernini
  author_email: paolo@example.com
"#,
    );
    let err = load_pipeline_config(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("repository.url"), "got: {err:#}");
}

#[test]
#[serial]
fn minimal_config_uses_defaults() {
    let file = config_file(
        r#"
repository:
  url: https://github.com/ornato-t/paolo-sernini
  clone_dir: ./paolo-sernini
  author_name: Paolo Sernini
  author_email: paolo@example.com
"#,
    );
    let config = load_pipeline_config(file.path()).unwrap();
    assert_eq!(config.source_dir, PathBuf::from("."));
    assert_eq!(config.identifier_split, IdentifierRule::FirstDot);
    assert_eq!(config.credential_env, "MERCURY_TOKEN");
    assert_eq!(config.command_timeout_secs, 600);
    assert_eq!(config.site.layout, "../../../layouts/Post.astro");
}
