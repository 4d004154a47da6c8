#![doc = "mercury: publish word-processor posts to a static site repository."]

//! Discovers `.docx` posts, converts them to markdown with an external converter,
//! prepends frontmatter, records them in the site's JSON index, and pushes the
//! result to the site's git repository from a throwaway working copy.
//!
//! # Usage
//! The `mercury` binary wraps [`cli::run`]. Library users build a
//! [`pipeline::Pipeline`] from a [`config::PipelineConfig`], a
//! [`convert::Converter`] and a [`vcs::VersionControl`].

pub mod cli;
pub mod command;
pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod frontmatter;
pub mod index;
pub mod load_config;
pub mod pipeline;
pub mod repository;
pub mod vcs;

pub use cli::{run, Cli, Commands};
pub use error::{PublishError, VcsStep};
