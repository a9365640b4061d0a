pub mod changeset;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod patch;
pub mod resolver;
pub mod scanner;
pub mod summary;
pub mod warning;

pub use error::{Result, UpdaterError};
