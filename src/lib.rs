pub mod boundary;
pub mod cli;
pub mod config;
pub mod docker;
pub mod domain;
pub mod error;
pub mod git;
pub mod process;
pub mod resolver;
pub mod ui;
pub mod workspace;

pub use error::{DeployError, Result};
