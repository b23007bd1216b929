//! Reconciliation of frontend and backend release tags

pub mod version_resolver;

pub use version_resolver::{Resolution, VersionResolver};
