//! Command workflows driven by the binary.

pub mod orchestration;

pub use orchestration::Deployer;
