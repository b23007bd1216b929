//! Domain logic - pure rules independent of git, docker and the terminal

pub mod choice;
pub mod fix;
pub mod session;
pub mod tag;

pub use choice::{
    common_majors, format_choice_label, latest_for_major, major_versions, MajorVersionChoice,
    RepositoryRef,
};
pub use fix::MigrationFix;
pub use session::{DeploymentSession, DestroyReport, DumpSource};
pub use tag::VersionTag;
