pub mod engine;
pub mod session;
pub mod space;

pub use engine::{GridEngine, ItemRecord, NullHooks, ShellHooks};
pub use session::{ProbeOutcome, RepositionSession, SessionEnd};
pub use space::{DisplacementPlan, find_or_create_space, find_space_in_panel, make_space};
