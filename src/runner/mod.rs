//! The hunt loop.
//!
//! Exactly one candidate is in flight at any time. The cursor is
//! checkpointed synchronously after each completed candidate and before
//! the next one is generated, so a crash at any point resumes with no
//! candidate skipped or repeated.

mod hunt;

pub use hunt::{HuntRunner, StepOutcome};
