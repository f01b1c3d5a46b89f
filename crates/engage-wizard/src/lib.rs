//! The post-creation wizard.
//!
//! [`machine`] holds the pure state machine: step sequencing, per-step
//! validation, upload gating, and completion rules, with no I/O. [`session`]
//! drives it: it owns the capture source and crop/rotation inputs, runs the
//! transform and upload pipeline, and applies resolutions back into the
//! machine, discarding results orphaned by a cleared source.

pub mod machine;
pub mod session;

pub use machine::{NextAction, Selection, Selections, WizardMachine, WizardStep};
pub use session::{NextOutcome, WizardSession, WizardStateView};
