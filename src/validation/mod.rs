pub mod steps;

pub use steps::{validate_step, validate_step_on, StepReport, WizardStep};
