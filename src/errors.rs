use thiserror::Error;

/// All errors produced by the termtrainer engine.
///
/// Every variant here is a load-time authoring or lookup failure. Runtime
/// learner mistakes are never errors: an unsupported command is a
/// [`crate::simulate::SimulatedOutput::NotSupported`] output and an invalid
/// transition (such as `prev` on the first step) is a boundary event.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse lesson source: {source}")]
    Parse {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("module `{module}` has no steps")]
    EmptyModule { module: String },

    #[error("module `{module}` declares step id `{step}` more than once")]
    DuplicateStepId { module: String, step: String },

    #[error("step `{step}` in module `{module}` defines neither `command` nor `expected_input`")]
    StepWithoutTarget { module: String, step: String },

    #[error("step `{step}` in module `{module}` defines both `command` and `expected_input`")]
    StepWithTwoTargets { module: String, step: String },

    #[error("scenario `{scenario}` has no goals")]
    EmptyScenario { scenario: String },

    #[error("scenario `{scenario}` declares goal id `{goal}` more than once")]
    DuplicateGoalId { scenario: String, goal: String },

    #[error("unknown module: {id}")]
    UnknownModule { id: String },

    #[error("unknown scenario: {id}")]
    UnknownScenario { id: String },
}

/// A `Result` alias where the error type is [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
