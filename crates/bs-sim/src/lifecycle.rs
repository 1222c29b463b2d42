//! Per-run state machine.
//!
//! ```text
//! Idle --PreSimulation--> StepReady --PreIteration--> Iterating
//! Iterating --Iteration--> Iterating --EndIterations--> StepDone
//! StepDone --PostIteration--> StepReady --PostSimulation--> Idle
//! ```

/// Where a project is within a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
    #[default]
    Idle,
    /// Buffers allocated, waiting for the next step (or the end of the run).
    StepReady,
    /// Inside a step's iteration passes.
    Iterating,
    /// Passes finished, post-iteration pending.
    StepDone,
}

/// A lifecycle event that moves the run forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    PreSimulation,
    PreIteration,
    Iteration,
    EndIterations,
    PostIteration,
    PostSimulation,
}

impl RunPhase {
    /// Phase after `transition`, or `None` when it is not allowed here.
    pub fn next(self, transition: Transition) -> Option<RunPhase> {
        use RunPhase::*;
        use Transition::*;
        match (self, transition) {
            (Idle, PreSimulation) => Some(StepReady),
            (StepReady, PreIteration) => Some(Iterating),
            (Iterating, Iteration) => Some(Iterating),
            (Iterating, EndIterations) => Some(StepDone),
            (StepDone, PostIteration) => Some(StepReady),
            (StepReady, PostSimulation) => Some(Idle),
            _ => None,
        }
    }
}
