//! Challenge engine.
//!
//! A variant of the session driver where success is judged against a
//! scenario goal predicate rather than a literal command match. Goals are
//! worked through in order; failure is never fatal and there is no attempt
//! limit. Input that misses the goal but parses as a command the simulator
//! knows is treated as investigation: the learner gets the simulated output
//! for the scenario's scripted world and the attempt is not counted.

use tracing::debug;

use crate::progress::Progress;
use crate::scenario::{Goal, Scenario};
use crate::simulate::{simulate_line, SimContext, SimulatedOutput};

/// Where the challenge currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    /// Working on the goal at this index.
    InProgress(usize),
    /// Every goal was met. Terminal.
    Solved,
    /// The learner left with `exit`. Terminal.
    Abandoned,
}

/// What one submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeEvent {
    /// Simulated output of an investigation command.
    Output { text: String },
    /// Verdict on an answer attempt.
    Feedback {
        success: bool,
        message: String,
        /// Attached once the hint ladder triggers, or on `help`.
        hint: Option<String>,
    },
    /// Response to `help`.
    Hint { text: String },
    /// The whole scenario is solved.
    Solved { message: String },
    /// The learner left the scenario.
    Abandoned,
}

/// Interactive session over one scenario. Completion is recorded in
/// [`Progress`] when the final goal is met.
#[derive(Debug)]
pub struct ChallengeSession<'a> {
    scenario: &'a Scenario,
    state: ChallengeState,
    /// Failed attempts on the current goal, for the hint ladder.
    attempts: usize,
}

impl<'a> ChallengeSession<'a> {
    #[must_use]
    pub fn new(scenario: &'a Scenario) -> Self {
        debug!(scenario = %scenario.id, "challenge started");
        Self {
            scenario,
            state: ChallengeState::InProgress(0),
            attempts: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ChallengeState {
        self.state
    }

    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        self.scenario
    }

    /// The goal awaiting an answer, if the challenge is still live.
    #[must_use]
    pub fn current_goal(&self) -> Option<&Goal> {
        match self.state {
            ChallengeState::InProgress(i) => self.scenario.goals.get(i),
            _ => None,
        }
    }

    /// Process one line of learner input and return the event to render.
    pub fn submit(&mut self, input: &str, progress: &mut Progress) -> ChallengeEvent {
        let index = match self.state {
            ChallengeState::InProgress(i) => i,
            ChallengeState::Solved => {
                return ChallengeEvent::Solved {
                    message: "This challenge is already solved.".to_string(),
                }
            }
            ChallengeState::Abandoned => return ChallengeEvent::Abandoned,
        };
        let goal = &self.scenario.goals[index];

        match input.trim().to_lowercase().as_str() {
            "exit" => {
                self.state = ChallengeState::Abandoned;
                return ChallengeEvent::Abandoned;
            }
            "help" => {
                return ChallengeEvent::Hint {
                    text: goal
                        .hint
                        .clone()
                        .unwrap_or_else(|| "Study the scenario data again.".to_string()),
                }
            }
            _ => {}
        }

        if goal.answer.judge(input) {
            debug!(scenario = %self.scenario.id, goal = %goal.id, "goal met");
            let message = goal
                .success_message
                .clone()
                .unwrap_or_else(|| "Correct!".to_string());
            self.attempts = 0;

            if index + 1 == self.scenario.goals.len() {
                self.state = ChallengeState::Solved;
                progress.record_challenge_complete(&self.scenario.id);
                return ChallengeEvent::Solved { message };
            }
            self.state = ChallengeState::InProgress(index + 1);
            return ChallengeEvent::Feedback {
                success: true,
                message,
                hint: None,
            };
        }

        // Not an answer; maybe the learner is investigating the scripted
        // world. Simulated commands don't count as failed attempts.
        let context = SimContext::with_scenario(self.scenario);
        if let SimulatedOutput::Text(text) = simulate_line(input, &context) {
            return ChallengeEvent::Output { text };
        }

        self.attempts += 1;
        let hint = if self.attempts >= self.scenario.hint_after {
            goal.hint.clone()
        } else {
            None
        };
        ChallengeEvent::Feedback {
            success: false,
            message: "Not quite. Try again.".to_string(),
            hint,
        }
    }
}
