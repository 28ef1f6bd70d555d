//! Lesson session state machine.
//!
//! One session drives one module: a current-step pointer, input validation
//! and the `next`/`prev`/`exit`/`help` controls. The session delegates to
//! the command simulator for output and to the progress tracker for
//! bookkeeping; it renders nothing itself.
//!
//! # Matching policy
//!
//! A command step passes when the learner's input equals the step's
//! `command` **case-sensitively after trimming and collapsing internal runs
//! of whitespace**. `ls  -l` matches `ls -l`; `LS -l` does not. Control
//! words (`next`, `prev`, `exit`, `help`) are matched case-insensitively.
//! This policy is user-visible and covered by tests; changing it changes
//! what learners experience as "correct".

use tracing::debug;

use crate::lesson::{Module, Step, Target};
use crate::progress::Progress;
use crate::simulate::{simulate_line, SimContext, SimulatedOutput};

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for input on the step at this index.
    AwaitingInput(usize),
    /// The last step was passed. Terminal.
    Completed,
    /// The learner left with `exit`. Terminal.
    Exited,
}

/// What one submission produced. The menu layer renders these; it holds no
/// matching logic of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved to a step whose text should be (re)shown.
    Narrative { text: String },
    /// Verdict on a command attempt.
    Feedback {
        success: bool,
        message: String,
        /// Simulated command output, present on success.
        output: Option<String>,
        /// Hint suggestion, present on failure.
        hint: Option<String>,
    },
    /// Response to `help`.
    Hint { text: String },
    /// A transition that cannot be taken, such as `prev` on the first step.
    /// Boundary feedback, never an error.
    Boundary { message: String },
    /// The module is finished.
    Completed {
        message: String,
        output: Option<String>,
    },
    /// The learner left the session.
    Exited,
}

/// Interactive session over one module. Create it when the module is
/// entered, drop it when the learner returns to the menu; completed-step
/// counters outlive it in [`Progress`].
#[derive(Debug)]
pub struct Session<'a> {
    module: &'a Module,
    state: SessionState,
    transcript: Vec<String>,
}

impl<'a> Session<'a> {
    /// Start a session at the first step and register the module's step
    /// total with the tracker.
    pub fn new(module: &'a Module, progress: &mut Progress) -> Self {
        progress.register_module(module);
        debug!(module = %module.id, "session started");
        Self {
            module,
            state: SessionState::AwaitingInput(0),
            transcript: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn module(&self) -> &Module {
        self.module
    }

    /// The step awaiting input, if the session is still live.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        match self.state {
            SessionState::AwaitingInput(i) => self.module.steps.get(i),
            _ => None,
        }
    }

    /// Every input submitted so far, in order.
    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Process one line of learner input and return the event to render.
    pub fn submit(&mut self, input: &str, progress: &mut Progress) -> SessionEvent {
        self.transcript.push(input.to_string());

        let index = match self.state {
            SessionState::AwaitingInput(i) => i,
            SessionState::Completed => {
                return SessionEvent::Boundary {
                    message: "This lesson is already complete.".to_string(),
                }
            }
            SessionState::Exited => return SessionEvent::Exited,
        };
        let step = &self.module.steps[index];

        match input.trim().to_lowercase().as_str() {
            "exit" => {
                self.state = SessionState::Exited;
                return SessionEvent::Exited;
            }
            "help" => {
                return SessionEvent::Hint {
                    text: hint_for(step),
                }
            }
            "prev" => {
                if index == 0 {
                    return SessionEvent::Boundary {
                        message: "This is the first step.".to_string(),
                    };
                }
                self.state = SessionState::AwaitingInput(index - 1);
                return SessionEvent::Narrative {
                    text: self.module.steps[index - 1].content.clone(),
                };
            }
            _ => {}
        }

        match step.target() {
            Target::Token(token) => {
                let trimmed = input.trim();
                if trimmed.eq_ignore_ascii_case(token) || trimmed.eq_ignore_ascii_case("next") {
                    self.advance(index, None, step)
                } else {
                    SessionEvent::Feedback {
                        success: false,
                        message: "Command not recognized here.".to_string(),
                        output: None,
                        hint: Some(hint_for(step)),
                    }
                }
            }
            Target::Command(command) => {
                if normalize(input) == normalize(command) {
                    let output = match simulate_line(command, &SimContext::default()) {
                        SimulatedOutput::Text(text) if text.is_empty() => None,
                        other => Some(other.to_string()),
                    };
                    progress.record_step_complete(&self.module.id, &step.id);
                    self.advance(index, output, step)
                } else {
                    debug!(module = %self.module.id, step = %step.id, "input did not match");
                    SessionEvent::Feedback {
                        success: false,
                        message: "That's not the command this step is looking for.".to_string(),
                        output: None,
                        hint: Some(hint_for(step)),
                    }
                }
            }
        }
    }

    fn advance(&mut self, index: usize, output: Option<String>, step: &Step) -> SessionEvent {
        let success_message = step
            .success_message
            .clone()
            .unwrap_or_else(|| "Correct!".to_string());

        if index + 1 == self.module.steps.len() {
            self.state = SessionState::Completed;
            return SessionEvent::Completed {
                message: success_message,
                output,
            };
        }

        self.state = SessionState::AwaitingInput(index + 1);
        if step.is_narrative() {
            SessionEvent::Narrative {
                text: self.module.steps[index + 1].content.clone(),
            }
        } else {
            SessionEvent::Feedback {
                success: true,
                message: success_message,
                output,
                hint: None,
            }
        }
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
/// Case is preserved; command matching is deliberately case-sensitive.
#[must_use]
pub fn normalize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The hint for a step: the authored one, or a generated fallback naming
/// the expected input.
fn hint_for(step: &Step) -> String {
    step.hint.clone().unwrap_or_else(|| match step.target() {
        Target::Command(command) => format!("Type '{command}' and press Enter"),
        Target::Token(token) => format!("Type '{token}' to continue"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson;
    use crate::lesson::Module;
    use rstest::rstest;

    fn sample_module() -> Module {
        Module::from_yaml(
            r#"
module: sample
title: Sample
lessons:
  - id: intro
    title: Intro
    content: Welcome aboard.
    expected_input: next
  - id: pwd
    title: Pwd
    content: Find your current directory.
    command: pwd
    success_message: Great! You've learned how to find your current directory.
  - id: list
    title: List
    content: List the files.
    command: ls -l
    success_message: Well done.
"#,
        )
        .unwrap()
    }

    #[test]
    fn session_starts_awaiting_first_step_with_full_total() {
        let module = sample_module();
        let mut progress = Progress::new();
        let session = Session::new(&module, &mut progress);
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
        assert_eq!(progress.progress_for("sample"), (0, 3));
    }

    #[test]
    fn correct_command_advances_and_reports_success() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);

        let event = session.submit("pwd", &mut progress);
        match event {
            SessionEvent::Feedback {
                success,
                message,
                output,
                hint,
            } => {
                assert!(success);
                assert_eq!(
                    message,
                    "Great! You've learned how to find your current directory."
                );
                assert_eq!(output.as_deref(), Some("/home/user"));
                assert!(hint.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(session.state(), SessionState::AwaitingInput(2));
        assert_eq!(progress.progress_for("sample"), (1, 3));
    }

    #[test]
    fn wrong_command_stays_put_with_hint() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);

        let event = session.submit("ls", &mut progress);
        match event {
            SessionEvent::Feedback {
                success, hint, ..
            } => {
                assert!(!success);
                assert_eq!(hint.as_deref(), Some("Type 'pwd' and press Enter"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(session.state(), SessionState::AwaitingInput(1));
        assert_eq!(progress.progress_for("sample"), (0, 3));
    }

    #[test]
    fn prev_at_first_step_is_a_boundary_not_an_error() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);

        let event = session.submit("prev", &mut progress);
        assert_eq!(
            event,
            SessionEvent::Boundary {
                message: "This is the first step.".to_string()
            }
        );
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
        assert_eq!(progress.progress_for("sample"), (0, 3));
    }

    #[test]
    fn prev_then_next_returns_to_the_same_step_without_side_effects() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);
        let before = progress.clone();

        session.submit("prev", &mut progress);
        assert_eq!(session.state(), SessionState::AwaitingInput(0));
        session.submit("next", &mut progress);
        assert_eq!(session.state(), SessionState::AwaitingInput(1));
        assert_eq!(progress, before);
    }

    #[test]
    fn same_command_cannot_double_count() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);
        session.submit("pwd", &mut progress);

        // Walk back and resubmit the same correct command.
        session.submit("prev", &mut progress);
        session.submit("pwd", &mut progress);
        assert_eq!(progress.progress_for("sample"), (1, 3));
    }

    #[test]
    fn finishing_the_last_step_completes_the_session() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);
        session.submit("pwd", &mut progress);

        let event = session.submit("ls -l", &mut progress);
        match event {
            SessionEvent::Completed { message, output } => {
                assert_eq!(message, "Well done.");
                assert!(output.is_some());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(progress.progress_for("sample"), (2, 3));
    }

    #[test]
    fn help_emits_the_hint_and_stays_put() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);

        let event = session.submit("help", &mut progress);
        assert_eq!(
            event,
            SessionEvent::Hint {
                text: "Type 'pwd' and press Enter".to_string()
            }
        );
        assert_eq!(session.state(), SessionState::AwaitingInput(1));
    }

    #[test]
    fn exit_is_terminal() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        assert_eq!(session.submit("exit", &mut progress), SessionEvent::Exited);
        assert_eq!(session.state(), SessionState::Exited);
        assert_eq!(session.submit("pwd", &mut progress), SessionEvent::Exited);
    }

    #[test]
    fn transcript_records_every_attempt() {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);
        session.submit("ls", &mut progress);
        session.submit("pwd", &mut progress);
        assert_eq!(session.transcript(), ["next", "ls", "pwd"]);
    }

    #[rstest]
    #[case("ls -l", true)]
    #[case("  ls -l  ", true)]
    #[case("ls  -l", true)]
    #[case("ls \t -l", true)]
    #[case("LS -l", false)]
    #[case("ls -L", false)]
    #[case("ls", false)]
    fn matching_policy_collapses_whitespace_case_sensitively(
        #[case] input: &str,
        #[case] should_match: bool,
    ) {
        let module = sample_module();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);
        session.submit("pwd", &mut progress);

        let event = session.submit(input, &mut progress);
        let success = matches!(
            event,
            SessionEvent::Completed { .. }
                | SessionEvent::Feedback { success: true, .. }
        );
        assert_eq!(success, should_match, "input: {input:?}");
    }

    #[test]
    fn ten_command_steps_complete_to_full_progress() {
        let steps: String = (0..10)
            .map(|i| {
                format!(
                    "  - {{ id: s{i}, title: S{i}, content: c, command: \"echo {i}\" }}\n"
                )
            })
            .collect();
        let source = format!("module: ten\ntitle: Ten\nlessons:\n{steps}");
        let module = Module::from_yaml(&source).unwrap();

        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        for i in 0..10 {
            session.submit(&format!("echo {i}"), &mut progress);
        }
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(progress.progress_for("ten"), (10, 10));
    }

    #[test]
    fn builtin_linux_basics_pwd_step_matches_the_documented_strings() {
        let module = lesson::builtin_module("linux_basics").unwrap();
        let mut progress = Progress::new();
        let mut session = Session::new(&module, &mut progress);
        session.submit("next", &mut progress);
        assert_eq!(session.current_step().unwrap().id, "pwd");

        let wrong = session.submit("ls", &mut progress);
        match wrong {
            SessionEvent::Feedback { success, hint, .. } => {
                assert!(!success);
                assert_eq!(hint.as_deref(), Some("Type 'pwd' and press Enter"));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let right = session.submit("pwd", &mut progress);
        match right {
            SessionEvent::Feedback { success, message, .. } => {
                assert!(success);
                assert_eq!(
                    message,
                    "Great! You've learned how to find your current directory."
                );
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
