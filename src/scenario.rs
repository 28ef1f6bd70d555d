//! Challenge scenario definitions.
//!
//! A scenario is a fixed, scripted slice of a fake world (log lines, file
//! listings, network connections) plus an ordered list of goals judged by
//! declarative predicates. Scenarios are immutable once loaded; the
//! challenge engine and the command simulator only ever read them.

use regex::Regex;
use serde_derive::Deserialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::progress::Progress;

/// All built-in scenarios, bundled from `content/scenarios/` in build.rs.
const ALL_SCENARIOS: &str = include_str!(concat!(env!("OUT_DIR"), "/all-scenarios.yaml"));

/// Failed attempts on a goal before its hint is volunteered.
const DEFAULT_HINT_AFTER: usize = 3;

/// The fixed fake artifacts a scenario exposes to the command simulator.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Artifacts {
    /// Fake log file content, one entry per line.
    #[serde(default)]
    pub log_lines: Vec<String>,
    /// Fake directory listings keyed by path.
    #[serde(default)]
    pub listings: BTreeMap<String, String>,
    /// Fake network connection records.
    #[serde(default)]
    pub connections: Vec<String>,
}

/// Declarative goal predicate. Matching is never fatal; a learner may retry
/// indefinitely.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// Input contains this text (case-insensitive).
    Contains(String),
    /// Input equals this text after trimming (case-insensitive).
    Equals(String),
    /// Input matches this regular expression.
    Pattern(#[serde(with = "serde_regex")] Regex),
}

impl Answer {
    /// Judge a learner's input against this predicate.
    #[must_use]
    pub fn judge(&self, input: &str) -> bool {
        let trimmed = input.trim();
        match self {
            Self::Contains(text) => trimmed.to_lowercase().contains(&text.to_lowercase()),
            Self::Equals(text) => trimmed.eq_ignore_ascii_case(text.trim()),
            Self::Pattern(re) => re.is_match(trimmed),
        }
    }
}

/// One question the learner must answer to advance the scenario.
#[derive(Debug, Deserialize, Clone)]
pub struct Goal {
    /// Identifier, unique within the scenario.
    pub id: String,
    /// The question shown to the learner.
    pub prompt: String,
    /// What counts as a correct finding.
    pub answer: Answer,
    /// Hint shown on `help` or after repeated failures.
    #[serde(default)]
    pub hint: Option<String>,
    /// Message emitted when the goal is met.
    #[serde(default)]
    pub success_message: Option<String>,
}

/// A scenario-based exercise judged by goal predicates rather than literal
/// command matching.
#[derive(Debug, Deserialize, Clone)]
pub struct Scenario {
    /// Unique scenario identifier, used as the completion key.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Briefing text shown before the first goal.
    #[serde(default)]
    pub description: String,
    /// Minimum completed steps per module before this scenario unlocks.
    #[serde(default)]
    pub prerequisites: BTreeMap<String, usize>,
    /// The scripted world state.
    #[serde(default)]
    pub artifacts: Artifacts,
    /// Ordered goals; solving the last one solves the scenario.
    pub goals: Vec<Goal>,
    /// Failed attempts on a goal before its hint is volunteered.
    #[serde(default = "default_hint_after")]
    pub hint_after: usize,
}

const fn default_hint_after() -> usize {
    DEFAULT_HINT_AFTER
}

impl Scenario {
    /// Parse a single scenario from a YAML document and validate it.
    ///
    /// # Errors
    /// Returns a parse error for malformed YAML, and an authoring error when
    /// the goal list is empty or goal ids collide.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(source)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the authoring invariants on an already-parsed scenario.
    ///
    /// # Errors
    /// See [`Scenario::from_yaml`].
    pub fn validate(&self) -> Result<()> {
        if self.goals.is_empty() {
            return Err(Error::EmptyScenario {
                scenario: self.id.clone(),
            });
        }
        let mut seen_ids: HashSet<&str> = HashSet::new();
        for goal in &self.goals {
            if !seen_ids.insert(goal.id.as_str()) {
                return Err(Error::DuplicateGoalId {
                    scenario: self.id.clone(),
                    goal: goal.id.clone(),
                });
            }
        }
        debug!(scenario = %self.id, goals = self.goals.len(), "scenario validated");
        Ok(())
    }

    /// Whether the learner's progress satisfies every prerequisite.
    #[must_use]
    pub fn unlocked_by(&self, progress: &Progress) -> bool {
        self.prerequisites.iter().all(|(module_id, minimum)| {
            let (completed, _) = progress.progress_for(module_id);
            completed >= *minimum
        })
    }
}

/// Parse a list of scenarios from a YAML document, validating each.
///
/// # Errors
/// Returns the first parse or authoring error encountered.
pub fn scenarios_from_yaml(source: &str) -> Result<Vec<Scenario>> {
    let scenarios: Vec<Scenario> = serde_yaml::from_str(source)?;
    for scenario in &scenarios {
        scenario.validate()?;
    }
    Ok(scenarios)
}

/// Return every built-in challenge scenario.
///
/// # Errors
/// Returns an error when the embedded content fails to parse or validate.
pub fn builtin_scenarios() -> Result<Vec<Scenario>> {
    scenarios_from_yaml(ALL_SCENARIOS)
}

/// Look up a single built-in scenario by id.
///
/// # Errors
/// Returns [`Error::UnknownScenario`] when no scenario has the given id.
pub fn builtin_scenario(id: &str) -> Result<Scenario> {
    builtin_scenarios()?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| Error::UnknownScenario { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::Module;

    const VALID_SCENARIO: &str = r#"
id: tiny
title: Tiny
description: A scripted incident.
prerequisites:
  basics: 2
artifacts:
  log_lines:
    - "Failed password for root from 10.1.1.1"
goals:
  - id: who
    prompt: Which IP attacked?
    answer:
      contains: 10.1.1.1
"#;

    #[test]
    fn can_load_valid_scenario() {
        let scenario = Scenario::from_yaml(VALID_SCENARIO).unwrap();
        assert_eq!(scenario.id, "tiny");
        assert_eq!(scenario.goals.len(), 1);
        assert_eq!(scenario.hint_after, DEFAULT_HINT_AFTER);
        assert_eq!(scenario.artifacts.log_lines.len(), 1);
    }

    #[test]
    fn rejects_duplicate_goal_ids() {
        let source = r#"
id: broken
title: Broken
goals:
  - id: g
    prompt: one
    answer:
      equals: a
  - id: g
    prompt: two
    answer:
      equals: b
"#;
        let err = Scenario::from_yaml(source).unwrap_err();
        assert!(matches!(err, Error::DuplicateGoalId { .. }), "{err}");
    }

    #[test]
    fn rejects_scenario_without_goals() {
        let source = "id: empty\ntitle: Empty\ngoals: []\n";
        let err = Scenario::from_yaml(source).unwrap_err();
        assert!(matches!(err, Error::EmptyScenario { .. }), "{err}");
    }

    #[test]
    fn answer_predicates_judge_as_documented() {
        assert!(Answer::Contains("Brute Force".into()).judge("a brute force attack"));
        assert!(!Answer::Contains("brute force".into()).judge("dictionary attack"));
        assert!(Answer::Equals("2".into()).judge("  2 "));
        assert!(!Answer::Equals("2".into()).judge("12"));
        let pattern = Answer::Pattern(Regex::new(r"^0?640$").unwrap());
        assert!(pattern.judge("640"));
        assert!(!pattern.judge("644"));
    }

    #[test]
    fn prerequisites_gate_on_progress() {
        let scenario = Scenario::from_yaml(VALID_SCENARIO).unwrap();
        let mut progress = Progress::new();
        assert!(!scenario.unlocked_by(&progress));

        let module: Module = serde_yaml::from_str(
            r#"
module: basics
title: Basics
lessons:
  - { id: a, title: A, content: x, command: pwd }
  - { id: b, title: B, content: x, command: ls }
"#,
        )
        .unwrap();
        progress.register_module(&module);
        progress.record_step_complete("basics", "a");
        assert!(!scenario.unlocked_by(&progress));
        progress.record_step_complete("basics", "b");
        assert!(scenario.unlocked_by(&progress));
    }

    #[test]
    fn builtin_scenarios_load() {
        let scenarios = builtin_scenarios().unwrap();
        let ids: Vec<&str> = scenarios.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"suspicious_log"), "missing suspicious_log in {ids:?}");
    }
}
