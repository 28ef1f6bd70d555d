//! Lesson definition store.
//!
//! Modules are authored as declarative YAML documents (see
//! `content/lessons/`), parsed into [`Module`] values and validated at load
//! time. The engine treats content as untrusted-but-well-formed input: a
//! document that parses but breaks an authoring invariant is rejected with a
//! [`Error`] so the surrounding menu can hide or flag the module.

use serde_derive::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::errors::{Error, Result};

/// All built-in lesson modules, bundled from `content/lessons/` in build.rs.
const ALL_LESSONS: &str = include_str!(concat!(env!("OUT_DIR"), "/all-lessons.yaml"));

/// A named, ordered collection of lesson steps covering one skill area.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Module {
    /// Unique module identifier, used as the progress key.
    #[serde(rename = "module")]
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short description shown in the menu.
    #[serde(default)]
    pub description: String,
    /// Ordered steps; the sequence order is the canonical progression order.
    #[serde(rename = "lessons")]
    pub steps: Vec<Step>,
}

/// One unit of a lesson: narrative text plus the input that completes it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Step {
    /// Identifier, unique within the module.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Narrative text shown to the learner.
    pub content: String,
    /// Exact command the learner must type to pass this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Optional hint shown on `help` or after a wrong attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Message emitted when the step is passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    /// Generic token (e.g. `next`) that advances a non-command step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_input: Option<String>,
}

/// The matching target of a step: exactly one of these exists per step,
/// enforced at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The learner must type this command.
    Command(&'a str),
    /// The learner advances with this token (a narrative step).
    Token(&'a str),
}

impl Step {
    /// The input this step is waiting for.
    ///
    /// Validation guarantees exactly one of `command` / `expected_input` is
    /// set; an unvalidated step with neither falls back to `next`.
    #[must_use]
    pub fn target(&self) -> Target<'_> {
        match (&self.command, &self.expected_input) {
            (Some(cmd), _) => Target::Command(cmd),
            (None, Some(token)) => Target::Token(token),
            (None, None) => Target::Token("next"),
        }
    }

    /// True when this step carries no command to practice.
    #[must_use]
    pub fn is_narrative(&self) -> bool {
        self.command.is_none()
    }
}

impl Module {
    /// Parse a single module from a YAML document and validate it.
    ///
    /// Loading is pure and idempotent: the same source always yields a
    /// structurally equal module.
    ///
    /// # Errors
    /// Returns a parse error for malformed YAML or missing required fields,
    /// and an authoring error when step ids collide, the step list is empty,
    /// or a step does not define exactly one matching target.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let module: Self = serde_yaml::from_str(source)?;
        module.validate()?;
        Ok(module)
    }

    /// Check the authoring invariants on an already-parsed module.
    ///
    /// # Errors
    /// See [`Module::from_yaml`].
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::EmptyModule {
                module: self.id.clone(),
            });
        }
        let mut seen_ids: HashSet<&str> = HashSet::new();
        for step in &self.steps {
            if !seen_ids.insert(step.id.as_str()) {
                return Err(Error::DuplicateStepId {
                    module: self.id.clone(),
                    step: step.id.clone(),
                });
            }
            match (&step.command, &step.expected_input) {
                (None, None) => {
                    return Err(Error::StepWithoutTarget {
                        module: self.id.clone(),
                        step: step.id.clone(),
                    })
                }
                (Some(_), Some(_)) => {
                    return Err(Error::StepWithTwoTargets {
                        module: self.id.clone(),
                        step: step.id.clone(),
                    })
                }
                _ => {}
            }
        }
        debug!(module = %self.id, steps = self.steps.len(), "module validated");
        Ok(())
    }

    /// Number of steps that carry a command to practice.
    #[must_use]
    pub fn command_steps(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_narrative()).count()
    }
}

/// Parse a list of modules from a YAML document, validating each.
///
/// # Errors
/// Returns the first parse or authoring error encountered.
pub fn modules_from_yaml(source: &str) -> Result<Vec<Module>> {
    let modules: Vec<Module> = serde_yaml::from_str(source)?;
    for module in &modules {
        module.validate()?;
    }
    Ok(modules)
}

/// Return every built-in lesson module.
///
/// # Errors
/// Returns an error when the embedded curriculum fails to parse or validate.
pub fn builtin_modules() -> Result<Vec<Module>> {
    modules_from_yaml(ALL_LESSONS)
}

/// Look up a single built-in module by id.
///
/// # Errors
/// Returns [`Error::UnknownModule`] when no module has the given id.
pub fn builtin_module(id: &str) -> Result<Module> {
    builtin_modules()?
        .into_iter()
        .find(|m| m.id == id)
        .ok_or_else(|| Error::UnknownModule { id: id.to_string() })
}
