use std::fmt::Write;

use anyhow::Result;
use clap::{ArgMatches, Command};
use termtrainer::{lesson, scenario, CmdExit, Scenario};

pub fn command() -> Command {
    Command::new("list").about("List lesson modules and challenge scenarios")
}

pub fn run(_matches: &ArgMatches) -> Result<CmdExit> {
    let modules = lesson::builtin_modules()?;
    let scenarios = scenario::builtin_scenarios()?;

    let mut output = String::from("Lesson modules:\n\n");
    for module in &modules {
        let _ = writeln!(
            output,
            "  {id:<16} {title:<32} {steps} steps",
            id = module.id,
            title = module.title,
            steps = module.steps.len()
        );
    }
    output.push_str("\nChallenge scenarios:\n\n");
    for scenario in &scenarios {
        let _ = writeln!(
            output,
            "  {id:<16} {title:<32} requires {prereqs}",
            id = scenario.id,
            title = scenario.title,
            prereqs = describe_prerequisites(scenario)
        );
    }

    println!("{output}");
    Ok(CmdExit {
        code: exitcode::OK,
        message: None,
    })
}

pub fn describe_prerequisites(scenario: &Scenario) -> String {
    if scenario.prerequisites.is_empty() {
        return "nothing".to_string();
    }
    scenario
        .prerequisites
        .iter()
        .map(|(module_id, minimum)| format!("{minimum} steps of {module_id}"))
        .collect::<Vec<_>>()
        .join(", ")
}
