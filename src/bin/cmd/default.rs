use anyhow::Result;
use clap::{crate_version, Arg, Command};
use console::style;
use termtrainer::{lesson, scenario, CmdExit, Module, Progress, Scenario};

pub fn command() -> Command {
    Command::new("termtrainer")
        .version(crate_version!())
        .about("Safe, simulated terminal trainer. Run without a subcommand for the menu.")
        .arg(
            Arg::new("log")
                .long("log")
                .help("Set logging level")
                .value_name("LEVEL")
                .default_value("info"),
        )
}

/// Interactive menu. Progress is shared across everything run from here, so
/// finishing lessons unlocks the scenarios that require them.
pub fn run() -> Result<CmdExit> {
    let modules = lesson::builtin_modules()?;
    let scenarios = scenario::builtin_scenarios()?;
    let mut progress = Progress::new();
    for module in &modules {
        progress.register_module(module);
    }

    println!("{}", style("termtrainer").bold());
    println!("Practice terminal commands in a simulated shell. Nothing is ever executed.\n");

    loop {
        print_menu(&modules, &scenarios, &progress);
        let Some(choice) = super::prompt("trainer> ")? else {
            break;
        };
        let choice = choice.trim();
        if choice.is_empty() {
            continue;
        }
        if choice.eq_ignore_ascii_case("exit") || choice.eq_ignore_ascii_case("quit") {
            break;
        }

        if let Some(module) = pick(&modules, choice, 0, |m: &Module| m.id.as_str()) {
            super::lesson_cmd::run_lesson(module, &mut progress)?;
        } else if let Some(scenario) =
            pick(&scenarios, choice, modules.len(), |s: &Scenario| s.id.as_str())
        {
            if scenario.unlocked_by(&progress) {
                super::challenge_cmd::run_challenge(scenario, &mut progress)?;
            } else {
                println!(
                    "{}",
                    style(format!(
                        "'{}' is locked. Requires {}.",
                        scenario.id,
                        super::list_cmd::describe_prerequisites(scenario)
                    ))
                    .yellow()
                );
            }
        } else {
            println!("Pick a number or an id from the menu, or 'exit'.");
        }
    }

    Ok(CmdExit {
        code: exitcode::OK,
        message: Some("Thanks for training. Nothing you typed was ever executed.".to_string()),
    })
}

/// Resolve a menu selection by 1-based number (offset past earlier sections)
/// or by id.
fn pick<'a, T>(items: &'a [T], choice: &str, offset: usize, id_of: impl Fn(&T) -> &str) -> Option<&'a T> {
    if let Ok(number) = choice.parse::<usize>() {
        return number
            .checked_sub(offset + 1)
            .and_then(|index| items.get(index));
    }
    items.iter().find(|item| id_of(*item) == choice)
}

fn print_menu(modules: &[Module], scenarios: &[Scenario], progress: &Progress) {
    println!("\n{}", style("Lessons").bold());
    for (i, module) in modules.iter().enumerate() {
        let (completed, total) = progress.progress_for(&module.id);
        // Narrative steps never record completion, so "done" is measured
        // against the command steps only.
        let practiced = module.command_steps();
        let mark = if practiced > 0 && completed >= practiced {
            style("done").green().to_string()
        } else {
            format!("{completed}/{total}")
        };
        println!("  {}. {:<16} {:<32} [{mark}]", i + 1, module.id, module.title);
    }

    println!("{}", style("Challenges").bold());
    for (i, scenario) in scenarios.iter().enumerate() {
        let status = if progress.is_challenge_complete(&scenario.id) {
            style("solved").green().to_string()
        } else if scenario.unlocked_by(progress) {
            "open".to_string()
        } else {
            style("locked").yellow().to_string()
        };
        println!(
            "  {}. {:<16} {:<32} [{status}]",
            modules.len() + i + 1,
            scenario.id,
            scenario.title
        );
    }
    println!("  Type a number or id to start, or 'exit' to quit.");
}
