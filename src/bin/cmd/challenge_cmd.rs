use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use console::style;
use termtrainer::challenge::{ChallengeEvent, ChallengeSession, ChallengeState};
use termtrainer::{scenario, CmdExit, Progress, Scenario};

pub fn command() -> Command {
    Command::new("challenge")
        .about("Run one investigation challenge")
        .arg_required_else_help(true)
        .arg(
            Arg::new("scenario")
                .help("Scenario id, as shown by `termtrainer list`")
                .required(true),
        )
}

pub fn run(matches: &ArgMatches) -> Result<CmdExit> {
    let id = matches
        .get_one::<String>("scenario")
        .map_or("", String::as_str);
    let scenario = scenario::builtin_scenario(id)?;

    // Direct invocation skips the menu's prerequisite gate on purpose.
    let mut progress = Progress::new();
    if !scenario.unlocked_by(&progress) {
        eprintln!(
            "{}",
            style("This scenario usually unlocks after lesson progress. Continuing anyway.")
                .yellow()
        );
    }

    run_challenge(&scenario, &mut progress)?;
    let message = if progress.is_challenge_complete(&scenario.id) {
        Some("Challenge solved.".to_string())
    } else {
        None
    };
    Ok(CmdExit {
        code: exitcode::OK,
        message,
    })
}

/// Drive one scenario against stdin until it is solved or abandoned.
pub fn run_challenge(scenario: &Scenario, progress: &mut Progress) -> Result<()> {
    println!("\n{}", style(&scenario.title).bold());
    if !scenario.description.is_empty() {
        println!("{}", scenario.description);
    }
    println!("Investigate with simulated commands, then answer. 'help' for a hint, 'exit' to leave.\n");

    let mut challenge = ChallengeSession::new(scenario);
    let mut shown_goal: Option<String> = None;

    while matches!(challenge.state(), ChallengeState::InProgress(_)) {
        if let Some(goal) = challenge.current_goal() {
            if shown_goal.as_deref() != Some(goal.id.as_str()) {
                println!("{}", style(&goal.prompt).cyan().bold());
                shown_goal = Some(goal.id.clone());
            }
        }

        let Some(input) = super::prompt("$ ")? else {
            break;
        };
        match challenge.submit(&input, progress) {
            ChallengeEvent::Output { text } => println!("{text}"),
            ChallengeEvent::Feedback {
                success,
                message,
                hint,
            } => {
                let styled = if success {
                    style(message).green()
                } else {
                    style(message).red()
                };
                println!("{styled}");
                if let Some(hint) = hint {
                    println!("{}", style(format!("Hint: {hint}")).dim());
                }
            }
            ChallengeEvent::Hint { text } => {
                println!("{}", style(format!("Hint: {text}")).yellow());
            }
            ChallengeEvent::Solved { message } => {
                println!("{}", style(message).green().bold());
            }
            ChallengeEvent::Abandoned => {}
        }
    }
    Ok(())
}
