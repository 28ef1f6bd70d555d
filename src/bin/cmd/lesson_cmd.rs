use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use console::style;
use termtrainer::{lesson, CmdExit, Module, Progress, Session, SessionEvent, SessionState};

pub fn command() -> Command {
    Command::new("lesson")
        .about("Run one lesson module interactively")
        .arg_required_else_help(true)
        .arg(
            Arg::new("module")
                .help("Module id, as shown by `termtrainer list`")
                .required(true),
        )
}

pub fn run(matches: &ArgMatches) -> Result<CmdExit> {
    let id = matches
        .get_one::<String>("module")
        .map_or("", String::as_str);
    let module = lesson::builtin_module(id)?;

    let mut progress = Progress::new();
    run_lesson(&module, &mut progress)?;

    let (completed, total) = progress.progress_for(&module.id);
    Ok(CmdExit {
        code: exitcode::OK,
        message: Some(format!("Progress: {completed}/{total} steps completed.")),
    })
}

/// Drive one module against stdin until the learner finishes or leaves.
pub fn run_lesson(module: &Module, progress: &mut Progress) -> Result<()> {
    println!("\n{}", style(&module.title).bold());
    if !module.description.is_empty() {
        println!("{}", module.description);
    }
    println!("Controls: 'next', 'prev', 'help', 'exit'. Commands are simulated, never executed.\n");

    let mut session = Session::new(module, progress);
    show_current_step(&session);

    while matches!(session.state(), SessionState::AwaitingInput(_)) {
        let Some(input) = super::prompt("$ ")? else {
            break;
        };
        let event = session.submit(&input, progress);
        match event {
            SessionEvent::Narrative { text } => {
                if let Some(step) = session.current_step() {
                    println!("\n{}", style(&step.title).cyan().bold());
                }
                println!("{text}");
            }
            SessionEvent::Feedback {
                success: true,
                message,
                output,
                ..
            } => {
                if let Some(output) = output {
                    println!("{output}");
                }
                println!("{}", style(message).green());
                show_current_step(&session);
            }
            SessionEvent::Feedback {
                success: false,
                message,
                hint,
                ..
            } => {
                println!("{}", style(message).red());
                if let Some(hint) = hint {
                    println!("{}", style(format!("Hint: {hint}")).dim());
                }
            }
            SessionEvent::Hint { text } => println!("{}", style(format!("Hint: {text}")).yellow()),
            SessionEvent::Boundary { message } => println!("{}", style(message).dim()),
            SessionEvent::Completed { message, output } => {
                if let Some(output) = output {
                    println!("{output}");
                }
                println!("{}", style(message).green());
                println!("{}", style("Module complete!").green().bold());
            }
            SessionEvent::Exited => {}
        }
    }
    Ok(())
}

fn show_current_step(session: &Session) {
    if let Some(step) = session.current_step() {
        println!("\n{}", style(&step.title).cyan().bold());
        println!("{}", step.content);
    }
}
