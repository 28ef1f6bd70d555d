mod cmd;

use console::Style;
use std::process::exit;
use tracing_subscriber::EnvFilter;

const DEFAULT_ERR_EXIT_CODE: i32 = 1;

fn main() {
    let app = cmd::default::command()
        .subcommand(cmd::list_cmd::command())
        .subcommand(cmd::lesson_cmd::command())
        .subcommand(cmd::challenge_cmd::command());

    let matches = app.get_matches();

    let level = matches
        .get_one::<String>("log")
        .map_or("info", String::as_str);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let res = match matches.subcommand() {
        None => cmd::default::run(),
        Some(("list", subcommand_matches)) => cmd::list_cmd::run(subcommand_matches),
        Some(("lesson", subcommand_matches)) => cmd::lesson_cmd::run(subcommand_matches),
        Some(("challenge", subcommand_matches)) => cmd::challenge_cmd::run(subcommand_matches),
        _ => unreachable!(),
    };

    let exit_with = match res {
        Ok(cmd) => {
            if let Some(message) = cmd.message {
                let style = if exitcode::is_success(cmd.code) {
                    Style::new().green()
                } else {
                    Style::new().red()
                };
                eprintln!("{}", style.apply_to(message));
            }
            cmd.code
        }
        Err(e) => {
            tracing::debug!("{e:?}");
            eprintln!("{e}");
            DEFAULT_ERR_EXIT_CODE
        }
    };
    exit(exit_with)
}
