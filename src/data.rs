/// Outcome of a CLI subcommand: process exit code plus an optional message
/// for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdExit {
    pub code: i32,
    pub message: Option<String>,
}
