pub mod challenge_cmd;
pub mod default;
pub mod lesson_cmd;
pub mod list_cmd;

use std::io::{self, Write};

use anyhow::Result;

/// Print a prompt and read one line from stdin. `None` on end of input.
pub fn prompt(text: &str) -> Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}
