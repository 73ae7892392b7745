//! Interactive confirmation prompts.

use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stdout and read the answer from stdin.
///
/// An empty answer takes the default; anything unrecognized counts as "no".
/// I/O failures (closed stdin, broken pipe) also take the default.
pub fn confirm(question: &str, default: bool) -> bool {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    print!("{} {} ", question, hint);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return default;
    }

    match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}
