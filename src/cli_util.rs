use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Color;

use crate::VmError;

/// Prefix `msg` with the program name and paint it red when stderr is a
/// terminal.
fn decorate(program: Option<&str>, msg: &str) -> String {
    let msg = match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    };
    if io::stderr().is_terminal() {
        Color::Red.bold().paint(msg).to_string()
    } else {
        msg
    }
}

/// Print a plain one-line diagnostic to stderr.
pub fn print_error(program: &str, msg: &str) {
    eprintln!("{}", decorate(Some(program), msg));
    let _ = io::stderr().flush();
}

/// Pretty-print a [`VmError`], with a caret under the offending instruction
/// when the error has a position.
/// If `program` is `Some("bf")`, messages are prefixed with "bf: ...".
pub fn print_vm_error(program: Option<&str>, code: &str, err: &VmError) {
    let msg = match err {
        VmError::UnmatchedCloseBracket { .. } => "Parse error: unmatched bracket ']'".to_string(),
        VmError::UnmatchedOpenBracket { .. } => "Parse error: unmatched bracket '['".to_string(),
        VmError::OutOfMemory { ptr, .. } => {
            format!("Runtime error: out of memory (ptr={ptr})")
        }
        VmError::PointerUnderflow { .. } => {
            "Runtime error: pointer moved left of cell 0".to_string()
        }
        VmError::Io { source, .. } => format!("I/O error: {source}"),
        VmError::Open { .. } => err.to_string(),
        other => format!("Error: {other}"),
    };

    let msg = decorate(program, &msg);
    match err.ip() {
        Some(ip) => print_error_with_context(&msg, code, ip),
        None => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix} at instruction {pos}");

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let window: String = code
        .chars()
        .skip(start_char)
        .take(pos - start_char + WINDOW_CHARS + 1)
        // Newlines and tabs would break the caret alignment.
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    eprintln!("  {window}");

    // Caret under the exact position
    let caret_offset = pos - start_char;
    eprintln!("  {}^", " ".repeat(caret_offset));
    let _ = io::stderr().flush();
}
