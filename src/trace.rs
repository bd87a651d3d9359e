//! Step-by-step execution trace.
//!
//! When a [`Trace`] is attached to an engine, every executed instruction is
//! written as one row of a table:
//!
//! ```text
//! STEP | IP  | PTR | CELL | INSTR | ACTION
//! -----+-----+-----+------+-------+------------------------------------------------
//! 0    | 0   | 0   | 0    |  +    | Increment cell[0] from 0 to 1
//! ```

use std::fmt;
use std::io::{self, Write};

use crate::instruction::Instruction;

/// What a single step did, as reported in the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MovedPointer { to: usize },
    Increment { ptr: usize, from: u8, to: u8 },
    Decrement { ptr: usize, from: u8, to: u8 },
    Wrote(u8),
    Read(u8),
    EndOfInput,
    JumpForward { to: usize },
    JumpBack { to: usize },
    EnterLoop,
    ExitLoop,
    Nop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MovedPointer { to } => write!(f, "Moved pointer head to index {to}"),
            Action::Increment { ptr, from, to } => {
                write!(f, "Increment cell[{ptr}] from {from} to {to}")
            }
            Action::Decrement { ptr, from, to } => {
                write!(f, "Decrement cell[{ptr}] from {from} to {to}")
            }
            Action::Wrote(byte) => write!(f, "Output byte {byte}"),
            Action::Read(byte) => write!(f, "Read byte {byte}"),
            Action::EndOfInput => write!(f, "End of input; cell unchanged"),
            Action::JumpForward { to } => {
                write!(f, "Cell is 0; jump forward to matching ']' at IP {to}")
            }
            Action::JumpBack { to } => {
                write!(f, "Cell != 0; jump back to matching '[' at IP {to}")
            }
            Action::EnterLoop => write!(f, "Enter loop (cell != 0)"),
            Action::ExitLoop => write!(f, "Exit loop (cell is 0)"),
            Action::Nop => write!(f, "No-op"),
        }
    }
}

/// One row of the trace table, captured before the instruction ran.
#[derive(Debug, Clone)]
pub struct TraceRow {
    pub ip: usize,
    pub ptr: usize,
    pub cell: Option<u8>,
    pub instr: Instruction,
    pub action: Action,
}

/// Writes trace rows to any sink; the CLI points it at stderr so the table
/// never mixes with program output.
pub struct Trace<'io> {
    sink: Box<dyn Write + 'io>,
    step: usize,
    header_written: bool,
}

impl<'io> Trace<'io> {
    pub fn new<W: Write + 'io>(sink: W) -> Self {
        Self {
            sink: Box::new(sink),
            step: 0,
            header_written: false,
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Number of rows recorded so far.
    pub fn steps(&self) -> usize {
        self.step
    }

    pub fn record(&mut self, row: &TraceRow) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.sink, "STEP | IP  | PTR | CELL | INSTR | ACTION")?;
            writeln!(
                self.sink,
                "-----+-----+-----+------+-------+------------------------------------------------"
            )?;
            self.header_written = true;
        }

        // The pointer may sit one past the tape after a final '>'.
        let cell = row
            .cell
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            self.sink,
            "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
            self.step, row.ip, row.ptr, cell, row.instr, row.action
        )?;
        self.step += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl fmt::Debug for Trace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace")
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_once_then_rows() {
        let mut buf = Vec::new();
        {
            let mut trace = Trace::new(&mut buf);
            trace
                .record(&TraceRow {
                    ip: 0,
                    ptr: 0,
                    cell: Some(0),
                    instr: Instruction::Inc,
                    action: Action::Increment { ptr: 0, from: 0, to: 1 },
                })
                .unwrap();
            trace
                .record(&TraceRow {
                    ip: 1,
                    ptr: 0,
                    cell: Some(1),
                    instr: Instruction::Right,
                    action: Action::MovedPointer { to: 1 },
                })
                .unwrap();
            assert_eq!(trace.steps(), 2);
        }
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("STEP | IP"));
        assert!(lines[2].contains("Increment cell[0] from 0 to 1"));
        assert!(lines[3].contains("Moved pointer head to index 1"));
    }

    #[test]
    fn sentinel_pointer_shows_no_cell() {
        let mut buf = Vec::new();
        {
            let mut trace = Trace::new(&mut buf);
            trace
                .record(&TraceRow {
                    ip: 3,
                    ptr: 1,
                    cell: None,
                    instr: Instruction::Nop('x'),
                    action: Action::Nop,
                })
                .unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(2).unwrap().contains("| -    |"));
    }
}
