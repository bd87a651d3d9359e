//! Jump target resolution for `[` and `]`.

use std::collections::HashMap;

use crate::error::VmError;
use crate::instruction::Instruction;

/// Matching positions for every bracket pair in a program.
///
/// `close_of` maps each `[` to its `]`, `open_of` maps each `]` back to its
/// `[`. The two maps are inverses of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpTable {
    close_of: HashMap<usize, usize>,
    open_of: HashMap<usize, usize>,
}

impl JumpTable {
    /// Position of the `]` matching the `[` at `open`.
    pub fn close_of(&self, open: usize) -> Option<usize> {
        self.close_of.get(&open).copied()
    }

    /// Position of the `[` matching the `]` at `close`.
    pub fn open_of(&self, close: usize) -> Option<usize> {
        self.open_of.get(&close).copied()
    }

    /// Number of bracket pairs.
    pub fn len(&self) -> usize {
        self.close_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close_of.is_empty()
    }

    /// Iterate `(open, close)` pairs in no particular order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.close_of.iter().map(|(&open, &close)| (open, close))
    }
}

/// Resolve bracket pairs in a decoded program.
pub fn resolve(program: &[Instruction]) -> Result<JumpTable, VmError> {
    let mut table = JumpTable::default();
    let mut stack: Vec<usize> = Vec::new();

    for (i, instr) in program.iter().enumerate() {
        match instr {
            Instruction::LoopStart => stack.push(i),
            Instruction::LoopEnd => {
                let Some(open) = stack.pop() else {
                    return Err(VmError::UnmatchedCloseBracket { ip: i });
                };
                table.close_of.insert(open, i);
                table.open_of.insert(i, open);
            }
            _ => {}
        }
    }

    if let Some(unmatched_open) = stack.last().copied() {
        return Err(VmError::UnmatchedOpenBracket { ip: unmatched_open });
    }

    Ok(table)
}

/// Resolve bracket pairs directly from program text.
pub fn resolve_str(code: &str) -> Result<JumpTable, VmError> {
    resolve(&crate::instruction::decode_program(code))
}
