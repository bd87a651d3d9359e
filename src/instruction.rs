use std::fmt;

/// A decoded Brainfuck instruction.
///
/// Characters outside `><+-.,[]` decode to [`Instruction::Nop`] and still
/// occupy one position, so instruction indices match character indices in
/// the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Right,
    Left,
    Inc,
    Dec,
    Output,
    Input,
    LoopStart,
    LoopEnd,
    Nop(char),
}

impl Instruction {
    pub fn decode(ch: char) -> Self {
        match ch {
            '>' => Instruction::Right,
            '<' => Instruction::Left,
            '+' => Instruction::Inc,
            '-' => Instruction::Dec,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => Instruction::LoopStart,
            ']' => Instruction::LoopEnd,
            other => Instruction::Nop(other),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Inc => '+',
            Instruction::Dec => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
            Instruction::Nop(ch) => ch,
        }
    }

    /// Whether executing this instruction reads or writes the current cell.
    pub fn touches_cell(self) -> bool {
        !matches!(
            self,
            Instruction::Right | Instruction::Left | Instruction::Nop(_)
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Keep the trace table aligned when comments contain newlines or tabs.
            Instruction::Nop(ch) if ch.is_control() => write!(f, "{}", ch.escape_default()),
            other => write!(f, "{}", other.as_char()),
        }
    }
}

/// Decode a whole program text, one instruction per character.
pub fn decode_program(code: &str) -> Vec<Instruction> {
    code.chars().map(Instruction::decode).collect()
}
