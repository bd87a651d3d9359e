/// Errors raised while loading or executing a Brainfuck program.
///
/// Every variant is fatal to the current run. Positions (`ip`) are character
/// indices into the program text.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    /// A `]` was found with no pending `[` before it.
    #[error("Unmatched ']' at instruction {ip}")]
    UnmatchedCloseBracket { ip: usize },

    /// A `[` was never closed. `ip` is the innermost unclosed bracket.
    #[error("Unmatched '[' at instruction {ip}")]
    UnmatchedOpenBracket { ip: usize },

    /// The memory pointer tried to move past the end of the tape, or a cell
    /// was accessed while the pointer sat one past the last cell.
    #[error("Out of memory at instruction {ip} (ptr={ptr})")]
    OutOfMemory { ip: usize, ptr: usize },

    /// `<` was executed with the memory pointer at cell 0.
    #[error("Pointer underflow at instruction {ip}")]
    PointerUnderflow { ip: usize },

    #[error("No program loaded")]
    NoProgramLoaded,

    #[error("A program is already loaded")]
    ProgramAlreadyLoaded,

    #[error("Memory size must be at least one cell")]
    InvalidMemorySize,

    /// Reading or writing a byte failed during execution.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// An input or output file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Flushing or releasing a stream failed outside of a step.
    #[error("Stream error: {source}")]
    Stream {
        #[from]
        source: std::io::Error,
    },
}

impl VmError {
    /// Instruction index the error refers to, when it has one.
    pub fn ip(&self) -> Option<usize> {
        match self {
            VmError::UnmatchedCloseBracket { ip }
            | VmError::UnmatchedOpenBracket { ip }
            | VmError::OutOfMemory { ip, .. }
            | VmError::PointerUnderflow { ip }
            | VmError::Io { ip, .. } => Some(*ip),
            VmError::NoProgramLoaded
            | VmError::ProgramAlreadyLoaded
            | VmError::InvalidMemorySize
            | VmError::Open { .. }
            | VmError::Stream { .. } => None,
        }
    }
}
