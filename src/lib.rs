//! A small Brainfuck virtual machine.
//!
//! The machine runs a program on a fixed tape of `u8` cells (30,000 by
//! default) with a single memory pointer.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; `+` and `-` wrap modulo 256.
//! - Strict pointer bounds: `<` from cell 0 is a [`VmError::PointerUnderflow`],
//!   `>` past the end of the tape is a [`VmError::OutOfMemory`].
//! - Input `,` reads a single byte; on end of input the cell is left unchanged.
//! - Output `.` writes the byte at the current cell as-is.
//! - Brackets are resolved once at load time; unmatched brackets are errors.
//! - Characters outside `><+-.,[]` are ignored.
//! - Streams the engine opens itself are closed by the engine; standard and
//!   borrowed streams never are.
//!
//! Quick start:
//!
//! ```no_run
//! use bf_vm::Engine;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = concat!(
//!     "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.",
//!     "<<+++++++++++++++.>.+++.------.--------.>+.>.",
//! );
//! let mut vm = Engine::default();
//! vm.execute(code).expect("program should run");
//! ```

pub mod brackets;
pub mod cli_util;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod stream;
pub mod trace;

pub use brackets::JumpTable;
pub use config::VmConfig;
pub use engine::{Engine, DEFAULT_MEMORY_SIZE};
pub use error::VmError;
pub use instruction::Instruction;
pub use stream::{Input, Output, Ownership};
pub use trace::Trace;
