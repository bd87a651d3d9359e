//! The Brainfuck execution engine.
//!
//! An [`Engine`] owns a fixed-size tape of `u8` cells, a memory pointer and
//! one input/output stream pair. Programs go through an explicit
//! `Unloaded -> Loaded -> Unloaded` cycle: [`Engine::load`] resolves
//! brackets and stores the program, [`Engine::step`] runs one instruction,
//! and [`Engine::run`] steps until the end and unloads.
//!
//! ```
//! use bf_vm::{Engine, Input, Output};
//!
//! let mut out = Vec::new();
//! let mut engine = Engine::with_streams(
//!     16,
//!     Input::owned(&b"A"[..], "bytes"),
//!     Output::borrowed(&mut out),
//! )?;
//! engine.execute(",.++.")?;
//! drop(engine);
//! assert_eq!(out, b"AC");
//! # Ok::<(), bf_vm::VmError>(())
//! ```

use std::mem;
use std::path::Path;

use crate::brackets::{self, JumpTable};
use crate::config::VmConfig;
use crate::error::VmError;
use crate::instruction::{decode_program, Instruction};
use crate::stream::{release_input, release_output, Input, Output, Ownership};
use crate::trace::{Action, Trace, TraceRow};

/// Tape length used when none is configured.
pub const DEFAULT_MEMORY_SIZE: usize = 30_000;

#[derive(Debug)]
struct LoadedProgram {
    instructions: Vec<Instruction>,
    jumps: JumpTable,
    ip: usize,
}

#[derive(Debug)]
enum LoadState {
    Unloaded,
    Loaded(LoadedProgram),
}

/// A Brainfuck virtual machine.
#[derive(Debug)]
pub struct Engine<'io> {
    memory: Vec<u8>,
    pointer: usize,
    state: LoadState,
    input: Input<'io>,
    output: Output<'io>,
    trace: Option<Trace<'io>>,
}

impl Default for Engine<'_> {
    fn default() -> Self {
        Self {
            memory: vec![0; DEFAULT_MEMORY_SIZE],
            pointer: 0,
            state: LoadState::Unloaded,
            input: Input::stdin(),
            output: Output::stdout(),
            trace: None,
        }
    }
}

impl<'io> Engine<'io> {
    /// Create an engine with `memory_size` zeroed cells wired to the process
    /// stdin and stdout.
    pub fn new(memory_size: usize) -> Result<Self, VmError> {
        Self::with_streams(memory_size, Input::stdin(), Output::stdout())
    }

    /// Create an engine with explicit streams.
    pub fn with_streams(
        memory_size: usize,
        input: Input<'io>,
        output: Output<'io>,
    ) -> Result<Self, VmError> {
        if memory_size == 0 {
            return Err(VmError::InvalidMemorySize);
        }
        Ok(Self {
            memory: vec![0; memory_size],
            pointer: 0,
            state: LoadState::Unloaded,
            input,
            output,
            trace: None,
        })
    }

    /// Build an engine from resolved configuration, opening any input or
    /// output paths as engine-owned streams.
    pub fn from_config(config: &VmConfig) -> Result<Self, VmError> {
        let mut engine = Self::new(config.memory_size)?;
        if let Some(path) = config.input.as_deref() {
            engine.open_input(path)?;
        }
        if let Some(path) = config.output.as_deref() {
            engine.open_output(path)?;
        }
        if config.debug {
            engine.set_trace(Trace::stderr());
        }
        Ok(engine)
    }

    pub fn memory_size(&self) -> usize {
        self.memory.len()
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Current memory pointer. May equal [`Engine::memory_size`] after a
    /// `>` from the last cell.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Current instruction pointer, or `None` when no program is loaded.
    pub fn instruction_pointer(&self) -> Option<usize> {
        match &self.state {
            LoadState::Loaded(loaded) => Some(loaded.ip),
            LoadState::Unloaded => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    pub fn input_ownership(&self) -> Ownership {
        self.input.ownership()
    }

    pub fn output_ownership(&self) -> Ownership {
        self.output.ownership()
    }

    /// Attach a step trace.
    pub fn set_trace(&mut self, trace: Trace<'io>) {
        self.trace = Some(trace);
    }

    /// Detach and return the step trace, if any.
    pub fn take_trace(&mut self) -> Option<Trace<'io>> {
        self.trace.take()
    }

    /// Replace the input stream. An engine-owned previous input is closed;
    /// standard and borrowed inputs are left open.
    pub fn set_input(&mut self, input: Input<'io>) {
        let previous = mem::replace(&mut self.input, input);
        release_input(previous);
    }

    /// Replace the output stream. The previous output is flushed, and closed
    /// if the engine owned it.
    pub fn set_output(&mut self, output: Output<'io>) -> Result<(), VmError> {
        let previous = mem::replace(&mut self.output, output);
        release_output(previous)?;
        Ok(())
    }

    /// Open `path` for reading and make it the engine-owned input.
    pub fn open_input(&mut self, path: &Path) -> Result<(), VmError> {
        let input = Input::open(path).map_err(|source| VmError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.set_input(input);
        Ok(())
    }

    /// Create `path` for writing and make it the engine-owned output.
    pub fn open_output(&mut self, path: &Path) -> Result<(), VmError> {
        let output = Output::create(path).map_err(|source| VmError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.set_output(output)
    }

    /// Release both streams, falling back to the process standard streams.
    pub fn release_streams(&mut self) -> Result<(), VmError> {
        self.set_input(Input::stdin());
        let released = self.set_output(Output::stdout());
        if let Some(trace) = self.trace.as_mut() {
            trace.flush()?;
        }
        released
    }

    /// Load a program: decode it, resolve its brackets and set the
    /// instruction pointer to 0.
    pub fn load(&mut self, code: &str) -> Result<(), VmError> {
        if self.is_loaded() {
            return Err(VmError::ProgramAlreadyLoaded);
        }
        let instructions = decode_program(code);
        let jumps = brackets::resolve(&instructions)?;
        self.state = LoadState::Loaded(LoadedProgram {
            instructions,
            jumps,
            ip: 0,
        });
        Ok(())
    }

    /// Drop the loaded program. Tape contents and streams are kept.
    pub fn unload(&mut self) {
        self.state = LoadState::Unloaded;
    }

    /// Unload and zero the tape.
    pub fn reset(&mut self) {
        self.unload();
        self.memory.fill(0);
        self.pointer = 0;
    }

    /// Execute one instruction.
    ///
    /// Returns `Ok(true)` while instructions remain and `Ok(false)` once the
    /// instruction pointer has moved past the end of the program.
    pub fn step(&mut self) -> Result<bool, VmError> {
        let LoadState::Loaded(loaded) = &mut self.state else {
            return Err(VmError::NoProgramLoaded);
        };
        let ip = loaded.ip;
        let Some(&instr) = loaded.instructions.get(ip) else {
            return Ok(false);
        };

        let ptr_before = self.pointer;
        let cell_before = self.memory.get(ptr_before).copied();
        if instr.touches_cell() && cell_before.is_none() {
            return Err(VmError::OutOfMemory { ip, ptr: ptr_before });
        }

        let action = match instr {
            Instruction::Right => {
                if self.pointer == self.memory.len() {
                    return Err(VmError::OutOfMemory { ip, ptr: self.pointer });
                }
                self.pointer += 1;
                Action::MovedPointer { to: self.pointer }
            }
            Instruction::Left => {
                if self.pointer == 0 {
                    return Err(VmError::PointerUnderflow { ip });
                }
                self.pointer -= 1;
                Action::MovedPointer { to: self.pointer }
            }
            Instruction::Inc => {
                let cell = &mut self.memory[self.pointer];
                let from = *cell;
                *cell = from.wrapping_add(1);
                Action::Increment { ptr: self.pointer, from, to: *cell }
            }
            Instruction::Dec => {
                let cell = &mut self.memory[self.pointer];
                let from = *cell;
                *cell = from.wrapping_sub(1);
                Action::Decrement { ptr: self.pointer, from, to: *cell }
            }
            Instruction::Output => {
                let byte = self.memory[self.pointer];
                self.output
                    .write_byte(byte)
                    .map_err(|source| VmError::Io { ip, source })?;
                Action::Wrote(byte)
            }
            Instruction::Input => {
                // Make pending output (e.g. a prompt) visible before blocking.
                self.output
                    .flush()
                    .map_err(|source| VmError::Io { ip, source })?;
                match self
                    .input
                    .read_byte()
                    .map_err(|source| VmError::Io { ip, source })?
                {
                    Some(byte) => {
                        self.memory[self.pointer] = byte;
                        Action::Read(byte)
                    }
                    None => Action::EndOfInput,
                }
            }
            Instruction::LoopStart => {
                if self.memory[self.pointer] == 0 {
                    let close = loaded
                        .jumps
                        .close_of(ip)
                        .ok_or(VmError::UnmatchedOpenBracket { ip })?;
                    loaded.ip = close;
                    Action::JumpForward { to: close }
                } else {
                    Action::EnterLoop
                }
            }
            Instruction::LoopEnd => {
                if self.memory[self.pointer] != 0 {
                    let open = loaded
                        .jumps
                        .open_of(ip)
                        .ok_or(VmError::UnmatchedCloseBracket { ip })?;
                    loaded.ip = open;
                    Action::JumpBack { to: open }
                } else {
                    Action::ExitLoop
                }
            }
            Instruction::Nop(_) => Action::Nop,
        };

        // Jumps land on the matching bracket; this moves past it.
        loaded.ip += 1;
        let running = loaded.ip < loaded.instructions.len();

        if let Some(trace) = self.trace.as_mut() {
            trace.record(&TraceRow {
                ip,
                ptr: ptr_before,
                cell: cell_before,
                instr,
                action,
            })?;
        }

        Ok(running)
    }

    /// Step until the program ends, then unload it and flush output.
    ///
    /// On error the program stays loaded so the instruction pointer and tape
    /// can be inspected; call [`Engine::unload`] before loading another.
    pub fn run(&mut self) -> Result<(), VmError> {
        while self.step()? {}
        self.unload();
        self.output.flush()?;
        Ok(())
    }

    /// Load and run `code`, unloading on both success and failure.
    pub fn execute(&mut self, code: &str) -> Result<(), VmError> {
        self.load(code)?;
        let result = self.run();
        self.unload();
        result
    }

    /// Run `f` against the engine, then unload any program and release the
    /// streams no matter how `f` returned. Errors from `f` win over errors
    /// from releasing.
    pub fn scoped<T, F>(mut self, f: F) -> Result<T, VmError>
    where
        F: FnOnce(&mut Engine<'io>) -> Result<T, VmError>,
    {
        let result = f(&mut self);
        self.unload();
        let released = self.release_streams();
        let value = result?;
        released?;
        Ok(value)
    }
}

impl Drop for Engine<'_> {
    fn drop(&mut self) {
        let _ = self.release_streams();
    }
}
