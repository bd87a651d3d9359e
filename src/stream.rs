//! Input and output streams with explicit ownership.
//!
//! The engine only ever releases streams it owns. Process standard streams
//! and streams borrowed from the caller are left open no matter how the run
//! ends.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

/// Who is responsible for closing a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Process stdin/stdout. Never closed by the engine.
    Standard,
    /// Lent by the caller for the engine's lifetime. Never closed by the engine.
    Borrowed,
    /// Opened by (or handed over to) the engine. Closed on replacement or drop.
    Owned,
}

/// Source for the `,` instruction.
pub enum Input<'io> {
    Stdin(io::Stdin),
    Borrowed(&'io mut dyn Read),
    Owned {
        reader: Box<dyn Read + 'io>,
        label: String,
    },
}

impl<'io> Input<'io> {
    pub fn stdin() -> Self {
        Input::Stdin(io::stdin())
    }

    pub fn borrowed(reader: &'io mut dyn Read) -> Self {
        Input::Borrowed(reader)
    }

    /// Hand a reader over to the engine; it is dropped when released.
    pub fn owned<R: Read + 'io>(reader: R, label: impl Into<String>) -> Self {
        Input::Owned {
            reader: Box::new(reader),
            label: label.into(),
        }
    }

    /// Open a file as an engine-owned input. `-` selects standard input.
    pub fn open(path: &Path) -> io::Result<Self> {
        if path == Path::new("-") {
            return Ok(Input::stdin());
        }
        let file = File::open(path)?;
        Ok(Input::owned(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }

    pub fn ownership(&self) -> Ownership {
        match self {
            Input::Stdin(_) => Ownership::Standard,
            Input::Borrowed(_) => Ownership::Borrowed,
            Input::Owned { .. } => Ownership::Owned,
        }
    }

    /// Read one byte. `Ok(None)` means end of input.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            let read = match self {
                Input::Stdin(stdin) => stdin.read(&mut buf),
                Input::Borrowed(reader) => reader.read(&mut buf),
                Input::Owned { reader, .. } => reader.read(&mut buf),
            };
            match read {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin(_) => write!(f, "Input::Stdin"),
            Input::Borrowed(_) => write!(f, "Input::Borrowed"),
            Input::Owned { label, .. } => write!(f, "Input::Owned({label})"),
        }
    }
}

/// Sink for the `.` instruction.
pub enum Output<'io> {
    Stdout(io::Stdout),
    Borrowed(&'io mut dyn Write),
    Owned {
        writer: Box<dyn Write + 'io>,
        label: String,
    },
}

impl<'io> Output<'io> {
    pub fn stdout() -> Self {
        Output::Stdout(io::stdout())
    }

    pub fn borrowed(writer: &'io mut dyn Write) -> Self {
        Output::Borrowed(writer)
    }

    /// Hand a writer over to the engine; it is flushed and dropped when released.
    pub fn owned<W: Write + 'io>(writer: W, label: impl Into<String>) -> Self {
        Output::Owned {
            writer: Box::new(writer),
            label: label.into(),
        }
    }

    /// Create (or truncate) a file as an engine-owned output. `-` selects
    /// standard output.
    ///
    /// The file is written unbuffered: every `.` reaches it immediately, so
    /// nothing is lost if the process is killed mid-run.
    pub fn create(path: &Path) -> io::Result<Self> {
        if path == Path::new("-") {
            return Ok(Output::stdout());
        }
        let file = File::create(path)?;
        Ok(Output::owned(file, path.display().to_string()))
    }

    pub fn ownership(&self) -> Ownership {
        match self {
            Output::Stdout(_) => Ownership::Standard,
            Output::Borrowed(_) => Ownership::Borrowed,
            Output::Owned { .. } => Ownership::Owned,
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.writer().write_all(&[byte])
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer().flush()
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Output::Stdout(stdout) => stdout,
            Output::Borrowed(writer) => &mut **writer,
            Output::Owned { writer, .. } => writer.as_mut(),
        }
    }
}

impl fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout(_) => write!(f, "Output::Stdout"),
            Output::Borrowed(_) => write!(f, "Output::Borrowed"),
            Output::Owned { label, .. } => write!(f, "Output::Owned({label})"),
        }
    }
}

/// Release an input that is being replaced or going out of scope.
pub(crate) fn release_input(input: Input<'_>) {
    // Owned readers close on drop; the other kinds are left untouched.
    drop(input);
}

/// Release an output that is being replaced or going out of scope.
///
/// Every kind is flushed so buffered program output is not lost. Only
/// owned writers are dropped (and so closed) afterwards.
pub(crate) fn release_output(mut output: Output<'_>) -> io::Result<()> {
    let flushed = output.flush();
    drop(output);
    flushed
}
