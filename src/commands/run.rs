use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::cli_util::{print_error, print_vm_error};
use crate::{Engine, VmConfig};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// File with the Brainfuck program to run
    #[arg(value_name = "PROGRAM")]
    pub code: PathBuf,

    /// File to serve as input for `,` (default: stdin; `-` also means stdin)
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// File to write program output to (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of memory cells (fallback BF_MEMORY_SIZE, then bf.toml; default 30000)
    #[arg(short = 'm', long = "memory", value_name = "CELLS")]
    pub memory: Option<usize>,

    /// Print a step-by-step table of operations to stderr while executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

/// Load the program file, build an engine from the resolved configuration
/// and run it. Returns the process exit code.
pub fn run(program: &str, args: RunArgs) -> i32 {
    let RunArgs {
        code,
        input,
        output,
        memory,
        debug,
    } = args;

    let code_str = match fs::read_to_string(&code) {
        Ok(s) => s,
        Err(e) => {
            print_error(
                program,
                &format!("failed to read program file {} as UTF-8: {e}", code.display()),
            );
            return 1;
        }
    };

    let config = VmConfig::resolve(memory, input, output, debug);
    let engine = match Engine::from_config(&config) {
        Ok(engine) => engine,
        Err(err) => {
            print_vm_error(Some(program), &code_str, &err);
            return 1;
        }
    };

    let result = engine.scoped(|vm| {
        vm.load(&code_str)?;
        vm.run()
    });

    match result {
        Ok(()) => 0,
        Err(err) => {
            print_vm_error(Some(program), &code_str, &err);
            1
        }
    }
}
