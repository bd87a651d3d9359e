use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use cross_xdg::BaseDirs;

use crate::engine::DEFAULT_MEMORY_SIZE;

/// Environment variable overriding the tape length.
pub const MEMORY_SIZE_ENV: &str = "BF_MEMORY_SIZE";
/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "BF_CONFIG";

/// Settings for one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    pub memory_size: usize,
    /// Input file; `None` (or `-`) means standard input.
    pub input: Option<PathBuf>,
    /// Output file; `None` (or `-`) means standard output.
    pub output: Option<PathBuf>,
    /// Write a step trace to stderr.
    pub debug: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            input: None,
            output: None,
            debug: false,
        }
    }
}

impl VmConfig {
    /// Resolve settings: flags -> environment -> config file -> defaults.
    pub fn resolve(
        memory_flag: Option<usize>,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        debug: bool,
    ) -> Self {
        let env_memory = env::var(MEMORY_SIZE_ENV).ok();
        let memory_size = pick_memory_size(memory_flag, env_memory.as_deref(), || {
            file_config().memory_size
        });
        Self {
            memory_size,
            input,
            output,
            debug,
        }
    }
}

/// Values read from `bf.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub memory_size: Option<usize>,
}

/// Pick the tape length. An explicit flag is used as given, even when it is
/// invalid, so the engine can reject it. Unusable environment or file values
/// are skipped.
pub fn pick_memory_size<F>(flag: Option<usize>, env_value: Option<&str>, file_value: F) -> usize
where
    F: FnOnce() -> Option<usize>,
{
    if let Some(size) = flag {
        return size;
    }
    if let Some(size) = env_value.and_then(parse_size) {
        return size;
    }
    file_value()
        .filter(|&size| size > 0)
        .unwrap_or(DEFAULT_MEMORY_SIZE)
}

fn parse_size(value: &str) -> Option<usize> {
    let cleaned: String = value.trim().chars().filter(|&c| c != '_').collect();
    cleaned.parse::<usize>().ok().filter(|&size| size > 0)
}

static FILE_CONFIG: OnceLock<FileConfig> = OnceLock::new();

fn file_config() -> &'static FileConfig {
    FILE_CONFIG.get_or_init(|| {
        config_path()
            .and_then(|path| load_file_config(&path))
            .unwrap_or_default()
    })
}

/// `$BF_CONFIG` when set, otherwise `bf.toml` in the XDG config home.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

pub fn load_file_config(path: &Path) -> Option<FileConfig> {
    let content = fs::read_to_string(path).ok()?;
    Some(parse_file_config(&content))
}

/// Very small parser for the `[vm]` section: `key = value` pairs, quoted or
/// unquoted, `#` comments. Unknown keys and sections are ignored.
pub fn parse_file_config(content: &str) -> FileConfig {
    let mut cfg = FileConfig::default();
    let mut in_vm = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_vm = line[1..line.len() - 1].trim() == "vm";
            continue;
        }
        if !in_vm {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.split('#').next().unwrap_or_default().trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        if key.trim() == "memory_size" {
            cfg.memory_size = parse_size(value);
        }
    }

    cfg
}
