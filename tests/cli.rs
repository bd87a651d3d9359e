use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

/// The `bf` binary with user-level configuration shut out.
fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.timeout(Duration::from_secs(5))
        .env("BF_CONFIG", "/nonexistent/bf-vm-test/bf.toml")
        .env_remove("BF_MEMORY_SIZE");
    cmd
}

fn program_file(code: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", code).unwrap();
    tf
}

#[test]
fn test_increment_then_output_writes_raw_byte() {
    let tf = program_file("++.");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{2}")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_reads_from_stdin_and_echoes_byte() {
    let tf = program_file(",.");
    cargo_bin()
        .arg(tf.path())
        .write_stdin("A")
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn test_input_file_flag() {
    let tf = program_file(",[.,]");
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(b"hi\0").unwrap();
    cargo_bin()
        .arg(tf.path())
        .arg("--input")
        .arg(input.path())
        .assert()
        .success()
        .stdout("hi");
}

#[test]
fn test_dash_input_means_stdin() {
    let tf = program_file(",.");
    cargo_bin()
        .arg(tf.path())
        .arg("-i")
        .arg("-")
        .write_stdin("Z")
        .assert()
        .success()
        .stdout("Z");
}

#[test]
fn test_output_file_flag() {
    let tf = program_file("++++++++[>++++++++<-]>+.");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    cargo_bin()
        .arg(tf.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(std::fs::read(&out).unwrap(), b"A");
}

#[test]
fn test_unmatched_close_bracket_reports_position() {
    let tf = program_file("+]");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket ']'"))
        .stderr(predicate::str::contains("at instruction 1"));
}

#[test]
fn test_unmatched_open_bracket_runs_nothing() {
    let tf = program_file("+.[");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unmatched bracket '['"));
}

#[test]
fn test_memory_flag_bounds_the_tape() {
    let tf = program_file(">>>");
    cargo_bin()
        .arg(tf.path())
        .arg("-m")
        .arg("2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of memory"))
        .stderr(predicate::str::contains("at instruction 2"));
}

#[test]
fn test_pointer_underflow() {
    let tf = program_file("<");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("left of cell 0"));
}

#[test]
fn test_zero_memory_is_rejected() {
    let tf = program_file("+");
    cargo_bin()
        .arg(tf.path())
        .arg("--memory")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one cell"));
}

#[test]
fn test_memory_size_from_env() {
    let tf = program_file(">>");
    cargo_bin()
        .env("BF_MEMORY_SIZE", "1")
        .arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of memory"));
}

#[test]
fn test_memory_size_from_config_file_and_flag_override() {
    let tf = program_file(">>");
    let config = program_file("[vm]\nmemory_size = 1\n");

    cargo_bin()
        .env("BF_CONFIG", config.path())
        .arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of memory"));

    cargo_bin()
        .env("BF_CONFIG", config.path())
        .arg(tf.path())
        .arg("-m")
        .arg("4")
        .assert()
        .success();
}

#[test]
fn test_missing_program_file() {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin()
        .arg(dir.path().join("nope.bf"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read program file"));
}

#[test]
fn test_missing_input_file() {
    let tf = program_file(",.");
    let dir = tempfile::tempdir().unwrap();
    cargo_bin()
        .arg(tf.path())
        .arg("--input")
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to open"))
        .stderr(predicate::str::contains("absent.txt"));
}

#[test]
fn test_unwritable_output_file_names_the_path() {
    let tf = program_file("+.");
    let dir = tempfile::tempdir().unwrap();
    cargo_bin()
        .arg(tf.path())
        .arg("--output")
        .arg(dir.path().join("no-such-dir").join("out.bin"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to open"))
        .stderr(predicate::str::contains("out.bin"));
}

#[cfg(unix)]
#[test]
fn test_ctrl_c_keeps_output_already_written_to_file() {
    use std::process::Stdio;
    use std::thread::sleep;
    use std::time::Instant;

    // Writes 'A', then spins forever on a nonzero cell.
    let tf = program_file("++++++++[>++++++++<-]>+.[]");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.bin");

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("bf"))
        .env("BF_CONFIG", "/nonexistent/bf-vm-test/bf.toml")
        .env_remove("BF_MEMORY_SIZE")
        .arg(tf.path())
        .arg("-o")
        .arg(&out)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn bf");

    let deadline = Instant::now() + Duration::from_secs(5);
    while std::fs::read(&out).map(|b| b.is_empty()).unwrap_or(true) {
        assert!(Instant::now() < deadline, "program never wrote its byte");
        sleep(Duration::from_millis(20));
    }

    let killed = std::process::Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .expect("run kill");
    assert!(killed.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("bf did not exit after SIGINT");
        }
        sleep(Duration::from_millis(20));
    };

    assert_eq!(status.code(), Some(130));
    assert_eq!(std::fs::read(&out).unwrap(), b"A");
}

#[test]
fn test_debug_trace_goes_to_stderr() {
    let tf = program_file("+.");
    cargo_bin()
        .arg(tf.path())
        .arg("--debug")
        .assert()
        .success()
        .stdout("\u{1}")
        .stderr(predicate::str::contains("STEP | IP"))
        .stderr(predicate::str::contains("Increment cell[0] from 0 to 1"));
}

#[test]
fn test_program_argument_is_required() {
    cargo_bin().assert().failure().code(2);
}
