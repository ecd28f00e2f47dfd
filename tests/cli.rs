use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const INPUT: &str = "2024-10-15: Event 1\nNot a date\n2024-10-16: Event 2\n2024-01-05: Event 3\n";

fn datepipe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_datepipe"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_input(dir: &Path) -> String {
    let path = dir.join("input.data");
    fs::write(&path, INPUT).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_default_pipeline_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let out = datepipe(&[&input]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "October 15, 2024: Event 1\nOctober 16, 2024: Event 2\nJanuary 05, 2024: Event 3\n"
    );
}

#[test]
fn test_days_and_formats() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let out = datepipe(&[&input, "--days", "Tuesday,Friday", "-f", "%d/%m/%Y"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "15/10/2024: Event 1\n05/01/2024: Event 3\n"
    );
}

#[test]
fn test_pipeline_file_and_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let pipe = dir.path().join("wednesday.pipe");
    fs::write(&pipe, "PIPE EXTRACT\n| WEEKDAY Wednesday\n| FORMAT \"%A %Y-%m-%d\"\n?\n").unwrap();
    let output = dir.path().join("nested/out.data");

    let out = datepipe(&[
        &input,
        "-p",
        pipe.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Wednesday 2024-10-16: Event 2"
    );
}

#[test]
fn test_stdin_input_with_verbose_counts() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_datepipe"))
        .args(["-", "-v"])
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(INPUT.as_bytes())
        .unwrap();
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Stages:   EXTRACT | FORMAT"), "{stderr}");
    assert!(stderr.contains("Records:  4 in -> 3 out"), "{stderr}");
}

#[test]
fn test_invalid_pattern_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let out = datepipe(&[&input, "-i", "%Y-%"]);
    assert!(!out.status.success());
    assert!(
        String::from_utf8(out.stderr)
            .unwrap()
            .contains("invalid date pattern '%Y-%'")
    );
}

#[test]
fn test_mismatched_pipeline_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let pipe = dir.path().join("bad.pipe");
    fs::write(&pipe, "PIPE FORMAT\n| EXTRACT\n").unwrap();

    let out = datepipe(&[&input, "--pipeline", pipe.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(
        String::from_utf8(out.stderr)
            .unwrap()
            .contains("FORMAT expects records but received lines")
    );
}

#[test]
fn test_missing_input_file() {
    let out = datepipe(&["/nonexistent/input.data"]);
    assert!(!out.status.success());
    assert!(
        String::from_utf8(out.stderr)
            .unwrap()
            .contains("Error reading input file")
    );
}

#[test]
fn test_lowercase_day_flag_warns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let out = datepipe(&[&input, "-d", "monday,Tuesday"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "October 15, 2024: Event 1\n"
    );
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("will never match"), "{stderr}");
    assert!(stderr.contains("monday"), "{stderr}");
    assert!(!stderr.contains("Tuesday"), "{stderr}");
}

#[test]
fn test_output_file_in_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("a/b/out.data");

    let out = datepipe(&[&input, "-d", "Friday", "-o", output.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "January 05, 2024: Event 3"
    );
}
