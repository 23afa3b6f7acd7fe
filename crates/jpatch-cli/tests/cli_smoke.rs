use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_tempfile(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create tempfile");
    write!(file, "{contents}").expect("write tempfile");
    file
}

fn jpatch() -> Command {
    Command::cargo_bin("jpatch").expect("binary jpatch should be built")
}

#[test]
fn help_succeeds() {
    jpatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--array-strategy"));
}

#[test]
fn version_prints_crate_version() {
    jpatch().arg("--version").assert().success().stdout(predicate::str::contains("jpatch 0.0.0"));
}

#[test]
fn diff_prints_patch_and_signals_difference() {
    let lhs = write_tempfile(r#"{"a":[0,1,2,3]}"#);
    let rhs = write_tempfile(r#"{"a":[1,2,4,"hi"]}"#);

    jpatch()
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stdout(concat!(
            r#"[{"op":"remove","path":"/a/0"},"#,
            r#"{"op":"replace","path":"/a/2","value":4},"#,
            r#"{"op":"add","path":"/a/3","value":"hi"}]"#,
            "\n",
        ))
        .stderr(predicate::str::is_empty());
}

#[test]
fn identical_inputs_exit_zero() {
    let lhs = write_tempfile(r#"{"a":1,"b":[true]}"#);
    let rhs = write_tempfile(r#"{"b":[true],"a":1.0}"#);

    jpatch().arg(lhs.path()).arg(rhs.path()).assert().code(0).stdout("[]\n");
}

#[test]
fn diff_single_argument_reads_stdin() {
    let lhs = write_tempfile(r#"{"foo":"bar"}"#);

    jpatch()
        .arg(lhs.path())
        .write_stdin(r#"{"foo":"bar","baz":"qux"}"#)
        .assert()
        .code(1)
        .stdout("[{\"op\":\"add\",\"path\":\"/baz\",\"value\":\"qux\"}]\n");
}

#[test]
fn test_guards_flag_adds_tests() {
    let lhs = write_tempfile(r#"{"a":1}"#);
    let rhs = write_tempfile(r#"{"a":2}"#);

    jpatch()
        .arg("--test-guards")
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stdout("[{\"op\":\"test\",\"path\":\"/a\",\"value\":1},{\"op\":\"replace\",\"path\":\"/a\",\"value\":2}]\n");
}

#[test]
fn replace_strategy_swaps_arrays() {
    let lhs = write_tempfile("[1,2,3]");
    let rhs = write_tempfile("[1,2]");

    jpatch()
        .args(["--array-strategy", "replace"])
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stdout("[{\"op\":\"replace\",\"path\":\"\",\"value\":[1,2]}]\n");
}

#[test]
fn patch_mode_applies_patch() {
    let patch = write_tempfile(r#"[{"op":"add","path":"/baz","value":"qux"}]"#);
    let doc = write_tempfile(r#"{"foo":"bar"}"#);

    jpatch()
        .arg("-p")
        .arg(patch.path())
        .arg(doc.path())
        .assert()
        .success()
        .stdout("{\"foo\":\"bar\",\"baz\":\"qux\"}\n");
}

#[test]
fn patch_mode_reads_document_from_stdin_and_writes_output_file() {
    let patch = write_tempfile(r#"[{"op":"remove","path":"/a/0"}]"#);
    let out = NamedTempFile::new().expect("create tempfile");

    jpatch()
        .arg("-p")
        .arg("--pretty")
        .arg("-o")
        .arg(out.path())
        .arg(patch.path())
        .write_stdin(r#"{"a":[1,2]}"#)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(out.path()).expect("output readable");
    assert_eq!(written, "{\n  \"a\": [\n    2\n  ]\n}\n");
}

#[test]
fn failing_patch_reports_operation_and_exits_two() {
    let patch = write_tempfile(r#"[{"op":"test","path":"/a","value":2}]"#);
    let doc = write_tempfile(r#"{"a":1}"#);

    jpatch()
        .arg("-p")
        .arg(patch.path())
        .arg(doc.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to apply patch"))
        .stderr(predicate::str::contains("operation 0 (test) failed"));
}

#[test]
fn malformed_input_exits_two() {
    let lhs = write_tempfile("{not json");
    let rhs = write_tempfile("{}");

    jpatch()
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse first input"));
}

#[test]
fn zero_lcs_limit_is_rejected() {
    let lhs = write_tempfile("[]");
    let rhs = write_tempfile("[]");

    jpatch()
        .args(["--lcs-limit", "0"])
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn large_integers_pass_through_unchanged() {
    let patch = write_tempfile("[]");
    let doc = write_tempfile(r#"{"id":12345678901234567891}"#);

    jpatch()
        .arg("-p")
        .arg(patch.path())
        .arg(doc.path())
        .assert()
        .success()
        .stdout("{\"id\":12345678901234567891}\n");

    let lhs = write_tempfile(r#"{"id":9007199254740993}"#);
    let rhs = write_tempfile(r#"{"id":9007199254740992}"#);
    jpatch()
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stdout("[{\"op\":\"replace\",\"path\":\"/id\",\"value\":9007199254740992}]\n");
}
