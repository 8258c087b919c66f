use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cal() -> Command {
    Command::cargo_bin("cal").expect("binary exists")
}

#[test]
fn writes_integer_result_next_to_identity_suffix() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("input.txt");
    fs::write(&input_path, "3 + 4 * 2\n").expect("write input");
    let out_dir = dir.path().join("out");

    cal()
        .arg(&input_path)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed '").and(predicate::str::contains("input_john_doe_98765.txt")));

    let output = fs::read_to_string(out_dir.join("input_john_doe_98765.txt")).expect("read output");
    assert_eq!(output, "11\n");
}

#[test]
fn collapses_integral_float_results() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("power.txt");
    fs::write(&input_path, "2 ** 3 ** 2").expect("write input");

    cal()
        .arg(&input_path)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success();

    let output = fs::read_to_string(dir.path().join("power_john_doe_98765.txt")).expect("read output");
    assert_eq!(output, "512\n");
}

#[test]
fn reports_division_by_zero_position() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("div.txt");
    fs::write(&input_path, "10 / 0").expect("write input");

    cal()
        .arg(&input_path)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error at pos 4: Integer division by zero."));

    let output = fs::read_to_string(dir.path().join("div_john_doe_98765.txt")).expect("read output");
    assert_eq!(output, "ERROR:4\n");
}

#[test]
fn custom_identity_changes_output_name() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("expr.txt");
    fs::write(&input_path, "-3.5 * 2 # negative").expect("write input");

    cal()
        .arg(&input_path)
        .arg("--output-dir")
        .arg(dir.path())
        .args(["--name", "ada", "--lastname", "lovelace", "--student-id", "1815"])
        .assert()
        .success();

    let output = fs::read_to_string(dir.path().join("expr_ada_lovelace_1815.txt")).expect("read output");
    assert_eq!(output, "-7\n");
}

#[test]
fn processes_directories_and_fails_if_any_expression_fails() {
    let dir = tempdir().expect("tempdir");
    let inputs = dir.path().join("inputs");
    fs::create_dir_all(&inputs).expect("create inputs");
    fs::write(inputs.join("good.txt"), "1 + # comment\n2").expect("write input");
    fs::write(inputs.join("bad.txt"), "(1 + 2").expect("write input");
    let out_dir = dir.path().join("results");

    cal()
        .arg(&inputs)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .failure();

    assert_eq!(
        fs::read_to_string(out_dir.join("good_john_doe_98765.txt")).expect("read good"),
        "3\n"
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("bad_john_doe_98765.txt")).expect("read bad"),
        "ERROR:7\n"
    );
}

#[test]
fn evaluates_stdin_when_no_input_given() {
    cal()
        .write_stdin("1 / 3.0")
        .assert()
        .success()
        .stdout("0.333333333333333\n");
}

#[test]
fn reports_missing_input_file() {
    let dir = tempdir().expect("tempdir");

    cal()
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"));
}

#[test]
fn accepts_non_utf8_comment_bytes_and_keeps_processing_the_batch() {
    let dir = tempdir().expect("tempdir");
    let inputs = dir.path().join("batch");
    fs::create_dir_all(&inputs).expect("create inputs");
    fs::write(inputs.join("a.txt"), b"1 + 2 # caf\xe9\n").expect("write input");
    fs::write(inputs.join("b.txt"), "3 * 4").expect("write input");
    let out_dir = dir.path().join("bout");

    cal()
        .arg(&inputs)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out_dir.join("a_john_doe_98765.txt")).expect("read a"),
        "3\n"
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("b_john_doe_98765.txt")).expect("read b"),
        "12\n"
    );
}

#[test]
fn unreadable_input_does_not_stop_later_inputs() {
    let dir = tempdir().expect("tempdir");
    let good = dir.path().join("good.txt");
    fs::write(&good, "2 ** 10").expect("write input");

    cal()
        .arg(dir.path().join("missing.txt"))
        .arg(&good)
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"));

    assert_eq!(
        fs::read_to_string(dir.path().join("out").join("good_john_doe_98765.txt")).expect("read good"),
        "1024\n"
    );
}

#[test]
fn same_stem_from_two_directories_is_not_overwritten() {
    let dir = tempdir().expect("tempdir");
    let first = dir.path().join("one");
    let second = dir.path().join("two");
    fs::create_dir_all(&first).expect("create one");
    fs::create_dir_all(&second).expect("create two");
    fs::write(first.join("expr.txt"), "1 + 1").expect("write input");
    fs::write(second.join("expr.txt"), "5 * 5").expect("write input");
    let out_dir = dir.path().join("out");

    cal()
        .arg(first.join("expr.txt"))
        .arg(second.join("expr.txt"))
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already written by an earlier input"));

    assert_eq!(
        fs::read_to_string(out_dir.join("expr_john_doe_98765.txt")).expect("read output"),
        "2\n"
    );
}

#[test]
fn deeply_nested_file_reports_error_instead_of_aborting() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("deep.txt");
    fs::write(&input_path, format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000)))
        .expect("write input");

    cal()
        .arg(&input_path)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Expression nested too deeply."));

    let output = fs::read_to_string(dir.path().join("deep_john_doe_98765.txt")).expect("read output");
    assert_eq!(output, "ERROR:257\n");
}
