use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("los-explain").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn explain_help_lists_fractions() {
    let mut cmd = Command::cargo_bin("los-explain").expect("binary exists");
    let output = cmd.args(["explain", "--help"]).output().expect("runs");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--fractions"));
}

#[test]
fn missing_label_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.csv");
    std::fs::write(&input, "text,outcome\nfever,1\n").unwrap();
    let mut cmd = Command::cargo_bin("los-explain").expect("binary exists");
    cmd.env("OUTPUTS_DIR", dir.path().join("out"))
        .args(["focus", "--input"])
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn reason_help_describes_selection() {
    let mut cmd = Command::cargo_bin("los-explain").expect("binary exists");
    let output = cmd.args(["reason", "--help"]).output().expect("runs");
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("Which held-out notes to reason about"));
}
