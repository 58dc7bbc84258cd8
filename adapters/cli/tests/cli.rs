use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_path-defence"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch path-defence")
}

#[test]
fn help_lists_tower_option() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--tower"), "help output: {stdout}");
    assert!(stdout.contains("--seed"), "help output: {stdout}");
}

#[test]
fn single_wave_run_prints_summary() {
    let output = run(&["--waves", "1", "--seed", "7", "--tower", "laser@2,6"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("wave 1 |"), "summary: {stdout}");
    assert!(stdout.contains("money "), "summary: {stdout}");
}

#[test]
fn malformed_tower_is_rejected() {
    let output = run(&["--tower", "laser@2"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected COLUMN,ROW"), "stderr: {stderr}");
}
