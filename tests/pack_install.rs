use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn run_nws_in(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_nws"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .stdin(Stdio::null())
        .output()
        .expect("failed to execute nws")
}

#[test]
fn installs_claude_pack_into_local_skills() {
    let tmp = tempdir().expect("tempdir");
    let output = run_nws_in(
        tmp.path(),
        &["pack", "install", "--target", "claude", "--scope", "local"],
    );
    assert!(
        output.status.success(),
        "pack install failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Installed nws-workspace (claude) to local."));

    let skill = tmp.path().join(".claude/skills/nws-plan/SKILL.md");
    assert!(skill.exists(), "expected {} to exist", skill.display());
    let content = fs::read_to_string(&skill).expect("read skill");
    assert!(content.starts_with("---\n"));
    assert!(content.contains("name: \"nws-plan\""));
    assert!(content.contains("user-invocable: true"));
    assert!(content.contains("nws plan"));
}

#[test]
fn installs_opencode_pack_without_frontmatter() {
    let tmp = tempdir().expect("tempdir");
    let output = run_nws_in(
        tmp.path(),
        &["pack", "install", "--target", "opencode", "--scope", "local"],
    );
    assert!(output.status.success());

    let command_file = tmp.path().join(".opencode/commands/nws-plan.md");
    let content = fs::read_to_string(&command_file).expect("read command");
    assert!(!content.starts_with("---"));
    assert!(content.contains("nws plan"));
}

#[test]
fn reinstall_is_idempotent_but_respects_operator_edits() {
    let tmp = tempdir().expect("tempdir");
    let args = ["pack", "install", "--target", "opencode", "--scope", "local"];

    assert!(run_nws_in(tmp.path(), &args).status.success());
    // Unchanged files reinstall freely.
    assert!(run_nws_in(tmp.path(), &args).status.success());

    let command_file = tmp.path().join(".opencode/commands/nws-plan.md");
    fs::write(&command_file, "operator edits").expect("write edit");

    let output = run_nws_in(tmp.path(), &args);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Use --force to overwrite."));
    assert_eq!(
        fs::read_to_string(&command_file).expect("read back"),
        "operator edits"
    );

    let force_args = [
        "pack", "install", "--target", "opencode", "--scope", "local", "--force",
    ];
    assert!(run_nws_in(tmp.path(), &force_args).status.success());
    assert!(fs::read_to_string(&command_file)
        .expect("read back")
        .contains("nws plan"));
}

#[test]
fn json_mode_reports_installed_paths() {
    let tmp = tempdir().expect("tempdir");
    let output = run_nws_in(
        tmp.path(),
        &[
            "pack", "install", "--target", "claude", "--scope", "local", "--json",
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("parse JSON output");
    assert_eq!(value["command"], "pack install");
    assert_eq!(value["status"], "ok");
    let paths = value["installed_paths"].as_array().expect("paths array");
    assert_eq!(paths.len(), 3);
    for path in paths {
        assert!(path.as_str().unwrap().contains(".claude"));
    }
}
