use std::process::Command;

#[test]
fn test_picket_version() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "picket", "--", "--version"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_picket_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "picket", "--", "--help"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("check"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_picket_check_allows_and_denies() {
    let dir = tempfile::tempdir().unwrap();
    let policy_path = dir.path().join("policy.toml");
    std::fs::write(
        &policy_path,
        r#"
allowed_tools = ["file_reader"]

[tool_rules.file_reader]
disallowed_extensions = [".yaml"]
allowed_paths = ["/data/public"]
"#,
    )
    .unwrap();
    let policy = policy_path.to_str().unwrap();

    let allow = Command::new("cargo")
        .args([
            "run", "--bin", "picket", "--", "check",
            "--policy", policy,
            "--tool", "file_reader",
            "--param", "path=/data/public/report.txt",
        ])
        .output()
        .unwrap();
    assert!(allow.status.success());
    assert!(String::from_utf8_lossy(&allow.stdout).contains("ALLOW"));

    let deny = Command::new("cargo")
        .args([
            "run", "--bin", "picket", "--", "check",
            "--policy", policy,
            "--tool", "file_reader",
            "--param", "path=/etc/shadow",
        ])
        .output()
        .unwrap();
    assert!(!deny.status.success());
    assert!(String::from_utf8_lossy(&deny.stdout).contains("DENY"));
}

#[test]
fn test_picket_check_missing_policy_fails_closed() {
    let output = Command::new("cargo")
        .args([
            "run", "--bin", "picket", "--", "check",
            "--policy", "/nonexistent/policy.toml",
            "--tool", "web_search",
            "--param", "query=anything",
        ])
        .output()
        .unwrap();

    // Empty fail-closed policy: every action is denied
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("DENY"));
}
