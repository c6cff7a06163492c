use std::{fs, process::Command};

fn netbattle() -> Command {
    Command::new(env!("CARGO_BIN_EXE_netbattle"))
}

#[test]
fn json_run_reports_each_battle() {
    let output = netbattle()
        .args(["--seed", "9", "--battles", "2", "--json"])
        .output()
        .expect("failed to run netbattle");
    assert!(output.status.success(), "netbattle exited with {:?}", output.status);

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON summary");
    let battles = summary["battles"].as_array().expect("battles array");
    assert!(battles.len() <= 2);
    for battle in battles {
        assert!(battle["outcome"] == "won" || battle["outcome"] == "lost");
    }
    assert!(summary["folder"].as_array().expect("folder").len() >= 3);
}

#[test]
fn unknown_folder_chip_is_an_error() {
    let output = netbattle()
        .args(["--folder", "Cannon,NotAChip"])
        .output()
        .expect("failed to run netbattle");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NotAChip"), "stderr: {stderr}");
}

#[test]
fn malformed_chip_library_is_an_error() {
    let path =
        std::env::temp_dir().join(format!("netbattle-bad-chips-{}.toml", std::process::id()));
    fs::write(&path, "[[chip]]\nname = ").expect("write temp library");
    let output = netbattle()
        .arg("--chips")
        .arg(&path)
        .output()
        .expect("failed to run netbattle");
    let _ = fs::remove_file(&path);
    assert!(!output.status.success());
}
