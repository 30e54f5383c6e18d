use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn patchsim_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("patchsim");
    path
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Builds an input tree with three bugs:
/// - `bitcount` and `gcd` share identical original and patch text
/// - `bitcount` has a second tool whose first attempt lacks its file
/// - `hanoi` has no patch directory at all
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    let input = root.join("input");
    let originals = input.join("java_programs");
    let patches = input.join("patched_java_programs");

    for bug in ["BITCOUNT", "GCD", "HANOI"] {
        write(&originals.join(format!("{}.java", bug)), "class X {}");
        write(
            &originals.join(format!("{}.ast", bug)),
            "CompilationUnit ClassDecl MethodDecl Return BinaryOp",
        );
        write(
            &originals.join(format!("{}.ident", bug)),
            "bitCount numBits getValue",
        );
    }
    write(&originals.join("notes.txt"), "ignored");

    for bug in ["bitcount", "gcd"] {
        let upper = bug.to_uppercase();
        write(
            &patches.join(bug).join("Arja/patch1").join(format!("{}.ast", upper)),
            "CompilationUnit ClassDecl MethodDecl Return UnaryOp",
        );
        write(
            &patches.join(bug).join("Arja/patch1").join(format!("{}.ident", upper)),
            "bitCount numBits getOther",
        );
    }

    // Kali: first attempt has no representation, second does.
    fs::create_dir_all(patches.join("bitcount/Kali/a1")).unwrap();
    write(
        &patches.join("bitcount/Kali/a2/BITCOUNT.ast"),
        "CompilationUnit ClassDecl Return",
    );

    let config_path = root.join("patchsim.toml");
    fs::write(
        &config_path,
        "[model]\nvector_size = 12\nepochs = 3\nwindow = 4\nworkers = 2\n",
    )
    .unwrap();

    (tmp, config_path)
}

fn run_patchsim(root: &Path, config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = patchsim_binary();
    let output = Command::new(&binary)
        .arg("--input")
        .arg(root.join("input"))
        .arg("--output")
        .arg(root.join("output"))
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run patchsim binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_ast_run_writes_expected_rows() {
    let (tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_patchsim(tmp.path(), &config_path, &["--mode", ".ast"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);

    let report = tmp.path().join("output").join("similarities_ast.csv");
    assert!(report.exists());

    let rows = read_rows(&report);
    let keys: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|r| (r[0].as_str(), r[1].as_str(), r[2].as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("bitcount", "arja", "1"),
            ("bitcount", "kali", "1"),
            ("gcd", "arja", "1"),
        ]
    );

    for row in &rows {
        assert_eq!(row.len(), 4);
        let sim: f32 = row[3].parse().unwrap();
        assert!((-1.0..=1.0).contains(&sim), "similarity out of range: {}", sim);
    }
}

#[test]
fn test_bug_without_patches_has_no_rows() {
    let (tmp, config_path) = setup_test_env();
    let (_, _, success) = run_patchsim(tmp.path(), &config_path, &["--mode", ".ast"]);
    assert!(success);

    let rows = read_rows(&tmp.path().join("output/similarities_ast.csv"));
    assert!(rows.iter().all(|r| r[0] != "hanoi"));
}

#[test]
fn test_identical_texts_score_equally() {
    let (tmp, config_path) = setup_test_env();
    let (_, _, success) = run_patchsim(tmp.path(), &config_path, &["--mode", ".ident"]);
    assert!(success);

    let rows = read_rows(&tmp.path().join("output/similarities_ident.csv"));
    let score = |bug: &str| {
        rows.iter()
            .find(|r| r[0] == bug && r[1] == "arja")
            .map(|r| r[3].clone())
            .unwrap()
    };
    assert_eq!(score("bitcount"), score("gcd"));
}

#[test]
fn test_prints_progress_lines() {
    let (tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_patchsim(tmp.path(), &config_path, &["--mode", ".ast"]);
    assert!(success);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Reading original programs...");
    assert_eq!(lines[1], "Reading patched programs...");
    assert_eq!(lines[2], "Counting similarities...");
    assert!(lines[3].starts_with("The similarity file was saved to "));
    assert!(lines[3].ends_with("similarities_ast.csv"));
}

#[test]
fn test_missing_original_representation_fails() {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_patchsim(tmp.path(), &config_path, &["--mode", ".src"]);
    assert!(!success);
    assert!(stderr.contains("BITCOUNT.src"), "stderr: {}", stderr);
    assert!(!tmp.path().join("output/similarities_src.csv").exists());
}

#[test]
fn test_rejects_unknown_mode() {
    let (tmp, config_path) = setup_test_env();
    let (_, _, success) = run_patchsim(tmp.path(), &config_path, &["--mode", ".java"]);
    assert!(!success);
}

#[test]
fn test_rejects_invalid_config() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[model]\nvector_size = 0\n").unwrap();
    let (_, stderr, success) = run_patchsim(tmp.path(), &bad, &["--mode", ".ast"]);
    assert!(!success);
    assert!(stderr.contains("vector_size"));
}

#[test]
fn test_json_progress_on_stderr() {
    let (tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_patchsim(
        tmp.path(),
        &config_path,
        &["--mode", ".ast", "--progress", "json"],
    );
    assert!(success);
    assert!(!stdout.contains("\"event\""));

    let epochs: Vec<serde_json::Value> = stderr
        .lines()
        .filter_map(|l| serde_json::from_str(l).ok())
        .filter(|v: &serde_json::Value| v["phase"] == "epoch")
        .collect();
    assert_eq!(epochs.len(), 3);
    assert_eq!(epochs[2]["n"], 3);
}

#[test]
fn test_same_seed_reproduces_report() {
    let (tmp, config_path) = setup_test_env();
    let report = tmp.path().join("output/similarities_ast.csv");

    let (_, _, ok1) = run_patchsim(tmp.path(), &config_path, &["--mode", ".ast", "--seed", "5"]);
    assert!(ok1);
    let first = fs::read_to_string(&report).unwrap();

    let (_, _, ok2) = run_patchsim(tmp.path(), &config_path, &["--mode", ".ast", "--seed", "5"]);
    assert!(ok2);
    let second = fs::read_to_string(&report).unwrap();

    assert_eq!(first, second);
}
