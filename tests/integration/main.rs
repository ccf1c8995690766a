//! Integration tests for repocache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const BASH: &str = r#"{"pkgId":"aaa","name":"bash","files":[{"path":"/usr/bin/bash","type":"file"},{"path":"/usr/bin/sh","type":"file"},{"path":"/etc/skel","type":"dir"}],"changelogs":[{"author":"jane","date":"1700000000","changelog":"- rebuilt"}]}"#;
    const ZSH: &str = r#"{"pkgId":"bbb","name":"zsh","files":[{"path":"/usr/bin/zsh","type":"file"}]}"#;

    /// A command isolated from the user's config file
    fn repocache(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("repocache");
        cmd.env("REPOCACHE_CONFIG", dir.join("config.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn write_input(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("input.jsonl");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn prefix(dir: &Path) -> PathBuf {
        dir.join("cache").join("fl")
    }

    fn build(dir: &Path, kind: &str, input: &Path) -> assert_cmd::assert::Assert {
        repocache(dir)
            .arg("build")
            .args(["--kind", kind])
            .arg("--input")
            .arg(input)
            .arg("--prefix")
            .arg(prefix(dir))
            .assert()
    }

    fn status_plain(dir: &Path, kind: &str, input: &Path) -> assert_cmd::assert::Assert {
        repocache(dir)
            .arg("status")
            .args(["--kind", kind, "--format", "plain"])
            .arg("--input")
            .arg(input)
            .arg("--prefix")
            .arg(prefix(dir))
            .assert()
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        repocache(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Versioned SQLite cache"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        repocache(dir.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("repocache"));
    }

    #[test]
    fn build_then_status_fresh() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), &[BASH, ZSH]);

        status_plain(dir.path(), "filelists", &input)
            .success()
            .stdout(predicate::str::diff("absent\n"));

        build(dir.path(), "filelists", &input)
            .success()
            .stdout(predicate::str::contains("Cache built (absent)"));
        assert!(dir.path().join("cache").join("fl.sqlite").exists());

        status_plain(dir.path(), "filelists", &input)
            .success()
            .stdout(predicate::str::diff("fresh\n"));
    }

    #[test]
    fn second_build_is_up_to_date() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), &[BASH]);

        build(dir.path(), "other", &input).success();
        build(dir.path(), "other", &input)
            .success()
            .stdout(predicate::str::contains("Cache is up to date"));
    }

    #[test]
    fn changed_input_is_stale_checksum() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), &[BASH]);
        build(dir.path(), "primary", &input).success();

        let input = write_input(dir.path(), &[BASH, ZSH]);
        status_plain(dir.path(), "primary", &input)
            .success()
            .stdout(predicate::str::diff("stale-checksum\n"));

        build(dir.path(), "primary", &input)
            .success()
            .stdout(predicate::str::contains("Cache built (stale-checksum)"));
    }

    #[test]
    fn status_json_output() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), &[BASH]);

        repocache(dir.path())
            .arg("status")
            .args(["--kind", "primary", "--format", "json"])
            .arg("--input")
            .arg(&input)
            .arg("--prefix")
            .arg(prefix(dir.path()))
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""state": "absent""#))
            .stdout(predicate::str::contains(r#""version": 10"#));
    }

    #[test]
    fn invalid_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), &[BASH, "not json", ZSH]);

        build(dir.path(), "other", &input)
            .success()
            .stdout(predicate::str::contains("1 input line(s) skipped"));
    }

    #[test]
    fn missing_input_fails() {
        let dir = TempDir::new().unwrap();

        build(dir.path(), "primary", &dir.path().join("missing.jsonl"))
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn encode_prints_groups() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), &[BASH]);

        repocache(dir.path())
            .arg("encode")
            .arg(&input)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""/usr/bin""#))
            .stdout(predicate::str::contains(r#""names": "bash/sh""#))
            .stdout(predicate::str::contains(r#""kinds": "ff""#));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        repocache(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let dir = TempDir::new().unwrap();
        repocache(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(dir.path().join("config.toml").exists());

        repocache(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("prune_missing = true"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[cache\n").unwrap();

        repocache(dir.path())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("repocache config init --force"));
    }
}
