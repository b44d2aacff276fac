//! Integration tests for artcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    const MODULE: &str = "org.example:lib:1.0";

    /// Command isolated to a scratch cache dir and config file
    fn artcache(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("artcache");
        cmd.env_remove("ARTCACHE_CACHE_DIR")
            .arg("--config")
            .arg(dir.path().join("config.toml"))
            .arg("--cache-dir")
            .arg(dir.path().join("cache"));
        cmd
    }

    fn jar_args<'a>(command: &'a str, repo: &'a str) -> Vec<&'a str> {
        vec![command, "--repo", repo, "--module", MODULE, "--artifact", "lib:jar"]
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("artcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("artifact resolution cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("artcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("artcache"));
    }

    #[test]
    fn store_then_lookup() {
        let dir = TempDir::new().unwrap();

        let mut store = jar_args("store", "maven");
        store.extend([
            "--path",
            "/cache/lib-1.0.jar",
            "--last-modified",
            "1700000000000",
            "--descriptor-hash",
            "0080",
        ]);
        artcache(&dir).args(&store).assert().success();

        artcache(&dir)
            .args(jar_args("lookup", "maven"))
            .assert()
            .success()
            .stdout(predicate::str::contains("present"))
            .stdout(predicate::str::contains("/cache/lib-1.0.jar"))
            .stdout(predicate::str::contains("0080"));
    }

    #[test]
    fn store_missing_then_lookup_keeps_order() {
        let dir = TempDir::new().unwrap();

        let mut store = jar_args("store-missing", "maven");
        store.extend([
            "--location",
            "https://repo1.example/lib-1.0.jar",
            "--location",
            "https://repo2.example/lib-1.0.jar",
        ]);
        artcache(&dir).args(&store).assert().success();

        let mut lookup = jar_args("lookup", "maven");
        lookup.extend(["--format", "plain"]);
        artcache(&dir).args(&lookup).assert().success().stdout(
            "missing\nhttps://repo1.example/lib-1.0.jar\nhttps://repo2.example/lib-1.0.jar\n",
        );
    }

    #[test]
    fn lookup_json() {
        let dir = TempDir::new().unwrap();

        let mut store = jar_args("store", "maven");
        store.extend(["--path", "/cache/lib.jar", "--last-modified", "5"]);
        artcache(&dir).args(&store).assert().success();

        let mut lookup = jar_args("lookup", "maven");
        lookup.extend(["--format", "json"]);
        let output = artcache(&dir).args(&lookup).output().unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["state"], "present");
        assert_eq!(json["cached_file"], "/cache/lib.jar");
        assert_eq!(json["cached_file_last_modified"], 5);
        assert_eq!(json["descriptor_hash"], "00");
    }

    #[test]
    fn clear_then_lookup_reports_not_cached() {
        let dir = TempDir::new().unwrap();

        let mut store = jar_args("store", "maven");
        store.extend(["--path", "/cache/lib.jar"]);
        artcache(&dir).args(&store).assert().success();

        artcache(&dir)
            .args(jar_args("clear", "maven"))
            .assert()
            .success();

        artcache(&dir)
            .args(jar_args("lookup", "maven"))
            .assert()
            .success()
            .stdout(predicate::str::contains("is not cached"));
    }

    #[test]
    fn repositories_are_separate() {
        let dir = TempDir::new().unwrap();

        let mut store = jar_args("store", "maven");
        store.extend(["--path", "/cache/lib.jar"]);
        artcache(&dir).args(&store).assert().success();

        let mut lookup = jar_args("lookup", "ivy");
        lookup.extend(["--format", "plain"]);
        artcache(&dir)
            .args(&lookup)
            .assert()
            .success()
            .stdout("none\n");
    }

    #[test]
    fn list_filters_missing() {
        let dir = TempDir::new().unwrap();

        let mut present = jar_args("store", "maven");
        present.extend(["--path", "/cache/lib.jar"]);
        artcache(&dir).args(&present).assert().success();

        artcache(&dir)
            .args([
                "store-missing",
                "--repo",
                "maven",
                "--module",
                MODULE,
                "--file-name",
                "lib-1.0.pom",
            ])
            .assert()
            .success();

        artcache(&dir)
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("lib.jar"))
            .stdout(predicate::str::contains("lib-1.0.pom"));

        artcache(&dir)
            .args(["list", "--missing", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("lib-1.0.pom"))
            .stdout(predicate::str::contains("lib.jar").not());
    }

    #[test]
    fn list_empty() {
        let dir = TempDir::new().unwrap();
        artcache(&dir)
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout("[]\n");
    }

    #[test]
    fn store_rejects_empty_repository() {
        let dir = TempDir::new().unwrap();

        let mut store = jar_args("store", "");
        store.extend(["--path", "/cache/lib.jar"]);
        artcache(&dir)
            .args(&store)
            .assert()
            .failure()
            .stderr(predicate::str::contains("repository id must not be empty"));
    }

    #[test]
    fn bad_module_coordinates() {
        let dir = TempDir::new().unwrap();
        artcache(&dir)
            .args(["lookup", "--repo", "maven", "--module", "lib", "--artifact", "lib:jar"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("group:module:version"));
    }

    #[test]
    fn corrupt_index_reports_hint() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("cache")).unwrap();
        std::fs::write(dir.path().join("cache").join("artifacts.bin"), b"garbage").unwrap();

        artcache(&dir)
            .args(jar_args("lookup", "maven"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("corrupt"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        artcache(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let dir = TempDir::new().unwrap();
        artcache(&dir).args(["config", "init"]).assert().success();
        assert!(dir.path().join("config.toml").exists());

        artcache(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("artifacts.bin"));
    }
}
