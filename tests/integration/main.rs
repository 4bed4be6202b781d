//! Integration tests for offcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use offcache::config::Config;
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A site directory, a store root and a config file pointing at both
    struct Fixture {
        temp: TempDir,
        config_path: PathBuf,
    }

    impl Fixture {
        fn new(manifest: &[&str]) -> Self {
            let temp = TempDir::new().unwrap();
            let site = temp.path().join("site");
            fs::create_dir_all(&site).unwrap();
            fs::write(site.join("index.html"), "<h1>Ledger & Co. Tax Advisors</h1>").unwrap();
            fs::write(site.join("app.css"), "body { font-family: serif; }").unwrap();

            let mut config = Config::default();
            config.general.audit_log = false;
            config.cache.manifest = manifest.iter().map(|s| s.to_string()).collect();
            config.origin.source = site.display().to_string();
            config.storage.root = Some(temp.path().join("stores"));

            let config_path = temp.path().join("config.toml");
            fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

            Self { temp, config_path }
        }

        /// Rewrite the config file in place
        fn edit_config(&self, edit: impl FnOnce(&mut Config)) {
            let mut config: Config =
                toml::from_str(&fs::read_to_string(&self.config_path).unwrap()).unwrap();
            edit(&mut config);
            fs::write(&self.config_path, toml::to_string_pretty(&config).unwrap()).unwrap();
        }

        fn site(&self) -> PathBuf {
            self.temp.path().join("site")
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = offcache();
            cmd.env("CI", "1").arg("--config").arg(&self.config_path);
            cmd
        }
    }

    fn offcache() -> Command {
        cargo_bin_cmd!("offcache")
    }

    #[test]
    fn help_displays() {
        offcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline resource cache"));
    }

    #[test]
    fn version_displays() {
        offcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("offcache"));
    }

    #[test]
    fn install_activate_serve() {
        let fx = Fixture::new(&["/", "/app.css"]);

        fx.cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed v1: 2/2 resources cached"));

        fx.cmd().arg("activate").assert().success();

        fx.cmd()
            .args(["get", "/"])
            .assert()
            .success()
            .stdout("<h1>Ledger & Co. Tax Advisors</h1>");

        fx.cmd()
            .args(["get", "--include", "/app.css"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("HTTP 200\n"))
            .stdout(predicate::str::contains("content-type: text/css"));

        fx.cmd()
            .args(["get", "-i", "/missing.png"])
            .assert()
            .success()
            .stdout(predicate::str::contains("HTTP 404"))
            .stdout(predicate::str::ends_with("Not available offline"));
    }

    #[test]
    fn serve_ignores_origin_after_install() {
        let fx = Fixture::new(&["/"]);
        fx.cmd().arg("install").assert().success();
        fx.cmd().arg("activate").assert().success();

        // The origin changing or vanishing must not affect served content
        fs::remove_dir_all(fx.site()).unwrap();

        fx.cmd()
            .args(["get", "/"])
            .assert()
            .success()
            .stdout("<h1>Ledger & Co. Tax Advisors</h1>");
    }

    #[test]
    fn partial_seed_failure_is_not_fatal() {
        let fx = Fixture::new(&["/", "/gone.js", "/app.css"]);

        fx.cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("/gone.js"))
            .stdout(predicate::str::contains("2/3 resources cached"));

        fx.cmd().arg("activate").assert().success();

        fx.cmd()
            .args(["get", "/gone.js"])
            .assert()
            .success()
            .stdout("Not available offline");
    }

    #[test]
    fn generation_bump_evicts_previous() {
        let fx = Fixture::new(&["/", "/app.css"]);
        fx.cmd().arg("install").assert().success();
        fx.cmd().arg("activate").assert().success();

        fs::write(fx.site().join("index.html"), "<h1>Spring filing season</h1>").unwrap();
        fs::write(fx.site().join("new.js"), "console.log('v2')").unwrap();
        let manifest2 = fx.path().join("manifest-v2.toml");
        fs::write(
            &manifest2,
            "generation = \"v2\"\nresources = [\"/\", \"/new.js\"]\n",
        )
        .unwrap();

        fx.cmd()
            .args(["install", "--manifest"])
            .arg(&manifest2)
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed v2"));

        // Both generations exist until activation
        fx.cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("v1\nv2\n");

        // The v2 install is waiting, so a plain activate picks it up
        fx.cmd()
            .arg("activate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Activated v2"))
            .stdout(predicate::str::contains("v1"));

        fx.cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("v2\n");

        fx.cmd()
            .args(["get", "/"])
            .assert()
            .success()
            .stdout("<h1>Spring filing season</h1>");

        // Dropped from the v2 manifest
        fx.cmd()
            .args(["get", "/app.css"])
            .assert()
            .success()
            .stdout("Not available offline");

        // v1 is gone entirely
        fx.cmd()
            .args(["get", "--generation", "v1", "/"])
            .assert()
            .success()
            .stdout("Not available offline");
    }

    #[test]
    fn activate_requires_installed_generation() {
        let fx = Fixture::new(&["/"]);

        fx.cmd()
            .args(["activate", "--generation", "v9"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Generation not installed: v9"))
            .stderr(predicate::str::contains("Hint:"));

        fx.cmd()
            .args(["activate", "--generation", "v9", "--force"])
            .assert()
            .success();
    }

    #[test]
    fn list_empty_json() {
        let fx = Fixture::new(&["/"]);
        fx.cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn list_json_marks_waiting_then_current() {
        let fx = Fixture::new(&["/"]);
        fx.cmd().arg("install").assert().success();

        fx.cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"v1\""))
            .stdout(predicate::str::contains("\"current\": false"))
            .stdout(predicate::str::contains("\"waiting\": true"))
            .stdout(predicate::str::contains("\"entries\": 1"));

        fx.cmd().arg("activate").assert().success();

        fx.cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"current\": true"))
            .stdout(predicate::str::contains("\"waiting\": false"));
    }

    #[test]
    fn install_is_not_served_until_activated() {
        let fx = Fixture::new(&["/"]);

        // Nothing activated yet: every request misses
        fx.cmd().arg("install").assert().success();
        fx.cmd()
            .args(["get", "/"])
            .assert()
            .success()
            .stdout("Not available offline");

        fx.cmd().arg("activate").assert().success();

        // Deploy flow: change the site, bump the cache name, install
        fs::write(fx.site().join("index.html"), "<h1>Spring filing season</h1>").unwrap();
        fx.edit_config(|config| config.cache.generation = "v2".to_string());
        fx.cmd().arg("install").assert().success();

        fx.cmd()
            .args(["get", "/"])
            .assert()
            .success()
            .stdout("<h1>Ledger & Co. Tax Advisors</h1>");
        fx.cmd()
            .args(["get", "--generation", "v2", "/"])
            .assert()
            .success()
            .stdout("<h1>Spring filing season</h1>");

        fx.cmd().arg("activate").assert().success();

        fx.cmd()
            .args(["get", "/"])
            .assert()
            .success()
            .stdout("<h1>Spring filing season</h1>");
        fx.cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("v2\n");
    }

    #[test]
    fn activate_follows_manifest_file_generation() {
        let fx = Fixture::new(&["/"]);
        let manifest = fx.path().join("manifest.toml");
        fs::write(&manifest, "generation = \"v2\"\nresources = [\"/\", \"/app.css\"]\n").unwrap();
        fx.edit_config(|config| config.cache.manifest_file = Some(manifest.clone()));

        fx.cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed v2"));
        fx.cmd()
            .arg("activate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Activated v2"));

        fx.cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("v2\n");
        fx.cmd()
            .args(["get", "/app.css"])
            .assert()
            .success()
            .stdout("body { font-family: serif; }");
    }

    #[test]
    fn status_reports_missing_store() {
        let fx = Fixture::new(&["/"]);
        fx.cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Current generation: none"))
            .stdout(predicate::str::contains("Phase: uninstalled"));
    }

    #[test]
    fn config_path() {
        let fx = Fixture::new(&["/"]);
        fx.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let fx = Fixture::new(&["/"]);
        fx.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[placeholder]"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[placeholder]\nstatus = 503\n").unwrap();

        offcache()
            .arg("--config")
            .arg(&path)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
