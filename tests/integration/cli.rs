//! Binary-level tests for the `magedeploy` CLI.

use crate::common::ProjectFixture;
use assert_cmd::Command;
use predicates::prelude::*;

fn magedeploy() -> Command {
    Command::cargo_bin("magedeploy").unwrap()
}

#[test]
fn deploy_then_list_then_undeploy() {
    let fixture = ProjectFixture::new()
        .with_modman_module("acme/widget", &["app/etc/modules/Acme.xml"])
        .build();
    let root = fixture.magento_root();

    magedeploy()
        .args(["deploy", "--project-dir"])
        .arg(&fixture.project_dir)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/widget"));
    assert!(root.join("app/etc/modules/Acme.xml").is_file());

    magedeploy()
        .args(["list", "--project-dir"])
        .arg(&fixture.project_dir)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/widget"));

    magedeploy()
        .args(["undeploy", "--project-dir"])
        .arg(&fixture.project_dir)
        .arg("--quiet")
        .assert()
        .success();
    assert!(!root.join("app").exists());
}

#[test]
fn deploy_of_unknown_package_fails() {
    let fixture = ProjectFixture::new()
        .with_modman_module("acme/widget", &["lib/A.php"])
        .build();

    magedeploy()
        .args(["deploy", "nope/nope", "--project-dir"])
        .arg(&fixture.project_dir)
        .arg("--quiet")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope/nope"));
}

#[test]
fn missing_root_dir_config_is_reported_with_suggestion() {
    let fixture = ProjectFixture::new().build();
    // overwrite composer.json without the required extra key
    crate::common::write_file(
        &fixture.project_dir.join("composer.json"),
        r#"{"name": "acme/project"}"#,
    );

    magedeploy()
        .args(["list", "--project-dir"])
        .arg(&fixture.project_dir)
        .arg("--quiet")
        .assert()
        .failure()
        .stderr(predicate::str::contains("magento-root-dir"));
}

#[test]
fn batch_reports_failures_but_deploys_the_rest() {
    let fixture = ProjectFixture::new()
        .with_modman_module("acme/good", &["lib/Good.php"])
        .with_module("acme/bad", serde_json::json!({}), &["README.md"], None)
        .build();
    let root = fixture.magento_root();

    magedeploy()
        .args(["deploy", "--project-dir"])
        .arg(&fixture.project_dir)
        .arg("--quiet")
        .assert()
        .failure()
        .stderr(predicate::str::contains("acme/bad"));

    assert!(root.join("lib/Good.php").is_file());
}
