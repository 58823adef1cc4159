//! End-to-end lifecycle tests over composer-project fixtures.

use crate::common::ProjectFixture;
use magedeploy_cli::config::ProjectConfig;
use magedeploy_cli::core::MagedeployError;
use magedeploy_cli::deploy::StrategyKind;
use magedeploy_cli::installer::{Installer, project_modules};
use magedeploy_cli::state::STATE_FILE;
use serde_json::json;
use std::fs;

fn installer_for(fixture: &ProjectFixture) -> (Installer, Vec<magedeploy_cli::package::Package>) {
    let config = ProjectConfig::load(&fixture.project_dir).unwrap();
    let modules = project_modules(&config, &fixture.project_dir).unwrap();
    (Installer::new(config).unwrap(), modules)
}

#[test]
fn copy_deployment_places_and_removes_files() {
    let fixture = ProjectFixture::new()
        .with_modman_module(
            "acme/widget",
            &["app/etc/modules/Acme_Widget.xml", "app/code/local/Acme/Widget/Model.php"],
        )
        .build();
    let root = fixture.magento_root();

    let (mut installer, modules) = installer_for(&fixture);
    let report = installer.deploy_all(&modules);
    assert!(report.is_ok(), "{report}");

    assert!(root.join("app/etc/modules/Acme_Widget.xml").is_file());
    assert!(root.join("app/code/local/Acme/Widget/Model.php").is_file());
    assert!(root.join(STATE_FILE).is_file());

    let report = installer.undeploy_all(&modules);
    assert!(report.is_ok(), "{report}");
    assert!(!root.join("app").exists());
}

#[test]
fn explicit_map_beats_modman_file() {
    // the package ships a modman file mapping B, but also declares an
    // explicit map for A; the map must win
    let fixture = ProjectFixture::new()
        .with_module(
            "acme/widget",
            json!({"map": {"src/A.php": "lib/A.php"}}),
            &["src/A.php", "src/B.php"],
            Some("src/B.php lib/B.php\n"),
        )
        .build();
    let root = fixture.magento_root();

    let (mut installer, modules) = installer_for(&fixture);
    installer.install(&modules[0]).unwrap();

    assert!(root.join("lib/A.php").is_file());
    assert!(!root.join("lib/B.php").exists());
}

#[test]
fn project_map_override_beats_package_map() {
    let fixture = ProjectFixture::new()
        .with_root_extra(
            "magento-map-overwrite",
            json!({"acme/widget": {"src/B.php": "lib/B.php"}}),
        )
        .with_module(
            "acme/widget",
            json!({"map": {"src/A.php": "lib/A.php"}}),
            &["src/A.php", "src/B.php"],
            None,
        )
        .build();
    let root = fixture.magento_root();

    let (mut installer, modules) = installer_for(&fixture);
    installer.install(&modules[0]).unwrap();

    assert!(root.join("lib/B.php").is_file());
    assert!(!root.join("lib/A.php").exists());
}

#[test]
fn strategy_override_forces_symlink_over_declared_copy() {
    let fixture = ProjectFixture::new()
        .with_root_extra(
            "magento-deploystrategy-overwrite",
            json!({"acme/widget": "symlink"}),
        )
        .with_module(
            "acme/widget",
            json!({"magento-deploystrategy": "copy", "map": {"src/A.php": "lib/A.php"}}),
            &["src/A.php"],
            None,
        )
        .build();
    let root = fixture.magento_root();

    let (installer, modules) = installer_for(&fixture);
    let (strategy, _) = installer.resolve(&modules[0]).unwrap();
    assert_eq!(strategy, StrategyKind::Symlink);

    let mut installer = installer;
    installer.install(&modules[0]).unwrap();
    assert!(root.join("lib/A.php").is_symlink());
}

#[test]
fn package_xml_manifest_deploys_by_target() {
    let manifest = r#"<?xml version="1.0"?>
<package>
    <contents>
        <target name="magelocal">
            <dir name="Acme"><file name="Model.php" hash="x"/></dir>
        </target>
    </contents>
</package>"#;
    let fixture = ProjectFixture::new()
        .with_module(
            "acme/widget",
            json!({"package-xml": "package.xml"}),
            &["app/code/local/Acme/Model.php"],
            None,
        )
        .build();
    crate::common::write_file(
        &fixture.project_dir.join("vendor/acme/widget/package.xml"),
        manifest,
    );
    let root = fixture.magento_root();

    let (mut installer, modules) = installer_for(&fixture);
    installer.install(&modules[0]).unwrap();
    assert!(root.join("app/code/local/Acme/Model.php").is_file());
}

#[test]
fn module_without_mapping_source_fails_cleanly() {
    let fixture = ProjectFixture::new()
        .with_module("acme/bare", json!({}), &["README.md"], None)
        .build();

    let (mut installer, modules) = installer_for(&fixture);
    let err = installer.install(&modules[0]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MagedeployError>(),
        Some(MagedeployError::NoMappingSource { .. })
    ));
    // nothing was written
    assert!(!fixture.magento_root().join(STATE_FILE).exists());
}

#[test]
fn none_strategy_deploys_nothing_but_records_state() {
    let fixture = ProjectFixture::new()
        .with_root_extra("magento-deploystrategy", json!("none"))
        .with_modman_module("acme/widget", &["lib/A.php"])
        .build();
    let root = fixture.magento_root();

    let (mut installer, modules) = installer_for(&fixture);
    installer.install(&modules[0]).unwrap();

    assert!(!root.join("lib/A.php").exists());
    let record = installer.state().get("acme/widget").unwrap();
    assert_eq!(record.strategy, StrategyKind::NoOp);
    assert!(record.log.is_empty());
}

#[test]
fn update_between_versions_swaps_files() {
    let fixture = ProjectFixture::new()
        .with_modman_module("acme/widget", &["lib/V1.php"])
        .build();
    let root = fixture.magento_root();

    let (mut installer, modules) = installer_for(&fixture);
    let old = modules[0].clone();
    installer.install(&old).unwrap();
    assert!(root.join("lib/V1.php").is_file());

    // simulate composer replacing the package contents
    let package_dir = &old.source_dir;
    fs::remove_file(package_dir.join("lib/V1.php")).unwrap();
    crate::common::write_file(&package_dir.join("lib/V2.php"), "v2");
    crate::common::write_file(&package_dir.join("modman"), "lib/V2.php lib/V2.php\n");

    let new = old.clone();
    installer.update(&old, &new).unwrap();
    assert!(!root.join("lib/V1.php").exists());
    assert!(root.join("lib/V2.php").is_file());
}

#[test]
fn unrelated_files_survive_a_full_cycle() {
    let fixture = ProjectFixture::new()
        .with_modman_module("acme/widget", &["app/etc/modules/Acme.xml"])
        .build();
    let root = fixture.magento_root();
    crate::common::write_file(&root.join("app/etc/local.xml"), "<config/>");

    let (mut installer, modules) = installer_for(&fixture);
    installer.install(&modules[0]).unwrap();
    installer.uninstall(&modules[0]).unwrap();

    assert!(root.join("app/etc/local.xml").is_file());
    assert!(!root.join("app/etc/modules").exists());
}
