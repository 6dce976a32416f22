//! Several sync runs over one configuration directory, as a user would do them.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use unhacs_cli::core::PackageCategory;
use unhacs_cli::installer;
use unhacs_cli::manifest::{Manifest, Package, VersionConstraint};
use unhacs_cli::source::RepoId;
use unhacs_cli::sync::{self, SyncEngine, SyncOptions, SyncOutcome, UpdateStatus};
use unhacs_cli::test_utils::FakeSourceClient;
use unhacs_cli::test_utils::fixtures::{js_artifact, release, zip_artifact};

fn engine(client: FakeSourceClient, temp: &TempDir) -> SyncEngine {
    let options = SyncOptions {
        retry_base_delay: Duration::from_millis(1),
        ..SyncOptions::new(temp.path())
    };
    SyncEngine::new(Arc::new(client), options)
}

fn alarmo_zip(version: &str) -> unhacs_cli::source::Artifact {
    zip_artifact(
        &format!("alarmo-{version}.zip"),
        &[
            ("nielsfaber-alarmo-1a2b3c/", ""),
            ("nielsfaber-alarmo-1a2b3c/custom_components/alarmo/__init__.py", version),
            ("nielsfaber-alarmo-1a2b3c/custom_components/alarmo/manifest.json", "{}"),
            ("nielsfaber-alarmo-1a2b3c/README.md", "docs"),
        ],
    )
}

fn tracked() -> Manifest {
    let mut manifest = Manifest::new();
    manifest.add_package(Package::new(RepoId::new("nielsfaber", "alarmo"), PackageCategory::Integration)).unwrap();
    manifest
        .add_package(
            Package::new(RepoId::new("thomasloven", "lovelace-card-mod"), PackageCategory::Plugin)
                .with_name("card-mod")
                .with_constraint(VersionConstraint::Pinned("v3.4.0".to_string())),
        )
        .unwrap();
    manifest
}

#[tokio::test]
async fn test_install_idle_update_and_remove() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let mut manifest = tracked();

    // First run installs both packages.
    let first = FakeSourceClient::new()
        .with_release("nielsfaber/alarmo", release("v1.10.0", 1), alarmo_zip("v1.10.0"))
        .with_release("thomasloven/lovelace-card-mod", release("v3.4.0", 2), js_artifact("card-mod.js", "3.4"))
        .with_listed_only("thomasloven/lovelace-card-mod", release("v3.5.0", 3));
    let reports = engine(first, &temp).sync(&mut manifest).await.unwrap();

    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["alarmo", "card-mod"]);
    assert!(reports.iter().all(|r| matches!(r.outcome, SyncOutcome::Installed { .. })), "{reports:?}");
    assert_eq!(
        std::fs::read_to_string(root.join("custom_components/alarmo/__init__.py")).unwrap(),
        "v1.10.0"
    );
    assert!(!root.join("custom_components/alarmo/README.md").exists());
    assert!(root.join("www/community/card-mod/card-mod.js").is_file());

    // Second run against the same releases changes nothing.
    let idle = FakeSourceClient::new()
        .with_release("nielsfaber/alarmo", release("v1.10.0", 1), alarmo_zip("v1.10.0"))
        .with_release("thomasloven/lovelace-card-mod", release("v3.4.0", 2), js_artifact("card-mod.js", "3.4"));
    let idle = Arc::new(idle);
    let engine_idle = SyncEngine::new(
        idle.clone(),
        SyncOptions {
            retry_base_delay: Duration::from_millis(1),
            ..SyncOptions::new(root)
        },
    );
    let reports = engine_idle.sync(&mut manifest).await.unwrap();
    assert!(reports.iter().all(|r| matches!(r.outcome, SyncOutcome::NoChange { .. })), "{reports:?}");
    assert!(idle.fetch_calls().is_empty());

    // A new alarmo release shows up as available, then replaces the old files.
    let newer = FakeSourceClient::new()
        .with_release("nielsfaber/alarmo", release("v1.11.0", 9), alarmo_zip("v1.11.0"))
        .with_release("nielsfaber/alarmo", release("v1.10.0", 1), alarmo_zip("v1.10.0"))
        .with_release("thomasloven/lovelace-card-mod", release("v3.4.0", 2), js_artifact("card-mod.js", "3.4"));
    let engine_newer = engine(newer, &temp);

    let checks = engine_newer.check(&manifest).await;
    assert!(matches!(
        &checks[0].status,
        UpdateStatus::Available { current: Some(current), latest } if current == "v1.10.0" && latest == "v1.11.0"
    ));
    assert!(matches!(&checks[1].status, UpdateStatus::UpToDate { version } if version == "v3.4.0"));

    let reports = engine_newer.sync(&mut manifest).await.unwrap();
    assert!(matches!(
        &reports[0].outcome,
        SyncOutcome::Updated { old: Some(old), new } if old == "v1.10.0" && new == "v1.11.0"
    ));
    assert_eq!(
        std::fs::read_to_string(root.join("custom_components/alarmo/__init__.py")).unwrap(),
        "v1.11.0"
    );

    let saved = Manifest::load(&root.join("unhacs.toml")).unwrap();
    assert_eq!(saved.get("alarmo").unwrap().installed_version.as_deref(), Some("v1.11.0"));
    assert_eq!(saved.get("card-mod").unwrap().installed_version.as_deref(), Some("v3.4.0"));

    let statuses = sync::list(&saved, root);
    assert!(statuses.iter().all(|s| s.present));

    // Removing a package deletes only its own files.
    let card_mod = saved.require("card-mod").unwrap();
    assert!(installer::uninstall(card_mod, root).unwrap());
    assert!(!root.join("www/community/card-mod").exists());
    assert!(root.join("custom_components/alarmo").is_dir());
}

#[tokio::test]
async fn test_failed_package_keeps_its_previous_install() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let mut manifest = tracked();

    let first = FakeSourceClient::new()
        .with_release("nielsfaber/alarmo", release("v1.10.0", 1), alarmo_zip("v1.10.0"))
        .with_release("thomasloven/lovelace-card-mod", release("v3.4.0", 2), js_artifact("card-mod.js", "3.4"));
    engine(first, &temp).sync(&mut manifest).await.unwrap();

    // The newest alarmo release ships a truncated archive.
    let mut truncated = alarmo_zip("v1.11.0");
    truncated.bytes.truncate(truncated.bytes.len() / 2);
    let broken = FakeSourceClient::new()
        .with_release("nielsfaber/alarmo", release("v1.11.0", 9), truncated)
        .with_release("thomasloven/lovelace-card-mod", release("v3.4.0", 2), js_artifact("card-mod.js", "3.4"));
    let reports = engine(broken, &temp).sync(&mut manifest).await.unwrap();

    assert!(reports[0].outcome.is_failure(), "{:?}", reports[0]);
    assert!(matches!(reports[1].outcome, SyncOutcome::NoChange { .. }));
    assert_eq!(manifest.get("alarmo").unwrap().installed_version.as_deref(), Some("v1.10.0"));
    assert_eq!(
        std::fs::read_to_string(root.join("custom_components/alarmo/__init__.py")).unwrap(),
        "v1.10.0"
    );
}
