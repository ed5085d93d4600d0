mod common;

use ansible_image_probe::core::harness::{default_playbook_dir, HarnessSettings};
use ansible_image_probe::core::CheckOutcome;
use ansible_image_probe::utils::validation::Validate;
use ansible_image_probe::{CheckSuite, ContainerHarness, ImageName, ProbeConfig};
use common::{exit, ok, ScriptedEngine};
use std::path::PathBuf;

fn settings() -> HarnessSettings {
    HarnessSettings::for_image(ImageName::parse("ansible:test").unwrap())
}

fn outcome<'a>(
    results: &'a [ansible_image_probe::core::CheckResult],
    name: &str,
) -> &'a CheckOutcome {
    &results
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("missing result for {}", name))
        .outcome
}

#[tokio::test]
async fn test_healthy_image_passes_every_check() {
    let harness = ContainerHarness::setup(Box::new(ScriptedEngine::healthy_alpine()), settings())
        .await
        .unwrap();

    let suite = CheckSuite::with_default_checks();
    let results = suite.run_all(&harness).await;
    let summary = CheckSuite::summary(&results);

    for result in &results {
        assert!(
            matches!(result.outcome, CheckOutcome::Passed { .. }),
            "{} did not pass: {:?}",
            result.name,
            result.outcome
        );
    }
    assert_eq!(summary.passed, results.len());
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_missing_non_critical_commands_are_only_noted() {
    let harness = ContainerHarness::setup(Box::new(ScriptedEngine::healthy_alpine()), settings())
        .await
        .unwrap();

    let mut suite = CheckSuite::with_default_checks();
    suite
        .retain_named(&["installed_packages".to_string()])
        .unwrap();
    let results = suite.run_all(&harness).await;

    match outcome(&results, "installed_packages") {
        CheckOutcome::Passed { notes } => {
            assert_eq!(notes, &vec!["Non-critical commands not found: kubectl, helm".to_string()]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_alpine_image_skips_package_check() {
    let engine = ScriptedEngine::with_image()
        .respond("cat /etc/os-release", ok("NAME=\"Ubuntu\"\nID=ubuntu\n"))
        .respond("which ansible", ok("/usr/local/bin/ansible\n"))
        .respond("which python", ok("/usr/bin/python\n"));
    let harness = ContainerHarness::setup(Box::new(engine), settings())
        .await
        .unwrap();

    let mut suite = CheckSuite::with_default_checks();
    suite
        .retain_named(&[
            "installed_packages".to_string(),
            "critical_commands".to_string(),
            "python_modules".to_string(),
        ])
        .unwrap();
    let results = suite.run_all(&harness).await;

    assert!(matches!(
        outcome(&results, "installed_packages"),
        CheckOutcome::Skipped { .. }
    ));
    assert!(matches!(
        outcome(&results, "critical_commands"),
        CheckOutcome::Passed { .. }
    ));
    // 沒有任何模組可用時跳過
    assert!(matches!(
        outcome(&results, "python_modules"),
        CheckOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn test_missing_critical_command_fails_suite() {
    let engine = ScriptedEngine::with_image()
        .respond("cat /etc/os-release", ok("ID=alpine\nNAME=\"Alpine Linux\"\n"))
        .respond("which ansible", ok("/usr/bin/ansible\n"))
        .respond("which python", exit(1, ""));
    let harness = ContainerHarness::setup(Box::new(engine), settings())
        .await
        .unwrap();

    let mut suite = CheckSuite::with_default_checks();
    suite
        .retain_named(&["critical_commands".to_string()])
        .unwrap();
    let results = suite.run_all(&harness).await;
    let summary = CheckSuite::summary(&results);

    match outcome(&results, "critical_commands") {
        CheckOutcome::Failed { reason } => {
            assert_eq!(reason, "Critical command python is not available")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!summary.is_success());
}

#[tokio::test]
async fn test_critical_commands_probed_even_when_not_configured() {
    let config = ProbeConfig::from_toml_str(
        r#"
[container]
image = "ansible:test"
commands = ["git"]
"#,
    )
    .unwrap();
    config.validate().unwrap();

    let harness = ContainerHarness::setup(
        Box::new(ScriptedEngine::healthy_alpine()),
        config.harness_settings().unwrap(),
    )
    .await
    .unwrap();

    assert!(harness.info().has_command("git"));
    assert!(harness.info().has_command("ansible"));
    assert!(harness.info().has_command("python"));

    let mut suite = CheckSuite::with_default_checks();
    suite
        .retain_named(&["critical_commands".to_string()])
        .unwrap();
    let results = suite.run_all(&harness).await;

    assert!(matches!(
        outcome(&results, "critical_commands"),
        CheckOutcome::Passed { .. }
    ));
}

#[tokio::test]
async fn test_wrong_user_fails_permissions_check() {
    let engine = ScriptedEngine::with_image().respond("id", ok("uid=0(root) gid=0(root)\n"));
    let harness = ContainerHarness::setup(Box::new(engine), settings())
        .await
        .unwrap();

    let mut suite = CheckSuite::with_default_checks();
    suite
        .retain_named(&["user_permissions".to_string()])
        .unwrap();
    let results = suite.run_all(&harness).await;

    match outcome(&results, "user_permissions") {
        CheckOutcome::Failed { reason } => assert!(reason.contains("uid=1000")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_playbook_fails_syntax_check() {
    let mut settings = settings();
    settings.playbook_dir = PathBuf::from("/nonexistent/playbooks-for-probe-tests");

    let harness = ContainerHarness::setup(Box::new(ScriptedEngine::healthy_alpine()), settings)
        .await
        .unwrap();

    let mut suite = CheckSuite::with_default_checks();
    suite
        .retain_named(&["playbook_syntax".to_string()])
        .unwrap();
    let results = suite.run_all(&harness).await;

    match outcome(&results, "playbook_syntax") {
        CheckOutcome::Failed { reason } => assert!(reason.contains("Invalid playbook path")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_companion_playbook_ships_with_crate() {
    assert!(default_playbook_dir()
        .join("test_syntax_playbook.yml")
        .is_file());
}
