//! Context switching against real kubeconfig files

mod common;

use common::fixtures::{kubeconfig_file, NO_CONTEXTS, TWO_CONTEXTS};
use kubeprep_bootstrap::ContextSwitcher;
use kubeprep_cluster::KubeConfig;
use kubeprep_core::{Answer, BatchPrompter, Error, ScriptedPrompter};
use std::fs;

#[test]
fn test_switch_by_name_rewrites_current_context() {
    let (_dir, path) = kubeconfig_file(TWO_CONTEXTS);
    let switcher = ContextSwitcher::new(path.clone(), &BatchPrompter);

    let report = switcher.run(Some("staging"), None, true).unwrap();

    assert!(report.changed);
    assert_eq!(report.context, "staging");
    assert_eq!(report.namespace, "jx-staging");
    assert_eq!(report.server, "https://10.0.0.5:6443");

    let saved = KubeConfig::load(&path).unwrap();
    assert_eq!(saved.current_context(), Some("staging"));

    // credentials and preferences survive the rewrite
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("token: s3cr3t"));
    assert!(raw.contains("certificate-authority-data"));
    assert!(raw.contains("preferences"));
}

#[test]
fn test_switching_to_current_context_does_not_write() {
    let (_dir, path) = kubeconfig_file(TWO_CONTEXTS);
    let switcher = ContextSwitcher::new(path.clone(), &BatchPrompter);

    switcher.run(Some("staging"), None, true).unwrap();
    let after_first = fs::read_to_string(&path).unwrap();

    let report = switcher.run(Some("staging"), None, true).unwrap();

    assert!(!report.changed);
    assert_eq!(report.context, "staging");
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn test_unknown_name_lists_valid_contexts() {
    let (_dir, path) = kubeconfig_file(TWO_CONTEXTS);
    let switcher = ContextSwitcher::new(path.clone(), &BatchPrompter);

    match switcher.run(Some("missing"), None, true).unwrap_err() {
        Error::InvalidArgument { value, valid } => {
            assert_eq!(value, "missing");
            assert_eq!(valid, vec!["prod", "staging"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), TWO_CONTEXTS);
}

#[test]
fn test_name_outside_filter_is_rejected() {
    let (_dir, path) = kubeconfig_file(TWO_CONTEXTS);
    let switcher = ContextSwitcher::new(path.clone(), &BatchPrompter);

    let err = switcher.run(Some("prod"), Some("stag"), true).unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { ref valid, .. } if valid == &["staging"]));
}

#[test]
fn test_no_contexts_leaves_file_untouched() {
    let (_dir, path) = kubeconfig_file(NO_CONTEXTS);
    let switcher = ContextSwitcher::new(path.clone(), &BatchPrompter);

    let err = switcher.run(Some("prod"), None, true).unwrap_err();

    assert!(matches!(err, Error::NoContexts));
    assert_eq!(fs::read_to_string(&path).unwrap(), NO_CONTEXTS);
}

#[test]
fn test_missing_kubeconfig_has_no_contexts() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = camino::Utf8Path::from_path(dir.path()).unwrap().join("absent");
    let switcher = ContextSwitcher::new(path.clone(), &BatchPrompter);

    assert!(matches!(switcher.run(None, None, true), Err(Error::NoContexts)));
    assert!(!path.exists());
}

#[test]
fn test_batch_without_name_reports_current() {
    let (_dir, path) = kubeconfig_file(TWO_CONTEXTS);
    let switcher = ContextSwitcher::new(path.clone(), &BatchPrompter);

    let report = switcher.run(None, None, true).unwrap();

    assert!(!report.changed);
    assert_eq!(report.context, "prod");
    assert_eq!(report.namespace, "jx-production");
    assert_eq!(
        report.to_string(),
        "Using namespace 'jx-production' from context named 'prod' on server 'https://prod.corp.example:6443'."
    );
}

#[test]
fn test_single_filtered_candidate_is_selected_without_prompt() {
    let (_dir, path) = kubeconfig_file(TWO_CONTEXTS);
    let prompter = ScriptedPrompter::default();
    let switcher = ContextSwitcher::new(path.clone(), &prompter);

    let report = switcher.run(None, Some("stag"), false).unwrap();

    assert!(report.changed);
    assert_eq!(report.context, "staging");
    assert!(prompter.asked().is_empty());
}

#[test]
fn test_interactive_selection() {
    let (_dir, path) = kubeconfig_file(TWO_CONTEXTS);
    let prompter = ScriptedPrompter::new([Answer::Select("staging".into())]);
    let switcher = ContextSwitcher::new(path.clone(), &prompter);

    let report = switcher.run(None, None, false).unwrap();

    assert_eq!(report.context, "staging");
    assert_eq!(prompter.asked(), vec!["Change Kubernetes context:"]);
    assert_eq!(KubeConfig::load(&path).unwrap().current_context(), Some("staging"));
}
