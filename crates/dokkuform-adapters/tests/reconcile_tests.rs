//! End-to-end reconciliation against the in-memory Dokku host.

use dokkuform_adapters::{InMemoryDokku, InMemoryStateStore, Manifest};
use dokkuform_core::prelude::*;

const MANIFEST: &str = r#"
[apps.web]
name = "web"
domains = ["example.com"]

[apps.web.config]
DATABASE_URL = "postgres://u:p@db:5432/web"
GREETING = "hello world"
"#;

fn services(host: &InMemoryDokku) -> (AppService, StateService) {
    (
        AppService::new(Box::new(host.clone())),
        StateService::new(Box::new(InMemoryStateStore::new())),
    )
}

#[test]
fn apply_twice_converges() {
    let host = InMemoryDokku::new().with_global_vhost("dokku.me");
    let (apps, state) = services(&host);
    let entry = Manifest::parse(MANIFEST).unwrap().get("web").cloned().unwrap();

    let outcome = apps.apply(&entry.app, None).unwrap();
    state.record(&entry.id, &outcome).unwrap();

    assert_eq!(outcome.plan.action(), PlanAction::Create);
    assert_eq!(host.app("web").unwrap(), entry.app);
    // The default vhost is cleared by `domains:set`.
    assert!(!host.app("web").unwrap().domains.contains("web.dokku.me"));

    let prior = state.get(&entry.id).unwrap();
    host.clear_history();
    let plan = apps.plan(&entry.app, prior.as_ref()).unwrap();

    assert!(plan.is_noop());
    assert!(host.mutations().is_empty());
}

#[test]
fn dropped_keys_are_unset_but_platform_keys_survive() {
    let host = InMemoryDokku::new();
    let (apps, state) = services(&host);

    let first = DokkuApp::new(AppName::new("web").unwrap())
        .with_config_var("A", "1")
        .with_config_var("B", "2");
    let outcome = apps.apply(&first, None).unwrap();
    state.record("web", &outcome).unwrap();

    host.run("config:set web DOKKU_APP_TYPE=dockerfile").unwrap();
    host.clear_history();

    let second = DokkuApp::new(AppName::new("web").unwrap()).with_config_var("A", "1");
    let prior = state.get("web").unwrap();
    apps.apply(&second, prior.as_ref()).unwrap();

    assert_eq!(host.mutations(), vec!["config:unset web B"]);
    let remote = host.app("web").unwrap();
    assert_eq!(remote.config_vars.get("DOKKU_APP_TYPE"), Some("dockerfile"));
    assert!(!remote.config_vars.contains_key("B"));
}

#[test]
fn rename_keeps_config_and_domains() {
    let host = InMemoryDokku::new();
    let (apps, state) = services(&host);

    let old = DokkuApp::new(AppName::new("web").unwrap())
        .with_config_var("A", "1")
        .with_domain("a.io");
    state.record("site", &apps.apply(&old, None).unwrap()).unwrap();
    host.clear_history();

    let renamed = DokkuApp::new(AppName::new("site").unwrap())
        .with_config_var("A", "1")
        .with_domain("a.io");
    let prior = state.get("site").unwrap();
    let outcome = apps.apply(&renamed, prior.as_ref()).unwrap();

    assert_eq!(host.mutations(), vec!["apps:rename web site"]);
    assert!(host.app("web").is_none());
    assert_eq!(outcome.app, renamed);
}

#[test]
fn values_with_quotes_survive_the_round_trip() {
    let host = InMemoryDokku::new();
    let (apps, _) = services(&host);

    let desired = DokkuApp::new(AppName::new("web").unwrap())
        .with_config_var("MOTD", "it's a 'test'")
        .with_config_var("EMPTY", "");
    let outcome = apps.apply(&desired, None).unwrap();

    assert_eq!(outcome.app.config_vars.get("MOTD"), Some("it's a 'test'"));
    assert_eq!(outcome.app.config_vars.get("EMPTY"), Some(""));
}

#[test]
fn destroy_removes_app() {
    let host = InMemoryDokku::new();
    let (apps, _) = services(&host);
    let name = AppName::new("web").unwrap();

    apps.apply(&DokkuApp::new(name.clone()), None).unwrap();
    let plan = apps.destroy(&name).unwrap();

    assert_eq!(plan.action(), PlanAction::Delete);
    assert!(host.app("web").is_none());
    assert!(apps.destroy(&name).unwrap().is_noop());
}

#[test]
fn failure_stops_apply_midway() {
    let host = InMemoryDokku::new();
    host.fail_on("config:set", 1);
    let (apps, _) = services(&host);

    let desired = DokkuApp::new(AppName::new("web").unwrap())
        .with_config_var("A", "1")
        .with_domain("a.io");
    let err = apps.apply(&desired, None).unwrap_err();

    assert!(err.to_string().contains("step 2/3"));
    assert!(host.app("web").is_some());
    assert!(!host.mutations().iter().any(|c| c.starts_with("domains:")));
}

#[test]
fn padded_config_value_is_refused_before_touching_the_host() {
    let host = InMemoryDokku::new();
    let (apps, _) = services(&host);

    let padded = DokkuApp::new(AppName::new("web").unwrap()).with_config_var("PAD", " x ");
    let err = apps.apply(&padded, None).unwrap_err();

    assert!(err.to_string().contains("PAD"));
    assert!(host.mutations().is_empty());
    assert!(Manifest::parse("[apps.web.config]\nPAD = \" x \"\n").is_err());
}
