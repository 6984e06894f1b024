//! Require cache integration tests
//!
//! Exercises the caching contract through `require()` front-ends: one object
//! per specifier, mutations visible to every holder, and no eviction.

use quill_macros::{assert_distinct, assert_err, assert_node_error, assert_ok, assert_same};
use quill_node::{
    create_require, create_require_in, BuilderTable, ModuleRegistry, ModuleState, Namespace,
    NodeError, RequireContext, Result, Specifier, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fresh_registry() -> Arc<ModuleRegistry> {
    Arc::new(ModuleRegistry::with_node_builtins())
}

fn noop(name: &str) -> Value {
    Value::function(name, |_| Ok(Value::Undefined))
}

#[test]
fn test_patch_and_restore_builtins() {
    let registry = fresh_registry();
    let a = create_require_in(Arc::clone(&registry), RequireContext::new("/app/a.js"));
    let b = create_require_in(Arc::clone(&registry), RequireContext::new("/app/b.js"));

    for (specifier, export) in [
        ("node:timers", "setTimeout"),
        ("node:timers/promises", "setTimeout"),
        ("node:buffer", "Buffer"),
        ("node:util", "format"),
    ] {
        let original = assert_ok!(a.call(specifier)).get(export).unwrap();

        let patch = noop("patched");
        assert_ok!(a.call(specifier)).set(export, patch.clone());
        let seen = assert_ok!(b.call(specifier)).get(export).unwrap();
        assert!(seen.strict_equals(&patch), "{} patch not visible", specifier);

        assert_ok!(b.call(specifier)).set(export, original.clone());
        let restored = assert_ok!(a.call(specifier)).get(export).unwrap();
        assert!(restored.strict_equals(&original), "{} not restored", specifier);
    }
}

#[test]
fn test_buffer_patch_reaches_later_require() {
    let require = create_require_in(fresh_registry(), RequireContext::default());

    let buffer = assert_ok!(require.call("node:buffer"));
    let original = buffer.get("Buffer").unwrap();
    let replacement = noop("FakeBuffer");
    buffer.set("Buffer", replacement.clone());

    let later = assert_ok!(require.call("node:buffer"));
    assert_same!(buffer, later);
    assert!(later.get("Buffer").unwrap().strict_equals(&replacement));

    later.set("Buffer", original.clone());
    assert!(buffer.get("Buffer").unwrap().strict_equals(&original));
}

#[test]
fn test_timers_promises_handles_share_mutations() {
    let require = create_require_in(fresh_registry(), RequireContext::default());
    let first = assert_ok!(require.call("node:timers/promises"));
    let second = assert_ok!(require.call("node:timers/promises"));
    assert_same!(first, second);

    let patched = noop("patchedSetTimeout");
    first.set("setTimeout", patched.clone());
    assert!(second.get("setTimeout").unwrap().strict_equals(&patched));

    second.set("extra", Value::Number(1.0));
    assert_eq!(first.get("extra"), Some(Value::Number(1.0)));
}

#[test]
fn test_timers_and_promises_are_distinct() {
    let require = create_require_in(fresh_registry(), RequireContext::default());
    let timers = assert_ok!(require.call("node:timers"));
    let promises = assert_ok!(require.call("node:timers/promises"));
    assert_distinct!(timers, promises);

    timers.set("marker", Value::Boolean(true));
    assert!(!promises.has("marker"));
}

#[test]
fn test_builder_invoked_once_across_front_ends() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut table = BuilderTable::new();
    table.register("node:counted", move |_: &Specifier| -> Result<Namespace> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Namespace::from_entries([("value", Value::Number(1.0))]))
    });
    let registry = Arc::new(ModuleRegistry::new(table));

    let first = create_require_in(Arc::clone(&registry), RequireContext::new("/one.js"));
    let handles: Vec<Namespace> = (0..5)
        .map(|i| {
            let require =
                create_require_in(Arc::clone(&registry), RequireContext::new(format!("/{}.js", i)));
            assert_ok!(require.call("node:counted"))
        })
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let baseline = assert_ok!(first.call("node:counted"));
    for handle in &handles {
        assert_same!(baseline, *handle);
    }
}

#[test]
fn test_unknown_specifier_leaves_no_entry() {
    let registry = fresh_registry();
    let require = create_require_in(Arc::clone(&registry), RequireContext::default());

    for _ in 0..2 {
        let err = assert_err!(require.call("node:nonexistent"));
        assert_eq!(err, NodeError::ModuleNotFound("node:nonexistent".to_string()));
    }
    assert_eq!(
        registry.state(&Specifier::new("node:nonexistent")),
        ModuleState::Absent
    );
    assert!(registry.is_empty());
    assert_eq!(registry.stats().not_found, 2);
}

#[test]
fn test_unknown_bare_name_keeps_its_spelling() {
    let registry = fresh_registry();
    let require = create_require_in(Arc::clone(&registry), RequireContext::default());

    let err = assert_node_error!(require.call("lodash"), ModuleNotFound);
    assert_eq!(err.to_string(), "Cannot find module 'lodash'");
    assert_eq!(assert_ok!(require.resolve("buffer")), "node:buffer");
    assert!(registry.is_empty());
}

#[test]
fn test_failed_build_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let mut table = BuilderTable::new();
    table.register("node:flaky", move |spec: &Specifier| -> Result<Namespace> {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(NodeError::builder(spec.as_str(), "not ready"));
        }
        Ok(Namespace::new())
    });
    let registry = Arc::new(ModuleRegistry::new(table));
    let require = create_require_in(Arc::clone(&registry), RequireContext::default());

    assert_node_error!(require.call("node:flaky"), Builder);
    assert_eq!(registry.state(&Specifier::new("node:flaky")), ModuleState::Absent);

    let built = assert_ok!(require.call("node:flaky"));
    assert_same!(built, assert_ok!(require.call("node:flaky")));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_global_registry_shared_by_create_require() {
    let a = create_require(RequireContext::new("/srv/a.js"));
    let b = create_require(RequireContext::new("/srv/nested/b.js"));

    let from_a = assert_ok!(a.call("node:util"));
    let from_b = assert_ok!(b.call("util"));
    assert_same!(from_a, from_b);
    assert!(Arc::ptr_eq(a.registry(), b.registry()));
}

#[test]
fn test_disabled_builtin_is_not_found() {
    let config = quill_node::RuntimeConfig::from_toml_str("disabled_builtins = [\"path\"]").unwrap();
    let registry = Arc::new(ModuleRegistry::from_config(&config));
    let require = create_require_in(registry, RequireContext::default());

    assert_node_error!(require.call("node:path"), ModuleNotFound);
    assert_ok!(require.call("node:timers"));
}
