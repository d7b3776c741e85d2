//! End-to-end tests for configuration trees: navigation, values, overrides,
//! deep copies and cross-tree links.

use pretty_assertions::assert_eq;
use serde_json::json;
use strata_config::{ConfigError, ConfigValue, Configuration, CopyMemo, MaterializeOptions, Provider};

fn value(json: serde_json::Value) -> ConfigValue {
    ConfigValue::from(json)
}

fn abcd(c: i64, d: i64) -> ConfigValue {
    value(json!({"a": {"b": {"c": c, "d": d}}}))
}

fn node(config: &Configuration, path: &str) -> Configuration {
    config.at_path(path).unwrap()
}

fn resolved(config: &Configuration, path: &str) -> ConfigValue {
    node(config, path).resolve().unwrap()
}

fn assert_abcd(config: &Configuration, c: i64, d: i64) {
    assert_eq!(resolved(config, "a"), value(json!({"b": {"c": c, "d": d}})));
    assert_eq!(resolved(config, "a.b"), value(json!({"c": c, "d": d})));
    assert_eq!(resolved(config, "a.b.c"), ConfigValue::Integer(c));
    assert_eq!(resolved(config, "a.b.d"), ConfigValue::Integer(d));
}

#[test]
fn default_name() {
    assert_eq!(Configuration::default().name(), "config");
}

#[test]
fn nodes_are_providers_not_delegates() {
    let config = Configuration::new("config");
    for path in ["a", "a.b", "a.b.c", "a.b.d"] {
        assert!(node(&config, path).is_provider());
        assert!(!node(&config, path).is_delegated());
    }
}

#[test]
fn navigation_is_identity_stable() {
    let config = Configuration::new("config");
    for path in ["a", "a.b", "a.b.c", "a.b.d"] {
        assert!(node(&config, path).ptr_eq(&node(&config, path)));
    }
}

#[test]
fn dotted_name() {
    let config = Configuration::new("config");
    assert_eq!(node(&config, "a.b.c").name(), "config.a.b.c");
}

#[test]
fn value_set_after_navigation() {
    let config = Configuration::new("config");
    let a = node(&config, "a");
    let ab = node(&config, "a.b");
    let abc = node(&config, "a.b.c");
    let abd = node(&config, "a.b.d");

    config.update(abcd(1, 2));

    assert_eq!(a.resolve().unwrap(), value(json!({"b": {"c": 1, "d": 2}})));
    assert_eq!(ab.resolve().unwrap(), value(json!({"c": 1, "d": 2})));
    assert_eq!(abc.resolve().unwrap(), ConfigValue::Integer(1));
    assert_eq!(abd.resolve().unwrap(), ConfigValue::Integer(2));
}

#[test]
fn value_set_before_navigation() {
    let config = Configuration::new("config");
    config.update(abcd(1, 2));
    assert_abcd(&config, 1, 2);
}

#[test]
fn override_after_navigation() {
    let config = Configuration::new("config");
    let abc = node(&config, "a.b.c");
    config.push_override(abcd(1, 2));
    assert_eq!(abc.resolve().unwrap(), ConfigValue::Integer(1));
    assert_abcd(&config, 1, 2);
}

#[test]
fn override_before_navigation() {
    let config = Configuration::new("config");
    config.push_override(abcd(1, 2));
    assert_abcd(&config, 1, 2);
}

#[test]
fn default_value() {
    let config = Configuration::with_default("config", abcd(1, 2));
    assert_abcd(&config, 1, 2);
}

#[test]
fn default_value_overriding_and_reset() {
    let config = Configuration::with_default("config", abcd(1, 2));
    assert_abcd(&config, 1, 2);

    config.push_override(abcd(3, 4));
    assert_abcd(&config, 3, 4);

    config.reset_override();
    assert_abcd(&config, 1, 2);
}

#[test]
fn partial_override_keeps_siblings() {
    let config = Configuration::new("config");
    config.update(abcd(1, 2));
    config.push_override(value(json!({"a": {"b": {"c": 3}}})));
    assert_eq!(resolved(&config, "a.b.c"), ConfigValue::Integer(3));
    assert_eq!(resolved(&config, "a.b.d"), ConfigValue::Integer(2));
}

#[test]
fn stacked_overrides_latest_wins() {
    let config = Configuration::new("config");
    config.push_override(value(json!({"x": 1, "keep": true})));
    config.push_override(value(json!({"x": 2})));
    assert_eq!(config.resolve().unwrap(), value(json!({"x": 2, "keep": true})));

    config.reset_last_override();
    assert_eq!(config.resolve().unwrap(), value(json!({"x": 1, "keep": true})));
}

#[test]
fn override_on_child_node() {
    let config = Configuration::new("config");
    config.update(abcd(1, 2));
    let c = node(&config, "a.b.c");
    let handle = c.push_override(9.into());

    assert_eq!(resolved(&config, "a.b"), value(json!({"c": 9, "d": 2})));
    assert!(handle.release());
    assert_eq!(resolved(&config, "a.b"), value(json!({"c": 1, "d": 2})));
}

#[test]
fn descendant_value_beats_root_override() {
    let config = Configuration::new("config");
    config.push_override(value(json!({"a": {"b": {"c": 7, "d": 8}}})));
    node(&config, "a.b.c").update(5.into());
    assert_eq!(resolved(&config, "a.b.c"), ConfigValue::Integer(5));
    assert_eq!(resolved(&config, "a.b"), value(json!({"c": 5, "d": 8})));

    config.reset_override();
    assert_eq!(resolved(&config, "a.b"), value(json!({"c": 5})));
}

#[test]
fn descendant_override_beats_root_override() {
    let config = Configuration::new("config");
    node(&config, "a.b").push_override(value(json!({"c": 1})));
    config.push_override(value(json!({"a": {"b": {"c": 2}}})));
    assert_eq!(resolved(&config, "a.b.c"), ConfigValue::Integer(1));
}

#[test]
fn undefined_option_is_null() {
    let config = Configuration::new("config");
    assert_eq!(resolved(&config, "a"), ConfigValue::Null);
    assert_eq!(resolved(&config, "a.b.c"), ConfigValue::Null);
}

#[test]
fn scalar_parent_has_no_children() {
    let config = Configuration::new("config");
    config.update(value(json!({"a": "flat"})));
    assert_eq!(resolved(&config, "a.b"), ConfigValue::Null);
}

#[test]
fn special_attributes_are_rejected() {
    let config = Configuration::new("config");
    assert!(matches!(
        config.child("__name__"),
        Err(ConfigError::ReservedName { .. })
    ));

    let a = node(&config, "a");
    match a.child("__name__") {
        Err(ConfigError::ReservedName { name, path }) => {
            assert_eq!(name, "__name__");
            assert_eq!(path, "config.a");
        }
        other => panic!("expected ReservedName, got {:?}", other),
    }
}

#[test]
fn deep_copy_is_a_new_node() {
    let config = Configuration::new("config");
    let copy = config.deep_copy_fresh();
    assert!(!copy.ptr_eq(&config));
    assert!(copy.is_root());
    assert_eq!(copy.name(), "config");
}

#[test]
fn deep_copy_from_memo() {
    let config = Configuration::new("config");
    let seeded = Configuration::new("config");

    let mut memo = CopyMemo::new();
    memo.insert(&config, seeded.clone());

    let copy = config.deep_copy(&mut memo);
    assert!(copy.ptr_eq(&seeded));
}

#[test]
fn deep_copy_overridden() {
    let config = Configuration::new("config");
    let other = Configuration::new("other");
    other.update("object".into());
    config.push_override(ConfigValue::Provider(other.clone()));

    let copy = config.deep_copy_fresh();
    assert!(!copy.ptr_eq(&config));

    let overridden = copy.overridden();
    let linked = overridden[0].as_provider().unwrap();
    assert!(!linked.ptr_eq(&other));
    assert_eq!(linked.name(), "other");
    assert_eq!(copy.resolve().unwrap(), ConfigValue::from("object"));
}

#[test]
fn debug_representation() {
    let config = Configuration::new("config");
    let rendered = format!("{:?}", config);
    let address = rendered.strip_prefix("Configuration(\"config\") at 0x").unwrap();
    assert!(usize::from_str_radix(address, 16).is_ok());

    let rendered = format!("{:?}", node(&config, "a.b.c"));
    let address = rendered
        .strip_prefix("ConfigurationOption(\"config.a.b.c\") at 0x")
        .unwrap();
    assert!(usize::from_str_radix(address, 16).is_ok());
}

#[test]
fn distinct_nodes_render_distinct_addresses() {
    let config = Configuration::new("config");
    let a = format!("{:?}", node(&config, "a"));
    let b = format!("{:?}", node(&config, "b"));
    assert_ne!(a.rsplit(' ').next(), b.rsplit(' ').next());
    assert_eq!(a, format!("{:?}", node(&config, "a")));
}

#[test]
fn provider_cycle_is_reported() {
    let config = Configuration::new("config");
    config.push_override(ConfigValue::Provider(node(&config, "loop")));

    let options = MaterializeOptions { max_depth: 16 };
    match config.resolve_with_options(&options) {
        Err(ConfigError::NestingTooDeep { max_depth, .. }) => assert_eq!(max_depth, 16),
        other => panic!("expected NestingTooDeep, got {:?}", other),
    }
    assert!(matches!(
        config.resolve(),
        Err(ConfigError::NestingTooDeep { max_depth: 256, .. })
    ));
}

#[test]
fn link_within_one_tree() {
    let config = Configuration::new("config");
    node(&config, "database.url").update("postgres://db".into());
    node(&config, "cache.url").push_override(ConfigValue::Provider(node(&config, "database.url")));

    assert_eq!(resolved(&config, "cache.url"), ConfigValue::from("postgres://db"));

    node(&config, "database.url").update("postgres://replica".into());
    assert_eq!(
        config.resolve().unwrap(),
        value(json!({
            "database": {"url": "postgres://replica"},
            "cache": {"url": "postgres://replica"}
        }))
    );
}

mod linking {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A component that is handed a configuration sub-tree and reads `value`
    /// from it on demand.
    struct Component {
        config: Configuration,
    }

    impl Component {
        fn new(name: &str, config: &Configuration) -> Self {
            let own = Configuration::new(name);
            own.push_override(ConfigValue::Provider(config.clone()));
            Self { config: own }
        }

        fn value_getter(&self) -> ConfigValue {
            self.config.child("value").unwrap().resolve().unwrap()
        }
    }

    #[test]
    fn linked_sub_trees() {
        let root = Configuration::new("main");
        let core = Component::new("core", &node(&root, "core"));
        let services = Component::new("services", &node(&root, "services"));

        root.push_override(value(json!({
            "core": {"value": "core"},
            "services": {"value": "services"}
        })));

        assert_eq!(core.config.resolve().unwrap(), value(json!({"value": "core"})));
        assert_eq!(resolved(&core.config, "value"), ConfigValue::from("core"));
        assert_eq!(core.value_getter(), ConfigValue::from("core"));

        assert_eq!(services.config.resolve().unwrap(), value(json!({"value": "services"})));
        assert_eq!(resolved(&services.config, "value"), ConfigValue::from("services"));
        assert_eq!(services.value_getter(), ConfigValue::from("services"));
    }

    #[test]
    fn double_override() {
        let root = Configuration::new("main");
        let core = Component::new("core", &node(&root, "core"));
        let services = Component::new("services", &node(&root, "services"));

        root.push_override(value(json!({
            "core": {"value": "core1"},
            "services": {"value": "services1"}
        })));
        root.push_override(value(json!({
            "core": {"value": "core2"},
            "services": {"value": "services2"}
        })));

        assert_eq!(core.config.resolve().unwrap(), value(json!({"value": "core2"})));
        assert_eq!(core.value_getter(), ConfigValue::from("core2"));
        assert_eq!(services.config.resolve().unwrap(), value(json!({"value": "services2"})));
        assert_eq!(services.value_getter(), ConfigValue::from("services2"));
    }

    #[test]
    fn later_updates_are_observed() {
        let root = Configuration::new("main");
        let core = Component::new("core", &node(&root, "core"));

        root.from_dict(value(json!({"core": {"value": "first"}})));
        assert_eq!(core.value_getter(), ConfigValue::from("first"));

        root.from_dict(value(json!({"core": {"value": "second"}})));
        assert_eq!(core.value_getter(), ConfigValue::from("second"));
    }

    #[test]
    fn linked_value_merges_with_local_keys() {
        let root = Configuration::new("main");
        root.update(value(json!({"core": {"value": "shared", "level": 1}})));

        let local = Configuration::new("local");
        local.update(value(json!({"extra": true})));
        local.push_override(ConfigValue::Provider(node(&root, "core")));

        assert_eq!(
            local.resolve().unwrap(),
            value(json!({"extra": true, "value": "shared", "level": 1}))
        );
    }
}
