use expose_core::{
    AbstractTyped, ComponentError, ComponentInfo, ComponentRegistry, DirectValue, JsonMode, Object,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn settings(version: u32) -> Object {
    let mut root = Object::new("settings");
    root.add("schema", DirectValue::new(version)).unwrap();
    root.add("title", DirectValue::new(String::from("untitled"))).unwrap();
    root
}

fn registry() -> ComponentRegistry<dyn AbstractTyped> {
    let mut registry: ComponentRegistry<dyn AbstractTyped> = ComponentRegistry::new();
    for version in ["1.0.0", "1.4.2", "2.0.0-beta.1", "2.0.0"] {
        let schema = version.as_bytes()[0] - b'0';
        let info = ComponentInfo::new("settings", "Object", version)
            .unwrap()
            .with_description("application settings");
        registry
            .register(info, move || Box::new(settings(u32::from(schema))))
            .unwrap();
    }
    registry
        .register(
            ComponentInfo::new("counter", "u64", "0.1.0").unwrap(),
            || Box::new(DirectValue::new(0u64)),
        )
        .unwrap();
    registry
}

#[test]
fn test_highest_matching_version_wins() {
    init_logging();
    let registry = registry();

    assert_eq!(registry.find("settings", "^1").unwrap().version.to_string(), "1.4.2");
    assert_eq!(registry.find("settings", "*").unwrap().version.to_string(), "2.0.0");
    assert_eq!(registry.find("settings", "~1.0").unwrap().version.to_string(), "1.0.0");
    assert_eq!(registry.find("settings", "=2.0.0-beta.1").unwrap().version.to_string(), "2.0.0-beta.1");
}

#[test]
fn test_instances_are_independent() {
    init_logging();
    let registry = registry();

    let mut first = registry.instantiate("settings", "^2").unwrap();
    let second = registry.instantiate("settings", "^2").unwrap();
    assert!(first.is_object());
    assert!(first.from_string(r#"{"title": "changed"}"#));

    let text = AbstractTyped::to_string(&*first);
    assert_eq!(text, r#"{"schema":2,"title":"changed"}"#);
    assert_eq!(second.to_variant().get("title").map(|t| t.to_string()), Some("untitled".to_string()));

    let object = first.as_any().downcast_ref::<Object>().unwrap();
    assert_eq!(object.to_json(JsonMode::Compact), text);
}

#[test]
fn test_interface_listing() {
    let registry = registry();
    assert_eq!(registry.len(), 5);
    assert_eq!(registry.components_for("Object").count(), 4);

    let counters: Vec<_> = registry.components_for("u64").map(|info| info.name.as_str()).collect();
    assert_eq!(counters, vec!["counter"]);

    let mut counter = registry.instantiate("counter", ">=0.1").unwrap();
    assert!(counter.from_i64(7));
    assert_eq!(counter.to_u64(), 7);
    assert!(counter.from_i64(-3));
    assert_eq!(counter.to_u64(), 0);
}

#[test]
fn test_lookup_failures() {
    init_logging();
    let registry = registry();

    let err = registry.instantiate("settings", "^3").err().unwrap();
    assert_eq!(
        err,
        ComponentError::NotFound {
            name: "settings".to_string(),
            requirement: "^3".to_string(),
        }
    );
    assert_eq!(err.to_string(), "Component not found: settings (^3)");

    assert!(matches!(registry.find("missing", "*"), Err(ComponentError::NotFound { .. })));
    assert!(matches!(
        registry.find("settings", "not a version"),
        Err(ComponentError::InvalidVersion { .. })
    ));
}
