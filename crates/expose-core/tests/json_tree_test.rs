use expose_core::json::{self, JsonMode, JsonOptions};
use expose_core::{AbstractTyped, DirectValue, Object, Variant};

/// Fill `node` with `width` children per level down to `depth`; every
/// non-root node carries a "name"/"value" pair.
fn build_tree(node: &mut Variant, depth: usize, width: usize, name: &str, base: i64, level: usize, index: usize) {
    let num = if level > 0 { base * 10 + index as i64 + 1 } else { 0 };
    let map = node.as_map_mut();

    if level > 0 {
        map.insert("name".to_string(), Variant::from(name));
        map.insert("value".to_string(), Variant::from(num));
    }
    if level >= depth {
        return;
    }

    for i in 0..width {
        let child_name = if level == 0 {
            format!("Obj{}", i + 1)
        } else {
            format!("{}{}", "Sub".repeat(level), i + 1)
        };
        let child = map.entry(child_name.clone()).or_insert_with(Variant::map);
        build_tree(child, depth, width, &child_name, num, level + 1, i);
    }
}

fn tree() -> Variant {
    let mut root = Variant::map();
    build_tree(&mut root, 2, 2, "", 0, 0, 0);
    root
}

#[test]
fn test_tree_shape() {
    let root = tree();
    let keys: Vec<&String> = root.as_map().unwrap().keys().collect();
    assert_eq!(keys, vec!["Obj1", "Obj2"]);

    let obj2 = root.get("Obj2").unwrap();
    assert_eq!(obj2.get("value"), Some(&Variant::Int64(2)));
    let sub1 = obj2.get("Sub1").unwrap();
    assert_eq!(sub1.get("name"), Some(&Variant::from("Sub1")));
    assert_eq!(sub1.get("value"), Some(&Variant::Int64(21)));
}

#[test]
fn test_tree_round_trip_beautified() {
    let root = tree();
    let text = json::to_json(&root, JsonMode::Beautified);
    assert!(text.starts_with("{\n    \"Obj1\": {\n        \"name\": \"Obj1\","));

    let parsed = json::parse(&text).unwrap();
    assert_eq!(parsed, root);

    let original_keys: Vec<_> = root.get("Obj1").unwrap().as_map().unwrap().keys().collect();
    let parsed_keys: Vec<_> = parsed.get("Obj1").unwrap().as_map().unwrap().keys().collect();
    assert_eq!(parsed_keys, original_keys);
}

#[test]
fn test_tree_round_trip_compact() {
    let root = tree();
    let text = json::to_json(&root, JsonMode::Compact);
    assert!(!text.contains(' ') && !text.contains('\n'));
    assert_eq!(json::parse(&text).unwrap(), root);
}

#[test]
fn test_custom_indent() {
    let text = json::to_json_with(&tree(), &JsonOptions::beautified().with_indent(1));
    assert!(text.starts_with("{\n \"Obj1\": {\n  \"name\""));
}

#[test]
fn test_object_tree_round_trip() {
    let mut root = Object::new("root");
    for i in 1..=2 {
        let mut obj = Object::new(format!("Obj{}", i));
        obj.add("name", DirectValue::new(format!("Obj{}", i))).unwrap();
        obj.add("value", DirectValue::new(i as i64)).unwrap();
        for j in 1..=2 {
            let mut sub = Object::new(format!("Sub{}", j));
            sub.add("name", DirectValue::new(format!("Sub{}", j))).unwrap();
            sub.add("value", DirectValue::new((i * 10 + j) as i64)).unwrap();
            obj.add_object(sub).unwrap();
        }
        root.add_object(obj).unwrap();
    }

    let text = root.to_json(JsonMode::Beautified);
    assert_eq!(json::parse(&text).unwrap(), tree());

    let mut edited = json::parse(&text).unwrap();
    let sub = edited.get_mut("Obj1").and_then(|o| o.get_mut("Sub2")).unwrap();
    sub.as_map_mut().insert("value".to_string(), Variant::from(99));

    assert!(root.from_json(&json::to_json(&edited, JsonMode::Compact)));
    assert_eq!(root.value_at::<i64>("Obj1.Sub2.value"), Ok(99));
    assert_eq!(root.value_at::<i64>("Obj2.Sub2.value"), Ok(22));
}

#[test]
fn test_unsigned_object_tree_round_trip() {
    let mut size = Object::new("size");
    size.add("width", DirectValue::new(640u32)).unwrap();
    size.add("bytes", DirectValue::new(u64::MAX)).unwrap();
    let mut root = Object::new("root");
    root.add("count", DirectValue::new(3u8)).unwrap();
    root.add("offset", DirectValue::new(-3i32)).unwrap();
    root.add_object(size).unwrap();

    for mode in [JsonMode::Compact, JsonMode::Beautified] {
        let parsed = json::parse(&root.to_json(mode)).unwrap();
        assert_eq!(parsed, root.to_variant());
        assert!(root.from_variant(&parsed));
    }
    assert_eq!(root.value_at::<u32>("size.width"), Ok(640));
    assert_eq!(root.value_at::<u64>("size.bytes"), Ok(u64::MAX));
}

#[test]
fn test_parse_failure_returns_no_tree() {
    let text = json::to_json(&tree(), JsonMode::Compact);
    let truncated = &text[..text.len() - 3];
    let err = json::parse(truncated).unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.to_string().contains("line 1"));
}
