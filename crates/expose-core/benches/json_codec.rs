use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use expose_core::json::{self, JsonMode};
use expose_core::{DirectValue, Object, Variant};

fn build_tree(depth: usize, width: usize, level: usize, base: i64) -> Variant {
    let mut node = Variant::map();
    if level >= depth {
        return node;
    }
    let map = node.as_map_mut();
    for i in 0..width {
        let value = base * 10 + i as i64 + 1;
        let mut child = build_tree(depth, width, level + 1, value);
        let entries = child.as_map_mut();
        entries.insert("name".to_string(), Variant::from(format!("Node{}", value)));
        entries.insert("value".to_string(), Variant::from(value));
        map.insert(format!("Obj{}", i + 1), child);
    }
    node
}

fn build_object(width: usize) -> Object {
    let mut root = Object::new("root");
    for i in 0..width {
        let mut obj = Object::new(format!("Obj{}", i + 1));
        obj.add("name", DirectValue::new(format!("Obj{}", i + 1))).unwrap();
        obj.add("value", DirectValue::new(i as i64)).unwrap();
        obj.add("ratio", DirectValue::new(i as f64 / 2.0)).unwrap();
        obj.add("tags", DirectValue::new(vec!["a".to_string(), "b".to_string()])).unwrap();
        root.add_object(obj).unwrap();
    }
    root
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for (depth, width) in [(2, 2), (4, 4)] {
        let tree = build_tree(depth, width, 0, 0);
        group.bench_with_input(
            BenchmarkId::new("compact", format!("{}x{}", depth, width)),
            &tree,
            |b, tree| b.iter(|| json::to_json(black_box(tree), JsonMode::Compact)),
        );
        group.bench_with_input(
            BenchmarkId::new("beautified", format!("{}x{}", depth, width)),
            &tree,
            |b, tree| b.iter(|| json::to_json(black_box(tree), JsonMode::Beautified)),
        );
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (depth, width) in [(2, 2), (4, 4)] {
        let text = json::to_json(&build_tree(depth, width, 0, 0), JsonMode::Beautified);
        group.bench_with_input(
            BenchmarkId::new("tree", format!("{}x{}", depth, width)),
            &text,
            |b, text| b.iter(|| json::parse(black_box(text)).unwrap()),
        );
    }

    group.finish();
}

fn bench_object(c: &mut Criterion) {
    let mut root = build_object(64);
    let text = root.to_json(JsonMode::Compact);

    c.bench_function("object_to_json", |b| {
        b.iter(|| black_box(&root).to_json(JsonMode::Compact))
    });

    c.bench_function("object_from_json", |b| {
        b.iter(|| assert!(root.from_json(black_box(&text))))
    });
}

criterion_group!(benches, bench_serialize, bench_parse, bench_object);
criterion_main!(benches);
