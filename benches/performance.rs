use budtree_core::export::to_csv;
use budtree_core::{
    compute_total, find_node, project, remove_subtree, set_leaf_amount, BudgetStorage, TreeService,
};
use budtree_domain::BudgetNode;
use budtree_storage_json::JsonBudgetStorage;
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;

/// Root with `width` children, each holding `width` leaves.
fn build_wide_tree(width: usize) -> BudgetNode {
    let children = (1..=width)
        .map(|group| {
            let group_id = format!("1.{group}");
            let leaves = (1..=width)
                .map(|leaf| {
                    BudgetNode::new(
                        format!("{group_id}.{leaf}"),
                        format!("Line {group}-{leaf}"),
                        (group * leaf) as f64,
                    )
                })
                .collect();
            BudgetNode::new(group_id, format!("Group {group}"), 0.0).with_children(leaves)
        })
        .collect();
    BudgetNode::root("Benchmark").with_children(children)
}

fn bench_read_paths(c: &mut Criterion) {
    let tree = build_wide_tree(black_box(100));

    c.bench_function("total_10k_leaves", |b| {
        b.iter(|| black_box(compute_total(&tree)))
    });

    c.bench_function("breakdown_root_100_children", |b| {
        b.iter(|| black_box(project(&tree)))
    });

    c.bench_function("find_last_leaf", |b| {
        b.iter(|| black_box(find_node(&tree, "1.100.100").is_some()))
    });

    c.bench_function("csv_export_10k_leaves", |b| {
        b.iter(|| black_box(to_csv(&tree)))
    });
}

fn bench_mutators(c: &mut Criterion) {
    let tree = build_wide_tree(black_box(100));

    c.bench_function("set_amount_deep_leaf", |b| {
        b.iter(|| black_box(set_leaf_amount(&tree, "1.100.100", 42.0)))
    });

    c.bench_function("add_child_under_group", |b| {
        b.iter(|| black_box(TreeService::add_child(&tree, "1.50")))
    });

    c.bench_function("remove_group_subtree", |b| {
        b.iter_batched(
            || tree.clone(),
            |root| black_box(remove_subtree(&root, "1.50")),
            BatchSize::LargeInput,
        )
    });
}

fn bench_storage(c: &mut Criterion) {
    let tree = build_wide_tree(black_box(50));
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::with_retention(dir.path(), Some(20)).expect("storage");

    c.bench_function("json_save_2500_leaves", |b| {
        b.iter(|| {
            storage.save(&tree, Utc::now()).expect("save budget");
        })
    });

    c.bench_function("json_load_2500_leaves", |b| {
        b.iter(|| {
            let loaded = storage.load().expect("load budget");
            black_box(loaded);
        })
    });
}

criterion_group!(benches, bench_read_paths, bench_mutators, bench_storage);
criterion_main!(benches);
