use panelkit_data::TreeDataStore;
use panelkit_data::model::Children;
use panelkit_data::model::Record;
use panelkit_data::query::Filter;
use panelkit_data::query::Filters;
use panelkit_data::query::Sorters;
use panelkit_data::source::ArraySource;
use panelkit_data::store::StoreConfig;
use serde_json::json;

async fn store() -> TreeDataStore {
    let source = ArraySource::from_json(json!([
        {"id": 1, "name": "docs", "nodes": [
            {"id": 2, "name": "guide.md"},
            {"id": 3, "name": "api", "nodes": [
                {"id": 4, "name": "store.md"},
            ]},
        ]},
        {"id": 5, "name": "src", "nodes": true},
    ]));
    let store = TreeDataStore::new(
        StoreConfig::default()
            .with_primary_keys(["id"])
            .with_children_field("nodes"),
        source,
    );
    store.load().await;
    store
}

fn name(store: &TreeDataStore, path: &[usize]) -> Option<String> {
    store
        .get(path)
        .map(|node| node.record().value("name").to_string())
}

#[tokio::test]
async fn test_get_descends_by_path() {
    let store = store().await;
    assert_eq!(name(&store, &[0]).as_deref(), Some("docs"));
    assert_eq!(name(&store, &[0, 1, 0]).as_deref(), Some("store.md"));
    assert!(store.get(&[0]).unwrap().record().get("nodes").is_none());
    assert!(matches!(store.get(&[1]).unwrap().children(), Children::Pending));
}

#[tokio::test]
async fn test_out_of_range_paths_return_none() {
    let store = store().await;
    assert!(store.get(&[]).is_none());
    assert!(store.get(&[2]).is_none());
    assert!(store.get(&[0, 5]).is_none());
    assert!(store.get(&[1, 0]).is_none());
}

#[tokio::test]
async fn test_match_index_finds_depth_first_path() {
    let store = store().await;
    let lookup = Record::new().set("id", 4).with_primary_keys(["id"]);
    assert_eq!(store.match_index(&lookup), Some(vec![0, 1, 0]));

    let missing = Record::new().set("id", 99).with_primary_keys(["id"]);
    assert_eq!(store.match_index(&missing), None);
}

#[tokio::test]
async fn test_sort_and_filter_apply_per_level() {
    let store = store().await;

    store.sort(Sorters::desc("name")).await;
    assert_eq!(name(&store, &[0]).as_deref(), Some("src"));
    assert_eq!(name(&store, &[1, 0]).as_deref(), Some("guide.md"));

    store
        .filter(Filters::new().with("name", Filter::like("store")))
        .await;
    assert_eq!(store.count(), 1);
    assert_eq!(name(&store, &[0, 0, 0]).as_deref(), Some("store.md"));
    assert!(store.get(&[0, 1]).is_none());
}

#[tokio::test]
async fn test_set_children_resolves_pending_node() {
    let store = store().await;
    let src = Record::new().set("id", 5).with_primary_keys(["id"]);
    let rows = json!([{"id": 6, "name": "lib.rs"}, {"id": 7, "name": "main.rs", "nodes": true}]);
    let rows = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_object().cloned().unwrap())
        .collect();

    assert!(store.set_children(&src, rows));
    assert_eq!(name(&store, &[1, 0]).as_deref(), Some("lib.rs"));
    assert!(matches!(store.get(&[1, 1]).unwrap().children(), Children::Pending));

    let missing = Record::new().set("id", 99).with_primary_keys(["id"]);
    assert!(!store.set_children(&missing, Vec::new()));
}
