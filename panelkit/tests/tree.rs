use std::sync::Arc;
use std::sync::Mutex;

use panelkit::input::Key;
use panelkit::input::KeyCombo;
use panelkit::input::Modifiers;
use panelkit::registry::ComponentRegistry;
use panelkit::widgets::events::EventResult;
use panelkit::widgets::events::WidgetEvents;
use panelkit::widgets::render::render_if_dirty;
use panelkit::widgets::scroll::Point;
use panelkit::widgets::scroll::Size;
use panelkit::widgets::selection::SelectionConfig;
use panelkit::widgets::traits::Focusable;
use panelkit::widgets::traits::Selectable;
use panelkit::widgets::tree::Tree;
use panelkit::widgets::tree::TreeConfig;
use panelkit::widgets::tree::TreeEvent;
use panelkit::widgets::tree::TreeEventKind;
use panelkit_data::TreeDataStore;
use panelkit_data::events::EventFlow;
use panelkit_data::query::Sorters;
use panelkit_data::source::ArraySource;
use panelkit_data::source::Row;
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

async fn tree(config: TreeConfig) -> (Tree, TreeDataStore) {
    let store = store().await;
    let tree = Tree::new(config, store.clone(), &ComponentRegistry::new());
    tree.set_viewport(Size::new(300, 240));
    (tree, store)
}

fn names(tree: &Tree) -> Vec<String> {
    tree.nodes()
        .iter()
        .map(|node| node.record.value("name").to_string())
        .collect()
}

fn rows(value: serde_json::Value) -> Vec<Row> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_object().cloned().unwrap())
        .collect()
}

#[tokio::test]
async fn test_only_roots_are_visible_initially() {
    let (tree, _) = tree(TreeConfig::new("name")).await;
    assert_eq!(names(&tree), vec!["docs", "src"]);
    let src = tree.node(1).unwrap();
    assert!(src.expandable && src.pending && !src.expanded);
    assert_eq!(src.path, vec![1]);
}

#[tokio::test]
async fn test_expand_and_collapse() {
    let (tree, _) = tree(TreeConfig::new("name")).await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in [TreeEventKind::Expand, TreeEventKind::Collapse] {
        let seen = Arc::clone(&seen);
        tree.on(kind, move |event| {
            seen.lock().unwrap().push(event.clone());
            EventFlow::Continue
        });
    }

    assert!(tree.expand(0));
    assert!(!tree.expand(0));
    assert_eq!(names(&tree), vec!["docs", "guide.md", "api", "src"]);
    assert_eq!(tree.node(2).unwrap().depth, 1);
    assert_eq!(tree.node(2).unwrap().path, vec![0, 1]);
    assert!(!tree.expand(1));

    assert!(tree.collapse(0));
    assert_eq!(names(&tree), vec!["docs", "src"]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(matches!(&seen[0], TreeEvent::Expand { pending: false, path, .. } if path == &vec![0]));
    assert!(matches!(&seen[1], TreeEvent::Collapse { .. }));
}

#[tokio::test]
async fn test_pending_node_shows_children_once_attached() {
    let (tree, store) = tree(TreeConfig::new("name")).await;
    let requested = Arc::new(Mutex::new(None));
    {
        let requested = Arc::clone(&requested);
        tree.on(TreeEventKind::Expand, move |event| {
            if let TreeEvent::Expand { record, pending: true, .. } = event {
                *requested.lock().unwrap() = Some(record.clone());
            }
            EventFlow::Continue
        });
    }

    assert!(tree.expand(1));
    assert_eq!(names(&tree), vec!["docs", "src"]);
    let record = requested.lock().unwrap().clone().unwrap();

    assert!(store.set_children(
        &record,
        rows(json!([
            {"id": 6, "name": "lib.rs"},
            {"id": 7, "name": "main.rs"},
        ])),
    ));
    assert_eq!(names(&tree), vec!["docs", "src", "lib.rs", "main.rs"]);
    let src = tree.node(1).unwrap();
    assert!(src.expanded && !src.pending);
}

#[tokio::test]
async fn test_arrow_keys_walk_the_tree() {
    let (tree, _) = tree(TreeConfig::new("name")).await;
    tree.set_cursor(0);

    assert_eq!(tree.on_key(KeyCombo::new(Key::Right)), EventResult::Consumed);
    assert!(tree.is_expanded(0));
    tree.on_key(KeyCombo::new(Key::Right));
    assert_eq!(tree.cursor(), Some(1));
    assert_eq!(tree.on_key(KeyCombo::new(Key::Right)), EventResult::Ignored);

    tree.on_key(KeyCombo::new(Key::Left));
    assert_eq!(tree.cursor(), Some(0));
    tree.on_key(KeyCombo::new(Key::Left));
    assert!(!tree.is_expanded(0));
    assert_eq!(tree.on_key(KeyCombo::new(Key::Left)), EventResult::Ignored);

    tree.on_key(KeyCombo::new(Key::Down));
    assert_eq!(tree.cursor(), Some(1));
}

#[tokio::test]
async fn test_collapse_moves_cursor_out_of_subtree() {
    let (tree, _) = tree(TreeConfig::new("name")).await;
    tree.expand(0);
    tree.expand(2);
    assert_eq!(names(&tree), vec!["docs", "guide.md", "api", "store.md", "src"]);

    tree.set_cursor(3);
    tree.collapse(0);
    assert_eq!(tree.cursor(), Some(0));

    // nested expansion is remembered
    tree.expand(0);
    assert_eq!(tree.item_count(), 5);
    tree.set_cursor(4);
    tree.collapse(0);
    assert_eq!(tree.cursor(), Some(1));
    assert_eq!(tree.node(1).unwrap().record.value("name").to_string(), "src");
}

#[tokio::test]
async fn test_sorting_keeps_expansion() {
    let (tree, store) = tree(TreeConfig::new("name")).await;
    tree.expand(0);
    store.sort(Sorters::desc("name")).await;
    assert_eq!(names(&tree), vec!["src", "docs", "guide.md", "api"]);
}

#[tokio::test]
async fn test_keepable_selection_follows_hidden_nodes() {
    let (tree, store) = tree(
        TreeConfig::new("name").with_selection(SelectionConfig::multiple().with_keepable(true)),
    )
    .await;
    tree.expand(0);
    tree.expand(2);
    tree.select_row(3);
    tree.collapse(0);
    assert!(tree.selected_rows().is_empty());
    assert_eq!(tree.selected_records().len(), 1);

    store.reload().await;
    assert_eq!(tree.selected_records().len(), 1);
}

#[tokio::test]
async fn test_selection_resets_on_reload() {
    let (tree, store) = tree(TreeConfig::new("name")).await;
    tree.select_row(1);
    store.reload().await;
    assert!(tree.selected_records().is_empty());
}

#[tokio::test]
async fn test_pointer_on_expander_toggles() {
    let (tree, _) = tree(TreeConfig::new("name").with_indent(16)).await;

    assert_eq!(tree.on_click(Point::new(5, 5), Modifiers::NONE), EventResult::Consumed);
    assert!(tree.is_expanded(0));
    assert!(tree.selected_rows().is_empty());

    tree.on_click(Point::new(60, 5), Modifiers::NONE);
    assert_eq!(tree.selected_rows(), vec![0]);

    // guide.md is a leaf at depth 1: double click opens it
    let opened = Arc::new(Mutex::new(false));
    {
        let opened = Arc::clone(&opened);
        tree.on(TreeEventKind::OpenItem, move |_| {
            *opened.lock().unwrap() = true;
            EventFlow::Continue
        });
    }
    assert_eq!(tree.on_double_click(Point::new(60, 30)), EventResult::Consumed);
    assert!(*opened.lock().unwrap());

    tree.on_double_click(Point::new(60, 5));
    assert!(!tree.is_expanded(0));
}

#[tokio::test]
async fn test_render_indents_by_depth() {
    let (tree, _) = tree(TreeConfig::new("name").with_indent(12)).await;
    tree.expand(0);
    let frame = render_if_dirty(&tree).unwrap();
    let item = &frame.items[1];
    assert_eq!((item.depth, item.indent, item.text.as_str()), (1, 12, "guide.md"));
    assert!(frame.items[0].expanded);
    assert!(frame.items[3].pending);
}
