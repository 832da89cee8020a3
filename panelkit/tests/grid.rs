use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use panelkit::input::Key;
use panelkit::input::KeyCombo;
use panelkit::input::Modifiers;
use panelkit::registry::ComponentRegistry;
use panelkit::widgets::events::EventResult;
use panelkit::widgets::events::WidgetEvents;
use panelkit::widgets::grid::CellPos;
use panelkit::widgets::grid::ColumnConfig;
use panelkit::widgets::grid::Grid;
use panelkit::widgets::grid::GridConfig;
use panelkit::widgets::grid::GridEvent;
use panelkit::widgets::grid::GridEventKind;
use panelkit::widgets::render::render_if_dirty;
use panelkit::widgets::scroll::Point;
use panelkit::widgets::scroll::Size;
use panelkit::widgets::selection::SelectionConfig;
use panelkit::widgets::traits::Focusable;
use panelkit::widgets::traits::Selectable;
use panelkit_data::DataStore;
use panelkit_data::events::EventFlow;
use panelkit_data::model::Record;
use panelkit_data::query::Direction;
use panelkit_data::query::Filter;
use panelkit_data::query::Filters;
use panelkit_data::query::Sorters;
use panelkit_data::source::ArraySource;
use panelkit_data::store::StoreConfig;
use serde_json::json;

fn init_logger() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
}

fn scenario_columns() -> Vec<ColumnConfig> {
    vec![
        ColumnConfig::new("A", "a").with_width(100),
        ColumnConfig::new("B", "b").with_min_width(50),
        ColumnConfig::new("C", "c").with_width(80),
    ]
}

fn fixed_columns(count: usize, width: u32) -> Vec<ColumnConfig> {
    (0..count)
        .map(|i| ColumnConfig::new(format!("Col {i}"), format!("c{i}")).with_width(width))
        .collect()
}

async fn loaded_store() -> DataStore {
    let source = ArraySource::from_json(json!([
        {"id": 1, "name": "ada", "c0": "x"},
        {"id": 2, "name": "bob", "c0": "y"},
        {"id": 3, "name": "cyd", "c0": "z"},
        {"id": 4, "name": "dee", "c0": "w"},
        {"id": 5, "name": "eve", "c0": "v"},
    ]));
    let store = DataStore::new(StoreConfig::default().with_primary_keys(["id"]), source);
    store.load().await;
    store
}

fn empty_store() -> DataStore {
    DataStore::new(StoreConfig::default(), ArraySource::new(Vec::new()))
}

fn ids(records: &[Record]) -> Vec<i64> {
    let mut ids: Vec<i64> = records
        .iter()
        .map(|r| r.get_int("id").unwrap().unwrap())
        .collect();
    ids.sort();
    ids
}

fn collect(grid: &Grid, kinds: &[GridEventKind]) -> Arc<Mutex<Vec<GridEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in kinds {
        let seen = Arc::clone(&seen);
        grid.on(*kind, move |event| {
            seen.lock().unwrap().push(event.clone());
            EventFlow::Continue
        });
    }
    seen
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_frozen_width_follows_pinned_resize() {
    init_logger();
    let grid = Grid::new(
        GridConfig::new(scenario_columns()).with_freeze(1),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    assert_eq!(grid.frozen_width(), 101);
    assert_eq!(grid.frozen_span(), 100);

    let first = grid.leaf(0).unwrap();
    let update = grid.resize_column(first, 150).unwrap();
    assert!(update.changed.contains(&first));
    assert_eq!(grid.frozen_width(), 151);

    let b = grid.column(grid.leaf(1).unwrap()).unwrap();
    let c = grid.column(grid.leaf(2).unwrap()).unwrap();
    assert_eq!((b.width(), b.min_width()), (None, Some(50)));
    assert_eq!(c.width(), Some(80));
}

#[test]
fn test_flex_column_fills_scroll_region() {
    let grid = Grid::new(
        GridConfig::new(scenario_columns()).with_freeze(1),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    let layout = grid.layout();
    let b = layout.column(grid.leaf(1).unwrap()).unwrap();
    let c = layout.column(grid.leaf(2).unwrap()).unwrap();
    assert_eq!(c.width, 80);
    // 399 px of scroll region, one pixel of gap per column
    assert_eq!(b.width + 1 + c.width + 1, 399);
    assert_eq!(layout.scroll_width, 399);
}

#[test]
fn test_update_layout_is_idempotent() {
    let grid = Grid::new(
        GridConfig::new(scenario_columns()),
        empty_store(),
        &ComponentRegistry::new(),
    );
    let first = grid.set_viewport(Size::new(500, 300));
    assert!(first.full);
    assert!(grid.update_layout().is_empty());

    let resized = grid.resize_column(grid.leaf(2).unwrap(), 120).unwrap();
    assert!(!resized.full);
    assert!(!resized.changed.is_empty());
    assert!(grid.update_layout().is_empty());
}

#[test]
fn test_group_header_is_refreshed_when_child_changes() {
    let grid = Grid::new(
        GridConfig::new(vec![
            ColumnConfig::new("Id", "id").with_width(60),
            ColumnConfig::group(
                "Person",
                vec![
                    ColumnConfig::new("First", "first").with_width(100),
                    ColumnConfig::new("Last", "last").with_width(100),
                ],
            ),
        ]),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(800, 300));
    let group = grid.columns().roots()[1];
    let first = grid.leaf(1).unwrap();

    let update = grid.resize_column(first, 140).unwrap();
    assert!(update.changed.contains(&first));
    assert!(update.changed.contains(&group));

    assert!(grid.set_column_hidden(grid.leaf(2).unwrap(), true));
    assert_eq!(grid.layout().header(group).unwrap().width, 140);
}

#[test]
fn test_freeze_is_clamped_below_header_count() {
    let grid = Grid::new(
        GridConfig::new(scenario_columns()).with_freeze(5),
        empty_store(),
        &ComponentRegistry::new(),
    );
    assert_eq!(grid.freeze(), 2);
    grid.set_freeze(0);
    assert_eq!(grid.freeze(), 0);
    grid.set_viewport(Size::new(500, 300));
    assert_eq!(grid.frozen_width(), 0);
}

#[test]
fn test_check_column_is_pinned_ahead_of_user_columns() {
    let grid = Grid::new(
        GridConfig::new(scenario_columns())
            .with_freeze(1)
            .with_selection(SelectionConfig::check()),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    assert!(grid.column(grid.leaf(0).unwrap()).unwrap().is_check());
    assert_eq!(grid.frozen_width(), 41 + 101);
}

// =============================================================================
// Resize
// =============================================================================

#[test]
fn test_resize_drag_autoscrolls_near_edge() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(6, 100)).with_freeze(1),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    let scroll = grid.scroll_controller().clone();
    let key = grid.leaf(1).unwrap();

    // right edge of the first scrolling column, in grid coordinates
    assert!(grid.begin_resize(key, 101 + 100));
    assert!(grid.is_resizing());

    assert!(grid.drag_resize(300));
    assert_eq!(scroll.auto_scroll(), Point::ZERO);
    assert_eq!(grid.column(key).unwrap().width(), Some(199));

    assert!(grid.drag_resize(495));
    assert_eq!(scroll.auto_scroll(), Point::new(10, 0));

    assert!(grid.drag_resize(900));
    assert_eq!(scroll.auto_scroll(), Point::new(15, 0));

    assert!(grid.end_resize());
    assert_eq!(scroll.auto_scroll(), Point::ZERO);
    assert!(!grid.is_resizing());
}

#[tokio::test(start_paused = true)]
async fn test_ticker_keeps_resize_under_autoscroll() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(6, 100)).with_freeze(1),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    let key = grid.leaf(1).unwrap();
    assert!(grid.begin_resize(key, 101 + 100));
    assert!(grid.drag_resize(900));
    let dragged = grid.column(key).unwrap().width().unwrap();

    let handle = grid.spawn_ticker();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let scrolled = grid.scroll_controller().position().x;
    assert!(scrolled > 0);
    assert_eq!(grid.column(key).unwrap().width(), Some(dragged + scrolled as u32));

    grid.end_resize();
    grid.dispose();
    drop(grid);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.is_finished());
}

#[test]
fn test_pinned_resize_never_autoscrolls() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(6, 100)).with_freeze(1),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    let key = grid.leaf(0).unwrap();
    assert!(grid.begin_resize(key, 100));
    grid.drag_resize(495);
    assert_eq!(grid.scroll_controller().auto_scroll(), Point::ZERO);
    assert_eq!(grid.column(key).unwrap().width(), Some(495));
}

#[test]
fn test_resize_clamps_to_minimum_and_cancel_restores() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(3, 100)),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    let key = grid.leaf(0).unwrap();
    assert!(grid.begin_resize(key, 100));
    grid.drag_resize(-400);
    assert_eq!(grid.column(key).unwrap().width(), Some(20));

    assert_eq!(grid.on_key(KeyCombo::new(Key::Escape)), EventResult::Consumed);
    assert_eq!(grid.column(key).unwrap().width(), Some(100));
}

#[test]
fn test_pointer_drag_on_header_edge_resizes() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(3, 100)),
        empty_store(),
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    let key = grid.leaf(0).unwrap();
    assert_eq!(grid.resize_handle_at(Point::new(101, 10)), Some(key));

    let at = std::time::Instant::now();
    assert_eq!(grid.on_click(Point::new(101, 10), Modifiers::NONE), EventResult::StartDrag);
    grid.on_drag(Point::new(131, 10), at);
    assert_eq!(grid.on_release(Point::new(131, 10), at), EventResult::Consumed);
    assert_eq!(grid.column(key).unwrap().width(), Some(130));
}

// =============================================================================
// Focus
// =============================================================================

#[tokio::test]
async fn test_focus_skips_hidden_columns() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(3, 100)),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    grid.set_column_hidden(grid.leaf(1).unwrap(), true);

    assert!(grid.focus_cell(CellPos { row: 0, column: 0 }));
    assert!(!grid.focus_cell(CellPos { row: 0, column: 1 }));
    assert!(!grid.focus_cell(CellPos { row: 9, column: 0 }));

    grid.on_key(KeyCombo::new(Key::Right));
    assert_eq!(grid.focused_cell(), Some(CellPos { row: 0, column: 2 }));
    grid.on_key(KeyCombo::new(Key::Right));
    assert_eq!(grid.focused_cell(), Some(CellPos { row: 0, column: 2 }));
    grid.on_key(KeyCombo::new(Key::Down));
    assert_eq!(grid.focused_cell(), Some(CellPos { row: 1, column: 2 }));
    grid.on_key(KeyCombo::new(Key::Left));
    assert_eq!(grid.focused_cell(), Some(CellPos { row: 1, column: 0 }));
}

#[tokio::test]
async fn test_hiding_focused_column_moves_focus() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(3, 100)),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    grid.focus_cell(CellPos { row: 2, column: 1 });
    grid.set_column_hidden(grid.leaf(1).unwrap(), true);
    assert_eq!(grid.focused_cell(), Some(CellPos { row: 2, column: 2 }));
}

#[tokio::test]
async fn test_pinned_cells_do_not_scroll_horizontally() {
    let mut columns = vec![ColumnConfig::new("Id", "id").with_width(100)];
    columns.extend(fixed_columns(3, 200));
    let grid = Grid::new(
        GridConfig::new(columns).with_freeze(1),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(400, 300));
    let scroll = grid.scroll_controller().clone();

    grid.focus_cell(CellPos { row: 0, column: 3 });
    let scrolled = scroll.position().x;
    assert!(scrolled > 0);

    grid.focus_cell(CellPos { row: 0, column: 0 });
    assert_eq!(scroll.position().x, scrolled);

    grid.focus_cell(CellPos { row: 0, column: 1 });
    assert_eq!(scroll.position().x, 0);
}

#[tokio::test]
async fn test_focus_scrolls_rows_into_view() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    // header 32 + two rows of 32
    grid.set_viewport(Size::new(300, 96));
    let scroll = grid.scroll_controller().clone();

    grid.on_key(KeyCombo::new(Key::End));
    assert_eq!(grid.cursor(), Some(4));
    assert_eq!(scroll.position().y, 5 * 32 - 64);

    grid.on_key(KeyCombo::new(Key::Home));
    assert_eq!(scroll.position().y, 0);
}

#[tokio::test]
async fn test_escape_clears_focus() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    let seen = collect(&grid, &[GridEventKind::FocusChange]);
    grid.focus_cell(CellPos { row: 1, column: 1 });
    assert_eq!(grid.on_key(KeyCombo::new(Key::Escape)), EventResult::Consumed);
    assert_eq!(grid.focused_cell(), None);
    assert_eq!(grid.on_key(KeyCombo::new(Key::Escape)), EventResult::Ignored);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(matches!(
        seen[1],
        GridEvent::FocusChange { previous: Some(CellPos { row: 1, column: 1 }), current: None, .. }
    ));
}

#[tokio::test]
async fn test_focus_clamps_when_rows_disappear() {
    let store = loaded_store().await;
    let grid = Grid::new(GridConfig::new(fixed_columns(2, 100)), store.clone(), &ComponentRegistry::new());
    grid.focus_cell(CellPos { row: 4, column: 1 });

    store.filter(Filters::new().with("id", Filter::lt(3))).await;
    assert_eq!(grid.focused_cell(), Some(CellPos { row: 1, column: 1 }));
}

#[tokio::test]
async fn test_body_drag_scrolls_and_flings() {
    let rows: Vec<serde_json::Value> = (1..=50).map(|id| json!({"id": id, "c0": id})).collect();
    let store = DataStore::new(
        StoreConfig::default().with_primary_keys(["id"]),
        ArraySource::from_json(serde_json::Value::Array(rows)),
    );
    store.load().await;
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)),
        store,
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));

    let start = Instant::now();
    let later = start + Duration::from_millis(10);
    assert_eq!(
        grid.on_press(Point::new(50, 150), Modifiers::NONE, start),
        EventResult::StartDrag
    );
    assert_eq!(grid.selected_rows(), vec![3]);

    assert_eq!(grid.on_drag(Point::new(50, 60), later), EventResult::Consumed);
    assert_eq!(grid.scroll_controller().position(), Point::new(0, 90));

    assert_eq!(grid.on_release(Point::new(50, 60), later), EventResult::Consumed);
    // 90 px over 10 ms, times the default fling multiplier of 8
    assert_eq!(grid.scroll_controller().momentum(), Point::new(0, 72));
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn test_click_selects_and_ctrl_click_toggles() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(3, 100))
            .with_selection(SelectionConfig::multiple().with_deselectable(true)),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    grid.set_viewport(Size::new(500, 300));
    let seen = collect(
        &grid,
        &[GridEventKind::SelectionChange, GridEventKind::SelectionComplete],
    );

    // header 32, so y = 69 lands on row 1; x = 150 on column 1
    assert_eq!(grid.on_click(Point::new(150, 69), Modifiers::NONE), EventResult::Consumed);
    assert_eq!(grid.selected_rows(), vec![1]);
    assert_eq!(grid.focused_cell(), Some(CellPos { row: 1, column: 1 }));

    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    grid.on_click(Point::new(150, 133), ctrl);
    assert_eq!(grid.selected_rows(), vec![1, 3]);

    grid.on_click(Point::new(150, 69), ctrl);
    assert_eq!(grid.selected_rows(), vec![3]);

    let seen = seen.lock().unwrap();
    let completes = seen
        .iter()
        .filter(|e| matches!(e, GridEvent::SelectionComplete { .. }))
        .count();
    assert_eq!(completes, 3);
    assert_eq!(seen.len(), 6);
}

#[tokio::test]
async fn test_single_selection_never_exceeds_one_row() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    assert!(grid.select_row(0));
    assert!(grid.select_row(3));
    assert_eq!(grid.selected_rows(), vec![3]);
    assert!(!grid.select_all());
    assert_eq!(grid.selected_records().len(), 1);
}

#[tokio::test]
async fn test_space_toggles_focused_row() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)).with_selection(SelectionConfig::check()),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    grid.focus_cell(CellPos { row: 2, column: 1 });
    assert_eq!(grid.on_key(KeyCombo::new(Key::Space)), EventResult::Consumed);
    assert!(grid.is_row_selected(2));
    grid.on_key(KeyCombo::new(Key::Space));
    assert!(!grid.is_row_selected(2));

    grid.on_key(KeyCombo::ctrl(Key::Char('a')));
    assert_eq!(grid.selected_rows(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_enter_confirms_without_deselecting() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)).with_selection(SelectionConfig::check()),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    let seen = collect(&grid, &[GridEventKind::SelectionComplete]);
    grid.focus_cell(CellPos { row: 1, column: 1 });

    assert_eq!(grid.on_key(KeyCombo::new(Key::Enter)), EventResult::Consumed);
    assert!(grid.is_row_selected(1));
    grid.on_key(KeyCombo::new(Key::Enter));
    assert!(grid.is_row_selected(1));
    assert_eq!(seen.lock().unwrap().len(), 1);

    grid.on_key(KeyCombo::new(Key::Space));
    assert!(!grid.is_row_selected(1));
}

#[tokio::test]
async fn test_keepable_selection_survives_sort_and_reload() {
    let store = loaded_store().await;
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100))
            .with_selection(SelectionConfig::multiple().with_keepable(true)),
        store.clone(),
        &ComponentRegistry::new(),
    );
    grid.select_row(0);
    grid.select_row(2);

    store.sort(Sorters::desc("id")).await;
    assert_eq!(grid.selected_rows(), vec![2, 4]);

    store.reload().await;
    assert_eq!(ids(&grid.selected_records()), vec![1, 3]);
}

#[tokio::test]
async fn test_selection_resets_on_reload_unless_keepable() {
    let store = loaded_store().await;
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)).with_selection(SelectionConfig::multiple()),
        store.clone(),
        &ComponentRegistry::new(),
    );
    grid.select_row(1);
    store.reload().await;
    assert!(grid.selected_records().is_empty());
}

#[tokio::test]
async fn test_context_menu_on_multi_selection_opens_menus() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(2, 100)).with_selection(SelectionConfig::multiple()),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    let seen = collect(&grid, &[GridEventKind::OpenMenu, GridEventKind::OpenMenus]);
    grid.select_row(0);
    grid.select_row(1);

    assert!(grid.open_menu(1));
    assert!(grid.open_menu(3));

    let seen = seen.lock().unwrap();
    assert!(matches!(&seen[0], GridEvent::OpenMenus { rows, .. } if rows == &vec![0, 1]));
    assert!(matches!(&seen[1], GridEvent::OpenMenu { row: 3, .. }));
}

// =============================================================================
// Sorting, rendering, lifecycle
// =============================================================================

#[tokio::test]
async fn test_sort_by_column_toggles_direction() {
    let store = loaded_store().await;
    let grid = Grid::new(
        GridConfig::new(vec![ColumnConfig::new("Name", "name").sortable()]),
        store.clone(),
        &ComponentRegistry::new(),
    );
    let seen = collect(&grid, &[GridEventKind::Sort]);
    let key = grid.leaf(0).unwrap();

    assert!(grid.sort_by_column(key).await);
    assert_eq!(store.sorters().direction("name"), Some(Direction::Asc));
    assert!(grid.sort_by_column(key).await);
    assert_eq!(store.sorters().direction("name"), Some(Direction::Desc));
    assert_eq!(store.get_at(0).unwrap().value("name").to_string(), "eve");
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_render_only_visible_rows_and_columns() {
    let grid = Grid::new(
        GridConfig::new(fixed_columns(6, 100))
            .with_freeze(1)
            .with_selection(SelectionConfig::multiple()),
        loaded_store().await,
        &ComponentRegistry::new(),
    );
    // header 32 + body 64 shows rows 0 and 1
    grid.set_viewport(Size::new(300, 96));
    grid.select_row(1);

    let frame = render_if_dirty(&grid).unwrap();
    assert_eq!(frame.frozen_width, 101);
    assert_eq!(frame.rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1]);
    assert!(frame.rows[1].selected);
    let columns: Vec<usize> = frame.rows[0].cells.iter().map(|c| c.column).collect();
    assert_eq!(columns, vec![0, 1, 2]);
    assert_eq!(frame.rows[0].cells[0].text, "x");

    assert!(render_if_dirty(&grid).is_none());
    grid.scroll_controller().scroll_to(Point::new(0, 64));
    let frame = render_if_dirty(&grid).unwrap();
    assert_eq!(frame.rows.first().map(|r| r.index), Some(2));
}

#[test]
fn test_registry_tracks_grid_until_disposed() {
    let registry = ComponentRegistry::new();
    let grid = Grid::new(GridConfig::new(fixed_columns(2, 100)), empty_store(), &registry);
    let handle = grid.handle().unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.find(&grid.id().to_string()), Some(handle));
    let found: Grid = registry.downcast(handle).unwrap();
    assert_eq!(found.id(), grid.id());

    assert!(grid.dispose());
    assert!(registry.is_empty());
    assert!(grid.handle().is_none());
    assert!(!grid.dispose());
}
