use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use panelkit_data::DataStore;
use panelkit_data::error::LoadError;
use panelkit_data::events::EventFlow;
use panelkit_data::model::Field;
use panelkit_data::model::FieldType;
use panelkit_data::model::Record;
use panelkit_data::query::Filter;
use panelkit_data::query::Filters;
use panelkit_data::query::Sorters;
use panelkit_data::source::ArraySource;
use panelkit_data::source::DataSource;
use panelkit_data::source::LoadParams;
use panelkit_data::source::LoadResult;
use panelkit_data::source::Row;
use panelkit_data::store::StoreConfig;
use panelkit_data::store::StoreEvent;
use panelkit_data::store::StoreEventKind;
use panelkit_data::store::UpdateReason;
use serde_json::json;

fn init_logger() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
}

fn rows(value: serde_json::Value) -> Vec<Row> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_object().cloned().unwrap())
        .collect()
}

fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|r| r.get_int("id").unwrap().unwrap())
        .collect()
}

fn config() -> StoreConfig {
    StoreConfig::default()
        .with_fields([Field::typed("id", FieldType::Int), Field::new("name")])
        .with_primary_keys(["id"])
}

/// Source that serves a scripted response per call and records the params.
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<Vec<(Duration, Result<Vec<Row>, String>)>>,
    calls: AtomicUsize,
    params: Mutex<Vec<LoadParams>>,
}

impl ScriptedSource {
    fn then_ok(self, rows: Vec<Row>) -> Self {
        self.then(Duration::ZERO, Ok(rows))
    }

    fn then(self, delay: Duration, response: Result<Vec<Row>, String>) -> Self {
        self.responses.lock().unwrap().push((delay, response));
        self
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch(&self, params: &LoadParams) -> Result<LoadResult, LoadError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.params.lock().unwrap().push(params.clone());
        let (delay, response) = {
            let responses = self.responses.lock().unwrap();
            responses[call.min(responses.len() - 1)].clone()
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response
            .map(LoadResult::new)
            .map_err(LoadError::parse)
    }
}

#[tokio::test]
async fn test_sort_filter_and_reload_scenario() {
    let source = ArraySource::from_json(json!([
        {"id": 1, "name": "b"},
        {"id": 2, "name": "a"},
    ]));
    let store = DataStore::new(config(), source);

    assert!(store.load().await);
    assert_eq!(ids(&store.records()), [1, 2]);

    store.sort(Sorters::asc("name")).await;
    assert_eq!(ids(&store.records()), [2, 1]);

    store
        .filter(Filters::new().with("name", Filter::like("a")))
        .await;
    assert_eq!(ids(&store.records()), [2]);
    assert_eq!(store.original_records().len(), 2);

    assert!(store.reload().await);
    assert_eq!(ids(&store.records()), [2]);
    assert_eq!(store.sorters(), Sorters::asc("name"));
    assert_eq!(store.filters().len(), 1);
}

#[tokio::test]
async fn test_sort_is_stable() {
    let source = ArraySource::from_json(json!([
        {"id": 1, "group": "x"},
        {"id": 2, "group": "y"},
        {"id": 3, "group": "x"},
        {"id": 4, "group": "y"},
        {"id": 5, "group": "x"},
    ]));
    let store = DataStore::new(config(), source);
    store.load().await;

    store.sort(Sorters::desc("group")).await;
    assert_eq!(ids(&store.records()), [2, 4, 1, 3, 5]);

    store.sort(Sorters::asc("group").then_desc("id")).await;
    assert_eq!(ids(&store.records()), [5, 3, 1, 4, 2]);
}

#[tokio::test]
async fn test_filter_is_idempotent_subsequence() {
    let source = ArraySource::from_json(json!([
        {"id": 1, "age": 30},
        {"id": 2, "age": 12},
        {"id": 3, "age": 45},
        {"id": 4, "age": null},
        {"id": 5, "age": 18},
    ]));
    let store = DataStore::new(config(), source);
    store.load().await;

    let filters = Filters::new().with("age", Filter::ge(18));
    store.filter(filters.clone()).await;
    let once = store.records();
    store.filter(filters).await;
    let twice = store.records();

    assert_eq!(ids(&once), ids(&twice));
    assert_eq!(ids(&once), [1, 3, 5]);

    let original = ids(&store.original_records());
    let mut cursor = original.iter();
    for id in ids(&once) {
        assert!(cursor.any(|o| *o == id), "{id} out of order or duplicated");
    }
}

#[tokio::test]
async fn test_empty_filters_restore_original() {
    let source = ArraySource::from_json(json!([{"id": 1}, {"id": 2}]));
    let store = DataStore::new(config(), source);
    store.load().await;

    store.filter(Filters::new().with("id", Filter::eq(2))).await;
    assert_eq!(store.count(), 1);
    store.filter(Filters::new()).await;
    assert_eq!(ids(&store.records()), [1, 2]);
}

#[tokio::test]
async fn test_membership_operators() {
    let source = ArraySource::from_json(json!([
        {"id": 1, "tags": ["red", "blue"], "color": "red"},
        {"id": 2, "tags": ["green"], "color": "green"},
        {"id": 3, "tags": "red", "color": ["red"]},
    ]));
    let store = DataStore::new(config(), source);
    store.load().await;

    store
        .filter(Filters::new().with("color", Filter::is_in(["red", "blue"])))
        .await;
    assert_eq!(ids(&store.records()), [1]);

    store
        .filter(Filters::new().with("tags", Filter::in_set("red")))
        .await;
    assert_eq!(ids(&store.records()), [1]);
}

#[tokio::test]
async fn test_like_code_matches_partial_syllables() {
    let source = ArraySource::from_json(json!([
        {"id": 1, "name": "한글"},
        {"id": 2, "name": "국"},
        {"id": 3, "name": "하늘"},
    ]));
    let store = DataStore::new(config(), source);
    store.load().await;

    store
        .filter(Filters::new().with("name", Filter::like_code("하")))
        .await;
    assert_eq!(ids(&store.records()), [1, 3]);

    store
        .filter(Filters::new().with("name", Filter::like_code("한ㄱ")))
        .await;
    assert_eq!(ids(&store.records()), [1]);

    store
        .filter(Filters::new().with("name", Filter::like_code("구")))
        .await;
    assert_eq!(ids(&store.records()), [2]);
}

#[tokio::test]
async fn test_ne_and_gt_keep_ordered_subsequence() {
    let source = ArraySource::from_json(json!([
        {"id": 1, "name": "b"},
        {"id": 2, "name": "a"},
        {"id": 3, "name": "c"},
        {"id": 4, "name": "a"},
    ]));
    let store = DataStore::new(config(), source);
    store.load().await;

    store
        .filter(Filters::new().with("name", Filter::ne("a")))
        .await;
    assert_eq!(ids(&store.records()), [1, 3]);

    store
        .filter(Filters::new().with("id", Filter::gt(2)))
        .await;
    assert_eq!(ids(&store.records()), [3, 4]);

    store
        .filter(Filters::new().with("id", Filter::gt(1)).with("name", Filter::ne("a")))
        .await;
    assert_eq!(ids(&store.records()), [3]);
}

#[tokio::test]
async fn test_remote_sort_reloads_with_params() {
    let source = Arc::new(ScriptedSource::default().then_ok(rows(json!([{"id": 1}]))));
    let store = DataStore::with_source(
        config().with_remote_sort(true).with_param("type", "user"),
        source.clone(),
    );
    store.load().await;

    let updates = Arc::new(AtomicUsize::new(0));
    let counter = updates.clone();
    store.on(StoreEventKind::Update, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        EventFlow::Continue
    });

    assert!(store.sort(Sorters::desc("name")).await);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(updates.load(Ordering::SeqCst), 0);

    let params = source.params.lock().unwrap();
    assert_eq!(params[0].sorters, None);
    assert_eq!(params[1].sorters, Some(Sorters::desc("name")));
    assert_eq!(params[1].fields, ["id", "name"]);
    assert_eq!(params[1].extra.get("type").map(String::as_str), Some("user"));
}

#[tokio::test]
async fn test_remote_filter_skips_local_filtering() {
    let source = Arc::new(
        ScriptedSource::default().then_ok(rows(json!([{"id": 1, "name": "zzz"}]))),
    );
    let store = DataStore::with_source(config().with_remote_filter(true), source.clone());

    store
        .filter(Filters::new().with("name", Filter::eq("a")))
        .await;
    assert_eq!(ids(&store.records()), [1]);
    let params = source.params.lock().unwrap();
    assert!(params[0].filters.is_some());
}

#[tokio::test]
async fn test_load_when_loaded_refires_load_event() {
    let source = Arc::new(ScriptedSource::default().then_ok(rows(json!([{"id": 1}, {"id": 2}]))));
    let store = DataStore::with_source(config(), source.clone());

    let loads = Arc::new(Mutex::new(Vec::new()));
    let seen = loads.clone();
    store.on(StoreEventKind::Load, move |event| {
        if let StoreEvent::Load { count, .. } = event {
            seen.lock().unwrap().push(*count);
        }
        EventFlow::Continue
    });

    assert!(store.load().await);
    assert!(store.load().await);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*loads.lock().unwrap(), [2, 2]);
}

#[tokio::test]
async fn test_before_load_listener_cancels() {
    let source = Arc::new(ScriptedSource::default().then_ok(rows(json!([{"id": 1}]))));
    let store = DataStore::with_source(config(), source.clone());
    let listener = store.on(StoreEventKind::BeforeLoad, |_| EventFlow::Cancel);

    assert!(!store.load().await);
    assert!(!store.is_loading());
    assert!(!store.is_loaded());
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert!(matches!(store.last_error().as_deref(), Some(LoadError::Cancelled)));

    store.off(listener);
    assert!(store.load().await);
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn test_cancelled_reload_keeps_loaded_state() {
    let source = Arc::new(ArraySource::from_json(json!([
        {"id": 1}, {"id": 2}, {"id": 3},
    ])));
    let store = DataStore::with_source(config().with_limit(2), source);
    assert!(store.load().await);

    store.on(StoreEventKind::BeforeLoad, |_| EventFlow::Cancel);
    assert!(!store.reload().await);
    assert!(store.is_loaded());
    assert!(!store.is_loading());
    assert!(matches!(store.last_error().as_deref(), Some(LoadError::Cancelled)));

    assert!(!store.load_page(2).await);
    assert!(store.is_loaded());
    assert_eq!(store.page(), 1);
    assert_eq!(ids(&store.records()), [1, 2]);
}

#[tokio::test]
async fn test_load_failure_keeps_previous_records() {
    init_logger();
    let source = Arc::new(
        ScriptedSource::default()
            .then_ok(rows(json!([{"id": 1}, {"id": 2}])))
            .then(Duration::ZERO, Err("bad gateway".to_string())),
    );
    let store = DataStore::with_source(config(), source);

    let failures = Arc::new(AtomicUsize::new(0));
    let counter = failures.clone();
    store.on(StoreEventKind::LoadFailed, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        EventFlow::Continue
    });

    assert!(store.load().await);
    assert!(!store.reload().await);

    assert_eq!(ids(&store.records()), [1, 2]);
    assert!(!store.is_loading());
    assert!(!store.is_loaded());
    assert!(matches!(store.last_error().as_deref(), Some(LoadError::Parse { .. })));
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_reloads_last_request_wins() {
    init_logger();
    let source = Arc::new(
        ScriptedSource::default()
            .then(Duration::from_millis(50), Ok(rows(json!([{"id": 1}]))))
            .then(Duration::from_millis(10), Ok(rows(json!([{"id": 2}, {"id": 3}])))),
    );
    let store = DataStore::with_source(config(), source);

    let (first, second) = tokio::join!(store.reload(), store.reload());

    assert!(!first);
    assert!(second);
    assert_eq!(ids(&store.records()), [2, 3]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_add_appends_without_rederiving() {
    let source = ArraySource::from_json(json!([{"id": 2, "name": "b"}]));
    let store = DataStore::new(config().with_sorters(Sorters::asc("name")), source);
    store.load().await;

    let reasons = Arc::new(Mutex::new(Vec::new()));
    let seen = reasons.clone();
    store.on(StoreEventKind::Update, move |event| {
        if let StoreEvent::Update { reason, .. } = event {
            seen.lock().unwrap().push(*reason);
        }
        EventFlow::Continue
    });

    assert_eq!(store.add(rows(json!([{"id": "1", "name": "a"}]))), 1);
    assert_eq!(ids(&store.records()), [2]);
    assert_eq!(ids(&store.original_records()), [2, 1]);

    store.update();
    assert_eq!(ids(&store.records()), [1, 2]);
    assert_eq!(*reasons.lock().unwrap(), [UpdateReason::Add, UpdateReason::Refresh]);
}

#[tokio::test]
async fn test_paging_requests_offset() {
    let source = Arc::new(ArraySource::from_json(json!([
        {"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}, {"id": 5},
    ])));
    let store = DataStore::with_source(config().with_limit(2), source);

    store.load().await;
    assert_eq!(ids(&store.records()), [1, 2]);
    assert_eq!(store.total(), 5);
    assert_eq!(store.page_count(), 3);

    store.load_page(3).await;
    assert_eq!(store.page(), 3);
    assert_eq!(store.load_params().start, 4);
    assert_eq!(ids(&store.records()), [5]);
}

#[tokio::test]
async fn test_identity_lookup() {
    let source = ArraySource::from_json(json!([
        {"id": 1, "name": "a"},
        {"id": 2, "name": "b"},
    ]));
    let store = DataStore::new(config(), source);
    store.load().await;

    let lookup = Record::new().set("id", 2).set("name", "changed").with_primary_keys(["id"]);
    assert_eq!(store.index_of(lookup.hash()), Some(1));
    assert_eq!(store.get_at(5), None);
}
