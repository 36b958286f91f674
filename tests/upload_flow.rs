//! Integration tests for the upload workflow: form state machine, mutation,
//! cache invalidation, and the datasets list, driven against an in-memory
//! backend on the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde_json::{json, Value};

use claims_console::cache::{Fetcher, QueryCache, QueryState, Spawner};
use claims_console::error::RemoteError;
use claims_console::models::{Claim, ClaimStatus, Dataset};
use claims_console::router::View;
use claims_console::workflow::{claims_key, UploadForm, DATASETS_KEY};

type Queue = Rc<RefCell<VecDeque<Pin<Box<dyn Future<Output = ()>>>>>>;

fn harness() -> (QueryCache, Queue) {
    let queue: Queue = Rc::new(RefCell::new(VecDeque::new()));
    let spawned = queue.clone();
    let spawner: Spawner = Rc::new(move |fut| spawned.borrow_mut().push_back(fut));
    (QueryCache::new(spawner), queue)
}

fn drain(queue: &Queue) {
    loop {
        let next = queue.borrow_mut().pop_front();
        match next {
            Some(fut) => futures::executor::block_on(fut),
            None => break,
        }
    }
}

/// Stand-in for the remote dataset store.
#[derive(Clone, Default)]
struct FakeBackend {
    datasets: Rc<RefCell<Vec<Dataset>>>,
}

impl FakeBackend {
    fn list_fetcher(&self) -> Fetcher {
        let datasets = self.datasets.clone();
        Rc::new(move || {
            let snapshot = datasets.borrow().clone();
            Box::pin(async move { Ok(serde_json::to_value(snapshot).unwrap()) })
        })
    }

    fn upload(&self, filename: &str, source: &str) -> Dataset {
        let dataset = Dataset {
            id: format!("d{}", self.datasets.borrow().len() + 1),
            filename: filename.to_string(),
            source_system: source.to_string(),
            record_count: 3,
        };
        self.datasets.borrow_mut().push(dataset.clone());
        dataset
    }
}

fn listed_datasets(cache: &QueryCache) -> Vec<Dataset> {
    match cache.state(DATASETS_KEY) {
        QueryState::Success(value) => serde_json::from_value(value).unwrap(),
        other => panic!("expected a successful datasets query, got {other:?}"),
    }
}

#[test]
fn test_successful_upload_refreshes_datasets_exactly_once() {
    let (cache, queue) = harness();
    let backend = FakeBackend::default();

    // a Datasets view is watching the list
    cache.subscribe(DATASETS_KEY, Rc::new(|_| {}));
    cache.query(DATASETS_KEY, backend.list_fetcher());
    drain(&queue);
    assert!(listed_datasets(&cache).is_empty());

    let mut form = UploadForm::new();
    form.select_file(Some("claims_a.csv".to_string()));
    form.set_source("alpha".to_string());

    let file = form.begin_submit().expect("a selected file must submit");
    let source = form.source_tag().unwrap();
    let backend_op = backend.clone();
    let op: Pin<Box<dyn Future<Output = Result<Value, RemoteError>>>> = Box::pin(async move {
        let dataset = backend_op.upload(&file, &source);
        Ok(serde_json::to_value(dataset).unwrap())
    });

    let form_cell = Rc::new(RefCell::new(form));
    let form_on_success = form_cell.clone();
    let invalidate_cache = cache.clone();
    let mutation = cache.mutation();
    mutation.run(
        op,
        move |value| {
            assert_eq!(value["source_system"], "alpha", "tag must pass through verbatim");
            form_on_success.borrow_mut().finish_success();
            invalidate_cache.invalidate_key(DATASETS_KEY);
        },
        |_| {},
    );
    drain(&queue);

    let listed = listed_datasets(&cache);
    assert_eq!(listed.len(), 1, "the new dataset must appear exactly once");
    assert_eq!(listed[0].filename, "claims_a.csv");
    assert_eq!(listed[0].source_system, "alpha");

    let form = form_cell.borrow();
    assert_eq!(form.file(), None, "success must clear the selection");
    assert_eq!(form.source(), "");
}

#[test]
fn test_failed_upload_retains_selections_and_prior_state() {
    let (cache, queue) = harness();
    let backend = FakeBackend::default();
    backend.upload("earlier.json", "beta");

    cache.subscribe(DATASETS_KEY, Rc::new(|_| {}));
    cache.query(DATASETS_KEY, backend.list_fetcher());
    drain(&queue);
    assert_eq!(listed_datasets(&cache).len(), 1);

    let mut form = UploadForm::new();
    form.select_file(Some("claims_b.csv".to_string()));
    form.set_source("alpha".to_string());
    form.begin_submit().unwrap();

    let form_cell = Rc::new(RefCell::new(form));
    let form_on_error = form_cell.clone();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let mutation = cache.mutation();
    mutation.run(
        Box::pin(async {
            Err(RemoteError::from_response(
                400,
                r#"{"detail": "Unsupported file for detected source"}"#,
            ))
        }),
        |_| {},
        move |err: &RemoteError| {
            *sink.borrow_mut() = Some(err.message.clone());
            form_on_error.borrow_mut().finish_error();
        },
    );
    drain(&queue);

    // the message surfaces verbatim, the form keeps the operator's selections
    assert_eq!(
        seen.borrow().as_deref(),
        Some("Unsupported file for detected source")
    );
    let form = form_cell.borrow();
    assert_eq!(form.file(), Some(&"claims_b.csv".to_string()));
    assert_eq!(form.source(), "alpha");
    assert!(form.can_submit(), "retry without re-selecting the file");

    // previously listed datasets are untouched
    assert_eq!(listed_datasets(&cache).len(), 1);
}

#[test]
fn test_claims_error_is_scoped_to_its_own_query() {
    let (cache, queue) = harness();
    let backend = FakeBackend::default();
    backend.upload("claims.csv", "alpha");

    cache.query(DATASETS_KEY, backend.list_fetcher());
    cache.query(
        &claims_key("missing"),
        Rc::new(|| {
            Box::pin(async {
                Err(RemoteError::from_response(
                    404,
                    r#"{"detail": "Dataset not found"}"#,
                ))
            })
        }),
    );
    drain(&queue);

    match cache.state(&claims_key("missing")) {
        QueryState::Error(err) => {
            assert!(err.is_not_found());
            assert_eq!(err.message, "Dataset not found");
        }
        other => panic!("expected an error state, got {other:?}"),
    }
    // the sibling query is unaffected
    assert_eq!(listed_datasets(&cache).len(), 1);
}

#[test]
fn test_claims_and_candidates_resolve_independently() {
    let (cache, queue) = harness();
    let claims = claims_key("d1");
    let candidates = claims_console::workflow::candidates_key("d1");

    cache.query(
        &claims,
        Rc::new(|| {
            Box::pin(async {
                Ok(json!([{
                    "id": "x1",
                    "claim_id": "C-9",
                    "status": "denied",
                    "denial_reason": "missing_code",
                    "eligibility": true
                }]))
            })
        }),
    );
    cache.query(&candidates, Rc::new(|| Box::pin(async { Ok(json!([])) })));

    // only the candidates response has arrived so far
    let first = queue.borrow_mut().pop_back().unwrap();
    futures::executor::block_on(first);
    assert_eq!(cache.state(&claims), QueryState::Loading);
    assert_eq!(cache.state(&candidates), QueryState::Success(json!([])));

    drain(&queue);
    match cache.state(&claims) {
        QueryState::Success(value) => {
            let rows: Vec<Claim> = serde_json::from_value(value).unwrap();
            assert_eq!(rows[0].status, ClaimStatus::Denied);
            assert_eq!(rows[0].denial_reason_display(), "missing_code");
        }
        other => panic!("expected claims, got {other:?}"),
    }
}

#[test]
fn test_navigation_never_touches_the_cache() {
    let (cache, queue) = harness();
    cache.query(DATASETS_KEY, Rc::new(|| Box::pin(async { Ok(json!([1, 2])) })));
    drain(&queue);

    let view = View::default();
    assert_eq!(view, View::Upload);
    let view = View::DatasetDetails("d1".to_string());
    assert_eq!(view.back(), View::Datasets);

    assert_eq!(cache.state(DATASETS_KEY), QueryState::Success(json!([1, 2])));
}
