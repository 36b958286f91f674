//! Leptos shell: application context, navigation, and the cache-to-signal
//! bridge that the views render from.

mod datasets;
mod details;
mod upload;

use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiClient, ARTIFACTS};
use crate::cache::{Fetcher, QueryCache, QueryState, Spawner};
use crate::error::RemoteError;
use crate::router::View;
use crate::workflow::HEALTH_KEY;

use datasets::DatasetsPage;
use details::DatasetDetailsPage;
use upload::UploadPage;

/// Process-wide state shared by every workflow: the server-state cache, the
/// API client, and the active view. Built once on mount and passed down via
/// context; there is no teardown, the session owns it for its lifetime.
#[derive(Clone, Copy)]
pub struct AppContext {
    cache: StoredValue<QueryCache, LocalStorage>,
    api: StoredValue<ApiClient>,
    pub view: RwSignal<View>,
}

impl AppContext {
    fn new() -> Self {
        let spawner: Spawner = Rc::new(|fut| spawn_local(fut));
        Self {
            cache: StoredValue::new_local(QueryCache::new(spawner)),
            api: StoredValue::new(ApiClient::default()),
            view: RwSignal::new(View::default()),
        }
    }

    pub fn cache(&self) -> QueryCache {
        self.cache.with_value(|cache| cache.clone())
    }

    pub fn api(&self) -> ApiClient {
        self.api.with_value(|api| api.clone())
    }
}

/// Bridges a cache key to a render-ready signal: subscribes on mount, ensures
/// the key is fetched, and unsubscribes on cleanup. Navigating away does not
/// cancel the fetch; a late response lands in the cache for the next visit.
pub fn use_query(ctx: AppContext, key: String, fetcher: Fetcher) -> ReadSignal<QueryState> {
    let cache = ctx.cache();
    let (state, set_state) = signal(cache.state(&key));
    let id = cache.subscribe(
        &key,
        Rc::new(move |next: &QueryState| set_state.set(next.clone())),
    );
    cache.query(&key, fetcher);

    let cache_handle = ctx.cache;
    on_cleanup(move || {
        let _ = cache_handle.try_with_value(|cache| cache.unsubscribe(&key, id));
    });
    state
}

/// Wraps a typed API call as a cache fetcher storing its payload as JSON.
pub fn fetcher<T, F, Fut>(call: F) -> Fetcher
where
    T: Serialize,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, RemoteError>> + 'static,
{
    Rc::new(move || {
        let fut = call();
        Box::pin(async move {
            fut.await
                .map(|payload| serde_json::to_value(payload).unwrap_or(Value::Null))
        })
    })
}

/// Decodes a cached payload for rendering. Tolerant by design: a payload the
/// view cannot interpret renders as empty rather than crashing the page.
pub fn decode_vec<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    let api = ctx.api();
    let health = use_query(
        ctx,
        HEALTH_KEY.to_string(),
        fetcher(move || {
            let api = api.clone();
            async move { api.health_check().await }
        }),
    );

    view! {
        <div class="min-h-screen bg-slate-950 text-slate-100 font-sans">
            <nav class="border-b border-slate-800 bg-slate-900/50">
                <div class="max-w-6xl mx-auto px-6 h-16 flex items-center justify-between">
                    <div class="flex items-center space-x-3">
                        <span class="text-xl font-bold tracking-tight text-white">"Claims Pipeline"</span>
                        <span
                            title="API status"
                            class=move || format!(
                                "inline-block w-2 h-2 rounded-full {}",
                                match health.get() {
                                    QueryState::Success(_) => "bg-green-500",
                                    QueryState::Error(_) => "bg-red-500",
                                    _ => "bg-slate-600",
                                }
                            )
                        ></span>
                    </div>
                    <div class="space-x-2">
                        <NavButton label="Upload" target=View::Upload />
                        <NavButton label="Datasets" target=View::Datasets />
                    </div>
                </div>
            </nav>

            <main class="max-w-6xl mx-auto p-6">
                {move || match ctx.view.get() {
                    View::Upload => view! { <UploadPage /> }.into_any(),
                    View::Datasets => view! { <DatasetsPage /> }.into_any(),
                    View::DatasetDetails(id) => {
                        view! { <DatasetDetailsPage dataset_id=id /> }.into_any()
                    }
                }}
            </main>
        </div>
    }
}

#[component]
fn NavButton(label: &'static str, target: View) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let target = StoredValue::new(target);
    let is_active = move || ctx.view.get() == target.get_value();
    view! {
        <button
            on:click=move |_| ctx.view.set(target.get_value())
            class=move || format!(
                "px-4 py-2 rounded-lg text-sm font-medium transition-colors {}",
                if is_active() { "bg-slate-800 text-white" } else { "text-slate-400 hover:text-white" }
            )
        >
            {label}
        </button>
    }
}

/// Plain links to the fixed artifact endpoints of the most recent pipeline
/// run. No client-side state governs these beyond the run context itself.
#[component]
fn DownloadLinks() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let api = ctx.api();
    view! {
        <div class="flex flex-wrap items-center gap-3 text-xs text-slate-400">
            <span class="font-medium">"Downloads:"</span>
            {ARTIFACTS
                .into_iter()
                .map(|name| view! {
                    <a
                        class="text-blue-400 hover:underline"
                        href=api.download_url(name)
                        target="_blank"
                        rel="noreferrer"
                    >
                        {name}
                    </a>
                })
                .collect_view()}
        </div>
    }
}
