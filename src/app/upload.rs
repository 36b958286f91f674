//! Upload view: file submission and pipeline invocation.

use std::rc::Rc;

use leptos::prelude::*;
use serde_json::Value;

use crate::cache::{FetchFuture, MutationState, QueryState};
use crate::models::PipelineRunResult;
use crate::workflow::{UploadForm, DATASETS_KEY, PIPELINE_LAST_KEY};

use super::{fetcher, use_query, AppContext, DownloadLinks};

#[component]
pub fn UploadPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let form = RwSignal::new_local(UploadForm::<web_sys::File>::new());
    let file_input = NodeRef::<leptos::html::Input>::new();

    let mutation = StoredValue::new_local(ctx.cache().mutation());
    let (run_state, set_run_state) = signal(MutationState::Idle);
    let sub_id = mutation.with_value(|m| {
        m.subscribe(Rc::new(move |state: &MutationState| {
            set_run_state.set(state.clone())
        }))
    });
    on_cleanup(move || {
        let _ = mutation.try_with_value(|m| m.unsubscribe(sub_id));
    });

    let on_file = move |ev: web_sys::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let file = input.files().and_then(|files| files.get(0));
        form.update(|f| f.select_file(file));
    };
    let on_source = move |ev: web_sys::Event| {
        form.update(|f| f.set_source(event_target_value(&ev)));
    };

    // `run` selects between creating the dataset and running the full
    // pipeline; both share the form's single-flight discipline.
    let do_submit = move |run: bool| {
        let Some(file) = form.try_update(|f| f.begin_submit()).flatten() else {
            return;
        };
        let source = form.with_untracked(|f| f.source_tag());
        let api = ctx.api();
        let cache = ctx.cache();

        let op: FetchFuture = if run {
            Box::pin(async move {
                api.run_pipeline(file)
                    .await
                    .map(|result| serde_json::to_value(result).unwrap_or(Value::Null))
            })
        } else {
            Box::pin(async move {
                api.upload_dataset(file, source)
                    .await
                    .map(|dataset| serde_json::to_value(dataset).unwrap_or(Value::Null))
            })
        };

        mutation.with_value(|m| {
            m.run(
                op,
                move |_| {
                    form.update(|f| f.finish_success());
                    if let Some(input) = file_input.get_untracked() {
                        input.set_value("");
                    }
                    cache.invalidate_key(DATASETS_KEY);
                    cache.invalidate_key(PIPELINE_LAST_KEY);
                },
                move |_| form.update(|f| f.finish_error()),
            )
        });
    };

    view! {
        <div class="max-w-2xl mx-auto">
            <div class="bg-slate-900 border border-slate-800 rounded-2xl p-6 space-y-6">
                <h1 class="text-2xl font-semibold text-white">"Upload Dataset"</h1>

                <div>
                    <label class="block text-xs font-semibold text-slate-500 uppercase mb-1">
                        "Select File"
                    </label>
                    <input
                        type="file"
                        accept=".csv,.json"
                        node_ref=file_input
                        on:change=on_file
                        class="block w-full text-sm text-slate-400 file:mr-4 file:py-2 file:px-4 file:rounded-lg file:border-0 file:text-sm file:font-semibold file:bg-blue-600 file:text-white hover:file:bg-blue-500"
                    />
                </div>

                <div>
                    <label class="block text-xs font-semibold text-slate-500 uppercase mb-1">
                        "Source System"
                    </label>
                    <select
                        on:change=on_source
                        prop:value=move || form.with(|f| f.source().to_string())
                        class="block w-full bg-slate-950 border border-slate-800 rounded-lg px-4 py-2 text-white focus:border-blue-500 outline-none"
                    >
                        <option value="">"Auto-detect"</option>
                        <option value="alpha">"Alpha (CSV)"</option>
                        <option value="beta">"Beta (JSON)"</option>
                    </select>
                </div>

                <div class="flex space-x-3">
                    <button
                        on:click=move |_| do_submit(false)
                        disabled=move || !form.with(|f| f.can_submit())
                        class="flex-1 px-4 py-2 bg-slate-800 hover:bg-slate-700 disabled:bg-slate-800/40 disabled:text-slate-600 text-white rounded-lg font-medium transition-colors border border-slate-700"
                    >
                        "Upload Dataset"
                    </button>
                    <button
                        on:click=move |_| do_submit(true)
                        disabled=move || !form.with(|f| f.can_submit())
                        class="flex-1 px-4 py-2 bg-blue-600 hover:bg-blue-500 disabled:bg-slate-700 disabled:text-slate-500 text-white rounded-lg font-medium transition-colors"
                    >
                        {move || {
                            if form.with(|f| f.in_flight()) { "Processing..." } else { "Upload & Run Pipeline" }
                        }}
                    </button>
                </div>

                {move || match run_state.get() {
                    MutationState::Idle => view! { <LastRunPanel /> }.into_any(),
                    MutationState::Pending => ().into_any(),
                    MutationState::Success(value) => view! { <ResultPanel value=value /> }.into_any(),
                    MutationState::Error(err) => view! {
                        <div class="p-4 bg-red-500/10 border border-red-500/20 rounded-lg text-red-400 text-sm">
                            "Error: " {err.message.clone()}
                        </div>
                    }.into_any(),
                }}
            </div>
        </div>
    }
}

#[component]
fn ResultPanel(value: Value) -> impl IntoView {
    let pretty = serde_json::to_string_pretty(&value).unwrap_or_default();
    view! {
        <div class="p-4 bg-green-500/10 border border-green-500/20 rounded-lg space-y-3">
            <p class="text-green-400 text-sm font-medium">"Completed successfully"</p>
            <pre class="text-xs bg-slate-950 border border-slate-800 rounded-lg p-3 overflow-auto text-slate-300">
                {pretty}
            </pre>
            <DownloadLinks />
        </div>
    }
}

/// Most recent pipeline result from any session, shown until a fresh
/// submission supersedes it.
#[component]
fn LastRunPanel() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let api = ctx.api();
    let last = use_query(
        ctx,
        PIPELINE_LAST_KEY.to_string(),
        fetcher(move || {
            let api = api.clone();
            async move { api.last_pipeline().await }
        }),
    );

    view! {
        <div class="pt-4 border-t border-slate-800 space-y-3">
            <h2 class="text-sm font-semibold text-slate-300">"Last Pipeline Result"</h2>
            {move || match last.get() {
                QueryState::Idle | QueryState::Loading => {
                    view! { <div class="text-sm text-slate-500">"Loading..."</div> }.into_any()
                }
                QueryState::Error(err) => {
                    view! { <div class="text-sm text-red-400">{err.message.clone()}</div> }.into_any()
                }
                QueryState::Success(value) => {
                    let run: PipelineRunResult = serde_json::from_value(value).unwrap_or_default();
                    let metrics = serde_json::to_string_pretty(&run.metrics).unwrap_or_default();
                    view! {
                        <div class="space-y-3">
                            <div class="flex space-x-4 text-xs text-slate-400">
                                <span>{run.candidates.len()} " candidates"</span>
                                <span>{run.rejections_count} " rejections"</span>
                            </div>
                            <pre class="text-xs bg-slate-950 border border-slate-800 rounded-lg p-3 overflow-auto text-slate-300">
                                {metrics}
                            </pre>
                            <DownloadLinks />
                        </div>
                    }
                    .into_any()
                }
            }}
        </div>
    }
}
