//! Datasets view: the list of everything submitted so far.

use leptos::prelude::*;

use crate::cache::QueryState;
use crate::models::Dataset;
use crate::router::View;
use crate::workflow::DATASETS_KEY;

use super::{decode_vec, fetcher, use_query, AppContext};

#[component]
pub fn DatasetsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let api = ctx.api();
    let datasets = use_query(
        ctx,
        DATASETS_KEY.to_string(),
        fetcher(move || {
            let api = api.clone();
            async move { api.list_datasets().await }
        }),
    );

    view! {
        <div class="space-y-6">
            <h1 class="text-2xl font-semibold text-white">"Datasets"</h1>
            {move || match datasets.get() {
                QueryState::Idle | QueryState::Loading => {
                    view! { <div class="text-slate-500">"Loading..."</div> }.into_any()
                }
                QueryState::Error(err) => view! {
                    <div class="p-4 bg-red-500/10 border border-red-500/20 rounded-lg text-red-400 text-sm">
                        {err.message.clone()}
                    </div>
                }.into_any(),
                QueryState::Success(value) => {
                    let rows = decode_vec::<Dataset>(&value);
                    view! {
                        <div class="bg-slate-900 border border-slate-800 rounded-xl overflow-hidden">
                            <table class="w-full text-left border-collapse">
                                <thead>
                                    <tr class="bg-slate-800/50">
                                        <th class="px-6 py-4 font-semibold text-slate-300">"ID"</th>
                                        <th class="px-6 py-4 font-semibold text-slate-300">"Filename"</th>
                                        <th class="px-6 py-4 font-semibold text-slate-300">"Source"</th>
                                        <th class="px-6 py-4 font-semibold text-slate-300">"Records"</th>
                                        <th class="px-6 py-4 font-semibold text-slate-300">"Actions"</th>
                                    </tr>
                                </thead>
                                <tbody class="divide-y divide-slate-800">
                                    {rows.into_iter().map(|dataset| {
                                        let id = dataset.id.clone();
                                        view! {
                                            <tr class="hover:bg-slate-800/30 transition-colors">
                                                <td class="px-6 py-4 font-mono text-sm text-slate-300">{dataset.id.clone()}</td>
                                                <td class="px-6 py-4 text-slate-100">{dataset.filename}</td>
                                                <td class="px-6 py-4">
                                                    <span class="inline-flex px-2 py-0.5 bg-blue-500/10 text-blue-400 rounded-md text-xs border border-blue-500/20">
                                                        {dataset.source_system}
                                                    </span>
                                                </td>
                                                <td class="px-6 py-4 text-slate-300 text-sm font-mono">{dataset.record_count}</td>
                                                <td class="px-6 py-4">
                                                    <button
                                                        on:click=move |_| ctx.view.set(View::DatasetDetails(id.clone()))
                                                        class="text-blue-400 hover:underline text-sm font-medium"
                                                    >
                                                        "View Details"
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    }).collect_view()}
                                </tbody>
                            </table>
                        </div>
                    }.into_any()
                }
            }}
        </div>
    }
}
