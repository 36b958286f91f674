//! Dataset details view: claims and resubmission candidates.
//!
//! The two queries are independent. Either may resolve first, each carries
//! its own loading and error state, and a failure in one never blanks the
//! other section or the rest of the page.

use leptos::prelude::*;

use crate::cache::QueryState;
use crate::models::{Claim, ClaimStatus, ResubmissionCandidate};
use crate::workflow::{candidates_key, claims_key};

use super::{decode_vec, fetcher, use_query, AppContext, DownloadLinks};

fn status_badge(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Approved => "bg-green-500/10 text-green-400 border-green-500/20",
        ClaimStatus::Denied => "bg-red-500/10 text-red-400 border-red-500/20",
        ClaimStatus::Other => "bg-slate-800 text-slate-400 border-slate-700",
    }
}

#[component]
pub fn DatasetDetailsPage(dataset_id: String) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let claims = {
        let api = ctx.api();
        let id = dataset_id.clone();
        use_query(
            ctx,
            claims_key(&dataset_id),
            fetcher(move || {
                let api = api.clone();
                let id = id.clone();
                async move { api.get_claims(&id).await }
            }),
        )
    };
    let candidates = {
        let api = ctx.api();
        let id = dataset_id.clone();
        use_query(
            ctx,
            candidates_key(&dataset_id),
            fetcher(move || {
                let api = api.clone();
                let id = id.clone();
                async move { api.get_candidates(&id).await }
            }),
        )
    };

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <h1 class="text-2xl font-semibold text-white">
                    "Dataset " <span class="font-mono text-blue-400">{dataset_id.clone()}</span>
                </h1>
                <button
                    on:click=move |_| ctx.view.update(|view| *view = view.clone().back())
                    class="px-4 py-2 text-sm font-medium text-slate-300 bg-slate-900 border border-slate-700 rounded-lg hover:bg-slate-800 transition-colors"
                >
                    "← Back to Datasets"
                </button>
            </div>

            <DownloadLinks />

            <section class="space-y-4">
                <h2 class="text-xl font-semibold text-white">"Claims"</h2>
                {move || match claims.get() {
                    QueryState::Idle | QueryState::Loading => {
                        view! { <div class="text-slate-500">"Loading claims..."</div> }.into_any()
                    }
                    QueryState::Error(err) => view! {
                        <div class="p-4 bg-red-500/10 border border-red-500/20 rounded-lg text-red-400 text-sm">
                            {err.message.clone()}
                        </div>
                    }.into_any(),
                    QueryState::Success(value) => {
                        let rows = decode_vec::<Claim>(&value);
                        view! {
                            <div class="bg-slate-900 border border-slate-800 rounded-xl overflow-hidden">
                                <table class="w-full text-left border-collapse">
                                    <thead>
                                        <tr class="bg-slate-800/50">
                                            <th class="px-6 py-4 font-semibold text-slate-300">"Claim ID"</th>
                                            <th class="px-6 py-4 font-semibold text-slate-300">"Status"</th>
                                            <th class="px-6 py-4 font-semibold text-slate-300">"Denial Reason"</th>
                                            <th class="px-6 py-4 font-semibold text-slate-300">"Eligible"</th>
                                        </tr>
                                    </thead>
                                    <tbody class="divide-y divide-slate-800">
                                        {rows.into_iter().map(|claim| {
                                            let badge = status_badge(claim.status);
                                            let reason = claim.denial_reason_display().to_string();
                                            let (eligible_badge, eligible_label) = if claim.eligibility {
                                                ("bg-green-500/10 text-green-400 border-green-500/20", "Yes")
                                            } else {
                                                ("bg-slate-800 text-slate-400 border-slate-700", "No")
                                            };
                                            view! {
                                                <tr class="hover:bg-slate-800/30 transition-colors">
                                                    <td class="px-6 py-4 font-mono text-sm text-slate-100">{claim.claim_id}</td>
                                                    <td class="px-6 py-4">
                                                        <span class=format!("inline-flex px-2 py-0.5 text-xs font-semibold rounded-md border {badge}")>
                                                            {claim.status.to_string()}
                                                        </span>
                                                    </td>
                                                    <td class="px-6 py-4 text-slate-300 text-sm">{reason}</td>
                                                    <td class="px-6 py-4">
                                                        <span class=format!("inline-flex px-2 py-0.5 text-xs font-semibold rounded-md border {eligible_badge}")>
                                                            {eligible_label}
                                                        </span>
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
            </section>

            <section class="space-y-4">
                <h2 class="text-xl font-semibold text-white">"Resubmission Candidates"</h2>
                {move || match candidates.get() {
                    QueryState::Idle | QueryState::Loading => {
                        view! { <div class="text-slate-500">"Loading candidates..."</div> }.into_any()
                    }
                    QueryState::Error(err) => view! {
                        <div class="p-4 bg-red-500/10 border border-red-500/20 rounded-lg text-red-400 text-sm">
                            {err.message.clone()}
                        </div>
                    }.into_any(),
                    QueryState::Success(value) => {
                        let list = decode_vec::<ResubmissionCandidate>(&value);
                        if list.is_empty() {
                            // absence of candidates is a normal state, not an error
                            view! {
                                <div class="bg-slate-900 border border-slate-800 rounded-xl p-6 text-slate-500">
                                    "No resubmission candidates found."
                                </div>
                            }.into_any()
                        } else {
                            view! {
                                <div class="bg-slate-900 border border-slate-800 rounded-xl p-6 space-y-4">
                                    {list.into_iter().map(|candidate| view! {
                                        <div class="border-l-4 border-blue-500 pl-4 space-y-1">
                                            <div class="font-mono text-sm font-medium text-slate-100">{candidate.claim_id}</div>
                                            <div class="text-sm text-slate-400">"Reason: " {candidate.resubmission_reason}</div>
                                            <div class="text-sm text-slate-400">"Recommendation: " {candidate.recommended_changes}</div>
                                        </div>
                                    }).collect_view()}
                                </div>
                            }.into_any()
                        }
                    }
                }}
            </section>
        </div>
    }
}
