//! HTTP client for the adjudication API.
//!
//! One method per remote capability; every failure is normalized into
//! [`RemoteError`] so the views have a single error-rendering path. The base
//! URL is configuration — empty for same-origin, which the dev server proxies.

use futures::future::{select, Either};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;
use web_sys::{File, FormData};

use crate::error::RemoteError;
use crate::models::{Claim, Dataset, HealthStatus, PipelineRunResult, ResubmissionCandidate};

/// Client-side bound on the long-running pipeline call.
pub const RUN_TIMEOUT_MS: u32 = 30_000;

/// Downloadable artifacts of the most recent pipeline run.
pub const ARTIFACTS: [&str; 4] = [
    "candidates.json",
    "metrics.json",
    "rejections.jsonl",
    "rejections.json",
];

#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Plain link to a fixed artifact endpoint; not a query.
    pub fn download_url(&self, artifact: &str) -> String {
        self.url(&format!("/api/pipeline/download/{artifact}"))
    }

    pub async fn list_datasets(&self) -> Result<Vec<Dataset>, RemoteError> {
        self.get_json("/api/datasets/").await
    }

    pub async fn get_claims(&self, dataset_id: &str) -> Result<Vec<Claim>, RemoteError> {
        self.get_json(&format!("/api/datasets/{dataset_id}/claims")).await
    }

    pub async fn get_candidates(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<ResubmissionCandidate>, RemoteError> {
        self.get_json(&format!("/api/datasets/{dataset_id}/candidates")).await
    }

    /// Most recently completed run, independent of which session produced it.
    pub async fn last_pipeline(&self) -> Result<PipelineRunResult, RemoteError> {
        self.get_json("/api/pipeline/last").await
    }

    pub async fn health_check(&self) -> Result<HealthStatus, RemoteError> {
        self.get_json("/api/datasets/health").await
    }

    /// Creates a dataset from `file`. An empty or absent `source` asks the
    /// server to auto-detect; any other tag is passed through verbatim.
    pub async fn upload_dataset(
        &self,
        file: File,
        source: Option<String>,
    ) -> Result<Dataset, RemoteError> {
        let form = multipart(&file, source.as_deref())?;
        let resp = Request::post(&self.url("/api/datasets/"))
            .body(form)
            .map_err(|e| RemoteError::transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| RemoteError::transport(e.to_string()))?;
        decode(check(resp).await?).await
    }

    /// Submits `file` for immediate end-to-end processing. Bounded client-side
    /// by [`RUN_TIMEOUT_MS`]; on expiry the call fails as a transport error and
    /// no partial result is accepted.
    pub async fn run_pipeline(&self, file: File) -> Result<PipelineRunResult, RemoteError> {
        let form = multipart(&file, None)?;
        let request = Request::post(&self.url("/api/pipeline/run"))
            .body(form)
            .map_err(|e| RemoteError::transport(e.to_string()))?;

        let send = Box::pin(request.send());
        let timeout = Box::pin(gloo_timers::future::TimeoutFuture::new(RUN_TIMEOUT_MS));
        let resp = match select(send, timeout).await {
            Either::Left((result, _)) => {
                result.map_err(|e| RemoteError::transport(e.to_string()))?
            }
            Either::Right(_) => return Err(RemoteError::timeout(RUN_TIMEOUT_MS)),
        };
        decode(check(resp).await?).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let resp = Request::get(&self.url(path))
            .send()
            .await
            .map_err(|e| RemoteError::transport(e.to_string()))?;
        decode(check(resp).await?).await
    }
}

fn multipart(file: &File, source: Option<&str>) -> Result<FormData, RemoteError> {
    let form = FormData::new().map_err(form_err)?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(form_err)?;
    if let Some(source) = source {
        if !source.is_empty() {
            form.append_with_str("source_system", source).map_err(form_err)?;
        }
    }
    Ok(form)
}

fn form_err(_: JsValue) -> RemoteError {
    RemoteError::transport("failed to build multipart form")
}

async fn check(resp: Response) -> Result<Response, RemoteError> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::from_response(status, &body))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    resp.json::<T>()
        .await
        .map_err(|e| RemoteError::transport(e.to_string()))
}
