//! Browser console for the claims adjudication pipeline.
//!
//! The crate is split so that everything with coordination logic — the query
//! cache, the view router, the upload workflow, error normalization, and the
//! data model — is plain Rust that compiles and tests on the host. Only the
//! HTTP transport and the Leptos views are gated to `wasm32`.

pub mod cache;
pub mod error;
pub mod models;
pub mod router;
pub mod workflow;

#[cfg(target_arch = "wasm32")]
pub mod api;
#[cfg(target_arch = "wasm32")]
pub mod app;
