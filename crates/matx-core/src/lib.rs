//! # Matx Core
//!
//! Paginated, fault-tolerant client for the OQMD/OPTIMADE materials
//! catalogs.
//!
//! ## Overview
//!
//! The catalog API exposes arbitrarily large result sets only in bounded
//! pages, with an envelope shape that varies per endpoint and a total count
//! that is sometimes absent. This crate reconstructs the logical sequence:
//!
//! - **Declarative endpoint table** mapping each endpoint to its URL path,
//!   API family, records field, and `attributes`-flattening flag
//! - **Pure pagination planning** from the first page's metadata
//! - **Classified retry** — transient server failures sleep and retry,
//!   client rejections propagate immediately
//! - **Bounded concurrent fan-out** with a deterministic offset-ordered merge
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Endpoint client orchestrating a logical fetch |
//! | [`config`] | Construction-time configuration surface |
//! | [`endpoint`] | Per-endpoint descriptor table |
//! | [`envelope`] | Response-envelope normalization |
//! | [`error`] | Classified error taxonomy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`paginator`] | Pure page planning |
//! | [`query`] | Query-parameter construction |
//! | [`retry`] | Generic retry wrapper and backoff policies |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::collections::BTreeMap;
//! use matx_core::{CatalogClient, CatalogConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::new(CatalogConfig::default())?;
//!
//!     let mut filters = BTreeMap::new();
//!     filters.insert("generic".to_owned(), "ABC3".to_owned());
//!
//!     let result = client
//!         .phases(&["composition", "band_gap"], &filters, Some(500))
//!         .await?;
//!
//!     println!("{} records over {} pages", result.records.len(), result.pages_fetched);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  CatalogClient   │  fetch_all: first page → plan → fan-out → merge
//! └──┬─────────┬─────┘
//!    │         │
//!    ▼         ▼
//! ┌───────┐ ┌───────────┐   ┌──────────┐
//! │ Query │ │ Paginator │   │ Envelope │  per-endpoint shape table
//! └───────┘ └───────────┘   └──────────┘
//!    │
//!    ▼
//! ┌──────────┐   ┌─────────────────┐
//! │  Retry   │──▶│ HttpClient      │
//! │ (policy) │   │ (reqwest/test)  │
//! └──────────┘   └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! A call yields either a complete, correctly ordered [`FetchResult`] or a
//! classified error — never a silently truncated result:
//!
//! ```rust
//! use matx_core::{ApiError, ApiErrorKind};
//!
//! fn handle(error: &ApiError) {
//!     match error.kind() {
//!         ApiErrorKind::ServerTransient => {
//!             // retried automatically up to the attempt budget
//!         }
//!         ApiErrorKind::ClientRejected => {
//!             // the request itself is wrong; fix it
//!         }
//!         ApiErrorKind::Unclassified => {
//!             // retry only if configured to
//!         }
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod paginator;
pub mod query;
pub mod retry;

// Re-export commonly used types at crate root for convenience

pub use client::{CatalogClient, FetchResult};

pub use config::{CatalogConfig, DEFAULT_OPTIMADE_BASE_URL, DEFAULT_OQMD_BASE_URL};

pub use endpoint::{ApiFamily, CatalogEndpoint};

pub use envelope::{parse_page, EnvelopeShape, PageEnvelope};

pub use error::{ApiError, ApiErrorKind, FetchError, ValidationError};

pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    TransportTimeouts,
};

pub use paginator::{PageRequest, Paginator};

pub use query::QueryParams;

pub use retry::{retry, Backoff, RetryConfig};
