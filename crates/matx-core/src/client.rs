//! The endpoint client: orchestrates query building, first-page metadata
//! discovery, pagination planning, bounded fan-out, and offset-ordered
//! merging.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::CatalogConfig;
use crate::endpoint::CatalogEndpoint;
use crate::envelope::{parse_page, EnvelopeShape, PageEnvelope};
use crate::error::{ApiError, FetchError, ValidationError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::paginator::Paginator;
use crate::query::QueryParams;
use crate::retry::retry;

/// The complete, ordered outcome of one logical endpoint call, plus
/// provenance for the layers downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// Raw records in offset order. Page order is preserved regardless of
    /// which page fetch completed first.
    pub records: Vec<Value>,
    /// Pages actually requested, the initial metadata page included.
    pub pages_fetched: usize,
    /// Offset of the initial page (the configured origin).
    pub first_offset: u64,
    /// Offset of the last requested page.
    pub last_offset: u64,
    /// Non-fatal signals, e.g. that a deprecated endpoint was called.
    pub warnings: Vec<String>,
}

/// Paginated, fault-tolerant client for the catalog API families.
///
/// A completed call returns every record the plan covers, in offset order,
/// or fails as a whole — there is no partial-result path.
pub struct CatalogClient {
    config: CatalogConfig,
    http: Arc<dyn HttpClient>,
}

impl CatalogClient {
    /// Build a client with the production reqwest transport.
    pub fn new(config: CatalogConfig) -> Result<Self, ValidationError> {
        let http = Arc::new(ReqwestHttpClient::new(config.timeouts));
        Self::with_http_client(config, http)
    }

    /// Build a client over any transport, e.g. a scripted one in tests.
    pub fn with_http_client(
        config: CatalogConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Fetch every record the endpoint exposes, up to `cap` when given.
    ///
    /// The first page is always fetched alone to read the server's reported
    /// total; the remaining pages are planned from that total (bounded by
    /// `cap`), fetched with bounded concurrency, and merged in offset order.
    /// When the server reports no total and no cap was supplied, the result
    /// is exactly the first page.
    pub async fn fetch_all(
        &self,
        endpoint: CatalogEndpoint,
        fields: &[&str],
        filters: &BTreeMap<String, String>,
        cap: Option<u64>,
    ) -> Result<FetchResult, FetchError> {
        let mut warnings = Vec::new();
        if endpoint.deprecated() {
            warn!(%endpoint, "deprecated endpoint requested");
            warnings.push(format!("endpoint '{endpoint}' is deprecated upstream"));
        }

        let url = format!("{}/{}", self.config.base_url(endpoint.family()), endpoint.path());
        let shape = endpoint.shape();
        let params = QueryParams::build(fields, filters);
        let origin = self.config.origin_offset;

        info!(%endpoint, offset = origin, "fetching first page");
        let first = self.fetch_page(&url, &params, shape).await?;

        let total = effective_total(first.total_available, cap);
        let paginator = Paginator::new(origin, self.config.page_size)?;
        let plan = paginator.plan(total);

        let pages_fetched = 1 + plan.len();
        let last_offset = plan.last().map_or(origin, |page| page.offset);
        let mut records = first.records;

        if !plan.is_empty() {
            let fan_out = plan.len().min(self.config.max_in_flight);
            let url_ref = &url;
            let page_futures = plan.into_iter().map(|page| {
                let page_params = params.with_page(page);
                async move {
                    info!(%endpoint, offset = page.offset, limit = page.limit, "fetching page");
                    let envelope = self.fetch_page(url_ref, &page_params, shape).await?;
                    Ok::<(u64, PageEnvelope), FetchError>((page.offset, envelope))
                }
            });

            let mut pages: Vec<(u64, PageEnvelope)> = stream::iter(page_futures)
                .buffer_unordered(fan_out)
                .try_collect()
                .await?;

            // Merge keyed by offset, not by completion order.
            pages.sort_by_key(|(offset, _)| *offset);
            for (_, envelope) in pages {
                records.extend(envelope.records);
            }
        }

        info!(%endpoint, records = records.len(), pages = pages_fetched, "fetch complete");
        Ok(FetchResult {
            records,
            pages_fetched,
            first_offset: origin,
            last_offset,
            warnings,
        })
    }

    /// [`fetch_all`](Self::fetch_all) bounded by a caller deadline.
    ///
    /// The whole call — in-flight requests and any pending retry sleep —
    /// aborts when the deadline passes.
    pub async fn fetch_all_within(
        &self,
        deadline: Duration,
        endpoint: CatalogEndpoint,
        fields: &[&str],
        filters: &BTreeMap<String, String>,
        cap: Option<u64>,
    ) -> Result<FetchResult, FetchError> {
        match tokio::time::timeout(deadline, self.fetch_all(endpoint, fields, filters, cap)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::DeadlineExceeded),
        }
    }

    /// Formation-energy phases (`/oqmdapi/formationenergy`).
    pub async fn phases(
        &self,
        fields: &[&str],
        filters: &BTreeMap<String, String>,
        cap: Option<u64>,
    ) -> Result<FetchResult, FetchError> {
        self.fetch_all(CatalogEndpoint::Phases, fields, filters, cap).await
    }

    /// Crystal structures (`/optimade/structures`). The OPTIMADE family takes
    /// no field selection; records come back `attributes`-wrapped and are
    /// flattened here.
    pub async fn structures(
        &self,
        filters: &BTreeMap<String, String>,
        cap: Option<u64>,
    ) -> Result<FetchResult, FetchError> {
        self.fetch_all(CatalogEndpoint::Structures, &[], filters, cap).await
    }

    /// DFT calculations (`/oqmdapi/calculation`).
    pub async fn calculations(
        &self,
        fields: &[&str],
        filters: &BTreeMap<String, String>,
        cap: Option<u64>,
    ) -> Result<FetchResult, FetchError> {
        self.fetch_all(CatalogEndpoint::Calculations, fields, filters, cap).await
    }

    /// Raw entries (`/oqmdapi/entry`). Deprecated upstream; the call still
    /// executes and the result carries a warning.
    pub async fn entries(
        &self,
        fields: &[&str],
        filters: &BTreeMap<String, String>,
        cap: Option<u64>,
    ) -> Result<FetchResult, FetchError> {
        self.fetch_all(CatalogEndpoint::Entries, fields, filters, cap).await
    }

    /// Fetch and parse one page, retrying per the configured policy. Each
    /// attempt issues a fresh request over the shared transport.
    async fn fetch_page(
        &self,
        url: &str,
        params: &QueryParams,
        shape: EnvelopeShape,
    ) -> Result<PageEnvelope, FetchError> {
        let request = HttpRequest::get(url).with_query_pairs(params.pairs().to_vec());
        let http = &self.http;

        let response = retry(&self.config.retry, || {
            let request = request.clone();
            async move {
                let response = http
                    .execute(request)
                    .await
                    .map_err(|e| ApiError::transport(e.message()))?;
                if !response.is_success() {
                    return Err(ApiError::from_status(response.status, &response.body));
                }
                Ok(response)
            }
        })
        .await?;

        parse_page(&response.body, shape)
    }
}

/// Decide how many records the whole call should cover.
///
/// The server's reported total wins, bounded by the caller's cap when both
/// are present. With neither, pagination stops after the first page.
fn effective_total(reported: Option<u64>, cap: Option<u64>) -> Option<u64> {
    match (reported, cap) {
        (Some(available), Some(cap)) => Some(available.min(cap)),
        (Some(available), None) => Some(available),
        (None, cap) => cap,
    }
}
