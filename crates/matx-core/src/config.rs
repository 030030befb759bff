//! Client configuration.

use crate::endpoint::ApiFamily;
use crate::error::ValidationError;
use crate::http_client::TransportTimeouts;
use crate::retry::RetryConfig;

pub const DEFAULT_OQMD_BASE_URL: &str = "https://oqmd.org/oqmdapi";
pub const DEFAULT_OPTIMADE_BASE_URL: &str = "https://oqmd.org/optimade";

/// Everything the endpoint client needs threaded through construction —
/// there are no process-wide knobs, so tests can run with tiny delays and
/// local base URLs.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub oqmd_base_url: String,
    pub optimade_base_url: String,
    /// Records per page; also the offset stride between planned pages.
    pub page_size: u64,
    /// Starting offset for a logical fetch. Zero except for resumed or
    /// partial fetches.
    pub origin_offset: u64,
    /// Ceiling on concurrent page fetches. The effective fan-out is the
    /// smaller of this and the planned page count.
    pub max_in_flight: usize,
    pub timeouts: TransportTimeouts,
    pub retry: RetryConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            oqmd_base_url: DEFAULT_OQMD_BASE_URL.to_owned(),
            optimade_base_url: DEFAULT_OPTIMADE_BASE_URL.to_owned(),
            page_size: 50,
            origin_offset: 0,
            max_in_flight: 4,
            timeouts: TransportTimeouts::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl CatalogConfig {
    pub fn with_base_urls(mut self, oqmd: impl Into<String>, optimade: impl Into<String>) -> Self {
        self.oqmd_base_url = oqmd.into();
        self.optimade_base_url = optimade.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_origin_offset(mut self, origin_offset: u64) -> Self {
        self.origin_offset = origin_offset;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TransportTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self, family: ApiFamily) -> &str {
        match family {
            ApiFamily::Oqmd => &self.oqmd_base_url,
            ApiFamily::Optimade => &self.optimade_base_url,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 {
            return Err(ValidationError::ZeroPageSize);
        }
        if self.max_in_flight == 0 {
            return Err(ValidationError::ZeroMaxInFlight);
        }
        if self.oqmd_base_url.trim().is_empty() {
            return Err(ValidationError::EmptyBaseUrl { family: "oqmd" });
        }
        if self.optimade_base_url.trim().is_empty() {
            return Err(ValidationError::EmptyBaseUrl { family: "optimade" });
        }
        Ok(())
    }
}
