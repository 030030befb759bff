//! Pure pagination planning. No I/O lives here.

use crate::error::ValidationError;

/// One bounded slice of the logical result set.
///
/// Produced by [`Paginator::plan`] in strictly increasing offset order, with
/// offsets spaced exactly one page apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

/// Converts a target record count into the ordered page requests that cover
/// it, excluding the page at the origin — the endpoint client always fetches
/// that one first to discover pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    origin: u64,
    page_size: u64,
}

impl Paginator {
    pub fn new(origin: u64, page_size: u64) -> Result<Self, ValidationError> {
        if page_size == 0 {
            return Err(ValidationError::ZeroPageSize);
        }
        Ok(Self { origin, page_size })
    }

    pub const fn origin(&self) -> u64 {
        self.origin
    }

    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Plan the remaining pages for `total_to_fetch` records.
    ///
    /// Produces `ceil(total / page_size)` requests starting one page past the
    /// origin. An absent or zero total yields an empty plan: when the server
    /// never reports a total and the caller supplied no cap, the result set
    /// is exactly page one.
    pub fn plan(&self, total_to_fetch: Option<u64>) -> Vec<PageRequest> {
        let total = match total_to_fetch {
            Some(total) if total > 0 => total,
            _ => return Vec::new(),
        };

        let pages = total.div_ceil(self.page_size);
        (1..=pages)
            .map(|page| PageRequest {
                offset: self.origin + page * self.page_size,
                limit: self.page_size,
            })
            .collect()
    }
}
