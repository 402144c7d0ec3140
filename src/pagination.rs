//! Page-by-page retrieval state for the public listing feed.
//!
//! Responses are applied in request-issue order, not arrival order: every
//! fetch carries a sequence token and only the most recently issued token is
//! accepted. A page change while an older fetch is still outstanding
//! supersedes it, so the late response is discarded instead of clobbering
//! newer data.

use serde::{Deserialize, Serialize};

use crate::PAGE_SIZE;

/// Identity of one issued listing fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub seq: u64,
    pub page: u32,
}

/// Whether an arriving response still matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Current,
    Stale,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    current_page: u32,
    /// Unknown until the first response arrives.
    total_pages: Option<u32>,
    next_seq: u64,
    in_flight: Option<PageRequest>,
}

impl Pagination {
    /// Validates a page change and issues a request token for it.
    ///
    /// Returns `None` when `page` falls outside `[0, total_pages)` — the
    /// caller must treat that as a no-op. Before the first response the
    /// total is unknown and any page may be requested (the shell only ever
    /// asks for page 0 at that point).
    pub fn request(&mut self, page: u32) -> Option<PageRequest> {
        if let Some(total) = self.total_pages {
            if page >= total {
                return None;
            }
        }

        self.next_seq += 1;
        let request = PageRequest {
            seq: self.next_seq,
            page,
        };
        self.in_flight = Some(request);
        Some(request)
    }

    /// Classifies an arriving response by its token. Only the latest issued
    /// request is current; accepting it clears the in-flight slot.
    pub fn accept(&mut self, seq: u64) -> Freshness {
        match self.in_flight {
            Some(request) if request.seq == seq => {
                self.in_flight = None;
                Freshness::Current
            }
            _ => Freshness::Stale,
        }
    }

    /// Records what the server reported for an accepted page.
    pub fn apply(&mut self, page_number: u32, total_pages: u32) {
        self.current_page = page_number;
        self.total_pages = Some(total_pages);
    }

    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 0
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.total_pages
            .is_some_and(|total| self.current_page + 1 < total)
    }

    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }
}
