// src/query/pagination.rs
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RevealRejected {
    #[error("a reveal is already in flight")]
    InFlight,
    #[error("no more records to reveal")]
    Exhausted,
}

/// Handle for one outstanding reveal. Stale once the inputs change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTicket {
    generation: u64,
}

/// Incremental reveal cursor over a filtered sequence of `total` items.
#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: usize,
    current_page: usize,
    revealed: usize,
    total: usize,
    exhausted: bool,
    in_flight: bool,
    generation: u64,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            revealed: 0,
            total: 0,
            exhausted: false,
            in_flight: false,
            generation: 0,
        }
    }

    /// Start over for a freshly filtered sequence: page 1, first page revealed.
    /// Any outstanding ticket becomes stale.
    pub fn reset(&mut self, total: usize) {
        self.generation = self.generation.wrapping_add(1);
        self.total = total;
        self.current_page = 1;
        self.revealed = total.min(self.page_size);
        self.exhausted = false;
        self.in_flight = false;
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted && self.total > self.revealed
    }

    pub fn begin_reveal(&mut self) -> Result<RevealTicket, RevealRejected> {
        if self.in_flight {
            return Err(RevealRejected::InFlight);
        }
        if !self.has_more() {
            return Err(RevealRejected::Exhausted);
        }
        self.in_flight = true;
        Ok(RevealTicket {
            generation: self.generation,
        })
    }

    /// Finish a reveal and return the newly revealed index range.
    /// A ticket from before the last `reset` is ignored (`None`).
    pub fn complete_reveal(&mut self, ticket: RevealTicket) -> Option<Range<usize>> {
        if ticket.generation != self.generation {
            return None;
        }
        self.in_flight = false;
        let start = self.revealed;
        let end = (start + self.page_size).min(self.total);
        if start >= end {
            self.exhausted = true;
            return Some(start..start);
        }
        self.revealed = end;
        self.current_page += 1;
        Some(start..end)
    }

    pub fn reveal_next(&mut self) -> Result<Range<usize>, RevealRejected> {
        let ticket = self.begin_reveal()?;
        Ok(self
            .complete_reveal(ticket)
            .unwrap_or(self.revealed..self.revealed))
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}
