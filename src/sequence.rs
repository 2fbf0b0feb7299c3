//! Per-kind request sequencing.
//!
//! Every request of a given [`RequestKind`] is tagged with a [`Ticket`] drawn
//! from that kind's [`RequestSequence`]. When the response arrives, the
//! controller commits it only if the ticket is still the latest one issued.
//! Tickets are issued inside the same state update that records the intent
//! (new cutoff, new query), so "latest ticket" and "latest intent" agree.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::RequestKind;

/// Tag attached to one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: RequestKind,
    seq: u64,
}

impl Ticket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug)]
pub struct RequestSequence {
    kind: RequestKind,
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            latest: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Issue a fresh ticket, superseding every ticket issued before it.
    pub fn issue(&self) -> Ticket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            kind: self.kind,
            seq,
        }
    }

    /// Supersede all outstanding tickets without issuing a new request.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether `ticket` is the most recently issued one of this kind.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.kind == self.kind && ticket.seq == self.latest.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}
