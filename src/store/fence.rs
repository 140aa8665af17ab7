//! Request fencing.
//!
//! Each remote dispatch takes a [`Ticket`] on a [`Lane`]. A read is superseded
//! by a later dispatch of the same read on the same slice; writes are never
//! superseded by reads, so a refresh cannot swallow the result of a mutation.
//! The fence also counts what is still in flight per slice, which drives the
//! slice's `loading` flag.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named partition of the state tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceId {
    Auth,
    Payment,
    Subscription,
    Statistics,
    Jobs,
    Applications,
    Messages,
    FlashJobs,
    ApplyAi,
    Ui,
}

impl SliceId {
    pub const ALL: [SliceId; 10] = [
        SliceId::Auth,
        SliceId::Payment,
        SliceId::Subscription,
        SliceId::Statistics,
        SliceId::Jobs,
        SliceId::Applications,
        SliceId::Messages,
        SliceId::FlashJobs,
        SliceId::ApplyAi,
        SliceId::Ui,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SliceId::Auth => "auth",
            SliceId::Payment => "payment",
            SliceId::Subscription => "subscription",
            SliceId::Statistics => "statistics",
            SliceId::Jobs => "jobs",
            SliceId::Applications => "applications",
            SliceId::Messages => "messages",
            SliceId::FlashJobs => "flash_jobs",
            SliceId::ApplyAi => "apply_ai",
            SliceId::Ui => "ui",
        }
    }
}

impl fmt::Display for SliceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering class of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Fetch keyed by operation name; the latest one of a slice wins
    Read(&'static str),
    /// Mutation; its answer is always applied
    Write,
}

/// Identifies one dispatch of a remote operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub slice: SliceId,
    pub lane: Lane,
    pub seq: u64,
}

/// Issues tickets, tells current from stale and tracks what is in flight
#[derive(Debug, Default)]
pub struct SequenceFence {
    next_seq: u64,
    latest_reads: HashMap<(SliceId, &'static str), u64>,
    /// Tickets at or below this are stale whatever their lane
    floors: HashMap<SliceId, u64>,
    in_flight: HashMap<SliceId, HashSet<u64>>,
}

impl SequenceFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// New ticket for `slice`. A read invalidates earlier tickets of the same read.
    pub fn issue(&mut self, slice: SliceId, lane: Lane) -> Ticket {
        self.next_seq += 1;
        let seq = self.next_seq;
        if let Lane::Read(name) = lane {
            self.latest_reads.insert((slice, name), seq);
        }
        self.in_flight.entry(slice).or_default().insert(seq);
        Ticket { slice, lane, seq }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        if ticket.seq <= self.floors.get(&ticket.slice).copied().unwrap_or(0) {
            return false;
        }
        match ticket.lane {
            Lane::Write => true,
            Lane::Read(name) => self.latest_reads.get(&(ticket.slice, name)) == Some(&ticket.seq),
        }
    }

    /// Marks every ticket issued so far for `slice` stale. They still count as
    /// in flight until their answers arrive.
    pub fn supersede_all(&mut self, slice: SliceId) {
        self.floors.insert(slice, self.next_seq);
    }

    /// The answer for `ticket` arrived, current or not
    pub fn settle(&mut self, ticket: &Ticket) {
        if let Some(pending) = self.in_flight.get_mut(&ticket.slice) {
            pending.remove(&ticket.seq);
        }
    }

    pub fn has_in_flight(&self, slice: SliceId) -> bool {
        self.in_flight
            .get(&slice)
            .map_or(false, |pending| !pending.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: Lane = Lane::Read("fetch_payment_history");

    #[test]
    fn test_only_latest_read_is_current() {
        let mut fence = SequenceFence::new();
        let first = fence.issue(SliceId::Payment, HISTORY);
        assert!(fence.is_current(&first));

        let second = fence.issue(SliceId::Payment, HISTORY);
        assert!(second.seq > first.seq);
        assert!(!fence.is_current(&first));
        assert!(fence.is_current(&second));
    }

    #[test]
    fn test_reads_do_not_supersede_writes_or_other_reads() {
        let mut fence = SequenceFence::new();
        let payment = fence.issue(SliceId::Payment, Lane::Write);
        let details = fence.issue(SliceId::Payment, Lane::Read("fetch_payment_details"));
        let _history = fence.issue(SliceId::Payment, HISTORY);
        let _history = fence.issue(SliceId::Payment, HISTORY);

        assert!(fence.is_current(&payment));
        assert!(fence.is_current(&details));
    }

    #[test]
    fn test_slices_are_fenced_independently() {
        let mut fence = SequenceFence::new();
        let payment = fence.issue(SliceId::Payment, Lane::Read("fetch_jobs"));
        let _jobs = fence.issue(SliceId::Jobs, Lane::Read("fetch_jobs"));
        assert!(fence.is_current(&payment));
    }

    #[test]
    fn test_in_flight_until_every_answer_is_settled() {
        let mut fence = SequenceFence::new();
        let first = fence.issue(SliceId::Jobs, Lane::Read("fetch_jobs"));
        let second = fence.issue(SliceId::Jobs, Lane::Read("fetch_jobs"));

        fence.settle(&second);
        assert!(fence.has_in_flight(SliceId::Jobs));
        fence.settle(&first);
        assert!(!fence.has_in_flight(SliceId::Jobs));
        assert!(!fence.has_in_flight(SliceId::Auth));
    }

    #[test]
    fn test_supersede_all_stales_writes_too() {
        let mut fence = SequenceFence::new();
        let login = fence.issue(SliceId::Auth, Lane::Write);
        fence.supersede_all(SliceId::Auth);
        assert!(!fence.is_current(&login));
        assert!(fence.has_in_flight(SliceId::Auth));

        let again = fence.issue(SliceId::Auth, Lane::Write);
        assert!(fence.is_current(&again));
    }

    #[test]
    fn test_unknown_read_ticket_is_stale() {
        let fence = SequenceFence::new();
        let ticket = Ticket { slice: SliceId::Auth, lane: Lane::Read("fetch_profile"), seq: 1 };
        assert!(!fence.is_current(&ticket));
    }
}
