//! In-memory collaborators for testing and simulation
//!
//! Provides a contact plan and a queueing subsystem that live entirely in
//! memory, so the routing engine can be exercised without a bundle agent.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cgr_core::{Contact, MemoryBacklog, MemoryContactPlan, NodeId, Priority, Range};
//!
//! let mut plan = MemoryContactPlan::new();
//! plan.add_contact(Contact::new(NodeId(1), NodeId(2), 0, 100, 1000))?;
//! plan.add_range(Range::new(NodeId(1), NodeId(2), 0, 100, 1));
//!
//! let backlog = MemoryBacklog::new();
//! backlog.open_plan(NodeId(2));
//! backlog.enqueue(NodeId(2), Priority::Normal, 0, 4096);
//! ```

use std::collections::{BTreeMap, HashSet, VecDeque};

use dashmap::DashMap;
use tracing::trace;

use crate::contact::{Contact, PRIORITY_LEVELS, Priority, Range};
use crate::error::{BacklogError, ContactPlanError};
use crate::node::NodeId;
use crate::scalar::Scalar;
use crate::traits::{Backlog, BacklogSource, ContactPlan};

/// Contact plan held in ordered maps
///
/// Contacts and ranges are indexed by `(from, to)` and kept sorted by
/// start time within each pair.
#[derive(Debug, Default, Clone)]
pub struct MemoryContactPlan {
    contacts: BTreeMap<(NodeId, NodeId), Vec<Contact>>,
    ranges: BTreeMap<(NodeId, NodeId), Vec<Range>>,
}

impl MemoryContactPlan {
    /// Create an empty contact plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a contact, keeping start-time order
    pub fn add_contact(&mut self, contact: Contact) -> Result<(), ContactPlanError> {
        contact.validate()?;
        let list = self
            .contacts
            .entry((contact.from_node, contact.to_node))
            .or_default();
        let pos = list.partition_point(|c| c.from_time <= contact.from_time);
        list.insert(pos, contact);
        Ok(())
    }

    /// Insert a range, keeping start-time order
    pub fn add_range(&mut self, range: Range) {
        let list = self.ranges.entry((range.from_node, range.to_node)).or_default();
        let pos = list.partition_point(|r| r.from_time <= range.from_time);
        list.insert(pos, range);
    }

    /// Insert a range and its reverse
    pub fn add_symmetric_range(&mut self, range: Range) {
        let reverse = Range::new(
            range.to_node,
            range.from_node,
            range.from_time,
            range.to_time,
            range.owlt,
        );
        self.add_range(range);
        if reverse.from_node != reverse.to_node {
            self.add_range(reverse);
        }
    }

    /// Drop contacts and ranges that ended at or before `now`
    pub fn discard_expired(&mut self, now: i64) {
        for list in self.contacts.values_mut() {
            list.retain(|c| c.to_time > now);
        }
        self.contacts.retain(|_, list| !list.is_empty());
        for list in self.ranges.values_mut() {
            list.retain(|r| r.to_time > now);
        }
        self.ranges.retain(|_, list| !list.is_empty());
    }

    /// All contacts, grouped by node pair
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values().flatten()
    }

    /// Total number of contacts
    pub fn contact_count(&self) -> usize {
        self.contacts.values().map(Vec::len).sum()
    }

    /// Whether `destination` can be reached from `start` ignoring timing
    fn reaches(&self, start: NodeId, destination: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            if node == destination {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            for to in self.local_neighbors(node) {
                if !visited.contains(&to) {
                    queue.push_back(to);
                }
            }
        }
        false
    }
}

impl ContactPlan for MemoryContactPlan {
    fn contacts_between(&self, from: NodeId, to: NodeId) -> Vec<&Contact> {
        self.contacts
            .get(&(from, to))
            .map(|list| list.iter().collect())
            .unwrap_or_default()
    }

    fn applicable_range(
        &self,
        from: NodeId,
        to: NodeId,
        at: i64,
    ) -> Result<u32, ContactPlanError> {
        self.ranges
            .get(&(from, to))
            .and_then(|list| {
                list.iter()
                    .take_while(|r| r.from_time <= at)
                    .find(|r| r.applies_at(at))
            })
            .map(|r| r.owlt)
            .ok_or(ContactPlanError::RangeNotFound { from, to, at })
    }

    fn local_neighbors(&self, local: NodeId) -> Vec<NodeId> {
        self.contacts
            .range((local, NodeId(0))..=(local, NodeId(u64::MAX)))
            .map(|((_, to), _)| *to)
            .collect()
    }

    fn is_destination_neighbor(&self, destination: NodeId, node: NodeId) -> bool {
        self.reaches(node, destination)
    }
}

/// Queue state toward one neighbor
#[derive(Debug, Clone, Default)]
struct NeighborQueue {
    /// Bytes queued per priority
    bytes: [u64; PRIORITY_LEVELS],
    /// Expedited bytes split by ordinal
    expedited: BTreeMap<u8, u64>,
    /// Whether the egress plan is blocked
    blocked: bool,
}

impl NeighborQueue {
    fn total(&self) -> u64 {
        self.bytes.iter().sum()
    }

    fn applicable(&self, priority: Priority, ordinal: u8) -> u64 {
        let higher: u64 = self.bytes[priority.index() + 1..].iter().sum();
        let same = match priority {
            Priority::Expedited => self.expedited.range(ordinal..).map(|(_, b)| *b).sum(),
            _ => self.bytes[priority.index()],
        };
        higher + same
    }
}

/// Queueing subsystem held in a concurrent map
///
/// Forwarding threads may enqueue and dequeue while the routing engine
/// reads, so each neighbor's queue lives behind its own map shard.
#[derive(Debug, Default)]
pub struct MemoryBacklog {
    queues: DashMap<NodeId, NeighborQueue>,
}

impl MemoryBacklog {
    /// Create an empty backlog with no egress plans
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an egress plan toward `neighbor`
    pub fn open_plan(&self, neighbor: NodeId) {
        self.queues.entry(neighbor).or_default();
    }

    /// Remove the egress plan toward `neighbor`
    pub fn close_plan(&self, neighbor: &NodeId) {
        self.queues.remove(neighbor);
    }

    /// Block or unblock the egress plan toward `neighbor`
    pub fn set_blocked(&self, neighbor: NodeId, blocked: bool) {
        self.queues.entry(neighbor).or_default().blocked = blocked;
    }

    /// Queue bytes toward `neighbor`
    pub fn enqueue(&self, neighbor: NodeId, priority: Priority, ordinal: u8, bytes: u64) {
        let mut queue = self.queues.entry(neighbor).or_default();
        queue.bytes[priority.index()] += bytes;
        if priority == Priority::Expedited {
            *queue.expedited.entry(ordinal).or_default() += bytes;
        }
        trace!(%neighbor, ?priority, ordinal, bytes, "Enqueued");
    }

    /// Remove transmitted bytes from the queue toward `neighbor`
    pub fn dequeue(&self, neighbor: NodeId, priority: Priority, ordinal: u8, bytes: u64) {
        if let Some(mut queue) = self.queues.get_mut(&neighbor) {
            let slot = &mut queue.bytes[priority.index()];
            *slot = slot.saturating_sub(bytes);
            if priority == Priority::Expedited {
                if let Some(b) = queue.expedited.get_mut(&ordinal) {
                    *b = b.saturating_sub(bytes);
                }
            }
        }
    }
}

impl BacklogSource for MemoryBacklog {
    fn applicable_backlog(
        &self,
        neighbor: NodeId,
        priority: Priority,
        ordinal: u8,
    ) -> Result<Backlog, BacklogError> {
        let queue = self
            .queues
            .get(&neighbor)
            .ok_or(BacklogError::NoPlan(neighbor))?;
        if queue.blocked {
            return Err(BacklogError::Blocked(neighbor));
        }
        Ok(Backlog {
            applicable: Scalar::from(queue.applicable(priority, ordinal)),
            total: Scalar::from(queue.total()),
        })
    }
}
