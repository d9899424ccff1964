use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::info;

use crate::NodeId;

/// Whom this node has voted for, by term.
///
/// At most one vote is granted per term and a granted vote is never changed.
/// This includes the vote a candidate casts for itself.
#[derive(Clone, Debug, Default)]
#[derive(PartialEq, Eq)]
pub(crate) struct VoteRecord {
    votes: BTreeMap<u64, NodeId>,
}

impl VoteRecord {
    /// Grant the vote of `term` to `candidate` if no vote has been granted in
    /// this term.
    ///
    /// Returns `true` only if this call recorded the vote. Asking again for an
    /// already granted vote, even by the same candidate, returns `false`.
    pub(crate) fn grant(&mut self, term: u64, candidate: &NodeId) -> bool {
        match self.votes.entry(term) {
            Entry::Vacant(e) => {
                info!("grant vote of term {} to {}", term, candidate);
                e.insert(candidate.clone());
                true
            }
            Entry::Occupied(e) => {
                info!(
                    "reject vote of term {} to {}: already voted for {}",
                    term,
                    candidate,
                    e.get()
                );
                false
            }
        }
    }

    pub(crate) fn voted_for(&self, term: u64) -> Option<&NodeId> {
        self.votes.get(&term)
    }

    pub(crate) fn votes(&self) -> &BTreeMap<u64, NodeId> {
        &self.votes
    }
}
