/// Home feed ordering: followed authors first, then newest first
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

use crate::store::Candidate;

pub const FOLLOWED_PRIORITY: u8 = 1;
pub const OTHER_PRIORITY: u8 = 0;

pub struct SocialFeedPrioritizer<'a> {
    following_ids: &'a HashSet<Uuid>,
}

impl<'a> SocialFeedPrioritizer<'a> {
    pub fn new(following_ids: &'a HashSet<Uuid>) -> Self {
        Self { following_ids }
    }

    pub fn priority(&self, candidate: &Candidate) -> u8 {
        if self.following_ids.contains(&candidate.author_id) {
            FOLLOWED_PRIORITY
        } else {
            OTHER_PRIORITY
        }
    }

    /// Priority descending, then `created_at` descending
    pub fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        self.priority(b)
            .cmp(&self.priority(a))
            .then_with(|| b.created_at.cmp(&a.created_at))
    }

    /// Stable in-place sort
    pub fn order(&self, candidates: &mut [Candidate]) {
        candidates.sort_by(|a, b| self.compare(a, b));
    }
}
