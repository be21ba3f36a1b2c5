//! Derived vote tallies for posts and comments.
//!
//! The summary is a cache: it is always recomputed from the full set of vote
//! edges for a target and written onto the parent, never patched
//! incrementally. Missed increments therefore cannot accumulate drift.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::vote::VoteDirection;

/// Aggregate vote counts carried on a post or comment.
///
/// ## Invariants
/// - `total_votes == likes + dislikes`; withdrawn votes count in neither.
/// - `like_percentage` lies in `[0, 100]` and is exactly `0` when
///   `total_votes` is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    /// Count of up votes.
    pub likes: u64,
    /// Count of down votes.
    pub dislikes: u64,
    /// Likes plus dislikes.
    pub total_votes: u64,
    /// Share of likes among cast votes, as a percentage.
    pub like_percentage: f64,
}

impl VoteSummary {
    /// The summary written when a target has no edges left.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Tally a target's edge directions into a summary.
    ///
    /// This is the pure aggregation step: callers fetch every direction for
    /// the target and always write the result back, including the all-zero
    /// case after the last edge disappears.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{VoteDirection, VoteSummary};
    ///
    /// let summary = VoteSummary::tally([VoteDirection::Up, VoteDirection::Down].into_iter());
    /// assert_eq!(summary.total_votes, 2);
    /// assert_eq!(summary.like_percentage, 50.0);
    /// ```
    pub fn tally(directions: impl Iterator<Item = VoteDirection>) -> Self {
        let mut likes = 0_u64;
        let mut dislikes = 0_u64;
        for direction in directions {
            match direction {
                VoteDirection::Up => likes += 1,
                VoteDirection::Down => dislikes += 1,
                VoteDirection::Cleared => {}
            }
        }

        let total_votes = likes + dislikes;
        let like_percentage = if total_votes == 0 {
            0.0
        } else {
            (likes as f64 / total_votes as f64) * 100.0
        };

        Self {
            likes,
            dislikes,
            total_votes,
            like_percentage,
        }
    }
}
