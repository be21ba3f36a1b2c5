//! The follow graph: mirrored membership lists and derived counts.
//!
//! The relationship between two users is stored twice, once from each side:
//! `v` appears in `u`'s following list exactly when `u` appears in `v`'s
//! followers list. Each list is keyed uniquely by its owning user and has set
//! semantics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::UserId;

/// One side of the mirrored follow relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowList {
    /// The user this list belongs to.
    pub owner: UserId,
    /// Member user ids; no duplicates.
    pub members: Vec<UserId>,
}

impl FollowList {
    /// An empty list for a user with no edges yet.
    pub fn empty(owner: UserId) -> Self {
        Self {
            owner,
            members: Vec::new(),
        }
    }

    /// Whether the given user appears in this list.
    pub fn contains(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Number of members.
    pub fn len(&self) -> u64 {
        self.members.len() as u64
    }

    /// Whether the list has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Derived follow counts carried on a user record.
///
/// A cache, recomputed from the mirror lists after every follow mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct FollowStats {
    /// Size of the user's following list.
    pub following: u64,
    /// Size of the user's followers list.
    pub followers: u64,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_list_reports_zero_members() {
        let list = FollowList::empty(UserId::random());
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[rstest]
    fn membership_checks_work() {
        let member = UserId::random();
        let list = FollowList {
            owner: UserId::random(),
            members: vec![member],
        };
        assert!(list.contains(&member));
        assert!(!list.contains(&UserId::random()));
        assert_eq!(list.len(), 1);
    }
}
