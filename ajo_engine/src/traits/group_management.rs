use crate::{
    db_types::{Contribution, Group, ManualContribution, Membership, NewGroup, UserInfo},
    traits::LedgerError,
};

/// Group and membership bookkeeping.
#[allow(async_fn_in_trait)]
pub trait GroupManagement: Clone {
    /// Inserts the group with the given referral code and, in the same transaction, makes the organizer its first
    /// member.
    ///
    /// A referral code collision yields [`LedgerError::ReferralCodeTaken`] so that the caller can try another code.
    async fn insert_group(
        &self,
        organizer: &UserInfo,
        group: NewGroup,
        referral_code: &str,
    ) -> Result<Group, LedgerError>;

    async fn fetch_group(&self, group_id: i64) -> Result<Option<Group>, LedgerError>;

    async fn fetch_group_by_referral_code(&self, code: &str) -> Result<Option<Group>, LedgerError>;

    async fn fetch_group_for_membership(&self, membership_id: i64) -> Result<Option<Group>, LedgerError>;

    /// Groups whose organizer is `user_id`, newest first.
    async fn fetch_groups_for_organizer(&self, user_id: &str) -> Result<Vec<Group>, LedgerError>;

    /// Adds the user to the group. Joining twice yields [`LedgerError::AlreadyMember`].
    async fn insert_membership(&self, group_id: i64, user: &UserInfo) -> Result<Membership, LedgerError>;

    async fn fetch_membership(&self, membership_id: i64) -> Result<Option<Membership>, LedgerError>;

    async fn fetch_membership_for_user(&self, group_id: i64, user_id: &str) -> Result<Option<Membership>, LedgerError>;

    async fn fetch_memberships_for_user(&self, user_id: &str) -> Result<Vec<Membership>, LedgerError>;

    async fn fetch_members_of_group(&self, group_id: i64) -> Result<Vec<Membership>, LedgerError>;

    /// Deletes the membership, along with its payment intents and contributions. Returns false if there was no such
    /// membership.
    async fn delete_membership(&self, group_id: i64, user_id: &str) -> Result<bool, LedgerError>;

    /// Records an offline payment as a completed contribution and credits the group aggregates.
    async fn record_manual_contribution(&self, contribution: ManualContribution) -> Result<Contribution, LedgerError>;
}
