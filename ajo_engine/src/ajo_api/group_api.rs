use std::fmt::Debug;

use log::*;

use crate::{
    ajo_api::{
        cycle_api::CycleApi,
        errors::GroupApiError,
        objects::{ContributionRequest, MemberSummary},
    },
    db_types::{
        Contribution,
        ContributionStatus,
        Group,
        HistoryEntry,
        Kobo,
        ManualContribution,
        Membership,
        NewGroup,
        PaidBy,
        PaymentIntent,
        UserInfo,
    },
    events::{ContributionCompletedEvent, EventProducers},
    helpers::{new_referral_code, next_due_date},
    traits::{GroupManagement, LedgerDatabase, LedgerError, LedgerQueries},
};

pub const MAX_REFERRAL_CODE_ATTEMPTS: usize = 10;

/// `GroupApi` manages savings groups, their members and the read-only views of their ledgers.
///
/// Every method that returns a group rolls its cycle first, so the aggregates always refer to the current month.
pub struct GroupApi<B> {
    db: B,
    cycles: CycleApi<B>,
    producers: EventProducers,
    code_generator: fn() -> String,
}

impl<B> Debug for GroupApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GroupApi")
    }
}

impl<B: Clone> GroupApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        let cycles = CycleApi::new(db.clone(), producers.clone());
        Self { db, cycles, producers, code_generator: new_referral_code }
    }

    /// Replaces the referral code generator. Only useful for testing.
    pub fn with_code_generator(mut self, f: fn() -> String) -> Self {
        self.code_generator = f;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> GroupApi<B>
where B: GroupManagement + LedgerDatabase + LedgerQueries
{
    /// Creates a group owned by `organizer`, who also becomes its first member.
    ///
    /// Referral codes are random. On a collision a new code is drawn, up to [`MAX_REFERRAL_CODE_ATTEMPTS`] times.
    pub async fn create_group(&self, organizer: &UserInfo, group: NewGroup) -> Result<Group, GroupApiError> {
        validate_new_group(&group)?;
        for attempt in 1..=MAX_REFERRAL_CODE_ATTEMPTS {
            let code = (self.code_generator)();
            match self.db.insert_group(organizer, group.clone(), &code).await {
                Ok(group) => {
                    info!("💻️ Group #{} '{}' created by {}", group.id, group.name, organizer.user_id);
                    return Ok(group);
                },
                Err(LedgerError::ReferralCodeTaken(code)) => {
                    debug!("💻️ Referral code {code} is taken (attempt {attempt}). Trying another.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        error!("💻️ Gave up looking for a free referral code after {MAX_REFERRAL_CODE_ATTEMPTS} attempts");
        Err(GroupApiError::ReferralCodeExhausted(MAX_REFERRAL_CODE_ATTEMPTS))
    }

    pub async fn join_group(&self, user: &UserInfo, referral_code: &str) -> Result<Membership, GroupApiError> {
        let code = referral_code.trim().to_ascii_uppercase();
        let group = self
            .db
            .fetch_group_by_referral_code(&code)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Group with referral code {code}")))?;
        let membership = self.db.insert_membership(group.id, user).await?;
        info!("💻️ {} joined group #{}", user.user_id, group.id);
        Ok(membership)
    }

    /// Removes a member from the group. Only the organizer may do this, and the organizer cannot remove themselves.
    pub async fn remove_member(&self, organizer_id: &str, group_id: i64, user_id: &str) -> Result<(), GroupApiError> {
        let group = self.fetch_group(group_id).await?;
        ensure_organizer(&group, organizer_id)?;
        if user_id == group.organizer_id {
            return Err(GroupApiError::InvalidInput("The organizer cannot be removed from their own group".into()));
        }
        if !self.db.delete_membership(group_id, user_id).await? {
            return Err(GroupApiError::NotFound(format!("Member {user_id} of group #{group_id}")));
        }
        info!("💻️ {user_id} was removed from group #{group_id} by the organizer");
        Ok(())
    }

    /// Fetches the group, after rolling its cycle if the month has changed.
    pub async fn group(&self, group_id: i64) -> Result<Group, GroupApiError> {
        self.cycles.roll_group(group_id).await?;
        self.fetch_group(group_id).await
    }

    pub async fn group_for_membership(&self, membership_id: i64) -> Result<Group, GroupApiError> {
        let group = self
            .db
            .fetch_group_for_membership(membership_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Membership #{membership_id}")))?;
        self.group(group.id).await
    }

    pub async fn groups_for_organizer(&self, user_id: &str) -> Result<Vec<Group>, GroupApiError> {
        let groups = self.db.fetch_groups_for_organizer(user_id).await?;
        let mut result = Vec::with_capacity(groups.len());
        for group in groups {
            result.push(self.group(group.id).await?);
        }
        Ok(result)
    }

    pub async fn memberships_for_user(&self, user_id: &str) -> Result<Vec<Membership>, GroupApiError> {
        Ok(self.db.fetch_memberships_for_user(user_id).await?)
    }

    pub async fn members(&self, group_id: i64) -> Result<Vec<Membership>, GroupApiError> {
        self.fetch_group(group_id).await?;
        Ok(self.db.fetch_members_of_group(group_id).await?)
    }

    /// The caller's membership of the group. Callers who are not members get [`GroupApiError::NotMember`].
    pub async fn membership_of(&self, group_id: i64, user_id: &str) -> Result<Membership, GroupApiError> {
        self.fetch_group(group_id).await?;
        self.db.fetch_membership_for_user(group_id, user_id).await?.ok_or(GroupApiError::NotMember(group_id))
    }

    pub async fn membership(&self, membership_id: i64) -> Result<Membership, GroupApiError> {
        self.db
            .fetch_membership(membership_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Membership #{membership_id}")))
    }

    pub async fn contributions_for_group(&self, group_id: i64) -> Result<Vec<Contribution>, GroupApiError> {
        Ok(self.db.fetch_contributions_for_group(group_id).await?)
    }

    pub async fn contributions_for_membership(&self, membership_id: i64) -> Result<Vec<Contribution>, GroupApiError> {
        Ok(self.db.fetch_contributions_for_membership(membership_id).await?)
    }

    pub async fn history(&self, group_id: i64) -> Result<Vec<HistoryEntry>, GroupApiError> {
        self.cycles.roll_group(group_id).await?;
        Ok(self.db.fetch_history_for_group(group_id).await?)
    }

    pub async fn payment_intents(&self, membership_id: i64) -> Result<Vec<PaymentIntent>, GroupApiError> {
        Ok(self.db.fetch_payment_intents_for_membership(membership_id).await?)
    }

    /// Dashboard figures for a single membership.
    pub async fn member_summary(&self, membership_id: i64) -> Result<MemberSummary, GroupApiError> {
        let membership = self.membership(membership_id).await?;
        let group = self.group(membership.group_id).await?;
        let contributions = self.db.fetch_contributions_for_membership(membership_id).await?;
        let completed =
            contributions.into_iter().filter(|c| c.status == ContributionStatus::Completed).collect::<Vec<_>>();
        let total_contributed = completed.iter().map(|c| c.amount).sum::<Kobo>();
        #[allow(clippy::cast_possible_wrap)]
        let completed_contributions = completed.len() as i64;
        let next_due = next_due_date(membership.joined_at, group.contribution_cycle, completed_contributions);
        let last_contribution = completed.into_iter().next();
        Ok(MemberSummary { membership, total_contributed, completed_contributions, last_contribution, next_due })
    }

    /// Works out who is paying for whom when `requester` starts a contribution in the group.
    ///
    /// Members pay for themselves. The organizer may also pay on behalf of another member by naming them.
    pub async fn contribution_target(
        &self,
        requester: &UserInfo,
        group_id: i64,
        member_user_id: Option<&str>,
    ) -> Result<ContributionRequest, GroupApiError> {
        let group = self.group(group_id).await?;
        let (membership, paid_by) = match member_user_id {
            Some(member) if member != requester.user_id => {
                ensure_organizer(&group, &requester.user_id)?;
                let membership = self
                    .db
                    .fetch_membership_for_user(group_id, member)
                    .await?
                    .ok_or_else(|| GroupApiError::NotFound(format!("Member {member} of group #{group_id}")))?;
                (membership, PaidBy::Organizer)
            },
            _ => {
                let membership = self
                    .db
                    .fetch_membership_for_user(group_id, &requester.user_id)
                    .await?
                    .ok_or(GroupApiError::NotMember(group_id))?;
                (membership, PaidBy::Member)
            },
        };
        Ok(ContributionRequest {
            membership_id: membership.id,
            email: requester.email.clone(),
            amount: group.contribution_amount,
            paid_by,
        })
    }

    /// Records a payment the organizer received outside the gateway.
    pub async fn record_manual_contribution(
        &self,
        organizer_id: &str,
        group_id: i64,
        member_user_id: &str,
        amount: Kobo,
        note: Option<String>,
    ) -> Result<Contribution, GroupApiError> {
        if !amount.is_positive() {
            return Err(GroupApiError::InvalidInput("Contribution amount must be positive".into()));
        }
        let group = self.fetch_group(group_id).await?;
        ensure_organizer(&group, organizer_id)?;
        let membership = self
            .db
            .fetch_membership_for_user(group_id, member_user_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Member {member_user_id} of group #{group_id}")))?;
        self.cycles.roll_group(group_id).await?;
        let contribution = ManualContribution { membership_id: membership.id, amount, note };
        let contribution = self.db.record_manual_contribution(contribution).await?;
        info!("💻️ Manual contribution of {amount} recorded for {member_user_id} in group #{group_id}");
        let event = ContributionCompletedEvent::new(group_id, contribution.clone());
        self.producers.publish_contribution_completed(event).await;
        Ok(contribution)
    }

    async fn fetch_group(&self, group_id: i64) -> Result<Group, GroupApiError> {
        self.db.fetch_group(group_id).await?.ok_or_else(|| GroupApiError::NotFound(format!("Group #{group_id}")))
    }
}

pub(crate) fn ensure_organizer(group: &Group, user_id: &str) -> Result<(), GroupApiError> {
    if group.organizer_id == user_id {
        Ok(())
    } else {
        Err(GroupApiError::NotOrganizer)
    }
}

fn validate_new_group(group: &NewGroup) -> Result<(), GroupApiError> {
    if group.name.trim().is_empty() {
        return Err(GroupApiError::InvalidInput("Group name cannot be empty".into()));
    }
    if !group.contribution_amount.is_positive() {
        return Err(GroupApiError::InvalidInput("Contribution amount must be positive".into()));
    }
    if !(0.0..=100.0).contains(&group.fee_percent) {
        return Err(GroupApiError::InvalidInput(format!(
            "Fee percentage must be between 0 and 100, not {}",
            group.fee_percent
        )));
    }
    Ok(())
}
