use ajo_engine::{db_types::Membership, GroupApi, GroupApiError, LedgerStore};
use log::debug;

use crate::{auth::UserIdentity, errors::ServerError};

/// Only members of a group (the organizer included) may see its details and ledger.
pub async fn ensure_member<B: LedgerStore>(
    api: &GroupApi<B>,
    group_id: i64,
    user: &UserIdentity,
) -> Result<Membership, ServerError> {
    api.membership_of(group_id, user.user_id()).await.map_err(|e| {
        debug!("💻️ {} may not view group #{group_id}. {e}", user.user_id());
        ServerError::from(e)
    })
}

/// A membership summary is visible to the member and to the organizer of their group.
pub async fn ensure_can_view_membership<B: LedgerStore>(
    api: &GroupApi<B>,
    membership_id: i64,
    user: &UserIdentity,
) -> Result<(), ServerError> {
    let membership = api.membership(membership_id).await?;
    if membership.user_id == user.user_id() {
        return Ok(());
    }
    let group = api.group_for_membership(membership_id).await?;
    if group.organizer_id == user.user_id() {
        Ok(())
    } else {
        debug!("💻️ {} may not view membership #{membership_id}", user.user_id());
        Err(GroupApiError::NotOrganizer.into())
    }
}
