use std::fmt::Debug;

use log::*;

use crate::{
    ajo_api::{errors::GroupApiError, group_api::ensure_organizer},
    db_types::{Group, NewNotification, NewReport, Report},
    traits::{GroupManagement, NotificationManagement, ReportManagement},
};

pub const MAX_REPORT_SUBJECT_LENGTH: usize = 120;

/// `ReportApi` lets members raise problems with their organizer, and lets the organizer work through them.
///
/// The organizer hears about a new report through their inbox, and the reporter hears when it is resolved.
pub struct ReportApi<B> {
    db: B,
}

impl<B> Debug for ReportApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReportApi")
    }
}

impl<B> ReportApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ReportApi<B>
where B: ReportManagement + GroupManagement + NotificationManagement
{
    pub async fn submit_report(
        &self,
        reporter_id: &str,
        group_id: i64,
        subject: &str,
        message: &str,
    ) -> Result<Report, GroupApiError> {
        let subject = subject.trim();
        let message = message.trim();
        if subject.is_empty() || message.is_empty() {
            return Err(GroupApiError::InvalidInput("A report needs a subject and a message".into()));
        }
        if subject.chars().count() > MAX_REPORT_SUBJECT_LENGTH {
            return Err(GroupApiError::InvalidInput(format!(
                "The subject may be at most {MAX_REPORT_SUBJECT_LENGTH} characters long"
            )));
        }
        let group = self.fetch_group(group_id).await?;
        if group.organizer_id == reporter_id {
            return Err(GroupApiError::InvalidInput("Organizers cannot send reports to themselves".into()));
        }
        if self.db.fetch_membership_for_user(group_id, reporter_id).await?.is_none() {
            return Err(GroupApiError::NotMember(group_id));
        }
        let new_report = NewReport {
            group_id,
            reporter_id: reporter_id.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        };
        let report = self.db.insert_report(new_report).await?;
        info!("💻️ {reporter_id} sent report #{} to the organizer of group #{group_id}", report.id);
        let note = format!("{reporter_id} sent a report about {}: {subject}", group.name);
        self.notify(NewNotification::new(&group.organizer_id, group_id, note), report.id).await;
        Ok(report)
    }

    pub async fn reports_for_group(&self, organizer_id: &str, group_id: i64) -> Result<Vec<Report>, GroupApiError> {
        let group = self.fetch_group(group_id).await?;
        ensure_organizer(&group, organizer_id)?;
        Ok(self.db.fetch_reports_for_group(group_id).await?)
    }

    /// Marks the report as resolved. Resolving a report twice is allowed, but only the first time tells the reporter.
    pub async fn resolve_report(&self, organizer_id: &str, report_id: i64) -> Result<Report, GroupApiError> {
        let report = self.fetch_report(report_id).await?;
        let group = self.fetch_group(report.group_id).await?;
        ensure_organizer(&group, organizer_id)?;
        let resolved = self
            .db
            .resolve_report(report_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Report #{report_id}")))?;
        if !report.is_resolved {
            info!("💻️ Report #{report_id} in group #{} resolved", group.id);
            let note = format!("Your report \"{}\" to {} has been resolved.", report.subject, group.name);
            self.notify(NewNotification::new(&report.reporter_id, group.id, note), report_id).await;
        }
        Ok(resolved)
    }

    /// The report is already stored by the time this runs, so a failure here is only logged.
    async fn notify(&self, notification: NewNotification, report_id: i64) {
        if let Err(e) = self.db.insert_notifications(vec![notification]).await {
            warn!("💻️ Could not send the notification for report #{report_id}. {e}");
        }
    }

    async fn fetch_report(&self, report_id: i64) -> Result<Report, GroupApiError> {
        self.db.fetch_report(report_id).await?.ok_or_else(|| GroupApiError::NotFound(format!("Report #{report_id}")))
    }

    async fn fetch_group(&self, group_id: i64) -> Result<Group, GroupApiError> {
        self.db.fetch_group(group_id).await?.ok_or_else(|| GroupApiError::NotFound(format!("Group #{group_id}")))
    }
}
