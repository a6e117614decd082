use crate::{
    db_types::{NewReport, Report},
    traits::LedgerError,
};

#[allow(async_fn_in_trait)]
pub trait ReportManagement: Clone {
    async fn insert_report(&self, report: NewReport) -> Result<Report, LedgerError>;

    async fn fetch_report(&self, report_id: i64) -> Result<Option<Report>, LedgerError>;

    /// Unresolved reports first, then newest first.
    async fn fetch_reports_for_group(&self, group_id: i64) -> Result<Vec<Report>, LedgerError>;

    /// Sets `is_resolved` and stamps `resolved_at`. Resolving twice keeps the first timestamp. Returns `None` if the
    /// report does not exist.
    async fn resolve_report(&self, report_id: i64) -> Result<Option<Report>, LedgerError>;
}
