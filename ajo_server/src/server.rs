use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use ajo_engine::{
    events::EventProducers,
    GroupApi,
    NotificationApi,
    PayoutApi,
    ReconciliationApi,
    ReportApi,
    SqliteDatabase,
};
use log::*;
use paystack_tools::PaystackApi;

use crate::{
    config::ServerConfig,
    cycle_worker::start_cycle_worker,
    errors::ServerError,
    integrations::notifications::create_notification_event_handlers,
    routes::{
        health,
        CreateGroupRoute,
        CreatePayoutRoute,
        DistributePayoutRoute,
        GroupByIdRoute,
        GroupContributionsRoute,
        GroupHistoryRoute,
        GroupMembersRoute,
        GroupPayoutsRoute,
        GroupReportsRoute,
        JoinGroupRoute,
        ManualContributionRoute,
        MarkNotificationReadRoute,
        MembershipSummaryRoute,
        MyGroupsRoute,
        MyMembershipsRoute,
        MyNotificationsRoute,
        PaymentCallbackPostRoute,
        PaymentCallbackRoute,
        PaystackWebhookRoute,
        RemoveMemberRoute,
        ResolveReportRoute,
        StartContributionRoute,
        SubmitReportRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Database migrations are up to date");
    let gateway = PaystackApi::new(config.paystack.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_notification_event_handlers(NotificationApi::new(db.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    info!("🚀️ Notification hooks are running");
    if let Some(interval) = config.cycle_roll_interval {
        // Detached: the worker lives as long as the runtime does
        let _handle = start_cycle_worker(db.clone(), producers.clone(), interval);
    }
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: PaystackApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let callback_url = config.callback_url.clone();
    let srv = HttpServer::new(move || {
        let payments_api = ReconciliationApi::new(db.clone(), gateway.clone(), producers.clone())
            .with_callback_url(callback_url.clone());
        let groups_api = GroupApi::new(db.clone(), producers.clone());
        let payouts_api = PayoutApi::new(db.clone(), producers.clone());
        let notifications_api = NotificationApi::new(db.clone());
        let reports_api = ReportApi::new(db.clone());
        let api_scope = web::scope("/api")
            .service(CreateGroupRoute::<SqliteDatabase>::new())
            .service(MyGroupsRoute::<SqliteDatabase>::new())
            .service(JoinGroupRoute::<SqliteDatabase>::new())
            .service(GroupByIdRoute::<SqliteDatabase>::new())
            .service(GroupMembersRoute::<SqliteDatabase>::new())
            .service(RemoveMemberRoute::<SqliteDatabase>::new())
            .service(StartContributionRoute::<SqliteDatabase, PaystackApi>::new())
            .service(GroupContributionsRoute::<SqliteDatabase>::new())
            .service(ManualContributionRoute::<SqliteDatabase>::new())
            .service(GroupHistoryRoute::<SqliteDatabase>::new())
            .service(GroupPayoutsRoute::<SqliteDatabase>::new())
            .service(CreatePayoutRoute::<SqliteDatabase>::new())
            .service(DistributePayoutRoute::<SqliteDatabase>::new())
            .service(MyMembershipsRoute::<SqliteDatabase>::new())
            .service(MembershipSummaryRoute::<SqliteDatabase>::new())
            .service(MyNotificationsRoute::<SqliteDatabase>::new())
            .service(MarkNotificationReadRoute::<SqliteDatabase>::new())
            .service(SubmitReportRoute::<SqliteDatabase>::new())
            .service(GroupReportsRoute::<SqliteDatabase>::new())
            .service(ResolveReportRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ajo::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(groups_api))
            .app_data(web::Data::new(payouts_api))
            .app_data(web::Data::new(notifications_api))
            .app_data(web::Data::new(reports_api))
            .service(health)
            .service(PaymentCallbackRoute::<SqliteDatabase, PaystackApi>::new())
            .service(PaymentCallbackPostRoute::<SqliteDatabase, PaystackApi>::new())
            .service(PaystackWebhookRoute::<SqliteDatabase, PaystackApi>::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
