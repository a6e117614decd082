//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the database or the payment gateway, so
//! they must stay `async` all the way down.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use ajo_engine::{
    db_types::NewGroup,
    traits::{LedgerDatabase, LedgerStore, PaymentGateway, TransitionOutcome},
    CallbackOutcome,
    GroupApi,
    NotificationApi,
    PayoutApi,
    ReconciliationApi,
    ReconciliationError,
    ReportApi,
    WebhookOutcome,
};
use log::*;
use paystack_tools::PAYSTACK_SIGNATURE_HEADER;

use crate::{
    auth::UserIdentity,
    data_objects::{
        CallbackParams,
        ContributionParams,
        JoinGroupParams,
        JsonResponse,
        ManualContributionParams,
        PaymentStartedResponse,
        PayoutParams,
        ReportParams,
    },
    errors::ServerError,
    helpers::{ensure_can_view_membership, ensure_member},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Callback  ----------------------------------------------------
route!(payment_callback => Get "/payment/callback" impl LedgerDatabase, PaymentGateway);
route!(payment_callback_post => Post "/payment/callback" impl LedgerDatabase, PaymentGateway);

/// The contributor's browser lands here after checkout. The payment is verified with the gateway synchronously.
///
/// * `200` with `success: true` if the payment was applied, now or earlier.
/// * `200` with `success: false` if the gateway declined the payment.
/// * `202` if the gateway has not settled the payment yet.
/// * `400` if no reference was supplied, `404` if the reference is unknown, `409` if the amount paid does not match,
///   and `502` if the gateway could not be reached.
pub async fn payment_callback<B, G>(
    params: web::Query<CallbackParams>,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    let reference = params
        .reference()
        .ok_or_else(|| ServerError::InvalidRequestBody("No payment reference was supplied".into()))?;
    debug!("💻️ Payment callback for {reference}");
    let response = match api.verify_callback(reference).await? {
        CallbackOutcome::Paid(TransitionOutcome::Applied(contribution)) => {
            HttpResponse::Ok().json(JsonResponse::success(format!("Payment of {} received", contribution.amount)))
        },
        CallbackOutcome::Paid(_) => HttpResponse::Ok().json(JsonResponse::success("Payment has already been processed")),
        CallbackOutcome::Declined(status) => {
            HttpResponse::Ok().json(JsonResponse::failure(format!("Payment was not successful ({status})")))
        },
        CallbackOutcome::Pending(status) => {
            HttpResponse::Accepted().json(JsonResponse::failure(format!("Payment is still {status}. Try again shortly.")))
        },
    };
    Ok(response)
}

pub async fn payment_callback_post<B, G>(
    params: web::Query<CallbackParams>,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    payment_callback(params, api).await
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(paystack_webhook => Post "/webhook/paystack" impl LedgerDatabase, PaymentGateway);

/// Paystack pushes signed events here. The body is taken as raw bytes, since the signature covers them exactly.
///
/// Every authentic event is acknowledged with `200`, even when there was nothing to do, so that Paystack stops
/// retrying. Only storage failures return `500`.
pub async fn paystack_webhook<B, G>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    trace!("💻️ Received webhook request ({} bytes)", body.len());
    let signature = req.headers().get(PAYSTACK_SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let message = match api.process_webhook(&body, signature).await {
        Ok(WebhookOutcome::Processed(TransitionOutcome::Applied(c))) => {
            JsonResponse::success(format!("Contribution #{} recorded", c.id))
        },
        Ok(WebhookOutcome::Processed(TransitionOutcome::AlreadyProcessed)) => {
            JsonResponse::success("Payment has already been processed")
        },
        Ok(WebhookOutcome::Processed(TransitionOutcome::UnknownReference)) => {
            JsonResponse::failure("Unknown payment reference")
        },
        Ok(WebhookOutcome::Processed(TransitionOutcome::AmountMismatch { .. })) => {
            JsonResponse::failure("Payment amount does not match")
        },
        Ok(WebhookOutcome::Ignored(event)) => JsonResponse::success(format!("{event} events are ignored")),
        Err(e @ ReconciliationError::AmountMismatch { .. }) => {
            warn!("💻️ Acknowledging webhook without applying it. {e}");
            JsonResponse::failure(e)
        },
        Err(e) => return Err(e.into()),
    };
    Ok(HttpResponse::Ok().json(message))
}

//----------------------------------------------   Groups  ----------------------------------------------------
route!(create_group => Post "/groups" impl LedgerStore);
pub async fn create_group<B: LedgerStore>(
    user: UserIdentity,
    body: web::Json<NewGroup>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ {} is creating group '{}'", user.user_id(), body.name);
    let group = api.create_group(user.info(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(group))
}

route!(my_groups => Get "/groups" impl LedgerStore);
pub async fn my_groups<B: LedgerStore>(
    user: UserIdentity,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let groups = api.groups_for_organizer(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(groups))
}

route!(join_group => Post "/groups/join" impl LedgerStore);
pub async fn join_group<B: LedgerStore>(
    user: UserIdentity,
    body: web::Json<JoinGroupParams>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let membership = api.join_group(user.info(), &body.referral_code).await?;
    Ok(HttpResponse::Created().json(membership))
}

route!(group_by_id => Get "/groups/{group_id}" impl LedgerStore);
pub async fn group_by_id<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    ensure_member(&api, group_id, &user).await?;
    let group = api.group(group_id).await?;
    Ok(HttpResponse::Ok().json(group))
}

route!(group_members => Get "/groups/{group_id}/members" impl LedgerStore);
pub async fn group_members<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    ensure_member(&api, group_id, &user).await?;
    let members = api.members(group_id).await?;
    Ok(HttpResponse::Ok().json(members))
}

route!(remove_member => Delete "/groups/{group_id}/members/{user_id}" impl LedgerStore);
pub async fn remove_member<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<(i64, String)>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (group_id, member_id) = path.into_inner();
    api.remove_member(user.user_id(), group_id, &member_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("{member_id} was removed from group #{group_id}"))))
}

route!(my_memberships => Get "/memberships" impl LedgerStore);
pub async fn my_memberships<B: LedgerStore>(
    user: UserIdentity,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let memberships = api.memberships_for_user(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(memberships))
}

route!(membership_summary => Get "/memberships/{membership_id}/summary" impl LedgerStore);
pub async fn membership_summary<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let membership_id = path.into_inner();
    ensure_can_view_membership(&api, membership_id, &user).await?;
    let summary = api.member_summary(membership_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

//----------------------------------------------   Contributions  ----------------------------------------------------
route!(start_contribution => Post "/groups/{group_id}/contributions" impl LedgerStore, PaymentGateway);
/// Starts a gateway payment of the group's contribution amount. Returns the checkout URL to send the payer to.
pub async fn start_contribution<B, G>(
    user: UserIdentity,
    path: web::Path<i64>,
    body: Option<web::Json<ContributionParams>>,
    groups: web::Data<GroupApi<B>>,
    payments: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerStore,
    G: PaymentGateway,
{
    let group_id = path.into_inner();
    let params = body.map(|b| b.into_inner()).unwrap_or_default();
    let request = groups.contribution_target(user.info(), group_id, params.member_id.as_deref()).await?;
    let started = payments.start_contribution(request).await?;
    info!("💻️ {} started payment {} in group #{group_id}", user.user_id(), started.intent.reference);
    Ok(HttpResponse::Ok().json(PaymentStartedResponse::from(started)))
}

route!(group_contributions => Get "/groups/{group_id}/contributions" impl LedgerStore);
pub async fn group_contributions<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    ensure_member(&api, group_id, &user).await?;
    let contributions = api.contributions_for_group(group_id).await?;
    Ok(HttpResponse::Ok().json(contributions))
}

route!(manual_contribution => Post "/groups/{group_id}/contributions/manual" impl LedgerStore);
pub async fn manual_contribution<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    body: web::Json<ManualContributionParams>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    let ManualContributionParams { member_id, amount, note } = body.into_inner();
    let contribution = api.record_manual_contribution(user.user_id(), group_id, &member_id, amount, note).await?;
    Ok(HttpResponse::Created().json(contribution))
}

route!(group_history => Get "/groups/{group_id}/history" impl LedgerStore);
pub async fn group_history<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<GroupApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    ensure_member(&api, group_id, &user).await?;
    let history = api.history(group_id).await?;
    Ok(HttpResponse::Ok().json(history))
}

//----------------------------------------------   Payouts  ----------------------------------------------------
route!(group_payouts => Get "/groups/{group_id}/payouts" impl LedgerStore);
pub async fn group_payouts<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    groups: web::Data<GroupApi<B>>,
    payouts: web::Data<PayoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    ensure_member(&groups, group_id, &user).await?;
    let result = payouts.payouts_for_group(group_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(create_payout => Post "/groups/{group_id}/payouts" impl LedgerStore);
pub async fn create_payout<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    body: Option<web::Json<PayoutParams>>,
    api: web::Data<PayoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    let params = body.map(|b| b.into_inner()).unwrap_or_default();
    let payout = api.create_payout(user.user_id(), group_id, params.recipient_id).await?;
    Ok(HttpResponse::Created().json(payout))
}

route!(distribute_payout => Post "/payouts/{payout_id}/distribute" impl LedgerStore);
pub async fn distribute_payout<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<PayoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let payout = api.mark_distributed(user.user_id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payout))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(my_notifications => Get "/notifications" impl LedgerStore);
pub async fn my_notifications<B: LedgerStore>(
    user: UserIdentity,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let notifications = api.notifications_for_user(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

route!(mark_notification_read => Post "/notifications/{notification_id}/read" impl LedgerStore);
pub async fn mark_notification_read<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let notification = api.mark_read(user.user_id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notification))
}

//----------------------------------------------   Reports  ----------------------------------------------------
route!(submit_report => Post "/groups/{group_id}/reports" impl LedgerStore);
/// A member raises a problem with the group's organizer. The organizer finds it in their inbox.
pub async fn submit_report<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    body: web::Json<ReportParams>,
    api: web::Data<ReportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    let report = api.submit_report(user.user_id(), group_id, &body.subject, &body.message).await?;
    Ok(HttpResponse::Created().json(report))
}

route!(group_reports => Get "/groups/{group_id}/reports" impl LedgerStore);
pub async fn group_reports<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<ReportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let reports = api.reports_for_group(user.user_id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reports))
}

route!(resolve_report => Post "/reports/{report_id}/resolve" impl LedgerStore);
pub async fn resolve_report<B: LedgerStore>(
    user: UserIdentity,
    path: web::Path<i64>,
    api: web::Data<ReportApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let report = api.resolve_report(user.user_id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}
