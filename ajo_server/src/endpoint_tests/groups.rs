use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use ajo_engine::{
    db_types::{Kobo, NewPaymentIntent, PaymentIntent, PaymentStatus},
    events::EventProducers,
    traits::{GatewayError, LedgerError},
    GroupApi,
    PayoutApi,
    ReconciliationApi,
};
use chrono::{NaiveDate, Utc};
use paystack_tools::TransactionAuthorization;
use serde_json::{json, Value};

use super::{
    fixtures::{group, membership, CONTRIBUTION},
    helpers::{as_user, send_request},
    mocks::{ledger, MockGateway, MockLedger},
};
use crate::routes::{
    CreateGroupRoute,
    CreatePayoutRoute,
    GroupByIdRoute,
    JoinGroupRoute,
    MembershipSummaryRoute,
    RemoveMemberRoute,
    StartContributionRoute,
};

/// Registers the group routes under `/api`. Each API gets its own store, since a mock cannot be shared.
fn configure(
    groups: MockLedger,
    payouts: MockLedger,
    payments: MockLedger,
    gateway: MockGateway,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let group_api = GroupApi::new(groups, EventProducers::default());
        let payout_api = PayoutApi::new(payouts, EventProducers::default());
        let payments_api = ReconciliationApi::new(payments, gateway, EventProducers::default());
        cfg.app_data(web::Data::new(group_api))
            .app_data(web::Data::new(payout_api))
            .app_data(web::Data::new(payments_api));
        cfg.service(
            web::scope("/api")
                .service(CreateGroupRoute::<MockLedger>::new())
                .service(JoinGroupRoute::<MockLedger>::new())
                .service(GroupByIdRoute::<MockLedger>::new())
                .service(RemoveMemberRoute::<MockLedger>::new())
                .service(StartContributionRoute::<MockLedger, MockGateway>::new())
                .service(CreatePayoutRoute::<MockLedger>::new())
                .service(MembershipSummaryRoute::<MockLedger>::new()),
        );
    }
}

fn groups_only(groups: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    configure(groups, ledger(), ledger(), MockGateway::new())
}

fn payouts_only(payouts: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    configure(ledger(), payouts, ledger(), MockGateway::new())
}

fn new_group_body() -> Value {
    json!({ "name": "Ikeja traders", "contribution_cycle": "monthly", "contribution_amount": CONTRIBUTION })
}

#[actix_web::test]
async fn create_group_without_identity() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_insert_group().times(0);
    let req = TestRequest::post().uri("/api/groups").set_json(new_group_body());
    let (status, _) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_group() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_insert_group().times(1).returning(|organizer, new_group, code| {
        assert_eq!(new_group.fee_percent, 1.0);
        let mut g = group(1, &organizer.user_id);
        g.referral_code = code.to_string();
        Ok(g)
    });
    let req = as_user(TestRequest::post().uri("/api/groups"), "org").set_json(new_group_body());
    let (status, body) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(created["organizer_id"], "org");
    assert_eq!(created["referral_code"].as_str().unwrap().len(), 6);
}

#[actix_web::test]
async fn create_group_with_silly_fee() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_insert_group().times(0);
    let mut body = new_group_body();
    body["fee_percent"] = json!(120.0);
    let req = as_user(TestRequest::post().uri("/api/groups"), "org").set_json(body);
    let (status, _) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn join_group_twice() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_group_by_referral_code().returning(|code| {
        assert_eq!(code, "K7QX2M");
        Ok(Some(group(1, "org")))
    });
    store
        .expect_insert_membership()
        .returning(|group_id, user| Err(LedgerError::AlreadyMember { user_id: user.user_id.clone(), group_id }));
    let req = as_user(TestRequest::post().uri("/api/groups/join"), "ada").set_json(json!({"referral_code": " k7qx2m "}));
    let (status, body) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already a member"));
}

#[actix_web::test]
async fn join_group_with_unknown_code() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_group_by_referral_code().returning(|_| Ok(None));
    store.expect_insert_membership().times(0);
    let req = as_user(TestRequest::post().uri("/api/groups/join"), "ada").set_json(json!({"referral_code": "ZZZZZZ"}));
    let (status, _) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn group_details_are_for_members_only() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_group().returning(|id| Ok(Some(group(id, "org"))));
    store.expect_fetch_membership_for_user().returning(|group_id, user_id| match user_id {
        "ada" => Ok(Some(membership(2, group_id, "ada"))),
        _ => Ok(None),
    });
    let req = as_user(TestRequest::get().uri("/api/groups/1"), "eve");
    let (status, _) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn group_details_for_a_member() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_group().returning(|id| Ok(Some(group(id, "org"))));
    store.expect_fetch_membership_for_user().returning(|group_id, _| Ok(Some(membership(2, group_id, "ada"))));
    let req = as_user(TestRequest::get().uri("/api/groups/1"), "ada");
    let (status, body) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::OK);
    let details: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(details["name"], "Ikeja traders");
    assert_eq!(details["contribution_amount"], CONTRIBUTION);
}

#[actix_web::test]
async fn only_the_organizer_removes_members() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_group().returning(|id| Ok(Some(group(id, "org"))));
    store.expect_delete_membership().times(0);
    let req = as_user(TestRequest::delete().uri("/api/groups/1/members/bola"), "ada");
    let (status, _) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn organizer_removes_a_member() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_group().returning(|id| Ok(Some(group(id, "org"))));
    store.expect_delete_membership().times(1).returning(|_, user_id| Ok(user_id == "bola"));
    let req = as_user(TestRequest::delete().uri("/api/groups/1/members/bola"), "org");
    let (status, body) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("bola was removed from group #1"));
}

fn payment_store() -> MockLedger {
    let mut store = ledger();
    store.expect_insert_payment_intent().times(1).returning(|new: NewPaymentIntent| {
        assert!(new.reference.starts_with("ajo_"));
        Ok(PaymentIntent {
            id: 11,
            membership_id: new.membership_id,
            amount: new.amount,
            reference: new.reference,
            status: PaymentStatus::Initiated,
            paid_by: new.paid_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    });
    store
}

fn member_store() -> MockLedger {
    let mut store = ledger();
    store.expect_fetch_group().returning(|id| Ok(Some(group(id, "org"))));
    store.expect_fetch_membership_for_user().returning(|group_id, user_id| match user_id {
        "ada" => Ok(Some(membership(2, group_id, "ada"))),
        _ => Ok(None),
    });
    store
}

#[actix_web::test]
async fn member_starts_a_contribution() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_initialize().times(1).returning(|req| {
        assert_eq!(req.email, "ada@example.com");
        assert_eq!(req.amount, Kobo::from(CONTRIBUTION));
        Ok(TransactionAuthorization {
            authorization_url: format!("https://checkout.paystack.com/{}", req.reference),
            access_code: "0peioxfhpn".into(),
            reference: req.reference.clone(),
        })
    });
    let req = as_user(TestRequest::post().uri("/api/groups/1/contributions"), "ada");
    let (status, body) = send_request(req, configure(member_store(), ledger(), payment_store(), gateway)).await;
    assert_eq!(status, StatusCode::OK);
    let started: Value = serde_json::from_str(&body).unwrap();
    let reference = started["reference"].as_str().unwrap();
    assert_eq!(started["authorization_url"], format!("https://checkout.paystack.com/{reference}"));
    assert_eq!(started["amount"], CONTRIBUTION);
}

#[actix_web::test]
async fn contribution_retires_reference_when_gateway_fails() {
    let _ = env_logger::try_init().ok();
    let mut payments = payment_store();
    payments.expect_mark_intent_failed().times(1).returning(|_| Ok(None));
    let mut gateway = MockGateway::new();
    gateway.expect_initialize().returning(|_| Err(GatewayError::Timeout));
    let req = as_user(TestRequest::post().uri("/api/groups/1/contributions"), "ada");
    let (status, _) = send_request(req, configure(member_store(), ledger(), payments, gateway)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn strangers_cannot_contribute() {
    let _ = env_logger::try_init().ok();
    let mut payments = ledger();
    payments.expect_insert_payment_intent().times(0);
    let mut gateway = MockGateway::new();
    gateway.expect_initialize().times(0);
    let req = as_user(TestRequest::post().uri("/api/groups/1/contributions"), "eve");
    let (status, _) = send_request(req, configure(member_store(), ledger(), payments, gateway)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn members_cannot_pay_for_each_other() {
    let _ = env_logger::try_init().ok();
    let mut payments = ledger();
    payments.expect_insert_payment_intent().times(0);
    let req = as_user(TestRequest::post().uri("/api/groups/1/contributions"), "ada").set_json(json!({"member_id": "bola"}));
    let (status, _) = send_request(req, configure(member_store(), ledger(), payments, MockGateway::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn payouts_are_for_the_organizer() {
    let _ = env_logger::try_init().ok();
    let mut store = member_store();
    store.expect_insert_payout().times(0);
    let req = as_user(TestRequest::post().uri("/api/groups/1/payouts"), "ada");
    let (status, body) = send_request(req, payouts_only(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("organizer"));
}

#[actix_web::test]
async fn second_payout_in_a_cycle_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_group().returning(|id| {
        let mut group = group(id, "org");
        group.monthly_total = Kobo::from(CONTRIBUTION);
        group.current_cycle_month = NaiveDate::from_ymd_opt(2024, 10, 1);
        Ok(Some(group))
    });
    store.expect_insert_payout().times(1).returning(|payout| {
        Err(LedgerError::PayoutExists { group_id: payout.group_id, cycle_month: payout.cycle_month })
    });
    let req = as_user(TestRequest::post().uri("/api/groups/1/payouts"), "org");
    let (status, body) = send_request(req, payouts_only(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already been paid out for the 2024-10-01 cycle"));
}

#[actix_web::test]
async fn membership_summary_is_private() {
    let _ = env_logger::try_init().ok();
    let mut store = member_store();
    store.expect_fetch_membership().returning(|id| Ok(Some(membership(id, 1, "ada"))));
    store.expect_fetch_group_for_membership().returning(|_| Ok(Some(group(1, "org"))));
    store.expect_fetch_contributions_for_membership().times(0);
    let req = as_user(TestRequest::get().uri("/api/memberships/2/summary"), "eve");
    let (status, _) = send_request(req, groups_only(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
