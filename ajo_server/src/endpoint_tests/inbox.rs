use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use ajo_engine::{NotificationApi, ReportApi};
use chrono::Utc;
use serde_json::{json, Value};

use super::{
    fixtures::{group, membership, notification, report},
    helpers::{as_user, send_request},
    mocks::{ledger, MockLedger},
};
use crate::routes::{
    GroupReportsRoute,
    MarkNotificationReadRoute,
    MyNotificationsRoute,
    ResolveReportRoute,
    SubmitReportRoute,
};

fn configure(notifications: MockLedger, reports: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(NotificationApi::new(notifications)))
            .app_data(web::Data::new(ReportApi::new(reports)));
        cfg.service(
            web::scope("/api")
                .service(MyNotificationsRoute::<MockLedger>::new())
                .service(MarkNotificationReadRoute::<MockLedger>::new())
                .service(SubmitReportRoute::<MockLedger>::new())
                .service(GroupReportsRoute::<MockLedger>::new())
                .service(ResolveReportRoute::<MockLedger>::new()),
        );
    }
}

fn notifications_only(store: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    configure(store, ledger())
}

fn reports_only(store: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    configure(ledger(), store)
}

/// Group #1 is run by `org`, and `ada` is its only other member.
fn group_store() -> MockLedger {
    let mut store = ledger();
    store.expect_fetch_group().returning(|id| Ok(Some(group(id, "org"))));
    store.expect_fetch_membership_for_user().returning(|group_id, user_id| match user_id {
        "ada" => Ok(Some(membership(2, group_id, "ada"))),
        "org" => Ok(Some(membership(1, group_id, "org"))),
        _ => Ok(None),
    });
    store
}

#[actix_web::test]
async fn inbox_needs_an_identity() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_notifications_for_user().times(0);
    let req = TestRequest::get().uri("/api/notifications");
    let (status, _) = send_request(req, notifications_only(store)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn users_see_their_own_inbox() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_fetch_notifications_for_user().times(1).returning(|user_id| {
        assert_eq!(user_id, "org");
        Ok(vec![notification(4, user_id), notification(3, user_id)])
    });
    let req = as_user(TestRequest::get().uri("/api/notifications"), "org");
    let (status, body) = send_request(req, notifications_only(store)).await;
    assert_eq!(status, StatusCode::OK);
    let inbox: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(inbox.as_array().map(Vec::len), Some(2));
    assert_eq!(inbox[0]["id"], 4);
    assert_eq!(inbox[0]["is_read"], false);
}

#[actix_web::test]
async fn mark_notification_as_read() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    // The store only matches notifications that belong to the caller
    store.expect_mark_notification_read().times(1).returning(|_, _| Ok(None));
    let req = as_user(TestRequest::post().uri("/api/notifications/4/read"), "ada");
    let (status, _) = send_request(req, notifications_only(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut store = ledger();
    store.expect_mark_notification_read().times(1).returning(|id, user_id| {
        let mut n = notification(id, user_id);
        n.is_read = true;
        Ok(Some(n))
    });
    let req = as_user(TestRequest::post().uri("/api/notifications/4/read"), "org");
    let (status, body) = send_request(req, notifications_only(store)).await;
    assert_eq!(status, StatusCode::OK);
    let n: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(n["is_read"], true);
}

#[actix_web::test]
async fn member_submits_a_report() {
    let _ = env_logger::try_init().ok();
    let mut store = group_store();
    store.expect_insert_report().times(1).returning(|new_report| {
        let mut saved = report(9, new_report.group_id, &new_report.reporter_id);
        saved.subject = new_report.subject;
        saved.message = new_report.message;
        Ok(saved)
    });
    store
        .expect_insert_notifications()
        .withf(|notes| notes.len() == 1 && notes[0].user_id == "org" && notes[0].message.contains("Wrong total"))
        .times(1)
        .returning(|notes| Ok(notes.len() as u64));
    let body = json!({ "subject": "Wrong total", "message": "October total is short by ₦5,000" });
    let req = as_user(TestRequest::post().uri("/api/groups/1/reports"), "ada").set_json(body);
    let (status, body) = send_request(req, reports_only(store)).await;
    assert_eq!(status, StatusCode::CREATED);
    let saved: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(saved["reporter_id"], "ada");
    assert_eq!(saved["subject"], "Wrong total");
    assert_eq!(saved["is_resolved"], false);
}

#[actix_web::test]
async fn strangers_cannot_report() {
    let _ = env_logger::try_init().ok();
    let mut store = group_store();
    store.expect_insert_report().times(0);
    let body = json!({ "subject": "Hi", "message": "Let me in" });
    let req = as_user(TestRequest::post().uri("/api/groups/1/reports"), "eve").set_json(body);
    let (status, _) = send_request(req, reports_only(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn blank_reports_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut store = ledger();
    store.expect_insert_report().times(0);
    let body = json!({ "subject": "Late payout", "message": "   " });
    let req = as_user(TestRequest::post().uri("/api/groups/1/reports"), "ada").set_json(body);
    let (status, _) = send_request(req, reports_only(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn only_the_organizer_reads_reports() {
    let _ = env_logger::try_init().ok();
    let mut store = group_store();
    store.expect_fetch_reports_for_group().times(0);
    let req = as_user(TestRequest::get().uri("/api/groups/1/reports"), "ada");
    let (status, _) = send_request(req, reports_only(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut store = group_store();
    store.expect_fetch_reports_for_group().times(1).returning(|group_id| Ok(vec![report(9, group_id, "ada")]));
    let req = as_user(TestRequest::get().uri("/api/groups/1/reports"), "org");
    let (status, body) = send_request(req, reports_only(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Late payout"));
}

#[actix_web::test]
async fn organizer_resolves_a_report() {
    let _ = env_logger::try_init().ok();
    let mut store = group_store();
    store.expect_fetch_report().returning(|id| Ok(Some(report(id, 1, "ada"))));
    store.expect_resolve_report().times(1).returning(|id| {
        let mut resolved = report(id, 1, "ada");
        resolved.is_resolved = true;
        resolved.resolved_at = Some(Utc::now());
        Ok(Some(resolved))
    });
    store
        .expect_insert_notifications()
        .withf(|notes| notes.len() == 1 && notes[0].user_id == "ada")
        .times(1)
        .returning(|_| Ok(1));
    let req = as_user(TestRequest::post().uri("/api/reports/9/resolve"), "org");
    let (status, body) = send_request(req, reports_only(store)).await;
    assert_eq!(status, StatusCode::OK);
    let resolved: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(resolved["is_resolved"], true);
    assert!(resolved["resolved_at"].is_string());
}

#[actix_web::test]
async fn members_cannot_resolve_reports() {
    let _ = env_logger::try_init().ok();
    let mut store = group_store();
    store.expect_fetch_report().returning(|id| Ok(Some(report(id, 1, "ada"))));
    store.expect_resolve_report().times(0);
    let req = as_user(TestRequest::post().uri("/api/reports/9/resolve"), "ada");
    let (status, _) = send_request(req, reports_only(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
