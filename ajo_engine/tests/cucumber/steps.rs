use std::time::Duration;

use ajo_engine::{
    db_types::{HistoryStatus, Kobo, PaymentStatus},
    LedgerDatabase,
    LedgerQueries,
};
use chrono::NaiveDate;
use cucumber::{then, when};
use paystack_tools::TransactionStatus;

use crate::cucumber::{setups::user, AjoWorld};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Dates must be formatted as YYYY-MM-DD")
}

#[when(expr = "'{word}' starts a contribution to group '{word}'")]
async fn start_contribution(world: &mut AjoWorld, member: String, name: String) {
    let group_id = world.group(&name).id;
    let sys = world.system();
    let request = sys.groups.contribution_target(&user(&member), group_id, None).await.expect("Error preparing payment");
    let started = sys.reconciliation.start_contribution(request).await.expect("Error starting payment");
    world.last_reference = Some(started.intent.reference);
}

#[when(expr = "'{word}' pays for '{word}' in group '{word}'")]
async fn pay_on_behalf(world: &mut AjoWorld, payer: String, member: String, name: String) {
    let group_id = world.group(&name).id;
    let sys = world.system();
    let request =
        sys.groups.contribution_target(&user(&payer), group_id, Some(&member)).await.expect("Error preparing payment");
    let started = sys.reconciliation.start_contribution(request).await.expect("Error starting payment");
    world.last_reference = Some(started.intent.reference);
}

#[when("the gateway settles the last payment")]
async fn settle_payment(world: &mut AjoWorld) {
    let reference = world.last_reference();
    world.system().gateway.succeed(&reference);
}

#[when(expr = "the gateway settles the last payment for {int} naira")]
async fn settle_payment_for(world: &mut AjoWorld, naira: i64) {
    let reference = world.last_reference();
    world.system().gateway.settle(&reference, TransactionStatus::Success, Kobo::from_naira(naira));
}

#[when("the gateway declines the last payment")]
async fn decline_payment(world: &mut AjoWorld) {
    let reference = world.last_reference();
    let amount = world.system().gateway.initialized_amount(&reference).expect("Payment was never initialized");
    world.system().gateway.settle(&reference, TransactionStatus::Failed, amount);
}

#[when("the contributor returns from checkout")]
async fn callback(world: &mut AjoWorld) {
    let reference = world.last_reference();
    let result = world.system().reconciliation.verify_callback(&reference).await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "the gateway sends a charge.success webhook for the last payment")]
async fn webhook(world: &mut AjoWorld) {
    let reference = world.last_reference();
    let sys = world.system();
    let amount = sys.gateway.initialized_amount(&reference).expect("Payment was never initialized");
    let (body, signature) = sys.gateway.signed_charge_success(&reference, amount);
    let result = sys.reconciliation.process_webhook(&body, Some(&signature)).await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "someone sends a forged webhook for the last payment")]
async fn forged_webhook(world: &mut AjoWorld) {
    let reference = world.last_reference();
    let sys = world.system();
    let amount = sys.gateway.initialized_amount(&reference).expect("Payment was never initialized");
    let (body, _) = sys.gateway.signed_charge_success(&reference, amount);
    let forged = ajo_engine::test_utils::mock_gateway::MockGateway::new("sk_test_not_the_secret").sign(&body);
    let result = sys.reconciliation.process_webhook(&body, Some(&forged)).await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "'{word}' records a cash contribution of {int} naira from '{word}' in group '{word}'")]
async fn manual_contribution(world: &mut AjoWorld, organizer: String, naira: i64, member: String, name: String) {
    let group_id = world.group(&name).id;
    let result = world
        .system()
        .groups
        .record_manual_contribution(&organizer, group_id, &member, Kobo::from_naira(naira), None)
        .await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "group '{word}' rolls over on {word}")]
async fn roll_over(world: &mut AjoWorld, name: String, day: String) {
    let group_id = world.group(&name).id;
    world.system().cycles.roll_group_at(group_id, date(&day)).await.expect("Error rolling cycle");
}

#[when(expr = "'{word}' pays out group '{word}' to '{word}'")]
async fn pay_out(world: &mut AjoWorld, organizer: String, name: String, recipient: String) {
    let group_id = world.group(&name).id;
    let result = world.system().payouts.create_payout(&organizer, group_id, Some(recipient)).await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "'{word}' removes '{word}' from group '{word}'")]
async fn remove_member(world: &mut AjoWorld, organizer: String, member: String, name: String) {
    let group_id = world.group(&name).id;
    let result = world.system().groups.remove_member(&organizer, group_id, &member).await;
    world.last_error = result.err().map(|e| e.to_string());
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut AjoWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[then(expr = "group '{word}' has a monthly total of {int} naira")]
async fn check_monthly_total(world: &mut AjoWorld, name: String, naira: i64) {
    let group_id = world.group(&name).id;
    let group = world.system().groups.group(group_id).await.expect("Error fetching group");
    assert_eq!(group.monthly_total, Kobo::from_naira(naira), "Monthly total is incorrect");
}

#[then(expr = "group '{word}' has {int} unpaid member(s)")]
async fn check_unpaid(world: &mut AjoWorld, name: String, count: i64) {
    let group_id = world.group(&name).id;
    let group = world.system().groups.group(group_id).await.expect("Error fetching group");
    assert_eq!(group.unpaid_count, count, "Unpaid count is incorrect");
}

#[then(expr = "group '{word}' has {int} contribution(s)")]
async fn check_contribution_count(world: &mut AjoWorld, name: String, count: usize) {
    let group_id = world.group(&name).id;
    let contributions = world.system().reconciliation.db().fetch_contributions_for_group(group_id).await.unwrap();
    assert_eq!(contributions.len(), count, "Wrong number of contributions");
}

#[then(expr = "'{word}' has contributed {int} naira to group '{word}'")]
async fn check_member_total(world: &mut AjoWorld, member: String, naira: i64, name: String) {
    let group_id = world.group(&name).id;
    let sys = world.system();
    let membership = sys.groups.membership_of(group_id, &member).await.expect("Not a member");
    let summary = sys.groups.member_summary(membership.id).await.expect("Error fetching summary");
    assert_eq!(summary.total_contributed, Kobo::from_naira(naira), "Member total is incorrect");
}

#[then(expr = "the last payment is {word}")]
async fn check_intent_status(world: &mut AjoWorld, status: String) {
    let reference = world.last_reference();
    let intent = world.system().reconciliation.db().fetch_payment_intent(&reference).await.unwrap().unwrap();
    let expected = match status.as_str() {
        "initiated" => PaymentStatus::Initiated,
        "success" => PaymentStatus::Success,
        "failed" => PaymentStatus::Failed,
        s => panic!("Unknown payment status {s}"),
    };
    assert_eq!(intent.status, expected);
}

#[then(expr = "the request is rejected with {string}")]
async fn check_error(world: &mut AjoWorld, fragment: String) {
    let err = world.last_error.as_ref().expect("The request succeeded");
    assert!(err.contains(&fragment), "Expected '{fragment}' in '{err}'");
}

#[then("the request succeeds")]
async fn check_success(world: &mut AjoWorld) {
    assert!(world.last_error.is_none(), "Request failed: {:?}", world.last_error);
}

#[then(expr = "group '{word}' has {int} unpaid history entries for {word}")]
async fn check_history(world: &mut AjoWorld, name: String, count: usize, period: String) {
    let group_id = world.group(&name).id;
    let history = world.system().reconciliation.db().fetch_history_for_group(group_id).await.unwrap();
    let period = date(&period);
    let unpaid = history.iter().filter(|h| h.period == period && h.status == HistoryStatus::Unpaid).count();
    assert_eq!(unpaid, count, "Wrong number of history entries for {period}");
}

#[then(expr = "the latest payout of group '{word}' is {int} kobo with a fee of {int} kobo")]
async fn check_payout(world: &mut AjoWorld, name: String, total: i64, fee: i64) {
    let group_id = world.group(&name).id;
    let payouts = world.system().payouts.payouts_for_group(group_id).await.expect("Error fetching payouts");
    let payout = payouts.first().expect("No payouts");
    assert_eq!(payout.total_amount, Kobo::from(total));
    assert_eq!(payout.fee_deducted, Kobo::from(fee));
}
