use ajo_engine::db_types::{ContributionCycle, Kobo, NewGroup, UserInfo};
use cucumber::given;

use crate::cucumber::{ajo_world::SavingsSystem, AjoWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut AjoWorld) {
    let system = SavingsSystem::new().await;
    world.system = Some(system);
}

pub fn user(id: &str) -> UserInfo {
    UserInfo::new(id.to_string(), format!("{id}@example.com"))
}

#[given(expr = "'{word}' creates a {word} group '{word}' with contributions of {int} naira")]
async fn create_group(world: &mut AjoWorld, organizer: String, cycle: String, name: String, naira: i64) {
    let cycle = cycle.parse::<ContributionCycle>().expect("Not a contribution cycle");
    let new_group = NewGroup::new(name.clone(), cycle, Kobo::from_naira(naira));
    let group = world.system().groups.create_group(&user(&organizer), new_group).await.expect("Error creating group");
    world.groups.insert(name, group);
}

#[given(expr = "'{word}' creates a {word} group '{word}' with contributions of {int} naira and a {float}% fee")]
async fn create_group_with_fee(
    world: &mut AjoWorld,
    organizer: String,
    cycle: String,
    name: String,
    naira: i64,
    fee: f64,
) {
    let cycle = cycle.parse::<ContributionCycle>().expect("Not a contribution cycle");
    let new_group = NewGroup::new(name.clone(), cycle, Kobo::from_naira(naira)).with_fee_percent(fee);
    let group = world.system().groups.create_group(&user(&organizer), new_group).await.expect("Error creating group");
    world.groups.insert(name, group);
}

#[given(expr = "'{word}' joins group '{word}'")]
async fn join_group(world: &mut AjoWorld, member: String, name: String) {
    let code = world.group(&name).referral_code.clone();
    world.system().groups.join_group(&user(&member), &code).await.expect("Error joining group");
}
