use std::collections::HashMap;

use ajo_engine::{
    db_types::Group,
    events::EventProducers,
    test_utils::{
        mock_gateway::MockGateway,
        prepare_env::{create_database, random_db_path, run_migrations},
    },
    CycleApi,
    GroupApi,
    PayoutApi,
    ReconciliationApi,
    SqliteDatabase,
};
use cucumber::World;
use log::*;

#[derive(Default, Debug, World)]
pub struct AjoWorld {
    pub system: Option<SavingsSystem>,
    /// Groups by the name used in the feature file
    pub groups: HashMap<String, Group>,
    pub last_reference: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct SavingsSystem {
    pub db_path: String,
    pub gateway: MockGateway,
    pub reconciliation: ReconciliationApi<SqliteDatabase, MockGateway>,
    pub groups: GroupApi<SqliteDatabase>,
    pub payouts: PayoutApi<SqliteDatabase>,
    pub cycles: CycleApi<SqliteDatabase>,
}

impl AjoWorld {
    pub fn system(&self) -> &SavingsSystem {
        self.system.as_ref().expect("Savings system not initialised")
    }

    pub fn group(&self, name: &str) -> &Group {
        self.groups.get(name).unwrap_or_else(|| panic!("Group {name} has not been created"))
    }

    pub fn last_reference(&self) -> String {
        self.last_reference.clone().expect("No payment has been started")
    }
}

impl SavingsSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 2).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let gateway = MockGateway::default();
        let producers = EventProducers::default();
        let reconciliation = ReconciliationApi::new(db.clone(), gateway.clone(), producers.clone());
        let groups = GroupApi::new(db.clone(), producers.clone());
        let payouts = PayoutApi::new(db.clone(), producers.clone());
        let cycles = CycleApi::new(db, producers);
        Self { db_path: url, gateway, reconciliation, groups, payouts, cycles }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
