pub mod connection;
pub mod fixtures;
pub mod ledger;
pub mod migrations;
pub mod store;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{SeedDataset, SeedResult, SeedVerification};
pub use ledger::SqlBalanceLedger;
pub use store::SqlRequestStore;
