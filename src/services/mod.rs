pub mod action_items;
pub mod fixture;
pub mod messages;

pub use action_items::{ActionItemsManagement, CaseActionSummary, Resolution};
pub use fixture::{load_fixture, Fixture, FixtureError, FixtureRecords};
pub use messages::MessageCatalog;
