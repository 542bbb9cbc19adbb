mod engine;
mod restconf_http;
mod sequencer;
mod sql_fixture;

pub mod resolvers;
pub mod shaping;

pub use engine::{
    ComponentOutcome, ComponentReport, Phase, ResourceAssignmentComponent, TransactionRecord,
};
pub use restconf_http::RestconfHttpClient;
pub use sequencer::Sequencer;
pub use sql_fixture::{FixtureSqlClient, SqlFixture};
