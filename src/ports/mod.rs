mod restconf_client;
mod sql_client;

pub use restconf_client::{RestClientError, RestconfClient, UnconfiguredRestconfClient};
pub use sql_client::{Row, SqlClient, SqlClientError, UnconfiguredSqlClient};
