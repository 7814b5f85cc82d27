//! Source/target connector contracts. The real Oracle and PostgreSQL
//! drivers are external collaborators and out of scope here; what lives
//! in this crate is the trait seam jobs code against, plus an in-memory
//! test double implementing it for both sides.

mod connector;
mod test_double;
mod value;

pub use connector::{Connection, Connector, ConnectorError, ORACLE_DICTIONARY_VIEWS, POSTGRES_CATALOG_VIEWS};
pub use test_double::InMemoryConnector;
pub use value::{Param, QueryResult, Row, Value};
