//! An in-memory stand-in for both the source and target connector, used by
//! integration tests that exercise the pipeline without a live Oracle or
//! PostgreSQL server. Responses are canned per exact SQL text; there is no
//! query engine behind it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::connector::{Connection, ConnectorError, Connector};
use crate::value::{Param, QueryResult};

#[derive(Clone, Default)]
pub struct InMemoryConnector {
    configured: bool,
    responses: Arc<HashMap<String, QueryResult>>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl InMemoryConnector {
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn new(responses: HashMap<String, QueryResult>) -> Self {
        Self { configured: true, responses: Arc::new(responses), executed: Arc::new(Mutex::new(Vec::new())) }
    }

    /// SQL text, in call order, that any connection from this connector
    /// has executed. Lets a test assert a stage queried the views it was
    /// supposed to.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Connector for InMemoryConnector {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn connect(&self) -> Result<Box<dyn Connection>, ConnectorError> {
        if !self.configured {
            return Err(ConnectorError::NotConfigured);
        }
        Ok(Box::new(InMemoryConnection { responses: self.responses.clone(), executed: self.executed.clone() }))
    }
}

struct InMemoryConnection {
    responses: Arc<HashMap<String, QueryResult>>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl Connection for InMemoryConnection {
    fn execute(&self, sql: &str, _params: &[Param]) -> Result<QueryResult, ConnectorError> {
        self.executed.lock().unwrap().push(sql.to_string());
        self.responses
            .get(sql)
            .cloned()
            .ok_or_else(|| ConnectorError::Query(format!("no canned response registered for: {sql}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Row, Value};

    #[test]
    fn unconfigured_connector_refuses_to_connect() {
        let connector = InMemoryConnector::unconfigured();
        assert!(!connector.is_configured());
        assert_eq!(connector.connect().unwrap_err(), ConnectorError::NotConfigured);
    }

    #[test]
    fn configured_connector_replays_canned_response() {
        let mut responses = HashMap::new();
        responses.insert(
            "SELECT username FROM all_users".to_string(),
            QueryResult::new(vec![Row::new(vec![("username", Value::Text("HR".into()))])]),
        );
        let connector = InMemoryConnector::new(responses);
        let conn = connector.connect().unwrap();
        let result = conn.execute("SELECT username FROM all_users", &[]).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(connector.executed(), vec!["SELECT username FROM all_users".to_string()]);
    }

    #[test]
    fn unregistered_query_is_an_error_not_a_panic() {
        let connector = InMemoryConnector::new(HashMap::new());
        let conn = connector.connect().unwrap();
        assert!(conn.execute("SELECT 1", &[]).is_err());
    }
}
