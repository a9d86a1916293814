use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_url;
use regex::Regex;

/// A SoQL query with its target portal resolved from a SQL-like FROM clause:
///
/// ```text
/// SELECT *
/// FROM https://www.dallasopendata.com/resource/qv6i-rri7.json
/// ```
///
/// The FROM clause is stripped before the query is submitted, since the
/// portal itself does not understand it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    pub base_url: String,
    pub endpoint: String,
    pub query: String,
}

impl SoqlQuery {
    pub fn parse(raw: &str) -> Result<Self> {
        let base_re = Regex::new(r"(?i)https?://[^\s/]+").unwrap();
        let endpoint_re = Regex::new(r"(\w{4}-\w{4})\.json").unwrap();
        let from_re = Regex::new(r"(?i)from\s+.+").unwrap();

        let base_url = base_re
            .find(raw)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| EtlError::QueryError {
                message: "no portal URL found in FROM clause".to_string(),
            })?;
        let endpoint = endpoint_re
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| EtlError::QueryError {
                message: "no {xxxx-yyyy}.json endpoint found in FROM clause".to_string(),
            })?;

        validate_url("from_clause", &base_url)?;

        let query = from_re.replace_all(raw, "").trim().to_string();

        Ok(Self {
            base_url,
            endpoint,
            query,
        })
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/api/views/{}.json", self.base_url, self.endpoint)
    }

    pub fn results_url(&self) -> String {
        format!("{}/resource/{}.json", self.base_url, self.endpoint)
    }
}
