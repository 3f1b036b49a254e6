// fsgraph/src/sparql.rs
//! Query collaborator: fetch the flat item/parent table from a SPARQL store.
//!
//! The store answers in the SPARQL 1.1 JSON results format:
//! `{"head": {"vars": [...]}, "results": {"bindings": [{"item": {"type": "uri", "value": "..."}, ...}]}}`.
//! Unbound variables are simply absent from a binding.

use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::relation::RawRow;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:7878";
pub const DEFAULT_GRAPH: &str = "http://liqk.org/graph/filesystem";
pub const TOKEN_HEADER: &str = "X-Access-Token";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("store answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("undecodable query result: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can hand over one fully-materialized result set.
pub trait RelationSource {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, QueryError>;
}

/// SELECT over every directory/file with its (optional) containing directory.
pub fn filesystem_query(graph: &str) -> String {
    format!(
        r#"PREFIX posix: <http://www.w3.org/ns/posix/stat#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>

SELECT ?item ?label ?type ?parent ?parentLabel
FROM <{graph}>
WHERE {{
    ?item rdfs:label ?label .
    {{
        ?item a posix:Directory .
        BIND("dir" AS ?type)
    }} UNION {{
        ?item a posix:File .
        BIND("file" AS ?type)
    }}
    OPTIONAL {{
        ?parent posix:includes ?item .
        ?parent rdfs:label ?parentLabel .
    }}
}}
ORDER BY ?parentLabel ?type ?label
"#
    )
}

/* ---------------------------- results document ---------------------------- */

#[derive(Debug, Deserialize)]
pub struct SparqlResults {
    pub results: Bindings,
}

#[derive(Debug, Deserialize)]
pub struct Bindings {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, Term>>,
}

#[derive(Debug, Deserialize)]
pub struct Term {
    pub value: String,
}

impl SparqlResults {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, QueryError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Map variable bindings onto relation rows by column name.
    pub fn into_rows(self) -> Vec<RawRow> {
        self.results
            .bindings
            .into_iter()
            .map(|mut b| {
                let mut take = |var: &str| b.remove(var).map(|t| t.value);
                RawRow {
                    item: take("item"),
                    label: take("label"),
                    kind: take("type"),
                    parent: take("parent"),
                    parent_label: take("parentLabel"),
                }
            })
            .collect()
    }
}

/* ------------------------------- HTTP source ------------------------------- */

/// Blocking client for a store's `/query` endpoint.
pub struct SparqlClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    graph: String,
    token: Option<String>,
}

impl SparqlClient {
    /// `timeout` of `None` waits forever.
    pub fn new(
        endpoint: &str,
        graph: &str,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, QueryError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| QueryError::Transport {
            url: endpoint.clone(),
            source,
        })?;
        Ok(Self {
            client,
            endpoint,
            graph: graph.to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn query_url(&self) -> String {
        format!("{}/query", self.endpoint)
    }

    fn request(&self) -> reqwest::blocking::RequestBuilder {
        let mut req = self
            .client
            .post(self.query_url())
            .header(reqwest::header::CONTENT_TYPE, "application/sparql-query")
            .header(reqwest::header::ACCEPT, "application/sparql-results+json, application/json")
            .body(filesystem_query(&self.graph));
        if let Some(token) = &self.token {
            req = req.header(TOKEN_HEADER, token);
        }
        req
    }
}

impl RelationSource for SparqlClient {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, QueryError> {
        let url = self.query_url();
        info!(url = %url, graph = %self.graph, "querying store");

        let resp = self
            .request()
            .send()
            .map_err(|source| QueryError::Transport { url: url.clone(), source })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(QueryError::Status { status, body });
        }

        let bytes = resp
            .bytes()
            .map_err(|source| QueryError::Transport { url, source })?;
        let rows = SparqlResults::from_slice(&bytes)?.into_rows();
        debug!(rows = rows.len(), "query answered");
        Ok(rows)
    }
}

/* ------------------------------ offline source ------------------------------ */

/// A results document saved to disk earlier (e.g. `curl ... > fs.json`).
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl RelationSource for JsonFileSource {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, QueryError> {
        let bytes = fs::read(&self.path).map_err(|source| QueryError::Io {
            path: self.path.clone(),
            source,
        })?;
        let rows = SparqlResults::from_slice(&bytes)?.into_rows();
        debug!(path = %self.path.display(), rows = rows.len(), "loaded saved results");
        Ok(rows)
    }
}

/* ================================== Tests ================================== */
