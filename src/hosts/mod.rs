// Tue Jan 13 2026 - Alex

pub mod discovery;

pub use discovery::{run_discovery, DiscoverySpec};

use crate::error::PsshResult;
use indexmap::IndexSet;

/// Where the target hosts come from. An explicit list always wins over a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSource {
    Explicit(String),
    Query(String),
    Fallback(Vec<String>),
}

impl HostSource {
    pub fn from_options(host: Option<&str>, query: Option<&str>, fallback: &[String]) -> Self {
        match (host, query) {
            (Some(host), query) => {
                if let Some(query) = query {
                    log::warn!("both --host and --query given, ignoring query {:?}", query);
                }
                HostSource::Explicit(host.to_string())
            }
            (None, Some(query)) => HostSource::Query(query.to_string()),
            (None, None) => HostSource::Fallback(fallback.to_vec()),
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, HostSource::Query(_))
    }

    /// Ordered, de-duplicated host list. Only a query can fail.
    pub fn resolve(&self, discovery: &DiscoverySpec) -> PsshResult<Vec<String>> {
        let hosts = match self {
            HostSource::Explicit(list) => parse_host_list(list),
            HostSource::Query(query) => distinct(run_discovery(discovery, query)?),
            HostSource::Fallback(hosts) => distinct(hosts.iter().cloned()),
        };
        log::debug!("resolved {} hosts", hosts.len());
        Ok(hosts)
    }
}

/// Splits a comma-separated host list, dropping blanks and repeats.
pub fn parse_host_list(list: &str) -> Vec<String> {
    distinct(
        list.split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string),
    )
}

pub fn distinct<I: IntoIterator<Item = String>>(hosts: I) -> Vec<String> {
    hosts.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}
