//! Fetch command: read a key through the cache-aside fetcher.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use std::convert::Infallible;
use std::sync::Arc;

use crate::adapters::build_source;
use crate::adapters::cache::RedisStore;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{CacheKey, ColumnValue, Config, QueryResult, QuerySpec};
use crate::services::{CacheAsideFetcher, CacheStatus, Fetched};

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Cache key to read and populate
    #[arg(
        short,
        long,
        required_unless_present = "derive_key",
        conflicts_with = "derive_key"
    )]
    pub key: Option<String>,

    /// SQL query executed against the source on a cache miss
    #[arg(short, long)]
    pub query: String,

    /// Positional bind value for the query (repeatable); parsed as null,
    /// true/false, integer, float, RFC 3339 timestamp, or text
    #[arg(short = 'p', long = "param", value_name = "VALUE", value_parser = parse_param)]
    pub params: Vec<ColumnValue>,

    /// Derive the cache key from the query text and parameters
    #[arg(long)]
    pub derive_key: bool,

    /// Override the cache TTL in seconds for this run
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub ttl: Option<u64>,
}

fn parse_param(raw: &str) -> Result<ColumnValue, Infallible> {
    Ok(ColumnValue::parse_param(raw))
}

impl FetchArgs {
    pub fn query_spec(&self) -> QuerySpec {
        QuerySpec::with_params(self.query.clone(), self.params.clone())
    }

    /// The explicit key, or one derived from `query` with `--derive-key`.
    pub fn cache_key(&self, query: &QuerySpec) -> CacheKey {
        match (&self.key, self.derive_key) {
            (Some(key), false) => CacheKey::new(key.clone()),
            _ => CacheKey::derive(query),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct FetchOutput {
    pub key: String,
    pub cache: CacheStatus,
    pub columns: Vec<String>,
    pub rows: serde_json::Value,
    #[serde(skip)]
    result: QueryResult,
}

impl FetchOutput {
    pub fn new(key: &CacheKey, fetched: Fetched) -> Self {
        Self {
            key: key.to_string(),
            cache: fetched.status,
            columns: fetched.result.columns.clone(),
            rows: fetched.result.rows_json(),
            result: fetched.result,
        }
    }
}

impl CommandOutput for FetchOutput {
    fn to_human(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.result.columns.is_empty() {
            table.set_header(self.result.columns.iter().map(Cell::new));
        }
        for row in &self.result.rows {
            table.add_row(row.iter().map(|value| {
                let cell = Cell::new(value);
                match value {
                    ColumnValue::Integer(_) | ColumnValue::Float(_) => {
                        cell.set_alignment(CellAlignment::Right)
                    }
                    _ => cell,
                }
            }));
        }

        let count = self.result.row_count();
        let footer = format!(
            "{count} row{} (cache {})",
            if count == 1 { "" } else { "s" },
            self.cache
        );
        if count == 0 {
            return format!("Retrieved Data:\n{footer}");
        }
        format!("Retrieved Data:\n{table}\n{footer}")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run one cache-aside fetch and print the result.
pub async fn execute(args: FetchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = RedisStore::new(&config.store)?;
    let source = build_source(&config.source)?;
    let fetcher = CacheAsideFetcher::from_config(Arc::new(store), source, &config.cache);

    let query = args.query_spec();
    let key = args.cache_key(&query);
    tracing::debug!(key = %key, params = query.params.len(), "fetching");

    let fetched = fetcher
        .fetch_with_status(&key, &query)
        .await
        .with_context(|| format!("fetching '{key}'"))?;

    output(&FetchOutput::new(&key, fetched), json_mode);
    Ok(())
}
