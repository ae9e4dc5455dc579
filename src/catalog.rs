//! Catalog lookup of named objects in the cutout field.

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::coordinates::Coordinates;
use crate::error::{PipelineError, PipelineResult};
use crate::object_types::{expand_type_code, is_allowed};

/// Cone radius searched around the cutout center, in degrees.
pub const SEARCH_RADIUS_DEG: f64 = 0.118;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// One raw row as returned by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub main_id: Option<String>,
    pub otype: Option<String>,
}

impl CatalogRow {
    pub fn new(main_id: &str, otype: &str) -> Self {
        Self {
            main_id: Some(main_id.to_string()),
            otype: Some(otype.to_string()),
        }
    }
}

/// A catalog entry that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogObject {
    pub identifier: String,
    pub type_code: String,
}

impl CatalogObject {
    pub fn type_label(&self) -> &str {
        expand_type_code(&self.type_code)
    }

    /// `"<identifier> <label>"`, the form handed to the describer.
    pub fn expanded(&self) -> String {
        format!("{} {}", self.identifier, self.type_label())
    }
}

pub trait CatalogService: Send + Sync {
    /// All known objects within `radius_deg` of `coords`.
    ///
    /// An empty vector is a valid answer; `Err` is reserved for failures.
    fn query_region(&self, coords: Coordinates, radius_deg: f64) -> PipelineResult<Vec<CatalogRow>>;
}

fn normalize_identifier(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned()
}

/// Reduce raw rows to allow-listed, unique, human-meaningful objects.
///
/// Output is ordered by identifier; the first row seen for an identifier wins.
/// Identifiers starting with `[` mark composite or synthetic catalog entries
/// and are dropped.
pub fn select_objects(rows: Vec<CatalogRow>) -> Vec<CatalogObject> {
    let mut unique: BTreeMap<String, String> = BTreeMap::new();

    for row in rows {
        let (Some(main_id), Some(otype)) = (row.main_id, row.otype) else {
            warn!("Skipping catalog row without identifier or type");
            continue;
        };

        let otype = otype.trim();
        if !is_allowed(otype) {
            continue;
        }

        let identifier = normalize_identifier(&main_id);
        if identifier.is_empty() {
            continue;
        }
        unique.entry(identifier).or_insert_with(|| otype.to_string());
    }

    unique
        .into_iter()
        .filter(|(identifier, _)| !identifier.starts_with('['))
        .map(|(identifier, type_code)| CatalogObject {
            identifier,
            type_code,
        })
        .collect()
}

/// Query the catalog around `coords` and keep the interesting objects.
pub fn lookup_objects(
    service: &dyn CatalogService,
    coords: Coordinates,
) -> PipelineResult<Vec<CatalogObject>> {
    let rows = service.query_region(coords, SEARCH_RADIUS_DEG)?;
    if rows.is_empty() {
        info!("Catalog returned no objects within {} deg", SEARCH_RADIUS_DEG);
        return Ok(Vec::new());
    }

    let total = rows.len();
    let objects = select_objects(rows);
    info!(
        "Catalog returned {} rows, {} objects of interest",
        total,
        objects.len()
    );

    Ok(objects)
}

/// SIMBAD via its TAP synchronous endpoint.
#[derive(Debug)]
pub struct SimbadTap {
    client: reqwest::blocking::Client,
    tap_url: String,
}

#[derive(Debug, Deserialize)]
struct TapResponse {
    data: Vec<Vec<serde_json::Value>>,
}

impl SimbadTap {
    pub fn new(config: &CatalogConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            tap_url: config.tap_url.clone(),
        })
    }
}

/// ADQL cone search selecting identifier and object type.
pub fn cone_search_adql(coords: Coordinates, radius_deg: f64) -> String {
    format!(
        "SELECT main_id, otype FROM basic \
         WHERE CONTAINS(POINT('ICRS', ra, dec), CIRCLE('ICRS', {}, {}, {})) = 1",
        coords.ra, coords.dec, radius_deg
    )
}

fn parse_tap_rows(body: &str) -> PipelineResult<Vec<CatalogRow>> {
    let response: TapResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::Catalog(format!("malformed TAP response: {}", e)))?;

    let column = |row: &[serde_json::Value], idx: usize| {
        row.get(idx).and_then(|v| v.as_str()).map(str::to_string)
    };

    Ok(response
        .data
        .iter()
        .map(|row| CatalogRow {
            main_id: column(row, 0),
            otype: column(row, 1),
        })
        .collect())
}

impl CatalogService for SimbadTap {
    fn query_region(
        &self,
        coords: Coordinates,
        radius_deg: f64,
    ) -> PipelineResult<Vec<CatalogRow>> {
        let adql = cone_search_adql(coords, radius_deg);
        debug!("SIMBAD query: {}", adql);

        let response = self
            .client
            .post(&self.tap_url)
            .form(&[
                ("REQUEST", "doQuery"),
                ("LANG", "ADQL"),
                ("FORMAT", "json"),
                ("QUERY", adql.as_str()),
            ])
            .send()
            .map_err(|e| PipelineError::Catalog(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Catalog(format!(
                "SIMBAD returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .map_err(|e| PipelineError::Catalog(e.to_string()))?;
        parse_tap_rows(&body)
    }
}
