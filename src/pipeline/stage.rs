use super::*;
use crate::error::Error;
use crate::error::Result;
use crate::region::Region;
use std::collections::BTreeMap;
use std::time::Duration;

#[rustfmt::skip]
pub const DTM:      &str = "dtm";
#[rustfmt::skip]
pub const ROADS:    &str = "roads";
#[rustfmt::skip]
pub const POINTS:   &str = "road_points_{{name_area}}";
#[rustfmt::skip]
pub const SEGMENTS: &str = "road_segments_slope_{{name_area}}";

/// Sampled points table of a region.
pub fn points_table(area: &Identifier) -> String {
    POINTS.replace("{{name_area}}", area.as_str())
}
/// Per-segment slope table of a region.
pub fn segments_table(area: &Identifier) -> String {
    SEGMENTS.replace("{{name_area}}", area.as_str())
}

/// Maximum spacing in metres between sampled road points.
pub const SPACING: f64 = 10.0;

/// Declares one pipeline stage: the template it runs and the tables it
/// reads and writes. Table names may carry structural placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    pub name: String,
    pub template: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub bound: Bindings,
}

impl StageSpec {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            bound: Bindings::new(),
        }
    }
    pub fn reads(mut self, table: &str) -> Self {
        self.inputs.push(table.to_string());
        self
    }
    pub fn writes(mut self, table: &str) -> Self {
        self.outputs.push(table.to_string());
        self
    }
    pub fn bind(mut self, name: &str, value: impl Into<Bound>) -> Self {
        self.bound.set(name, value);
        self
    }

    /// Samples road vertices inside the region window and attaches DTM elevations.
    pub fn extract_points() -> Self {
        Self::new("extract_points", "01_extract_points_window")
            .reads(DTM)
            .reads(ROADS)
            .writes(POINTS)
            .bind("spacing", SPACING)
    }
    /// Pairs consecutive points into segments with a slope in percent.
    pub fn derive_segment_slopes() -> Self {
        Self::new("derive_segment_slopes", "02_create_segment_slopes_table")
            .reads(POINTS)
            .writes(SEGMENTS)
    }
    pub fn standard() -> Vec<Self> {
        vec![Self::extract_points(), Self::derive_segment_slopes()]
    }
}

/// One executable statement with its positional values.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub sql: String,
    pub params: Vec<Bound>,
}

/// A stage resolved against one region and ready to run.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub template: Template,
    pub structural: BTreeMap<String, Identifier>,
    pub bound: Bindings,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    statements: Vec<Prepared>,
}

impl Stage {
    pub fn prepare(spec: &StageSpec, template: Template, region: Option<&Region>) -> Result<Self> {
        let stage = spec.name.as_str();
        let mut structural = BTreeMap::new();
        if let Some(region) = region {
            structural.insert("name_area".to_string(), Identifier::sanitize(region.name())?);
        }
        let mut bound = region.map(Bindings::from).unwrap_or_default();
        bound.merge(&spec.bound);
        let tables = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| table(stage, p, &structural).and_then(|t| relation(stage, t)))
                .collect::<Result<Vec<_>>>()
        };
        let inputs = tables(&spec.inputs)?;
        let outputs = tables(&spec.outputs)?;
        let statements = template
            .render(stage, &structural)?
            .into_iter()
            .map(|statement| {
                let params = statement
                    .names
                    .iter()
                    .map(|name| {
                        bound.get(name).cloned().ok_or_else(|| Error::UnboundParameter {
                            stage: stage.to_string(),
                            name: name.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Prepared {
                    sql: statement.sql,
                    params,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: spec.name.clone(),
            template,
            structural,
            bound,
            inputs,
            outputs,
            statements,
        })
    }
    pub fn statements(&self) -> &[Prepared] {
        &self.statements
    }
}

/// Table names are spliced into `DROP TABLE` by the executor, so they must
/// be plain, optionally schema-qualified identifiers.
fn relation(stage: &str, table: String) -> Result<String> {
    let plain = !table.is_empty()
        && table
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if plain {
        Ok(table)
    } else {
        Err(Error::validation(stage, format!("table {:?} is not a plain identifier", table)))
    }
}

/// Outcome of one committed stage.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StageResult {
    pub stage: String,
    pub elapsed: Duration,
    pub rows: u64,
    pub outputs: Vec<String>,
}

impl std::fmt::Display for StageResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<24} {:>10} rows {:>8.2}s -> {}",
            self.stage,
            self.rows,
            self.elapsed.as_secs_f64(),
            self.outputs.join(", ")
        )
    }
}
