// ABOUTME: Country analysis job locating a geometry within a country
// ABOUTME: Matches the geometry centroid against a fixed table of country extents

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::error::{JobError, Result};
use super::{record_error_envelope, Job, JobContext};
use crate::store::Task;

struct CountryExtent {
    name: &'static str,
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl CountryExtent {
    fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Coarse bounding extents, checked in order; first hit wins.
const COUNTRY_EXTENTS: &[CountryExtent] = &[
    CountryExtent { name: "Brazil", min_lon: -74.0, min_lat: -34.8, max_lon: -34.7, max_lat: 5.3 },
    CountryExtent { name: "United States", min_lon: -125.0, min_lat: 24.4, max_lon: -66.9, max_lat: 49.4 },
    CountryExtent { name: "Australia", min_lon: 112.9, min_lat: -43.7, max_lon: 153.6, max_lat: -10.6 },
    CountryExtent { name: "India", min_lon: 68.1, min_lat: 6.5, max_lon: 97.4, max_lat: 35.5 },
    CountryExtent { name: "Egypt", min_lon: 24.7, min_lat: 22.0, max_lon: 36.9, max_lat: 31.7 },
    CountryExtent { name: "Germany", min_lon: 5.9, min_lat: 47.3, max_lon: 15.0, max_lat: 55.1 },
    CountryExtent { name: "Japan", min_lon: 129.4, min_lat: 31.0, max_lon: 145.8, max_lat: 45.5 },
    CountryExtent { name: "United Kingdom", min_lon: -8.6, min_lat: 49.9, max_lon: 1.8, max_lat: 60.8 },
];

pub struct CountryAnalysisJob;

#[async_trait]
impl Job for CountryAnalysisJob {
    fn task_type(&self) -> &'static str {
        "analysis"
    }

    async fn run(&self, task: &mut Task, _ctx: &JobContext) -> Result<Value> {
        let (lon, lat) = match centroid_of_document(&task.geo_json) {
            Ok(centroid) => centroid,
            Err(err) => {
                record_error_envelope(task, &err.to_string());
                return Err(err);
            }
        };

        let country = COUNTRY_EXTENTS
            .iter()
            .find(|extent| extent.contains(lon, lat))
            .map(|extent| extent.name)
            .unwrap_or("Unknown");

        info!(
            "Task {}: centroid ({:.4}, {:.4}) resolved to {}",
            task.task_id, lon, lat, country
        );

        let output = json!({ "country": country, "centroid": [lon, lat] });
        task.output = Some(output.to_string());
        Ok(output)
    }
}

fn centroid_of_document(geo_json: &str) -> Result<(f64, f64)> {
    let document: Value = serde_json::from_str(geo_json)
        .map_err(|e| JobError::InvalidPayload(format!("GeoJSON is not valid JSON: {}", e)))?;

    let mut positions = Vec::new();
    collect_positions(&document, &mut positions);
    if positions.is_empty() {
        return Err(JobError::InvalidPayload(
            "no coordinate positions found in GeoJSON".to_string(),
        ));
    }

    let count = positions.len() as f64;
    let (lon_sum, lat_sum) = positions
        .iter()
        .fold((0.0, 0.0), |(lon, lat), p| (lon + p.0, lat + p.1));
    Ok((lon_sum / count, lat_sum / count))
}

/// Collects every `[lon, lat, ...]` leaf under any `coordinates` member,
/// whatever the geometry type.
fn collect_positions(value: &Value, positions: &mut Vec<(f64, f64)>) {
    match value {
        Value::Object(map) => {
            if let Some(coordinates) = map.get("coordinates") {
                collect_from_coordinates(coordinates, positions);
            }
            for nested in map.values() {
                if nested.is_object() || nested.is_array() {
                    collect_positions(nested, positions);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_positions(item, positions);
            }
        }
        _ => {}
    }
}

fn collect_from_coordinates(value: &Value, positions: &mut Vec<(f64, f64)>) {
    if let Value::Array(items) = value {
        if items.len() >= 2 && items[0].is_number() && items[1].is_number() {
            if let (Some(lon), Some(lat)) = (items[0].as_f64(), items[1].as_f64()) {
                positions.push((lon, lat));
            }
            return;
        }
        for item in items {
            collect_from_coordinates(item, positions);
        }
    }
}
