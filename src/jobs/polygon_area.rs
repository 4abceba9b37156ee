// ABOUTME: Polygon area job computing geodesic area from a GeoJSON payload
// ABOUTME: Walks Feature/FeatureCollection/geometry documents and applies the spherical ring formula

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::error::{JobError, Result};
use super::{record_error_envelope, Job, JobContext};
use crate::store::Task;

/// Mean Earth radius in meters, matching the figure geodesy libraries use
/// for spherical area.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub struct PolygonAreaJob;

#[async_trait]
impl Job for PolygonAreaJob {
    fn task_type(&self) -> &'static str {
        "polygonArea"
    }

    async fn run(&self, task: &mut Task, _ctx: &JobContext) -> Result<Value> {
        let area = match polygon_area_of_document(&task.geo_json) {
            Ok(area) => area,
            Err(err) => {
                record_error_envelope(task, &err.to_string());
                return Err(err);
            }
        };

        info!(
            "Task {}: computed polygon area {:.2} m2",
            task.task_id, area
        );

        let output = json!({ "area": area, "unit": "square meters" });
        task.output = Some(output.to_string());
        Ok(output)
    }
}

fn polygon_area_of_document(geo_json: &str) -> Result<f64> {
    let document: Value = serde_json::from_str(geo_json)
        .map_err(|e| JobError::InvalidPayload(format!("GeoJSON is not valid JSON: {}", e)))?;
    let geometry = geometry_of(&document)
        .ok_or_else(|| JobError::InvalidPayload("no geometry found in GeoJSON".to_string()))?;
    geometry_area(geometry)
}

/// Pulls the first geometry out of a Feature, FeatureCollection, or bare
/// geometry document.
fn geometry_of(document: &Value) -> Option<&Value> {
    match document.get("type").and_then(Value::as_str) {
        Some("Feature") => document.get("geometry"),
        Some("FeatureCollection") => document
            .get("features")?
            .as_array()?
            .iter()
            .find_map(|feature| feature.get("geometry")),
        Some(_) => Some(document),
        None => None,
    }
}

fn geometry_area(geometry: &Value) -> Result<f64> {
    let geometry_type = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| JobError::InvalidPayload("geometry has no type".to_string()))?;
    let coordinates = geometry
        .get("coordinates")
        .cloned()
        .ok_or_else(|| JobError::InvalidPayload("geometry has no coordinates".to_string()))?;

    match geometry_type {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(coordinates)
                .map_err(|e| JobError::InvalidPayload(format!("malformed Polygon: {}", e)))?;
            check_positions(&rings)?;
            Ok(polygon_area(&rings))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(coordinates)
                .map_err(|e| JobError::InvalidPayload(format!("malformed MultiPolygon: {}", e)))?;
            for rings in &polygons {
                check_positions(rings)?;
            }
            Ok(polygons.iter().map(|rings| polygon_area(rings)).sum())
        }
        other => Err(JobError::InvalidPayload(format!(
            "unsupported geometry type for area: {}",
            other
        ))),
    }
}

fn check_positions(rings: &[Vec<Vec<f64>>]) -> Result<()> {
    if rings.iter().flatten().any(|position| position.len() < 2) {
        return Err(JobError::InvalidPayload(
            "position with fewer than two coordinates".to_string(),
        ));
    }
    Ok(())
}

/// Outer ring minus holes, all as absolute spherical areas.
fn polygon_area(rings: &[Vec<Vec<f64>>]) -> f64 {
    let mut total = 0.0;
    if let Some(outer) = rings.first() {
        total = ring_area(outer).abs();
        for hole in &rings[1..] {
            total -= ring_area(hole).abs();
        }
    }
    total
}

/// Signed spherical area of a linear ring (closing point included), in
/// square meters.
fn ring_area(ring: &[Vec<f64>]) -> f64 {
    if ring.len() <= 2 {
        return 0.0;
    }

    let len = ring.len();
    let mut total = 0.0;
    for i in 0..len {
        let lower = &ring[i];
        let middle = &ring[(i + 1) % len];
        let upper = &ring[(i + 2) % len];
        total += (upper[0].to_radians() - lower[0].to_radians()) * middle[1].to_radians().sin();
    }

    total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Workflow};
    use std::sync::Arc;

    fn unit_square_feature() -> String {
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        })
        .to_string()
    }

    async fn run_job(geo_json: String) -> (Task, Result<Value>) {
        let workflow = Workflow::new("client-1");
        let mut task = Task::new(&workflow, "polygonArea", 1, geo_json);
        let ctx = JobContext::new(Arc::new(MemoryStore::new()));

        let outcome = PolygonAreaJob.run(&mut task, &ctx).await;
        (task, outcome)
    }

    #[tokio::test]
    async fn test_unit_square_area_near_equator() {
        let (task, outcome) = run_job(unit_square_feature()).await;
        let output = outcome.unwrap();

        // One square degree at the equator is roughly 12,364 km^2.
        let area = output["area"].as_f64().unwrap();
        assert!(area > 1.2e10 && area < 1.25e10, "area was {}", area);
        assert_eq!(output["unit"], "square meters");

        // The job records its result in the output side channel too.
        let recorded = task.output_value().unwrap();
        assert_eq!(recorded["unit"], "square meters");
    }

    #[tokio::test]
    async fn test_polygon_hole_subtracts() {
        let with_hole = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
                [[0.25, 0.25], [0.75, 0.25], [0.75, 0.75], [0.25, 0.75], [0.25, 0.25]]
            ]
        })
        .to_string();

        let (_, with_hole_outcome) = run_job(with_hole).await;
        let (_, solid_outcome) = run_job(unit_square_feature()).await;

        let holed = with_hole_outcome.unwrap()["area"].as_f64().unwrap();
        let solid = solid_outcome.unwrap()["area"].as_f64().unwrap();
        assert!(holed < solid);
        assert!(holed > 0.0);
    }

    #[tokio::test]
    async fn test_invalid_payload_records_error_envelope() {
        let (task, outcome) = run_job("not geojson".to_string()).await;

        assert!(matches!(outcome, Err(JobError::InvalidPayload(_))));
        let (message, _) = task.failure_details();
        assert!(message.contains("not valid JSON"));
    }

    #[tokio::test]
    async fn test_point_geometry_rejected() {
        let point = json!({"type": "Point", "coordinates": [0.0, 0.0]}).to_string();
        let (_, outcome) = run_job(point).await;
        assert!(matches!(outcome, Err(JobError::InvalidPayload(_))));
    }
}
