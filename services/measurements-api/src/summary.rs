//! Roof-segment summary derived from a building insights payload.
//!
//! Each roof segment is treated as a square of its reported area, so its
//! eave run is `4 * sqrt(area)`. Coarser than the mask measurement but
//! available without imagery.

use gutter_estimator::round_measurement;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoofSummary {
    pub total_roof_area_m2: f64,
    pub total_gutter_length_m: f64,
    pub estimated_cost_usd: f64,
    pub cost_per_meter_usd: f64,
    pub num_roof_segments: usize,
}

/// The roof segment list, wherever the payload carries it.
pub fn roof_segment_stats(insights: &Value) -> Vec<Value> {
    insights
        .pointer("/solarPotential/roofSegmentStats")
        .or_else(|| insights.get("roofSegmentStats"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn segment_area(segment: &Value) -> Option<f64> {
    ["/stats/areaMeters2", "/stats/groundAreaMeters2", "/groundAreaMeters2"]
        .iter()
        .find_map(|path| segment.pointer(path).and_then(Value::as_f64))
        .filter(|area| area.is_finite() && *area > 0.0)
}

pub fn summarize_roof_segments(segments: &[Value], cost_per_meter_usd: f64) -> RoofSummary {
    let areas: Vec<f64> = segments.iter().filter_map(segment_area).collect();
    let total_area: f64 = areas.iter().sum();
    let total_length: f64 = areas.iter().map(|a| 4.0 * a.sqrt()).sum();

    RoofSummary {
        total_roof_area_m2: round_measurement(total_area),
        total_gutter_length_m: round_measurement(total_length),
        estimated_cost_usd: round_measurement(total_length * cost_per_meter_usd),
        cost_per_meter_usd,
        num_roof_segments: segments.len(),
    }
}

/// Wrap an insights payload into the `solar_data` response object.
pub fn solar_data(insights: Value, cost_per_meter_usd: f64) -> Value {
    let segments = roof_segment_stats(&insights);
    let summary = summarize_roof_segments(&segments, cost_per_meter_usd);
    json!({
        "buildingInsights": insights,
        "roofSegmentStats": segments,
        "roofSummary": summary,
    })
}
