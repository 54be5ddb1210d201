//! Output property schema: keys, detection status, offset statistics.

use std::fmt;

use geojson::{Feature, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Match status of a feature relative to the other dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Detection {
    Detected,
    Undetected,
    #[serde(rename = "New Detection")]
    NewDetection,
}

impl Detection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Detection::Detected => "Detected",
            Detection::Undetected => "Undetected",
            Detection::NewDetection => "New Detection",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        [Self::Detected, Self::Undetected, Self::NewDetection]
            .into_iter()
            .find(|d| d.as_str() == s)
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property keys written by the matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Detection,
    /// Offsets of the detected vertices from the baseline line.
    DetectedStats,
    /// Offsets of the baseline vertices from the detected line.
    BaselineStats,
}

impl PropertyKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            PropertyKey::Detection => "detection",
            PropertyKey::DetectedStats => "detected_stats",
            PropertyKey::BaselineStats => "baseline_stats",
        }
    }
}

/// Summary of per-vertex offsets in one direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffsetStats {
    pub mean: f64,
    pub median: f64,
}

impl OffsetStats {
    /// `None` for an empty sample.
    pub fn from_offsets(mut offsets: Vec<f64>) -> Option<Self> {
        if offsets.is_empty() {
            return None;
        }
        let n = offsets.len();
        let mean = offsets.iter().sum::<f64>() / n as f64;
        offsets.sort_by(f64::total_cmp);
        let median = if n % 2 == 1 {
            offsets[n / 2]
        } else {
            (offsets[n / 2 - 1] + offsets[n / 2]) / 2.0
        };
        Some(Self { mean, median })
    }

    pub fn to_json(self) -> JsonValue {
        serde_json::json!({ "mean": self.mean, "median": self.median })
    }

    fn from_json(value: &JsonValue) -> Option<Self> {
        Some(Self {
            mean: value.get("mean")?.as_f64()?,
            median: value.get("median")?.as_f64()?,
        })
    }
}

/// Typed writer over a feature's property object.
#[derive(Debug, Default)]
pub struct Properties(JsonObject);

impl Properties {
    pub fn detection(mut self, status: Detection) -> Self {
        self.0.insert(
            PropertyKey::Detection.as_str().to_owned(),
            JsonValue::String(status.as_str().to_owned()),
        );
        self
    }

    pub fn stats(mut self, key: PropertyKey, stats: OffsetStats) -> Self {
        self.0.insert(key.as_str().to_owned(), stats.to_json());
        self
    }

    pub fn into_inner(self) -> JsonObject {
        self.0
    }
}

/// Detection status recorded on `feature`, if any.
pub fn detection_of(feature: &Feature) -> Option<Detection> {
    feature
        .property(PropertyKey::Detection.as_str())
        .and_then(JsonValue::as_str)
        .and_then(Detection::parse)
}

/// Offset statistics recorded on `feature` under `key`, if any.
pub fn stats_of(feature: &Feature, key: PropertyKey) -> Option<OffsetStats> {
    feature.property(key.as_str()).and_then(OffsetStats::from_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_sample_averages_middle() {
        let s = OffsetStats::from_offsets(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
    }

    #[test]
    fn median_of_odd_sample_is_middle() {
        let s = OffsetStats::from_offsets(vec![9.0, 1.0, 2.0]).unwrap();
        assert_eq!(s.median, 2.0);
        assert_eq!(s.mean, 4.0);
    }

    #[test]
    fn empty_sample_has_no_stats() {
        assert!(OffsetStats::from_offsets(vec![]).is_none());
    }

    #[test]
    fn detection_serializes_with_spaces() {
        assert_eq!(
            serde_json::to_string(&Detection::NewDetection).unwrap(),
            "\"New Detection\""
        );
        assert_eq!(Detection::parse("Undetected"), Some(Detection::Undetected));
    }

    #[test]
    fn properties_hold_only_what_was_set() {
        let stats = OffsetStats::from_offsets(vec![1.0, 3.0]).unwrap();
        let props = Properties::default()
            .detection(Detection::Detected)
            .stats(PropertyKey::DetectedStats, stats)
            .into_inner();
        assert_eq!(props.len(), 2);
        assert_eq!(props["detection"], "Detected");
        assert_eq!(props["detected_stats"]["mean"], 2.0);
    }
}
