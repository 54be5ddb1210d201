//! Feature Matcher: pair baseline features with detected linework.
//!
//! Matching is greedy: for each baseline feature, in order, the first
//! remaining detected line with the same closedness that is not disjoint from
//! the baseline line is taken. It is not the nearest candidate and the
//! assignment is not globally optimal. A taken line leaves the pool and cannot
//! match again; whatever remains after the last baseline feature is reported
//! as a new detection.

use geo::{Geometry, LineString, MultiLineString};
use geojson::{Feature, FeatureCollection, Value};

use crate::adapter::{self, kind_name};
use crate::engine;
use crate::error::{Error, Result};
use crate::scene::collect_linework;
use crate::schema::{Detection, OffsetStats, Properties, PropertyKey};

/// Detected lines still available for matching, in original order.
///
/// Taken lines leave a tombstone so indices stay stable while scanning.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    slots: Vec<Option<LineString<f64>>>,
}

impl CandidatePool {
    pub fn new(lines: impl IntoIterator<Item = LineString<f64>>) -> Self {
        Self {
            slots: lines.into_iter().map(Some).collect(),
        }
    }

    pub fn from_network(network: &MultiLineString<f64>) -> Self {
        Self::new(network.iter().cloned())
    }

    /// Lines not yet taken.
    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn live(&self) -> impl Iterator<Item = (usize, &LineString<f64>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|l| (i, l)))
    }

    fn take(&mut self, index: usize) -> Option<LineString<f64>> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn into_remaining(self) -> impl Iterator<Item = LineString<f64>> {
        self.slots.into_iter().flatten()
    }
}

/// An accepted pairing.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    pub detected: LineString<f64>,
    /// Offsets of the detected vertices from the baseline line.
    pub detected_stats: OffsetStats,
    /// Offsets of the baseline vertices from the detected line.
    pub baseline_stats: OffsetStats,
}

/// Reduce a baseline geometry to its line form.
///
/// Polygons give their exterior ring; multi-part and collection inputs are
/// merged where endpoints coincide. Points carry no line and are rejected.
pub fn canonical_line(geometry: &Geometry<f64>) -> Result<MultiLineString<f64>> {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Err(Error::type_mismatch(format!(
            "cannot reduce {} to a line",
            kind_name(geometry)
        ))),
        Geometry::LineString(ls) => Ok(MultiLineString::new(vec![ls.clone()])),
        Geometry::Polygon(p) => Ok(MultiLineString::new(vec![p.exterior().clone()])),
        other => {
            let mut lines = Vec::new();
            collect_linework(other, &mut lines);
            if lines.is_empty() {
                return Err(Error::type_mismatch(format!(
                    "{} holds no linework",
                    kind_name(other)
                )));
            }
            Ok(MultiLineString::new(engine::merge_lines(&lines)))
        }
    }
}

/// Take the first compatible candidate for `baseline` out of `pool`.
pub fn find_match(baseline: &MultiLineString<f64>, pool: &mut CandidatePool) -> Result<Option<Match>> {
    let closed = baseline.is_closed();
    let hit = pool
        .live()
        .find(|(_, c)| engine::is_closed(c) == closed && !engine::disjoint(baseline, c))
        .map(|(i, _)| i);
    let Some(index) = hit else {
        return Ok(None);
    };
    let detected = pool
        .take(index)
        .ok_or_else(|| Error::geometry(format!("candidate {index} vanished from the pool")))?;

    let detected_stats =
        OffsetStats::from_offsets(engine::vertex_offsets(detected.coords(), &baseline.0))
            .ok_or_else(|| Error::geometry("detected line has no vertices"))?;
    let baseline_stats = OffsetStats::from_offsets(engine::vertex_offsets(
        baseline.iter().flat_map(|l| l.coords()),
        std::slice::from_ref(&detected),
    ))
    .ok_or_else(|| Error::geometry("baseline line has no vertices"))?;

    Ok(Some(Match {
        detected,
        detected_stats,
        baseline_stats,
    }))
}

/// Classify one baseline feature, consuming its match from `pool`.
///
/// Returns a new feature whose properties are replaced by the detection keys;
/// `feature` itself is left untouched.
pub fn match_feature(feature: &Feature, pool: &mut CandidatePool) -> Result<Feature> {
    let geometry = adapter::feature_geometry(feature)?;
    let baseline = canonical_line(&geometry)?;
    let props = Properties::default();
    let mut out = feature.clone();

    match find_match(&baseline, pool)? {
        Some(m) => {
            let detected = adapter::from_geo(&Geometry::LineString(m.detected));
            out.geometry = feature.geometry.clone().map(|original| {
                geojson::Geometry::new(Value::GeometryCollection(vec![original, detected]))
            });
            out.properties = Some(
                props
                    .detection(Detection::Detected)
                    .stats(PropertyKey::DetectedStats, m.detected_stats)
                    .stats(PropertyKey::BaselineStats, m.baseline_stats)
                    .into_inner(),
            );
        }
        None => {
            out.properties = Some(props.detection(Detection::Undetected).into_inner());
        }
    }
    Ok(out)
}

/// Match every baseline feature in order, then append the leftovers as new
/// detections.
pub fn match_features(features: &[Feature], mut pool: CandidatePool) -> Result<Vec<Feature>> {
    let mut out = Vec::with_capacity(features.len() + pool.len());
    for feature in features {
        out.push(match_feature(feature, &mut pool)?);
    }
    out.extend(pool.into_remaining().map(new_detection));
    Ok(out)
}

fn new_detection(line: LineString<f64>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(adapter::from_geo(&Geometry::LineString(line))),
        id: None,
        properties: Some(
            Properties::default()
                .detection(Detection::NewDetection)
                .into_inner(),
        ),
        foreign_members: None,
    }
}

/// Collect matched features into one output document.
pub fn into_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{detection_of, stats_of};
    use geo::line_string;
    use geojson::JsonObject;
    use proptest::prelude::*;
    use serde_json::json;

    fn feature(value: Value) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(value)),
            id: None,
            properties: Some(JsonObject::new()),
            foreign_members: None,
        }
    }

    fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> Feature {
        feature(Value::LineString(vec![vec![x0, y0], vec![x1, y1]]))
    }

    #[test]
    fn disjoint_feature_is_undetected() {
        let input = segment(0.0, 0.0, 10.0, 0.0);
        let mut pool = CandidatePool::new([line_string![(x: 0.0, y: 5.0), (x: 10.0, y: 5.0)]]);
        let out = match_feature(&input, &mut pool).unwrap();
        assert_eq!(detection_of(&out), Some(Detection::Undetected));
        assert_eq!(out.geometry, input.geometry);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn undetected_polygon_keeps_its_geometry() {
        let mut input = feature(Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![4.0, 0.0],
            vec![4.0, 4.0],
            vec![0.0, 4.0],
            vec![0.0, 0.0],
        ]]));
        if let Some(props) = input.properties.as_mut() {
            props.insert("name".into(), json!("lagoon"));
        }
        let mut pool = CandidatePool::new([line_string![(x: 20.0, y: 20.0), (x: 30.0, y: 20.0)]]);
        let out = match_feature(&input, &mut pool).unwrap();
        assert_eq!(detection_of(&out), Some(Detection::Undetected));
        assert_eq!(out.geometry, input.geometry);
        assert_eq!(out.property("name"), None);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn first_intersecting_candidate_wins() {
        let mut pool = CandidatePool::new([
            line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 1.0)],
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
        ]);
        let baseline = MultiLineString::new(vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]]);
        let m = find_match(&baseline, &mut pool).unwrap().unwrap();
        assert_eq!(m.detected, line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 1.0)]);
        assert_eq!(m.detected_stats, OffsetStats { mean: 1.0, median: 1.0 });
        assert_eq!(m.baseline_stats, OffsetStats { mean: 5.0, median: 5.0 });
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn closedness_must_agree() {
        let ring = feature(Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![4.0, 0.0],
            vec![4.0, 4.0],
            vec![0.0, 4.0],
            vec![0.0, 0.0],
        ]]));
        let pool = CandidatePool::new([line_string![(x: -1.0, y: 2.0), (x: 5.0, y: 2.0)]]);
        let out = match_features(&[ring], pool).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(detection_of(&out[0]), Some(Detection::Undetected));
        assert_eq!(detection_of(&out[1]), Some(Detection::NewDetection));
    }

    #[test]
    fn detected_feature_carries_both_geometries_and_stats() {
        let mut input = segment(0.0, 0.0, 10.0, 0.0);
        if let Some(props) = input.properties.as_mut() {
            props.insert("name".into(), json!("north spit"));
        }
        let pool = CandidatePool::new([line_string![(x: 0.0, y: 1.0), (x: 10.0, y: -1.0)]]);
        let out = match_features(std::slice::from_ref(&input), pool).unwrap();
        assert_eq!(out.len(), 1);
        let f = &out[0];
        assert_eq!(detection_of(f), Some(Detection::Detected));
        // Baseline properties are replaced, not merged.
        assert_eq!(f.property("name"), None);
        assert_eq!(f.properties.as_ref().map(|p| p.len()), Some(3));
        assert!(stats_of(f, PropertyKey::DetectedStats).is_some());
        assert!(stats_of(f, PropertyKey::BaselineStats).is_some());
        match f.geometry.as_ref().map(|g| &g.value) {
            Some(Value::GeometryCollection(parts)) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(Some(&parts[0]), input.geometry.as_ref());
            }
            other => panic!("unexpected geometry {other:?}"),
        }
        // Input is left as it was.
        assert_eq!(detection_of(&input), None);
    }

    #[test]
    fn point_has_no_canonical_line() {
        let g = Geometry::Point(geo::Point::new(1.0, 2.0));
        assert!(matches!(canonical_line(&g), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn multi_part_line_is_merged() {
        let g = Geometry::MultiLineString(MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 1.0)],
        ]));
        let merged = canonical_line(&g).unwrap();
        assert_eq!(merged.0.len(), 1);
        assert_eq!(merged.0[0].0.len(), 3);
    }

    #[test]
    fn feature_without_geometry_is_type_mismatch() {
        let mut f = segment(0.0, 0.0, 1.0, 0.0);
        f.geometry = None;
        let mut pool = CandidatePool::default();
        assert!(matches!(match_feature(&f, &mut pool), Err(Error::TypeMismatch(_))));
    }

    fn segments() -> impl Strategy<Value = Vec<(i32, i32, i32, i32)>> {
        prop::collection::vec((0..20i32, 0..20i32, 0..20i32, 0..20i32), 0..8)
            .prop_map(|v| v.into_iter().filter(|(a, b, c, d)| (a, b) != (c, d)).collect())
    }

    fn lines(v: &[(i32, i32, i32, i32)]) -> Vec<LineString<f64>> {
        v.iter()
            .map(|&(a, b, c, d)| {
                LineString::from(vec![(a as f64, b as f64), (c as f64, d as f64)])
            })
            .collect()
    }

    proptest! {
        #[test]
        fn new_detections_are_the_unmatched_candidates(base in segments(), det in segments()) {
            let features: Vec<Feature> = lines(&base)
                .iter()
                .map(|l| feature(adapter::from_geo(&Geometry::LineString(l.clone())).value))
                .collect();
            let pool = CandidatePool::new(lines(&det));
            let out = match_features(&features, pool.clone()).unwrap();
            let count = |d| out.iter().filter(|f| detection_of(f) == Some(d)).count();
            prop_assert_eq!(count(Detection::NewDetection), det.len() - count(Detection::Detected));
            prop_assert_eq!(count(Detection::Detected) + count(Detection::Undetected), base.len());
            prop_assert_eq!(match_features(&features, pool).unwrap(), out);
        }
    }
}
