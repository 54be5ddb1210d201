//! GeoJSON ↔ `geo` conversion.
//!
//! Positions keep their first two ordinates; any altitude is dropped on the
//! way in and never produced on the way out.

use geo::Geometry;
use geojson::{Feature, GeoJson, Value};

use crate::error::{Error, Result};

/// Convert a GeoJSON geometry value into a `geo` geometry.
pub fn to_geo(value: &Value) -> Result<Geometry<f64>> {
    check_positions(value)?;
    Geometry::try_from(value).map_err(|e| Error::type_mismatch(e.to_string()))
}

/// Reject what `geojson`'s conversion would not: positions with fewer than
/// two ordinates and polygons without an exterior ring.
fn check_positions(value: &Value) -> Result<()> {
    match value {
        Value::Point(p) => position(p),
        Value::MultiPoint(cs) | Value::LineString(cs) => line(cs),
        Value::MultiLineString(ls) => ls.iter().try_for_each(|l| line(l)),
        Value::Polygon(rs) => polygon(rs),
        Value::MultiPolygon(ps) => ps.iter().try_for_each(|p| polygon(p)),
        Value::GeometryCollection(gs) => gs.iter().try_for_each(|g| check_positions(&g.value)),
    }
}

fn position(p: &[f64]) -> Result<()> {
    if p.len() < 2 {
        return Err(Error::type_mismatch(format!(
            "position needs two ordinates, found {}",
            p.len()
        )));
    }
    Ok(())
}

fn line(cs: &[Vec<f64>]) -> Result<()> {
    cs.iter().try_for_each(|c| position(c))
}

fn polygon(rs: &[Vec<Vec<f64>>]) -> Result<()> {
    if rs.is_empty() {
        return Err(Error::type_mismatch("polygon without exterior ring"));
    }
    rs.iter().try_for_each(|r| line(r))
}

/// Geometry of a feature; a feature without geometry is a type mismatch.
pub fn feature_geometry(feature: &Feature) -> Result<Geometry<f64>> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| Error::type_mismatch("feature has no geometry"))?;
    to_geo(&geometry.value)
}

/// Every top-level geometry of a document, in document order.
/// Features without geometry contribute nothing.
pub fn document_geometries(doc: &GeoJson) -> Result<Vec<Geometry<f64>>> {
    match doc {
        GeoJson::Geometry(g) => Ok(vec![to_geo(&g.value)?]),
        GeoJson::Feature(f) => f.geometry.iter().map(|g| to_geo(&g.value)).collect(),
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(|g| to_geo(&g.value))
            .collect(),
    }
}

/// Convert a `geo` geometry back into a GeoJSON geometry.
pub fn from_geo(geometry: &Geometry<f64>) -> geojson::Geometry {
    geojson::Geometry::new(Value::from(geometry))
}

/// Short name of the geometry kind, for messages.
pub fn kind_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_with_hole_converts() {
        let value = Value::Polygon(vec![
            vec![vec![0.0, 0.0], vec![4.0, 0.0], vec![4.0, 4.0], vec![0.0, 4.0], vec![0.0, 0.0]],
            vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![2.0, 2.0], vec![1.0, 1.0]],
        ]);
        match to_geo(&value).unwrap() {
            Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("unexpected {}", kind_name(&other)),
        }
    }

    #[test]
    fn altitude_is_dropped() {
        let value = Value::LineString(vec![vec![0.0, 0.0, 7.0], vec![1.0, 1.0, 8.0]]);
        let back = from_geo(&to_geo(&value).unwrap());
        assert_eq!(back.value, Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]));
    }

    #[test]
    fn short_position_is_type_mismatch() {
        let value = Value::Point(vec![1.0]);
        assert!(matches!(to_geo(&value), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn empty_polygon_is_type_mismatch() {
        assert!(matches!(to_geo(&Value::Polygon(vec![])), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn nested_collection_round_trips_kinds() {
        let value = Value::GeometryCollection(vec![
            geojson::Geometry::new(Value::Point(vec![1.0, 2.0])),
            geojson::Geometry::new(Value::MultiLineString(vec![vec![vec![0.0, 0.0], vec![1.0, 0.0]]])),
        ]);
        let geo = to_geo(&value).unwrap();
        assert_eq!(kind_name(&geo), "GeometryCollection");
        assert_eq!(from_geo(&geo).value, value);
    }
}
