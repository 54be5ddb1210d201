//! Planar geometry engine over `geo` value types.
//!
//! Purpose
//! - Supply the primitives the analysis needs and `geo` lacks: noding
//!   (`union` for linework), `line_merge`, `polygonize`, rectangle clipping.
//! - Wrap the `geo` predicates and measures behind the names the analysis
//!   uses (`disjoint`, `touches`, `contains`, `shell`, `area`, `distance`).
//!
//! Conventions
//! - Everything is planar and unitless; coordinates are taken as given.
//! - Operations that can reject input (non-finite coordinates, failing
//!   external polygonizer) return `Result`; pure predicates do not.
//!
//! Code cross-refs: `noding::node_lines`, `graph::{line_merge, trace_faces}`,
//! `clip::clip_to_rect`, `external::polygonize_external`.

mod clip;
mod external;
mod graph;
mod noding;

pub use clip::clip_to_rect;
pub use external::polygonize_external;
pub use graph::line_merge;
pub use noding::{node_lines, segments_of, Segment};

use geo::{
    Area, BoundingRect, Contains, Coord, EuclideanDistance, Intersects, LineString,
    MultiLineString, Point, Polygon, Rect, Relate,
};

use crate::cfg::{EngineCfg, Polygonizer};
use crate::error::Result;

/// Noded union of `lines`, merged into maximal simple lines.
pub fn union_lines(lines: &[LineString<f64>], cfg: &EngineCfg) -> Result<MultiLineString<f64>> {
    let segs = node_lines(lines, cfg)?;
    Ok(MultiLineString::new(line_merge(&segs)))
}

/// Join lines whose endpoints coincide, without noding crossings.
pub fn merge_lines(lines: &[LineString<f64>]) -> Vec<LineString<f64>> {
    line_merge(&segments_of(lines))
}

/// Faces of the planar subdivision spanned by `lines` (in-process backend).
pub fn polygonize(lines: &[LineString<f64>], cfg: &EngineCfg) -> Result<Vec<Polygon<f64>>> {
    let segs = node_lines(lines, cfg)?;
    Ok(graph::trace_faces(&segs))
}

/// Dispatch to the configured polygonizer backend.
pub fn polygonize_with(
    lines: &[LineString<f64>],
    backend: &Polygonizer,
    cfg: &EngineCfg,
) -> Result<Vec<Polygon<f64>>> {
    match backend {
        Polygonizer::InProcess => polygonize(lines, cfg),
        Polygonizer::External { program } => polygonize_external(program, lines),
    }
}

/// Bounding rectangle; `None` for empty linework.
#[inline]
pub fn envelope(lines: &MultiLineString<f64>) -> Option<Rect<f64>> {
    lines.bounding_rect()
}

/// Counter-clockwise closed boundary of `rect`, starting at its minimum corner.
pub fn envelope_ring(rect: &Rect<f64>) -> LineString<f64> {
    let (min, max) = (rect.min(), rect.max());
    LineString::from(vec![
        (min.x, min.y),
        (max.x, min.y),
        (max.x, max.y),
        (min.x, max.y),
        (min.x, min.y),
    ])
}

/// Outer boundary of `polygon` as a hole-free polygon.
#[inline]
pub fn shell(polygon: &Polygon<f64>) -> Polygon<f64> {
    Polygon::new(polygon.exterior().clone(), vec![])
}

/// Area with holes removed.
#[inline]
pub fn area(polygon: &Polygon<f64>) -> f64 {
    polygon.unsigned_area()
}

#[inline]
pub fn is_closed(line: &LineString<f64>) -> bool {
    line.is_closed()
}

/// No point in common, boundaries included.
#[inline]
pub fn disjoint(a: &MultiLineString<f64>, b: &LineString<f64>) -> bool {
    !a.intersects(b)
}

/// Boundaries meet and interiors do not.
#[inline]
pub fn touches(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    a.relate(b).is_touches()
}

/// `line` lies in `polygon` and reaches its interior.
#[inline]
pub fn contains(polygon: &Polygon<f64>, line: &LineString<f64>) -> bool {
    polygon.contains(line)
}

/// Distance from `point` to the nearest segment of `lines` (infinite when empty).
pub fn distance(point: Coord<f64>, lines: &[LineString<f64>]) -> f64 {
    let p = Point::from(point);
    lines
        .iter()
        .map(|l| p.euclidean_distance(l))
        .fold(f64::INFINITY, f64::min)
}

/// Distances from every vertex in `from` to the linework `to`.
pub fn vertex_offsets<'a>(
    from: impl IntoIterator<Item = &'a Coord<f64>>,
    to: &[LineString<f64>],
) -> Vec<f64> {
    from.into_iter().map(|c| distance(*c, to)).collect()
}
