//! Ring–Chord Partitioner: Line Network → faces with nested holes.
//!
//! Algorithm
//! - Split the network into rings (closed lines) and chords (open lines).
//! - Seed the chords with the network envelope boundary so at least one
//!   enclosing face exists even when every line is closed.
//! - With more than one chord, polygonize the chords; otherwise the
//!   envelope is the only face.
//! - Every face gets the rings it contains as holes.
//!
//! Face order is the polygonizer's; face 0 is the terminal face of the
//! polarity forest.

use geo::{LineString, MultiLineString, MultiPolygon, Polygon};

use crate::cfg::AnalysisCfg;
use crate::engine;
use crate::error::{Error, Result};

pub fn partition(network: &MultiLineString<f64>, cfg: &AnalysisCfg) -> Result<MultiPolygon<f64>> {
    let Some(envelope) = engine::envelope(network) else {
        return Ok(MultiPolygon::new(vec![]));
    };
    let boundary = engine::envelope_ring(&envelope);
    let (rings, open): (Vec<LineString<f64>>, Vec<LineString<f64>>) =
        network.iter().cloned().partition(engine::is_closed);

    let mut chords = Vec::with_capacity(open.len() + 1);
    chords.push(boundary.clone());
    chords.extend(open);

    let faces = if chords.len() > 1 {
        engine::polygonize_with(&chords, &cfg.polygonizer, &cfg.engine)
            .map_err(|e| match e {
                Error::PartitionFailed(_) => e,
                other => Error::partition(other.to_string()),
            })?
    } else {
        vec![Polygon::new(boundary, vec![])]
    };
    tracing::debug!(
        rings = rings.len(),
        chords = chords.len(),
        faces = faces.len(),
        "partition"
    );

    Ok(MultiPolygon::new(
        faces.into_iter().map(|f| with_rings(f, &rings)).collect(),
    ))
}

/// Add every ring strictly inside `face` to its holes.
fn with_rings(face: Polygon<f64>, rings: &[LineString<f64>]) -> Polygon<f64> {
    let inside: Vec<LineString<f64>> = rings
        .iter()
        .filter(|r| engine::contains(&face, r))
        .cloned()
        .collect();
    if inside.is_empty() {
        return face;
    }
    let (exterior, mut interiors) = face.into_inner();
    interiors.extend(inside);
    Polygon::new(exterior, interiors)
}
