//! Segment noding: split linework at every mutual intersection.
//!
//! Noding is the engine's `union` for linework. After `node_lines` no two
//! output segments cross or overlap; they meet only at shared endpoints,
//! and those endpoints are bit-identical so graph construction can key on them.
//!
//! Crossings are classified with `geo`'s robust orientation predicates, so two
//! pieces that already share an endpoint never produce an interior split. That
//! makes already-noded linework a fixed point: noding it again returns the
//! same segments, whatever the input order.

use std::collections::{HashMap, HashSet};

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, LineString};
use nalgebra::Vector2;

use crate::cfg::EngineCfg;
use crate::error::{Error, Result};

/// Straight segment between two distinct coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Coord<f64>,
    pub b: Coord<f64>,
}

impl Segment {
    #[inline]
    pub fn new(a: Coord<f64>, b: Coord<f64>) -> Self {
        Self { a, b }
    }

    #[inline]
    fn line(&self) -> Line<f64> {
        Line::new(self.a, self.b)
    }

    /// Position of `c` projected onto the segment, `0` at `a` and `1` at `b`.
    #[inline]
    fn param(&self, c: Coord<f64>) -> f64 {
        let r = vec2(self.b) - vec2(self.a);
        ((vec2(c) - vec2(self.a)).dot(&r) / r.norm_squared()).clamp(0.0, 1.0)
    }
}

#[inline]
fn vec2(c: Coord<f64>) -> Vector2<f64> {
    Vector2::new(c.x, c.y)
}

/// Hashable identity of a coordinate (`-0.0` folded onto `0.0`).
#[inline]
pub(crate) fn coord_key(c: Coord<f64>) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Consecutive vertex pairs of every line; repeated vertices are skipped.
pub fn segments_of(lines: &[LineString<f64>]) -> Vec<Segment> {
    lines
        .iter()
        .flat_map(|l| l.0.windows(2))
        .filter(|w| w[0] != w[1])
        .map(|w| Segment::new(w[0], w[1]))
        .collect()
}

/// Split every segment at its intersections with every other segment and
/// dissolve duplicates.
///
/// Output order follows input order; a dissolved duplicate keeps the direction
/// of its first occurrence.
pub fn node_lines(lines: &[LineString<f64>], cfg: &EngineCfg) -> Result<Vec<Segment>> {
    let segs = segments_of(lines);
    if let Some(bad) = segs
        .iter()
        .flat_map(|s| [s.a, s.b])
        .find(|c| !(c.x.is_finite() && c.y.is_finite()))
    {
        return Err(Error::geometry(format!(
            "non-finite coordinate ({}, {})",
            bad.x, bad.y
        )));
    }

    let mut splits: Vec<Vec<(f64, Coord<f64>)>> = vec![Vec::new(); segs.len()];
    for i in 0..segs.len() {
        for j in (i + 1)..segs.len() {
            intersect(i, j, &segs, &mut splits, cfg);
        }
    }

    let mut snap = SnapIndex::new(cfg.snap_eps);
    let mut seen: HashSet<((u64, u64), (u64, u64))> = HashSet::new();
    let mut out = Vec::with_capacity(segs.len());
    for (seg, mut cuts) in segs.iter().zip(splits) {
        cuts.sort_by(|x, y| x.0.total_cmp(&y.0));
        let mut chain: Vec<Coord<f64>> = Vec::with_capacity(cuts.len() + 2);
        chain.push(snap.snap(seg.a));
        for (_, c) in cuts {
            chain.push(snap.snap(c));
        }
        chain.push(snap.snap(seg.b));
        chain.dedup();
        for w in chain.windows(2) {
            let (ka, kb) = (coord_key(w[0]), coord_key(w[1]));
            let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
            if seen.insert(key) {
                out.push(Segment::new(w[0], w[1]));
            }
        }
    }
    Ok(out)
}

/// Record the split points that segments `i` and `j` induce on each other.
fn intersect(
    i: usize,
    j: usize,
    segs: &[Segment],
    splits: &mut [Vec<(f64, Coord<f64>)>],
    cfg: &EngineCfg,
) {
    let (s, o) = (segs[i], segs[j]);
    match line_intersection(s.line(), o.line()) {
        None => {}
        // Touching at an existing vertex: the vertex is exact.
        Some(LineIntersection::SinglePoint {
            intersection,
            is_proper: false,
        }) => {
            push_interior(&mut splits[i], &s, intersection);
            push_interior(&mut splits[j], &o, intersection);
        }
        Some(LineIntersection::SinglePoint {
            intersection,
            is_proper: true,
        }) => {
            let point = snap_to_vertex(intersection, [s.a, s.b, o.a, o.b], cfg.snap_eps);
            push_interior(&mut splits[i], &s, point);
            push_interior(&mut splits[j], &o, point);
        }
        Some(LineIntersection::Collinear { intersection }) => {
            for c in [intersection.start, intersection.end] {
                push_interior(&mut splits[i], &s, c);
                push_interior(&mut splits[j], &o, c);
            }
        }
    }
}

fn push_interior(cuts: &mut Vec<(f64, Coord<f64>)>, seg: &Segment, c: Coord<f64>) {
    if c != seg.a && c != seg.b {
        cuts.push((seg.param(c), c));
    }
}

/// The nearest of `vertices` within `eps` of `c`, else `c` itself.
fn snap_to_vertex(c: Coord<f64>, vertices: [Coord<f64>; 4], eps: f64) -> Coord<f64> {
    vertices
        .into_iter()
        .map(|v| (v, (vec2(v) - vec2(c)).norm()))
        .filter(|(_, d)| *d <= eps)
        .min_by(|x, y| x.1.total_cmp(&y.1))
        .map_or(c, |(v, _)| v)
}

/// Grid hash that maps coordinates within `eps` of an earlier one onto it.
struct SnapIndex {
    eps: f64,
    cells: HashMap<(i64, i64), Vec<Coord<f64>>>,
}

impl SnapIndex {
    fn new(eps: f64) -> Self {
        Self {
            eps,
            cells: HashMap::new(),
        }
    }

    fn snap(&mut self, c: Coord<f64>) -> Coord<f64> {
        if self.eps <= 0.0 {
            return c;
        }
        let cx = (c.x / self.eps).floor() as i64;
        let cy = (c.y / self.eps).floor() as i64;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) {
                    if let Some(k) = bucket
                        .iter()
                        .find(|k| (vec2(**k) - vec2(c)).norm() <= self.eps)
                    {
                        return *k;
                    }
                }
            }
        }
        self.cells.entry((cx, cy)).or_default().push(c);
        c
    }
}
