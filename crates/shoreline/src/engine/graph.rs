//! Planar graph over noded segments: line merging and face tracing.
//!
//! Nodes are keyed on exact coordinate bits, so the input must come from
//! `noding::node_lines` (or be otherwise guaranteed to meet only at shared
//! vertices).

use std::collections::HashMap;

use geo::{Area, BoundingRect, Contains, Coord, LineString, Point, Polygon};

use super::noding::{coord_key, Segment};

/// Undirected graph; edge `e` yields half-edges `2e` (a→b) and `2e+1` (b→a).
#[derive(Clone, Debug, Default)]
pub(crate) struct PlanarGraph {
    pub nodes: Vec<Coord<f64>>,
    pub edges: Vec<(usize, usize)>,
    pub incident: Vec<Vec<usize>>,
}

impl PlanarGraph {
    pub fn from_segments(segs: &[Segment]) -> Self {
        let mut g = PlanarGraph::default();
        let mut lookup: HashMap<(u64, u64), usize> = HashMap::new();
        for s in segs {
            let a = g.node(&mut lookup, s.a);
            let b = g.node(&mut lookup, s.b);
            if a == b {
                continue;
            }
            let e = g.edges.len();
            g.edges.push((a, b));
            g.incident[a].push(e);
            g.incident[b].push(e);
        }
        g
    }

    fn node(&mut self, lookup: &mut HashMap<(u64, u64), usize>, c: Coord<f64>) -> usize {
        *lookup.entry(coord_key(c)).or_insert_with(|| {
            self.nodes.push(c);
            self.incident.push(Vec::new());
            self.nodes.len() - 1
        })
    }

    #[inline]
    fn other_end(&self, edge: usize, node: usize) -> usize {
        let (a, b) = self.edges[edge];
        if a == node {
            b
        } else {
            a
        }
    }

    #[inline]
    fn origin(&self, half: usize) -> usize {
        let (a, b) = self.edges[half / 2];
        if half % 2 == 0 {
            a
        } else {
            b
        }
    }

    #[inline]
    fn dest(&self, half: usize) -> usize {
        self.origin(half ^ 1)
    }

    /// Follow a chain from `start` along `first` through degree-2 nodes.
    fn walk_chain(&self, start: usize, first: usize, used: &mut [bool]) -> LineString<f64> {
        let mut coords = vec![self.nodes[start]];
        let mut node = start;
        let mut edge = first;
        loop {
            used[edge] = true;
            node = self.other_end(edge, node);
            coords.push(self.nodes[node]);
            if self.incident[node].len() != 2 {
                break;
            }
            match self.incident[node].iter().find(|&&e| !used[e]) {
                Some(&e) => edge = e,
                None => break,
            }
        }
        LineString::from(coords)
    }
}

/// Merge segments into maximal lines that only end at nodes of degree != 2.
/// Components made only of degree-2 nodes come back as closed lines.
pub fn line_merge(segs: &[Segment]) -> Vec<LineString<f64>> {
    let g = PlanarGraph::from_segments(segs);
    let mut used = vec![false; g.edges.len()];
    let mut out = Vec::new();
    for node in 0..g.nodes.len() {
        if g.incident[node].len() == 2 {
            continue;
        }
        for &e in &g.incident[node] {
            if !used[e] {
                out.push(g.walk_chain(node, e, &mut used));
            }
        }
    }
    for e in 0..g.edges.len() {
        if !used[e] {
            let start = g.edges[e].0;
            out.push(g.walk_chain(start, e, &mut used));
        }
    }
    out
}

/// Faces of the planar subdivision spanned by `segs`.
///
/// Dangles and cut edges bound no face and are dropped. Counter-clockwise
/// rings become shells; clockwise rings are outlines of connected components
/// and become holes of the smallest shell that encloses them (or vanish when
/// nothing does: that is the unbounded face).
pub fn trace_faces(segs: &[Segment]) -> Vec<Polygon<f64>> {
    let g = PlanarGraph::from_segments(segs);
    let mut alive = vec![true; g.edges.len()];
    loop {
        prune_dangles(&g, &mut alive);
        let rings = trace_rings(&g, &alive);
        let mut face_of = vec![usize::MAX; g.edges.len() * 2];
        for (f, ring) in rings.iter().enumerate() {
            for &h in ring {
                face_of[h] = f;
            }
        }
        let mut cut = false;
        for e in 0..g.edges.len() {
            if alive[e] && face_of[2 * e] == face_of[2 * e + 1] {
                alive[e] = false;
                cut = true;
            }
        }
        if !cut {
            return assemble(&g, &rings);
        }
    }
}

fn prune_dangles(g: &PlanarGraph, alive: &mut [bool]) {
    let mut degree: Vec<usize> = g
        .incident
        .iter()
        .map(|es| es.iter().filter(|&&e| alive[e]).count())
        .collect();
    let mut stack: Vec<usize> = (0..g.nodes.len()).filter(|&n| degree[n] == 1).collect();
    while let Some(n) = stack.pop() {
        for &e in &g.incident[n] {
            if !alive[e] {
                continue;
            }
            alive[e] = false;
            degree[n] -= 1;
            let m = g.other_end(e, n);
            degree[m] -= 1;
            if degree[m] == 1 {
                stack.push(m);
            }
        }
    }
}

/// Orbits of `next` over live half-edges; each orbit keeps its face on the left.
fn trace_rings(g: &PlanarGraph, alive: &[bool]) -> Vec<Vec<usize>> {
    // Outgoing half-edges per node, counter-clockwise by angle.
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); g.nodes.len()];
    for e in (0..g.edges.len()).filter(|&e| alive[e]) {
        outgoing[g.edges[e].0].push(2 * e);
        outgoing[g.edges[e].1].push(2 * e + 1);
    }
    let angle = |h: usize| {
        let (o, d) = (g.nodes[g.origin(h)], g.nodes[g.dest(h)]);
        (d.y - o.y).atan2(d.x - o.x)
    };
    let mut slot = vec![0usize; g.edges.len() * 2];
    for out in outgoing.iter_mut() {
        out.sort_by(|&x, &y| angle(x).total_cmp(&angle(y)));
        for (k, &h) in out.iter().enumerate() {
            slot[h] = k;
        }
    }
    // Next half-edge: the one clockwise from the twin at the destination.
    let next = |h: usize| {
        let twin = h ^ 1;
        let out = &outgoing[g.origin(twin)];
        out[(slot[twin] + out.len() - 1) % out.len()]
    };

    let mut visited = vec![false; g.edges.len() * 2];
    let mut rings = Vec::new();
    for h in 0..g.edges.len() * 2 {
        if !alive[h / 2] || visited[h] {
            continue;
        }
        let mut ring = Vec::new();
        let mut cur = h;
        loop {
            visited[cur] = true;
            ring.push(cur);
            cur = next(cur);
            if cur == h {
                break;
            }
        }
        rings.push(ring);
    }
    rings
}

fn assemble(g: &PlanarGraph, rings: &[Vec<usize>]) -> Vec<Polygon<f64>> {
    let mut shells: Vec<Polygon<f64>> = Vec::new();
    let mut holes: Vec<LineString<f64>> = Vec::new();
    for ring in rings {
        let mut coords: Vec<Coord<f64>> = ring.iter().map(|&h| g.nodes[g.origin(h)]).collect();
        coords.push(coords[0]);
        let line = LineString::from(coords);
        let signed = Polygon::new(line.clone(), vec![]).signed_area();
        if signed > 0.0 {
            shells.push(Polygon::new(line, vec![]));
        } else if signed < 0.0 {
            holes.push(line);
        }
    }

    let areas: Vec<f64> = shells.iter().map(|s| s.unsigned_area()).collect();
    let mut assigned: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
    for hole in holes {
        let probe = Point::from(hole.0[0]);
        let owner = shells
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.bounding_rect()
                    .map_or(false, |r| hole.bounding_rect().map_or(false, |h| covers(&r, &h)))
            })
            .filter(|(_, s)| s.contains(&probe))
            .min_by(|(a, _), (b, _)| areas[*a].total_cmp(&areas[*b]))
            .map(|(k, _)| k);
        if let Some(k) = owner {
            assigned[k].push(hole);
        }
    }
    shells
        .into_iter()
        .zip(assigned)
        .map(|(shell, interiors)| {
            let (exterior, _) = shell.into_inner();
            Polygon::new(exterior, interiors)
        })
        .collect()
}

#[inline]
fn covers(outer: &geo::Rect<f64>, inner: &geo::Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}
