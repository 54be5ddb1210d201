//! Rectangle clipping for linework (Liang–Barsky per segment).

use geo::{Coord, LineString, MultiLineString, Rect};

/// Parts of `lines` inside `rect` (boundary included).
///
/// Consecutive clipped segments of one input line that stay connected are
/// re-joined, so a line that never leaves the rectangle comes back whole.
/// Segments that only graze a corner are dropped.
pub fn clip_to_rect(lines: &MultiLineString<f64>, rect: &Rect<f64>) -> MultiLineString<f64> {
    let mut out: Vec<LineString<f64>> = Vec::new();
    for line in lines {
        let mut current: Vec<Coord<f64>> = Vec::new();
        for seg in line.lines() {
            match clip_segment(seg.start, seg.end, rect) {
                Some((a, b)) => {
                    if current.last() != Some(&a) {
                        flush(&mut current, &mut out);
                        current.push(a);
                    }
                    current.push(b);
                }
                None => flush(&mut current, &mut out),
            }
        }
        flush(&mut current, &mut out);
    }
    MultiLineString::new(out)
}

fn flush(current: &mut Vec<Coord<f64>>, out: &mut Vec<LineString<f64>>) {
    if current.len() >= 2 {
        out.push(LineString::from(std::mem::take(current)));
    } else {
        current.clear();
    }
}

fn clip_segment(p0: Coord<f64>, p1: Coord<f64>, rect: &Rect<f64>) -> Option<(Coord<f64>, Coord<f64>)> {
    let (min, max) = (rect.min(), rect.max());
    let d = p1 - p0;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-d.x, p0.x - min.x),
        (d.x, max.x - p0.x),
        (-d.y, p0.y - min.y),
        (d.y, max.y - p0.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let a = if t0 == 0.0 { p0 } else { p0 + d * t0 };
    let b = if t1 == 1.0 { p1 } else { p0 + d * t1 };
    if a == b {
        None
    } else {
        Some((a, b))
    }
}
