//! Polarity Grapher: land/water sign per face from adjacency depth.
//!
//! Faces live in an index arena. Face 0 is terminal. Scanning faces in index
//! order, every not-yet-linked face `j >= 1` that touches the current face
//! takes it as parent. A face's polarity is the parity of its parent-walk
//! length to the terminal face:
//! - even: `total_area` counts positive, the hole area (`boundary - total`)
//!   counts negative;
//! - odd: the reverse.
//!
//! A walk that reaches an unlinked non-terminal face, or that revisits faces,
//! means the faces do not form a single forest rooted at face 0; that is an
//! `InvariantViolation`, never a silent guess.

use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::engine;
use crate::error::{Error, Result};

/// One face of the partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub index: usize,
    /// Area with holes removed.
    pub total_area: f64,
    /// Area inside the outer boundary, holes ignored.
    pub boundary_area: f64,
    pub is_terminal: bool,
    pub parent: Option<usize>,
}

/// Aggregate signed areas of one partition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaReport {
    pub positive: f64,
    pub negative: f64,
    /// `positive - negative`
    pub difference: f64,
    /// `positive + negative`
    pub total: f64,
    pub face_count: usize,
}

impl AreaReport {
    fn from_sums(positive: f64, negative: f64, face_count: usize) -> Self {
        Self {
            positive,
            negative,
            difference: positive - negative,
            total: positive + negative,
            face_count,
        }
    }
}

/// Adjacency forest over the faces of one partition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceForest {
    pub faces: Vec<Face>,
}

impl FaceForest {
    pub fn build(partition: &MultiPolygon<f64>) -> Self {
        let polys: &[Polygon<f64>] = &partition.0;
        let mut faces: Vec<Face> = polys
            .iter()
            .enumerate()
            .map(|(index, p)| Face {
                index,
                total_area: engine::area(p),
                boundary_area: engine::area(&engine::shell(p)),
                is_terminal: index == 0,
                parent: None,
            })
            .collect();
        for i in 0..polys.len() {
            for j in 1..polys.len() {
                if i == j || faces[j].parent.is_some() {
                    continue;
                }
                if engine::touches(&polys[j], &polys[i]) {
                    faces[j].parent = Some(i);
                }
            }
        }
        Self { faces }
    }

    /// Number of parent links from `index` to the terminal face.
    pub fn depth(&self, index: usize) -> Result<usize> {
        let mut current = index;
        let mut steps = 0usize;
        while !self.faces[current].is_terminal {
            current = self.faces[current].parent.ok_or_else(|| {
                Error::invariant(format!(
                    "face {current} is neither terminal nor linked (reached from face {index})"
                ))
            })?;
            steps += 1;
            if steps > self.faces.len() {
                return Err(Error::invariant(format!(
                    "parent walk from face {index} does not reach the terminal face"
                )));
            }
        }
        Ok(steps)
    }

    pub fn areas(&self) -> Result<AreaReport> {
        let (mut positive, mut negative) = (0.0, 0.0);
        for face in &self.faces {
            let holes = face.boundary_area - face.total_area;
            if self.depth(face.index)? % 2 == 0 {
                positive += face.total_area;
                negative += holes;
            } else {
                negative += face.total_area;
                positive += holes;
            }
        }
        Ok(AreaReport::from_sums(positive, negative, self.faces.len()))
    }
}
