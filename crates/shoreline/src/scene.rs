//! One linework dataset and its canonical Line Network.
//!
//! The network is the noded union of every line and ring in the document
//! (polygons contribute their exterior ring only), merged into maximal simple
//! lines. It is built on first use and cached; `clip` replaces the cache.

use std::cell::OnceCell;
use std::fs;
use std::path::Path;

use geo::{Geometry, LineString, MultiLineString, Rect};
use geojson::{Feature, GeoJson};

use crate::adapter;
use crate::cfg::EngineCfg;
use crate::engine;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct Scene {
    doc: GeoJson,
    cfg: EngineCfg,
    network: OnceCell<MultiLineString<f64>>,
}

impl Scene {
    pub fn new(doc: GeoJson, cfg: EngineCfg) -> Self {
        Self {
            doc,
            cfg,
            network: OnceCell::new(),
        }
    }

    /// Parse a GeoJSON document.
    pub fn parse(text: &str, cfg: EngineCfg) -> Result<Self> {
        let doc: GeoJson = text.parse()?;
        Ok(Self::new(doc, cfg))
    }

    /// Read and parse a GeoJSON file.
    pub fn read(path: impl AsRef<Path>, cfg: EngineCfg) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::input(format!("reading {}: {e}", path.display())))?;
        Self::parse(&text, cfg)
    }

    /// Canonical Line Network, computed on first call.
    pub fn network(&self) -> Result<&MultiLineString<f64>> {
        if let Some(network) = self.network.get() {
            return Ok(network);
        }
        let built = build_network(&self.doc, &self.cfg)?;
        Ok(self.network.get_or_init(|| built))
    }

    /// Input features in document order.
    pub fn features(&self) -> Result<&[Feature]> {
        match &self.doc {
            GeoJson::FeatureCollection(fc) => Ok(&fc.features),
            GeoJson::Feature(_) => Err(Error::type_mismatch(
                "expected a FeatureCollection, found a Feature",
            )),
            GeoJson::Geometry(_) => Err(Error::type_mismatch(
                "expected a FeatureCollection, found a bare Geometry",
            )),
        }
    }

    /// Bounding rectangle of the network; `None` when the network is empty.
    pub fn envelope(&self) -> Result<Option<Rect<f64>>> {
        Ok(engine::envelope(self.network()?))
    }

    /// Restrict this scene's network to the envelope of `other`.
    ///
    /// Baseline linework outside the detection footprint would otherwise be
    /// scored as vanished shoreline. An empty `other` leaves nothing.
    pub fn clip(&mut self, other: &Scene) -> Result<()> {
        let clipped = match other.envelope()? {
            Some(rect) => engine::clip_to_rect(self.network()?, &rect),
            None => MultiLineString::new(vec![]),
        };
        tracing::debug!(lines = clipped.0.len(), "clip");
        self.network = OnceCell::from(clipped);
        Ok(())
    }
}

fn build_network(doc: &GeoJson, cfg: &EngineCfg) -> Result<MultiLineString<f64>> {
    let geometries = adapter::document_geometries(doc)?;
    let mut lines = Vec::new();
    for g in &geometries {
        collect_linework(g, &mut lines);
    }
    let network = engine::union_lines(&lines, cfg)?;
    tracing::debug!(
        geometries = geometries.len(),
        input_lines = lines.len(),
        network_lines = network.0.len(),
        "network"
    );
    Ok(network)
}

/// Leaf lines and rings of `geometry`; polygons give their exterior ring.
pub(crate) fn collect_linework(geometry: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        Geometry::Line(l) => out.push(LineString::from(vec![l.start, l.end])),
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => out.extend(mls.iter().cloned()),
        Geometry::Polygon(p) => out.push(p.exterior().clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.iter().map(|p| p.exterior().clone())),
        Geometry::Rect(r) => out.push(r.to_polygon().exterior().clone()),
        Geometry::Triangle(t) => out.push(t.to_polygon().exterior().clone()),
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                collect_linework(g, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn scene(text: &str) -> Scene {
        Scene::parse(text, EngineCfg::default()).unwrap()
    }

    const TWO_HALVES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[0,0],[5,0]]}},
        {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[5,0],[10,2]]}}
    ]}"#;

    #[test]
    fn network_merges_touching_lines() {
        let s = scene(TWO_HALVES);
        let n = s.network().unwrap();
        assert_eq!(n.0.len(), 1);
        assert_eq!(n.0[0].0.len(), 3);
    }

    #[test]
    fn network_is_cached() {
        let s = scene(TWO_HALVES);
        let first = s.network().unwrap() as *const _;
        let second = s.network().unwrap() as *const _;
        assert_eq!(first, second);
    }

    #[test]
    fn polygon_contributes_only_its_shell() {
        let s = scene(
            r#"{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]],[[2,2],[4,2],[4,4],[2,2]]]}"#,
        );
        let n = s.network().unwrap();
        assert_eq!(n.0.len(), 1);
        assert!(n.0[0].is_closed());
    }

    #[test]
    fn empty_collection_gives_empty_network() {
        let s = scene(r#"{"type":"FeatureCollection","features":[]}"#);
        assert!(s.network().unwrap().0.is_empty());
        assert!(s.envelope().unwrap().is_none());
    }

    #[test]
    fn features_require_a_collection() {
        let s = scene(r#"{"type":"Feature","properties":null,"geometry":{"type":"Point","coordinates":[1,2]}}"#);
        assert!(matches!(s.features(), Err(Error::TypeMismatch(_))));
        assert_eq!(scene(TWO_HALVES).features().unwrap().len(), 2);
    }

    #[test]
    fn bad_json_is_input_error() {
        assert!(matches!(
            Scene::parse("{not json", EngineCfg::default()),
            Err(Error::Input(_))
        ));
    }

    #[test]
    fn clip_restricts_to_other_envelope() {
        let mut baseline = scene(
            r#"{"type":"LineString","coordinates":[[-10,1],[30,1]]}"#,
        );
        let detected = scene(
            r#"{"type":"LineString","coordinates":[[0,0],[10,5]]}"#,
        );
        baseline.clip(&detected).unwrap();
        let env = baseline.envelope().unwrap().unwrap();
        assert_eq!(env.min(), Coord { x: 0.0, y: 1.0 });
        assert_eq!(env.max(), Coord { x: 10.0, y: 1.0 });
    }

    #[test]
    fn clip_against_empty_scene_empties_network() {
        let mut baseline = scene(TWO_HALVES);
        let empty = scene(r#"{"type":"FeatureCollection","features":[]}"#);
        baseline.clip(&empty).unwrap();
        assert!(baseline.network().unwrap().0.is_empty());
    }
}
