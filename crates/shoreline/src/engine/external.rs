//! Out-of-process polygonizer handshake.
//!
//! The chord set is written as a WKT MULTILINESTRING to a temporary file whose
//! path is the program's only argument; the program prints the faces as WKT
//! (POLYGON, MULTIPOLYGON, or a GEOMETRYCOLLECTION of those) on stdout. The
//! temporary file is removed when `NamedTempFile` drops, on every path out.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use geo::{Geometry, LineString, MultiLineString, Polygon};
use tempfile::NamedTempFile;
use wkt::{ToWkt, TryFromWkt};

use crate::adapter::kind_name;
use crate::error::{Error, Result};

pub fn polygonize_external(program: &Path, lines: &[LineString<f64>]) -> Result<Vec<Polygon<f64>>> {
    let chords = Geometry::MultiLineString(MultiLineString::new(lines.to_vec()));
    let mut file = NamedTempFile::new()
        .map_err(|e| Error::partition(format!("creating polygonizer input: {e}")))?;
    let written = file.write_all(chords.wkt_string().as_bytes());
    if let Err(e) = written.and_then(|_| file.flush()) {
        return Err(Error::partition(format!("writing {}: {e}", file.path().display())));
    }

    tracing::debug!(program = %program.display(), input = %file.path().display(), "polygonize_external");
    let output = Command::new(program)
        .arg(file.path())
        .output()
        .map_err(|e| Error::partition(format!("running {}: {e}", program.display())))?;
    if !output.status.success() {
        return Err(Error::partition(format!(
            "{} exited with status {:?}: {}",
            program.display(),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    let text = String::from_utf8(output.stdout)
        .map_err(|e| Error::partition(format!("polygonizer output is not UTF-8: {e}")))?;
    let faces = Geometry::<f64>::try_from_wkt_str(text.trim())
        .map_err(|e| Error::partition(format!("parsing polygonizer output: {e}")))?;
    polygons_of(faces)
}

fn polygons_of(geometry: Geometry<f64>) -> Result<Vec<Polygon<f64>>> {
    match geometry {
        Geometry::Polygon(p) => Ok(vec![p]),
        Geometry::MultiPolygon(mp) => Ok(mp.0),
        Geometry::GeometryCollection(gc) => {
            let mut out = Vec::new();
            for g in gc.0 {
                out.extend(polygons_of(g)?);
            }
            Ok(out)
        }
        other => Err(Error::partition(format!(
            "polygonizer returned {}, expected polygons",
            kind_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn chords() -> Vec<LineString<f64>> {
        vec![line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0)]]
    }

    #[test]
    fn missing_program_is_partition_failure() {
        let err = polygonize_external(Path::new("/nonexistent/polygonize-bin"), &chords()).unwrap_err();
        assert!(matches!(err, Error::PartitionFailed(_)), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn echoed_linework_is_rejected() {
        // `cat` hands the MULTILINESTRING straight back, which is not a face set.
        let err = polygonize_external(Path::new("cat"), &chords()).unwrap_err();
        match err {
            Error::PartitionFailed(msg) => assert!(msg.contains("MultiLineString"), "{msg}"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn collections_flatten_to_polygons() {
        let wkt = "GEOMETRYCOLLECTION(POLYGON((0 0,1 0,1 1,0 0)),MULTIPOLYGON(((2 2,3 2,3 3,2 2))))";
        let g = Geometry::<f64>::try_from_wkt_str(wkt).unwrap();
        assert_eq!(polygons_of(g).unwrap().len(), 2);
    }
}
