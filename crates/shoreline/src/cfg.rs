//! Tolerances and backend selection.
//!
//! - `EngineCfg`: centralizes the epsilons used by noding and predicates.
//! - `Polygonizer`: which planar-subdivision backend the partitioner calls.
//! - `AnalysisCfg`: everything one review run needs.

use std::path::PathBuf;

/// Geometry engine configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct EngineCfg {
    /// Computed crossing points closer than this to a segment endpoint, or to
    /// an earlier node, snap onto it.
    pub snap_eps: f64,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self { snap_eps: 1e-9 }
    }
}

/// Planar-subdivision backend.
#[derive(Clone, Debug, Default)]
pub enum Polygonizer {
    /// Half-edge face tracing inside this process.
    #[default]
    InProcess,
    /// Separately built executable: reads a WKT file named by its single
    /// argument, prints the faces as WKT on stdout.
    External { program: PathBuf },
}

/// Configuration for one analysis run.
#[derive(Clone, Debug, Default)]
pub struct AnalysisCfg {
    pub engine: EngineCfg,
    pub polygonizer: Polygonizer,
}
