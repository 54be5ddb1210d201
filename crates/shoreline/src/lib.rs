//! Shoreline-change analysis.
//!
//! Compares a detected shoreline against a baseline survey:
//! - qualitative: which baseline features reappear (`Detected`), which vanish
//!   (`Undetected`), and which detected linework is new (`New Detection`);
//! - quantitative: signed land/water area from partitioning a line network
//!   into faces and inferring each face's polarity.
//!
//! Pipeline: GeoJSON → [`Scene`] (canonical Line Network) → clip baseline to
//! the detected envelope → [`matcher`] and, per scene, [`partition`] →
//! [`polarity`].
//!
//! API Policy
//! - The workspace CLI is the only consumer; there is no stable public API.

pub mod adapter;
pub mod cfg;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod partition;
pub mod polarity;
pub mod review;
pub mod scene;
pub mod schema;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{AnalysisCfg, EngineCfg, Polygonizer};
pub use error::{Error, Result};
pub use polarity::{AreaReport, Face, FaceForest};
pub use review::{qualitative_review, quantitative_review, Analysis, Report, Stage, StageError};
pub use scene::Scene;
pub use schema::{Detection, OffsetStats, PropertyKey};

/// Common exports for callers.
pub mod prelude {
    pub use crate::matcher::{canonical_line, find_match, match_features, CandidatePool, Match};
    pub use crate::partition::partition;
    pub use crate::review::{qualitative_review, quantitative_review, Analysis, Report, Stage};
    pub use crate::schema::{detection_of, stats_of, Detection, OffsetStats, PropertyKey};
    pub use crate::{AnalysisCfg, AreaReport, EngineCfg, FaceForest, Polygonizer, Scene};
}
