//! Review orchestration: the qualitative and quantitative comparisons and the
//! stage-labelled pipeline that runs them.
//!
//! Stages, in order: read, parse, join (network construction), clip,
//! qualitative, quantitative. The first failing stage aborts the run and is
//! named in the returned [`StageError`].

use std::fmt;
use std::fs;
use std::path::Path;

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::cfg::AnalysisCfg;
use crate::error::{Error, Result};
use crate::matcher::{self, CandidatePool};
use crate::partition::partition;
use crate::polarity::{AreaReport, FaceForest};
use crate::scene::Scene;

/// Match every baseline feature against the detected network.
pub fn qualitative_review(detected: &Scene, baseline: &Scene) -> Result<FeatureCollection> {
    let features = baseline.features()?;
    let pool = CandidatePool::from_network(detected.network()?);
    let candidates = pool.len();
    let matched = matcher::match_features(features, pool)?;
    tracing::debug!(baseline = features.len(), candidates, output = matched.len(), "qualitative");
    Ok(matcher::into_collection(matched))
}

/// Signed land/water areas implied by one scene's network.
pub fn quantitative_review(scene: &Scene, cfg: &AnalysisCfg) -> Result<AreaReport> {
    let faces = partition(scene.network()?, cfg)?;
    let report = FaceForest::build(&faces).areas()?;
    tracing::info!(
        positive = report.positive,
        negative = report.negative,
        difference = report.difference,
        total = report.total,
        faces = report.face_count,
        "quantitative"
    );
    Ok(report)
}

/// Pipeline stage, used to label failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Read,
    Parse,
    Join,
    Clip,
    Qualitative,
    Quantitative,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Parse => "parse",
            Stage::Join => "join",
            Stage::Clip => "clip",
            Stage::Qualitative => "qualitative",
            Stage::Quantitative => "quantitative",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|source| StageError { stage, source })
    }
}

/// Everything one run produces.
#[derive(Clone, Debug)]
pub struct Report {
    pub collection: FeatureCollection,
    pub detected_areas: AreaReport,
    pub baseline_areas: AreaReport,
}

/// One configured review run.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    cfg: AnalysisCfg,
}

impl Analysis {
    pub fn new(cfg: AnalysisCfg) -> Self {
        Self { cfg }
    }

    /// Read and parse one dataset.
    pub fn load(&self, path: &Path) -> std::result::Result<Scene, StageError> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::input(format!("reading {}: {e}", path.display())))
            .at(Stage::Read)?;
        Scene::parse(&text, self.cfg.engine).at(Stage::Parse)
    }

    /// Run every stage after parsing.
    ///
    /// The baseline network is clipped to the detected envelope before the
    /// areas are computed; matching reads the baseline features, which the
    /// clip does not touch.
    pub fn run(&self, detected: &Scene, baseline: &mut Scene) -> std::result::Result<Report, StageError> {
        detected.network().at(Stage::Join)?;
        baseline.network().at(Stage::Join)?;
        baseline.clip(detected).at(Stage::Clip)?;
        let collection = qualitative_review(detected, baseline).at(Stage::Qualitative)?;
        let detected_areas = quantitative_review(detected, &self.cfg).at(Stage::Quantitative)?;
        let baseline_areas = quantitative_review(baseline, &self.cfg).at(Stage::Quantitative)?;
        Ok(Report {
            collection,
            detected_areas,
            baseline_areas,
        })
    }

    pub fn run_files(&self, detected: &Path, baseline: &Path) -> std::result::Result<Report, StageError> {
        let detected = self.load(detected)?;
        let mut baseline = self.load(baseline)?;
        self.run(&detected, &mut baseline)
    }
}
