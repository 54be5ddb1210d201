use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::*;
use shoreline::{Analysis, AnalysisCfg, AreaReport, EngineCfg, Polygonizer, Report};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod provenance;

#[derive(Parser, Debug)]
#[command(name = "shoreline")]
#[command(about = "Compare detected shoreline linework against a baseline survey")]
struct Cmd {
    /// Detected linework (GeoJSON) [default: test/detected.geojson]
    #[arg(requires = "baseline")]
    detected: Option<PathBuf>,

    /// Baseline survey (GeoJSON FeatureCollection) [default: test/baseline.geojson]
    baseline: Option<PathBuf>,

    /// Snap distance for intersection points near segment endpoints
    #[arg(long, default_value_t = 1e-9)]
    snap_eps: f64,

    /// External polygonizer executable (reads a WKT file, prints WKT faces)
    #[arg(long)]
    polygonizer: Option<PathBuf>,

    /// Write the area reports as CSV, or Parquet for a `.parquet` path
    #[arg(long)]
    areas_out: Option<PathBuf>,

    /// Pretty-print the output feature collection
    #[arg(long)]
    pretty: bool,
}

impl Cmd {
    /// Both input paths; given together or not at all.
    fn inputs(&self) -> (PathBuf, PathBuf) {
        match (&self.detected, &self.baseline) {
            (Some(detected), Some(baseline)) => (detected.clone(), baseline.clone()),
            _ => (
                PathBuf::from("test/detected.geojson"),
                PathBuf::from("test/baseline.geojson"),
            ),
        }
    }

    fn cfg(&self) -> AnalysisCfg {
        AnalysisCfg {
            engine: EngineCfg {
                snap_eps: self.snap_eps,
            },
            polygonizer: match &self.polygonizer {
                Some(program) => Polygonizer::External {
                    program: program.clone(),
                },
                None => Polygonizer::InProcess,
            },
        }
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    run(Cmd::parse())
}

fn run(cmd: Cmd) -> Result<()> {
    let (detected, baseline) = cmd.inputs();
    tracing::info!(
        detected = %detected.display(),
        baseline = %baseline.display(),
        snap_eps = cmd.snap_eps,
        polygonizer = ?cmd.polygonizer,
        "run"
    );
    let analysis = Analysis::new(cmd.cfg());
    let report = analysis
        .run_files(&detected, &baseline)
        .with_context(|| {
            format!(
                "comparing {} against {}",
                detected.display(),
                baseline.display()
            )
        })?;

    let out = if cmd.pretty {
        serde_json::to_string_pretty(&report.collection)?
    } else {
        serde_json::to_string(&report.collection)?
    };
    println!("{out}");

    if let Some(path) = &cmd.areas_out {
        write_areas(path, &report)?;
        let params = serde_json::json!({
            "detected": detected,
            "baseline": baseline,
            "snap_eps": cmd.snap_eps,
            "polygonizer": cmd.polygonizer,
        });
        let sidecar = provenance::write_sidecar(path, params)?;
        tracing::info!(areas = %path.display(), provenance = %sidecar.display(), "areas_out");
    }
    Ok(())
}

fn area_frame(report: &Report) -> PolarsResult<DataFrame> {
    let rows: [(&str, &AreaReport); 2] = [
        ("detected", &report.detected_areas),
        ("baseline", &report.baseline_areas),
    ];
    df!(
        "dataset" => rows.map(|(name, _)| name),
        "positive" => rows.map(|(_, r)| r.positive),
        "negative" => rows.map(|(_, r)| r.negative),
        "difference" => rows.map(|(_, r)| r.difference),
        "total" => rows.map(|(_, r)| r.total),
        "face_count" => rows.map(|(_, r)| r.face_count as u64),
    )
}

fn write_areas(path: &Path, report: &Report) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut df = area_frame(report)?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => {
            ParquetWriter::new(file).finish(&mut df)?;
        }
        _ => {
            CsvWriter::new(file).finish(&mut df)?;
        }
    }
    Ok(())
}
