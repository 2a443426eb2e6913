//! Verify command: load a set and print its diagnostics.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use hfsm_engine::{LoadErrorCode, LoadWarning, LoadedSet, SetLoader};

use super::{load_manifest, OutputFormat};

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub path: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SetSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LoadWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
pub struct SetSummary {
    pub name: String,
    pub automatons: usize,
    pub transitions: usize,
    pub start_automaton: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: LoadErrorCode,
    pub message: String,
}

/// Load `set` and build its report. Only manifest problems are errors;
/// load failures are part of the report.
pub fn report(set: &Path, catalog: &Path) -> Result<VerifyReport> {
    let factory = load_manifest(catalog)?.factory::<()>();
    let path = set.display().to_string();

    let report = match SetLoader::new(&factory).load(set) {
        Ok(loaded) => VerifyReport {
            path,
            ok: true,
            summary: Some(summarize(&loaded)),
            warnings: loaded.diagnostics.iter().cloned().collect(),
            error: None,
        },
        Err(err) => VerifyReport {
            path,
            ok: false,
            summary: None,
            warnings: Vec::new(),
            error: Some(ErrorReport {
                code: err.code(),
                message: err.to_string(),
            }),
        },
    };
    Ok(report)
}

pub fn execute(set: &Path, catalog: &Path, format: OutputFormat, strict: bool) -> Result<()> {
    let report = report(set, catalog)?;
    info!(path = %report.path, ok = report.ok, warnings = report.warnings.len(), "set_verified");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    if let Some(error) = &report.error {
        anyhow::bail!("{} failed to load: {}", report.path, error.message);
    }
    if strict && !report.warnings.is_empty() {
        anyhow::bail!("{} has {} warnings", report.path, report.warnings.len());
    }
    Ok(())
}

fn summarize(loaded: &LoadedSet<()>) -> SetSummary {
    let set = &loaded.set;
    SetSummary {
        name: set.name().to_string(),
        automatons: set.len(),
        transitions: set.automatons().iter().map(|a| a.transitions().len()).sum(),
        start_automaton: set
            .start_automaton()
            .and_then(|id| set.automaton(id))
            .map(|a| a.name().to_string())
            .unwrap_or_default(),
    }
}

fn render_text(report: &VerifyReport) -> String {
    let mut out = String::new();
    match (&report.summary, &report.error) {
        (Some(summary), _) => {
            out.push_str(&format!(
                "{}: set {:?}, {} automatons, {} transitions, starts in {:?}\n",
                report.path,
                summary.name,
                summary.automatons,
                summary.transitions,
                summary.start_automaton
            ));
        }
        (None, Some(error)) => {
            out.push_str(&format!("{}: error[{:?}] {}\n", report.path, error.code, error.message));
        }
        (None, None) => {}
    }
    for warning in &report.warnings {
        out.push_str(&format!("  warning: {warning}\n"));
    }
    out
}
