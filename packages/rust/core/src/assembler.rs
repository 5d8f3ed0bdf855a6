//! Simulation document assembler.
//!
//! Fills the top-level `input` template with the rendered reactor and region
//! blocks, applies the special-mode archetype splices, then writes the result
//! to disk in one atomic step.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use cyclusgen_fleet::YearMonth;
use cyclusgen_shared::{CyclusGenError, Result, SpecialModes};
use cyclusgen_templates::{Context, TemplateSet};

/// Closing marker of the archetype list; mode archetypes go right before it.
pub const ARCHETYPES_CLOSE: &str = "</archetypes>";

/// Archetype declaration required by the F33 light-water template.
pub const F33_ARCHETYPE: &str = "<spec><lib>f33_reactor.f33_reactor</lib><name>f33_reactor</name></spec>";

/// Archetype declaration required by the depletion-coupled light-water template.
pub const CYBORG_ARCHETYPE: &str = "<spec><lib>cyborg.cyborg_reactor</lib><name>cyborg_reactor</name></spec>";

/// Reprocessing facility entry for the fuel-cycle institution.
pub const REPROCESSING_ENTRY: &str = "        <entry>\n          <number>1</number>\n          <prototype>reprocessing</prototype>\n        </entry>\n";

/// Everything the `input` template needs besides the template itself.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub start: YearMonth,
    /// Simulation length in months.
    pub duration: u32,
    pub reprocessing: bool,
    pub special: SpecialModes,
    /// Reactor blocks, already rendered.
    pub reactor_text: String,
    /// Region blocks, already rendered.
    pub region_text: String,
}

/// Output from a successful document write.
#[derive(Debug, Clone)]
pub struct WriteResult {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Archetype declarations to splice for the given modes, in order.
///
/// The F33 variant replaces the depletion-coupled one when both are set, so
/// only its archetype is needed then.
pub fn mode_archetypes(special: &SpecialModes) -> Vec<&'static str> {
    if special.f33 {
        vec![F33_ARCHETYPE]
    } else if special.cyborg {
        vec![CYBORG_ARCHETYPE]
    } else {
        Vec::new()
    }
}

/// Render the full document text.
#[instrument(skip_all, fields(start = %scenario.start, duration = scenario.duration))]
pub fn assemble_document(templates: &TemplateSet, scenario: &Scenario) -> String {
    let reprocessing = if scenario.reprocessing {
        REPROCESSING_ENTRY
    } else {
        ""
    };

    let ctx = Context::new()
        .with("duration", scenario.duration)
        .with("startyear", scenario.start.year)
        .with("startmonth", scenario.start.month)
        .with("reprocessing", reprocessing)
        .with("reactor_input", &scenario.reactor_text)
        .with("region_input", &scenario.region_text);
    let rendered = templates.input.render(&ctx);

    let extra = mode_archetypes(&scenario.special);
    if extra.is_empty() {
        return rendered;
    }
    debug!(count = extra.len(), "splicing mode archetypes");
    splice_archetypes(&rendered, &extra)
}

/// Insert `specs` immediately before every archetype-list closing marker.
pub fn splice_archetypes(document: &str, specs: &[&str]) -> String {
    let replacement = format!("{}{ARCHETYPES_CLOSE}", specs.concat());
    document.replace(ARCHETYPES_CLOSE, &replacement)
}

/// Fail early when the output path cannot be written.
pub fn check_output_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(CyclusGenError::config(format!(
            "output path '{}' is a directory",
            path.display()
        )));
    }
    let parent = parent_dir(path);
    if !parent.is_dir() {
        return Err(CyclusGenError::config(format!(
            "output directory '{}' does not exist",
            parent.display()
        )));
    }
    Ok(())
}

/// Write the document: temp file in the target directory, then rename over
/// the target.
#[instrument(skip_all, fields(path = %path.display(), bytes = text.len()))]
pub fn write_document(path: &Path, text: &str) -> Result<WriteResult> {
    check_output_path(path)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CyclusGenError::config(format!("output path '{}' has no file name", path.display())))?;
    let temp = parent_dir(path).join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, text).map_err(|e| CyclusGenError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| CyclusGenError::io(path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    info!(path = %path.display(), size = text.len(), "document written");

    Ok(WriteResult {
        path: path.to_path_buf(),
        sha256,
        size_bytes: text.len(),
    })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
