//! End-to-end `generate` pipeline: fleet table → lifecycle → blocks →
//! document → disk.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use cyclusgen_fleet::load_fleet;
use cyclusgen_shared::{FleetUnit, ReactorRecord, Result, ScenarioConfig};
use cyclusgen_templates::TemplateSet;

use crate::assembler::{Scenario, assemble_document, check_output_path, write_document};
use crate::demand::{DemandCurve, DeploymentPlan, NewUnit, capacity_series, plan_deployment};
use crate::lifecycle::LifecycleCalculator;
use crate::reactor::render_reactors;
use crate::region::{group_by_country, render_deployinst, render_regions};

/// Result of the `generate` pipeline.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub output: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
    /// Rows that passed the filter.
    pub units_loaded: usize,
    /// Units with a positive remaining lifetime.
    pub units_deployed: usize,
    /// Countries that produced a region block, in output order.
    pub countries: Vec<String>,
    pub elapsed: std::time::Duration,
}

/// An assembled document before it is written.
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    pub text: String,
    pub units: Vec<FleetUnit>,
    pub countries: Vec<String>,
}

impl BuiltDocument {
    pub fn units_deployed(&self) -> usize {
        self.units.iter().filter(|u| u.lifecycle.is_deployed()).count()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Templates for a run: the configured directory if any, else the built-ins.
pub fn resolve_templates(config: &ScenarioConfig) -> Result<TemplateSet> {
    match &config.template_dir {
        Some(dir) => TemplateSet::from_dir(dir, &config.special),
        None => Ok(TemplateSet::builtin(&config.special)),
    }
}

/// Build the document text from already-loaded records. No I/O.
pub fn build_document(
    config: &ScenarioConfig,
    templates: &TemplateSet,
    records: Vec<ReactorRecord>,
) -> BuiltDocument {
    let calculator = LifecycleCalculator::new(config.start, config.assumed_lifetime);
    let units = calculator.attach(records);
    let requested = &config.filter.countries;

    let reference_country = requested.first().map(String::as_str).unwrap_or_default();
    let reactor_text = render_reactors(templates, &units, reference_country);
    let region_text = render_regions(templates, &units, requested);
    let countries = group_by_country(&units, requested)
        .iter()
        .map(|g| g.country.to_string())
        .collect();

    let scenario = Scenario {
        start: calculator.start(),
        duration: config.duration,
        reprocessing: config.reprocessing,
        special: config.special,
        reactor_text,
        region_text,
    };
    let text = assemble_document(templates, &scenario);

    BuiltDocument {
        text,
        units,
        countries,
    }
}

/// Run the full `generate` pipeline.
///
/// 1. Check the output location and resolve templates
/// 2. Load and filter the fleet table
/// 3. Attach lifecycles, render blocks, assemble
/// 4. Write the document atomically
#[instrument(skip_all, fields(csv = %config.csv_path.display(), out = %config.output.display()))]
pub fn generate(config: &ScenarioConfig, progress: &dyn ProgressReporter) -> Result<GenerateResult> {
    let started = Instant::now();

    progress.phase("Checking configuration");
    check_output_path(&config.output)?;
    let templates = resolve_templates(config)?;

    progress.phase("Loading fleet table");
    let records = load_fleet(&config.csv_path, &config.filter)?;
    let units_loaded = records.len();

    progress.phase("Rendering scenario");
    let built = build_document(config, &templates, records);

    progress.phase("Writing document");
    let written = write_document(&config.output, &built.text)?;

    let result = GenerateResult {
        output: written.path,
        sha256: written.sha256,
        size_bytes: written.size_bytes,
        units_loaded,
        units_deployed: built.units_deployed(),
        countries: built.countries,
        elapsed: started.elapsed(),
    };

    info!(
        units_loaded = result.units_loaded,
        units_deployed = result.units_deployed,
        countries = result.countries.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );
    progress.done(&result);

    Ok(result)
}

/// Result of [`plan_demand`].
#[derive(Debug, Clone)]
pub struct DemandResult {
    /// Installed capacity of the existing fleet per timestep.
    pub existing_mwe: Vec<f64>,
    pub plan: DeploymentPlan,
    /// The plan rendered through the `deployinst` template.
    pub fragment: String,
}

/// Plan new builds of `unit` against `demand`, on top of the configured fleet.
#[instrument(skip_all, fields(csv = %config.csv_path.display(), prototype = %unit.prototype))]
pub fn plan_demand(
    config: &ScenarioConfig,
    demand: &DemandCurve,
    unit: &NewUnit,
    progress: &dyn ProgressReporter,
) -> Result<DemandResult> {
    let templates = resolve_templates(config)?;

    progress.phase("Loading fleet table");
    let records = load_fleet(&config.csv_path, &config.filter)?;

    progress.phase("Planning deployment");
    let units = LifecycleCalculator::new(config.start, config.assumed_lifetime).attach(records);
    let existing_mwe = capacity_series(&units, config.duration as usize);
    let plan = plan_deployment(&existing_mwe, demand, unit)?;
    let fragment = render_deployinst(&templates, &plan.schedule(unit));

    info!(total_builds = plan.total_builds(), "demand plan complete");
    Ok(DemandResult {
        existing_mwe,
        plan,
        fragment,
    })
}
