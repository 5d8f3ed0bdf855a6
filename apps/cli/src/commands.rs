//! CLI command definitions, routing, and tracing setup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use cyclusgen_core::catalog::{REFERENCE_CLASSES, catalog_view};
use cyclusgen_core::demand::{DemandCurve, NewUnit};
use cyclusgen_core::pipeline::{GenerateResult, ProgressReporter};
use cyclusgen_core::{BUILTIN_FILES, parse_required_date};
use cyclusgen_shared::{
    AppConfig, FilterConfig, ScenarioConfig, SpecialModes, init_config, load_config,
    load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// cyclusgen: turn a reactor fleet table into a Cyclus input document.
#[derive(Parser)]
#[command(
    name = "cyclusgen",
    version,
    about = "Generate Cyclus simulation input from a PRIS-style reactor fleet CSV.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Options shared by every command that reads the fleet table.
#[derive(Args, Debug, Clone)]
pub(crate) struct ScenarioArgs {
    /// Fleet CSV (one metadata line, a header row, then one row per unit).
    pub csv: PathBuf,

    /// Simulation start date (YYYYMMDD, YYYY-MM-DD, MM/DD/YYYY or YYYY).
    #[arg(long)]
    pub start: Option<String>,

    /// Simulation duration in months.
    #[arg(long)]
    pub duration: Option<u32>,

    /// Country to include; repeat for several. Output follows this order.
    #[arg(long = "country", value_name = "COUNTRY")]
    pub countries: Vec<String>,

    /// Lifetime in months for units without a shutdown date.
    #[arg(long)]
    pub assumed_lifetime: Option<i32>,

    /// Special modes, comma separated: cyborg, f33.
    #[arg(long)]
    pub special: Option<String>,

    /// Directory whose template files override the built-ins.
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Config file to use instead of ~/.cyclusgen/cyclusgen.toml.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Demand curve shapes accepted on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum CurveKind {
    Constant,
    Linear,
    Exponential,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a complete simulation input document.
    Generate {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Output document path.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Leave the reprocessing facility out of the fuel-cycle region.
        #[arg(long)]
        no_reprocessing: bool,
    },

    /// Print the reactor spec catalog and reference classes.
    Catalog {
        /// Print JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },

    /// Plan builds of a new prototype to meet a power demand curve.
    Demand {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Demand curve shape.
        #[arg(long, value_enum, default_value = "constant")]
        curve: CurveKind,

        /// Demand at timestep 0, MWe.
        #[arg(long)]
        base_mwe: f64,

        /// MWe per month for a linear curve, or annual growth fraction for an
        /// exponential one.
        #[arg(long, default_value_t = 0.0)]
        growth: f64,

        /// Prototype to deploy.
        #[arg(long, default_value = "AP1000")]
        prototype: String,

        /// Prototype power, MWe. Defaults to the reference class capacity.
        #[arg(long)]
        power_mwe: Option<f64>,

        /// Months each build operates.
        #[arg(long, default_value_t = 720)]
        lifetime: u32,

        /// Timestep from which the prototype can be built.
        #[arg(long, default_value_t = 0)]
        available_from: usize,

        /// Treat the prototype as a legacy design buildable only before
        /// --available-from.
        #[arg(long)]
        legacy: bool,

        /// Write the deployment fragment here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Template management.
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Template subcommands.
#[derive(Subcommand)]
pub(crate) enum TemplatesAction {
    /// Write the built-in templates into a directory for editing.
    Dump {
        /// Target directory (created if missing).
        dir: PathBuf,

        /// Overwrite files that already exist.
        #[arg(long)]
        force: bool,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "cyclusgen=info",
        1 => "cyclusgen=debug",
        _ => "cyclusgen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            scenario,
            out,
            no_reprocessing,
        } => cmd_generate(&scenario, out, no_reprocessing),
        Command::Catalog { json } => cmd_catalog(json),
        Command::Demand {
            scenario,
            curve,
            base_mwe,
            growth,
            prototype,
            power_mwe,
            lifetime,
            available_from,
            legacy,
            out,
        } => {
            let demand = demand_curve(curve, base_mwe, growth);
            let unit = NewUnit {
                power_mwe: power_mwe
                    .or_else(|| reference_power(&prototype))
                    .ok_or_else(|| eyre!("no reference class named '{prototype}', pass --power-mwe"))?,
                prototype,
                lifetime,
                available_from,
                new_design: !legacy,
            };
            cmd_demand(&scenario, &demand, &unit, out.as_deref())
        }
        Command::Templates { action } => match action {
            TemplatesAction::Dump { dir, force } => cmd_templates_dump(&dir, force),
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Config merging
// ---------------------------------------------------------------------------

fn app_config(args: &ScenarioArgs) -> Result<AppConfig> {
    Ok(match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

/// Merge CLI flags over the config file into a runtime scenario.
fn scenario_config(
    app: &AppConfig,
    args: &ScenarioArgs,
    out: Option<PathBuf>,
    no_reprocessing: bool,
) -> Result<ScenarioConfig> {
    let start_raw = args.start.as_deref().unwrap_or(&app.scenario.start_date);
    let start = parse_required_date("start", start_raw)?;

    let mut filter = FilterConfig::from(app);
    if !args.countries.is_empty() {
        filter.countries = args.countries.clone();
    }
    let mut seen = HashSet::new();
    filter.countries.retain(|c| seen.insert(c.clone()));
    if filter.countries.is_empty() {
        return Err(eyre!("no countries requested: pass --country or set [fleet].countries"));
    }

    let cli_modes = match &args.special {
        Some(tokens) => tokens.parse::<SpecialModes>()?,
        None => SpecialModes::default(),
    };

    Ok(ScenarioConfig {
        csv_path: args.csv.clone(),
        start,
        duration: args.duration.unwrap_or(app.scenario.duration),
        filter,
        assumed_lifetime: args.assumed_lifetime.unwrap_or(app.scenario.assumed_lifetime),
        reprocessing: app.scenario.reprocessing && !no_reprocessing,
        output: out.unwrap_or_else(|| PathBuf::from(&app.scenario.output)),
        template_dir: args
            .templates
            .clone()
            .or_else(|| app.templates.dir.as_ref().map(PathBuf::from)),
        special: app.special.union(cli_modes),
    })
}

fn demand_curve(kind: CurveKind, base_mwe: f64, growth: f64) -> DemandCurve {
    match kind {
        CurveKind::Constant => DemandCurve::Constant { mwe: base_mwe },
        CurveKind::Linear => DemandCurve::Linear {
            base_mwe,
            slope_mwe_per_month: growth,
        },
        CurveKind::Exponential => DemandCurve::Exponential {
            base_mwe,
            annual_growth: growth,
        },
    }
}

fn reference_power(prototype: &str) -> Option<f64> {
    REFERENCE_CLASSES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(prototype))
        .map(|c| c.capacity_mwe)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(args: &ScenarioArgs, out: Option<PathBuf>, no_reprocessing: bool) -> Result<()> {
    let app = app_config(args)?;
    let config = scenario_config(&app, args, out, no_reprocessing)?;

    info!(
        csv = %config.csv_path.display(),
        start = %config.start,
        duration = config.duration,
        countries = ?config.filter.countries,
        "generating scenario"
    );

    let reporter = CliProgress::new();
    let result = match cyclusgen_core::pipeline::generate(&config, &reporter) {
        Ok(result) => result,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    println!();
    println!("  Scenario written!");
    println!("  Output:    {}", result.output.display());
    println!("  Units:     {} loaded, {} deployed", result.units_loaded, result.units_deployed);
    println!("  Regions:   {}", result.countries.join(", "));
    println!("  Size:      {} bytes", result.size_bytes);
    println!("  SHA-256:   {}", result.sha256);
    println!("  Time:      {:.2}s", result.elapsed.as_secs_f64());
    println!();

    if config.special.f33 {
        println!("  F33 mode: fill in these values in {}:", result.output.display());
        println!("\t$f33_path");
        println!("\t$scalerte_path");
        println!("\t$bu_randomness_frac");
        println!();
    }

    Ok(())
}

fn cmd_catalog(json: bool) -> Result<()> {
    let view = catalog_view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", toml::to_string_pretty(&view)?);
    }
    Ok(())
}

fn cmd_demand(args: &ScenarioArgs, demand: &DemandCurve, unit: &NewUnit, out: Option<&Path>) -> Result<()> {
    let app = app_config(args)?;
    let config = scenario_config(&app, args, None, false)?;

    info!(prototype = %unit.prototype, power_mwe = unit.power_mwe, "planning deployment");

    let reporter = CliProgress::new();
    let planned = cyclusgen_core::pipeline::plan_demand(&config, demand, unit, &reporter);
    reporter.spinner.finish_and_clear();
    let result = planned?;

    match out {
        Some(path) => {
            let written = cyclusgen_core::assembler::write_document(path, &result.fragment)?;
            println!();
            println!("  Deployment planned!");
            println!("  Builds:    {}", result.plan.total_builds());
            println!("  Output:    {}", written.path.display());
            println!("  SHA-256:   {}", written.sha256);
            println!();
        }
        None => print!("{}", result.fragment),
    }

    Ok(())
}

fn cmd_templates_dump(dir: &Path, force: bool) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| eyre!("cannot create '{}': {e}", dir.display()))?;

    let mut written = 0usize;
    for (file, text) in BUILTIN_FILES {
        let path = dir.join(file);
        if path.exists() && !force {
            println!("  skipped  {} (exists, use --force)", path.display());
            continue;
        }
        std::fs::write(&path, text).map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
        println!("  wrote    {}", path.display());
        written += 1;
    }

    info!(dir = %dir.display(), written, "templates dumped");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(countries: &[&str]) -> ScenarioArgs {
        ScenarioArgs {
            csv: PathBuf::from("fleet.csv"),
            start: None,
            duration: None,
            countries: countries.iter().map(|c| c.to_string()).collect(),
            assumed_lifetime: None,
            special: None,
            templates: None,
            config: None,
        }
    }

    #[test]
    fn flags_override_config_file() {
        let mut app = AppConfig::default();
        app.fleet.countries = vec!["France".into()];
        app.special.cyborg = true;

        let mut a = args(&["Belgium", "Netherlands"]);
        a.start = Some("19700101".into());
        a.duration = Some(60);
        a.special = Some("f33".into());

        let cfg = scenario_config(&app, &a, Some(PathBuf::from("x.xml")), true).unwrap();
        assert_eq!(cfg.filter.countries, vec!["Belgium", "Netherlands"]);
        assert_eq!(cfg.start, chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(cfg.duration, 60);
        assert!(!cfg.reprocessing);
        assert_eq!(cfg.output, PathBuf::from("x.xml"));
        assert_eq!(cfg.special, SpecialModes { cyborg: true, f33: true });
    }

    #[test]
    fn config_file_fills_gaps() {
        let mut app = AppConfig::default();
        app.fleet.countries = vec!["France".into()];

        let cfg = scenario_config(&app, &args(&[]), None, false).unwrap();
        assert_eq!(cfg.filter.countries, vec!["France"]);
        assert_eq!(cfg.duration, app.scenario.duration);
        assert_eq!(cfg.assumed_lifetime, 720);
        assert!(cfg.reprocessing);
        assert_eq!(cfg.output, PathBuf::from(&app.scenario.output));
    }

    #[test]
    fn repeated_country_flags_collapse() {
        let a = args(&["Belgium", "France", "Belgium"]);
        let cfg = scenario_config(&AppConfig::default(), &a, None, false).unwrap();
        assert_eq!(cfg.filter.countries, vec!["Belgium", "France"]);
    }

    #[test]
    fn no_countries_is_an_error() {
        let err = scenario_config(&AppConfig::default(), &args(&[]), None, false).unwrap_err();
        assert!(err.to_string().contains("no countries"));
    }

    #[test]
    fn bad_special_token_is_an_error() {
        let mut a = args(&["Belgium"]);
        a.special = Some("cyborg,warp".into());
        assert!(scenario_config(&AppConfig::default(), &a, None, false).is_err());
    }

    #[test]
    fn reference_power_lookup() {
        assert_eq!(reference_power("ap1000"), Some(1110.0));
        assert_eq!(reference_power("12_SMR"), Some(600.0));
        assert_eq!(reference_power("VVER"), None);
    }

    #[test]
    fn cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "cyclusgen",
            "generate",
            "fleet.csv",
            "--start",
            "20200101",
            "--country",
            "Belgium",
            "--country",
            "France",
            "--no-reprocessing",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                scenario,
                no_reprocessing,
                ..
            } => {
                assert_eq!(scenario.countries, vec!["Belgium", "France"]);
                assert!(no_reprocessing);
            }
            _ => panic!("expected generate"),
        }
    }
}
