//! # Panelcalc CLI
//!
//! Command line front end for the sandwich panel analysis engine.
//!
//! ```text
//! panelcalc example --usage ceiling > c1.json
//! panelcalc analyze c1.json
//! panelcalc analyze c1.json --json > c1.result.json
//! panelcalc init job.spf --engineer "J. Doe" --job 26-014 --client "Cold Store Ltd"
//! panelcalc project job.spf
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use panel_core::calculations::panel::PanelResult;
use panel_core::calculations::CalculationItem;
use panel_core::loads::{InternalWallType, UsageClass};
use panel_core::{analyze, load_project, save_project, FileLock, PanelInput, Project};

#[derive(Parser)]
#[command(name = "panelcalc")]
#[command(about = "Continuous-beam analysis and design checks for sandwich panels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one panel described by a JSON input file
    Analyze {
        /// Panel input (JSON); omitted fields take their defaults
        input: PathBuf,
        /// Print the full result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Print a default panel input as JSON
    Example {
        #[arg(long, value_enum, default_value_t = UsageArg::ExternalWall)]
        usage: UsageArg,
    },
    /// Create a project file holding one default panel
    Init {
        /// Project file to create (.spf)
        file: PathBuf,
        #[arg(long, default_value = "")]
        engineer: String,
        #[arg(long, default_value = "")]
        job: String,
        #[arg(long, default_value = "")]
        client: String,
    },
    /// Analyze every panel in a project file
    Project {
        /// Project file (.spf)
        file: PathBuf,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UsageArg {
    Ceiling,
    ExternalWall,
    InternalWall,
    ColdStorage,
}

impl From<UsageArg> for UsageClass {
    fn from(arg: UsageArg) -> Self {
        match arg {
            UsageArg::Ceiling => UsageClass::Ceiling,
            UsageArg::ExternalWall => UsageClass::ExternalWall,
            UsageArg::InternalWall => UsageClass::InternalWall(InternalWallType::Normal),
            UsageArg::ColdStorage => UsageClass::InternalWall(InternalWallType::ColdStorage),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, json } => run_analyze(&input, json),
        Commands::Example { usage } => print_example(usage),
        Commands::Init {
            file,
            engineer,
            job,
            client,
        } => init_project(&file, engineer, job, client),
        Commands::Project { file, json } => run_project(&file, json),
    }
}

fn read_input(path: &Path) -> Result<PanelInput> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing panel input {}", path.display()))
}

fn run_analyze(path: &Path, json: bool) -> Result<()> {
    let input = read_input(path)?;
    info!(path = %path.display(), label = %input.label, "analyzing panel");
    let result = analyze(&input).with_context(|| format!("analyzing {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_example(usage: UsageArg) -> Result<()> {
    let usage = UsageClass::from(usage);
    let input = PanelInput {
        label: format!("{} panel", usage.display_name()),
        usage,
        ..Default::default()
    };
    println!("{}", serde_json::to_string_pretty(&input)?);
    Ok(())
}

fn init_project(path: &Path, engineer: String, job: String, client: String) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let _lock = FileLock::acquire(path, whoami()).with_context(|| format!("locking {}", path.display()))?;

    let mut project = Project::new(engineer, job, client);
    let panel = project.settings.new_panel("P-1");
    project.add_item(CalculationItem::Panel(panel));
    save_project(&project, path).with_context(|| format!("saving {}", path.display()))?;

    println!("Created {} with {} panel", path.display(), project.item_count());
    Ok(())
}

fn run_project(path: &Path, json: bool) -> Result<()> {
    let project = load_project(path).with_context(|| format!("loading {}", path.display()))?;
    if let Some(lock) = FileLock::check(path) {
        info!(holder = %lock.user_id, machine = %lock.machine, "project is open elsewhere, reading anyway");
    }

    println!(
        "Project {} ({}) - {} panel(s)",
        project.meta.job_id,
        project.meta.client,
        project.item_count()
    );

    let mut failures = 0;
    for (id, outcome) in project.analyze_all() {
        let label = project.get_item(&id).map(|i| i.label()).unwrap_or_default();
        match outcome {
            Ok(result) if json => println!("{}", serde_json::to_string_pretty(&result)?),
            Ok(result) => {
                println!();
                println!("== {label} ==");
                print_summary(&result);
            }
            Err(err) => {
                failures += 1;
                eprintln!("{label}: [{}] {err}", err.error_code());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} panel(s) could not be analyzed");
    }
    Ok(())
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn print_summary(result: &PanelResult) {
    let s = &result.summary;
    let r = &s.ratios;

    println!("Usage:            {}", result.usage);
    println!("Design case:      {:?}", result.loads.design_case);
    println!(
        "Line load:        q_SLS = {:.3} kPa, q_ULS = {:.3} kPa",
        result.loads.q_sls_kpa, result.loads.q_uls_kpa
    );
    println!("EI / GA:          {:.4e} N·mm² / {:.4e} N", result.section.ei_nmm2, result.section.ga_n);
    println!();
    println!("M_Rd:             {:.3} kN·m", s.moment_resistance_knm);
    println!("V_Rd:             {:.3} kN", s.shear_resistance_kn);
    println!(
        "Max moment:       {:.3} kN·m (sagging {:.3}, hogging {:.3})",
        s.max_moment_knm, s.max_sagging_knm, s.max_hogging_knm
    );
    println!("Support moment:   {:.3} kN·m", s.max_support_moment_knm);
    println!("Max shear:        {:.3} kN", s.max_shear_kn);
    println!(
        "Deflection:       {:.2} mm (limit L/{} = {:.2} mm)",
        s.max_deflection_mm, s.deflection_denominator, s.deflection_limit_mm
    );
    println!();
    println!("Ratios:");
    println!("  bending     {:.3}", r.bending);
    println!("  support     {:.3}", r.support);
    println!("  shear       {:.3}", r.shear);
    println!("  crushing    {:.3}", r.crushing);
    println!("  deflection  {:.3}", r.deflection);
    println!("  uplift      {:.3}", r.uplift);
    println!();
    println!("Supports:");
    for support in &result.supports {
        println!(
            "  {} @ {:.2} m: R = {:.2} kN, F_Rd = {:.2} kN ({:?}), uplift = {:.2} kN ({:?})",
            support.index,
            support.x_m,
            support.reaction_n / 1000.0,
            support.crushing_resistance_n / 1000.0,
            support.crushing_status,
            support.uplift_n / 1000.0,
            support.uplift_status
        );
    }
    println!();
    println!("Status: {:?}", s.status);
    for advice in &s.advisories {
        println!("  - {advice}");
    }
}
