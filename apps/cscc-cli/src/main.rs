use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cscc_app::{
    AppResult, LoadProgressEvent, LoaderConfig, ScenarioRequest, SplitOptions, default_config_yaml,
    load_config, load_country_range, load_metrics_with_progress, split_dataset, validate_config,
};
use cscc_core::{CountryCode, DamageModel, Discounting, Rcp, Scenario, Ssp, search_countries};
use cscc_data::CsvSource;
use cscc_metrics::{ReferenceMatch, derive_emissions_share};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cscc")]
#[command(about = "CSCC CLI - country-level social cost of carbon data tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScenarioArgs {
    /// Shared socioeconomic pathway (SSP1..SSP5)
    #[arg(long, default_value = "SSP2")]
    ssp: Ssp,
    /// Concentration pathway (rcp45, rcp60, rcp85)
    #[arg(long, default_value = "rcp60")]
    rcp: Rcp,
    /// Damage model (bhm_sr, bhm_richpoor_sr, bhm_lr, bhm_richpoor_lr, djo)
    #[arg(long, default_value = "bhm_sr")]
    dmg: DamageModel,
    /// Discounting treatment (fixed, growth-adjusted)
    #[arg(long, default_value = "fixed")]
    discounting: Discounting,
}

impl ScenarioArgs {
    fn scenario(&self) -> Scenario {
        Scenario {
            ssp: self.ssp,
            rcp: self.rcp,
            damage_model: self.dmg,
            discounting: self.discounting,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load a scenario and print per-country metrics
    Metrics {
        /// Path to the loader config YAML (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Only publish this country
        #[arg(long)]
        country: Option<CountryCode>,
        /// Print the metric set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Percentile bands of one country across all scenarios
    Ranges {
        /// ISO3 country code
        country: CountryCode,
        /// Path to the loader config YAML
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Fixed axis maximum instead of the inferred clamp
        #[arg(long)]
        clamp: Option<f64>,
        /// Number of axis tick slices
        #[arg(long, default_value_t = 5)]
        slices: u32,
    },
    /// Split the full dataset into per-scenario and per-country files
    Split {
        /// Path to the full dataset CSV
        csv: PathBuf,
        /// Output directory
        #[arg(long, default_value = "sourcedata/filtered")]
        dest: PathBuf,
        /// Skip per-country files
        #[arg(long)]
        no_countries: bool,
    },
    /// Derive emissions shares from a wide emissions table
    EmissionsShare {
        /// Path to the emissions CSV (one column per year)
        csv: PathBuf,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Search the country catalog
    Countries {
        /// Case-insensitive name or code fragment
        query: Option<String>,
    },
    /// List scenario dimensions and their labels
    Scenarios,
    /// Print the default config, or validate a config file
    Config {
        /// Config file to validate
        path: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Metrics {
            config,
            scenario,
            country,
            json,
        } => cmd_metrics(config.as_deref(), scenario.scenario(), country, json),
        Commands::Ranges {
            country,
            config,
            clamp,
            slices,
        } => cmd_ranges(config.as_deref(), country, clamp, slices),
        Commands::Split {
            csv,
            dest,
            no_countries,
        } => cmd_split(&csv, &dest, !no_countries),
        Commands::EmissionsShare { csv, output } => cmd_emissions_share(&csv, output.as_deref()),
        Commands::Countries { query } => cmd_countries(query.as_deref().unwrap_or("")),
        Commands::Scenarios => cmd_scenarios(),
        Commands::Config { path } => cmd_config(path.as_deref()),
    }
}

fn resolve_config(path: Option<&Path>) -> AppResult<LoaderConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(LoaderConfig::default()),
    }
}

fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(100));
    let _ = io::stderr().flush();
}

fn render_cli_progress(event: &LoadProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(rows) = event.rows_read {
        line.push_str(&format!("  rows={}", rows));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    eprint!("{}", line);
    let _ = io::stderr().flush();
}

fn cmd_metrics(
    config_path: Option<&Path>,
    scenario: Scenario,
    country: Option<CountryCode>,
    json: bool,
) -> AppResult<()> {
    let config = resolve_config(config_path)?;
    let mut request = ScenarioRequest::new(scenario);
    if let Some(country) = country {
        request = request.with_country(country);
    }

    let started = Instant::now();
    let loaded = load_metrics_with_progress(
        &config,
        &request,
        Some(&mut |event| render_cli_progress(&event)),
    )?;
    clear_progress_line();

    if json {
        println!("{}", serde_json::to_string_pretty(&loaded.metrics)?);
        return Ok(());
    }

    let set = &loaded.metrics;
    println!(
        "✓ Loaded {} ({:.2}s)",
        scenario,
        started.elapsed().as_secs_f64()
    );
    match set.world_median.value() {
        Some(v) => println!("  World median: {:.2}", v),
        None => println!("  World median: missing (shares use divisor 1)"),
    }
    println!(
        "\n  {:<4} {:<28} {:>10} {:>12} {:>8} {:>10} {:>10}",
        "ISO3", "Country", "Median", "Per capita", "log GDP", "Emis. %", "Cost %"
    );
    for m in &set.metrics {
        let marker = match m.reference {
            ReferenceMatch::Matched => "",
            ReferenceMatch::Missing => "  (no reference)",
        };
        println!(
            "  {:<4} {:<28} {:>10.2} {:>12.4} {:>8.2} {:>10.2} {:>10.2}{}",
            m.country_code.as_str(),
            m.label,
            m.median,
            m.scc_per_capita,
            m.log_gdp,
            m.share_emissions,
            m.share_of_global_cost,
            marker
        );
    }

    match (&set.aggregate, &set.aggregate_unavailable) {
        (Some(agg), _) => {
            println!(
                "\n  {:<4} {:<28} {:>10.2} {:>12.4} {:>8.2} {:>10.2} {:>10.2}",
                agg.country_code.as_str(),
                agg.label,
                agg.total_cost,
                agg.scc_per_capita,
                agg.log_gdp,
                agg.share_emissions,
                agg.share_of_global_cost
            );
            if !agg.members_missing.is_empty() {
                let missing: Vec<&str> = agg.members_missing.iter().map(|c| c.as_str()).collect();
                println!("  Members without data: {}", missing.join(", "));
            }
        }
        (None, Some(reason)) => println!("\n  Aggregate unavailable: {}", reason),
        (None, None) => {}
    }

    if !loaded.warnings.is_empty() {
        println!("\n  Data quality warnings: {}", loaded.warnings.len());
    }
    if !loaded.rejected.is_empty() {
        println!("  Rejected rows: {}", loaded.rejected.len());
        for err in loaded.rejected.iter().take(5) {
            println!("    {}", err);
        }
    }
    Ok(())
}

fn cmd_ranges(
    config_path: Option<&Path>,
    country: CountryCode,
    clamp: Option<f64>,
    slices: u32,
) -> AppResult<()> {
    let config = resolve_config(config_path)?;
    let range = load_country_range(&config, country, clamp)?;

    if range.rows.is_empty() {
        println!("No rows found for country: {}", country);
        return Ok(());
    }

    println!("Distribution ranges for {} ({} rows)", country, range.rows.len());
    if let Some(extent) = range.extent {
        println!("  Extent: {:.2} .. {:.2}", extent.min, extent.max);
    }
    println!("  Inferred clamp: {:.2}", range.inferred_clamp);
    println!("  Axis: {:.2} .. {:.2}", range.axis_min(), range.axis_max);
    let ticks: Vec<String> = range.ticks(slices).iter().map(|t| t.to_string()).collect();
    println!("  Ticks: {}", ticks.join(", "));

    for ssp in Ssp::ALL {
        for rcp in Rcp::ALL {
            println!("\n  {} / {}", ssp.label(), rcp.label());
            for dmg in DamageModel::ALL {
                let band = range.grid.band(ssp, rcp, dmg);
                println!(
                    "    {:<26} {:>10.2} {:>10.2} {:>10.2}",
                    dmg.label(),
                    band.percentile17,
                    band.median,
                    band.percentile83
                );
            }
        }
    }
    Ok(())
}

fn cmd_split(csv: &Path, dest: &Path, countries: bool) -> AppResult<()> {
    println!("Splitting dataset: {}", csv.display());
    let options = SplitOptions {
        countries,
        ..SplitOptions::new(csv, dest)
    };
    let manifest = split_dataset(&options)?;
    println!(
        "✓ Wrote {} scenario files and {} country files to {}",
        manifest.scenario_files.len(),
        manifest.country_files.len(),
        dest.display()
    );
    println!("  Rows read: {}", manifest.rows_read);
    println!("  Source sha256: {}", manifest.source_sha256);
    Ok(())
}

fn cmd_emissions_share(csv: &Path, output: Option<&Path>) -> AppResult<()> {
    let table = derive_emissions_share(CsvSource::Path(csv.to_path_buf()))?;

    if let Some(path) = output {
        table.to_csv(File::create(path)?)?;
        println!(
            "✓ Exported {} countries for {} to {}",
            table.rows.len(),
            table.year,
            path.display()
        );
    } else {
        table.to_csv(io::stdout().lock())?;
    }
    Ok(())
}

fn cmd_countries(query: &str) -> AppResult<()> {
    let matches = search_countries(query);
    if matches.is_empty() {
        println!("No countries match: {}", query);
    } else {
        for entry in matches {
            println!("  {}  {}", entry.code, entry.label);
        }
    }
    Ok(())
}

fn cmd_scenarios() -> AppResult<()> {
    println!("SSPs:");
    for ssp in Ssp::ALL {
        println!("  {:<16} {}", ssp.as_str(), ssp.label());
    }
    println!("RCPs:");
    for rcp in Rcp::ALL {
        println!("  {:<16} {}", rcp.as_str(), rcp.label());
    }
    println!("Damage models:");
    for dmg in DamageModel::ALL {
        println!("  {:<16} {}", dmg.as_str(), dmg.label());
    }
    println!("Discounting:");
    for discounting in Discounting::ALL {
        println!("  {:<16} {}", discounting.as_str(), discounting.label());
    }
    Ok(())
}

fn cmd_config(path: Option<&Path>) -> AppResult<()> {
    match path {
        Some(path) => {
            println!("Validating config: {}", path.display());
            let config = load_config(path)?;
            validate_config(&config)?;
            println!("✓ Config is valid");
        }
        None => print!("{}", default_config_yaml()?),
    }
    Ok(())
}
