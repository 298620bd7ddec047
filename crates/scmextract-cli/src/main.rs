use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use scmextract_core::{
    load_config, save_graph, CausalGraph, Extractor, GraphFormat, Registry, Simulator,
    VariableFilter,
};
use scmextract_eval::{run_benchmark, run_experiment, BenchmarkReport, BenchmarkSelection, GraphMetrics};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scmextract")]
#[command(about = "SCMExtract - Causal graph extraction from simulation source code", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a causal graph from a Python source file
    Extract {
        /// Python file to analyse
        source: PathBuf,

        /// Extraction method
        #[arg(short = 'm', long, default_value = "ast")]
        method: String,

        /// Variables to extract (repeatable); every assigned name when omitted
        #[arg(short = 'v', long = "variable")]
        variables: Vec<String>,

        /// Save the graph; `.dot`/`.gv` writes DOT, anything else JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not print the graph
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run an experiment described by a YAML config
    Run {
        /// Experiment configuration file
        config: PathBuf,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List available simulators
    ListSimulators,

    /// List available extraction methods
    ListExtractors,

    /// Benchmark every selected extractor against every selected simulator
    Benchmark {
        /// Extraction methods to run (repeatable); all when omitted
        #[arg(short = 'm', long = "method")]
        methods: Vec<String>,

        /// Simulators to run (repeatable); all when omitted
        #[arg(short = 's', long = "simulator")]
        simulators: Vec<String>,

        /// Output directory for the report
        #[arg(short, long, default_value = "results/benchmark")]
        output_dir: PathBuf,
    },

    /// Run a simulator and report its trajectory
    Simulate {
        /// Simulator to run
        #[arg(short, long, default_value = "sir")]
        simulator: String,

        /// Number of time steps
        #[arg(long, default_value_t = 1000)]
        steps: usize,

        /// Write the trajectory as JSON instead of printing the final state
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let extractors = scmextract_parser::extractors();
    let simulators = scmextract_sim::simulators();

    if let Err(e) = execute_command(&cli.command, &extractors, &simulators) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "scmextract=debug" } else { "scmextract=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute_command(
    command: &Commands,
    extractors: &Registry<dyn Extractor>,
    simulators: &Registry<dyn Simulator>,
) -> Result<()> {
    match command {
        Commands::Extract {
            source,
            method,
            variables,
            output,
            quiet,
        } => execute_extract(extractors, source, method, variables, output.as_deref(), *quiet),
        Commands::Run { config, output_dir } => {
            execute_run(extractors, simulators, config, output_dir.as_deref())
        }
        Commands::ListSimulators => {
            println!("{}", registry_listing(simulators));
            Ok(())
        }
        Commands::ListExtractors => {
            println!("{}", registry_listing(extractors));
            Ok(())
        }
        Commands::Benchmark {
            methods,
            simulators: selected,
            output_dir,
        } => {
            let selection = BenchmarkSelection {
                simulators: selected.clone(),
                extractors: methods.clone(),
            };
            execute_benchmark(extractors, simulators, &selection, output_dir)
        }
        Commands::Simulate {
            simulator,
            steps,
            output,
        } => execute_simulate(simulators, simulator, *steps, output.as_deref()),
    }
}

fn variable_filter(variables: &[String]) -> VariableFilter {
    if variables.is_empty() {
        VariableFilter::All
    } else {
        VariableFilter::only(variables.iter().cloned())
    }
}

fn execute_extract(
    extractors: &Registry<dyn Extractor>,
    source: &Path,
    method: &str,
    variables: &[String],
    output: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    if !source.exists() {
        bail!("source file not found: {}", source.display());
    }
    let extractor = extractors.get(method)?;
    let graph = extractor
        .extract(source, &variable_filter(variables))
        .with_context(|| format!("Failed to extract from {}", source.display()))?;

    if let Some(path) = output {
        save_graph(&graph, path, GraphFormat::from_path(path))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} {}", "Saved graph to".green(), path.display());
    }
    if !quiet {
        print_graph(&graph);
    }
    Ok(())
}

fn execute_run(
    extractors: &Registry<dyn Extractor>,
    simulators: &Registry<dyn Simulator>,
    config_path: &Path,
    output_dir: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    if let Some(dir) = output_dir {
        config.output_dir = dir.to_path_buf();
    }

    println!("{} {}", "Running experiment:".cyan().bold(), config.name);
    println!("  {} {}", "Simulator:".cyan(), config.simulator);
    println!("  {} {}", "Extractor:".cyan(), config.extractor);

    let outcome = run_experiment(&config, extractors, simulators)?;
    let result_dir = config.result_dir();
    outcome
        .write_to(&result_dir)
        .with_context(|| format!("Failed to write results to {}", result_dir.display()))?;

    print_metrics(&outcome.metrics);
    println!("\n{} {}", "Results saved to".green(), result_dir.display());
    Ok(())
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Simulator")]
    simulator: String,
    #[tabled(rename = "Extractor")]
    extractor: String,
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Recall")]
    recall: String,
    #[tabled(rename = "F1")]
    f1: String,
    #[tabled(rename = "SHD")]
    shd: usize,
}

fn summary_table(report: &BenchmarkReport) -> String {
    let rows: Vec<SummaryRow> = report
        .records()
        .into_iter()
        .map(|r| SummaryRow {
            simulator: r.simulator,
            extractor: r.extractor,
            precision: format!("{:.3}", r.precision),
            recall: format!("{:.3}", r.recall),
            f1: format!("{:.3}", r.f1),
            shd: r.shd,
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn execute_benchmark(
    extractors: &Registry<dyn Extractor>,
    simulators: &Registry<dyn Simulator>,
    selection: &BenchmarkSelection,
    output_dir: &Path,
) -> Result<()> {
    let report = run_benchmark(extractors, simulators, selection)?;

    println!("{}", "Benchmark summary".cyan().bold());
    println!("{}", summary_table(&report));
    for skipped in &report.skipped {
        println!(
            "{} {}/{}: {}",
            "Skipped".yellow(),
            skipped.simulator,
            skipped.extractor,
            skipped.reason
        );
    }

    report
        .write_to(output_dir)
        .with_context(|| format!("Failed to write report to {}", output_dir.display()))?;
    println!("\n{} {}", "Results saved to".green(), output_dir.display());
    Ok(())
}

fn execute_simulate(
    simulators: &Registry<dyn Simulator>,
    name: &str,
    steps: usize,
    output: Option<&Path>,
) -> Result<()> {
    let simulator = simulators.get(name)?;
    let trajectory = simulator.run(steps);
    info!(simulator = name, rows = trajectory.len(), "simulation complete");

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&trajectory)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "Saved trajectory to".green(), path.display());
        }
        None => {
            println!("{} {} ({} steps)", "Final state:".cyan().bold(), name, trajectory.len());
            for (variable, value) in trajectory.last_row() {
                println!("  {}: {}", variable.cyan(), format!("{value:.4}").yellow());
            }
        }
    }
    Ok(())
}

fn registry_listing<T: ?Sized>(registry: &Registry<T>) -> String {
    let mut lines = vec![format!("Available {}s:", registry.kind()).cyan().bold().to_string()];
    for (name, description) in registry.entries() {
        lines.push(format!("  {}: {}", name.green(), description));
    }
    lines.join("\n")
}

fn print_graph(graph: &CausalGraph) {
    println!("{}", "Extracted causal graph".cyan().bold());
    println!("  {} {}", "Variables:".cyan(), graph.variables().join(", "));
    println!("  {} {}", "Edges:".cyan(), graph.num_edges().to_string().yellow());
    for (parent, child) in graph.edge_pairs() {
        println!("    {} -> {}", parent, child);
    }
}

fn print_metrics(metrics: &GraphMetrics) {
    println!("\n{}", "Results:".cyan().bold());
    println!("  {} {}", "Precision:".cyan(), format!("{:.3}", metrics.precision).yellow());
    println!("  {} {}", "Recall:".cyan(), format!("{:.3}", metrics.recall).yellow());
    println!("  {} {}", "F1 Score:".cyan(), format!("{:.3}", metrics.f1).yellow());
    println!("  {} {}", "SHD:".cyan(), metrics.shd.to_string().yellow());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_accepts_repeated_variables() {
        let cli = Cli::try_parse_from([
            "scmextract", "extract", "model.py", "-v", "x", "-v", "y", "-o", "out.dot",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract {
                method,
                variables,
                output,
                quiet,
                ..
            } => {
                assert_eq!(method, "ast");
                assert_eq!(variables, vec!["x", "y"]);
                assert_eq!(output, Some(PathBuf::from("out.dot")));
                assert!(!quiet);
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::try_parse_from(["scmextract", "--verbose", "simulate"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Simulate { simulator, steps, output } => {
                assert_eq!(simulator, "sir");
                assert_eq!(steps, 1000);
                assert!(output.is_none());
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn empty_variable_list_means_no_filter() {
        assert!(variable_filter(&[]).is_all());
        assert!(variable_filter(&["x".to_string()]).admits("x"));
    }

    #[test]
    fn extract_writes_graph_by_extension() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("model.py");
        fs::write(&source, "x = a + b\n").unwrap();
        let output = dir.path().join("graph.dot");

        execute_extract(&scmextract_parser::extractors(), &source, "ast", &[], Some(&output), true).unwrap();
        let dot = fs::read_to_string(&output).unwrap();
        assert!(dot.contains("\"a\" -> \"x\";"));
    }

    #[test]
    fn extract_rejects_missing_source() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.py");
        let err = execute_extract(&scmextract_parser::extractors(), &missing, "ast", &[], None, true).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn run_writes_results_under_output_dir() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("experiment.yaml");
        fs::write(&config, "name: sir_test\nsimulator: sir\nextractor: ast\n").unwrap();

        execute_run(
            &scmextract_parser::extractors(),
            &scmextract_sim::simulators(),
            &config,
            Some(dir.path()),
        )
        .unwrap();
        assert!(dir.path().join("sir_test/metrics.json").exists());
    }

    #[test]
    fn simulate_writes_trajectory_json() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("traj/sir.json");
        execute_simulate(&scmextract_sim::simulators(), "sir", 10, Some(&output)).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["time"].as_array().unwrap().len(), 10);
        assert_eq!(json["series"]["Susceptible"][0], 950.0);
    }

    #[test]
    fn registry_listing_is_titled_by_kind() {
        colored::control::set_override(false);
        let listing = registry_listing(&scmextract_parser::extractors());
        assert!(listing.starts_with("Available extractors:"));
        assert!(listing.contains("  ast: Extract causal graphs"));

        let listing = registry_listing(&scmextract_sim::simulators());
        assert!(listing.starts_with("Available simulators:"));
    }

    #[test]
    fn summary_table_lists_each_pair() {
        let report = run_benchmark(
            &scmextract_parser::extractors(),
            &scmextract_sim::simulators(),
            &BenchmarkSelection::all(),
        )
        .unwrap();
        let table = summary_table(&report);
        assert!(table.contains("Simulator"));
        assert!(table.contains("sir"));
        assert!(table.contains("0.769"));
    }
}
