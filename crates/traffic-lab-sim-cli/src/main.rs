use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use traffic_lab_abstract::{
    FgnGenerationParameters, ParameterOverride, SimulationParameters, TrafficModel,
};
use traffic_lab_simulator::{FgnReport, SimulationReport, run_fgn_generation, run_simulation};

mod output;

use output::FileOutputSink;

#[derive(Parser, Debug)]
#[command(name = "traffic-lab-sim")]
#[command(author, version, about = "Self-similar ON/OFF traffic simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full traffic simulation (Pareto or FGN sources).
    Simulate(SimulateArgs),
    /// Generate one FGN series, optionally followed by an FGN-model simulation.
    GenerateFgn(GenerateFgnArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// TOML file with parameter overrides; flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_parser = parse_model)]
    model: Option<TrafficModel>,

    /// Horizon in seconds.
    #[arg(long)]
    total_time: Option<f64>,

    #[arg(long)]
    sources: Option<usize>,

    #[arg(long)]
    on_shape: Option<f64>,
    #[arg(long)]
    on_scale: Option<f64>,
    #[arg(long)]
    off_shape: Option<f64>,
    #[arg(long)]
    off_scale: Option<f64>,

    #[arg(long)]
    sampling_interval: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    hurst: Option<f64>,
    #[arg(long)]
    sigma: Option<f64>,
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(long)]
    fgn_seed: Option<u64>,

    /// Queue service rate in packets per second.
    #[arg(long)]
    service_rate: Option<f64>,

    /// Bound the queue; unbounded when omitted.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Directory that receives the run_<timestamp> folder.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Write a JSON trace of the finished simulation.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateFgnArgs {
    /// Hurst exponent in (0.5, 1.0).
    #[arg(long)]
    hurst: f64,

    #[arg(long)]
    sigma: f64,

    #[arg(long)]
    samples: usize,

    #[arg(long, default_value_t = 1.0)]
    sampling_interval: f64,

    #[arg(long, default_value_t = 0.0)]
    threshold: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Also simulate this many FGN sources over the series' duration.
    #[arg(long)]
    simulate_sources: Option<usize>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    info!("traffic-lab-sim starting…");

    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::GenerateFgn(args) => generate_fgn(args),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn parse_model(value: &str) -> Result<TrafficModel, String> {
    match value.to_ascii_lowercase().as_str() {
        "pareto" => Ok(TrafficModel::Pareto),
        "fgn" => Ok(TrafficModel::Fgn),
        other => Err(format!("unknown traffic model '{other}', expected pareto or fgn")),
    }
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut params = SimulationParameters::default();
    if let Some(path) = &args.config {
        load_overrides(path)?.apply_to(&mut params);
    }
    args.as_override().apply_to(&mut params);

    let mut sink = FileOutputSink::create(&args.output_dir, simulation_metadata(&params))
        .with_context(|| format!("Failed to create run directory under {}", args.output_dir.display()))?;
    let report = run_simulation(params, &mut sink).context("Simulation failed")?;
    print_report(&report);

    if let Some(trace_path) = &args.trace_out {
        write_trace(trace_path, &report)?;
    }
    Ok(())
}

impl SimulateArgs {
    fn as_override(&self) -> ParameterOverride {
        ParameterOverride {
            total_simulation_time: self.total_time,
            number_of_sources: self.sources,
            on_shape: self.on_shape,
            on_scale: self.on_scale,
            off_shape: self.off_shape,
            off_scale: self.off_scale,
            sampling_interval: self.sampling_interval,
            random_seed: self.seed,
            traffic_model: self.model,
            hurst: self.hurst,
            fgn_sigma: self.sigma,
            fgn_threshold: self.threshold,
            fgn_seed: self.fgn_seed,
            service_rate: self.service_rate,
            queue_capacity: self.queue_capacity,
            ..Default::default()
        }
    }
}

fn generate_fgn(args: GenerateFgnArgs) -> Result<()> {
    if args.simulate_sources == Some(0) {
        anyhow::bail!("--simulate-sources must be at least 1");
    }
    let params = FgnGenerationParameters {
        hurst: args.hurst,
        sigma: args.sigma,
        sample_count: args.samples,
        sampling_interval: args.sampling_interval,
        threshold: args.threshold,
        seed: args.seed,
    };

    let mut sink = FileOutputSink::create(&args.output_dir, generation_metadata(&params))
        .with_context(|| format!("Failed to create run directory under {}", args.output_dir.display()))?;
    let report = run_fgn_generation(&params, &mut sink).context("FGN generation failed")?;
    print_fgn_report(&report);

    if let Some(sources) = args.simulate_sources {
        let sim_params = params.to_simulation_parameters(sources);
        let mut sink = FileOutputSink::create(&args.output_dir, simulation_metadata(&sim_params))
            .context("Failed to create run directory for the FGN simulation")?;
        let report = run_simulation(sim_params, &mut sink).context("FGN simulation failed")?;
        print_report(&report);
    }
    Ok(())
}

fn load_overrides(path: &Path) -> Result<ParameterOverride> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let overrides: ParameterOverride =
        toml::from_str(&content).context("Failed to parse config file")?;
    Ok(overrides)
}

fn simulation_metadata(params: &SimulationParameters) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::from([
        ("mode".to_string(), params.traffic_model.to_string()),
        ("total_time".to_string(), params.total_simulation_time.to_string()),
        ("sources".to_string(), params.number_of_sources.to_string()),
        ("sampling_interval".to_string(), params.sampling_interval.to_string()),
        ("service_rate".to_string(), params.service_rate.to_string()),
        ("seed".to_string(), params.random_seed.to_string()),
    ]);
    match params.traffic_model {
        TrafficModel::Pareto => {
            meta.insert("on_shape".into(), params.on_shape.to_string());
            meta.insert("on_scale".into(), params.on_scale.to_string());
            meta.insert("off_shape".into(), params.off_shape.to_string());
            meta.insert("off_scale".into(), params.off_scale.to_string());
        }
        TrafficModel::Fgn => {
            meta.insert("hurst".into(), params.hurst.to_string());
            meta.insert("sigma".into(), params.fgn_sigma.to_string());
            meta.insert("threshold".into(), params.fgn_threshold.to_string());
            meta.insert("fgn_seed".into(), params.fgn_seed.to_string());
        }
    }
    meta
}

fn generation_metadata(params: &FgnGenerationParameters) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("mode".to_string(), "fgn_generation".to_string()),
        ("hurst".to_string(), params.hurst.to_string()),
        ("sigma".to_string(), params.sigma.to_string()),
        ("samples".to_string(), params.sample_count.to_string()),
        ("sampling_interval".to_string(), params.sampling_interval.to_string()),
        ("threshold".to_string(), params.threshold.to_string()),
        ("seed".to_string(), params.seed.to_string()),
    ])
}

fn print_report(report: &SimulationReport) {
    let stats = &report.statistics;
    info!(
        "Samples={} avg={:.4} peak={:.4} std={:.4} H={:.3}",
        stats.sample_count,
        stats.average_rate,
        stats.peak_rate,
        stats.std_dev_rate,
        stats.hurst_exponent
    );
    info!(
        "Queue: arrived={} served={} dropped={} avgWait={:.4}s avgSys={:.4}s",
        report.queue.arrived,
        report.queue.served,
        report.queue.dropped,
        report.queue.avg_waiting_time,
        report.queue.avg_system_time
    );
}

fn print_fgn_report(report: &FgnReport) {
    let summary = &report.summary;
    info!(
        "FGN: n={} mean={:.6} std={:.6} on={:.3}",
        summary.sample_count, summary.mean, summary.std_dev, summary.on_fraction
    );
}

fn write_trace(path: &Path, report: &SimulationReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize simulation trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file_values() {
        let cli = Cli::try_parse_from([
            "traffic-lab-sim",
            "simulate",
            "--model",
            "FGN",
            "--sources",
            "7",
            "--hurst",
            "0.9",
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };

        let mut params = SimulationParameters::default();
        let file: ParameterOverride =
            toml::from_str("number_of_sources = 3\ntotal_simulation_time = 20.0").unwrap();
        file.apply_to(&mut params);
        args.as_override().apply_to(&mut params);

        assert_eq!(params.traffic_model, TrafficModel::Fgn);
        assert_eq!(params.number_of_sources, 7);
        assert_eq!(params.total_simulation_time, 20.0);
        assert_eq!(params.hurst, 0.9);
        assert_eq!(args.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn generate_fgn_requires_core_parameters() {
        assert!(Cli::try_parse_from(["traffic-lab-sim", "generate-fgn", "--hurst", "0.8"]).is_err());

        let cli = Cli::try_parse_from([
            "traffic-lab-sim",
            "generate-fgn",
            "--hurst",
            "0.8",
            "--sigma",
            "1.0",
            "--samples",
            "256",
        ])
        .unwrap();
        let Command::GenerateFgn(args) = cli.command else {
            panic!("expected generate-fgn");
        };
        assert_eq!(args.sampling_interval, 1.0);
        assert_eq!(args.seed, 42);
        assert!(args.simulate_sources.is_none());
    }

    #[test]
    fn unknown_model_is_rejected() {
        assert!(parse_model("poisson").is_err());
        assert_eq!(parse_model("Pareto"), Ok(TrafficModel::Pareto));
    }

    #[test]
    fn metadata_names_the_model_parameters() {
        let params = SimulationParameters::default();
        let meta = simulation_metadata(&params);
        assert_eq!(meta["mode"], "pareto");
        assert!(meta.contains_key("on_shape"));
        assert!(!meta.contains_key("hurst"));
    }
}
