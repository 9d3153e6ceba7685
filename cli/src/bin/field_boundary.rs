use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use field_boundary::{BoundaryCommand, BoundaryTracer, DetectionRequest, PipelineConfig};
use field_boundary_cli::{TraceJob, write_json};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace field boundaries for a single detection request
    Trace {
        /// Path to the detection request JSON
        #[arg(short, long)]
        input: PathBuf,
        /// Pipeline configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output dialect: trace_boundaries, trace_feature_list or trace_paths
        #[arg(short, long, default_value = "trace_boundaries")]
        dialect: BoundaryCommand,
    },
    /// Trace every request listed in a batch job file
    Batch {
        /// Path to the job file (.toml or .json)
        #[arg(short, long)]
        job: PathBuf,
    },
    /// Print a JSON schema
    Schema {
        #[arg(value_enum, default_value = "request")]
        target: SchemaTarget,
    },
    /// Write the default pipeline configuration as TOML
    InitConfig {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaTarget {
    Request,
    Config,
    Command,
    Job,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Trace { input, config, output, dialect } => {
            trace(input, config.as_deref(), output.as_deref(), *dialect)?;
        }
        Commands::Batch { job } => {
            run_batch(job)?;
        }
        Commands::Schema { target } => {
            let schema = match target {
                SchemaTarget::Request => serde_json::to_value(DetectionRequest::schema())?,
                SchemaTarget::Config => serde_json::to_value(schemars::schema_for!(PipelineConfig))?,
                SchemaTarget::Command => serde_json::to_value(BoundaryCommand::schema())?,
                SchemaTarget::Job => serde_json::to_value(schemars::schema_for!(TraceJob))?,
            };
            write_json(&schema, None)?;
        }
        Commands::InitConfig { output } => {
            let content = PipelineConfig::default().to_toml()?;
            match output {
                Some(path) => {
                    std::fs::write(path, content)?;
                    info!("Default configuration saved to: {:?}", path);
                }
                None => println!("{}", content),
            }
        }
    }

    Ok(())
}

fn load_tracer(config: Option<&Path>) -> Result<BoundaryTracer> {
    let config = match config {
        Some(path) => {
            info!("Loading pipeline configuration: {:?}", path);
            PipelineConfig::from_file(path)?
        }
        None => PipelineConfig::default(),
    };
    let tracer = BoundaryTracer::from_config(&config);
    info!("{}", tracer.pipeline().info());
    Ok(tracer)
}

fn trace(input: &Path, config: Option<&Path>, output: Option<&Path>, dialect: BoundaryCommand) -> Result<()> {
    let tracer = load_tracer(config)?;
    let request = DetectionRequest::from_json_file(input)?;
    info!("Tracing {} instances from {:?} as {}", request.instances.len(), input, dialect);

    let value = tracer.execute(dialect, &request)?;
    write_json(&value, output)?;

    if let Some(path) = output {
        info!("Output saved to: {:?}", path);
    }
    Ok(())
}

fn run_batch(job_path: &Path) -> Result<()> {
    let job = TraceJob::from_file(job_path)?;
    let job_dir = job_path.parent().unwrap_or_else(|| Path::new("."));
    let tracer = BoundaryTracer::from_config(&job.pipeline);

    std::fs::create_dir_all(job.resolve_output_dir(job_dir))?;

    let mut failed = 0;
    for entry in &job.requests {
        let input = job.resolve(entry, job_dir);
        let output = job.output_path(entry, job_dir);
        info!("Processing request '{}' -> {:?}", entry.name, output);

        let result = DetectionRequest::from_json_file(&input)
            .and_then(|request| tracer.execute(entry.command, &request));

        match result {
            Ok(value) => write_json(&value, Some(&output))?,
            Err(e) => {
                error!("Request '{}' failed: {}", entry.name, e);
                failed += 1;
            }
        }
    }

    info!(
        "Batch completed: {} succeeded, {} failed",
        job.requests.len() - failed,
        failed
    );
    if failed > 0 {
        return Err(color_eyre::eyre::eyre!("{} of {} requests failed", failed, job.requests.len()));
    }
    Ok(())
}
