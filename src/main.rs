use clap::{Parser, Subcommand};
use petal::Pipeline;
use petal::definition::PipelineDefinition;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub type Result<T> = anyhow::Result<T>;

const DEFAULT_LOG_FILTER: &str = "petal=info,warn";

#[derive(Parser)]
#[command(name = "petal")]
#[command(about = "Run ETL pipelines described as operator graphs", long_about = None)]
struct Cli {
    /// Log filter (tracing env-filter syntax).
    #[arg(long, global = true, env = "PETAL_LOG", default_value = DEFAULT_LOG_FILTER)]
    log: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a pipeline definition and run it.
    Run {
        #[arg(short, long)]
        pipeline: PathBuf,
    },
    /// Validate a pipeline definition and print its execution order.
    Check {
        #[arg(short, long)]
        pipeline: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();

    match cli.cmd {
        Commands::Run { pipeline } => {
            let pipeline = load(&pipeline)?;
            pipeline.run()?;
            println!("Pipeline '{}' finished", pipeline.name());
        }
        Commands::Check { pipeline } => {
            let pipeline = load(&pipeline)?;
            let order = pipeline.execution_order()?;
            println!(
                "Pipeline '{}' is valid: {} nodes, {} edges",
                pipeline.name(),
                order.len(),
                pipeline.edges().len()
            );
            for (i, id) in order.iter().enumerate() {
                println!("{:>3}. {}", i + 1, id);
            }
        }
    }

    Ok(())
}

/// Load a definition file; relative operator paths resolve against its directory.
fn load(path: &Path) -> Result<Pipeline> {
    let definition = PipelineDefinition::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    definition.build(base_dir)
}
