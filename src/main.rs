use clap::{Parser, Subcommand};
use std::sync::Arc;
use tabular_etl::config::Config;
use tabular_etl::jobs::{CsvImportJob, HttpJsonJob};
use tabular_etl::logging::init_logging;
use tabular_etl::pipeline::EtlPipeline;
use tabular_etl::store::ParquetStore;
use tabular_etl::types::{DatasetMap, EtlJob};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "tabular_etl")]
#[command(about = "Trait-based ETL runner for tabular datasets")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full extract, transform and load sequence
    Run {
        /// Job to run. Available: csv_import, http_json
        #[arg(long, default_value = "csv_import")]
        job: String,
    },
    /// Extract only, printing input dataset names and shapes
    Extract {
        /// Job to run. Available: csv_import, http_json
        #[arg(long, default_value = "csv_import")]
        job: String,
    },
    /// Extract and transform, printing output dataset shapes without loading
    Transform {
        /// Job to run. Available: csv_import, http_json
        #[arg(long, default_value = "csv_import")]
        job: String,
    },
}

fn create_job(job_name: &str, config: &Config) -> Option<Box<dyn EtlJob>> {
    match job_name {
        "csv_import" => Some(Box::new(CsvImportJob::new())),
        "http_json" => {
            let http = config.http_json.as_ref()?;
            Some(Box::new(HttpJsonJob::new(&http.url, &http.dataset)))
        }
        _ => None,
    }
}

fn print_shapes(label: &str, datasets: &DatasetMap) {
    println!("\n📊 {} datasets: {}", label, datasets.len());
    for (name, table) in datasets {
        let (rows, cols) = table.shape();
        println!("   {} ({} rows, {} columns)", name, rows, cols);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;

    let job_name = match &cli.command {
        Commands::Run { job } | Commands::Extract { job } | Commands::Transform { job } => {
            job.clone()
        }
    };

    let Some(job) = create_job(&job_name, &config) else {
        warn!("Unknown or unconfigured job: {}", job_name);
        anyhow::bail!("unknown or unconfigured job '{job_name}'");
    };

    let store = Arc::new(ParquetStore::new());
    let mut pipeline = EtlPipeline::new(
        job,
        store,
        &config.pipeline.input_dir,
        &config.pipeline.output_dir,
        config.pipeline.create_dirs,
    )?;

    match cli.command {
        Commands::Run { .. } => match pipeline.run().await {
            Ok(result) => {
                info!("Pipeline finished");
                println!("\n📊 Pipeline results for {}:", result.job_name);
                println!("   Run id: {}", result.run_id);
                println!("   Input datasets: {}", result.input_datasets);
                println!("   Output datasets: {}", result.output_datasets);
                println!("   Duration: {:.2}s", result.duration_secs);
                for path in &result.written {
                    println!("   Wrote {}", path.display());
                }
            }
            Err(e) => {
                error!("Pipeline failed: {}", e);
                return Err(e.into());
            }
        },
        Commands::Extract { .. } => {
            let datasets = pipeline.input_data().await?;
            print_shapes("Input", datasets);
        }
        Commands::Transform { .. } => {
            let datasets = pipeline.output_data().await?;
            print_shapes("Output", datasets);
        }
    }

    Ok(())
}
