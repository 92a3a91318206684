use tracing::info;

use crate::analyzers::SeriesAnalyzer;
use crate::cli::args::{Cli, Commands, PipelineArgs};
use crate::error::{ProcessingError, Result};
use crate::fetch::OpenMeteoClient;
use crate::models::SeriesFile;
use crate::processors::{IngestPipeline, ProvinceAggregator};
use crate::readers::series_reader::read_json;
use crate::readers::RegionCatalog;
use crate::settings::PipelineConfig;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Fetch { pipeline } => {
            let config = load_config(&pipeline)?;
            fetch(&config, &pipeline).await?;
        }

        Commands::Aggregate { pipeline } => {
            let config = load_config(&pipeline)?;
            aggregate(&config, &pipeline).await?;
        }

        Commands::Run { pipeline } => {
            let config = load_config(&pipeline)?;
            let ingest = fetch(&config, &pipeline).await;
            // Aggregate whatever completed, even when some districts failed
            aggregate(&config, &pipeline).await?;
            ingest?;
        }

        Commands::Info { file, sample } => {
            println!("Analyzing series file: {}", file.display());

            let series: SeriesFile = read_json(&file)?;
            let stats = SeriesAnalyzer::new().analyze(&series)?;
            println!("\n{}", stats.detailed_summary());

            if sample > 0 {
                let data = series.data();
                println!("\nSample Buckets (showing {} of {}):", sample.min(data.len()), data.len());
                for (i, time) in data.time.iter().take(sample).enumerate() {
                    let values: Vec<String> = data
                        .parameters
                        .iter()
                        .map(|(name, values)| match values.get(i).copied().flatten() {
                            Some(v) => format!("{}={:.2}", name, v),
                            None => format!("{}=null", name),
                        })
                        .collect();
                    println!("{}. {}: {}", i + 1, time, values.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn load_config(args: &PipelineArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;

    if let Some(root) = &args.data_root {
        config.data_root = root.clone();
    }
    if let Some(workers) = args.max_workers {
        config.aggregation.max_workers = workers;
    }
    if let Some(alignment) = args.alignment {
        config.aggregation.alignment = alignment;
    }

    config.check()?;
    Ok(config)
}

async fn fetch(config: &PipelineConfig, args: &PipelineArgs) -> Result<()> {
    println!("Fetching hourly archives...");
    println!("Output root: {}", config.data_root.display());
    println!(
        "Window: {} to {} ({})",
        config.fetch.start_date,
        config.fetch.end_date,
        config.fetch.parameters.join(", ")
    );

    let catalog = RegionCatalog::from_files(
        &config.catalog.provinces_path,
        &config.catalog.districts_path,
    )?;
    let total = match args.parent.as_deref() {
        Some(name) => catalog.parent(name).map_or(0, |p| p.children.len()),
        None => catalog.entity_count(),
    };
    info!(
        parents = catalog.parents().len(),
        entities = total,
        "Loaded region catalog"
    );

    let client = OpenMeteoClient::new(&config.fetch.base_url, config.timeout())?;
    let pipeline = IngestPipeline::new(client, config.archive_window(), &config.data_root)
        .with_retry(config.retry_policy())
        .with_request_delay(config.request_delay())
        .with_force(args.force);

    let progress = ProgressReporter::new(total as u64, "Fetching districts...", false);
    let summary = pipeline
        .run(&catalog, args.parent.as_deref(), Some(&progress))
        .await?;
    progress.finish_with_message(&format!("Wrote {} districts", summary.written.len()));

    println!("\n{}", summary.generate_summary());

    if !summary.failed.is_empty() {
        return Err(ProcessingError::IngestFailed {
            failed: summary.failed.len(),
        });
    }
    Ok(())
}

async fn aggregate(config: &PipelineConfig, args: &PipelineArgs) -> Result<()> {
    println!("Aggregating provinces...");
    println!(
        "Workers: {}, Alignment: {:?}",
        config.aggregation.max_workers, config.aggregation.alignment
    );

    let aggregator = ProvinceAggregator::new(&config.data_root)
        .with_alignment(config.aggregation.alignment)
        .with_max_workers(config.aggregation.max_workers)
        .with_force(args.force);
    let only = args.parent.clone();

    let report = tokio::task::spawn_blocking(move || {
        let total = match &only {
            Some(_) => 1,
            None => aggregator.parent_names()?.len(),
        };
        let progress = ProgressReporter::new(total as u64, "Aggregating provinces...", false);
        let report = aggregator.aggregate_all(only.as_deref(), Some(&progress))?;
        progress.finish_with_message(&format!("Aggregated {} provinces", report.succeeded.len()));
        Ok::<_, ProcessingError>(report)
    })
    .await??;

    println!("\n{}", report.generate_summary());

    if !report.failed.is_empty() {
        return Err(ProcessingError::AggregationFailed {
            failed: report.failed.len(),
            total: report.total(),
        });
    }
    Ok(())
}
