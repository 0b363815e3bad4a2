use anyhow::Context;
use asset_squeeze::cli::{Args, Commands, SelectionArgs};
use asset_squeeze::config::Config;
use asset_squeeze::constants::INFO_PREFIX;
use asset_squeeze::kinds::KindRegistry;
use asset_squeeze::metadata::MetadataExtractor;
use asset_squeeze::pipeline::Pipeline;
use asset_squeeze::remote::{ApiKey, HttpTransport, RemoteCompressor};
use asset_squeeze::{error, info, logger};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;

    match args.command {
        Commands::Scan { selection } => {
            selection.apply(&mut config);
            // scan never compresses, so it needs no API key
            config.compression.enabled = false;
            config.validate()?;
            let pipeline = build_pipeline(config, &selection);
            let groups = pipeline.scan(&selection.input)?;
            pipeline.report(&groups)?;
        }
        Commands::Compress {
            selection,
            api_key,
            endpoint,
            output_dir,
            quality,
        } => {
            selection.apply(&mut config);
            config.compression.enabled = true;
            if let Some(key) = api_key {
                config.service.api_key = Some(key);
            }
            if let Some(endpoint) = endpoint {
                config.service.endpoint = endpoint;
            }
            if let Some(dir) = output_dir {
                config.compression.output_dir = dir;
            }
            if let Some(quality) = quality {
                config.compression.quality = quality;
            }
            config.validate()?;
            run_compress(build_pipeline(config, &selection), &selection.input)?;
        }
    }

    Ok(())
}

fn build_pipeline(config: Config, selection: &SelectionArgs) -> Pipeline {
    let extractor = MetadataExtractor::new(selection.meta_reader.into_reader());
    Pipeline::new(config, KindRegistry::default(), extractor)
}

fn run_compress(pipeline: Pipeline, input: &str) -> anyhow::Result<()> {
    let config = pipeline.config();
    let api_key = config
        .api_key()
        .map(ApiKey::new)
        .context("missing API key")?;
    let compressor = RemoteCompressor::new(Box::new(HttpTransport::new()?), api_key)
        .with_endpoint(config.service.endpoint.clone())
        .with_output_dir(config.compression.output_dir.clone())
        .with_progress(!logger::is_quiet());

    let groups = pipeline.scan(input)?;
    pipeline.report(&groups)?;

    let summary = pipeline.compress(&groups, &compressor);
    if let Some(failure) = &summary.failure {
        error!("{}", failure);
    }
    info!("\n{} Compressed {} files", INFO_PREFIX, summary.compressed_count());
    pipeline.report_compressed(&summary);

    if summary.failure.is_some() {
        anyhow::bail!(
            "compression stopped after {} files",
            summary.compressed_count()
        );
    }
    Ok(())
}
