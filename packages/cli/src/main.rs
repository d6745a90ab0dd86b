#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for mirroring CGR gazette documents to S3.
//!
//! Expands the requested dates, then mirrors every new PDF published on
//! each date into the configured bucket. Uses `indicatif-log-bridge` (via
//! [`cgr_mirror_cli_utils::init_logger`]) so log lines and the progress
//! bar never fight for the terminal.

mod dates;

use cgr_mirror_cli_utils::IndicatifProgress;
use cgr_mirror_gazette::artifact::ArtifactMover;
use cgr_mirror_gazette::fetch::CgrClient;
use cgr_mirror_gazette::processor::{DEFAULT_MAX_PAGES, DateProcessor, Mirror};
use cgr_mirror_storage::{
    DEFAULT_BUCKET, DEFAULT_PROFILE, DEFAULT_REGION, S3Sink, StorageConfig,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cgr_mirror",
    about = "Mirror CGR gazette PDFs for the given dates into S3"
)]
struct Cli {
    /// Date to mirror (YYYY-MM-DD). May be repeated.
    #[arg(short, long = "date")]
    dates: Vec<String>,
    /// First day of an inclusive range (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,
    /// Last day of an inclusive range (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,
    /// AWS region of the bucket
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,
    /// Destination bucket
    #[arg(long, default_value = DEFAULT_BUCKET)]
    bucket: String,
    /// AWS profile to load credentials from
    #[arg(long, default_value = DEFAULT_PROFILE)]
    profile: String,
    /// Maximum number of result pages fetched per date
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,
    /// S3-compatible endpoint (overrides `CGR_MIRROR_ENDPOINT_URL`)
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = cgr_mirror_cli_utils::init_logger();
    let cli = Cli::parse();

    let dates = dates::expand_dates(
        &cli.dates,
        cli.start_date.as_deref(),
        cli.end_date.as_deref(),
    )?;

    let storage = StorageConfig {
        bucket: cli.bucket,
        region: cli.region,
        profile: Some(cli.profile).filter(|p| !p.trim().is_empty()),
        endpoint_url: cli.endpoint_url,
    }
    .with_env_overrides();

    let client = CgrClient::new()?;
    let sink = S3Sink::connect(&storage).await?;
    log::info!("Mirroring into bucket {} ({})", sink.bucket(), storage.region);

    let processor = DateProcessor::new(&client, ArtifactMover::new(&client, &sink))
        .with_max_pages(cli.max_pages);
    let progress = IndicatifProgress::dates_bar(&multi, "Mirroring gazette");

    let summary = Mirror::new(processor)
        .with_progress(progress)
        .run(&dates)
        .await;

    log::info!("Summary: {summary}");
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    log::info!("All done.");

    Ok(())
}
