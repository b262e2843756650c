//! Pulsegen CLI
//!
//! Generates synthetic HTTP request events and posts them straight to a
//! Honeycomb-style ingestion API, as if an instrumented service had sent them.
//!
//! # Usage
//!
//! ```bash
//! export HONEYCOMB_API_KEY=your_api_key
//! pulsegen
//! pulsegen --count 500 --error-rate 0.2 --dataset staging-traffic
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use shared::catalog::Catalog;
use shared::synth::{
    EventSink, HoneycombSink, IngestConfig, SynthConfig, Synthesizer, TrafficGenerator,
    DEFAULT_BASE_URL, DEFAULT_DATASET,
};
use std::time::Duration;

/// Pulsegen - synthetic traffic generator for observability pipelines
#[derive(Parser, Debug)]
#[command(name = "pulsegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ingestion API key
    #[arg(long, env = "HONEYCOMB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Dataset events are written to
    #[arg(short, long, env = "HONEYCOMB_DATASET", default_value = DEFAULT_DATASET)]
    dataset: String,

    /// Base URL of the events API
    #[arg(long, env = "HONEYCOMB_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Number of events to send
    #[arg(short, long, default_value_t = 100)]
    count: usize,

    /// Pause between events, in milliseconds
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    /// Probability of injecting a slow error response
    #[arg(long, default_value_t = 0.05)]
    error_rate: f64,

    /// Value of `service.name` on every event
    #[arg(long, default_value = "podinfo")]
    service: String,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

/// Everything needed for a run, validated up front.
#[derive(Debug)]
struct RunPlan {
    ingest: IngestConfig,
    synth: SynthConfig,
    count: usize,
    seed: Option<u64>,
}

impl Cli {
    /// Validates the arguments before any event is generated.
    fn plan(self) -> Result<RunPlan> {
        let ingest = IngestConfig::new(self.api_key, self.dataset, &self.api_url)
            .context("Invalid ingestion settings")?;

        let synth = SynthConfig::default()
            .with_service_name(self.service)
            .with_error_rate(self.error_rate)
            .with_interval(Duration::from_millis(self.interval_ms));
        synth.validate().context("Invalid generator settings")?;

        Ok(RunPlan {
            ingest,
            synth,
            count: self.count,
            seed: self.seed,
        })
    }
}

/// Runs the synthesizer and hands the sink back.
async fn run<S: EventSink>(plan: RunPlan, sink: S) -> Result<S> {
    let catalog = Catalog::default();
    let generator = match plan.seed {
        Some(seed) => TrafficGenerator::seeded(catalog, plan.synth, seed),
        None => TrafficGenerator::new(catalog, plan.synth),
    }
    .context("Invalid generator settings")?;

    let mut synthesizer = Synthesizer::new(generator, sink);
    synthesizer.generate_and_send(plan.count).await;
    Ok(synthesizer.into_sink())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let plan = Cli::parse().plan()?;
    let sink = HoneycombSink::new(plan.ingest.clone()).context("Failed to create HTTP client")?;

    tracing::info!(
        dataset = %plan.ingest.dataset,
        url = %sink.url(),
        api_key = %plan.ingest.masked_api_key(),
        count = plan.count,
        "Generating synthetic traffic"
    );

    let dataset = plan.ingest.dataset.clone();
    run(plan, sink).await?;

    tracing::info!(
        %dataset,
        "Check the dataset for service.name, http.status_code and duration_ms"
    );
    Ok(())
}
