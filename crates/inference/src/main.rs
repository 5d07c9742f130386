use clap::{Parser, Subcommand};
use inference::{
    AnalyzerConfig, CancelToken, GeoPoint, LogReporter, Pipeline, logging::setup_logging,
};
use preprocess::RawImage;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "ort-backend")]
use inference::backend::ort::{ExecutionProvider, OrtBackend as Backend};

#[cfg(not(feature = "ort-backend"))]
compile_error!("The 'ort-backend' feature must be enabled to build the analyzer binary");

#[derive(Parser, Debug)]
#[command(name = "krishi-analyzer", about = "Offline wheat disease analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a single close-up crop photo
    Diagnose {
        image: PathBuf,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Tile a drone image and summarize field health
    Field {
        image: PathBuf,
        /// Override PATCH_SIZE for this run
        #[arg(long)]
        patch_size: Option<u32>,
        /// Also print the severity heatmap grid
        #[arg(long)]
        heatmap: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AnalyzerConfig::from_env()?;

    if let Command::Field {
        patch_size: Some(size),
        ..
    } = &cli.command
    {
        config.patch_size = *size;
        config.validate()?;
    }

    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let pipeline = Arc::new(Pipeline::from_config(&config).with_reporter(Arc::new(LogReporter)));

    tracing::info!("Loading inference model");
    let provider = ExecutionProvider::parse(&config.execution_provider);
    let intra_threads = config.intra_threads;
    let load = pipeline.spawn_load(config.model_asset(), move |path| {
        Backend::load_model_with_provider(path, provider, intra_threads)
    });

    // Decode while the model loads.
    let image_path = match &cli.command {
        Command::Diagnose { image, .. } | Command::Field { image, .. } => image.clone(),
    };
    let image = tokio::task::spawn_blocking(move || RawImage::open(&image_path)).await?;

    load.await?.map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))?;
    let image = image.map_err(|e| anyhow::anyhow!("Failed to load image. ({e})"))?;

    match cli.command {
        Command::Diagnose { lat, lon, .. } => {
            let location = lat.zip(lon).map(|(latitude, longitude)| GeoPoint {
                latitude,
                longitude,
            });
            let diagnosis = pipeline
                .diagnose_async(image, location)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))?;
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        }
        Command::Field { heatmap, .. } => {
            let cancel = CancelToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling field analysis");
                    on_interrupt.cancel();
                }
            });

            let report = pipeline
                .analyze_field_async(image, cancel)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))?;

            let output = if heatmap {
                serde_json::json!({ "report": report, "heatmap": report.heatmap() })
            } else {
                serde_json::to_value(&report)?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
