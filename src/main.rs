use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use govee_ble_lib::ble::{BtleplugConnector, find_peripheral};
use govee_ble_lib::effects::EmptyCatalog;
use govee_ble_lib::{
    Capabilities, CatalogDirectory, DeviceIdentity, EffectCatalog, EffectRef, GoveeLight, LightIntent, Rgb,
    SessionConfig, TurnOn, build_commands,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Control Govee BLE light strips", long_about = None)]
struct Cli {
    /// Directory holding <MODEL>.json effect catalogs.
    #[arg(short, long, default_value = "jsons", global = true)]
    catalog: PathBuf,
    /// Also write logs to this file.
    #[arg(short, long, global = true)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Turn the light on, optionally setting brightness, color and effect.
    On {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        settings: OnSettings,
    },
    /// Turn the light off.
    Off {
        #[command(flatten)]
        target: Target,
    },
    /// Print the frames an intent would send, without connecting.
    Frames {
        /// Model id, e.g. H6199.
        #[arg(short, long)]
        model: String,
        /// Show the turn-off frame instead.
        #[arg(long)]
        off: bool,
        #[command(flatten)]
        settings: OnSettings,
    },
    /// List the effects available for a model.
    Effects {
        #[arg(short, long)]
        model: String,
    },
    /// List the models that have an effect catalog.
    Models,
}

#[derive(Args, Debug)]
struct Target {
    /// Bluetooth address, e.g. A4:C1:38:12:34:56.
    #[arg(short, long)]
    address: String,
    /// Model id, e.g. H6199.
    #[arg(short, long)]
    model: String,
    /// Connection attempts before giving up.
    #[arg(long, default_value_t = 3)]
    attempts: u8,
    /// Pause between connection attempts in milliseconds.
    #[arg(long, default_value_t = 250)]
    retry_delay_ms: u64,
}

#[derive(Args, Debug)]
struct OnSettings {
    /// Brightness, 0-255.
    #[arg(short, long)]
    brightness: Option<u8>,
    /// Color as R,G,B.
    #[arg(short, long)]
    rgb: Option<Rgb>,
    /// Effect name as listed by `effects`, or just its [c/s/l/s] index.
    #[arg(short, long)]
    effect: Option<EffectRef>,
}

impl From<&OnSettings> for TurnOn {
    fn from(settings: &OnSettings) -> Self {
        TurnOn {
            brightness: settings.brightness,
            rgb: settings.rgb,
            effect: settings.effect,
        }
    }
}

fn setup_logging(log_file_path: Option<PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = if let Some(ref path) = log_file_path {
        let log_file = File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }
    Ok(guard)
}

/// Open the catalog directory, or fall back to an empty catalog when it is absent
fn load_catalog(dir: &Path) -> Result<Arc<dyn EffectCatalog>> {
    if !dir.is_dir() {
        info!("No catalog directory at {:?}; effects are unavailable", dir);
        return Ok(Arc::new(EmptyCatalog));
    }
    let catalog = CatalogDirectory::open(dir).with_context(|| format!("Failed to load catalogs from {:?}", dir))?;
    Ok(Arc::new(catalog))
}

async fn connect_light(target: &Target, catalog: Arc<dyn EffectCatalog>) -> Result<GoveeLight<BtleplugConnector>> {
    let peripheral = find_peripheral(&target.address)
        .await
        .with_context(|| format!("Could not find {}", target.address))?;
    let config = SessionConfig::default()
        .with_connect_attempts(target.attempts)
        .with_retry_delay(Duration::from_millis(target.retry_delay_ms));

    Ok(GoveeLight::new(
        DeviceIdentity::new(&target.address, &target.model),
        BtleplugConnector::new(peripheral),
    )
    .with_catalog(catalog)
    .with_config(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.clone(), &cli.verbose)?;

    match &cli.command {
        CliCommand::On { target, settings } => {
            let catalog: Arc<dyn EffectCatalog> = if settings.effect.is_some() {
                load_catalog(&cli.catalog)?
            } else {
                Arc::new(EmptyCatalog)
            };
            let light = connect_light(target, catalog).await?;
            let report = light.turn_on(settings.into()).await?;
            println!("Handed {} frames to {}", report.frames, light.identity());
        }
        CliCommand::Off { target } => {
            let light = connect_light(target, Arc::new(EmptyCatalog)).await?;
            let report = light.turn_off().await?;
            println!("Handed {} frames to {}", report.frames, light.identity());
        }
        CliCommand::Frames { model, off, settings } => {
            let intent = if *off {
                LightIntent::TurnOff
            } else {
                LightIntent::TurnOn(settings.into())
            };
            let catalog = load_catalog(&cli.catalog)?;
            let capabilities = Capabilities::resolve(model);
            println!("{} [{}]", model, capabilities);
            let frames = build_commands(&intent, model, capabilities, catalog.as_ref())?;
            for (i, frame) in frames.iter().enumerate() {
                println!("{:3}: {}", i + 1, hex::encode(frame.to_array()));
            }
        }
        CliCommand::Effects { model } => {
            let catalog = load_catalog(&cli.catalog)?;
            let effects = catalog.effects(model);
            if effects.is_empty() {
                println!("No effects for {}", model);
            }
            for entry in effects {
                println!("{}", entry.name);
            }
        }
        CliCommand::Models => {
            let catalog = CatalogDirectory::open(&cli.catalog)
                .with_context(|| format!("Failed to load catalogs from {:?}", cli.catalog))?;
            for model in catalog.models() {
                println!("{}", model);
            }
        }
    }

    Ok(())
}
