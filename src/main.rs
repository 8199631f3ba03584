mod config;
mod display;
mod error;
mod help;
mod logging;
mod marker;
mod render;
mod session;
mod settings;
mod source;
mod spectrum;
mod terminal;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{SampleFormat, Window};
use render::{HeadlessRenderer, RenderAdapter, TerminalRenderer};
use session::Session;
use settings::Settings;
use source::{DeviceSource, SampleSource, ToneSource};
use spectrum::SpectrumEngine;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "specan")]
#[command(version = "0.1.0")]
#[command(about = "Terminal oscilloscope and spectrum analyzer for live audio input", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/specan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file (default: /tmp/specan.log, stderr when headless)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print readings for this many ticks instead of opening the display
    #[arg(long, global = true, value_name = "TICKS")]
    headless: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse an input device (default)
    Live {
        /// Input device name (see `specan devices`)
        #[arg(short, long)]
        device: Option<String>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Analyse a generated sine tone
    Tone {
        /// Tone frequency in Hz
        #[arg(short, long)]
        freq: Option<f32>,

        /// Peak amplitude relative to full scale (0.0-1.0)
        #[arg(short, long)]
        amplitude: Option<f32>,

        /// White noise level relative to full scale (0.0-1.0)
        #[arg(short, long)]
        noise: Option<f32>,

        /// Random seed for reproducible noise
        #[arg(short, long)]
        seed: Option<u64>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// List audio input devices
    Devices,
}

/// Overrides for the `[source]`, `[spectrum]` and `[display]` tables
#[derive(Args, Default)]
struct AnalysisArgs {
    /// Sample rate in Hz
    #[arg(long)]
    rate: Option<u32>,

    /// Input channels (only the first is analysed)
    #[arg(long)]
    channels: Option<u16>,

    /// Samples per frame (power of two)
    #[arg(long)]
    chunk: Option<usize>,

    /// Sample format: i8, i16, i32
    #[arg(long, value_parser = parse_format)]
    format: Option<SampleFormat>,

    /// Window applied before the transform: none, hann, hamming
    #[arg(long, value_parser = parse_window)]
    window: Option<Window>,

    /// Refresh interval in milliseconds
    #[arg(long)]
    interval: Option<u64>,

    /// Leading bins skipped by the peak search
    #[arg(long)]
    exclude_bins: Option<usize>,

    /// Magnitude normalization divisor
    #[arg(long)]
    divisor: Option<f32>,
}

impl AnalysisArgs {
    fn apply(self, settings: &mut Settings) {
        if let Some(rate) = self.rate {
            settings.source.sample_rate = rate;
        }
        if let Some(channels) = self.channels {
            settings.source.channels = channels;
        }
        if let Some(chunk) = self.chunk {
            settings.source.chunk_size = chunk;
        }
        if let Some(format) = self.format {
            settings.source.sample_format = format;
        }
        if let Some(window) = self.window {
            settings.spectrum.window = window;
        }
        if let Some(interval) = self.interval {
            settings.display.tick_interval_ms = interval;
        }
        if let Some(bins) = self.exclude_bins {
            settings.spectrum.dc_exclusion_bins = bins;
        }
        if let Some(divisor) = self.divisor {
            settings.spectrum.normalization_divisor = divisor;
        }
    }
}

fn parse_format(s: &str) -> Result<SampleFormat, String> {
    SampleFormat::parse(s).ok_or_else(|| format!("unknown sample format '{}' (use i8, i16, i32)", s))
}

fn parse_window(s: &str) -> Result<Window, String> {
    Window::parse(s).ok_or_else(|| format!("unknown window '{}' (use none, hann, hamming)", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref(), cli.headless.is_some());

    let mut settings = Settings::load(cli.config.as_deref());
    let command = cli.command.unwrap_or(Commands::Live {
        device: None,
        analysis: AnalysisArgs::default(),
    });

    match command {
        Commands::Live { device, analysis } => {
            analysis.apply(&mut settings);
            if device.is_some() {
                settings.source.device = device;
            }
            settings.validate().context("invalid configuration")?;

            let source = DeviceSource::open(&settings.source).context("failed to open audio input")?;
            run_session(source, &settings, cli.headless)
        }
        Commands::Tone { freq, amplitude, noise, seed, analysis } => {
            analysis.apply(&mut settings);
            if let Some(freq) = freq {
                settings.tone.frequency_hz = freq;
            }
            if let Some(amplitude) = amplitude {
                settings.tone.amplitude = amplitude;
            }
            if let Some(noise) = noise {
                settings.tone.noise = noise;
            }
            if seed.is_some() {
                settings.tone.seed = seed;
            }
            settings.validate().context("invalid configuration")?;
            settings
                .tone
                .validate(settings.source.sample_rate)
                .context("invalid tone")?;

            let source = ToneSource::new(&settings.source, &settings.tone).paced(cli.headless.is_none());
            run_session(source, &settings, cli.headless)
        }
        Commands::Devices => {
            let devices = source::device::list_devices().context("failed to enumerate input devices")?;
            if devices.is_empty() {
                println!("No input devices found");
            }
            for info in devices {
                let marker = if info.is_default { "*" } else { " " };
                match info.default_config {
                    Some(config) => println!("{} {}  ({})", marker, info.name, config),
                    None => println!("{} {}", marker, info.name),
                }
            }
            Ok(())
        }
    }
}

fn run_session<S: SampleSource>(source: S, settings: &Settings, headless: Option<usize>) -> Result<()> {
    let engine = SpectrumEngine::new(&settings.source, &settings.spectrum);
    let interval = Duration::from_millis(settings.display.tick_interval_ms);
    let mut session = Session::new(source, engine, interval);
    log::info!(
        "Analysing {} samples at {}Hz every {}ms",
        settings.source.chunk_size,
        settings.source.sample_rate,
        settings.display.tick_interval_ms
    );

    match headless {
        Some(ticks) => drive(&mut session, &mut HeadlessRenderer::new(io::stdout(), ticks)),
        None => {
            let mut renderer =
                TerminalRenderer::new(settings.display.clone()).context("failed to set up terminal")?;
            drive(&mut session, &mut renderer)
        }
    }
}

fn drive<S: SampleSource, R: RenderAdapter>(session: &mut Session<S>, renderer: &mut R) -> Result<()> {
    session.run(renderer).context("analysis stopped")
}
