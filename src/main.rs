//! harmonia — explore, analyze, play and export harmonic series.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use harmonia::audio::{
    calculate_volume, normalization_factor, render_series, write_wav, AudioEngine,
    HarmonicParams, PeriodicWave, WavFormat,
};
use harmonia::config::AppConfig;
use harmonia::harmonic::{
    default_series_path, load_series, load_series_or_default, reset_series, save_series,
    HarmonicSeries, Preset,
};
use harmonia::polar::{candidate_period, gap_count, remap_to_polar, PolarConfig};
use harmonia::signal::{add_noise, repeat_cycles};
use harmonia::synth::synthesize;
use harmonia::tui::session::state_path_beside;
use harmonia::tui::App;

#[derive(Debug, Parser)]
#[command(name = "harmonia", version, about = "Harmonic series synthesizer and polar explorer")]
struct Cli {
    /// Series file (default ~/.harmonia/harmonics.json).
    #[arg(long, global = true)]
    series: Option<PathBuf>,

    /// Config file (default ~/.harmonia/config.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal explorer (default).
    Explore,
    /// Print peak and mean level of the series' waveform.
    Analyze {
        #[arg(long)]
        discretization: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Fold the waveform onto a circle and print the bins as JSON.
    Polar {
        #[arg(long, default_value_t = 0.0)]
        compression: f64,
        #[arg(long)]
        discretization: Option<usize>,
        #[arg(long)]
        oversampling: Option<f64>,
        /// Repeat the sampled cycle this many times before folding.
        #[arg(long, default_value_t = 1)]
        cycles: usize,
        /// Uniform noise amplitude added before folding.
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Play the series through the default output device.
    Play {
        /// Stop after this many seconds; runs until Ctrl-C otherwise.
        #[arg(long)]
        seconds: Option<f64>,
    },
    /// Render the series to a mono WAV file.
    Export {
        #[arg(long, short)]
        out: PathBuf,
        #[arg(long, default_value_t = 2.0)]
        seconds: f64,
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
        /// Write 32-bit float samples instead of 16-bit integers.
        #[arg(long)]
        float: bool,
    },
    /// Replace the stored series with a preset.
    Preset {
        /// default, square, sawtooth or triangle.
        name: String,
    },
    /// Change one harmonic of the stored series.
    Set {
        /// Position in the series.
        #[arg(long)]
        index: usize,
        #[arg(long)]
        amplify: Option<f64>,
        #[arg(long)]
        shift: Option<f64>,
    },
    /// Delete the stored series.
    Reset,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("harmonia: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_default(),
    };
    let series_path = cli.series.unwrap_or_else(default_series_path);

    match cli.command.unwrap_or(Command::Explore) {
        Command::Explore => explore(&series_path, config),
        Command::Analyze {
            discretization,
            json,
        } => analyze(&series_path, &config, discretization, json),
        Command::Polar {
            compression,
            discretization,
            oversampling,
            cycles,
            noise,
            seed,
        } => {
            let polar = PolarConfig {
                discretization: discretization.unwrap_or(config.polar_discretization),
                oversampling: oversampling.unwrap_or(config.oversampling),
            };
            let options = PolarOptions {
                compression,
                cycles,
                noise,
                seed,
            };
            polar_fold(&series_path, &config, &polar, &options)
        }
        Command::Play { seconds } => play(&series_path, &config, seconds),
        Command::Export {
            out,
            seconds,
            sample_rate,
            float,
        } => {
            let format = if float {
                WavFormat::Float32
            } else {
                WavFormat::Int16
            };
            export(&series_path, &config, &out, seconds, sample_rate, format)
        }
        Command::Preset { name } => {
            let preset = Preset::from_name(&name).ok_or_else(|| {
                let known: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset {name:?} (known: {})", known.join(", "))
            })?;
            save_series(&series_path, &preset.series())?;
            println!("{} -> {}", preset.name(), series_path.display());
            Ok(())
        }
        Command::Set {
            index,
            amplify,
            shift,
        } => set_harmonic(&series_path, index, amplify, shift),
        Command::Reset => {
            reset_series(&series_path)?;
            let state_path = state_path_beside(&series_path);
            if state_path.exists() {
                std::fs::remove_file(&state_path)?;
            }
            println!("removed {}", series_path.display());
            Ok(())
        }
    }
}

fn load_or_default(path: &Path) -> Result<HarmonicSeries, Box<dyn Error>> {
    Ok(load_series(path)?.unwrap_or_default())
}

fn explore(series_path: &Path, config: AppConfig) -> Result<(), Box<dyn Error>> {
    let series = load_series_or_default(series_path);
    let mut app = App::new(series, config)
        .with_series_path(series_path.to_path_buf())
        .with_state_path(state_path_beside(series_path));

    let mut terminal = ratatui::try_init()?;
    let result = app.run(&mut terminal);
    ratatui::restore();
    result?;
    Ok(())
}

fn analyze(
    series_path: &Path,
    config: &AppConfig,
    discretization: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let series = load_or_default(series_path)?;
    let discretization = discretization.unwrap_or(config.waveform_discretization);
    if discretization == 0 {
        return Err("discretization must be positive".into());
    }
    let waveform = synthesize(series.as_slice(), discretization);
    let volume = normalization_factor(waveform.mean_abs_with(config.mean_divisor));

    if json {
        let wave = PeriodicWave::from_series(&series);
        let harmonics: Vec<_> = series
            .audible()
            .map(|h| {
                serde_json::json!({
                    "order": h.order(),
                    "amplify": h.amplify,
                    "shift": h.shift,
                    "params": HarmonicParams::new(h, config.base_frequency),
                })
            })
            .collect();
        let report = serde_json::json!({
            "discretization": discretization,
            "peak": waveform.peak,
            "mean_abs": waveform.mean_abs,
            "sample_mean_abs": waveform.sample_mean_abs(),
            "gain": calculate_volume(volume),
            "base_frequency": config.base_frequency,
            "harmonics": harmonics,
            "periodic_wave": { "real": wave.real, "imag": wave.imag },
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("harmonics:       {}", series.audible().count());
        println!("discretization:  {discretization}");
        println!("peak:            {:.6}", waveform.peak);
        println!("mean |x|:        {:.6}", waveform.mean_abs);
        println!("mean |x| (n+1):  {:.6}", waveform.sample_mean_abs());
        println!("playback gain:   {:.6}", calculate_volume(volume));
    }
    Ok(())
}

struct PolarOptions {
    compression: f64,
    cycles: usize,
    noise: f64,
    seed: u64,
}

fn polar_fold(
    series_path: &Path,
    config: &AppConfig,
    polar: &PolarConfig,
    options: &PolarOptions,
) -> Result<(), Box<dyn Error>> {
    let series = load_or_default(series_path)?;
    let waveform = synthesize(series.as_slice(), config.waveform_discretization.max(1));
    let signal = repeat_cycles(&waveform.samples, options.cycles);
    let signal = add_noise(&signal, options.noise, options.seed);

    let bins = remap_to_polar(&signal, options.compression, polar)?;
    let report = serde_json::json!({
        "compression": options.compression,
        "period": candidate_period(options.compression),
        "gaps": gap_count(&bins),
        "bins": bins,
    });
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn play(
    series_path: &Path,
    config: &AppConfig,
    seconds: Option<f64>,
) -> Result<(), Box<dyn Error>> {
    let series = load_or_default(series_path)?;
    let waveform = synthesize(series.as_slice(), config.waveform_discretization.max(1));
    let volume = normalization_factor(waveform.mean_abs_with(config.mean_divisor));

    let mut engine = AudioEngine::new()?;
    engine.set_base_frequency(config.base_frequency);
    engine.apply(&series, volume)?;
    println!(
        "playing on {} ({} Hz), Ctrl-C to stop",
        engine.device_name(),
        engine.sample_rate()
    );

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs_f64(s.max(0.0)));
    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    engine.silence()?;
    // Let the silence command reach the audio thread before the stream drops.
    thread::sleep(Duration::from_millis(50));
    Ok(())
}

fn export(
    series_path: &Path,
    config: &AppConfig,
    out: &Path,
    seconds: f64,
    sample_rate: u32,
    format: WavFormat,
) -> Result<(), Box<dyn Error>> {
    let series = load_or_default(series_path)?;
    let waveform = synthesize(series.as_slice(), config.waveform_discretization.max(1));
    let volume = normalization_factor(waveform.mean_abs_with(config.mean_divisor));
    let gain = calculate_volume(volume) as f32;

    let samples = render_series(&series, config.base_frequency, gain, seconds, sample_rate);
    write_wav(out, &samples, sample_rate, format)?;
    println!(
        "wrote {:.2}s at {sample_rate} Hz to {}",
        seconds,
        out.display()
    );
    Ok(())
}

fn set_harmonic(
    series_path: &Path,
    index: usize,
    amplify: Option<f64>,
    shift: Option<f64>,
) -> Result<(), Box<dyn Error>> {
    let mut series = load_or_default(series_path)?;
    if index >= series.len() {
        return Err(format!("no harmonic at position {index} (series has {})", series.len()).into());
    }
    if let Some(amplify) = amplify {
        series = series.with_amplify(index, amplify);
    }
    if let Some(shift) = shift {
        series = series.with_shift(index, shift);
    }
    save_series(series_path, &series)?;
    if let Some(h) = series.get(index) {
        println!(
            "harmonic {}: amplify {:.3}, shift {:.3}",
            h.order(),
            h.amplify,
            h.shift
        );
    }
    Ok(())
}
