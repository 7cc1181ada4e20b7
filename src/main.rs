//! `uef-player`: play a UEF cassette image as tape audio.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{debug, LevelFilter};

use uef_player::transport::{take_control_token, ControlFilePoller, StatusFiles, CONTROL_FILE_NAME};
use uef_player::{
    CommandChannel, PlayerConfig, PositionObserver, TapePlayer, UefFile, UefFileLoader, WavSink,
    WaveformSynth,
};

const NO_DEVICE_PLAYBACK: &str =
    "device playback is unavailable in this build; rebuild with `--features streaming` or pass --output <WAV>";

#[derive(Debug, ClapParser)]
#[command(
    name    = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about   = "UEF tape player with 0-based data block navigation",
)]
struct Args {
    /// UEF file to play (plain or gzip-compressed)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Control file polled for pause/resume/stop/rewind/fastforward/jump:N
    #[arg(long, value_name = "PATH")]
    control: Option<PathBuf>,

    /// Directory receiving current_block.txt, total_blocks.txt and next_block.txt
    #[arg(long, value_name = "DIR")]
    status_dir: Option<PathBuf>,

    /// Render to a WAV file instead of the audio device
    #[arg(long, short, value_name = "WAV")]
    output: Option<PathBuf>,

    /// Print the chunk table and exit
    #[arg(long)]
    list: bool,

    /// Player configuration (JSON)
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut env_builder = env_logger::Builder::from_default_env();
    if args.verbose {
        env_builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        env_builder.filter_level(LevelFilter::Info);
    }
    env_builder.format_timestamp_secs();
    env_builder.try_init()?;

    if args.output.is_none() && !args.list && !cfg!(feature = "streaming") {
        anyhow::bail!(NO_DEVICE_PLAYBACK);
    }

    let config = match &args.config {
        Some(path) => PlayerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PlayerConfig::default(),
    };

    let start = Instant::now();
    let tape = UefFileLoader::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    let blocks = tape.data_block_count();
    println!(
        "Loaded {} chunks ({} data blocks) in {:.2}s",
        tape.chunks.len(),
        blocks,
        start.elapsed().as_secs_f64()
    );

    if args.list {
        print_chunk_table(&tape, &WaveformSynth::new(config.synth_params()));
        return Ok(());
    }

    if blocks > 0 {
        println!("Data blocks are numbered 0 to {}", blocks - 1);
    } else {
        println!("Tape contains no data blocks");
    }

    let control = args
        .control
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(CONTROL_FILE_NAME));
    if let Some(stale) = take_control_token(&control) {
        debug!("Discarded stale control command '{}'", stale);
    }
    let status_dir = args.status_dir.clone().unwrap_or_else(std::env::temp_dir);

    let commands = CommandChannel::new();
    let _poller = ControlFilePoller::spawn(&control, commands.clone())
        .context("failed to start control file poller")?;
    let mut player = TapePlayer::new(&tape.chunks, config, commands, StatusFiles::new(status_dir));

    println!("Starting playback...");
    match &args.output {
        Some(path) => {
            let sink = WavSink::create(path, config.sample_rate)?;
            player.run(sink)?;
            println!("Wrote {}", path.display());
        }
        None => play_on_device(&mut player, &config)?,
    }

    Ok(())
}

fn print_chunk_table(tape: &UefFile, synth: &WaveformSynth) {
    println!(
        "UEF v{}.{}",
        tape.header.major_version, tape.header.minor_version
    );
    println!("{:>5}  {:>6}  {:>5}  {:>7}  {:>8}  Type", "Chunk", "Id", "Block", "Bytes", "Seconds");

    let mut block = 0;
    let mut total = 0.0;
    for (index, chunk) in tape.chunks.iter().enumerate() {
        let label = if chunk.is_data_block() {
            block += 1;
            (block - 1).to_string()
        } else {
            "-".to_string()
        };
        let seconds = synth.duration_seconds(chunk);
        total += seconds;
        println!(
            "{:>5}  0x{:04x}  {:>5}  {:>7}  {:>8.3}  {}",
            index,
            chunk.id(),
            label,
            chunk.payload().len(),
            seconds,
            chunk.kind().description()
        );
    }
    println!("Total playing time: {}", format_duration(total));
}

fn format_duration(seconds: f64) -> String {
    let whole = seconds.round() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(feature = "streaming")]
fn play_on_device<O: PositionObserver>(
    player: &mut TapePlayer<'_, O>,
    config: &PlayerConfig,
) -> Result<()> {
    use uef_player::{DeviceSink, StreamConfig};

    let sink = DeviceSink::open(StreamConfig::from(config), config.stall_timeout())
        .context("failed to open audio device")?;
    player.run(sink)?;
    Ok(())
}

#[cfg(not(feature = "streaming"))]
fn play_on_device<O: PositionObserver>(
    _player: &mut TapePlayer<'_, O>,
    _config: &PlayerConfig,
) -> Result<()> {
    anyhow::bail!(NO_DEVICE_PLAYBACK)
}
