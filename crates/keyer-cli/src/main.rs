use clap::{Parser, Subcommand};
use keyer_audio::{PlaybackScheduler, SessionEvent};
use keyer_core::{
    build_events, codec, validate_rate, Conversion, Error, PlaybackConfig, Result,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { text, json } => run_encode(&text, json),
        Commands::Decode { morse, json } => run_decode(&morse, json),
        Commands::Play {
            input,
            morse,
            rate,
            unit,
            freq,
        } => run_play(&input, morse, rate, unit, freq),
    }
}

fn run_encode(text: &str, json: bool) -> Result<()> {
    let conversion = codec::encode(text);
    print_conversion(&conversion, json, "characters")
}

fn run_decode(morse: &str, json: bool) -> Result<()> {
    let conversion = codec::decode(morse);
    print_conversion(&conversion, json, "Morse sequences")
}

fn print_conversion(conversion: &Conversion, json: bool, unit_name: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(conversion)?);
        return Ok(());
    }

    println!("{}", conversion.output);
    if !conversion.is_complete() {
        println!(
            "(Note: the following {unit_name} were not translated: {})",
            conversion.untranslated.join(", ")
        );
    }
    Ok(())
}

fn run_play(input: &str, is_morse: bool, rate: f64, unit: f64, freq: f64) -> Result<()> {
    validate_rate(rate)?;
    if !(unit.is_finite() && unit > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "base unit must be a positive duration, got {unit}"
        )));
    }
    if !(freq.is_finite() && freq > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "tone frequency must be positive, got {freq}"
        )));
    }

    let morse = if is_morse {
        codec::normalize(input)
    } else {
        let conversion = codec::encode(input);
        if !conversion.is_complete() {
            println!(
                "(Note: the following characters were not translated: {})",
                conversion.untranslated.join(", ")
            );
        }
        conversion.output
    };

    if morse.is_empty() {
        println!("Nothing to play.");
        return Ok(());
    }

    let config = PlaybackConfig {
        base_unit_secs: unit,
        tone_frequency_hz: freq,
    };
    let events = build_events(&morse, rate, &config);

    tracing::info!(rate, events = events.len(), "starting playback");
    println!("Playing at {rate:.1}x: {morse}");

    let scheduler = PlaybackScheduler::new()?;
    scheduler.start(events)?;

    loop {
        match scheduler.recv_event() {
            Some(SessionEvent::Started) => {}
            Some(SessionEvent::Finished) => {
                println!("Playback finished.");
                return Ok(());
            }
            Some(SessionEvent::Stopped) => {
                println!("Playback stopped.");
                return Ok(());
            }
            Some(SessionEvent::Error(message)) => {
                return Err(Error::AudioUnavailable(message));
            }
            None => return Err(Error::ChannelClosed),
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Morse code translator and player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text to Morse code.
    Encode {
        /// Text to translate.
        text: String,
        /// Emit the result and problem report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Translate Morse code to text.
    Decode {
        /// Morse input: dots, dashes, spaces between symbols, `/` between
        /// words. Repeated whitespace is tolerated.
        morse: String,
        /// Emit the result and problem report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Play input as audible Morse code.
    Play {
        /// Text to play, or raw Morse with `--morse`.
        input: String,
        /// Treat the input as Morse instead of text.
        #[arg(long)]
        morse: bool,
        /// Playback rate multiplier; scales all durations inversely.
        #[arg(long, default_value_t = 1.0)]
        rate: f64,
        /// Base dot duration in seconds.
        #[arg(long, default_value_t = 0.12)]
        unit: f64,
        /// Tone frequency in Hz.
        #[arg(long, default_value_t = 600.0)]
        freq: f64,
    },
}
