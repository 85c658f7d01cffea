//! Binary entry point for the subtitle merger.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use srtmerge_core::transcribe::{openai::OpenAiTranscriber, PinyinTranscriber};
use srtmerge_core::{SubtitleStore, Transcriber};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line options for the binary.
#[derive(Parser)]
#[command(version, about = "Merge and annotate SubRip subtitle tracks")]
struct Cli {
    /// Enable verbose debug and trace logs.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// The operations the binary exposes, one per store operation.
#[derive(Subcommand)]
enum Command {
    /// Scan an SRT file and write it back out in start-time key order.
    Print {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Append the text of `secondary` to every cue of `primary` with the same start time.
    Merge {
        primary: PathBuf,
        secondary: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Append a phonetic reading to every cue.
    Annotate {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Backend::Pinyin)]
        backend: Backend,
    },
}

/// Which transcription service produces the reading.
#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Local dictionary lookup, Mandarin only.
    Pinyin,
    /// OpenAI chat completions; needs `OPENAI_API_KEY`.
    Openai,
}

/// Install the tracing subscriber.
/// This function should turn on trace output for both crates when `debug` is set.
fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::default()
            .add_directive("srtmerge=trace".parse()?)
            .add_directive("srtmerge_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("srtmerge=info".parse()?)
            .add_directive("srtmerge_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Application entry point which parses CLI args and runs one subcommand.
/// Any scan, merge, annotate or write failure ends the process with an error.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;
    match cli.command {
        Command::Print { input, output } => {
            SubtitleStore::from_path(&input)?.write_srt(&output)?;
        }
        Command::Merge {
            primary,
            secondary,
            output,
        } => {
            let primary = SubtitleStore::from_path(&primary)?;
            let secondary = SubtitleStore::from_path(&secondary)?;
            primary.merge(&secondary)?.write_srt(&output)?;
        }
        Command::Annotate {
            input,
            output,
            backend,
        } => {
            let transcriber: Box<dyn Transcriber> = match backend {
                Backend::Pinyin => Box::new(PinyinTranscriber),
                Backend::Openai => Box::new(OpenAiTranscriber::new()?),
            };
            info!("annotating {}", input.display());
            SubtitleStore::from_path(&input)?
                .annotate(transcriber.as_ref())?
                .write_srt(&output)?;
        }
    }
    Ok(())
}
