
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use frames::Message;
use serde::Deserialize;
use serde_json::Value;
use topology::{Action, Editor, EditorConfig, Event};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("envelope codec failed: {0}")]
    Codec(#[from] frames::CodecError),
    #[error("editor rejected input: {0}")]
    Editor(#[from] topology::EditorError),
    #[error("trace line {line}: {source}")]
    Trace { line: usize, source: serde_json::Error },
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "topo", about = "Headless topology editor tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a recorded trace through a headless editor and print the result.
    Replay(ReplayArgs),
    /// Convert a JSON envelope to the binary envelope encoding.
    Encode(ConvertArgs),
    /// Convert a binary envelope back to JSON.
    Decode(ConvertArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(help = "Trace file (JSON lines), or - for stdin")]
    trace: String,

    #[arg(long, env = "TOPO_VIEWPORT_WIDTH", default_value_t = 1280.0)]
    width: f64,

    #[arg(long, env = "TOPO_VIEWPORT_HEIGHT", default_value_t = 800.0)]
    height: f64,

    #[arg(long, env = "TOPO_CLIENT_ID", default_value_t = 0)]
    client_id: u64,

    #[arg(long, default_value_t = false, help = "Print every outbound envelope as it is sent")]
    show_outbound: bool,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long, short, help = "Output file path; stdout when omitted")]
    output: Option<PathBuf>,
}

/// One line of a replay trace.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TraceLine {
    /// A raw input or command event, as the host would deliver it.
    Event(Event),
    /// A `[type, payload]` envelope as the relay would deliver it.
    Inbound(Value),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ReplaySummary {
    events: usize,
    inbound: usize,
    outbound: usize,
    skipped: usize,
}

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Replay(args) => run_replay(args),
        Command::Encode(args) => run_encode(args),
        Command::Decode(args) => run_decode(args),
    };
    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run_replay(args: ReplayArgs) -> Result<(), CliError> {
    let config = EditorConfig { width: args.width, height: args.height, client_id: args.client_id, ..EditorConfig::default() };
    let mut editor = Editor::new(config);
    let reader = open_reader(&args.trace)?;
    let mut stdout = io::stdout().lock();
    let outbound: Option<&mut dyn Write> = if args.show_outbound { Some(&mut stdout as &mut dyn Write) } else { None };
    let summary = replay(&mut editor, reader, outbound)?;
    info!(
        events = summary.events,
        inbound = summary.inbound,
        outbound = summary.outbound,
        skipped = summary.skipped,
        "replay finished"
    );

    let snapshot = frames::to_envelope(&Message::Snapshot(editor.snapshot()))?;
    let rendered = serde_json::to_string_pretty(&snapshot)?;
    writeln!(stdout, "{rendered}").map_err(CliError::Write)
}

/// Feed every trace line to `editor`, writing outbound envelopes to
/// `outbound` when given.
fn replay(editor: &mut Editor, reader: impl BufRead, mut outbound: Option<&mut dyn Write>) -> Result<ReplaySummary, CliError> {
    let mut summary = ReplaySummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Io { path: "trace".to_owned(), source })?;
        let Some(entry) = parse_trace_line(index + 1, &line)? else {
            summary.skipped += 1;
            continue;
        };
        let actions = match entry {
            TraceLine::Event(event) => {
                summary.events += 1;
                editor.handle(event)
            }
            TraceLine::Inbound(envelope) => {
                summary.inbound += 1;
                editor.receive(&envelope.to_string())?
            }
        };
        for action in actions {
            let Action::Send(text) = action else {
                continue;
            };
            summary.outbound += 1;
            if let Some(out) = outbound.as_deref_mut() {
                writeln!(out, "{text}").map_err(CliError::Write)?;
            }
        }
    }
    Ok(summary)
}

/// Parse one trace line. Blank lines and `#` comments yield `None`.
fn parse_trace_line(line_number: usize, line: &str) -> Result<Option<TraceLine>, CliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        debug!(line = line_number, "skipping trace line");
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some).map_err(|source| CliError::Trace { line: line_number, source })
}

fn run_encode(args: ConvertArgs) -> Result<(), CliError> {
    let bytes = read_input(&args.input)?;
    let text = String::from_utf8_lossy(&bytes);
    let encoded = encode(&text)?;
    write_output(args.output.as_ref(), &encoded)
}

fn run_decode(args: ConvertArgs) -> Result<(), CliError> {
    let bytes = read_input(&args.input)?;
    let mut rendered = decode(&bytes)?;
    rendered.push('\n');
    write_output(args.output.as_ref(), rendered.as_bytes())
}

/// JSON envelope text to binary envelope bytes.
fn encode(text: &str) -> Result<Vec<u8>, CliError> {
    let message = frames::decode_text(text.trim())?;
    Ok(frames::encode_binary(&message)?)
}

/// Binary envelope bytes to pretty JSON envelope text.
fn decode(bytes: &[u8]) -> Result<String, CliError> {
    let message = frames::decode_binary(bytes)?;
    let envelope = frames::to_envelope(&message)?;
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn open_reader(path: &str) -> Result<Box<dyn BufRead>, CliError> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|source| CliError::Io { path: path.to_owned(), source })?;
    Ok(Box::new(BufReader::new(file)))
}

fn read_input(path: &str) -> Result<Vec<u8>, CliError> {
    let mut bytes = Vec::new();
    open_reader(path)?
        .read_to_end(&mut bytes)
        .map_err(|source| CliError::Io { path: path.to_owned(), source })?;
    Ok(bytes)
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, bytes).map_err(|source| CliError::Io { path: path.display().to_string(), source }),
        None => io::stdout().write_all(bytes).map_err(CliError::Write),
    }
}
