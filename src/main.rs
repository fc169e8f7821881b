use roll2midi::io::{MidirSink, ReadFrameSource};
use roll2midi::{FrameCodec, Session, SessionConfig, ShutdownToken};
use std::io::Read;
use std::path::Path;
use tracing::error;

/// Usage: roll2midi [config.ron] [frames|-]
///        roll2midi --list-ports
///
/// Frames are read from the given path, or stdin when the path is `-` or
/// absent, and dispatched to the first available MIDI output port.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1).peekable();
    if args.peek().map(String::as_str) == Some("--list-ports") {
        match MidirSink::port_names() {
            Ok(names) => {
                for name in names {
                    println!("{name}");
                }
                return;
            }
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        }
    }
    let config = match args.next() {
        Some(path) => match SessionConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => SessionConfig::default(),
    };

    let reader: Box<dyn Read + Send> = match args.next().as_deref() {
        None | Some("-") => Box::new(std::io::stdin()),
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                error!("failed to open frame stream {path}: {e}");
                std::process::exit(1);
            }
        },
    };
    let source = ReadFrameSource::new(reader, FrameCodec::new(config.n_notes).frame_size());

    let sink = match MidirSink::connect(None) {
        Ok(sink) => sink,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let session = match Session::spawn(&config, source, sink, ShutdownToken::new()) {
        Ok(session) => session,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = session.join() {
        error!("session failed: {e}");
        std::process::exit(1);
    }
}
