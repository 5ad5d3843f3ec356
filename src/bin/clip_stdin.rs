//! Simple CLI that reads HTML from stdin and prints a clip as JSON.
//!
//! Runs a remove-mode session (every candidate included), captures it and
//! prints the payload together with its Logseq block rendering.
//!
//! Usage: `clip_stdin [URL] < page.html`

use std::io::{self, Read};

use logseq_clipper::logseq::{self, OutputFormat};
use logseq_clipper::{CapturePayload, Mode, Page, Picker, VecSink};
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Serialize)]
struct Output {
    payload: Option<CapturePayload>,
    blocks: String,
    error: Option<String>,
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let url = std::env::args().nth(1).unwrap_or_default();

    let mut html = Vec::new();
    if io::stdin().read_to_end(&mut html).is_err() {
        eprintln!("Failed to read from stdin");
        std::process::exit(1);
    }

    let page = Page::from_bytes(&html, &url);
    let mut picker = Picker::new(&page, VecSink::new());
    picker.start(Mode::Remove);

    let output = match picker.capture() {
        Ok(_) => {
            let payload = picker.sink().last().cloned();
            let blocks = payload
                .as_ref()
                .map(|p| logseq::format_capture(p, OutputFormat::Logseq))
                .unwrap_or_default();
            Output {
                payload,
                blocks,
                error: None,
            }
        }
        Err(e) => Output {
            payload: None,
            blocks: String::new(),
            error: Some(e.to_string()),
        },
    };

    println!("{}", serde_json::to_string(&output).unwrap_or_default());
}
