//! Native messaging host for the browser extension.
//!
//! Reads length-prefixed JSON requests on stdin and answers on stdout until
//! the browser closes the pipe. Logs go to stderr; set `RUST_LOG` to see them.

use std::io;
use std::process::ExitCode;

use logseq_clipper::native_host::NativeHost;
use logseq_clipper::settings::SettingsStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .init();

    let store = SettingsStore::default_location();
    tracing::info!(config = %store.path().display(), "native host started");
    let host = NativeHost::new(store);

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    match host.run(&mut stdin, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "native host stopped");
            ExitCode::FAILURE
        }
    }
}
