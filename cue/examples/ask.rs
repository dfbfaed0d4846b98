//! Ask the local backend one question and print the answer as it streams.
//!
//! Start the backend, then run:
//!   cargo run --example ask -p cue -- "What is a window function?"
//!
//! `CUE_BACKEND_URL`, `CUE_MODEL`, `CUE_ROLE` and `CUE_TIMEOUT_MS` override
//! the defaults; `CUE_LICENSE` is checked to pick the session length.
//! Set `RUST_LOG=cue_stream=debug` to see every stream event.

use std::io::Write;

use cue::prelude::*;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

/// Prints each new piece of the answer as it arrives.
#[derive(Default)]
struct StdoutSink {
    printed: usize,
}

impl RenderSink for StdoutSink {
    fn on_chunk(&mut self, raw: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(raw[self.printed..].as_bytes());
        let _ = out.flush();
        self.printed = raw.len();
    }

    fn on_first_chunk(&mut self, ttft: Seconds) {
        tracing::debug!(%ttft, "first chunk");
    }

    fn on_complete(&mut self, report: &StreamReport) {
        println!("\n");
        if let Some(badge) = ModelBadge::for_report(report) {
            println!("-- {}", badge.text());
        }
        if let Some(total) = report.total_cost {
            println!("session cost: {}", CostDisplay::new(total).label);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let config = CueConfig::from_env()?;
    let client = BackendClient::new(config.clone())?;

    let license = std::env::var("CUE_LICENSE").unwrap_or_default();
    let status = client.validate_license(&license).await;
    let mut ctx = AppContext::new(config, status);
    println!("{}", ctx.tier().running_label());

    ctx.create_session()?;
    let (tx, mut ticks) = mpsc::channel(4);
    ctx.start_session_with_ticker(Instant::now(), tx)?;
    if let Some(TimerTick::Remaining(left)) = ticks.recv().await {
        println!("time left: {}", cue::session::format_hms(left));
    }

    let request = ctx.build_request(&question, None, Instant::now())?;
    let mut sink = StdoutSink::default();
    match client.ask(&request, &mut sink).await {
        Ok(report) => {
            let entry = ctx.record(&question, &report);
            println!("{}", entry.label());
        }
        Err(BackendError::Stream(e)) => eprintln!("{}", e.user_message()),
        Err(e) => eprintln!("Error: {e}\n\nCheck if the backend is running."),
    }

    ctx.stop_session();
    Ok(())
}
