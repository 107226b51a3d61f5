//! Synthetic submission generator
//!
//! Drives the ingestion endpoint with a scripted mix of events, useful for
//! exercising admission backpressure and watching the error counters move.

use clap::Parser;
use std::time::Duration;

/// Fixed demo script: (level, source) pairs submitted in order.
const SCRIPT: [(&str, &str); 5] = [
    ("INFO", "Auth"),
    ("ERROR", "Payment"),
    ("INFO", "Auth"),
    ("ERROR", "Database"),
    ("ERROR", "Payment"),
];

#[derive(Parser, Debug)]
#[command(name = "loadgen", about = "Synthetic log submission generator")]
struct Args {
    /// Base URL of the ingestion server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,
    /// Number of passes over the event script
    #[arg(short, long, default_value = "1")]
    rounds: u32,
    /// Delay between submissions in milliseconds
    #[arg(long, default_value = "200")]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();
    let base = args.url.trim_end_matches('/').to_string();
    let endpoint = format!("{base}/log");

    for round in 0..args.rounds {
        for (i, (level, source)) in SCRIPT.iter().enumerate() {
            let payload = serde_json::json!({
                "message": format!("something happened {i}"),
                "level": level,
                "source": source,
            });

            let response = client
                .post(&endpoint)
                .header("Content-Type", "application/json")
                .body(serde_json::to_vec(&payload)?)
                .send()
                .await?;
            println!(
                "-> round {} [{level}] {source}: {}",
                round + 1,
                response.status()
            );

            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }
    }

    let body = client.get(format!("{base}/counts")).send().await?.bytes().await?;
    let counts: serde_json::Value = serde_json::from_slice(&body)?;
    println!("error counts: {counts}");

    Ok(())
}
