//! HTTP ingestion surface
//!
//! `POST /log` feeds the submission gateway; `GET /metrics` exposes the
//! pipeline counters in Prometheus text format; `GET /counts` returns the
//! current per-origin error counts as JSON. Uses hyper for the HTTP server.

use crate::infra::metrics::PipelineMetrics;
use crate::io::gateway::{SubmissionGateway, SubmitOutcome};
use crate::services::aggregator::ErrorAggregator;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::fmt::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("static response should not fail")
}

fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .expect("static response should not fail")
}

/// Write a simple metric (counter or gauge) in Prometheus text format
fn write_metric(output: &mut String, name: &str, help: &str, typ: &str, val: u64) {
    let _ = writeln!(output, "# HELP {name} {help}");
    let _ = writeln!(output, "# TYPE {name} {typ}");
    let _ = writeln!(output, "{name} {val}");
}

/// Format pipeline counters and per-origin error counts in Prometheus
/// text exposition format
fn format_prometheus_metrics(metrics: &PipelineMetrics, aggregator: &ErrorAggregator) -> String {
    let summary = metrics.report();
    let mut output = String::with_capacity(2048);

    write_metric(
        &mut output,
        "logpipe_submitted_total",
        "Submissions received at the gateway",
        "counter",
        summary.submitted_total,
    );
    write_metric(
        &mut output,
        "logpipe_accepted_total",
        "Submissions admitted into the queue",
        "counter",
        summary.accepted_total,
    );
    write_metric(
        &mut output,
        "logpipe_rejected_total",
        "Submissions dropped at admission (queue full or closed)",
        "counter",
        summary.rejected_total,
    );
    write_metric(
        &mut output,
        "logpipe_malformed_total",
        "Payloads rejected before admission",
        "counter",
        summary.malformed_total,
    );
    write_metric(
        &mut output,
        "logpipe_processed_total",
        "Events consumed by workers",
        "counter",
        summary.processed_total,
    );
    write_metric(
        &mut output,
        "logpipe_error_events_total",
        "Error-severity events aggregated",
        "counter",
        summary.error_events_total,
    );
    write_metric(
        &mut output,
        "logpipe_queue_depth",
        "Current buffered events",
        "gauge",
        summary.queue_depth,
    );

    let _ = writeln!(output, "# HELP logpipe_origin_errors_total Error events by origin");
    let _ = writeln!(output, "# TYPE logpipe_origin_errors_total counter");
    let mut counts: Vec<(String, u64)> = aggregator.snapshot().into_iter().collect();
    counts.sort();
    for (origin, count) in counts {
        let _ = writeln!(output, "logpipe_origin_errors_total{{origin=\"{origin}\"}} {count}");
    }

    output
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    gateway: Arc<SubmissionGateway>,
    aggregator: Arc<ErrorAggregator>,
    metrics: Arc<PipelineMetrics>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::POST, "/log") => {
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    debug!(error = %e, "http_body_read_failed");
                    return Ok(text_response(StatusCode::BAD_REQUEST, "Bad JSON"));
                }
            };

            Ok(match gateway.submit(&body) {
                SubmitOutcome::Accepted => text_response(StatusCode::ACCEPTED, "Log ingested"),
                SubmitOutcome::Overloaded => {
                    text_response(StatusCode::SERVICE_UNAVAILABLE, "Queue full")
                }
                SubmitOutcome::Malformed => text_response(StatusCode::BAD_REQUEST, "Bad JSON"),
            })
        }
        (_, "/log") => Ok(text_response(StatusCode::METHOD_NOT_ALLOWED, "Invalid method")),
        (&Method::GET, "/metrics") => {
            Ok(text_response(StatusCode::OK, &format_prometheus_metrics(&metrics, &aggregator)))
        }
        (&Method::GET, "/counts") => match serde_json::to_string(&aggregator.snapshot()) {
            Ok(body) => Ok(json_response(StatusCode::OK, body)),
            Err(e) => {
                error!(error = %e, "counts_serialize_failed");
                Ok(text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
            }
        },
        _ => Ok(text_response(StatusCode::NOT_FOUND, "Not found")),
    }
}

/// Start the HTTP ingestion server
///
/// Accepts connections until the shutdown signal flips; each connection is
/// served on its own task.
pub async fn start_http_server(
    port: u16,
    gateway: Arc<SubmissionGateway>,
    aggregator: Arc<ErrorAggregator>,
    metrics: Arc<PipelineMetrics>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(port = %port, "http_server_started");

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _addr)) => {
                        let io = TokioIo::new(stream);
                        let gateway = gateway.clone();
                        let aggregator = aggregator.clone();
                        let metrics = metrics.clone();

                        tokio::spawn(async move {
                            let service = service_fn(move |req| {
                                let gateway = gateway.clone();
                                let aggregator = aggregator.clone();
                                let metrics = metrics.clone();
                                async move { handle_request(req, gateway, aggregator, metrics).await }
                            });

                            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                                debug!(error = %e, "http_connection_error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "http_accept_failed");
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("http_server_shutdown");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prometheus_metrics() {
        let metrics = PipelineMetrics::new();
        let aggregator = ErrorAggregator::new();

        metrics.record_submitted();
        metrics.record_accepted();
        metrics.record_rejected();
        aggregator.increment("Auth");
        aggregator.increment("Auth");
        aggregator.increment("Payment");

        let output = format_prometheus_metrics(&metrics, &aggregator);

        assert!(output.contains("logpipe_submitted_total 1"));
        assert!(output.contains("logpipe_accepted_total 1"));
        assert!(output.contains("logpipe_rejected_total 1"));
        assert!(output.contains("logpipe_origin_errors_total{origin=\"Auth\"} 2"));
        assert!(output.contains("logpipe_origin_errors_total{origin=\"Payment\"} 1"));
    }

    #[test]
    fn test_prometheus_output_is_sorted_by_origin() {
        let metrics = PipelineMetrics::new();
        let aggregator = ErrorAggregator::new();
        aggregator.increment("Zeta");
        aggregator.increment("Alpha");

        let output = format_prometheus_metrics(&metrics, &aggregator);
        let alpha = output.find("origin=\"Alpha\"").unwrap();
        let zeta = output.find("origin=\"Zeta\"").unwrap();
        assert!(alpha < zeta);
    }
}
