use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::ProbeOutcome;
use crate::collector::ReportSink;
use crate::ports::Port;

/// Single connect attempt. Any failure, including the deadline, is `Closed`.
pub async fn dial(host: &str, port: Port, limit: Duration) -> ProbeOutcome {
    let addr = format!("{}:{}", host, port);
    match timeout(limit, TcpStream::connect(&addr)).await {
        Ok(Ok(conn)) => {
            drop(conn);
            ProbeOutcome::Open(port)
        }
        Ok(Err(e)) => {
            let outcome = ProbeOutcome::Closed(port);
            debug!("{} ({}: {})", outcome, host, e);
            outcome
        }
        Err(_) => {
            let outcome = ProbeOutcome::Closed(port);
            debug!("{} ({}: timed out after {:?})", outcome, host, limit);
            outcome
        }
    }
}

/// Probe one port. Open ports go straight to `on_open`, closed ones to `sink`.
pub async fn probe<O>(host: &str, port: Port, limit: Duration, sink: &ReportSink, on_open: &O)
where
    O: Fn(Port) + ?Sized,
{
    match dial(host, port, limit).await {
        ProbeOutcome::Open(p) => on_open(p),
        ProbeOutcome::Closed(p) => sink.report(p).await,
    }
}
