//! Fan-in of closed-port reports.
//!
//! Many probes hold a [`ReportSink`], exactly one task closes it and exactly
//! one [`Collector`] drains it. The buffer holds every port of the run, so a
//! send never waits on the consumer.

use std::fmt;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::ports::Port;

pub fn channel(total: usize) -> (ReportSink, Collector) {
    // mpsc rejects a zero capacity; an empty run never sends anyway
    let (tx, rx) = mpsc::channel(total.max(1));
    (ReportSink { tx }, Collector { rx, total })
}

#[derive(Debug, Clone)]
pub struct ReportSink {
    tx: mpsc::Sender<Port>,
}

impl ReportSink {
    pub async fn report(&self, port: Port) {
        if self.tx.send(port).await.is_err() {
            warn!("collector gone, dropping closed report for port {}", port);
        }
    }

    /// Drop this handle. The channel closes once every clone is gone.
    pub fn close(self) {
        drop(self.tx);
    }
}

#[derive(Debug)]
pub struct Collector {
    rx: mpsc::Receiver<Port>,
    total: usize,
}

impl Collector {
    /// Count reports until the channel is closed and empty.
    pub async fn drain(mut self) -> RunTally {
        let mut closed = 0;
        while let Some(port) = self.rx.recv().await {
            trace!(port, "closed report received");
            closed += 1;
        }
        RunTally {
            total: self.total,
            closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTally {
    pub total: usize,
    pub closed: usize,
}

impl RunTally {
    pub fn open(&self) -> usize {
        self.total - self.closed
    }
}

impl fmt::Display for RunTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ports closed [{}/{}]", self.closed, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drains_every_report_after_close() {
        let (sink, collector) = channel(3);
        for port in [22, 80, 443] {
            sink.report(port).await;
        }
        sink.close();

        let tally = collector.drain().await;
        assert_eq!(tally, RunTally { total: 3, closed: 3 });
        assert_eq!(tally.open(), 0);
    }

    #[tokio::test]
    async fn stays_open_while_any_clone_lives() {
        let (sink, collector) = channel(2);
        let late = sink.clone();
        sink.close();

        let drain = tokio::spawn(collector.drain());
        late.report(8080).await;
        late.close();

        let tally = drain.await.unwrap();
        assert_eq!(tally.closed, 1);
        assert_eq!(tally.open(), 1);
    }

    #[tokio::test]
    async fn empty_run_drains_immediately() {
        let (sink, collector) = channel(0);
        sink.close();
        let tally = collector.drain().await;
        assert_eq!(tally.to_string(), " ports closed [0/0]");
    }
}
