use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::Duration;
use tracing::{debug, error};

use crate::collector::{self, ReportSink, RunTally};
use crate::ports::Port;
use crate::prober;

type PortQueue = Arc<Mutex<mpsc::UnboundedReceiver<Port>>>;

pub struct Scheduler {
    host: Arc<str>,
    workers: Option<usize>,
    connect_timeout: Duration,
}

impl Scheduler {
    /// `workers: None` gives every port its own task.
    pub fn new(
        host: impl Into<String>,
        workers: Option<usize>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        if workers == Some(0) {
            bail!("worker pool size must be at least 1");
        }
        Ok(Self {
            host: Arc::from(host.into()),
            workers,
            connect_timeout,
        })
    }

    /// Probe every port and return once all of them are classified.
    ///
    /// `on_open` is called from the probe task as soon as a port answers.
    pub async fn run<O>(&self, ports: Vec<Port>, on_open: O) -> RunTally
    where
        O: Fn(Port) + Send + Sync + 'static,
    {
        let total = ports.len();
        let (sink, collector) = collector::channel(total);
        let queue = port_queue(ports);
        let on_open = Arc::new(on_open);

        let workers = self.workers.unwrap_or(total).min(total);
        debug!("launching {} probe tasks for {} ports on {}", workers, total, self.host);

        let mut probes = JoinSet::new();
        for _ in 0..workers {
            let queue = queue.clone();
            let sink = sink.clone();
            let host = self.host.clone();
            let on_open = on_open.clone();
            let limit = self.connect_timeout;
            probes.spawn(async move {
                while let Some(port) = next_port(&queue).await {
                    prober::probe(&host, port, limit, &sink, &*on_open).await;
                }
            });
        }

        tokio::spawn(watch_completion(probes, sink));

        collector.drain().await
    }
}

fn port_queue(ports: Vec<Port>) -> PortQueue {
    let (tx, rx) = mpsc::unbounded_channel();
    for port in ports {
        // receiver is alive right here, send cannot fail
        let _ = tx.send(port);
    }
    Arc::new(Mutex::new(rx))
}

async fn next_port(queue: &PortQueue) -> Option<Port> {
    // pre-filled and sender dropped: recv never parks
    queue.lock().await.recv().await
}

/// Sole closer of the collector: waits for every probe task, then closes.
async fn watch_completion(mut probes: JoinSet<()>, sink: ReportSink) {
    while let Some(joined) = probes.join_next().await {
        if let Err(e) = joined {
            error!("probe task aborted: {}", e);
        }
    }
    debug!("all probe tasks finished, closing collector");
    sink.close();
}
