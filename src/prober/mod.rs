use std::fmt;
use tokio::time::Duration;

use crate::ports::Port;

pub mod tcp_connect;

pub use tcp_connect::probe;

/// Fixed per-port dial budget, name resolution included.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Binary reachability of one port. Refusal and timeout both map to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open(Port),
    Closed(Port),
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Open(p) => write!(f, " port is open :{}", p),
            ProbeOutcome::Closed(p) => write!(f, "    closed :{}", p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_line_format() {
        assert_eq!(ProbeOutcome::Open(443).to_string(), " port is open :443");
    }

    #[test]
    fn closed_line_format() {
        assert_eq!(ProbeOutcome::Closed(22).to_string(), "    closed :22");
    }
}
