use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

/// A TCP port number. Zero is never a valid probe target.
pub type Port = u16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    pub ports: Vec<Port>,
    /// Lines that were skipped because they did not parse as a port.
    pub rejected: usize,
}

/// Load the ordered port list from a line-delimited file.
///
/// Never fails: an unreadable file is logged and yields an empty list,
/// bad lines are logged and skipped.
pub async fn load_ports(path: impl AsRef<Path>) -> Vec<Port> {
    let path = path.as_ref();
    let file = match File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            warn!("Error opening port list {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let list = read_ports(BufReader::new(file)).await;
    if list.rejected > 0 {
        warn!("skipped {} invalid lines in {}", list.rejected, path.display());
    }
    list.ports
}

pub async fn read_ports<R>(reader: R) -> PortList
where
    R: AsyncBufRead + Unpin,
{
    let mut list = PortList::default();
    let mut lines = reader.split(b'\n');

    loop {
        match lines.next_segment().await {
            Ok(Some(raw)) => match std::str::from_utf8(&raw).ok().and_then(parse_port) {
                Some(port) => list.ports.push(port),
                None => {
                    warn!("Error converting text-to-port: {:?}", String::from_utf8_lossy(&raw));
                    list.rejected += 1;
                }
            },
            Ok(None) => break,
            Err(e) => {
                // keep whatever was parsed before the failure
                warn!("Error reading port list: {}", e);
                break;
            }
        }
    }

    list
}

fn parse_port(line: &str) -> Option<Port> {
    match line.trim().parse::<Port>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}
