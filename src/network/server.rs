use crate::error::{LedgerError, Result};
use crate::network::node::{BalancesView, Node, StatusView};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Deserializer;
use std::io::BufReader;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

const CONNECTION_TIMEOUT_MILLIS: u64 = 5000;

/// Requests a remote node may issue over the status wire.
#[derive(Debug, Serialize, Deserialize)]
pub enum Request {
    Status,
    Balances,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Response {
    Status(StatusView),
    Balances(BalancesView),
    Error { error: String },
}

/// Accept connections on `listener` and answer one request per connection.
///
/// This is the narrow wire the gossip loop consumes; the full HTTP API is
/// an external collaborator and lives outside this crate.
pub fn serve(listener: TcpListener, node: Node) -> Result<()> {
    info!("Status responder listening on {}", node.addr());

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let node = node.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_connection(&node, stream) {
                        error!("Error handling status connection: {e}");
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {e}");
            }
        }
    }

    Ok(())
}

fn handle_connection(node: &Node, stream: TcpStream) -> Result<()> {
    stream
        .set_read_timeout(Some(Duration::from_millis(CONNECTION_TIMEOUT_MILLIS)))
        .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))?;
    stream
        .set_write_timeout(Some(Duration::from_millis(CONNECTION_TIMEOUT_MILLIS)))
        .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;

    let reader = BufReader::new(&stream);
    let request = match Deserializer::from_reader(reader).into_iter::<Request>().next() {
        Some(Ok(request)) => request,
        Some(Err(e)) => {
            warn!("Dropping connection with unreadable request: {e}");
            let _ = stream.shutdown(Shutdown::Both);
            return Ok(());
        }
        None => {
            let _ = stream.shutdown(Shutdown::Both);
            return Ok(());
        }
    };

    let response = match request {
        Request::Status => match node.status() {
            Ok(status) => Response::Status(status),
            Err(e) => Response::Error {
                error: e.to_string(),
            },
        },
        Request::Balances => match node.balances() {
            Ok(balances) => Response::Balances(balances),
            Err(e) => Response::Error {
                error: e.to_string(),
            },
        },
    };

    serde_json::to_writer(&stream, &response)
        .map_err(|e| LedgerError::Network(format!("Failed to send response: {e}")))?;
    let _ = stream.shutdown(Shutdown::Both);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_round_trip() {
        let serialized = serde_json::to_string(&Request::Status).unwrap();
        let parsed: Request = serde_json::from_str(&serialized).unwrap();
        assert!(matches!(parsed, Request::Status));
    }

    #[test]
    fn test_error_response_shape() {
        let response = Response::Error {
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["Error"]["error"], "boom");
    }
}
