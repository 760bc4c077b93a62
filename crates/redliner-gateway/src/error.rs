use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid listen address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        source: AddrParseError,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Server(#[source] std::io::Error),
}
