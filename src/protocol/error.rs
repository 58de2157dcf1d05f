//! facelink error types

use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced by the ingestion pipeline.
///
/// Most faults are handled internally (logged and retried or dropped); these
/// variants appear at construction boundaries and inside worker loops.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to bind the UDP listen socket
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested bind address
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// OSC packet could not be decoded
    #[error("OSC decode error: {0}")]
    Osc(#[from] rosc::OscError),

    /// Inbound address is not in the parameter table
    #[error("unknown parameter address: {0}")]
    UnknownAddress(String),

    /// First argument of a message was not float-convertible
    #[error("non-numeric first argument for {0}")]
    NotNumeric(String),

    /// Settings snapshot cannot be applied
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Discovery backend failure
    #[error("discovery error: {0}")]
    Discovery(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
