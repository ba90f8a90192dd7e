//! Startup configuration
//!
//! The bind address comes from the first command-line argument: a full
//! socket address, or just a port to listen on all interfaces.

use std::net::{Ipv4Addr, SocketAddr};

use crate::error::AppError;

/// Default server address
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::LOCALHOST),
    8080,
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self { addr: DEFAULT_ADDR }
    }
}

impl Config {
    /// Build from the process arguments, program name already skipped
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        match args.into_iter().next() {
            None => Ok(Self::default()),
            Some(arg) => Ok(Self {
                addr: parse_addr(&arg)?,
            }),
        }
    }
}

fn parse_addr(arg: &str) -> Result<SocketAddr, AppError> {
    if let Ok(port) = arg.parse::<u16>() {
        return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }

    arg.parse()
        .map_err(|_| AppError::InvalidAddress(arg.to_string()))
}
