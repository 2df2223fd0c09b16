//! Network infrastructure: outbound TCP for the connectivity probe.

pub mod tcp;

pub use tcp::TcpConnector;
