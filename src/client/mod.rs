//! Connection opening.
//!
//! The connection itself (network transport, login handshake, query
//! execution) is delegated to the tiberius SQL Server client. This module
//! only turns a [`ConnectionDescriptor`] into an open [`ConnectionHandle`].
//!
//! # Architecture
//!
//! - [`Connector`] - the seam between descriptor construction and transport
//! - [`Driver`] - tiberius-backed `Connector`
//! - [`ConnectionHandle`] - open connection with blocking `query`/`execute`
//! - [`ResultSet`] / [`SqlValue`] - owned query results

use crate::descriptor::ConnectionDescriptor;
use crate::error::ConnectionError;

pub mod connection;
pub mod driver;
pub mod results;

pub use connection::ConnectionHandle;
pub use driver::{Driver, DriverOptions, Encryption};
pub use results::{ResultSet, SqlValue};

/// Opens a connection from a descriptor.
pub trait Connector {
    /// The open connection type.
    type Handle;

    /// Open a connection. The descriptor is only borrowed; callers should
    /// drop it once this returns.
    fn open(&self, descriptor: &ConnectionDescriptor) -> Result<Self::Handle, ConnectionError>;
}
