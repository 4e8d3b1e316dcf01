//! Connection gate and driver traits.
//!
//! The data-source driver is opaque to rowwatch. It is reached through two
//! small traits:
//! - `Connector`: turns a connection descriptor into an open connection
//! - `Connection`: executes a query and materializes the full result
//!
//! `ConnectionGate` owns the validated descriptor and the connector, and is
//! the only place connections are opened.

use std::fmt;
use std::sync::Arc;

use rowwatch_core::TabularSnapshot;

use crate::error::{DriverResult, Error, Result};

/// An open connection to a tabular data source.
///
/// Implementations may block. A connection is used for exactly one query and
/// then released, so there is no need for it to be `Sync`.
pub trait Connection: Send {
    /// Execute `query` and return the complete result.
    ///
    /// The returned snapshot must not borrow from the connection.
    fn query(&mut self, query: &str) -> DriverResult<TabularSnapshot>;

    /// Release the connection.
    ///
    /// The default implementation simply drops it.
    fn close(self: Box<Self>) -> DriverResult<()> {
        Ok(())
    }
}

/// Opens connections to a data source.
pub trait Connector: Send + Sync {
    /// Open a new connection for the given descriptor.
    ///
    /// May block; no timeout is imposed by the caller.
    fn connect(&self, descriptor: &ConnectionDescriptor) -> DriverResult<Box<dyn Connection>>;
}

impl<F> Connector for F
where
    F: Fn(&ConnectionDescriptor) -> DriverResult<Box<dyn Connection>> + Send + Sync,
{
    fn connect(&self, descriptor: &ConnectionDescriptor) -> DriverResult<Box<dyn Connection>> {
        self(descriptor)
    }
}

/// A non-empty, immutable connection string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionDescriptor(Arc<str>);

impl ConnectionDescriptor {
    /// Validates and wraps a connection string.
    pub fn new(connection_string: impl Into<String>) -> Result<Self> {
        let connection_string = connection_string.into();
        if connection_string.is_empty() {
            return Err(Error::invalid_configuration(
                "connection string must not be empty",
            ));
        }
        Ok(Self(connection_string.into()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConnectionDescriptor {
    // Connection strings routinely embed credentials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionDescriptor(<{} chars>)", self.0.chars().count())
    }
}

impl AsRef<str> for ConnectionDescriptor {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated descriptor plus the connector used to open it.
#[derive(Clone)]
pub struct ConnectionGate {
    descriptor: ConnectionDescriptor,
    connector: Arc<dyn Connector>,
}

impl ConnectionGate {
    /// Creates a gate, failing with `InvalidConfiguration` on an empty descriptor.
    pub fn new(connection_string: impl Into<String>, connector: Arc<dyn Connector>) -> Result<Self> {
        Ok(Self {
            descriptor: ConnectionDescriptor::new(connection_string)?,
            connector,
        })
    }

    /// Returns the descriptor this gate opens.
    #[inline]
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    /// Opens a new connection.
    ///
    /// Driver errors come back as `ConnectionFailure` with the driver error
    /// as the source.
    pub fn open(&self) -> Result<Box<dyn Connection>> {
        self.connector
            .connect(&self.descriptor)
            .map_err(|e| Error::connection_with_source("failed to open connection", e))
    }
}

impl fmt::Debug for ConnectionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionGate")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
