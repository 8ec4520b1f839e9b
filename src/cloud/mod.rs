//! Outbound cloud translation/chat adapter. Exceptions stop at this boundary.

mod client;
mod transport;

pub use client::CloudClient;
pub use transport::{CloudError, CloudSettings, CloudTransport, HttpTransport};
