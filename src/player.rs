//! Player abstraction over a music daemon.

use std::future::Future;

use crate::error::Result;
use crate::protocol::Session;

/// Something that can queue music.
pub trait Player {
    /// Add a URI to the play queue.
    fn add(&self, uri: &str) -> impl Future<Output = Result<()>> + Send;
}

impl Player for Session {
    fn add(&self, uri: &str) -> impl Future<Output = Result<()>> + Send {
        Session::add(self, uri)
    }
}
