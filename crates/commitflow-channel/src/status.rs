use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::io::AsyncWrite;
use tracing::warn;

use commitflow_core::error::Result;
use commitflow_core::traits::RunObserver;

use crate::channel::Transport;
use crate::protocol::OutputFrame;

/// Writes a `status` frame per node transition plus one on completion,
/// through the shared transport. Nodes without a banner entry are walked
/// silently.
pub struct StatusReporter<W> {
    transport: Arc<Transport<W>>,
    banners: HashMap<String, String>,
    completion: String,
}

impl<W: AsyncWrite + Unpin + Send + 'static> StatusReporter<W> {
    pub fn new(
        transport: Arc<Transport<W>>,
        banners: HashMap<String, String>,
        completion: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            banners,
            completion: completion.into(),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> RunObserver for StatusReporter<W> {
    fn node_entered(&self, node: &str) -> BoxFuture<'_, Result<()>> {
        let node = node.to_string();
        Box::pin(async move {
            match self.banners.get(&node) {
                Some(message) => {
                    self.transport
                        .write_frame(&OutputFrame::node_status(&node, message))
                        .await
                }
                None => {
                    warn!(node = %node, "no status banner for node");
                    Ok(())
                }
            }
        })
    }

    fn run_completed(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async {
            self.transport
                .write_frame(&OutputFrame::status(&self.completion))
                .await
        })
    }
}
