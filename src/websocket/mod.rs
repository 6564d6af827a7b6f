//! Aggregated-trade streaming over the exchange's raw WebSocket streams.
//!
//! This module is organized by concern:
//! - [`StreamTransport`] - opening a stream and yielding its text frames
//! - `feed` - the subscription task, callbacks and stop handle
//! - `handler` - decoding frames into [`TradeEvent`](crate::models::TradeEvent)s

mod feed;
mod handler;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio_tungstenite::connect_async;
use tracing::info;
use tungstenite::Message;

use crate::Result;

pub use feed::{StreamHandle, stream_url, subscribe};
pub use handler::decode_frame;

/// Text frames from one WebSocket connection. A transport error is yielded
/// once; the stream may end after it.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Opens WebSocket streams.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Connects to `url` and returns its text frames.
    async fn open(&self, url: &str) -> Result<FrameStream>;
}

/// [`StreamTransport`] backed by `tokio-tungstenite`.
///
/// Pings from the server are answered by tungstenite while the stream is
/// being read; binary, ping and pong frames are not surfaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

#[async_trait]
impl StreamTransport for TungsteniteTransport {
    async fn open(&self, url: &str) -> Result<FrameStream> {
        let (ws_stream, _) = connect_async(url).await?;
        info!(url, "WebSocket handshake completed");

        let frames = ws_stream.filter_map(|msg| async move {
            match msg {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(_) => None,
                Err(e) => Some(Err(crate::SpotkitError::from(e))),
            }
        });

        Ok(Box::pin(frames))
    }
}
