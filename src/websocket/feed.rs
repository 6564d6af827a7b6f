//! Aggregated-trade subscription task and its stop handle.

use futures_util::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{StreamTransport, TungsteniteTransport, handler::decode_frame};
use crate::Result;
use crate::client::Client;
use crate::error::SpotkitError;
use crate::models::TradeEvent;

/// Handle to a running subscription.
///
/// Dropping the handle also stops the subscription.
#[derive(Debug)]
pub struct StreamHandle {
    symbol: String,
    stop_tx: Option<oneshot::Sender<()>>,
    /// `None` once the task has been awaited to completion.
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    /// Symbol this subscription delivers trades for.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns `true` once the subscription task has exited, whether it
    /// was stopped or the connection failed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits until the subscription task exits, without requesting a stop.
    ///
    /// Cancel-safe, so it can be raced in `tokio::select!`. Once it has
    /// returned, later calls return `Ok(())` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SpotkitError::StreamTask`] if the task panicked, typically
    /// inside an `on_event` or `on_error` callback.
    pub async fn finished(&mut self) -> Result<()> {
        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };
        let outcome = task.await;
        self.task = None;

        outcome.map_err(|e| {
            warn!(symbol = self.symbol, "Aggregated trade stream task failed: {e}");
            SpotkitError::from(e)
        })
    }

    /// Stops the subscription and waits for the task to exit. No callback
    /// runs after this returns.
    ///
    /// # Errors
    ///
    /// Returns [`SpotkitError::StreamTask`] if the task had panicked.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.finished().await
    }

    /// Waits for the subscription to end on its own (transport error or
    /// server close) without requesting a stop.
    ///
    /// # Errors
    ///
    /// Returns [`SpotkitError::StreamTask`] if the task panicked.
    pub async fn join(mut self) -> Result<()> {
        self.finished().await
    }
}

/// Raw-stream URL for a symbol's aggregated trades.
#[must_use]
pub fn stream_url(base_url: &str, symbol: &str) -> String {
    format!(
        "{}/{}@aggTrade",
        base_url.trim_end_matches('/'),
        symbol.to_lowercase()
    )
}

/// Subscribes to `symbol`'s aggregated trades.
///
/// One connection is opened and served by one spawned task. `on_event`
/// runs inline on that task for every trade, so it must not block for
/// long. A frame that cannot be decoded is passed to `on_error` and the
/// stream continues. A transport error, or the server closing the stream,
/// is passed to `on_error` and ends the subscription.
///
/// The subscription does **not** reconnect; callers that need a
/// long-lived feed must watch [`StreamHandle::is_finished`] and subscribe
/// again.
///
/// # Errors
///
/// Returns an error if the initial connection cannot be opened.
pub async fn subscribe<E, F>(
    transport: &dyn StreamTransport,
    base_url: &str,
    symbol: &str,
    mut on_event: E,
    mut on_error: F,
) -> Result<StreamHandle>
where
    E: FnMut(TradeEvent) + Send + 'static,
    F: FnMut(SpotkitError) + Send + 'static,
{
    let url = stream_url(base_url, symbol);
    let mut frames = transport.open(&url).await?;
    info!(symbol, "Subscribed to aggregated trades");

    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let task_symbol = symbol.to_string();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    info!(symbol = task_symbol, "Aggregated trade stream stopped");
                    return;
                }

                frame = frames.next() => {
                    match frame {
                        Some(Ok(text)) => match decode_frame(&text) {
                            Ok(Some(event)) => on_event(event),
                            Ok(None) => debug!(symbol = task_symbol, "Skipped non-trade frame"),
                            Err(e) => on_error(e),
                        },
                        Some(Err(e)) => {
                            warn!(symbol = task_symbol, "WebSocket error: {e}");
                            on_error(e);
                            return;
                        }
                        None => {
                            warn!(symbol = task_symbol, "WebSocket stream ended");
                            on_error(SpotkitError::WebSocket(tungstenite::Error::ConnectionClosed));
                            return;
                        }
                    }
                }
            }
        }
    });

    Ok(StreamHandle {
        symbol: symbol.to_string(),
        stop_tx: Some(stop_tx),
        task: Some(task),
    })
}

impl Client {
    /// Subscribes to `symbol`'s aggregated trades on this client's
    /// WebSocket endpoint. See [`subscribe`] for callback semantics.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened.
    pub async fn subscribe_agg_trades<E, F>(
        &self,
        symbol: &str,
        on_event: E,
        on_error: F,
    ) -> Result<StreamHandle>
    where
        E: FnMut(TradeEvent) + Send + 'static,
        F: FnMut(SpotkitError) + Send + 'static,
    {
        subscribe(
            &TungsteniteTransport,
            self.websocket_url(),
            symbol,
            on_event,
            on_error,
        )
        .await
    }
}
