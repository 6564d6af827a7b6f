use spotkit::Client;
use spotkit::config::fetch_config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> spotkit::Result<()> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let app_config = fetch_config()?;
    let symbol = std::env::args().nth(1).unwrap_or_else(|| "BTCUSDT".to_string());

    let client = Client::connect(&app_config.exchange).await?;

    let price = client.ticker_price(&symbol).await?;
    info!(%symbol, %price, "Latest price");

    if client.has_credentials() {
        for balance in client.balances().await? {
            info!(
                asset = %balance.asset,
                free = %balance.free,
                locked = %balance.locked,
                "Balance"
            );
        }
    }

    let mut handle = client
        .subscribe_agg_trades(
            &symbol,
            |trade| {
                info!(
                    symbol = %trade.symbol,
                    price = %trade.price,
                    qty = %trade.quantity,
                    "Trade"
                );
            },
            |e| error!("Stream error: {e}"),
        )
        .await?;

    let ended = tokio::select! {
        _ = tokio::signal::ctrl_c() => None,
        result = handle.finished() => Some(result),
    };

    match ended {
        None => {
            info!("Shutting down");
            handle.stop().await?;
        }
        Some(result) => {
            info!("Stream ended");
            result?;
        }
    }

    Ok(())
}
