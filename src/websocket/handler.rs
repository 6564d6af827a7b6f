//! Incoming stream frame decoding.

use serde_json::Value;

use crate::Result;
use crate::error::SpotkitError;
use crate::models::TradeEvent;

/// Decodes one text frame.
///
/// Returns `Ok(Some(event))` for an aggregated trade, `Ok(None)` for frames
/// that carry no trade (subscription acks, other event types), and an error
/// for frames that are not valid JSON or are malformed trades.
///
/// Both raw (`{"e":"aggTrade",...}`) and combined-stream
/// (`{"stream":"...","data":{...}}`) framings are accepted.
///
/// # Errors
///
/// Returns [`SpotkitError::Json`] if the frame is not JSON or an `aggTrade` event
/// is missing fields.
pub fn decode_frame(text: &str) -> Result<Option<TradeEvent>> {
    let mut value: Value = serde_json::from_str(text)?;

    if let Some(data) = value
        .get_mut("data")
        .filter(|d| d.get("e").is_some())
        .map(Value::take)
    {
        value = data;
    }

    let event_type = value.get("e").and_then(Value::as_str).map(str::to_owned);

    match event_type.as_deref() {
        Some("aggTrade") => Ok(Some(serde_json::from_value(value)?)),
        Some(_) => Ok(None),
        None if value.get("result").is_some() => Ok(None),
        None => Err(SpotkitError::Parse(format!(
            "unrecognized stream frame: {}",
            text.chars().take(200).collect::<String>()
        ))),
    }
}
