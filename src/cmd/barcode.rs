//! `tekstil barcode`

use anyhow::{Result, bail};
use chrono::DateTime;

use tekstil::labels::generate_barcode_value;

pub fn cmd_barcode(prefix: &str, id: i64, timestamp_ms: Option<i64>) -> Result<()> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        bail!("Barcode prefix must not be empty");
    }
    let timestamp = match timestamp_ms {
        Some(ms) if ms < 0 => bail!("Timestamp must not be negative"),
        Some(ms) => match DateTime::from_timestamp_millis(ms) {
            Some(ts) => Some(ts),
            None => bail!("Timestamp {} is out of range", ms),
        },
        None => None,
    };
    println!("{}", generate_barcode_value(prefix, id, timestamp));
    Ok(())
}
