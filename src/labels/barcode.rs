//! Barcode values and symbologies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of trailing epoch-millisecond digits kept in a barcode value.
const TIMESTAMP_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarcodeType {
    #[default]
    Code128,
    Ean13,
    Qrcode,
    Datamatrix,
    Code39,
}

impl BarcodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code128 => "code128",
            Self::Ean13 => "ean13",
            Self::Qrcode => "qrcode",
            Self::Datamatrix => "datamatrix",
            Self::Code39 => "code39",
        }
    }

    /// Only QR codes are rasterized client-side.
    pub fn is_qr(&self) -> bool {
        matches!(self, Self::Qrcode)
    }
}

impl fmt::Display for BarcodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarcodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "code128" => Ok(Self::Code128),
            "ean13" => Ok(Self::Ean13),
            "qrcode" | "qr" => Ok(Self::Qrcode),
            "datamatrix" => Ok(Self::Datamatrix),
            "code39" => Ok(Self::Code39),
            _ => Err(format!("Invalid barcode type: {}", s)),
        }
    }
}

/// Build a display identifier of the form `PREFIX-ID-TIMESTAMPSUFFIX-RANDOM3`.
///
/// The suffix is the last eight characters of the decimal millisecond epoch,
/// so leading zeros are kept. Pre-epoch timestamps use the magnitude, so the
/// suffix is always digits. The random part is `000`..=`999`. Two calls in
/// the same millisecond collide with probability 1/1000, which is fine for a
/// printed label and wrong for a primary key.
pub fn generate_barcode_value(prefix: &str, id: i64, timestamp: Option<DateTime<Utc>>) -> String {
    let random = rand::rng().random_range(0..1000u32);
    barcode_value_with(prefix, id, timestamp.unwrap_or_else(Utc::now), random)
}

fn barcode_value_with(prefix: &str, id: i64, timestamp: DateTime<Utc>, random: u32) -> String {
    let millis = timestamp.timestamp_millis().unsigned_abs().to_string();
    let suffix = &millis[millis.len().saturating_sub(TIMESTAMP_DIGITS)..];
    format!("{}-{}-{}-{:03}", prefix, id, suffix, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn at_millis(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_value_matches_documented_shape() {
        let re = Regex::new(r"^YRN-42-\d{1,8}-\d{3}$").unwrap();
        for _ in 0..50 {
            let value = generate_barcode_value("YRN", 42, None);
            assert!(re.is_match(&value), "unexpected value {}", value);
        }
    }

    #[test]
    fn test_known_timestamp_keeps_leading_zeros() {
        let value = generate_barcode_value("YRN", 42, Some(at_millis(1_700_000_000_000)));
        assert!(value.starts_with("YRN-42-00000000-"), "got {}", value);
        assert_eq!(value.len(), "YRN-42-00000000-000".len());
    }

    #[test]
    fn test_suffix_is_last_eight_digits() {
        let value = barcode_value_with("FAB", 7, at_millis(1_712_345_678_901), 5);
        assert_eq!(value, "FAB-7-45678901-005");
    }

    #[test]
    fn test_short_epoch_is_not_padded() {
        let value = barcode_value_with("QC", 1, at_millis(1234), 999);
        assert_eq!(value, "QC-1-1234-999");
    }

    #[test]
    fn test_pre_epoch_timestamp_yields_digits_only() {
        let re = Regex::new(r"^YRN-42-\d{1,8}-\d{3}$").unwrap();
        let value = generate_barcode_value("YRN", 42, Some(at_millis(-1234)));
        assert!(re.is_match(&value), "unexpected value {}", value);
        assert_eq!(barcode_value_with("YRN", 42, at_millis(-1234), 7), "YRN-42-1234-007");
    }

    #[test]
    fn test_barcode_type_round_trips_through_str() {
        for ty in [
            BarcodeType::Code128,
            BarcodeType::Ean13,
            BarcodeType::Qrcode,
            BarcodeType::Datamatrix,
            BarcodeType::Code39,
        ] {
            assert_eq!(ty.as_str().parse::<BarcodeType>().unwrap(), ty);
        }
        assert!("upc".parse::<BarcodeType>().is_err());
    }

    #[test]
    fn test_barcode_type_serializes_lowercase() {
        let json = serde_json::to_string(&BarcodeType::Datamatrix).unwrap();
        assert_eq!(json, "\"datamatrix\"");
        assert!(BarcodeType::Qrcode.is_qr());
        assert!(!BarcodeType::Code39.is_qr());
    }
}
