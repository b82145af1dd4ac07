use serde::{Deserialize, Serialize};

use super::barcode::BarcodeType;

/// Neutral gray used when a department color cannot be parsed.
pub const FALLBACK_COLOR: Rgb = Rgb(0x6b, 0x72, 0x80);

/// One printable label before PDF rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDescriptor {
    pub title: String,
    pub barcode_value: String,
    pub barcode_type: BarcodeType,
    pub department: String,
    /// Accent color as `#RRGGBB` or `#RGB`.
    pub department_color: String,
    /// Display rows in print order.
    pub fields: Vec<LabelField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelField {
    pub name: String,
    pub value: String,
}

impl LabelField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl LabelDescriptor {
    pub fn new(
        title: impl Into<String>,
        barcode_value: impl Into<String>,
        barcode_type: BarcodeType,
    ) -> Self {
        Self {
            title: title.into(),
            barcode_value: barcode_value.into(),
            barcode_type,
            department: String::new(),
            department_color: String::new(),
            fields: Vec::new(),
            note: None,
        }
    }

    pub fn department(mut self, name: impl Into<String>, color: impl Into<String>) -> Self {
        self.department = name.into();
        self.department_color = color.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(LabelField::new(name, value));
        self
    }

    /// Empty or whitespace-only notes are dropped.
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn accent(&self) -> Rgb {
        Rgb::parse_hex(&self.department_color).unwrap_or(FALLBACK_COLOR)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB` or `#RGB` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self(r, g, b))
            }
            3 => {
                let mut parts = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    parts[i] = v * 17;
                }
                Some(Self(parts[0], parts[1], parts[2]))
            }
            _ => None,
        }
    }

    /// Components scaled to `0.0..=1.0` for PDF color operators.
    pub fn unit(&self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_hex() {
        assert_eq!(Rgb::parse_hex("#1e40af"), Some(Rgb(0x1e, 0x40, 0xaf)));
        assert_eq!(Rgb::parse_hex("f00"), Some(Rgb(255, 0, 0)));
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_bad_color_falls_back_to_gray() {
        let label = LabelDescriptor::new("İplik", "YRN-1", BarcodeType::Code128)
            .department("Depo", "mavi");
        assert_eq!(label.accent(), FALLBACK_COLOR);
    }

    #[test]
    fn test_builder_keeps_field_order() {
        let label = LabelDescriptor::new("Kumaş Topu", "FAB-1", BarcodeType::Qrcode)
            .field("Metre", "120 m")
            .field("Renk", "Lacivert")
            .field("Ağırlık", "24 kg");
        let names: Vec<_> = label.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Metre", "Renk", "Ağırlık"]);
    }

    #[test]
    fn test_blank_note_is_dropped() {
        let label = LabelDescriptor::new("x", "y", BarcodeType::Code39).note(Some("  ".into()));
        assert!(label.note.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let label = LabelDescriptor::new("x", "y", BarcodeType::Ean13).department("Boya", "#000");
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(json["barcodeValue"], "y");
        assert_eq!(json["barcodeType"], "ean13");
        assert_eq!(json["departmentColor"], "#000");
        assert!(json.get("note").is_none());
    }
}
