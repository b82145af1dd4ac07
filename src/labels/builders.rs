//! Per-entity label builders.
//!
//! Each builder maps one typed record onto a [`LabelDescriptor`]: which
//! fields are printed, their order and unit suffixes. Builders never
//! validate completeness; a missing optional field prints as an empty cell.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::barcode::{BarcodeType, generate_barcode_value};
use super::descriptor::LabelDescriptor;
use crate::errors::LabelError;

// ── Formatting helpers ──────────────────────────────────────────────

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// `Some(24.0)` + `"kg"` -> `"24 kg"`, `Some(1.5)` -> `"1.5 kg"`, `None` -> `""`.
fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => {
            let number = if v.fract() == 0.0 {
                format!("{:.0}", v)
            } else {
                let s = format!("{:.2}", v);
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            };
            format!("{} {}", number, unit)
        }
        None => String::new(),
    }
}

/// ISO dates and timestamps print as `dd.MM.yyyy`; anything else prints
/// verbatim.
fn date(value: &Option<String>) -> String {
    let Some(raw) = value.as_deref().map(str::trim) else {
        return String::new();
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%d.%m.%Y").to_string();
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.format("%d.%m.%Y").to_string();
    }
    raw.to_string()
}

fn barcode_for(existing: &Option<String>, prefix: &str, id: i64) -> String {
    existing
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| generate_barcode_value(prefix, id, None))
}

// ── Yarn ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YarnLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub yarn_type: Option<String>,
    /// Yarn count, e.g. `Ne 30/1`.
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub received_at: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn yarn_label(data: &YarnLabelData) -> LabelDescriptor {
    LabelDescriptor::new(
        "İplik Etiketi",
        barcode_for(&data.barcode, "YRN", data.id),
        BarcodeType::Qrcode,
    )
    .department("İplik Deposu", "#2563eb")
    .field("İplik Türü", text(&data.yarn_type))
    .field("Numara", text(&data.count))
    .field("Renk", text(&data.color))
    .field("Lot No", text(&data.lot_number))
    .field("Tedarikçi", text(&data.supplier))
    .field("Ağırlık", with_unit(data.weight_kg, "kg"))
    .field("Konum", text(&data.location))
    .field("Giriş Tarihi", date(&data.received_at))
    .note(data.note.clone())
}

// ── Fabric roll ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricRollLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub fabric_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width_cm: Option<f64>,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn fabric_roll_label(data: &FabricRollLabelData) -> LabelDescriptor {
    LabelDescriptor::new(
        "Kumaş Topu Etiketi",
        barcode_for(&data.barcode, "FAB", data.id),
        BarcodeType::Code128,
    )
    .department("Dokuma", "#16a34a")
    .field("Top No", text(&data.roll_number))
    .field("Kumaş Türü", text(&data.fabric_type))
    .field("Renk", text(&data.color))
    .field("En", with_unit(data.width_cm, "cm"))
    .field("Uzunluk", with_unit(data.length_m, "m"))
    .field("Ağırlık", with_unit(data.weight_kg, "kg"))
    .field("Sipariş No", text(&data.order_number))
    .field("Müşteri", text(&data.customer_name))
    .note(data.note.clone())
}

// ── Quality control ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityControlLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub inspector: Option<String>,
    /// `passed`, `failed`, `conditional` or free text.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub defect_count: Option<u32>,
    #[serde(default)]
    pub inspected_at: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

fn qc_result(result: &Option<String>) -> String {
    match result.as_deref().map(str::trim) {
        Some("passed") => "Geçti".to_string(),
        Some("failed") => "Kaldı".to_string(),
        Some("conditional") => "Şartlı Kabul".to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

pub fn quality_control_label(data: &QualityControlLabelData) -> LabelDescriptor {
    LabelDescriptor::new(
        "Kalite Kontrol Kartı",
        barcode_for(&data.barcode, "QC", data.id),
        BarcodeType::Qrcode,
    )
    .department("Kalite Kontrol", "#dc2626")
    .field("Sipariş No", text(&data.order_number))
    .field("Ürün", text(&data.product_name))
    .field("Kontrol Eden", text(&data.inspector))
    .field("Sonuç", qc_result(&data.result))
    .field(
        "Hata Sayısı",
        data.defect_count.map(|n| n.to_string()).unwrap_or_default(),
    )
    .field("Kontrol Tarihi", date(&data.inspected_at))
    .note(data.note.clone())
}

// ── Production card ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCardLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn production_card_label(data: &ProductionCardLabelData) -> LabelDescriptor {
    let unit = data.unit.as_deref().unwrap_or("m");
    LabelDescriptor::new(
        "Üretim Kartı",
        barcode_for(&data.barcode, "PRD", data.id),
        BarcodeType::Qrcode,
    )
    .department("Üretim", "#7c3aed")
    .field("Kart No", text(&data.card_number))
    .field("Sipariş No", text(&data.order_number))
    .field("Müşteri", text(&data.customer_name))
    .field("Ürün", text(&data.product_name))
    .field("Miktar", with_unit(data.quantity, unit))
    .field("Bölüm", text(&data.department))
    .field("Termin", date(&data.due_date))
    .note(data.note.clone())
}

// ── Sample card ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCardLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub sample_code: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub fabric_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width_cm: Option<f64>,
    /// Fabric weight in g/m².
    #[serde(default)]
    pub weight_gsm: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn sample_card_label(data: &SampleCardLabelData) -> LabelDescriptor {
    LabelDescriptor::new(
        "Numune Kartı",
        barcode_for(&data.barcode, "SMP", data.id),
        BarcodeType::Code128,
    )
    .department("Numune", "#ea580c")
    .field("Numune Kodu", text(&data.sample_code))
    .field("Müşteri", text(&data.customer_name))
    .field("Kumaş Türü", text(&data.fabric_type))
    .field("Renk", text(&data.color))
    .field("En", with_unit(data.width_cm, "cm"))
    .field("Gramaj", with_unit(data.weight_gsm, "g/m²"))
    .field("Tarih", date(&data.created_at))
    .note(data.note.clone())
}

// ── Stock roll ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRollLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub shelf: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn stock_roll_label(data: &StockRollLabelData) -> LabelDescriptor {
    LabelDescriptor::new(
        "Stok Top Etiketi",
        barcode_for(&data.barcode, "STK", data.id),
        BarcodeType::Code39,
    )
    .department("Stok", "#0891b2")
    .field("Ürün", text(&data.product_name))
    .field("Renk", text(&data.color))
    .field("Uzunluk", with_unit(data.length_m, "m"))
    .field("Ağırlık", with_unit(data.weight_kg, "kg"))
    .field("Depo", text(&data.warehouse))
    .field("Raf", text(&data.shelf))
    .note(data.note.clone())
}

// ── Refakat card ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefakatCardLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub current_department: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn refakat_card_label(data: &RefakatCardLabelData) -> LabelDescriptor {
    LabelDescriptor::new(
        "Refakat Kartı",
        barcode_for(&data.barcode, "RFK", data.id),
        BarcodeType::Qrcode,
    )
    .department("Refakat", "#4f46e5")
    .field("Kart No", text(&data.card_number))
    .field("Sipariş No", text(&data.order_number))
    .field("Müşteri", text(&data.customer_name))
    .field("Bulunduğu Bölüm", text(&data.current_department))
    .field("Miktar", with_unit(data.quantity, "m"))
    .note(data.note.clone())
}

// ── Dye recipe ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DyeRecipeLabelData {
    pub id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub recipe_name: Option<String>,
    #[serde(default)]
    pub color_code: Option<String>,
    #[serde(default)]
    pub color_name: Option<String>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    /// Liquor ratio such as `1:8`.
    #[serde(default)]
    pub bath_ratio: Option<String>,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn dye_recipe_label(data: &DyeRecipeLabelData) -> LabelDescriptor {
    LabelDescriptor::new(
        "Boya Reçetesi",
        barcode_for(&data.barcode, "DYE", data.id),
        BarcodeType::Datamatrix,
    )
    .department("Boyahane", "#db2777")
    .field("Reçete", text(&data.recipe_name))
    .field("Renk Kodu", text(&data.color_code))
    .field("Renk", text(&data.color_name))
    .field("Sıcaklık", with_unit(data.temperature_c, "°C"))
    .field("Flote", text(&data.bath_ratio))
    .field("Makine", text(&data.machine_type))
    .field("Şablon", if data.is_template { "Evet" } else { "Hayır" })
    .note(data.note.clone())
}

// ── LabelKind ───────────────────────────────────────────────────────

/// Every label the builders know how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Yarn,
    FabricRoll,
    QualityControl,
    ProductionCard,
    SampleCard,
    StockRoll,
    RefakatCard,
    DyeRecipe,
}

impl LabelKind {
    pub const ALL: [LabelKind; 8] = [
        LabelKind::Yarn,
        LabelKind::FabricRoll,
        LabelKind::QualityControl,
        LabelKind::ProductionCard,
        LabelKind::SampleCard,
        LabelKind::StockRoll,
        LabelKind::RefakatCard,
        LabelKind::DyeRecipe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKind::Yarn => "yarn",
            LabelKind::FabricRoll => "fabric-roll",
            LabelKind::QualityControl => "quality-control",
            LabelKind::ProductionCard => "production-card",
            LabelKind::SampleCard => "sample-card",
            LabelKind::StockRoll => "stock-roll",
            LabelKind::RefakatCard => "refakat-card",
            LabelKind::DyeRecipe => "dye-recipe",
        }
    }

    /// Entity type string sent to the print endpoint.
    pub fn entity_type(&self) -> &'static str {
        match self {
            LabelKind::Yarn => "yarn",
            LabelKind::FabricRoll => "fabric_roll",
            LabelKind::QualityControl => "quality_control",
            LabelKind::ProductionCard => "production_card",
            LabelKind::SampleCard => "sample_card",
            LabelKind::StockRoll => "stock_roll",
            LabelKind::RefakatCard => "refakat_card",
            LabelKind::DyeRecipe => "dye_recipe",
        }
    }

    /// Decode `data` as this kind's record and build its label.
    ///
    /// Returns the descriptor together with the record's `id`.
    pub fn build_from_json(
        &self,
        data: serde_json::Value,
    ) -> Result<(LabelDescriptor, i64), LabelError> {
        match self {
            LabelKind::Yarn => decode(*self, data).map(|d: YarnLabelData| (yarn_label(&d), d.id)),
            LabelKind::FabricRoll => decode(*self, data)
                .map(|d: FabricRollLabelData| (fabric_roll_label(&d), d.id)),
            LabelKind::QualityControl => decode(*self, data)
                .map(|d: QualityControlLabelData| (quality_control_label(&d), d.id)),
            LabelKind::ProductionCard => decode(*self, data)
                .map(|d: ProductionCardLabelData| (production_card_label(&d), d.id)),
            LabelKind::SampleCard => decode(*self, data)
                .map(|d: SampleCardLabelData| (sample_card_label(&d), d.id)),
            LabelKind::StockRoll => decode(*self, data)
                .map(|d: StockRollLabelData| (stock_roll_label(&d), d.id)),
            LabelKind::RefakatCard => decode(*self, data)
                .map(|d: RefakatCardLabelData| (refakat_card_label(&d), d.id)),
            LabelKind::DyeRecipe => decode(*self, data)
                .map(|d: DyeRecipeLabelData| (dye_recipe_label(&d), d.id)),
        }
    }
}

fn decode<T: DeserializeOwned>(kind: LabelKind, data: serde_json::Value) -> Result<T, LabelError> {
    serde_json::from_value(data).map_err(|e| LabelError::InvalidData {
        kind: kind.as_str().to_string(),
        message: e.to_string(),
    })
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelKind {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let kind = match normalized.as_str() {
            "yarn" | "iplik" => LabelKind::Yarn,
            "fabric-roll" | "fabric" | "kumas" | "kumaş" => LabelKind::FabricRoll,
            "quality-control" | "qc" | "kalite" => LabelKind::QualityControl,
            "production-card" | "production" | "uretim" | "üretim" => LabelKind::ProductionCard,
            "sample-card" | "sample" | "numune" => LabelKind::SampleCard,
            "stock-roll" | "stock" | "stok" => LabelKind::StockRoll,
            "refakat-card" | "refakat" => LabelKind::RefakatCard,
            "dye-recipe" | "dye" | "recete" | "reçete" => LabelKind::DyeRecipe,
            _ => return Err(LabelError::UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}
