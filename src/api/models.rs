//! Typed response records.
//!
//! Only identifiers and display names are required; everything else is
//! optional so a partially filled record still decodes.

use serde::{Deserialize, Serialize};

use crate::listing::{Column, Tabular};

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ── Customers & orders ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Tabular for Customer {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |c: &Self| c.id.to_string()),
            Column::new("Firma", |c: &Self| c.name.clone()),
            Column::new("Yetkili", |c: &Self| opt(&c.contact_person)),
            Column::new("E-posta", |c: &Self| opt(&c.email)),
            Column::new("Telefon", |c: &Self| opt(&c.phone)),
            Column::new("Şehir", |c: &Self| opt(&c.city)),
        ]
    }

    fn status(&self) -> Option<String> {
        self.is_active
            .map(|active| if active { "active" } else { "inactive" }.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProduction,
    Completed,
    Shipped,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProduction => "in_production",
            OrderStatus::Completed => "completed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Beklemede",
            OrderStatus::Confirmed => "Onaylandı",
            OrderStatus::InProduction => "Üretimde",
            OrderStatus::Completed => "Tamamlandı",
            OrderStatus::Shipped => "Sevk Edildi",
            OrderStatus::Cancelled => "İptal",
            OrderStatus::Unknown => "Bilinmiyor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_order_status")]
    pub status: OrderStatus,
    #[serde(default)]
    pub due_date: Option<String>,
}

fn default_order_status() -> OrderStatus {
    OrderStatus::Pending
}

impl Tabular for Order {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |o: &Self| o.id.to_string()),
            Column::new("Sipariş No", |o: &Self| opt(&o.order_number)),
            Column::new("Müşteri", |o: &Self| opt(&o.customer_name)),
            Column::new("Ürün", |o: &Self| opt(&o.product_name)),
            Column::new("Miktar", |o: &Self| {
                let qty = num(o.quantity);
                match &o.unit {
                    Some(unit) if !qty.is_empty() => format!("{} {}", qty, unit),
                    _ => qty,
                }
            }),
            Column::new("Durum", |o: &Self| o.status.label().to_string()),
            Column::new("Termin", |o: &Self| opt(&o.due_date)),
        ]
    }

    fn status(&self) -> Option<String> {
        Some(self.status.as_str().to_string())
    }
}

// ── Notifications ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// `info`, `warning`, `error`, `success`, ...
    #[serde(rename = "type", default = "default_notification_kind")]
    pub kind: String,
    #[serde(default)]
    pub is_read: bool,
    /// Kept raw; rendering tolerates unparseable values.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub link: Option<String>,
}

fn default_notification_kind() -> String {
    "info".to_string()
}

impl Tabular for Notification {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |n: &Self| n.id.to_string()),
            Column::new("Başlık", |n: &Self| n.title.clone()),
            Column::new("Mesaj", |n: &Self| n.message.clone()),
            Column::new("Tür", |n: &Self| n.kind.clone()),
            Column::new("Okundu", |n: &Self| {
                if n.is_read { "Evet" } else { "Hayır" }.to_string()
            }),
        ]
    }

    fn status(&self) -> Option<String> {
        Some(if self.is_read { "read" } else { "unread" }.to_string())
    }
}

// ── Production ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DyeRecipe {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color_code: Option<String>,
    #[serde(default)]
    pub color_name: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub bath_ratio: Option<String>,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub is_template: bool,
}

impl Tabular for DyeRecipe {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |r: &Self| r.id.to_string()),
            Column::new("Reçete", |r: &Self| r.name.clone()),
            Column::new("Renk Kodu", |r: &Self| opt(&r.color_code)),
            Column::new("Renk", |r: &Self| opt(&r.color_name)),
            Column::new("Sıcaklık", |r: &Self| num(r.temperature)),
            Column::new("Flote", |r: &Self| opt(&r.bath_ratio)),
            Column::new("Makine", |r: &Self| opt(&r.machine_type)),
            Column::new("Şablon", |r: &Self| {
                if r.is_template { "Evet" } else { "" }.to_string()
            }),
        ]
    }

    fn status(&self) -> Option<String> {
        Some(if self.is_template { "template" } else { "recipe" }.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCard {
    pub id: i64,
    pub card_number: String,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub current_department: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl Tabular for ProductionCard {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |c: &Self| c.id.to_string()),
            Column::new("Kart No", |c: &Self| c.card_number.clone()),
            Column::new("Sipariş No", |c: &Self| opt(&c.order_number)),
            Column::new("Ürün", |c: &Self| opt(&c.product_name)),
            Column::new("Miktar", |c: &Self| num(c.quantity)),
            Column::new("Bölüm", |c: &Self| opt(&c.current_department)),
            Column::new("Durum", |c: &Self| opt(&c.status)),
        ]
    }

    fn status(&self) -> Option<String> {
        self.status.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefakatCard {
    pub id: i64,
    pub card_number: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub current_department: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl Tabular for RefakatCard {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |c: &Self| c.id.to_string()),
            Column::new("Kart No", |c: &Self| c.card_number.clone()),
            Column::new("Sipariş No", |c: &Self| opt(&c.order_number)),
            Column::new("Müşteri", |c: &Self| opt(&c.customer_name)),
            Column::new("Bölüm", |c: &Self| opt(&c.current_department)),
            Column::new("Durum", |c: &Self| opt(&c.status)),
        ]
    }

    fn status(&self) -> Option<String> {
        self.status.clone()
    }
}

// ── Maintenance ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub machine_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `low`, `medium`, `high`, `critical`.
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Tabular for MaintenanceRequest {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |m: &Self| m.id.to_string()),
            Column::new("Başlık", |m: &Self| m.title.clone()),
            Column::new("Makine", |m: &Self| opt(&m.machine_name)),
            Column::new("Öncelik", |m: &Self| opt(&m.priority)),
            Column::new("Durum", |m: &Self| opt(&m.status)),
            Column::new("Talep Eden", |m: &Self| opt(&m.requested_by)),
        ]
    }

    fn status(&self) -> Option<String> {
        self.status.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenancePlan {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub machine_name: Option<String>,
    /// `daily`, `weekly`, `monthly`, ...
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub next_date: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Tabular for MaintenancePlan {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |p: &Self| p.id.to_string()),
            Column::new("Plan", |p: &Self| p.name.clone()),
            Column::new("Makine", |p: &Self| opt(&p.machine_name)),
            Column::new("Sıklık", |p: &Self| opt(&p.frequency)),
            Column::new("Sonraki", |p: &Self| opt(&p.next_date)),
        ]
    }

    fn status(&self) -> Option<String> {
        self.is_active
            .map(|active| if active { "active" } else { "inactive" }.to_string())
    }
}

// ── Quality & samples ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub id: i64,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub inspector: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub defect_count: Option<u32>,
    #[serde(default)]
    pub inspected_at: Option<String>,
}

impl Tabular for QualityReport {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |q: &Self| q.id.to_string()),
            Column::new("Sipariş No", |q: &Self| opt(&q.order_number)),
            Column::new("Ürün", |q: &Self| opt(&q.product_name)),
            Column::new("Kontrol Eden", |q: &Self| opt(&q.inspector)),
            Column::new("Sonuç", |q: &Self| opt(&q.result)),
            Column::new("Hata", |q: &Self| {
                q.defect_count.map(|n| n.to_string()).unwrap_or_default()
            }),
        ]
    }

    fn status(&self) -> Option<String> {
        self.result.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCard {
    pub id: i64,
    pub sample_code: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub fabric_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Tabular for SampleCard {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |s: &Self| s.id.to_string()),
            Column::new("Numune Kodu", |s: &Self| s.sample_code.clone()),
            Column::new("Müşteri", |s: &Self| opt(&s.customer_name)),
            Column::new("Kumaş", |s: &Self| opt(&s.fabric_type)),
            Column::new("Renk", |s: &Self| opt(&s.color)),
            Column::new("Durum", |s: &Self| opt(&s.status)),
        ]
    }

    fn status(&self) -> Option<String> {
        self.status.clone()
    }
}

// ── Access control ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Tabular for Role {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |r: &Self| r.id.to_string()),
            Column::new("Rol", |r: &Self| r.name.clone()),
            Column::new("Açıklama", |r: &Self| opt(&r.description)),
            Column::new("Yetki", |r: &Self| r.permissions.len().to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
}

impl Tabular for Permission {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |p: &Self| p.id.to_string()),
            Column::new("Yetki", |p: &Self| p.name.clone()),
            Column::new("Modül", |p: &Self| opt(&p.module)),
            Column::new("Açıklama", |p: &Self| opt(&p.description)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_unknown_status_decodes() {
        let order: Order = serde_json::from_value(json!({
            "id": 1,
            "orderNumber": "SP-2024-001",
            "status": "on_hold"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);

        let order: Order = serde_json::from_value(json!({"id": 2})).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_notification_defaults() {
        let n: Notification = serde_json::from_value(json!({
            "id": 5,
            "title": "Yeni sipariş",
            "type": "warning"
        }))
        .unwrap();
        assert_eq!(n.kind, "warning");
        assert!(!n.is_read);
        assert_eq!(n.created_at, "");
    }

    #[test]
    fn test_missing_required_field_fails() {
        let result: Result<Customer, _> = serde_json::from_value(json!({"id": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_order_quantity_column_appends_unit() {
        let order: Order = serde_json::from_value(json!({
            "id": 3, "quantity": 250.0, "unit": "m", "status": "in_production"
        }))
        .unwrap();
        let columns = Order::columns();
        let qty = columns.iter().find(|c| c.header == "Miktar").unwrap();
        assert_eq!((qty.value)(&order), "250 m");
        assert_eq!(order.status(), Some("in_production".to_string()));
    }
}
