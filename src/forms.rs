//! Declarative form schemas and the submit path that follows validation.
//!
//! A [`FormSchema`] lists fields in display order, each with the rules it
//! must satisfy. Validation collects every failing field at once so the
//! caller can report them together; nothing reaches the network until the
//! whole form passes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::api::{ApiClient, Resource};
use crate::cache::QueryCache;
use crate::errors::FormError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{8,18}[0-9]$").expect("valid phone regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Numeric,
    PositiveNumber,
    Email,
    Phone,
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Error message for `value`, or `None` when the rule holds.
    /// Only `Required` looks at empty values; the rest skip them.
    fn check(&self, value: Option<&Value>) -> Option<String> {
        let text = value.and_then(as_text);
        let empty = text.as_deref().is_none_or(|t| t.trim().is_empty());

        if let Rule::Required = self {
            return empty.then(|| "Bu alan zorunludur".to_string());
        }
        if empty {
            return None;
        }
        let text = text.unwrap_or_default();
        let text = text.trim();

        match self {
            Rule::Required => None,
            Rule::MinLength(n) => {
                (text.chars().count() < *n).then(|| format!("En az {} karakter olmalıdır", n))
            }
            Rule::MaxLength(n) => {
                (text.chars().count() > *n).then(|| format!("En fazla {} karakter olabilir", n))
            }
            Rule::Numeric => parse_number(text)
                .is_none()
                .then(|| "Geçerli bir sayı giriniz".to_string()),
            Rule::PositiveNumber => match parse_number(text) {
                Some(n) if n > 0.0 => None,
                Some(_) => Some("Pozitif bir sayı olmalıdır".to_string()),
                None => Some("Geçerli bir sayı giriniz".to_string()),
            },
            Rule::Email => (!EMAIL_RE.is_match(text))
                .then(|| "Geçerli bir e-posta adresi giriniz".to_string()),
            Rule::Phone => (!PHONE_RE.is_match(text))
                .then(|| "Geçerli bir telefon numarası giriniz".to_string()),
            Rule::OneOf(options) => (!options.contains(&text))
                .then(|| format!("Geçerli değerler: {}", options.join(", "))),
        }
    }
}

/// Strings, numbers and booleans validate by their text form.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Accepts `12.5` and the Turkish decimal comma `12,5`.
fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub label: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// Every failing field, in schema order. At most one error per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    fn push(&mut self, spec: &FieldSpec, message: String) {
        self.errors.push(FieldError {
            field: spec.name.to_string(),
            label: spec.label.to_string(),
            message,
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

#[derive(Debug, Clone)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Validate a JSON object. The first failing rule of each field wins.
    pub fn validate(&self, body: &Value) -> Result<(), ValidationErrors> {
        self.check(body, false)
    }

    /// Validate a partial update: fields absent from `body` are left alone,
    /// fields that are present must still satisfy every rule.
    pub fn validate_patch(&self, body: &Value) -> Result<(), ValidationErrors> {
        self.check(body, true)
    }

    fn check(&self, body: &Value, partial: bool) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for spec in &self.fields {
            let value = body.get(spec.name);
            if partial && value.is_none() {
                continue;
            }
            if let Some(message) = spec.rules.iter().find_map(|rule| rule.check(value)) {
                errors.push(spec, message);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ── Schemas ─────────────────────────────────────────────────────────

const ORDER_UNITS: &[&str] = &["m", "kg", "adet", "top"];
const PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

pub fn customer_schema() -> FormSchema {
    FormSchema::new("customer")
        .field(
            FieldSpec::new("name", "Firma Adı")
                .rule(Rule::Required)
                .rule(Rule::MinLength(2))
                .rule(Rule::MaxLength(100)),
        )
        .field(FieldSpec::new("contactPerson", "Yetkili Kişi").rule(Rule::MaxLength(100)))
        .field(FieldSpec::new("email", "E-posta").rule(Rule::Email))
        .field(FieldSpec::new("phone", "Telefon").rule(Rule::Phone))
        .field(
            FieldSpec::new("taxNumber", "Vergi Numarası")
                .rule(Rule::Numeric)
                .rule(Rule::MinLength(10))
                .rule(Rule::MaxLength(11)),
        )
        .field(FieldSpec::new("city", "Şehir").rule(Rule::MaxLength(50)))
}

pub fn order_schema() -> FormSchema {
    FormSchema::new("order")
        .field(
            FieldSpec::new("customerId", "Müşteri")
                .rule(Rule::Required)
                .rule(Rule::PositiveNumber),
        )
        .field(
            FieldSpec::new("productName", "Ürün")
                .rule(Rule::Required)
                .rule(Rule::MaxLength(200)),
        )
        .field(
            FieldSpec::new("quantity", "Miktar")
                .rule(Rule::Required)
                .rule(Rule::PositiveNumber),
        )
        .field(FieldSpec::new("unit", "Birim").rule(Rule::OneOf(ORDER_UNITS)))
        .field(FieldSpec::new("dueDate", "Termin").rule(Rule::Required))
}

pub fn dye_recipe_schema() -> FormSchema {
    FormSchema::new("dye-recipe")
        .field(
            FieldSpec::new("name", "Reçete Adı")
                .rule(Rule::Required)
                .rule(Rule::MinLength(2)),
        )
        .field(FieldSpec::new("colorCode", "Renk Kodu").rule(Rule::Required))
        .field(FieldSpec::new("temperature", "Sıcaklık").rule(Rule::PositiveNumber))
        .field(FieldSpec::new("bathRatio", "Flote").rule(Rule::MaxLength(20)))
        .field(FieldSpec::new("machineType", "Makine Tipi").rule(Rule::MaxLength(50)))
}

pub fn maintenance_request_schema() -> FormSchema {
    FormSchema::new("maintenance-request")
        .field(
            FieldSpec::new("title", "Başlık")
                .rule(Rule::Required)
                .rule(Rule::MinLength(3)),
        )
        .field(FieldSpec::new("machineName", "Makine").rule(Rule::Required))
        .field(
            FieldSpec::new("priority", "Öncelik")
                .rule(Rule::Required)
                .rule(Rule::OneOf(PRIORITIES)),
        )
        .field(FieldSpec::new("description", "Açıklama").rule(Rule::MaxLength(1000)))
}

pub fn sample_card_schema() -> FormSchema {
    FormSchema::new("sample-card")
        .field(FieldSpec::new("sampleCode", "Numune Kodu").rule(Rule::Required))
        .field(FieldSpec::new("customerName", "Müşteri").rule(Rule::Required))
        .field(FieldSpec::new("fabricType", "Kumaş Türü").rule(Rule::Required))
        .field(FieldSpec::new("color", "Renk").rule(Rule::MaxLength(50)))
}

pub fn role_schema() -> FormSchema {
    FormSchema::new("role")
        .field(
            FieldSpec::new("name", "Rol Adı")
                .rule(Rule::Required)
                .rule(Rule::MinLength(2))
                .rule(Rule::MaxLength(50)),
        )
        .field(FieldSpec::new("description", "Açıklama").rule(Rule::MaxLength(255)))
}

/// Schema guarding writes to `resource`, if it has one.
pub fn schema_for(resource: Resource) -> Option<FormSchema> {
    match resource {
        Resource::Customers => Some(customer_schema()),
        Resource::Orders => Some(order_schema()),
        Resource::DyeRecipes => Some(dye_recipe_schema()),
        Resource::Maintenance => Some(maintenance_request_schema()),
        Resource::SampleCards => Some(sample_card_schema()),
        Resource::Roles => Some(role_schema()),
        _ => None,
    }
}

// ── Submission ──────────────────────────────────────────────────────

/// Validates, sends the mutation, and invalidates the affected cache path.
#[derive(Debug, Clone)]
pub struct FormSubmitter {
    client: ApiClient,
    cache: QueryCache,
}

impl FormSubmitter {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    fn validate(resource: Resource, body: &Value, partial: bool) -> Result<(), FormError> {
        if let Some(schema) = schema_for(resource) {
            schema.check(body, partial).map_err(FormError::Validation)?;
        }
        Ok(())
    }

    pub async fn create(&self, resource: Resource, body: &Value) -> Result<Value, FormError> {
        Self::validate(resource, body, false)?;
        let created: Value = self.client.post_json(resource.path(), body).await?;
        self.cache.invalidate_path(resource.path()).await;
        tracing::info!(resource = %resource, "record created");
        Ok(created)
    }

    pub async fn update(
        &self,
        resource: Resource,
        id: i64,
        body: &Value,
    ) -> Result<Value, FormError> {
        Self::validate(resource, body, true)?;
        let updated: Value = self
            .client
            .patch_json(&resource.item_path(id), body)
            .await?;
        self.cache.invalidate_path(resource.path()).await;
        tracing::info!(resource = %resource, id, "record updated");
        Ok(updated)
    }

    pub async fn delete(&self, resource: Resource, id: i64) -> Result<(), FormError> {
        self.client.delete(&resource.item_path(id)).await?;
        self.cache.invalidate_path(resource.path()).await;
        tracing::info!(resource = %resource, id, "record deleted");
        Ok(())
    }
}
