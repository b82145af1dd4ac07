//! Label PDF composer.
//!
//! Draws one landscape A6 page: a title bar, a department band in the accent
//! color, the key/value field table, the barcode area and an optional
//! footer note. Only `qrcode` labels get a raster image; every other
//! symbology is printed as its value in plain text.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::descriptor::LabelDescriptor;
use super::qr::{QrRaster, encode_qr};
use crate::errors::LabelError;

/// Landscape A6 in points (148 mm x 105 mm).
pub const PAGE_WIDTH: f32 = 419.53;
pub const PAGE_HEIGHT: f32 = 297.64;

const MARGIN: f32 = 14.0;
const TITLE_HEIGHT: f32 = 26.0;
const BAND_HEIGHT: f32 = 18.0;
const ROW_HEIGHT: f32 = 16.0;
const NAME_COLUMN: f32 = 96.0;
const QR_SIZE: f32 = 92.0;
const FOOTER_HEIGHT: f32 = 44.0;
const NOTE_WRAP: usize = 92;

const TITLE_FILL: [f32; 3] = [0.12, 0.16, 0.23];
const RULE_GRAY: f32 = 0.85;
const MUTED_GRAY: f32 = 0.4;

pub const LINEAR_BARCODE_NOTICE: &str =
    "Doğrusal barkod çizimi istemci tarafında desteklenmiyor; değer metin olarak basıldı.";

/// A composed label document.
#[derive(Debug, Clone)]
pub struct LabelPdf {
    bytes: Vec<u8>,
}

impl LabelPdf {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:application/pdf;base64,{}",
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, &self.bytes)
    }
}

/// Compose `label` into a PDF.
pub fn compose_label(label: &LabelDescriptor) -> Result<LabelPdf, LabelError> {
    compose_label_with(label, encode_qr)
}

/// Compose `label` into a PDF and return it as a data URL.
pub fn compose_label_data_url(label: &LabelDescriptor) -> Result<String, LabelError> {
    Ok(compose_label(label)?.to_data_url())
}

/// Same as [`compose_label`] with a caller-supplied QR encoder. The encoder
/// runs only for `qrcode` labels.
pub fn compose_label_with<F>(label: &LabelDescriptor, encode: F) -> Result<LabelPdf, LabelError>
where
    F: FnOnce(&str) -> Result<QrRaster, LabelError>,
{
    let qr = if label.barcode_type.is_qr() {
        Some(encode(&label.barcode_value)?)
    } else {
        None
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(font_dict("Helvetica"));
    let bold = doc.add_object(font_dict("Helvetica-Bold"));

    let mut xobjects = Dictionary::new();
    if let Some(qr) = &qr {
        xobjects.set("Im1", image_object(&mut doc, qr));
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
        "XObject" => xobjects,
    });

    let content = Content {
        operations: layout(label, qr.is_some()),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| LabelError::Write(e.to_string()))?;
    Ok(LabelPdf { bytes })
}

fn font_dict(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn image_object(doc: &mut Document, qr: &QrRaster) -> ObjectId {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(qr.width() as i64),
        "Height" => Object::Integer(qr.height() as i64),
        "ColorSpace" => "DeviceGray",
        "BitsPerComponent" => Object::Integer(8),
    };
    doc.add_object(Stream::new(dict, qr.pixels().to_vec()))
}

fn layout(label: &LabelDescriptor, with_qr: bool) -> Vec<Operation> {
    let mut ops = Vec::new();
    let top = PAGE_HEIGHT - MARGIN;
    let inner_width = PAGE_WIDTH - 2.0 * MARGIN;

    // Title bar
    fill_rect(&mut ops, TITLE_FILL, MARGIN, top - TITLE_HEIGHT, inner_width, TITLE_HEIGHT);
    text(&mut ops, "F2", 14.0, [1.0; 3], MARGIN + 8.0, top - 18.0, &label.title);

    // Department band
    let band_top = top - TITLE_HEIGHT;
    let accent = label.accent().unit();
    fill_rect(&mut ops, accent, MARGIN, band_top - BAND_HEIGHT, inner_width, BAND_HEIGHT);
    text(&mut ops, "F2", 10.0, [1.0; 3], MARGIN + 8.0, band_top - 13.0, &label.department);

    // Field table, narrowed when the QR occupies the right column
    let table_top = band_top - BAND_HEIGHT - 6.0;
    let table_width = if with_qr {
        inner_width - QR_SIZE - 10.0
    } else {
        inner_width
    };
    let value_chars = ((table_width - NAME_COLUMN) / 4.6) as usize;
    let floor = MARGIN + FOOTER_HEIGHT;
    let mut y = table_top;
    for field in &label.fields {
        if y - ROW_HEIGHT < floor {
            break;
        }
        let baseline = y - 11.5;
        text(&mut ops, "F2", 9.0, [0.0; 3], MARGIN + 4.0, baseline, &field.name);
        text(
            &mut ops,
            "F1",
            9.0,
            [0.0; 3],
            MARGIN + NAME_COLUMN,
            baseline,
            &truncate(&field.value, value_chars),
        );
        y -= ROW_HEIGHT;
        rule(&mut ops, MARGIN, y, MARGIN + table_width);
    }

    // Barcode area
    if with_qr {
        let x = PAGE_WIDTH - MARGIN - QR_SIZE;
        let y = table_top - QR_SIZE;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                Object::Real(QR_SIZE),
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(QR_SIZE),
                Object::Real(x),
                Object::Real(y),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]));
        ops.push(Operation::new("Q", vec![]));
        text(&mut ops, "F1", 7.0, [0.0; 3], x, y - 9.0, &label.barcode_value);
    } else {
        let baseline = MARGIN + FOOTER_HEIGHT - 12.0;
        let caption = format!("{} ({})", label.barcode_value, label.barcode_type);
        text(&mut ops, "F2", 11.0, [0.0; 3], MARGIN + 4.0, baseline, &caption);
        text(
            &mut ops,
            "F1",
            6.5,
            [MUTED_GRAY; 3],
            MARGIN + 4.0,
            baseline - 9.0,
            LINEAR_BARCODE_NOTICE,
        );
    }

    // Footer note
    if let Some(note) = &label.note {
        let mut baseline = MARGIN + 14.0;
        for line in textwrap::wrap(note, NOTE_WRAP).iter().take(2) {
            text(&mut ops, "F1", 8.0, [MUTED_GRAY; 3], MARGIN + 4.0, baseline, line);
            baseline -= 9.0;
        }
    }

    ops
}

fn fill_rect(ops: &mut Vec<Operation>, color: [f32; 3], x: f32, y: f32, w: f32, h: f32) {
    ops.push(Operation::new("rg", rgb_operands(color)));
    ops.push(Operation::new(
        "re",
        vec![
            Object::Real(x),
            Object::Real(y),
            Object::Real(w),
            Object::Real(h),
        ],
    ));
    ops.push(Operation::new("f", vec![]));
}

fn rule(ops: &mut Vec<Operation>, x1: f32, y: f32, x2: f32) {
    ops.push(Operation::new("RG", rgb_operands([RULE_GRAY; 3])));
    ops.push(Operation::new("w", vec![Object::Real(0.5)]));
    ops.push(Operation::new("m", vec![Object::Real(x1), Object::Real(y)]));
    ops.push(Operation::new("l", vec![Object::Real(x2), Object::Real(y)]));
    ops.push(Operation::new("S", vec![]));
}

fn text(ops: &mut Vec<Operation>, font: &str, size: f32, color: [f32; 3], x: f32, y: f32, s: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), Object::Real(size)],
    ));
    ops.push(Operation::new("rg", rgb_operands(color)));
    ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(win_ansi(s), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn rgb_operands(color: [f32; 3]) -> Vec<Object> {
    color.iter().map(|c| Object::Real(*c)).collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars || max_chars < 4 {
        return s.to_string();
    }
    let head: String = s.chars().take(max_chars - 3).collect();
    format!("{}...", head)
}

/// Encode text for the standard Type1 fonts. Latin-1 letters map to their
/// WinAnsi byte; Turkish letters outside it are transliterated.
pub fn win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            'ş' => b's',
            'Ş' => b'S',
            'ğ' => b'g',
            'Ğ' => b'G',
            'ı' => b'i',
            'İ' => b'I',
            '–' | '—' => b'-',
            '‘' | '’' => b'\'',
            '“' | '”' => b'"',
            '\t' | '\n' | '\r' => b' ',
            _ => b'?',
        })
        .collect()
}
