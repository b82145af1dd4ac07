//! Label pipeline: barcode value → per-entity descriptor → PDF → printer.
//!
//! ```text
//! record ──builders──▶ LabelDescriptor ──compose_label──▶ LabelPdf (data URL / file)
//!                             │
//!                             └──LabelPrinter::print──▶ POST /api/labels/print
//! ```

pub mod barcode;
pub mod builders;
pub mod descriptor;
pub mod pdf;
pub mod print;
pub mod qr;

pub use barcode::{BarcodeType, generate_barcode_value};
pub use builders::LabelKind;
pub use descriptor::{LabelDescriptor, LabelField, Rgb};
pub use pdf::{LabelPdf, compose_label, compose_label_data_url};
pub use print::LabelPrinter;
pub use qr::{QrRaster, encode_qr, qr_data_url};
