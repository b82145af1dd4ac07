//! `tekstil label` - compose a label PDF and optionally queue it for printing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use console::style;

use tekstil::labels::{LabelKind, LabelPrinter, compose_label};

use super::{AppContext, read_json};

pub struct LabelOptions {
    pub out: Option<PathBuf>,
    /// Label type id when the label should also be printed.
    pub print: Option<i64>,
    pub open: bool,
}

/// Barcode values become file names; keep them portable.
fn file_stem(barcode: &str) -> String {
    barcode
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub async fn cmd_label(
    ctx: &AppContext,
    kind: &str,
    data: &Path,
    options: LabelOptions,
) -> Result<()> {
    let kind: LabelKind = kind.parse()?;
    let record = read_json(data)?;
    let (label, entity_id) = kind.build_from_json(record)?;

    let pdf = compose_label(&label)
        .with_context(|| format!("Failed to compose {} label", kind))?;
    let out = options.out.unwrap_or_else(|| {
        ctx.config
            .labels
            .output_dir
            .join(format!("{}.pdf", file_stem(&label.barcode_value)))
    });
    pdf.write_to(&out)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!(
        "{} {} ({}, {})",
        style("Label written:").green(),
        out.display(),
        label.barcode_value,
        label.barcode_type
    );

    if let Some(label_type_id) = options.print {
        let printer =
            LabelPrinter::with_endpoint(ctx.client()?, &ctx.config.labels.print_endpoint);
        if printer
            .print(&label, label_type_id, entity_id, kind.entity_type())
            .await
        {
            println!("{}", style("Label sent to printer.").green());
        } else {
            bail!("Label could not be printed; the PDF is still at {}", out.display());
        }
    }

    if options.open {
        open::that(&out).with_context(|| format!("Failed to open {}", out.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_replaces_unsafe_characters() {
        assert_eq!(file_stem("YRN-42-00000000-123"), "YRN-42-00000000-123");
        assert_eq!(file_stem("LOT/7 A"), "LOT_7_A");
    }
}
