use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

use crate::form::FormState;
use crate::models::PreviewSlot;
use crate::totals::Recomputed;

pub const PDF_FILENAME: &str = "invoice.pdf";
const HTML_FILENAME: &str = "invoice.html";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF engine `{engine}` could not be started: {source}")]
    EngineUnavailable {
        engine: String,
        #[source]
        source: io::Error,
    },
    #[error("PDF engine `{engine}` failed: {stderr}")]
    EngineFailed { engine: String, stderr: String },
    #[error("could not write invoice files: {0}")]
    Io(#[from] io::Error),
}

/// Renders the invoice preview and hands it to an external PDF engine
#[derive(Debug, Clone)]
pub struct InvoiceGenerator {
    output_dir: PathBuf,
    engine: String,
}

impl InvoiceGenerator {
    pub fn new(output_dir: &Path, engine: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            engine: engine.to_string(),
        }
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(PDF_FILENAME)
    }

    /// Write `document` next to the target and run the engine on it.
    ///
    /// Nothing here touches the form, so a failed export can simply be retried.
    pub async fn export(&self, document: &str) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir)?;

        let html_path = self.output_dir.join(HTML_FILENAME);
        let pdf_path = self.pdf_path();
        fs::write(&html_path, document)?;

        let output = Command::new(&self.engine)
            .arg(&html_path)
            .arg("-o")
            .arg(&pdf_path)
            .output()
            .await
            .map_err(|source| ExportError::EngineUnavailable {
                engine: self.engine.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(engine = %self.engine, %stderr, "PDF engine exited with {}", output.status);
            return Err(ExportError::EngineFailed {
                engine: self.engine.clone(),
                stderr,
            });
        }

        info!(path = %pdf_path.display(), "exported invoice");
        Ok(pdf_path)
    }
}

/// Render the printable invoice as a standalone HTML document.
///
/// `recomputed` must come from `form` immediately before the call so the
/// document matches what the preview shows.
pub fn render_document(form: &FormState, recomputed: &Recomputed) -> String {
    let slot = |s: PreviewSlot| html_escape(form.preview_text(s));
    let mut content = String::new();

    content.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    content.push_str(&format!("<title>{}</title>\n", html_escape(&form.header.number)));
    content.push_str("<style>\n");
    content.push_str("body { font-family: Helvetica, Arial, sans-serif; color: #222; margin: 0.5in; }\n");
    content.push_str("table { width: 100%; border-collapse: collapse; }\n");
    content.push_str("th, td { padding: 6px; border-bottom: 1px solid #ddd; }\n");
    content.push_str(".num { text-align: right; }\n");
    content.push_str("</style>\n</head>\n<body>\n");

    // Sender and invoice metadata
    content.push_str("<header>\n");
    content.push_str(&format!("<h1>{}</h1>\n", slot(PreviewSlot::CompanyName)));
    content.push_str(&format!("<p>{}<br>\n", slot(PreviewSlot::CompanyAddress)));
    content.push_str(&format!("{}<br>\n", slot(PreviewSlot::CompanyCityZip)));
    content.push_str(&format!("{}<br>\n", slot(PreviewSlot::CompanyPhone)));
    content.push_str(&format!("{}</p>\n", slot(PreviewSlot::CompanyEmail)));
    content.push_str("<h2>Invoice</h2>\n");
    content.push_str(&format!(
        "<p><strong>Invoice #</strong> {}<br>\n<strong>Date</strong> {}</p>\n",
        html_escape(&form.header.number),
        form.header.date.format("%Y-%m-%d")
    ));
    content.push_str("</header>\n");

    // Bill to
    content.push_str("<section>\n<h3>Bill To</h3>\n");
    content.push_str(&format!("<p>{}<br>\n", slot(PreviewSlot::ClientName)));
    content.push_str(&format!("{}<br>\n", slot(PreviewSlot::ClientCompany)));
    content.push_str(&format!("{}<br>\n", slot(PreviewSlot::ClientAddress)));
    content.push_str(&format!("{}<br>\n", slot(PreviewSlot::ClientCityZip)));
    content.push_str(&format!("{}<br>\n", slot(PreviewSlot::ClientPhone)));
    content.push_str(&format!("{}</p>\n</section>\n", slot(PreviewSlot::ClientEmail)));

    // Line items
    content.push_str("<table>\n<tr>\n");
    content.push_str("<th style=\"text-align: left;\">Description</th>\n");
    content.push_str("<th class=\"num\">Unit Price</th>\n");
    content.push_str("<th class=\"num\">Qty</th>\n");
    content.push_str("<th class=\"num\">Total</th>\n");
    content.push_str("</tr>\n");

    let (rows, totals) = recomputed.display();
    for row in &rows {
        content.push_str("<tr>\n");
        content.push_str(&format!("<td>{}</td>\n", html_escape(&row.description)));
        content.push_str(&format!("<td class=\"num\">{}</td>\n", html_escape(&row.unit_price)));
        content.push_str(&format!("<td class=\"num\">{}</td>\n", row.quantity));
        content.push_str(&format!("<td class=\"num\">{}</td>\n", html_escape(&row.total)));
        content.push_str("</tr>\n");
    }

    content.push_str(&format!(
        "<tr><td colspan=\"3\" class=\"num\">Subtotal</td><td class=\"num\">{}</td></tr>\n",
        html_escape(&totals.subtotal)
    ));
    content.push_str(&format!(
        "<tr><td colspan=\"3\" class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
        totals.tax_label,
        html_escape(&totals.tax_amount)
    ));
    content.push_str(&format!(
        "<tr><td colspan=\"3\" class=\"num\"><strong>Total Due</strong></td><td class=\"num\"><strong>{}</strong></td></tr>\n",
        html_escape(&totals.grand_total)
    ));
    content.push_str("</table>\n");

    // Payment details and comment
    content.push_str("<section>\n<h3>Payment Details</h3>\n");
    content.push_str(&format!("<p>Bank: {}<br>\n", slot(PreviewSlot::BankName)));
    content.push_str(&format!("Account Number: {}<br>\n", slot(PreviewSlot::AccountNumber)));
    content.push_str(&format!("IFSC: {}<br>\n", slot(PreviewSlot::Ifsc)));
    content.push_str(&format!("Account Holder: {}</p>\n", slot(PreviewSlot::AccountHolder)));
    content.push_str(&format!("<p>{}</p>\n</section>\n", slot(PreviewSlot::Comment)));

    content.push_str("<footer>\n");
    content.push_str(&format!(
        "<p>Thank you for your business. {} | {} | {}</p>\n",
        slot(PreviewSlot::FooterCompanyName),
        slot(PreviewSlot::FooterContactPhone),
        slot(PreviewSlot::FooterContactEmail)
    ));
    content.push_str("</footer>\n</body>\n</html>\n");

    content
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetailField, DisplayPreferences, LineItemField};

    fn sample_form() -> FormState {
        let mut form = FormState::new(&DisplayPreferences::default());
        let id = form.rows()[0].id;
        form.set_row_field(id, LineItemField::Description, "Design <draft>");
        form.set_row_field(id, LineItemField::UnitPrice, "100");
        form.set_row_field(id, LineItemField::Quantity, "2");
        form.add_row();
        form.set_detail(DetailField::CompanyName, "Acme & Sons");
        form
    }

    #[test]
    fn document_contains_rows_totals_and_escaped_text() {
        let form = sample_form();
        let document = render_document(&form, &form.recompute());

        assert!(document.contains("Design &lt;draft&gt;"));
        assert!(document.contains("Acme &amp; Sons"));
        assert!(document.contains("$200.00"));
        assert!(document.contains("Tax (10%)"));
        assert!(document.contains("$220.00"));
        assert!(document.contains("[client name]"));
        assert_eq!(document.matches("<td class=\"num\">2</td>").count(), 1);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[tokio::test]
    async fn missing_engine_is_reported_and_form_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let form = sample_form();
        let before = form.recompute();
        let generator = InvoiceGenerator::new(dir.path(), "invoice-builder-no-such-engine");

        let err = generator
            .export(&render_document(&form, &before))
            .await
            .expect_err("engine should be missing");

        assert!(matches!(err, ExportError::EngineUnavailable { .. }));
        assert_eq!(form.recompute(), before);
        assert!(dir.path().join(HTML_FILENAME).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_engine_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let generator = InvoiceGenerator::new(dir.path(), "false");

        let err = generator.export("<html></html>").await.expect_err("engine fails");
        assert!(matches!(err, ExportError::EngineFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_engine_produces_invoice_pdf() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("fake-engine.sh");
        fs::write(&script, "#!/bin/sh\ncp \"$1\" \"$3\"\n").expect("script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");

        let out = dir.path().join("out");
        let generator = InvoiceGenerator::new(&out, script.to_str().expect("utf8 path"));
        let path = generator.export("<html>ok</html>").await.expect("export");

        assert_eq!(path, out.join(PDF_FILENAME));
        assert_eq!(fs::read_to_string(path).expect("read"), "<html>ok</html>");
    }
}
