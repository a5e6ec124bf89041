use crate::models::LineItem;

/// Tax rate applied when the rate input is unset, empty or not a number.
pub const DEFAULT_TAX_RATE: f64 = 10.0;

/// An included row of the preview, with coerced numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub id: u32,
    pub description: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub total: f64,
}

/// Display strings for one preview row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDisplay {
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
    pub total: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    /// Effective rate in percent
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub tax_label: String,
    pub tax_amount: String,
    pub grand_total: String,
}

/// Result of a recomputation. Numbers are kept so the currency can be
/// swapped without touching them.
#[derive(Debug, Clone, PartialEq)]
pub struct Recomputed {
    pub rows: Vec<PreviewRow>,
    pub totals: InvoiceTotals,
    currency_symbol: String,
}

impl Recomputed {
    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Same numbers, different currency prefix.
    pub fn with_currency(mut self, currency_symbol: &str) -> Self {
        self.currency_symbol = currency_symbol.to_string();
        self
    }

    pub fn row_display(&self, row: &PreviewRow) -> RowDisplay {
        RowDisplay {
            description: if row.description.is_empty() {
                "-".to_string()
            } else {
                row.description.clone()
            },
            unit_price: format_money(&self.currency_symbol, row.unit_price),
            quantity: row.quantity.to_string(),
            total: format_money(&self.currency_symbol, row.total),
        }
    }

    pub fn totals_display(&self) -> TotalsDisplay {
        TotalsDisplay {
            subtotal: format_money(&self.currency_symbol, self.totals.subtotal),
            tax_label: format!("Tax ({}%)", self.totals.tax_rate),
            tax_amount: format_money(&self.currency_symbol, self.totals.tax_amount),
            grand_total: format_money(&self.currency_symbol, self.totals.grand_total),
        }
    }

    pub fn display(&self) -> (Vec<RowDisplay>, TotalsDisplay) {
        let rows = self.rows.iter().map(|row| self.row_display(row)).collect();
        (rows, self.totals_display())
    }
}

/// Compute preview rows and totals for the given line items.
///
/// Never fails: numeric text that does not parse counts as 0, and an
/// unusable tax rate falls back to [`DEFAULT_TAX_RATE`]. Rows with no
/// description, price or quantity are left out of the preview and the
/// subtotal.
pub fn recompute(items: &[LineItem], tax_rate_input: Option<&str>, currency_symbol: &str) -> Recomputed {
    let mut rows = Vec::new();
    let mut subtotal = 0.0;

    for item in items {
        let description = item.description.trim();
        let unit_price = parse_unit_price(&item.unit_price);
        let quantity = parse_quantity(&item.quantity);

        if description.is_empty() && unit_price <= 0.0 && quantity <= 0.0 {
            continue;
        }

        let total = saturate(unit_price * quantity);
        subtotal = saturate(subtotal + total);
        rows.push(PreviewRow {
            id: item.id,
            description: description.to_string(),
            unit_price,
            quantity,
            total,
        });
    }

    let tax_rate = parse_tax_rate(tax_rate_input);
    let tax_amount = saturate(subtotal * (tax_rate / 100.0));

    Recomputed {
        rows,
        totals: InvoiceTotals {
            subtotal,
            tax_rate,
            tax_amount,
            grand_total: saturate(subtotal + tax_amount),
        },
        currency_symbol: currency_symbol.to_string(),
    }
}

pub fn line_total(item: &LineItem) -> f64 {
    saturate(parse_unit_price(&item.unit_price) * parse_quantity(&item.quantity))
}

/// Text for the total column of the editable table: blank until the row has a value.
pub fn row_total_display(item: &LineItem) -> String {
    let total = line_total(item);
    if total > 0.0 {
        format!("{:.2}", total)
    } else {
        String::new()
    }
}

pub fn format_money(currency_symbol: &str, amount: f64) -> String {
    format!("{}{:.2}", currency_symbol, amount)
}

pub fn parse_unit_price(text: &str) -> f64 {
    non_negative(leading_number(text, true))
}

/// Quantities are whole counts; any fractional part is dropped.
pub fn parse_quantity(text: &str) -> f64 {
    non_negative(leading_number(text, false))
}

pub fn parse_tax_rate(input: Option<&str>) -> f64 {
    match input.and_then(|text| leading_number(text, true)) {
        // Rates too long to represent still clamp to the nearest bound
        Some(rate) if !rate.is_nan() => rate.clamp(0.0, 100.0),
        _ => DEFAULT_TAX_RATE,
    }
}

// Amounts past f64 range stay at the largest finite value.
fn saturate(amount: f64) -> f64 {
    if amount.is_nan() {
        0.0
    } else {
        amount.min(f64::MAX)
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

// Parses the longest numeric prefix of `text`, ignoring leading whitespace.
// Returns None when there are no digits to read.
fn leading_number(text: &str, fractional: bool) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = if matches!(bytes.first(), Some(b'+' | b'-')) { 1 } else { 0 };
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if fractional && bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        let frac_digits = frac_end - end - 1;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if fractional && matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
