use std::collections::HashMap;

use tracing::debug;

use crate::models::{DetailField, DisplayPreferences, InvoiceHeader, LineItem, LineItemField, PreviewSlot};
use crate::totals::{self, Recomputed};

/// Currency symbols offered by the currency selector.
pub const CURRENCIES: [&str; 5] = ["$", "€", "£", "₹", "¥"];

/// Everything the user has typed into the invoice form.
///
/// Owned by the top-level controller and handed to whoever needs it; the
/// preview is always derived from this state, never stored separately.
#[derive(Debug, Clone)]
pub struct FormState {
    pub header: InvoiceHeader,
    details: HashMap<DetailField, String>,
    rows: Vec<LineItem>,
    next_row_id: u32,
    tax_rate_input: Option<String>,
    currency_symbol: String,
}

impl FormState {
    pub fn new(preferences: &DisplayPreferences) -> Self {
        Self {
            header: InvoiceHeader::stamped(),
            details: HashMap::new(),
            rows: vec![LineItem::new(1)],
            next_row_id: 2,
            tax_rate_input: None,
            currency_symbol: preferences.currency_symbol.clone(),
        }
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub fn row_mut(&mut self, id: u32) -> Option<&mut LineItem> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn row_index(&self, id: u32) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// Append an empty row and return its id.
    pub fn add_row(&mut self) -> u32 {
        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.push(LineItem::new(id));
        debug!(row = id, "added line item");
        id
    }

    /// Remove a row. The last remaining row is never removed.
    pub fn delete_row(&mut self, id: u32) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        match self.row_index(id) {
            Some(index) => {
                self.rows.remove(index);
                debug!(row = id, "deleted line item");
                true
            }
            None => false,
        }
    }

    /// Replace one column of a row. Unknown ids are ignored.
    pub fn set_row_field(&mut self, id: u32, field: LineItemField, text: &str) {
        if let Some(row) = self.row_mut(id) {
            *row.field_mut(field) = text.to_string();
        }
    }

    pub fn detail(&self, field: DetailField) -> &str {
        self.details.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set_detail(&mut self, field: DetailField, text: &str) {
        self.details.insert(field, text.to_string());
    }

    pub fn detail_mut(&mut self, field: DetailField) -> &mut String {
        self.details.entry(field).or_default()
    }

    /// What a preview slot shows: the field's value, or its placeholder when empty.
    pub fn preview_text(&self, slot: PreviewSlot) -> &str {
        let value = self.detail(slot.source());
        if value.is_empty() {
            slot.placeholder()
        } else {
            value
        }
    }

    pub fn tax_rate_input(&self) -> Option<&str> {
        self.tax_rate_input.as_deref()
    }

    pub fn set_tax_rate_input(&mut self, text: &str) {
        self.tax_rate_input = Some(text.to_string());
    }

    pub fn tax_rate_input_mut(&mut self) -> &mut String {
        self.tax_rate_input.get_or_insert_with(String::new)
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn set_currency(&mut self, symbol: &str) {
        self.currency_symbol = symbol.to_string();
    }

    /// Step through [`CURRENCIES`]. A symbol outside the list restarts at the first entry.
    pub fn cycle_currency(&mut self, forward: bool) {
        let len = CURRENCIES.len();
        let next = match CURRENCIES.iter().position(|c| *c == self.currency_symbol) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.currency_symbol = CURRENCIES[next].to_string();
    }

    pub fn recompute(&self) -> Recomputed {
        totals::recompute(&self.rows, self.tax_rate_input(), &self.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormState {
        FormState::new(&DisplayPreferences::default())
    }

    #[test]
    fn starts_with_one_empty_row_and_stamped_header() {
        let state = form();
        assert_eq!(state.rows().len(), 1);
        assert!(state.header.number.starts_with("INV-"));
        assert!(state.header.number["INV-".len()..].parse::<i64>().is_ok());
        assert_eq!(state.currency_symbol(), "$");
    }

    #[test]
    fn deleting_last_row_is_a_no_op() {
        let mut state = form();
        let only = state.rows()[0].id;
        assert!(!state.delete_row(only));
        assert_eq!(state.rows().len(), 1);
    }

    #[test]
    fn row_ids_stay_stable_across_deletes() {
        let mut state = form();
        let first = state.rows()[0].id;
        let second = state.add_row();
        let third = state.add_row();

        assert!(state.delete_row(second));
        let fourth = state.add_row();

        let ids: Vec<u32> = state.rows().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![first, third, fourth]);
        assert_ne!(fourth, second);
        assert!(!state.delete_row(second));
    }

    #[test]
    fn editing_rows_feeds_recompute() {
        let mut state = form();
        let id = state.rows()[0].id;
        state.set_row_field(id, LineItemField::Description, "Design");
        state.set_row_field(id, LineItemField::UnitPrice, "100");
        state.set_row_field(id, LineItemField::Quantity, "2");
        state.add_row();

        let (rows, totals) = state.recompute().display();
        assert_eq!(rows.len(), 1);
        assert_eq!(totals.grand_total, "$220.00");

        state.set_tax_rate_input("0");
        assert_eq!(state.recompute().totals_display().grand_total, "$200.00");
    }

    #[test]
    fn unknown_row_edits_are_ignored() {
        let mut state = form();
        state.set_row_field(999, LineItemField::Description, "ghost");
        assert!(state.rows().iter().all(|row| row.description.is_empty()));
    }

    #[test]
    fn preview_mirrors_fields_with_placeholders() {
        let mut state = form();
        assert_eq!(state.preview_text(PreviewSlot::CompanyName), "[company name]");
        assert_eq!(state.preview_text(PreviewSlot::ClientCityZip), "[client city zip]");

        state.set_detail(DetailField::CompanyName, "Acme Ltd");
        assert_eq!(state.preview_text(PreviewSlot::CompanyName), "Acme Ltd");
        assert_eq!(state.preview_text(PreviewSlot::FooterCompanyName), "Acme Ltd");

        state.set_detail(DetailField::CompanyName, "");
        assert_eq!(state.preview_text(PreviewSlot::FooterCompanyName), "[company name]");
    }

    #[test]
    fn currency_cycles_both_ways() {
        let mut state = form();
        state.cycle_currency(true);
        assert_eq!(state.currency_symbol(), "€");
        state.cycle_currency(false);
        state.cycle_currency(false);
        assert_eq!(state.currency_symbol(), "¥");

        state.set_currency("CHF");
        state.cycle_currency(true);
        assert_eq!(state.currency_symbol(), "$");
    }

    #[test]
    fn currency_change_keeps_numbers() {
        let mut state = form();
        let id = state.rows()[0].id;
        state.set_row_field(id, LineItemField::UnitPrice, "12.5");
        state.set_row_field(id, LineItemField::Quantity, "2");

        let before = state.recompute();
        state.set_currency("€");
        let after = state.recompute();

        assert_eq!(before.totals, after.totals);
        assert_eq!(after.totals_display().subtotal, "€25.00");
    }
}
