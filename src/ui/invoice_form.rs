use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::form::FormState;
use crate::models::{DetailField, LineItemField, Theme};
use crate::totals::{self, Recomputed};
use crate::ui::components::date_input::DateInputState;
use crate::ui::preview::render_preview;
use crate::ui::theme::Palette;

// Represents a field in the invoice form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    InvoiceNumber,
    InvoiceDate,
    Detail(DetailField),
    LineItems,
    TaxRate,
    Currency,
}

impl FormField {
    fn label(self) -> &'static str {
        match self {
            FormField::InvoiceNumber => "Invoice #",
            FormField::InvoiceDate => "Date",
            FormField::Detail(field) => field.label(),
            FormField::LineItems => "Line Items",
            FormField::TaxRate => "Tax Rate (%)",
            FormField::Currency => "Currency",
        }
    }
}

/// Tab order of the form
const FIELD_ORDER: [FormField; 21] = [
    FormField::InvoiceNumber,
    FormField::InvoiceDate,
    FormField::Detail(DetailField::CompanyName),
    FormField::Detail(DetailField::CompanyAddress),
    FormField::Detail(DetailField::CompanyCity),
    FormField::Detail(DetailField::CompanyPhone),
    FormField::Detail(DetailField::CompanyEmail),
    FormField::Detail(DetailField::ClientName),
    FormField::Detail(DetailField::ClientCompany),
    FormField::Detail(DetailField::ClientAddress),
    FormField::Detail(DetailField::ClientCity),
    FormField::Detail(DetailField::ClientPhone),
    FormField::Detail(DetailField::ClientEmail),
    FormField::LineItems,
    FormField::TaxRate,
    FormField::Currency,
    FormField::Detail(DetailField::BankName),
    FormField::Detail(DetailField::AccountNumber),
    FormField::Detail(DetailField::IfscCode),
    FormField::Detail(DetailField::AccountHolder),
    FormField::Detail(DetailField::Comment),
];

const FIELD_COUNT: usize = FIELD_ORDER.len();

#[derive(Debug, Clone, PartialEq)]
pub enum ExportStatus {
    Idle,
    InProgress,
    Done(PathBuf),
    Failed(String),
}

pub enum InvoiceFormAction {
    Quit,
    ToggleTheme,
    ExportPdf,
}

// Represents the builder screen state
pub struct InvoiceFormState {
    form: FormState,
    recomputed: Recomputed,
    theme: Theme,
    current: usize,
    editing: bool,
    date_state: DateInputState,
    selected_row: usize,
    editing_row: Option<(u32, LineItemField)>,
    export_status: ExportStatus,
    show_error: Option<String>,
}

impl InvoiceFormState {
    pub fn new(form: FormState, theme: Theme) -> Self {
        let recomputed = form.recompute();
        let date_state = DateInputState::new(form.header.date);
        Self {
            form,
            recomputed,
            theme,
            current: 0,
            editing: false,
            date_state,
            selected_row: 0,
            editing_row: None,
            export_status: ExportStatus::Idle,
            show_error: None,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn current_field(&self) -> FormField {
        FIELD_ORDER[self.current]
    }

    /// Recompute totals and preview from the current form.
    pub fn refresh(&mut self) -> &Recomputed {
        self.recomputed = self.form.recompute();
        &self.recomputed
    }

    pub fn begin_export(&mut self) -> bool {
        if self.export_status == ExportStatus::InProgress {
            return false;
        }
        self.export_status = ExportStatus::InProgress;
        true
    }

    pub fn finish_export(&mut self, result: std::result::Result<PathBuf, String>) {
        match result {
            Ok(path) => self.export_status = ExportStatus::Done(path),
            Err(reason) => {
                self.export_status = ExportStatus::Failed(reason);
                self.show_error = Some("Failed to generate PDF. Please try again.".to_string());
            }
        }
    }

    /// Export progress shown next to the key help.
    fn status_line(&self) -> String {
        match &self.export_status {
            ExportStatus::Idle => String::new(),
            ExportStatus::InProgress => "  Generating PDF...".to_string(),
            ExportStatus::Done(path) => format!("  Saved {}", path.display()),
            ExportStatus::Failed(reason) => format!("  PDF export failed: {}", reason),
        }
    }

    pub fn next_field(&mut self) {
        self.current = (self.current + 1) % FIELD_COUNT;
    }

    pub fn previous_field(&mut self) {
        self.current = (self.current + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
        match self.current_field() {
            FormField::InvoiceDate => self.date_state.start_editing(),
            FormField::LineItems => self.clamp_selection(),
            _ => {}
        }
    }

    pub fn stop_editing(&mut self) {
        self.editing = false;
        self.editing_row = None;
        if self.date_state.editing {
            self.date_state.stop_editing();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.form.rows().len();
        if self.selected_row >= len {
            self.selected_row = len.saturating_sub(1);
        }
    }

    fn selected_row_id(&self) -> Option<u32> {
        self.form.rows().get(self.selected_row).map(|row| row.id)
    }

    pub fn add_line_item(&mut self) {
        let id = self.form.add_row();
        if let Some(index) = self.form.row_index(id) {
            self.selected_row = index;
        }
        self.editing_row = Some((id, LineItemField::Description));
    }

    pub fn delete_line_item(&mut self) {
        if let Some(id) = self.selected_row_id() {
            if self.form.delete_row(id) {
                self.clamp_selection();
            }
        }
        self.editing_row = None;
    }

    pub fn edit_line_item(&mut self) {
        if let Some(id) = self.selected_row_id() {
            self.editing_row = Some((id, LineItemField::Description));
        }
    }

    fn advance_line_item_field(&mut self) {
        if let Some((id, field)) = self.editing_row {
            self.editing_row = field.next().map(|next| (id, next));
        }
    }

    fn move_row_selection(&mut self, down: bool) {
        let len = self.form.rows().len();
        if len == 0 {
            return;
        }
        self.selected_row = if down {
            (self.selected_row + 1) % len
        } else {
            (self.selected_row + len - 1) % len
        };
    }

    fn edit_text(&mut self, key: KeyCode) {
        let target = match self.current_field() {
            FormField::InvoiceNumber => &mut self.form.header.number,
            FormField::Detail(field) => self.form.detail_mut(field),
            FormField::TaxRate => {
                if let KeyCode::Char(c) = key {
                    if !(c.is_ascii_digit() || c == '.') {
                        return;
                    }
                }
                self.form.tax_rate_input_mut()
            }
            _ => return,
        };
        match key {
            KeyCode::Char(c) => target.push(c),
            KeyCode::Backspace => {
                target.pop();
            }
            _ => {}
        }
    }

    fn edit_line_item_text(&mut self, key: KeyCode) {
        let Some((id, field)) = self.editing_row else {
            return;
        };
        if let Some(row) = self.form.row_mut(id) {
            let value = row.field_mut(field);
            match key {
                KeyCode::Char(c) => value.push(c),
                KeyCode::Backspace => {
                    value.pop();
                }
                _ => {}
            }
        }
    }

    /// Apply one key press. Every edit is followed by a recomputation so the
    /// preview never lags behind the form.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<InvoiceFormAction> {
        let action = self.dispatch_key(key);
        self.refresh();
        action
    }

    fn dispatch_key(&mut self, key: KeyCode) -> Option<InvoiceFormAction> {
        if !self.editing {
            match key {
                KeyCode::Esc | KeyCode::Char('q') => return Some(InvoiceFormAction::Quit),
                KeyCode::Char('t') => return Some(InvoiceFormAction::ToggleTheme),
                KeyCode::Char('p') => {
                    if self.export_status != ExportStatus::InProgress {
                        return Some(InvoiceFormAction::ExportPdf);
                    }
                }
                KeyCode::Up => self.previous_field(),
                KeyCode::Down | KeyCode::Tab => self.next_field(),
                KeyCode::Left if self.current_field() == FormField::Currency => self.form.cycle_currency(false),
                KeyCode::Right if self.current_field() == FormField::Currency => self.form.cycle_currency(true),
                KeyCode::Enter => self.start_editing(),
                _ => {}
            }
            return None;
        }

        match self.current_field() {
            FormField::InvoiceDate => match key {
                KeyCode::Enter | KeyCode::Esc => self.stop_editing(),
                _ => {
                    self.date_state.handle_input(key);
                    self.form.header.date = self.date_state.date;
                }
            },
            FormField::Currency => match key {
                KeyCode::Left => self.form.cycle_currency(false),
                KeyCode::Right => self.form.cycle_currency(true),
                KeyCode::Enter | KeyCode::Esc => self.stop_editing(),
                _ => {}
            },
            FormField::LineItems => {
                if self.editing_row.is_some() {
                    match key {
                        KeyCode::Enter | KeyCode::Tab => self.advance_line_item_field(),
                        KeyCode::Esc => self.editing_row = None,
                        _ => self.edit_line_item_text(key),
                    }
                } else {
                    match key {
                        KeyCode::Char('a') => self.add_line_item(),
                        KeyCode::Char('d') => self.delete_line_item(),
                        KeyCode::Char('e') | KeyCode::Enter => self.edit_line_item(),
                        KeyCode::Up => self.move_row_selection(false),
                        KeyCode::Down => self.move_row_selection(true),
                        KeyCode::Esc => self.stop_editing(),
                        _ => {}
                    }
                }
            }
            FormField::InvoiceNumber | FormField::TaxRate | FormField::Detail(_) => match key {
                KeyCode::Enter | KeyCode::Esc => self.stop_editing(),
                _ => self.edit_text(key),
            },
        }

        None
    }
}

pub fn render_invoice_form<B: Backend>(frame: &mut Frame<B>, state: &mut InvoiceFormState) {
    let palette = Palette::for_theme(state.theme);
    frame.render_widget(Block::default().style(palette.base()), frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Min(12),   // Form + preview
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title = Paragraph::new(Spans::from(vec![
        Span::styled("Invoice Builder", palette.title()),
        Span::styled(format!("  ({} theme)", state.theme), palette.muted()),
    ]))
    .block(Block::default().borders(Borders::ALL).style(palette.base()));
    frame.render_widget(title, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[1]);

    render_form(frame, state, &palette, panes[0]);
    let focus = state.selected_row_id();
    render_preview(frame, panes[1], &state.form, &state.recomputed, focus, &palette);

    let help_text = match (state.editing, state.current_field()) {
        (false, _) => "Enter - Edit | Up/Down - Navigate | T - Theme | P - Download PDF | Q - Quit",
        (true, FormField::InvoiceDate) => "Left/Right - Switch date part | Enter - Done",
        (true, FormField::Currency) => "Left/Right - Change currency | Enter - Done",
        (true, FormField::LineItems) => {
            if state.editing_row.is_some() {
                "Enter/Tab - Next column | Esc - Done with row"
            } else {
                "A - Add item | E - Edit selected | D - Delete selected | Esc - Done"
            }
        }
        (true, _) => "Type to edit | Enter - Done",
    };

    let status_style = match &state.export_status {
        ExportStatus::Idle => palette.base(),
        ExportStatus::InProgress => palette.focused(),
        ExportStatus::Done(_) => palette.base().fg(palette.success),
        ExportStatus::Failed(_) => palette.base().fg(palette.error),
    };
    let status = Span::styled(state.status_line(), status_style);

    let help = Paragraph::new(Spans::from(vec![Span::styled(help_text, palette.muted()), status]))
        .block(Block::default().borders(Borders::ALL).style(palette.base()));
    frame.render_widget(help, chunks[2]);

    if let Some(error) = &state.show_error {
        render_error(frame, frame.size(), error, &palette);
    }
}

fn render_form<B: Backend>(frame: &mut Frame<B>, state: &mut InvoiceFormState, palette: &Palette, area: Rect) {
    let rows_height = state.form.rows().len() as u16 + 4;
    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(rows_height.min(14))].as_ref())
        .split(area);

    let current = state.current_field();
    let mut list_state = ListState::default();
    let mut items = Vec::new();

    for field in FIELD_ORDER.iter() {
        if *field == FormField::LineItems {
            continue;
        }
        if *field == current {
            list_state.select(Some(items.len()));
        }
        let editing_here = state.editing && *field == current;
        let value = field_value(state, *field, editing_here);
        let label_style = if *field == current { palette.focused() } else { palette.base() };
        items.push(ListItem::new(Spans::from(vec![
            Span::styled(format!("{}: ", field.label()), label_style),
            Span::styled(value, palette.base()),
        ])));
    }

    let list = List::new(items)
        .block(Block::default().title("Invoice Details").borders(Borders::ALL).style(palette.base()))
        .highlight_style(if state.editing { palette.highlight() } else { palette.focused() });
    frame.render_stateful_widget(list, form_chunks[0], &mut list_state);

    render_line_items(frame, state, palette, form_chunks[1]);
}

fn field_value(state: &InvoiceFormState, field: FormField, editing: bool) -> String {
    let cursor = if editing { "|" } else { "" };
    match field {
        FormField::InvoiceNumber => format!("{}{}", state.form.header.number, cursor),
        FormField::InvoiceDate => {
            if editing {
                state.date_state.get_display_string()
            } else {
                state.form.header.date.format("%Y-%m-%d").to_string()
            }
        }
        FormField::Detail(detail) => format!("{}{}", state.form.detail(detail), cursor),
        FormField::TaxRate => format!(
            "{}{}  (applied: {}%)",
            state.form.tax_rate_input().unwrap_or(""),
            cursor,
            state.recomputed.totals.tax_rate
        ),
        FormField::Currency => format!("< {} >", state.form.currency_symbol()),
        FormField::LineItems => String::new(),
    }
}

fn render_line_items<B: Backend>(frame: &mut Frame<B>, state: &InvoiceFormState, palette: &Palette, area: Rect) {
    let focused = state.current_field() == FormField::LineItems;
    let columns = [
        LineItemField::Description.label(),
        LineItemField::UnitPrice.label(),
        LineItemField::Quantity.label(),
        "Total",
    ];
    let header = Row::new(columns.iter().map(|h| Cell::from(*h)))
        .style(palette.base().fg(palette.accent))
        .bottom_margin(1);

    let rows = state.form.rows().iter().map(|item| {
        let cell = |field: LineItemField| {
            let mut text = item.field(field).to_string();
            if state.editing_row == Some((item.id, field)) {
                text.push('|');
            }
            Cell::from(text)
        };
        Row::new(vec![
            cell(LineItemField::Description),
            cell(LineItemField::UnitPrice),
            cell(LineItemField::Quantity),
            Cell::from(totals::row_total_display(item)),
        ])
    });

    let title = if focused { "Line Items (selected)" } else { "Line Items" };
    let table = Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(if focused { palette.focused() } else { palette.base() }),
        )
        .highlight_style(palette.highlight())
        .widths(&[
            Constraint::Percentage(40),
            Constraint::Percentage(22),
            Constraint::Percentage(13),
            Constraint::Percentage(25),
        ]);

    let mut table_state = TableState::default();
    if focused && state.editing {
        table_state.select(Some(state.selected_row));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_error<B: Backend>(frame: &mut Frame<B>, size: Rect, error: &str, palette: &Palette) {
    let popup_area = centered_rect(60, 20, size);

    let error_msg = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(error),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title("Error").borders(Borders::ALL))
    .style(palette.base().fg(palette.error));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(error_msg, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Wait up to `timeout` for a key and apply it.
pub fn handle_input(state: &mut InvoiceFormState, timeout: Duration) -> Result<Option<InvoiceFormAction>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }
        // The error popup swallows the key that dismisses it
        if state.show_error.take().is_some() {
            return Ok(None);
        }
        return Ok(state.handle_key(key.code));
    }

    Ok(None)
}

#[cfg(test)]
impl InvoiceFormState {
    fn recomputed(&self) -> &Recomputed {
        &self.recomputed
    }

    fn is_editing(&self) -> bool {
        self.editing
    }

    fn selected_row(&self) -> usize {
        self.selected_row
    }

    fn error(&self) -> Option<&str> {
        self.show_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DisplayPreferences;

    fn state() -> InvoiceFormState {
        InvoiceFormState::new(FormState::new(&DisplayPreferences::default()), Theme::Light)
    }

    fn focus(state: &mut InvoiceFormState, field: FormField) {
        while state.current_field() != field {
            state.handle_key(KeyCode::Down);
        }
    }

    fn type_text(state: &mut InvoiceFormState, text: &str) {
        for c in text.chars() {
            state.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_a_line_item_updates_totals_live() {
        let mut state = state();
        focus(&mut state, FormField::LineItems);
        state.handle_key(KeyCode::Enter); // enter table
        state.handle_key(KeyCode::Enter); // edit selected row
        type_text(&mut state, "Design");
        state.handle_key(KeyCode::Tab);
        type_text(&mut state, "100");
        state.handle_key(KeyCode::Tab);
        type_text(&mut state, "2");

        let totals = state.recomputed().totals_display();
        assert_eq!(totals.subtotal, "$200.00");
        assert_eq!(totals.grand_total, "$220.00");
    }

    #[test]
    fn delete_key_never_removes_the_last_row() {
        let mut state = state();
        focus(&mut state, FormField::LineItems);
        state.handle_key(KeyCode::Enter);
        state.handle_key(KeyCode::Char('d'));
        assert_eq!(state.form().rows().len(), 1);

        state.handle_key(KeyCode::Char('a'));
        state.handle_key(KeyCode::Esc);
        assert_eq!(state.form().rows().len(), 2);
        assert_eq!(state.selected_row(), 1);

        state.handle_key(KeyCode::Char('d'));
        assert_eq!(state.form().rows().len(), 1);
        assert_eq!(state.selected_row(), 0);
    }

    #[test]
    fn tax_rate_field_accepts_only_numeric_characters() {
        let mut state = state();
        focus(&mut state, FormField::TaxRate);
        state.handle_key(KeyCode::Enter);
        type_text(&mut state, "1x8");
        state.handle_key(KeyCode::Enter);

        assert_eq!(state.form().tax_rate_input(), Some("18"));
        assert_eq!(state.recomputed().totals.tax_rate, 18.0);
    }

    #[test]
    fn detail_edits_reach_the_preview() {
        let mut state = state();
        focus(&mut state, FormField::Detail(DetailField::ClientName));
        state.handle_key(KeyCode::Enter);
        type_text(&mut state, "Jo");
        state.handle_key(KeyCode::Backspace);
        state.handle_key(KeyCode::Enter);

        assert_eq!(state.form().detail(DetailField::ClientName), "J");
        assert!(!state.is_editing());
    }

    #[test]
    fn currency_field_cycles_with_arrows() {
        let mut state = state();
        focus(&mut state, FormField::Currency);
        state.handle_key(KeyCode::Right);
        assert_eq!(state.recomputed().currency_symbol(), "€");
        state.handle_key(KeyCode::Left);
        assert_eq!(state.recomputed().currency_symbol(), "$");
    }

    #[test]
    fn global_keys_map_to_actions() {
        let mut state = state();
        assert!(matches!(state.handle_key(KeyCode::Char('t')), Some(InvoiceFormAction::ToggleTheme)));
        assert!(matches!(state.handle_key(KeyCode::Char('p')), Some(InvoiceFormAction::ExportPdf)));
        assert!(matches!(state.handle_key(KeyCode::Char('q')), Some(InvoiceFormAction::Quit)));
    }

    #[test]
    fn export_requests_are_ignored_while_one_is_running() {
        let mut state = state();
        assert!(state.begin_export());
        assert!(!state.begin_export());
        assert!(state.handle_key(KeyCode::Char('p')).is_none());

        state.finish_export(Err("engine missing".to_string()));
        assert_eq!(state.error(), Some("Failed to generate PDF. Please try again."));
        assert!(state.begin_export());
    }

    #[test]
    fn status_line_reports_export_outcome() {
        let mut state = state();
        assert_eq!(state.status_line(), "");

        state.begin_export();
        assert_eq!(state.status_line(), "  Generating PDF...");

        state.finish_export(Err("failed to launch PDF engine `pandoc`".to_string()));
        assert_eq!(state.status_line(), "  PDF export failed: failed to launch PDF engine `pandoc`");

        state.begin_export();
        state.finish_export(Ok(PathBuf::from("out/invoice.pdf")));
        assert_eq!(state.status_line(), "  Saved out/invoice.pdf");
    }

    #[test]
    fn navigation_wraps_around() {
        let mut state = state();
        state.handle_key(KeyCode::Up);
        assert_eq!(state.current_field(), FormField::Detail(DetailField::Comment));
        state.handle_key(KeyCode::Down);
        assert_eq!(state.current_field(), FormField::InvoiceNumber);
    }
}
