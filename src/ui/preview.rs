use std::ops::Range;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::form::FormState;
use crate::models::PreviewSlot;
use crate::totals::Recomputed;
use crate::ui::theme::Palette;

const HEADER_LINES: u16 = 9;
const TOTALS_LINES: u16 = 4;
const FOOTER_LINES: u16 = 7;
// Column titles and the gap under them
const TABLE_CHROME: u16 = 2;

/// Heights of the header, items, totals and footer sections for a pane of
/// `height` lines. The items table gets the room its rows need before the
/// header and footer are given theirs.
fn section_heights(height: u16, item_rows: usize) -> [u16; 4] {
    let totals = TOTALS_LINES.min(height);
    let mut rest = height - totals;

    let wanted = u16::try_from(item_rows)
        .unwrap_or(u16::MAX)
        .max(1)
        .saturating_add(TABLE_CHROME);
    let items = wanted.min(rest);
    rest -= items;

    let header = HEADER_LINES.min(rest);
    rest -= header;
    let footer = FOOTER_LINES.min(rest);
    rest -= footer;

    [header, items + rest, totals, footer]
}

/// Rows that fit in `capacity` lines, kept around `focus`, and how many
/// rows are left out. When rows are left out one line goes to a note
/// saying so.
fn visible_rows(total: usize, capacity: usize, focus: Option<usize>) -> (Range<usize>, usize) {
    if total <= capacity {
        return (0..total, 0);
    }
    let shown = capacity.saturating_sub(1);
    let focus = focus.unwrap_or(0).min(total - 1);
    let start = (focus + 1).saturating_sub(shown).min(total - shown);
    (start..start + shown, total - shown)
}

/// Draw the printable invoice as it will be exported. `focus` is the id of
/// the row selected in the form, kept in view when not every row fits.
pub fn render_preview<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    form: &FormState,
    recomputed: &Recomputed,
    focus: Option<u32>,
    palette: &Palette,
) {
    let outer = Block::default()
        .title("Preview")
        .borders(Borders::ALL)
        .style(palette.base());
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let [header_height, items_height, totals_height, footer_height] =
        section_heights(inner.height, recomputed.rows.len());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(header_height), // Sender, client and invoice number
                Constraint::Length(items_height),
                Constraint::Length(totals_height),
                Constraint::Length(footer_height), // Payment details and footer
            ]
            .as_ref(),
        )
        .split(inner);

    let text = |slot: PreviewSlot| Span::styled(form.preview_text(slot).to_string(), palette.base());
    let label = |s: &'static str| Span::styled(s, palette.base().fg(palette.accent).add_modifier(Modifier::BOLD));

    let header = vec![
        Spans::from(Span::styled(
            form.preview_text(PreviewSlot::CompanyName).to_string(),
            palette.title(),
        )),
        Spans::from(text(PreviewSlot::CompanyAddress)),
        Spans::from(text(PreviewSlot::CompanyCityZip)),
        Spans::from(vec![text(PreviewSlot::CompanyPhone), Span::raw("  "), text(PreviewSlot::CompanyEmail)]),
        Spans::from(vec![
            label("INVOICE "),
            Span::raw(form.header.number.clone()),
            Span::raw("  "),
            label("Date "),
            Span::raw(form.header.date.format("%Y-%m-%d").to_string()),
        ]),
        Spans::from(vec![label("Bill To: "), text(PreviewSlot::ClientName), Span::raw(", "), text(PreviewSlot::ClientCompany)]),
        Spans::from(vec![text(PreviewSlot::ClientAddress), Span::raw(", "), text(PreviewSlot::ClientCityZip)]),
        Spans::from(vec![text(PreviewSlot::ClientPhone), Span::raw("  "), text(PreviewSlot::ClientEmail)]),
    ];
    frame.render_widget(Paragraph::new(header).style(palette.base()), chunks[0]);

    let (rows, totals) = recomputed.display();
    let header_row = Row::new(["Description", "Price", "Qty", "Total"].iter().map(|h| Cell::from(*h)))
        .style(palette.base().fg(palette.accent))
        .bottom_margin(1);
    let focus_index = focus.and_then(|id| recomputed.rows.iter().position(|row| row.id == id));
    let capacity = usize::from(items_height.saturating_sub(TABLE_CHROME));
    let (window, hidden) = visible_rows(rows.len(), capacity, focus_index);
    let mut body: Vec<Row> = rows[window]
        .iter()
        .cloned()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.description),
                Cell::from(row.unit_price),
                Cell::from(row.quantity),
                Cell::from(row.total),
            ])
        })
        .collect();
    if hidden > 0 {
        body.push(Row::new(vec![Cell::from(format!("... {} more items", hidden))]).style(palette.muted()));
    }
    let table = Table::new(body)
        .header(header_row)
        .style(palette.base())
        .widths(&[
            Constraint::Percentage(40),
            Constraint::Percentage(22),
            Constraint::Percentage(13),
            Constraint::Percentage(25),
        ]);
    frame.render_widget(table, chunks[1]);

    let totals_text = vec![
        Spans::from(vec![label("Subtotal: "), Span::raw(totals.subtotal)]),
        Spans::from(vec![label("Tax: "), Span::raw(format!("{} {}", totals.tax_label, totals.tax_amount))]),
        Spans::from(vec![
            label("Total Due: "),
            Span::styled(totals.grand_total, palette.focused().add_modifier(Modifier::BOLD)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(totals_text).block(Block::default().borders(Borders::TOP).style(palette.base())),
        chunks[2],
    );

    let footer = vec![
        Spans::from(vec![label("Bank: "), text(PreviewSlot::BankName), Span::raw("  "), label("A/C: "), text(PreviewSlot::AccountNumber)]),
        Spans::from(vec![label("IFSC: "), text(PreviewSlot::Ifsc), Span::raw("  "), label("Holder: "), text(PreviewSlot::AccountHolder)]),
        Spans::from(text(PreviewSlot::Comment)),
        Spans::from(vec![
            Span::styled("Thank you for your business. ", palette.muted()),
            text(PreviewSlot::FooterCompanyName),
        ]),
        Spans::from(vec![text(PreviewSlot::FooterContactPhone), Span::raw(" | "), text(PreviewSlot::FooterContactEmail)]),
    ];
    frame.render_widget(
        Paragraph::new(footer)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP).style(palette.base())),
        chunks[3],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_keep_their_room_on_a_small_terminal() {
        // 80x24: the preview pane has 14 inner lines
        let [header, items, totals, footer] = section_heights(14, 6);
        assert_eq!(items, 8);
        assert_eq!(totals, TOTALS_LINES);
        assert_eq!(header + items + totals + footer, 14);
        assert_eq!(header, 2);
        assert_eq!(footer, 0);
    }

    #[test]
    fn spare_lines_go_to_header_footer_then_items() {
        assert_eq!(section_heights(40, 2), [9, 20, 4, 7]);
        assert_eq!(section_heights(20, 1), [9, 3, 4, 4]);
        assert_eq!(section_heights(3, 5), [0, 0, 3, 0]);
    }

    #[test]
    fn all_rows_shown_when_they_fit() {
        assert_eq!(visible_rows(3, 5, Some(2)), (0..3, 0));
        assert_eq!(visible_rows(0, 0, None), (0..0, 0));
    }

    #[test]
    fn overflow_keeps_focused_row_and_counts_the_rest() {
        let (window, hidden) = visible_rows(10, 4, None);
        assert_eq!(window, 0..3);
        assert_eq!(hidden, 7);

        let (window, hidden) = visible_rows(10, 4, Some(8));
        assert_eq!(window, 6..9);
        assert_eq!(hidden, 7);

        let (window, _) = visible_rows(10, 4, Some(9));
        assert_eq!(window, 7..10);

        let (window, hidden) = visible_rows(10, 1, Some(5));
        assert!(window.is_empty());
        assert_eq!(hidden, 10);
    }
}
