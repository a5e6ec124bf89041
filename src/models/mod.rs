mod details;
mod invoice;
mod line_item;
mod preferences;

pub use details::{DetailField, PreviewSlot};
pub use invoice::InvoiceHeader;
pub use line_item::{LineItem, LineItemField};
pub use preferences::{DisplayPreferences, Theme};
