use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceHeader {
    pub number: String,
    pub date: NaiveDate,
}

impl InvoiceHeader {
    /// Stamp a fresh header: today's date and a number derived from the current time.
    pub fn stamped() -> Self {
        let now = Local::now();
        Self {
            number: format!("INV-{}", now.timestamp_millis()),
            date: now.date_naive(),
        }
    }
}
