use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            DatePart::Year => "[YYYY]",
            DatePart::Month => "[MM]",
            DatePart::Day => "[DD]",
        }
    }
}

/// Segment-wise date editor: digits are collected per part and applied once
/// the part is complete, so the date is always valid.
#[derive(Debug, Clone)]
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pending: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            pending: String::new(),
        }
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
        self.date_part = DatePart::Year;
        self.pending.clear();
    }

    pub fn stop_editing(&mut self) {
        self.editing = false;
        self.pending.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.pending.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.pending.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.pending.push(c);
                if self.pending.len() == self.date_part.width() {
                    self.apply_pending();
                    self.pending.clear();
                }
            }
            KeyCode::Backspace => {
                self.pending.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    // Out-of-range or impossible dates (Feb 30) leave the date unchanged
    fn apply_pending(&mut self) {
        let Ok(value) = self.pending.parse::<u32>() else {
            return;
        };
        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => NaiveDate::from_ymd_opt(value as i32, month, day),
            DatePart::Month => NaiveDate::from_ymd_opt(year, value, day),
            DatePart::Day => NaiveDate::from_ymd_opt(year, month, value),
            _ => None,
        };
        if let Some(date) = candidate {
            self.date = date;
        }
    }

    pub fn get_display_string(&self) -> String {
        let (year, month, day) = (
            format!("{:04}", self.date.year()),
            format!("{:02}", self.date.month()),
            format!("{:02}", self.date.day()),
        );
        if !self.editing {
            return format!("{}-{}-{}", year, month, day);
        }

        let current_input = if self.pending.is_empty() {
            self.date_part.placeholder().to_string()
        } else {
            format!("[{}]", self.pending)
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing(y: i32, m: u32, d: u32) -> DateInputState {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        state.start_editing();
        state
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_a_full_segment_updates_the_date() {
        let mut state = editing(2024, 1, 15);
        type_digits(&mut state, "2025");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "03");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "31");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn impossible_dates_are_rejected() {
        let mut state = editing(2023, 2, 10);
        state.date_part = DatePart::Day;
        type_digits(&mut state, "30");
        assert_eq!(state.date.day(), 10);

        state.date_part = DatePart::Month;
        type_digits(&mut state, "13");
        assert_eq!(state.date.month(), 2);

        state.date_part = DatePart::Year;
        type_digits(&mut state, "1850");
        assert_eq!(state.date.year(), 2023);
    }

    #[test]
    fn ignores_keys_when_not_editing() {
        let mut state = editing(2024, 6, 1);
        state.stop_editing();
        type_digits(&mut state, "1999");
        assert_eq!(state.date.year(), 2024);
    }

    #[test]
    fn display_marks_the_active_segment() {
        let mut state = editing(2024, 6, 1);
        assert_eq!(state.get_display_string(), "2024[YYYY]-06-01");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "1");
        assert_eq!(state.get_display_string(), "2024-06[1]-01");
        state.handle_input(KeyCode::Backspace);
        assert_eq!(state.get_display_string(), "2024-06[MM]-01");
        state.stop_editing();
        assert_eq!(state.get_display_string(), "2024-06-01");
    }
}
