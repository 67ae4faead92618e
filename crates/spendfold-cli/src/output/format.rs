use std::str::FromStr;

use rust_decimal::Decimal;

const INDENT: &str = "  ";
const GAP: &str = "  ";
const ELLIPSIS: char = '…';
const MIN_TEXT_WIDTH: usize = 10;
const DEFAULT_WIDTH: usize = 100;

/// One table cell. Text is left aligned; numbers are right aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Amount(Option<Decimal>),
    Count(i64),
    Percent(Option<Decimal>),
}

impl Cell {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    /// Amounts arrive as decimal strings in the JSON payload.
    pub fn amount(value: Option<&str>) -> Self {
        Self::Amount(value.and_then(|text| Decimal::from_str(text).ok()))
    }

    fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    fn render(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Amount(Some(value)) => format_amount(*value),
            Self::Count(value) => value.to_string(),
            Self::Percent(Some(value)) => format!("{:.1}%", value.round_dp(1)),
            Self::Amount(None) | Self::Percent(None) => "-".to_string(),
        }
    }
}

/// Plain text table for terminal output.
///
/// The widest text column is the only one that shrinks when the terminal is
/// narrow; long values in it are cut with an ellipsis. Amount and count
/// columns keep their full width.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
    footer: Option<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
            footer: None,
        }
    }

    pub fn push(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    /// Adds a footer that sums every amount and count column.
    pub fn with_total_row(mut self, label: &str) -> Self {
        let mut footer = (0..self.headers.len())
            .map(|index| self.column_total(index))
            .collect::<Vec<Cell>>();
        if let Some(first) = footer.first_mut()
            && matches!(first, Cell::Text(_))
        {
            *first = Cell::text(label);
        }
        self.footer = Some(footer);
        self
    }

    pub fn render(&self, max_width: usize) -> Vec<String> {
        let body = self
            .rows
            .iter()
            .chain(self.footer.iter())
            .map(|row| row.iter().map(Cell::render).collect::<Vec<String>>())
            .collect::<Vec<Vec<String>>>();
        let numeric = (0..self.headers.len())
            .map(|index| self.is_numeric_column(index))
            .collect::<Vec<bool>>();

        let mut widths = self
            .headers
            .iter()
            .map(|header| display_width(header))
            .collect::<Vec<usize>>();
        for row in &body {
            for (slot, value) in widths.iter_mut().zip(row) {
                *slot = (*slot).max(display_width(value));
            }
        }
        shrink_text_column(&mut widths, &numeric, max_width);

        let header_cells = self
            .headers
            .iter()
            .map(|header| header.to_string())
            .collect::<Vec<String>>();
        let mut lines = vec![join_cells(&header_cells, &widths, &numeric)];
        for (index, row) in body.iter().enumerate() {
            if self.footer.is_some() && index == self.rows.len() {
                lines.push(rule(&widths));
            }
            lines.push(join_cells(row, &widths, &numeric));
        }
        lines
    }

    fn is_numeric_column(&self, index: usize) -> bool {
        let mut cells = self.rows.iter().filter_map(|row| row.get(index)).peekable();
        cells.peek().is_some() && cells.all(Cell::is_numeric)
    }

    fn column_total(&self, index: usize) -> Cell {
        let mut amount = Decimal::ZERO;
        let mut count = 0_i64;
        let mut kind = None;
        for cell in self.rows.iter().filter_map(|row| row.get(index)) {
            match cell {
                Cell::Amount(value) => {
                    amount = amount.saturating_add(value.unwrap_or_default());
                    kind = Some("amount");
                }
                Cell::Count(value) => {
                    count = count.saturating_add(*value);
                    kind = Some("count");
                }
                _ => return Cell::Text(String::new()),
            }
        }
        match kind {
            Some("amount") => Cell::Amount(Some(amount)),
            Some(_) => Cell::Count(count),
            None => Cell::Text(String::new()),
        }
    }
}

/// `1234.5` renders as `1,234.50`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_WIDTH)
        .max(40)
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| display_width(label))
        .max()
        .unwrap_or(0);
    entries
        .iter()
        .map(|(label, value)| {
            format!(
                "{}{}{GAP}{value}",
                " ".repeat(indent),
                pad_right(label, label_width)
            )
        })
        .collect()
}

/// Width in chars, so accented merchant names line up with ASCII ones.
fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn shrink_text_column(widths: &mut [usize], numeric: &[bool], max_width: usize) {
    let used = INDENT.len()
        + widths.iter().sum::<usize>()
        + GAP.len() * widths.len().saturating_sub(1);
    if used <= max_width {
        return;
    }
    let widest_text = widths
        .iter()
        .enumerate()
        .filter(|(index, _)| !numeric.get(*index).copied().unwrap_or(false))
        .max_by_key(|(_, width)| **width)
        .map(|(index, _)| index);
    if let Some(index) = widest_text {
        let excess = used - max_width;
        widths[index] = widths[index].saturating_sub(excess).max(MIN_TEXT_WIDTH);
    }
}

fn join_cells(cells: &[String], widths: &[usize], numeric: &[bool]) -> String {
    let pieces = widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let value = cells.get(index).map(String::as_str).unwrap_or("");
            if numeric.get(index).copied().unwrap_or(false) {
                pad_left(value, *width)
            } else {
                pad_right(&truncate(value, *width), *width)
            }
        })
        .collect::<Vec<String>>();
    format!("{INDENT}{}", pieces.join(GAP)).trim_end().to_string()
}

fn rule(widths: &[usize]) -> String {
    let total = widths.iter().sum::<usize>() + GAP.len() * widths.len().saturating_sub(1);
    format!("{INDENT}{}", "-".repeat(total))
}

fn truncate(value: &str, width: usize) -> String {
    if display_width(value) <= width {
        return value.to_string();
    }
    let mut cut = value
        .chars()
        .take(width.saturating_sub(1))
        .collect::<String>();
    cut.push(ELLIPSIS);
    cut
}

fn pad_right(value: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(value));
    format!("{value}{}", " ".repeat(padding))
}

fn pad_left(value: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(value));
    format!("{}{value}", " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{Cell, Table, format_amount, key_value_rows};

    fn category_table() -> Table {
        let mut table = Table::new(&["Category", "Total", "Count"]);
        table.push(vec![
            Cell::text("Alimentação"),
            Cell::amount(Some("1234.5")),
            Cell::Count(3),
        ]);
        table.push(vec![
            Cell::text("Transporte"),
            Cell::amount(Some("23.50")),
            Cell::Count(1),
        ]);
        table
    }

    #[test]
    fn amounts_are_grouped_with_two_places() {
        assert_eq!(format_amount(dec!(1234.5)), "1,234.50");
        assert_eq!(format_amount(dec!(-450)), "-450.00");
        assert_eq!(format_amount(dec!(1000000)), "1,000,000.00");
        assert_eq!(format_amount(dec!(0.004)), "0.00");
        assert_eq!(format_amount(dec!(999.999)), "1,000.00");
    }

    #[test]
    fn numeric_columns_align_right_and_accents_pad_like_ascii() {
        let lines = category_table().render(80);
        assert_eq!(lines[0], "  Category        Total  Count");
        assert_eq!(lines[1], "  Alimentação  1,234.50      3");
        assert_eq!(lines[2], "  Transporte      23.50      1");
    }

    #[test]
    fn total_row_sums_amount_and_count_columns() {
        let lines = category_table().with_total_row("Total").render(80);
        assert_eq!(lines.len(), 5);
        assert!(lines[3].trim_start().starts_with("---"));
        assert_eq!(lines[4], "  Total        1,258.00      4");
    }

    #[test]
    fn unparseable_amounts_render_as_dash_and_count_as_zero() {
        let mut table = Table::new(&["Title", "Amount"]);
        table.push(vec![Cell::text("Posto"), Cell::amount(Some("abc"))]);
        table.push(vec![Cell::text("Padaria"), Cell::amount(Some("9.90"))]);
        let lines = table.with_total_row("Total").render(80);
        assert_eq!(lines[1], "  Posto         -");
        assert_eq!(lines[4], "  Total      9.90");
    }

    #[test]
    fn narrow_terminal_cuts_only_the_widest_text_column() {
        let mut table = Table::new(&["Date", "Title", "Amount"]);
        table.push(vec![
            Cell::text("2024-05-01"),
            Cell::text("MERCADO LIVRE PARCELA 03 DE 12 COMPRA ONLINE"),
            Cell::amount(Some("1234.56")),
        ]);
        let lines = table.render(40);
        assert!(lines[1].contains("2024-05-01"));
        assert!(lines[1].contains("1,234.56"));
        assert!(lines[1].contains('…'));
        assert_eq!(lines[1].chars().count(), 40);
    }

    #[test]
    fn key_value_rows_align_labels() {
        let rows = key_value_rows(
            &[
                ("Rows read:", "12".to_string()),
                ("Deduped:", "3".to_string()),
            ],
            2,
        );
        assert_eq!(rows[0], "  Rows read:  12");
        assert_eq!(rows[1], "  Deduped:    3");
    }
}
