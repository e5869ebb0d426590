use anyhow::Error;
use chrono::NaiveDate;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::forms::DATE_FORMAT;
use crate::models::Person;

/// Placeholder for optional values that are not on file.
const MISSING: &str = "-";

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

pub(crate) fn optional_text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => MISSING.to_string(),
    }
}

pub(crate) fn format_birth_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Label/value rows for the detail pane.
pub(crate) fn person_detail_lines(person: &Person) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let rows = [
        ("Last name", person.last_name.clone()),
        ("First name", person.first_name.clone()),
        ("Nickname", person.nickname.clone()),
        ("Phone", optional_text(person.phone_number.as_deref())),
        ("Address", optional_text(person.address.as_deref())),
        ("Email", optional_text(person.email_address.as_deref())),
        ("Birth date", format_birth_date(person.birth_date)),
    ];

    rows.into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<11}"), label_style),
                Span::raw(value),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;
    use crate::db::StoreError;

    #[test]
    fn surface_error_prefers_the_root_cause() {
        let err = Err::<(), _>(StoreError::NotFound(7))
            .context("failed to delete contact")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Person 7 not found");
    }

    #[test]
    fn missing_values_render_as_placeholders() {
        assert_eq!(optional_text(None), "-");
        assert_eq!(optional_text(Some("  ")), "-");
        assert_eq!(optional_text(Some(" 0001 ")), "0001");
        assert_eq!(format_birth_date(None), "-");
        assert_eq!(
            format_birth_date(NaiveDate::from_ymd_opt(1980, 1, 11)),
            "1980-01-11"
        );
    }

    #[test]
    fn detail_pane_lists_every_field() {
        let person = Person::new("King", "Tom", "Tommy").with_address("101, main street");
        let lines = person_detail_lines(&person);
        assert_eq!(lines.len(), 7);
        let address: String = lines[4]
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(address, "Address    101, main street");
    }

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }
}
