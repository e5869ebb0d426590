use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Person;

/// Date format accepted by the birth date field.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields of the person form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum PersonField {
    #[default]
    LastName,
    FirstName,
    Nickname,
    PhoneNumber,
    Address,
    EmailAddress,
    BirthDate,
}

impl PersonField {
    pub(crate) const ALL: [PersonField; 7] = [
        PersonField::LastName,
        PersonField::FirstName,
        PersonField::Nickname,
        PersonField::PhoneNumber,
        PersonField::Address,
        PersonField::EmailAddress,
        PersonField::BirthDate,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            PersonField::LastName => "Last name",
            PersonField::FirstName => "First name",
            PersonField::Nickname => "Nickname",
            PersonField::PhoneNumber => "Phone",
            PersonField::Address => "Address",
            PersonField::EmailAddress => "Email",
            PersonField::BirthDate => "Birth date",
        }
    }

    /// Column widths from the `person` table. SQLite does not enforce them,
    /// so the form does.
    pub(crate) fn max_len(self) -> usize {
        match self {
            PersonField::LastName | PersonField::FirstName | PersonField::Nickname => 45,
            PersonField::PhoneNumber => 15,
            PersonField::Address => 200,
            PersonField::EmailAddress => 150,
            PersonField::BirthDate => 10,
        }
    }

    pub(crate) fn is_required(self) -> bool {
        matches!(
            self,
            PersonField::LastName | PersonField::FirstName | PersonField::Nickname
        )
    }

    /// Row offset of the field inside the form body.
    pub(crate) fn row(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }

    fn accepts(self, ch: char) -> bool {
        match self {
            PersonField::PhoneNumber => {
                ch.is_ascii_digit() || matches!(ch, ' ' | '+' | '-' | '(' | ')' | '.')
            }
            PersonField::BirthDate => ch.is_ascii_digit() || ch == '-',
            PersonField::EmailAddress => !ch.is_whitespace() && !ch.is_control(),
            _ => !ch.is_control(),
        }
    }
}

/// Form state for creating or editing a contact.
#[derive(Default, Clone)]
pub(crate) struct PersonForm {
    pub(crate) last_name: String,
    pub(crate) first_name: String,
    pub(crate) nickname: String,
    pub(crate) phone_number: String,
    pub(crate) address: String,
    pub(crate) email_address: String,
    pub(crate) birth_date: String,
    pub(crate) active: PersonField,
    pub(crate) error: Option<String>,
}

impl PersonForm {
    /// Populate the form from an existing contact when editing.
    pub(crate) fn from_person(person: &Person) -> Self {
        Self {
            last_name: person.last_name.clone(),
            first_name: person.first_name.clone(),
            nickname: person.nickname.clone(),
            phone_number: person.phone_number.clone().unwrap_or_default(),
            address: person.address.clone().unwrap_or_default(),
            email_address: person.email_address.clone().unwrap_or_default(),
            birth_date: person
                .birth_date
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            active: PersonField::LastName,
            error: None,
        }
    }

    pub(crate) fn value(&self, field: PersonField) -> &str {
        match field {
            PersonField::LastName => &self.last_name,
            PersonField::FirstName => &self.first_name,
            PersonField::Nickname => &self.nickname,
            PersonField::PhoneNumber => &self.phone_number,
            PersonField::Address => &self.address,
            PersonField::EmailAddress => &self.email_address,
            PersonField::BirthDate => &self.birth_date,
        }
    }

    fn value_mut(&mut self, field: PersonField) -> &mut String {
        match field {
            PersonField::LastName => &mut self.last_name,
            PersonField::FirstName => &mut self.first_name,
            PersonField::Nickname => &mut self.nickname,
            PersonField::PhoneNumber => &mut self.phone_number,
            PersonField::Address => &mut self.address,
            PersonField::EmailAddress => &mut self.email_address,
            PersonField::BirthDate => &mut self.birth_date,
        }
    }

    /// Move focus to the next field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        let idx = (self.active.row() + 1) % PersonField::ALL.len();
        self.active = PersonField::ALL[idx];
    }

    /// Move focus to the previous field, wrapping around.
    pub(crate) fn previous_field(&mut self) {
        let len = PersonField::ALL.len();
        let idx = (self.active.row() + len - 1) % len;
        self.active = PersonField::ALL[idx];
    }

    /// Append a character to the active field if it is allowed there and the
    /// column still has room.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        if !field.accepts(ch) || self.value_len(field) >= field.max_len() {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Validate the inputs and build the record to persist. `id` is `None` for
    /// new contacts.
    pub(crate) fn parse_inputs(&self, id: Option<i64>) -> Result<Person> {
        for field in PersonField::ALL {
            if field.is_required() && self.value(field).trim().is_empty() {
                return Err(anyhow!("{} is required.", field.label()));
            }
        }

        let email_address = optional(&self.email_address);
        if let Some(email) = &email_address {
            if !email.contains('@') {
                return Err(anyhow!("Email must contain '@'."));
            }
        }

        let birth_date = match optional(&self.birth_date) {
            Some(raw) => Some(parse_birth_date(&raw)?),
            None => None,
        };

        Ok(Person {
            id,
            last_name: self.last_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            nickname: self.nickname.trim().to_string(),
            phone_number: optional(&self.phone_number),
            address: optional(&self.address),
            email_address,
            birth_date,
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: PersonField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let placeholder = match field {
            PersonField::BirthDate => "<YYYY-MM-DD>",
            _ if field.is_required() => "<required>",
            _ => "<optional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: PersonField) -> usize {
        self.value(field).chars().count()
    }
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_birth_date(raw: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| anyhow!("Birth date must look like YYYY-MM-DD."))?;
    if date > Local::now().date_naive() {
        return Err(anyhow!("Birth date cannot be in the future."));
    }
    Ok(date)
}

/// Pending delete, shown as a yes/no dialog.
#[derive(Clone)]
pub(crate) struct ConfirmPersonDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl ConfirmPersonDelete {
    /// Build the confirmation state from the contact being considered. Unsaved
    /// records have nothing to delete.
    pub(crate) fn from_person(person: &Person) -> Option<Self> {
        Some(Self {
            id: person.id?,
            name: person.display_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut PersonForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    fn filled_form() -> PersonForm {
        let mut form = PersonForm::default();
        type_text(&mut form, "King");
        form.next_field();
        type_text(&mut form, "Tom");
        form.next_field();
        type_text(&mut form, "Tommy");
        form
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut form = PersonForm::default();
        form.previous_field();
        assert_eq!(form.active, PersonField::BirthDate);
        form.next_field();
        assert_eq!(form.active, PersonField::LastName);
    }

    #[test]
    fn required_fields_are_enforced_in_order() {
        let form = PersonForm::default();
        let err = form.parse_inputs(None).unwrap_err();
        assert_eq!(err.to_string(), "Last name is required.");
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut form = filled_form();
        form.active = PersonField::Address;
        type_text(&mut form, "   ");

        let person = form.parse_inputs(None).unwrap();
        assert_eq!(person, Person::new("King", "Tom", "Tommy"));
    }

    #[test]
    fn phone_and_date_fields_filter_characters() {
        let mut form = PersonForm {
            active: PersonField::PhoneNumber,
            ..PersonForm::default()
        };
        assert!(form.push_char('0'));
        assert!(!form.push_char('x'));
        form.active = PersonField::BirthDate;
        assert!(!form.push_char('/'));
        assert_eq!(form.phone_number, "0");
    }

    #[test]
    fn column_widths_cap_input() {
        let mut form = PersonForm {
            active: PersonField::PhoneNumber,
            ..PersonForm::default()
        };
        type_text(&mut form, "01234567890123456789");
        assert_eq!(form.value_len(PersonField::PhoneNumber), 15);
    }

    #[test]
    fn birth_date_must_parse_and_not_be_in_the_future() {
        let mut form = filled_form();
        form.birth_date = "1980-13-01".to_string();
        assert!(form.parse_inputs(None).is_err());

        form.birth_date = "2999-01-01".to_string();
        let err = form.parse_inputs(None).unwrap_err();
        assert_eq!(err.to_string(), "Birth date cannot be in the future.");

        form.birth_date = "1980-01-01".to_string();
        let person = form.parse_inputs(Some(1)).unwrap();
        assert_eq!(person.id, Some(1));
        assert_eq!(
            person.birth_date,
            NaiveDate::from_ymd_opt(1980, 1, 1)
        );
    }

    #[test]
    fn email_needs_an_at_sign() {
        let mut form = filled_form();
        form.email_address = "tommy.cool.co".to_string();
        assert!(form.parse_inputs(None).is_err());
        form.email_address = "tommy@cool.co".to_string();
        assert!(form.parse_inputs(None).is_ok());
    }

    #[test]
    fn editing_round_trips_an_existing_person() {
        let person = Person::new("King", "Tom", "Tommy")
            .with_id(1)
            .with_phone_number("0001")
            .with_address("101, main street")
            .with_email_address("tommy@cool.co")
            .with_birth_date(NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
        let form = PersonForm::from_person(&person);
        assert_eq!(form.birth_date, "1980-01-01");
        assert_eq!(form.parse_inputs(person.id).unwrap(), person);
    }

    #[test]
    fn unsaved_people_cannot_be_deleted() {
        assert!(ConfirmPersonDelete::from_person(&Person::new("a", "b", "c")).is_none());
        let confirm =
            ConfirmPersonDelete::from_person(&Person::new("King", "Tom", "Tommy").with_id(3))
                .unwrap();
        assert_eq!(confirm.id, 3);
        assert_eq!(confirm.name, "Tom King (Tommy)");
    }
}
