//! Domain model that mirrors the `person` table and gets passed throughout the
//! TUI. A `Person` is a plain, disconnected copy of a row: mutating it does
//! nothing to storage until it goes back through the `db` layer.

use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One contact. Equality compares every field, the identifier included, so a
/// freshly built record never equals its persisted copy.
pub struct Person {
    /// Primary key from the database. `None` until the store inserts the row.
    pub id: Option<i64>,
    pub last_name: String,
    pub first_name: String,
    pub nickname: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub email_address: Option<String>,
    /// Calendar date only. The store never keeps a time of day around.
    pub birth_date: Option<NaiveDate>,
}

impl Person {
    /// Build an unsaved contact from the three required fields.
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            nickname: nickname.into(),
            phone_number: None,
            address: None,
            email_address: None,
            birth_date: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_email_address(mut self, email_address: impl Into<String>) -> Self {
        self.email_address = Some(email_address.into());
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// `First Last (nickname)`, dropping the parenthesis when the nickname is
    /// blank. Lists and confirmation dialogs all rely on this formatting.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim().to_string();
        if self.nickname.trim().is_empty() {
            name
        } else {
            format!("{name} ({})", self.nickname.trim())
        }
    }

    /// `mailto:` URI for the contact, if an address is on file.
    pub fn mailto_link(&self) -> Option<String> {
        self.email_address
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| format!("mailto:{email}"))
    }

    /// Case-insensitive match against names, nickname, phone and email. An
    /// empty query matches everyone.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(self.last_name.as_str()),
            Some(self.first_name.as_str()),
            Some(self.nickname.as_str()),
            self.phone_number.as_deref(),
            self.email_address.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&needle))
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
