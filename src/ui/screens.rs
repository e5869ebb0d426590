use chrono::{Datelike, NaiveDate};

use crate::models::Person;

/// Summary shown on the home view.
pub(crate) struct HomeScreen {
    pub(crate) contact_count: usize,
    pub(crate) next_birthday: Option<(String, NaiveDate)>,
}

impl HomeScreen {
    pub(crate) fn new(persons: &[Person], today: NaiveDate) -> Self {
        Self {
            contact_count: persons.len(),
            next_birthday: next_birthday(persons, today)
                .map(|(person, date)| (person.display_name(), date)),
        }
    }
}

/// The contact whose birthday comes up first on or after `today`, with the
/// date it falls on. Feb 29 birthdays are celebrated on Mar 1 in common years.
pub(crate) fn next_birthday(persons: &[Person], today: NaiveDate) -> Option<(&Person, NaiveDate)> {
    persons
        .iter()
        .filter_map(|person| {
            let born = person.birth_date?;
            let this_year = anniversary(born, today.year())?;
            let upcoming = if this_year >= today {
                this_year
            } else {
                anniversary(born, today.year() + 1)?
            };
            Some((person, upcoming))
        })
        .min_by_key(|(_, date)| *date)
}

fn anniversary(born: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, born.month(), born.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Contact list plus the active search filter.
pub(crate) struct PersonListScreen {
    pub(crate) persons: Vec<Person>,
    pub(crate) filtered: Vec<Person>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl PersonListScreen {
    pub(crate) fn new(persons: Vec<Person>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            persons,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn apply_filter(&mut self) {
        self.filtered = match &self.filter {
            Some(query) => self
                .persons
                .iter()
                .filter(|person| person.matches(query))
                .cloned()
                .collect(),
            None => self.persons.clone(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.filter(|query| !query.trim().is_empty());
        self.apply_filter();
    }

    /// Replace the backing list after a store round-trip, keeping the
    /// selection on `focus_id` when it is still visible.
    pub(crate) fn set_persons(&mut self, persons: Vec<Person>, focus_id: Option<i64>) {
        self.persons = persons;
        self.apply_filter();
        if let Some(id) = focus_id {
            self.focus(id);
        }
    }

    pub(crate) fn focus(&mut self, id: i64) -> bool {
        match self
            .filtered
            .iter()
            .position(|person| person.id == Some(id))
        {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub(crate) fn current_person(&self) -> Option<&Person> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let last = self.filtered.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }
}
