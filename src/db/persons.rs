use chrono::{DateTime, Local, NaiveDate};
use log::{debug, info};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::StoreError;
use crate::models::Person;

const SELECT_COLUMNS: &str = "SELECT idperson, lastname, firstname, nickname, phone_number,
        address, email_address, birth_date
     FROM person";

/// Every contact in storage order.
pub fn list_persons(conn: &Connection) -> Result<Vec<Person>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY idperson"))?;

    let persons = stmt
        .query_map([], person_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    debug!("listed {} persons", persons.len());

    Ok(persons)
}

/// Fetch one contact by id. A missing row is `StoreError::NotFound`.
pub fn get_person(conn: &Connection, id: i64) -> Result<Person, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE idperson = ?1"))?;

    stmt.query_row([id], person_from_row)
        .optional()?
        .ok_or(StoreError::NotFound(id))
}

/// Insert an unsaved contact and hand back a copy carrying the generated id.
pub fn add_person(conn: &Connection, person: &Person) -> Result<Person, StoreError> {
    if let Some(id) = person.id {
        return Err(StoreError::AlreadyPersisted(id));
    }
    check_required(person)?;

    conn.execute(
        "INSERT INTO person (lastname, firstname, nickname, phone_number, address,
            email_address, birth_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            person.last_name,
            person.first_name,
            person.nickname,
            person.phone_number,
            person.address,
            person.email_address,
            person.birth_date,
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!("added person {id}");
    Ok(Person {
        id: Some(id),
        ..person.clone()
    })
}

/// Overwrite every column of the row matching `person.id`.
pub fn update_person(conn: &Connection, person: &Person) -> Result<(), StoreError> {
    let id = person.id.ok_or(StoreError::MissingId)?;
    check_required(person)?;

    let updated = conn.execute(
        "UPDATE person
         SET lastname = ?1, firstname = ?2, nickname = ?3, phone_number = ?4,
             address = ?5, email_address = ?6, birth_date = ?7
         WHERE idperson = ?8",
        params![
            person.last_name,
            person.first_name,
            person.nickname,
            person.phone_number,
            person.address,
            person.email_address,
            person.birth_date,
            id,
        ],
    )?;

    if updated == 0 {
        Err(StoreError::NotFound(id))
    } else {
        info!("updated person {id}");
        Ok(())
    }
}

/// Remove a contact. Deleting an id that is not stored is `NotFound`.
pub fn delete_person(conn: &Connection, id: i64) -> Result<(), StoreError> {
    let deleted = conn.execute("DELETE FROM person WHERE idperson = ?1", params![id])?;

    if deleted == 0 {
        Err(StoreError::NotFound(id))
    } else {
        info!("deleted person {id}");
        Ok(())
    }
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    let birth_date: StoredDate = row.get(7)?;
    Ok(Person {
        id: Some(row.get(0)?),
        last_name: row.get(1)?,
        first_name: row.get(2)?,
        nickname: row.get(3)?,
        phone_number: row.get(4)?,
        address: row.get(5)?,
        email_address: row.get(6)?,
        birth_date: birth_date.0,
    })
}

/// NOT NULL only guards against SQL nulls, so blank strings are rejected
/// here before they reach the table.
fn check_required(person: &Person) -> Result<(), StoreError> {
    for (column, value) in [
        ("lastname", &person.last_name),
        ("firstname", &person.first_name),
        ("nickname", &person.nickname),
    ] {
        if value.trim().is_empty() {
            return Err(StoreError::MissingField(column));
        }
    }
    Ok(())
}

/// Column adapter for `birth_date`. New rows hold `YYYY-MM-DD` text, but
/// older files carry either a full timestamp string or epoch milliseconds of
/// local midnight, which are read back in the local time zone.
struct StoredDate(Option<NaiveDate>);

impl FromSql for StoredDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(StoredDate(None)),
            ValueRef::Text(_) => {
                parse_date_text(value.as_str()?).map(|date| StoredDate(Some(date)))
            }
            ValueRef::Integer(millis) => DateTime::from_timestamp_millis(millis)
                .map(|instant| StoredDate(Some(instant.with_timezone(&Local).date_naive())))
                .ok_or(FromSqlError::OutOfRange(millis)),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// Keep only the calendar part of `1980-01-01` or `1980-01-01 08:00:00.000`.
fn parse_date_text(text: &str) -> FromSqlResult<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|err| FromSqlError::Other(Box::new(err)))
}
