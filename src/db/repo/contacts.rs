//! Contact operations for the repository.
//!
//! Every read and write except [`Repository::list_all_contacts`] and
//! [`Repository::upcoming_birthdays`] is scoped to the owning user.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Repository;
use crate::domain::{upcoming_birthday_window, Contact, ContactFields, UserId};

fn contact_from_row(row: &SqliteRow) -> Contact {
    Contact {
        id: row.get("id"),
        user_id: UserId::new(row.get("user_id")),
        firstname: row.get("firstname"),
        lastname: row.get("lastname"),
        email: row.get("email"),
        phone: row.get("phone"),
        birthday: row.get::<NaiveDate, _>("birthday"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

/// Unicode-aware, case-insensitive substring match on the searchable columns.
/// `needle` must already be lowercased.
fn contact_matches(contact: &Contact, needle: &str) -> bool {
    [&contact.firstname, &contact.lastname, &contact.email]
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
}

impl Repository {
    /// Page of contacts owned by `owner`, in storage order.
    pub async fn list_contacts(
        &self,
        owner: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            FROM contacts
            WHERE user_id = ?
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner.as_i64())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(contact_from_row).collect())
    }

    /// Page of contacts across all owners.
    ///
    /// Callers must check the requester's role first.
    pub async fn list_all_contacts(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            FROM contacts
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(contact_from_row).collect())
    }

    pub async fn get_contact(
        &self,
        id: i64,
        owner: UserId,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            FROM contacts
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(owner.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(contact_from_row))
    }

    /// Insert a contact for `owner` and return the stored row.
    pub async fn create_contact(
        &self,
        fields: &ContactFields,
        owner: UserId,
    ) -> Result<Contact, sqlx::Error> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO contacts (firstname, lastname, email, phone, birthday, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            "#,
        )
        .bind(&fields.firstname)
        .bind(&fields.lastname)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.birthday)
        .bind(owner.as_i64())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact_from_row(&row))
    }

    /// Overwrite all five mutable fields of an owned contact.
    ///
    /// Returns `None` if no contact with that id belongs to `owner`.
    pub async fn update_contact(
        &self,
        id: i64,
        fields: &ContactFields,
        owner: UserId,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            UPDATE contacts
            SET firstname = ?, lastname = ?, email = ?, phone = ?, birthday = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            "#,
        )
        .bind(&fields.firstname)
        .bind(&fields.lastname)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.birthday)
        .bind(Utc::now())
        .bind(id)
        .bind(owner.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(contact_from_row))
    }

    /// Delete an owned contact and return what was removed.
    pub async fn delete_contact(
        &self,
        id: i64,
        owner: UserId,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            DELETE FROM contacts
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(contact_from_row))
    }

    /// Case-insensitive substring search over first name, last name and email.
    ///
    /// Matching happens after the owner's rows are loaded, so `query` is taken
    /// literally and case folding covers non-ASCII letters too.
    pub async fn search_contacts(
        &self,
        query: &str,
        owner: UserId,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let needle = query.to_lowercase();

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            FROM contacts
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(owner.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(contact_from_row)
            .filter(|contact| contact_matches(contact, &needle))
            .collect())
    }

    /// Contacts of every owner whose birthday date lies in `[today, today + 7]`.
    pub async fn upcoming_birthdays(&self, today: NaiveDate) -> Result<Vec<Contact>, sqlx::Error> {
        let (start, end) = upcoming_birthday_window(today);

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, firstname, lastname, email, phone, birthday, created_at, updated_at
            FROM contacts
            WHERE birthday >= ? AND birthday <= ?
            ORDER BY birthday ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(contact_from_row).collect())
    }
}
