//! Contacts owned by a user.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::validation::{FieldRule, FormSchema};
use crate::domain::UserId;

/// Length of the upcoming-birthday window in days, counted after today.
pub const UPCOMING_BIRTHDAY_DAYS: i64 = 7;

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: i64,
    #[serde(skip)]
    pub user_id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The five mutable fields of a contact, as submitted on create and update.
///
/// Every field is mandatory: an update always rewrites all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
}

impl FormSchema for ContactFields {
    const RULES: &'static [FieldRule] = &[
        FieldRule::text("firstname").required().max_len(50),
        FieldRule::text("lastname").required().max_len(50),
        FieldRule::email("email").required().max_len(100),
        FieldRule::text("phone").required().max_len(20),
    ];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "firstname" => Some(&self.firstname),
            "lastname" => Some(&self.lastname),
            "email" => Some(&self.email),
            "phone" => Some(&self.phone),
            _ => None,
        }
    }
}

/// Inclusive `[today, today + 7 days]` range used by the birthday search.
pub fn upcoming_birthday_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(UPCOMING_BIRTHDAY_DAYS))
}
