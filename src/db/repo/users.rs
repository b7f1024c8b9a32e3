//! Account operations for the repository.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

use super::Repository;
use crate::domain::{NewUser, Role, User, UserId};

fn user_from_row(row: &SqliteRow) -> User {
    let id: i64 = row.get("id");
    let role_str: String = row.get("role");
    let role = Role::from_str(&role_str).unwrap_or_else(|e| {
        warn!(user_id = id, error = %e, "Unknown role stored for user, using default");
        Role::default()
    });

    User {
        id: UserId::new(id),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

impl Repository {
    /// Insert a new account with the default role.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including unique violations on
    /// the schema's identifying column.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, username, email, password_hash, role, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(Role::default().as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(&row))
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE email = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE username = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Change a user's role. Returns false if the user does not exist.
    pub async fn set_user_role(&self, id: UserId, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::migrations::Schema;
    use crate::db::repo::test_support::setup_test_db;
    use crate::domain::{NewUser, Role, UserId};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let (repo, _temp) = setup_test_db(Schema::Contacts).await;

        let created = repo
            .create_user(&new_user("alice", "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(created.role, Role::User);

        let by_id = repo.get_user(created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);

        let by_email = repo
            .get_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);

        let by_name = repo.get_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let (repo, _temp) = setup_test_db(Schema::Contacts).await;
        assert!(repo.get_user(UserId::new(99)).await.unwrap().is_none());
        assert!(repo.get_user_by_email("x@y.z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_contacts_schema_rejects_duplicate_email() {
        let (repo, _temp) = setup_test_db(Schema::Contacts).await;
        repo.create_user(&new_user("a", "same@example.com"))
            .await
            .unwrap();
        assert!(repo
            .create_user(&new_user("b", "same@example.com"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_quotes_schema_rejects_duplicate_username() {
        let (repo, _temp) = setup_test_db(Schema::Quotes).await;
        repo.create_user(&new_user("same", "a@example.com"))
            .await
            .unwrap();
        assert!(repo
            .create_user(&new_user("same", "b@example.com"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_set_user_role() {
        let (repo, _temp) = setup_test_db(Schema::Contacts).await;
        let user = repo
            .create_user(&new_user("mod", "mod@example.com"))
            .await
            .unwrap();

        assert!(repo.set_user_role(user.id, Role::Moderator).await.unwrap());
        let reloaded = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, Role::Moderator);

        assert!(!repo
            .set_user_role(UserId::new(404), Role::Admin)
            .await
            .unwrap());
    }
}
