use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::info;

use crate::db::models::{NewUser, User, UserLookup, UserSearch};
use crate::db::operations::{map_user_write_error, DbOperations};
use crate::error::AppError;
use crate::Result;

const USER_COLUMNS: &str = "id, username, email, full_name, created_at";

impl DbOperations {
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let mut conn = self.connection().await?;
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }

    pub async fn get_user(&self, id: i32) -> Result<User> {
        let mut conn = self.connection().await?;
        fetch_user_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>> {
        let mut conn = self.connection().await?;
        match lookup {
            UserLookup::Id(id) => fetch_user_by_id(&mut conn, *id).await,
            UserLookup::Username(username) => {
                let user = sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
                ))
                .bind(username)
                .fetch_optional(&mut *conn)
                .await?;
                Ok(user)
            }
        }
    }

    pub async fn search_users(&self, filters: &UserSearch) -> Result<Vec<User>> {
        let mut conn = self.connection().await?;
        let mut query = search_query(filters);
        let users = query
            .build_query_as::<User>()
            .fetch_all(&mut *conn)
            .await?;

        Ok(users)
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut transaction = self.begin_transaction().await?;

        let result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, full_name) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .fetch_one(&mut *transaction)
        .await
        .map_err(map_user_write_error);

        let created = Self::finish(transaction, result).await?;
        info!("Created user {} ({})", created.id, created.username);
        Ok(created)
    }

    /// Replace every editable field of user `id`.
    pub async fn update_user(&self, id: i32, user: &NewUser) -> Result<User> {
        let mut transaction = self.begin_transaction().await?;

        let result = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $1, email = $2, full_name = $3 WHERE id = $4 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(map_user_write_error)
        .and_then(|row| row.ok_or_else(|| AppError::NotFound("User not found".to_string())));

        let updated = Self::finish(transaction, result).await?;
        info!("Updated user {}", updated.id);
        Ok(updated)
    }

    /// Delete user `id`. The store removes the user's addresses with it.
    pub async fn delete_user(&self, id: i32) -> Result<()> {
        let mut transaction = self.begin_transaction().await?;

        let result: Result<()> = async {
            if fetch_user_by_id(&mut transaction, id).await?.is_none() {
                return Err(AppError::NotFound("User not found".to_string()));
            }
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&mut *transaction)
                .await?;
            Ok(())
        }
        .await;

        Self::finish(transaction, result).await?;
        info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn user_exists(&self, id: i32) -> Result<bool> {
        let mut conn = self.connection().await?;
        Ok(user_id_exists(&mut conn, id).await?)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&mut *conn)
                .await?;

        Ok(exists)
    }
}

async fn fetch_user_by_id(conn: &mut PgConnection, id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

pub(crate) async fn user_id_exists(conn: &mut PgConnection, id: i32) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(conn)
        .await
}

/// `SELECT` for the given filters: each non-empty filter adds a
/// case-insensitive substring match, joined with `AND`.
pub(crate) fn search_query(filters: &UserSearch) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
    let mut has_condition = false;

    for (column, value) in [
        ("username", &filters.username),
        ("email", &filters.email),
        ("full_name", &filters.full_name),
    ] {
        let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
            continue;
        };
        query.push(if has_condition { " AND " } else { " WHERE " });
        query
            .push(column)
            .push(" ILIKE ")
            .push_bind(format!("%{}%", escape_like(value)));
        has_condition = true;
    }

    query.push(" ORDER BY id");
    query
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
