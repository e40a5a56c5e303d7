use tracing::info;

use crate::db::models::{Address, NewAddress};
use crate::db::operations::DbOperations;
use crate::db::users::user_id_exists;
use crate::error::AppError;
use crate::Result;

const ADDRESS_COLUMNS: &str = "id, user_id, country, city, street, house_number, created_at";

impl DbOperations {
    pub async fn list_addresses(&self) -> Result<Vec<Address>> {
        let mut conn = self.connection().await?;
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(addresses)
    }

    /// Addresses owned by `user_id`. Empty when the user has none or does
    /// not exist.
    pub async fn list_user_addresses(&self, user_id: i32) -> Result<Vec<Address>> {
        let mut conn = self.connection().await?;
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(addresses)
    }

    pub async fn create_address(&self, address: &NewAddress) -> Result<Address> {
        let mut transaction = self.begin_transaction().await?;

        let result: Result<Address> = async {
            if !user_id_exists(&mut transaction, address.user_id).await? {
                return Err(AppError::NotFound("User not found".to_string()));
            }

            let created = sqlx::query_as::<_, Address>(&format!(
                "INSERT INTO addresses (user_id, country, city, street, house_number) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {ADDRESS_COLUMNS}"
            ))
            .bind(address.user_id)
            .bind(&address.country)
            .bind(&address.city)
            .bind(&address.street)
            .bind(&address.house_number)
            .fetch_one(&mut *transaction)
            .await?;

            Ok(created)
        }
        .await;

        let created = Self::finish(transaction, result).await?;
        info!("Created address {} for user {}", created.id, created.user_id);
        Ok(created)
    }

    pub async fn delete_address(&self, id: i32) -> Result<()> {
        let mut transaction = self.begin_transaction().await?;

        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await
            .map_err(AppError::from)
            .and_then(|done| {
                if done.rows_affected() == 0 {
                    Err(AppError::NotFound("Address not found".to_string()))
                } else {
                    Ok(())
                }
            });

        Self::finish(transaction, result).await?;
        info!("Deleted address {}", id);
        Ok(())
    }
}
