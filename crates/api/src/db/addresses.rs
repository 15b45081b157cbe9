//! Address repository for database operations.
//!
//! Every mutating query is scoped to `(address_id, owner)` so a caller can
//! never touch another user's records; a miss on either half of the key
//! looks identical to the record not existing.

use sqlx::PgPool;

use threadline_core::{AddressId, AddressKind, Phone, Pincode, UserId};

use super::RepositoryError;
use crate::models::Address;

const ADDRESS_COLUMNS: &str = "id, user_id, kind, full_name, street, city, state, pincode, \
                               phone, is_default, created_at, updated_at";

/// Validated fields for creating or replacing an address.
#[derive(Debug)]
pub struct AddressFields {
    pub kind: AddressKind,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub phone: Phone,
    pub is_default: bool,
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first, then most recently updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 \
             ORDER BY is_default DESC, updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// Get an address only if it belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// Insert a new address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the same user already has an
    /// address with all fields identical, `RepositoryError::Database` for
    /// other failures.
    pub async fn create(
        &self,
        user_id: UserId,
        fields: AddressFields,
    ) -> Result<Address, RepositoryError> {
        let duplicate = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM addresses \
             WHERE user_id = $1 AND kind = $2 AND full_name = $3 AND street = $4 \
               AND city = $5 AND state = $6 AND pincode = $7 AND phone = $8",
        )
        .bind(user_id)
        .bind(fields.kind)
        .bind(&fields.full_name)
        .bind(&fields.street)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.pincode)
        .bind(&fields.phone)
        .fetch_optional(self.pool)
        .await?;

        if duplicate.is_some() {
            return Err(RepositoryError::Conflict(
                "This address already exists.".to_owned(),
            ));
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO addresses (user_id, kind, full_name, street, city, state, pincode, phone, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(fields.kind)
        .bind(fields.full_name)
        .bind(fields.street)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.pincode)
        .bind(fields.phone)
        .bind(fields.is_default)
        .fetch_one(self.pool)
        .await?;
        Ok(address)
    }

    /// Replace an address's fields. Returns `None` if the address does not
    /// exist or is not owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        fields: AddressFields,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses SET kind = $3, full_name = $4, street = $5, city = $6, \
                state = $7, pincode = $8, phone = $9, is_default = $10, updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(fields.kind)
        .bind(fields.full_name)
        .bind(fields.street)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.pincode)
        .bind(fields.phone)
        .bind(fields.is_default)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// Delete an address scoped to its owner. Returns `false` on a miss.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
