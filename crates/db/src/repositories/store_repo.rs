//! Repository for the points store: products, redemptions, point grants.

use onboard_core::error::CoreError;
use onboard_core::store::{apply_point_adjustment, check_redemption};
use onboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::store::{
    CreateProduct, PointAdjustment, Redemption, StoreProduct, StoreTransaction, UpdateProduct,
};

const PRODUCT_COLUMNS: &str =
    "id, name, description, image_url, point_cost, stock, is_active, created_at, updated_at";

const TRANSACTION_COLUMNS: &str =
    "id, user_id, product_id, product_name, points_spent, created_at";

const ADJUSTMENT_COLUMNS: &str = "id, user_id, delta, reason, adjusted_by, created_at";

/// Outcome of a redemption attempt.
#[derive(Debug)]
pub enum RedeemOutcome {
    Redeemed(Redemption),
    /// Balance, stock or availability refused the redemption.
    Rejected(CoreError),
    ProductNotFound,
    UserNotFound,
}

/// Outcome of an owner point adjustment.
#[derive(Debug)]
pub enum AdjustOutcome {
    /// The recorded adjustment and the user's new balance.
    Adjusted(PointAdjustment, i32),
    Rejected(CoreError),
    UserNotFound,
}

pub struct StoreRepo;

impl StoreRepo {
    // -----------------------------------------------------------------------
    // Products
    // -----------------------------------------------------------------------

    pub async fn create_product(
        pool: &PgPool,
        input: &CreateProduct,
    ) -> Result<StoreProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO store_products (name, description, image_url, point_cost, stock, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, StoreProduct>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(input.point_cost)
            .bind(input.stock)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_product(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<StoreProduct>, sqlx::Error> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM store_products WHERE id = $1");
        sqlx::query_as::<_, StoreProduct>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Products in the catalog, cheapest first. Inactive ones only when asked.
    pub async fn list_products(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<StoreProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM store_products
             WHERE is_active OR $1
             ORDER BY point_cost, name"
        );
        sqlx::query_as::<_, StoreProduct>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn update_product(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<StoreProduct>, sqlx::Error> {
        let query = format!(
            "UPDATE store_products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                point_cost = COALESCE($5, point_cost),
                stock = COALESCE($6, stock),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, StoreProduct>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(input.point_cost)
            .bind(input.stock)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product. Past transactions keep the product name.
    pub async fn delete_product(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM store_products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Redemption
    // -----------------------------------------------------------------------

    /// Redeem one unit of `product_id` for `user_id`.
    ///
    /// Product and user rows are locked (product first) so the balance and
    /// stock checks hold until the decrements commit.
    pub async fn redeem(
        pool: &PgPool,
        user_id: DbId,
        product_id: DbId,
    ) -> Result<RedeemOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {PRODUCT_COLUMNS} FROM store_products WHERE id = $1 FOR UPDATE");
        let Some(product) = sqlx::query_as::<_, StoreProduct>(&query)
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(RedeemOutcome::ProductNotFound);
        };

        let points: Option<i32> =
            sqlx::query_scalar("SELECT points FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(points) = points else {
            tx.rollback().await?;
            return Ok(RedeemOutcome::UserNotFound);
        };

        if let Err(rejection) =
            check_redemption(points, product.point_cost, product.stock, product.is_active)
        {
            tx.rollback().await?;
            return Ok(RedeemOutcome::Rejected(rejection));
        }

        let remaining_points: i32 = sqlx::query_scalar(
            "UPDATE users SET points = points - $2 WHERE id = $1 RETURNING points",
        )
        .bind(user_id)
        .bind(product.point_cost)
        .fetch_one(&mut *tx)
        .await?;

        let remaining_stock: i32 = sqlx::query_scalar(
            "UPDATE store_products SET stock = stock - 1 WHERE id = $1 RETURNING stock",
        )
        .bind(product.id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO store_transactions (user_id, product_id, product_name, points_spent)
             VALUES ($1, $2, $3, $4)
             RETURNING {TRANSACTION_COLUMNS}"
        );
        let transaction = sqlx::query_as::<_, StoreTransaction>(&query)
            .bind(user_id)
            .bind(product.id)
            .bind(&product.name)
            .bind(product.point_cost)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RedeemOutcome::Redeemed(Redemption {
            transaction,
            remaining_points,
            remaining_stock,
        }))
    }

    /// A user's redemptions, newest first.
    pub async fn list_transactions_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<StoreTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM store_transactions
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, StoreTransaction>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every redemption, newest first.
    pub async fn list_transactions(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoreTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM store_transactions
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, StoreTransaction>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Point adjustments
    // -----------------------------------------------------------------------

    /// Grant or deduct points, recording who did it and why.
    pub async fn adjust_points(
        pool: &PgPool,
        user_id: DbId,
        delta: i32,
        reason: &str,
        adjusted_by: DbId,
    ) -> Result<AdjustOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let points: Option<i32> =
            sqlx::query_scalar("SELECT points FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(points) = points else {
            tx.rollback().await?;
            return Ok(AdjustOutcome::UserNotFound);
        };

        let balance = match apply_point_adjustment(points, delta) {
            Ok(balance) => balance,
            Err(rejection) => {
                tx.rollback().await?;
                return Ok(AdjustOutcome::Rejected(rejection));
            }
        };

        sqlx::query("UPDATE users SET points = $2 WHERE id = $1")
            .bind(user_id)
            .bind(balance)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO point_adjustments (user_id, delta, reason, adjusted_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {ADJUSTMENT_COLUMNS}"
        );
        let adjustment = sqlx::query_as::<_, PointAdjustment>(&query)
            .bind(user_id)
            .bind(delta)
            .bind(reason.trim())
            .bind(adjusted_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AdjustOutcome::Adjusted(adjustment, balance))
    }

    /// Adjustments applied to a user, newest first.
    pub async fn list_adjustments_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PointAdjustment>, sqlx::Error> {
        let query = format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM point_adjustments
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PointAdjustment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
