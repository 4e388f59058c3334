use sqlx::Executor;

use crate::repositories::RepositoryError;
use crate::DbPool;

/// Canonical seed contract for the demo dataset. The verify step checks the
/// loaded rows against these constants so drift between the SQL fixture and
/// the code shows up in tests, not in production replies.
const SEED_ORDERS: &[SeedOrderContract] = &[
    SeedOrderContract {
        order_id: "ORD100000",
        restaurant: "Domino's Pizza",
        total: 450,
        status: "delivered",
        description: "delivered order with delivery time recorded",
    },
    SeedOrderContract {
        order_id: "ORD100001",
        restaurant: "Biryani Blues",
        total: 320,
        status: "preparing",
        description: "order still in the kitchen with an expected window",
    },
    SeedOrderContract {
        order_id: "ORD100002",
        restaurant: "Burger King",
        total: 280,
        status: "out_for_delivery",
        description: "order on the road with partner contact details",
    },
];

const SEED_RESTAURANT_IDS: &[&str] =
    &["rest-001", "rest-002", "rest-003", "rest-004", "rest-005", "rest-006"];

/// Deterministic demo dataset for local runs and end-to-end tests.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// SQL fixture content for the demo dataset.
    pub const SQL: &'static str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Load the demo dataset. Safe to call repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let orders_seeded = SEED_ORDERS
            .iter()
            .map(|order| SeedOrderInfo {
                order_id: order.order_id,
                status: order.status,
                description: order.description,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { restaurants_seeded: SEED_RESTAURANT_IDS.len(), orders_seeded })
    }

    /// Verify the loaded rows against the in-code contract.
    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, RepositoryError> {
        let mut checks = Vec::new();

        let restaurant_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM restaurant WHERE id IN {}",
            sql_array_from_ids(SEED_RESTAURANT_IDS)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("restaurants", restaurant_count == SEED_RESTAURANT_IDS.len() as i64));

        let menu_coverage: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT restaurant_id) FROM menu_item WHERE restaurant_id IN (SELECT id FROM restaurant)",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("menu-coverage", menu_coverage == SEED_RESTAURANT_IDS.len() as i64));

        for order in SEED_ORDERS {
            let matches: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM customer_order WHERE id = ?1 AND restaurant_name = ?2 AND total = ?3 AND status = ?4)",
            )
            .bind(order.order_id)
            .bind(order.restaurant)
            .bind(order.total)
            .bind(order.status)
            .fetch_one(pool)
            .await?;
            checks.push((order.order_id, matches == 1));
        }

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(SeedVerification { all_present, checks })
    }

    /// Remove the seeded fixtures from a test database.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let order_ids: Vec<&str> = SEED_ORDERS.iter().map(|order| order.order_id).collect();
        sqlx::query(&format!(
            "DELETE FROM customer_order WHERE id IN {}",
            sql_array_from_ids(&order_ids)
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE FROM menu_item WHERE restaurant_id IN {}",
            sql_array_from_ids(SEED_RESTAURANT_IDS)
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE FROM restaurant WHERE id IN {}",
            sql_array_from_ids(SEED_RESTAURANT_IDS)
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedOrderContract {
    order_id: &'static str,
    restaurant: &'static str,
    total: i64,
    status: &'static str,
    description: &'static str,
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{id}'")).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub restaurants_seeded: usize,
    pub orders_seeded: Vec<SeedOrderInfo>,
}

#[derive(Debug)]
pub struct SeedOrderInfo {
    pub order_id: &'static str,
    pub status: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct SeedVerification {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use super::DemoSeedDataset;
    use crate::{connect_with_settings, migrations};

    #[test]
    fn sql_fixture_is_not_empty() {
        assert!(!DemoSeedDataset::SQL.is_empty());
    }

    #[tokio::test]
    async fn load_verify_and_idempotency() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect to test database");
        migrations::run_pending(&pool).await.expect("run migrations");

        let first = DemoSeedDataset::load(&pool).await.expect("load seed fixtures");
        assert_eq!(first.restaurants_seeded, 6);
        assert_eq!(first.orders_seeded.len(), 3);

        let verification = DemoSeedDataset::verify(&pool).await.expect("verify seed fixtures");
        assert!(verification.all_present, "failed checks: {:?}", verification.checks);

        // A second load must not duplicate rows.
        DemoSeedDataset::load(&pool).await.expect("reload seed fixtures");
        let restaurant_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM restaurant").fetch_one(&pool).await.expect("count");
        assert_eq!(restaurant_count, 6);

        let menu_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM menu_item").fetch_one(&pool).await.expect("count");
        assert_eq!(menu_count, 14);

        pool.close().await;
    }

    #[tokio::test]
    async fn clean_removes_seeded_rows() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect to test database");
        migrations::run_pending(&pool).await.expect("run migrations");

        DemoSeedDataset::load(&pool).await.expect("load seed fixtures");
        DemoSeedDataset::clean(&pool).await.expect("clean seed fixtures");

        let order_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM customer_order").fetch_one(&pool).await.expect("count");
        assert_eq!(order_count, 0);

        pool.close().await;
    }
}
