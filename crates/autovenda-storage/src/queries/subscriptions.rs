// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription lifecycle operations.
//!
//! Status only moves forward through these functions: `lead` and
//! `pending_payment` rows can be re-planned, `active` rows are never touched
//! except by [`reset_subscription`].

use autovenda_core::AutovendaError;
use autovenda_core::types::{ActivationResult, Subscription, SubscriptionStatus};
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{map_tr_err, now_timestamp, Database};
use crate::queries::parse_column;

const COLUMNS: &str = "user_id, plan, monthly_price, status, provider_customer_id,
     provider_subscription_id, created_at, updated_at";

fn read_subscription(row: &Row<'_>) -> Result<Subscription, rusqlite::Error> {
    Ok(Subscription {
        user_id: row.get(0)?,
        plan: row.get(1)?,
        monthly_price: row.get(2)?,
        status: parse_column(row.get(3)?, 3)?,
        provider_customer_id: row.get(4)?,
        provider_subscription_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub async fn get_subscription(
    db: &Database,
    user_id: &str,
) -> Result<Option<Subscription>, AutovendaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = ?1"),
                params![user_id],
                read_subscription,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All subscription rows, most recently updated first.
pub async fn list_subscriptions(db: &Database) -> Result<Vec<Subscription>, AutovendaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM subscriptions ORDER BY updated_at DESC, user_id"
            ))?;
            let rows = stmt.query_map([], read_subscription)?;
            let subscriptions = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(subscriptions)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a `lead` row, or re-plan a row that is still `lead`.
pub async fn record_plan_interest(
    db: &Database,
    user_id: &str,
    plan: &str,
    monthly_price: f64,
) -> Result<usize, AutovendaError> {
    let user_id = user_id.to_string();
    let plan = plan.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO subscriptions (user_id, plan, monthly_price, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 'lead', ?4, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     plan = excluded.plan,
                     monthly_price = excluded.monthly_price,
                     updated_at = excluded.updated_at
                 WHERE subscriptions.status = 'lead'",
                params![user_id, plan, monthly_price, now],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Move a missing, `lead` or `pending_payment` row to `pending_payment`.
pub async fn mark_pending_payment(
    db: &Database,
    user_id: &str,
    plan: &str,
    monthly_price: f64,
) -> Result<usize, AutovendaError> {
    let user_id = user_id.to_string();
    let plan = plan.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO subscriptions (user_id, plan, monthly_price, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 'pending_payment', ?4, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     plan = excluded.plan,
                     monthly_price = excluded.monthly_price,
                     status = 'pending_payment',
                     updated_at = excluded.updated_at
                 WHERE subscriptions.status IN ('lead', 'pending_payment')",
                params![user_id, plan, monthly_price, now],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Conditionally move `pending_payment -> active` in one transaction.
///
/// The affected-row count decides `Activated`; otherwise the row is re-read
/// inside the same transaction to classify the no-op.
pub async fn activate_subscription(
    db: &Database,
    user_id: &str,
    provider_subscription_id: &str,
    provider_customer_id: Option<&str>,
) -> Result<ActivationResult, AutovendaError> {
    let user_id = user_id.to_string();
    let subscription_id = provider_subscription_id.to_string();
    let customer_id = provider_customer_id.map(str::to_string);
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE subscriptions SET
                     status = 'active',
                     provider_subscription_id = ?2,
                     provider_customer_id = COALESCE(?3, provider_customer_id),
                     updated_at = ?4
                 WHERE user_id = ?1 AND status = 'pending_payment'",
                params![user_id, subscription_id, customer_id, now],
            )?;

            let result = if updated == 1 {
                ActivationResult::Activated
            } else {
                let status: Option<String> = tx
                    .query_row(
                        "SELECT status FROM subscriptions WHERE user_id = ?1",
                        params![user_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                match status {
                    None => ActivationResult::NotFound,
                    Some(raw) => {
                        let status: SubscriptionStatus = parse_column(raw, 0)?;
                        if status == SubscriptionStatus::Active {
                            ActivationResult::AlreadyActive
                        } else {
                            ActivationResult::NotPending(status)
                        }
                    }
                }
            };
            tx.commit()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// Administrative reset to `lead`, clearing provider references.
pub async fn reset_subscription(db: &Database, user_id: &str) -> Result<usize, AutovendaError> {
    let user_id = user_id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE subscriptions SET
                     status = 'lead',
                     provider_customer_id = NULL,
                     provider_subscription_id = NULL,
                     updated_at = ?2
                 WHERE user_id = ?1",
                params![user_id, now],
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn interest_creates_lead_and_replans_only_leads() {
        let (db, _dir) = setup().await;
        assert_eq!(record_plan_interest(&db, "u1", "flash", 159.99).await.unwrap(), 1);
        assert_eq!(
            record_plan_interest(&db, "u1", "secretaria_virtual", 559.99).await.unwrap(),
            1
        );

        let sub = get_subscription(&db, "u1").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Lead);
        assert_eq!(sub.plan.as_deref(), Some("secretaria_virtual"));

        mark_pending_payment(&db, "u1", "flash", 159.99).await.unwrap();
        assert_eq!(
            record_plan_interest(&db, "u1", "ecossistema_completo", 1499.99).await.unwrap(),
            0
        );
        let sub = get_subscription(&db, "u1").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PendingPayment);
        assert_eq!(sub.plan.as_deref(), Some("flash"));
    }

    #[tokio::test]
    async fn activation_is_idempotent() {
        let (db, _dir) = setup().await;
        mark_pending_payment(&db, "u1", "flash", 159.99).await.unwrap();

        let first = activate_subscription(&db, "u1", "sub_1", Some("cus_1")).await.unwrap();
        let second = activate_subscription(&db, "u1", "sub_1", Some("cus_1")).await.unwrap();
        assert_eq!(first, ActivationResult::Activated);
        assert_eq!(second, ActivationResult::AlreadyActive);

        let sub = get_subscription(&db, "u1").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.provider_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(sub.provider_customer_id.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn activation_classifies_no_ops() {
        let (db, _dir) = setup().await;
        assert_eq!(
            activate_subscription(&db, "ghost", "sub_1", None).await.unwrap(),
            ActivationResult::NotFound
        );

        record_plan_interest(&db, "u1", "flash", 159.99).await.unwrap();
        assert_eq!(
            activate_subscription(&db, "u1", "sub_1", None).await.unwrap(),
            ActivationResult::NotPending(SubscriptionStatus::Lead)
        );
        // No row was fabricated for the unknown user.
        assert!(get_subscription(&db, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pending_never_overwrites_active() {
        let (db, _dir) = setup().await;
        mark_pending_payment(&db, "u1", "flash", 159.99).await.unwrap();
        activate_subscription(&db, "u1", "sub_1", None).await.unwrap();

        assert_eq!(mark_pending_payment(&db, "u1", "ecossistema_completo", 1499.99).await.unwrap(), 0);
        let sub = get_subscription(&db, "u1").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.plan.as_deref(), Some("flash"));
    }

    #[tokio::test]
    async fn reset_returns_to_lead() {
        let (db, _dir) = setup().await;
        mark_pending_payment(&db, "u1", "flash", 159.99).await.unwrap();
        activate_subscription(&db, "u1", "sub_1", Some("cus_1")).await.unwrap();

        assert_eq!(reset_subscription(&db, "u1").await.unwrap(), 1);
        assert_eq!(reset_subscription(&db, "nobody").await.unwrap(), 0);

        let sub = get_subscription(&db, "u1").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Lead);
        assert!(sub.provider_subscription_id.is_none());
        assert_eq!(list_subscriptions(&db).await.unwrap().len(), 1);
    }
}
