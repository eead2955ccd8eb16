//! Database seeder for Tally development and testing.
//!
//! Seeds the default category catalog and a small demo group with a few
//! shared expenses, then logs the resulting balances and statistics.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tally_core::expense::{CreateExpenseInput, ExpenseFilter, ExpenseService};
use tally_core::split::SplitRequest;
use tally_db::entities::group_members;
use tally_db::{ExpenseStore, connect};
use tally_shared::AppConfig;
use tally_shared::types::{CategoryId, GroupId, ProfileId};

/// Demo group ID (consistent for all seeds)
const DEMO_GROUP_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0100);

/// Demo members, in display order.
const DEMO_MEMBERS: [Uuid; 3] = [
    Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001),
    Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002),
    Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0003),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug,seeder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let timezone = config.reporting.tz()?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let store = ExpenseStore::new(db.clone());
    let catalog = store.categories().ensure_defaults().await?;
    info!(count = catalog.len(), "Category catalog ready");

    seed_demo_members(&db).await?;

    let service = ExpenseService::new(Arc::new(store));
    let group_id = GroupId::from_uuid(DEMO_GROUP_ID);
    let [alice, bob, carol] = DEMO_MEMBERS.map(ProfileId::from_uuid);
    let members = vec![alice, bob, carol];

    let existing = service
        .list_expenses(alice, &ExpenseFilter::for_group(group_id))
        .await?;
    if existing.is_empty() {
        let now = Utc::now();
        let inputs = [
            CreateExpenseInput {
                description: "Groceries".to_string(),
                amount: dec!(90.00),
                category_id: Some(CategoryId::new("food")),
                expense_date: now - Duration::days(3),
                group_id: Some(group_id),
                paid_by: alice,
                involved: members.clone(),
                split: SplitRequest::Equal,
                notes: None,
            },
            CreateExpenseInput {
                description: "Train tickets".to_string(),
                amount: dec!(100.00),
                category_id: Some(CategoryId::new("transport")),
                expense_date: now - Duration::days(2),
                group_id: Some(group_id),
                paid_by: bob,
                involved: members.clone(),
                split: SplitRequest::Percentage {
                    own_percentage: dec!(50),
                },
                notes: Some("Weekend trip".to_string()),
            },
            CreateExpenseInput {
                description: "Electricity".to_string(),
                amount: dec!(10.00),
                category_id: Some(CategoryId::new("home")),
                expense_date: now - Duration::days(1),
                group_id: Some(group_id),
                paid_by: carol,
                involved: members.clone(),
                split: SplitRequest::Custom {
                    own_amount: dec!(4.00),
                },
                notes: None,
            },
        ];

        for input in inputs {
            let paid_by = input.paid_by;
            let expense = service.create_expense(paid_by, input).await?;
            info!(expense_id = %expense.id, description = %expense.description, "Seeded expense");
        }
    } else {
        info!(count = existing.len(), "Demo expenses already exist, skipping...");
    }

    let balances = service.group_balances(alice, group_id).await?;
    for entry in balances.unsettled() {
        info!(
            profile_id = %entry.profile_id,
            amount = %entry.amount,
            direction = ?entry.direction(),
            "Balance"
        );
    }

    let positions = service.group_positions(group_id).await?;
    if !positions.net_total().is_zero() {
        warn!(net_total = %positions.net_total(), "Group positions do not net to zero");
    }

    let stats = service
        .statistics(alice, &ExpenseFilter::default(), timezone)
        .await?;
    info!(
        total = %stats.total_amount,
        count = stats.expense_count,
        average = %stats.average_amount,
        "Statistics"
    );

    info!("Seeding complete!");
    Ok(())
}

/// Seeds the demo group membership, skipping members that already exist.
async fn seed_demo_members(db: &DatabaseConnection) -> anyhow::Result<()> {
    let existing: Vec<Uuid> = group_members::Entity::find()
        .filter(group_members::Column::GroupId.eq(DEMO_GROUP_ID))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.profile_id)
        .collect();

    let missing: Vec<group_members::ActiveModel> = DEMO_MEMBERS
        .into_iter()
        .filter(|profile_id| !existing.contains(profile_id))
        .map(|profile_id| group_members::ActiveModel {
            id: Set(Uuid::now_v7()),
            group_id: Set(DEMO_GROUP_ID),
            profile_id: Set(profile_id),
            joined_at: Set(Utc::now().into()),
        })
        .collect();

    if missing.is_empty() {
        info!("Demo group members already exist, skipping...");
        return Ok(());
    }

    let count = missing.len();
    group_members::Entity::insert_many(missing)
        .exec_without_returning(db)
        .await?;
    info!(count, "Seeded demo group members");
    Ok(())
}
