//! Common test utilities
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use aggregate_store::{Aggregate, Config, DomainEvent, NEW_AGGREGATE_VERSION};

/// Setup test database - create the schema and truncate tables
pub async fn setup_test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("DATABASE_URL must be set for tests");

    let pool = config.connect().await.expect("Failed to connect to DB");

    aggregate_store::db::ensure_schema(&pool)
        .await
        .expect("Failed to create schema");

    // Clean up DB for fresh state
    sqlx::query("TRUNCATE TABLE events, snapshots, checkpoints")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

// =========================================================================
// Order fixture aggregate
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    OrderPlaced { order_id: Uuid, customer: String },
    ItemAdded { sku: String, quantity: i64 },
    OrderShipped {},
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced { .. } => "OrderPlaced",
            OrderEvent::ItemAdded { .. } => "ItemAdded",
            OrderEvent::OrderShipped { .. } => "OrderShipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: i64,
}

/// Order aggregate used across the integration suites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    id: Uuid,
    pub customer: String,
    pub lines: Vec<OrderLine>,
    pub shipped: bool,
    version: i64,
    #[serde(skip)]
    history: Vec<OrderEvent>,
}

impl Default for OrderAggregate {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            customer: String::new(),
            lines: Vec::new(),
            shipped: false,
            version: NEW_AGGREGATE_VERSION,
            history: Vec::new(),
        }
    }
}

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;

    const SCHEMA_VERSION: i32 = 1;

    fn aggregate_type() -> &'static str {
        "OrderAggregate"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    fn history(&self) -> &[OrderEvent] {
        &self.history
    }

    fn history_mut(&mut self) -> &mut Vec<OrderEvent> {
        &mut self.history
    }

    fn when(&mut self, event: &OrderEvent) {
        match event {
            OrderEvent::OrderPlaced { order_id, customer } => {
                self.id = *order_id;
                self.customer = customer.clone();
            }
            OrderEvent::ItemAdded { sku, quantity } => {
                self.lines.push(OrderLine {
                    sku: sku.clone(),
                    quantity: *quantity,
                });
            }
            OrderEvent::OrderShipped {} => {
                self.shipped = true;
            }
        }
    }
}

/// New order with the placement event already applied.
pub fn placed_order(order_id: Uuid, customer: &str) -> OrderAggregate {
    let mut order = OrderAggregate::default();
    order.apply(OrderEvent::OrderPlaced {
        order_id,
        customer: customer.to_string(),
    });
    order
}
