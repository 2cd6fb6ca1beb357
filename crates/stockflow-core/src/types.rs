//! # Domain Types
//!
//! Core domain types used throughout Stockflow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Location     │   │     Product     │   │ InventoryRecord │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  location_id ┐  │       │
//! │  │  store_id       │   │  name, unit     │   │  product_id  ┘  │       │
//! │  │  kind           │   │  cost_price     │   │  quantity ≥ 0   │       │
//! │  │  (Warehouse |   │   │  sale_price     │   │  min_stock      │       │
//! │  │   SalesArea)    │   │                 │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  LedgerRecord (append-only, never updated)                              │
//! │  ├── Inflow    warehouse ◄── Company | Store | Return                  │
//! │  ├── Outflow   warehouse ──► StoreTransfer | Voucher | Sale | ...      │
//! │  ├── Movement  sales area ──► Return(warehouse) | Transfer(sales area) │
//! │  ├── Sale      sales area, pay method                                  │
//! │  └── Withdraw  sales area, amount only                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Every ledger record freezes `cost_amount` and `sale_amount` at commit
//! time. Later price edits on [`Product`] never rewrite history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Locations
// =============================================================================

/// The two kinds of stock-holding location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Back-office stock; receives inflows, issues outflows.
    Warehouse,
    /// Shop floor; sells, and moves stock back or sideways.
    SalesArea,
}

impl LocationKind {
    /// Storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Warehouse => "warehouse",
            LocationKind::SalesArea => "sales_area",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKind::Warehouse => f.write_str("warehouse"),
            LocationKind::SalesArea => f.write_str("sales area"),
        }
    }
}

/// A store owning warehouses and sales areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub name: String,
}

/// A warehouse or sales area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Location {
    pub id: String,
    pub store_id: String,
    pub kind: LocationKind,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product with its current reference prices.
///
/// Prices are mutable and not versioned; ledger records copy the computed
/// amounts at commit time instead of pointing back here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit of measure ("unit", "kg", "box of 12", ...).
    pub unit: String,
    pub cost_price: Money,
    pub sale_price: Money,
}

impl Product {
    /// Convenience constructor with prices in cents.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        cost_cents: i64,
        sale_cents: i64,
    ) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            cost_price: Money::from_cents(cost_cents),
            sale_price: Money::from_cents(sale_cents),
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock of one product at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryRecord {
    pub location_id: String,
    pub product_id: String,
    /// Never negative.
    pub quantity: i64,
    /// Low-stock threshold.
    pub min_stock: i64,
}

impl InventoryRecord {
    /// Quantity at or below the threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

/// In-stock line for product pickers (inventory joined with product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLine {
    pub location_id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub cost_price: Money,
    pub sale_price: Money,
}

// =============================================================================
// Pay Method
// =============================================================================

/// How a sale was paid.
///
/// Only [`PayMethod::Cash`] sales fund the drawer and so count toward
/// available cash for withdrawals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PayMethod {
    Cash,
    Transfer,
    Card,
}

impl PayMethod {
    /// Storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PayMethod::Cash => "cash",
            PayMethod::Transfer => "transfer",
            PayMethod::Card => "card",
        }
    }

    /// Parses the storage representation.
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PayMethod::Cash),
            "transfer" => Some(PayMethod::Transfer),
            "card" => Some(PayMethod::Card),
            _ => None,
        }
    }
}

// =============================================================================
// Polymorphic sources and destinations
// =============================================================================

/// Where inflowing warehouse stock came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InflowSource {
    /// Purchase from an external provider company.
    Company { provider: String },
    /// Shipment from another store.
    Store { store_id: String },
    /// Stock returned from a sales area. Set by the engine for DEVOLUCION
    /// movements, where `movement_id` links the originating movement.
    Return {
        sales_area_id: String,
        movement_id: Option<String>,
    },
}

impl InflowSource {
    /// Discriminant stored in `source_kind`.
    pub fn kind_str(&self) -> &'static str {
        match self {
            InflowSource::Company { .. } => "company",
            InflowSource::Store { .. } => "store",
            InflowSource::Return { .. } => "return",
        }
    }

    /// Value stored in `source_ref`.
    pub fn reference(&self) -> &str {
        match self {
            InflowSource::Company { provider } => provider,
            InflowSource::Store { store_id } => store_id,
            InflowSource::Return { sales_area_id, .. } => sales_area_id,
        }
    }

    /// Value stored in `source_movement_id`.
    pub fn movement_id(&self) -> Option<&str> {
        match self {
            InflowSource::Return { movement_id, .. } => movement_id.as_deref(),
            _ => None,
        }
    }

    /// Rebuilds the source from its storage columns.
    pub fn from_parts(kind: &str, reference: String, movement_id: Option<String>) -> Option<Self> {
        match kind {
            "company" => Some(InflowSource::Company {
                provider: reference,
            }),
            "store" => Some(InflowSource::Store {
                store_id: reference,
            }),
            "return" => Some(InflowSource::Return {
                sales_area_id: reference,
                movement_id,
            }),
            _ => None,
        }
    }
}

/// Where outflowing warehouse stock went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutflowDestination {
    /// Shipped to another store; that store records its own inflow.
    StoreTransfer { store_id: String },
    /// Voucher ("VALE") to a sales area of this engine; stock moves there.
    Voucher { sales_area_id: String },
    /// Sold straight from the warehouse.
    Sale { pay_method: PayMethod },
    /// Returned to the provider.
    Return,
    /// Written off as damaged.
    Damage,
}

impl OutflowDestination {
    /// Discriminant stored in `destination_kind`.
    pub fn kind_str(&self) -> &'static str {
        match self {
            OutflowDestination::StoreTransfer { .. } => "store_transfer",
            OutflowDestination::Voucher { .. } => "voucher",
            OutflowDestination::Sale { .. } => "sale",
            OutflowDestination::Return => "return",
            OutflowDestination::Damage => "damage",
        }
    }

    /// Value stored in `destination_ref`.
    pub fn reference(&self) -> Option<&str> {
        match self {
            OutflowDestination::StoreTransfer { store_id } => Some(store_id),
            OutflowDestination::Voucher { sales_area_id } => Some(sales_area_id),
            _ => None,
        }
    }

    /// Pay method, only present for warehouse sales.
    pub fn pay_method(&self) -> Option<PayMethod> {
        match self {
            OutflowDestination::Sale { pay_method } => Some(*pay_method),
            _ => None,
        }
    }

    /// Rebuilds the destination from its storage columns.
    pub fn from_parts(
        kind: &str,
        reference: Option<String>,
        pay_method: Option<PayMethod>,
    ) -> Option<Self> {
        match (kind, reference, pay_method) {
            ("store_transfer", Some(store_id), _) => {
                Some(OutflowDestination::StoreTransfer { store_id })
            }
            ("voucher", Some(sales_area_id), _) => {
                Some(OutflowDestination::Voucher { sales_area_id })
            }
            ("sale", _, Some(pay_method)) => Some(OutflowDestination::Sale { pay_method }),
            ("return", _, _) => Some(OutflowDestination::Return),
            ("damage", _, _) => Some(OutflowDestination::Damage),
            _ => None,
        }
    }
}

/// What a sales-area movement does with the stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementKind {
    /// "DEVOLUCION": back to a warehouse. Also writes a synthetic inflow there.
    Return { warehouse_id: String },
    /// "TRASLADO": sideways to another sales area.
    Transfer { sales_area_id: String },
}

impl MovementKind {
    /// Discriminant stored in `kind`.
    pub fn kind_str(&self) -> &'static str {
        match self {
            MovementKind::Return { .. } => "return",
            MovementKind::Transfer { .. } => "transfer",
        }
    }

    /// Location receiving the stock.
    pub fn destination_id(&self) -> &str {
        match self {
            MovementKind::Return { warehouse_id } => warehouse_id,
            MovementKind::Transfer { sales_area_id } => sales_area_id,
        }
    }

    /// Kind the destination location must have.
    pub fn destination_kind(&self) -> LocationKind {
        match self {
            MovementKind::Return { .. } => LocationKind::Warehouse,
            MovementKind::Transfer { .. } => LocationKind::SalesArea,
        }
    }

    /// Rebuilds the kind from its storage columns.
    pub fn from_parts(kind: &str, destination_id: String) -> Option<Self> {
        match kind {
            "return" => Some(MovementKind::Return {
                warehouse_id: destination_id,
            }),
            "transfer" => Some(MovementKind::Transfer {
                sales_area_id: destination_id,
            }),
            _ => None,
        }
    }
}

// =============================================================================
// Ledger records
// =============================================================================

/// Stock received into a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InflowRecord {
    pub id: String,
    pub batch_id: String,
    pub warehouse_id: String,
    pub product_id: String,
    pub source: InflowSource,
    pub quantity: i64,
    pub cost_amount: Money,
    pub sale_amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Stock leaving a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutflowRecord {
    pub id: String,
    pub batch_id: String,
    pub warehouse_id: String,
    pub product_id: String,
    pub destination: OutflowDestination,
    pub quantity: i64,
    pub cost_amount: Money,
    pub sale_amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Stock leaving a sales area for a warehouse or another sales area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementRecord {
    pub id: String,
    pub batch_id: String,
    pub sales_area_id: String,
    pub product_id: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub cost_amount: Money,
    pub sale_amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Stock sold from a sales area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    pub batch_id: String,
    pub sales_area_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub cost_amount: Money,
    pub sale_amount: Money,
    pub pay_method: PayMethod,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Cash taken out of a sales area's drawer. No product dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WithdrawRecord {
    pub id: String,
    pub batch_id: String,
    pub sales_area_id: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerRecord {
    Inflow(InflowRecord),
    Outflow(OutflowRecord),
    Movement(MovementRecord),
    Sale(SaleRecord),
    Withdraw(WithdrawRecord),
}

impl LedgerRecord {
    /// Which ledger the record belongs to.
    pub fn kind(&self) -> LedgerKind {
        match self {
            LedgerRecord::Inflow(_) => LedgerKind::Inflow,
            LedgerRecord::Outflow(_) => LedgerKind::Outflow,
            LedgerRecord::Movement(_) => LedgerKind::Movement,
            LedgerRecord::Sale(_) => LedgerKind::Sale,
            LedgerRecord::Withdraw(_) => LedgerKind::Withdraw,
        }
    }

    /// Record id.
    pub fn id(&self) -> &str {
        match self {
            LedgerRecord::Inflow(r) => &r.id,
            LedgerRecord::Outflow(r) => &r.id,
            LedgerRecord::Movement(r) => &r.id,
            LedgerRecord::Sale(r) => &r.id,
            LedgerRecord::Withdraw(r) => &r.id,
        }
    }
}

// =============================================================================
// Ledger batches
// =============================================================================

/// The operation a committed batch performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Inflow,
    Outflow,
    Movement,
    Sale,
    Withdraw,
}

/// Header of one committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerBatch {
    pub id: String,
    pub kind: LedgerKind,
    pub user_id: String,
    pub row_count: i64,
    #[ts(as = "String")]
    pub committed_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
