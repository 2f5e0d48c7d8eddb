//! dealpool - Group-Buy Coordination Engine
//!
//! Multiple independent buyers pledge toward a shared product discount that
//! activates once a minimum participant threshold is reached. The engine
//! owns the whole lifecycle: admission rules, the threshold-triggered
//! settlement, and the one-open-membership-per-product-per-user constraint.
//! Rendering is somebody else's problem: callers drive the [`registry`] and
//! display whatever comes back.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier aliases (UserId, GroupId, ProductId)
//! - [`error`] - Crate-wide error values
//! - [`catalog`] - Static product list with pricing terms
//! - [`identity`] - Registered users and credential checks
//! - [`membership`] - One buyer's participation record
//! - [`groupbuy`] - Campaign state machine and settlement
//! - [`ledger`] - Seller revenue and outcome aggregates
//! - [`registry`] - Owner of all state; the public operational surface
//! - [`config`] / [`logging`] - Runtime configuration and tracing setup

// Identifier aliases first; everything else depends on them
pub mod core_types;

pub mod catalog;
pub mod config;
pub mod error;
pub mod groupbuy;
pub mod identity;
pub mod ledger;
pub mod logging;
pub mod membership;
pub mod registry;

// Convenient re-exports at crate root
pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use core_types::{GroupId, ProductId, UserId};
pub use error::CoreError;
pub use groupbuy::{BuyerLine, GroupBuy, GroupStatus, JoinResult, SettlementReport};
pub use identity::Identity;
pub use ledger::{Ledger, LedgerView};
pub use membership::Membership;
pub use registry::Registry;
