//! Core identifier types used throughout the engine.
//!
//! Plain aliases with semantic meaning. All three are assigned contiguously
//! from zero by their owning collection, so they double as indexes.

/// User ID - unique per registered identity, immutable after assignment.
///
/// # Usage:
/// - Membership key inside every group-buy
/// - Index into the registry's identity table
pub type UserId = u64;

/// Group ID - unique per campaign, assigned in creation order.
///
/// Index into the registry's group table; iteration order over groups is
/// therefore creation order.
pub type GroupId = u64;

/// Product ID - stable opaque identifier for a catalog entry.
///
/// All membership-uniqueness rules key on this, never on the display name,
/// so renamed or duplicate display names cannot collide.
pub type ProductId = u32;
