//! Group-buy campaign state machine: admission, threshold settlement,
//! organizer cancellation.
//!
//! A campaign leaves `Open` at most once, and only two edges exist:
//!
//! ```text
//! OPEN --[join brings count to min_members]--> SETTLED
//! OPEN --[organizer cancels]----------------> FAILED
//! ```
//!
//! There is no timer and no background task: the threshold-crossing join
//! runs settlement synchronously inside the same call, and nothing else
//! ever invokes it.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::CatalogEntry;
use crate::core_types::{GroupId, ProductId, UserId};
use crate::error::CoreError;
use crate::identity::Identity;
use crate::membership::Membership;

/// Campaign lifecycle status. Transitions out of `Open` happen exactly once
/// and are irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupStatus {
    Open,
    Settled,
    Failed,
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupStatus::Open => write!(f, "OPEN"),
            GroupStatus::Settled => write!(f, "SETTLED"),
            GroupStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Outcome of a successful join.
#[derive(Debug, Clone, Serialize)]
pub enum JoinResult {
    /// Below threshold; the group stays open.
    Pending { current_count: u32, remaining: u32 },
    /// This join reached the threshold and settled the group.
    Settled(SettlementReport),
}

impl JoinResult {
    #[inline]
    pub fn triggered_settlement(&self) -> bool {
        matches!(self, JoinResult::Settled(_))
    }
}

/// Per-buyer line of a settlement report, in join order.
#[derive(Debug, Clone, Serialize)]
pub struct BuyerLine {
    pub user_id: UserId,
    pub username: String,
    pub settled_price: Decimal,
}

/// One-time settlement summary produced by the threshold-crossing join.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    pub group_id: GroupId,
    pub product_id: ProductId,
    pub product_name: String,
    pub member_count: u32,
    pub price_per_person: Decimal,
    pub savings_per_person: Decimal,
    pub total_revenue: Decimal,
    pub total_savings: Decimal,
    pub closed_at: DateTime<Utc>,
    pub buyers: Vec<BuyerLine>,
}

/// One group-buy campaign.
///
/// # Invariants (enforced by private fields):
/// - `memberships` is never empty: the organizer joins at construction
/// - `memberships` is append-only and stays in join order
/// - at most one membership per user within this group
/// - all mutation goes through `join`/`cancel`, guarded by the status machine
///
/// The cross-group rule (one open membership per user per product) is the
/// registry's job: a group cannot see its siblings.
#[derive(Debug)]
pub struct GroupBuy {
    group_id: GroupId,
    product_id: ProductId,
    product_name: String,
    base_price: Decimal,
    discount_percent: u32,
    min_members: u32,
    memberships: Vec<Membership>,
    status: GroupStatus,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl GroupBuy {
    /// Open a campaign with the organizer as member 0.
    pub(crate) fn new(group_id: GroupId, entry: &CatalogEntry, organizer: &Identity) -> Self {
        Self {
            group_id,
            product_id: entry.product_id,
            product_name: entry.name.clone(),
            base_price: entry.base_price,
            discount_percent: entry.discount_percent,
            min_members: entry.min_members,
            memberships: vec![Membership::new(organizer)],
            status: GroupStatus::Open,
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    #[inline]
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    #[inline]
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    #[inline]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    #[inline]
    pub fn base_price(&self) -> Decimal {
        self.base_price
    }

    #[inline]
    pub fn discount_percent(&self) -> u32 {
        self.discount_percent
    }

    #[inline]
    pub fn min_members(&self) -> u32 {
        self.min_members
    }

    #[inline]
    pub fn status(&self) -> GroupStatus {
        self.status
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == GroupStatus::Open
    }

    #[inline]
    pub fn member_count(&self) -> u32 {
        self.memberships.len() as u32
    }

    /// Members still needed to reach the threshold (0 once reached).
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.min_members.saturating_sub(self.member_count())
    }

    /// Memberships in join order. Member 0 is the organizer.
    #[inline]
    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    #[inline]
    pub fn organizer_id(&self) -> UserId {
        self.memberships[0].user_id()
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.memberships.iter().any(|m| m.user_id() == user_id)
    }

    pub fn membership_of(&self, user_id: UserId) -> Option<&Membership> {
        self.memberships.iter().find(|m| m.user_id() == user_id)
    }

    /// Discounted per-person price: `base × (1 − discount/100)`, rounded to
    /// 2 decimal places half-up for currency display.
    pub fn price_per_person(&self) -> Decimal {
        (self.base_price * Decimal::from(100 - self.discount_percent) / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    // ========================================================================
    // Mutations (status-machine guarded)
    // ========================================================================

    /// Admit a buyer.
    ///
    /// # Errors
    /// - `InvalidState` unless the group is still OPEN
    /// - `DuplicateMembership` if the user already joined this group
    ///
    /// # Effects
    /// Appends a membership; if that brings the count to `min_members`,
    /// settles the whole group before returning.
    pub(crate) fn join(&mut self, identity: &Identity) -> Result<JoinResult, CoreError> {
        if self.status != GroupStatus::Open {
            return Err(CoreError::InvalidState {
                group_id: self.group_id,
                status: self.status,
            });
        }
        if self.contains(identity.user_id()) {
            return Err(CoreError::DuplicateMembership {
                user_id: identity.user_id(),
                group_id: self.group_id,
            });
        }

        self.memberships.push(Membership::new(identity));
        let current_count = self.member_count();

        if current_count >= self.min_members {
            let report = self.settle();
            info!(
                group_id = self.group_id,
                product = %self.product_name,
                members = report.member_count,
                revenue = %report.total_revenue,
                "group settled"
            );
            Ok(JoinResult::Settled(report))
        } else {
            debug!(
                group_id = self.group_id,
                user_id = identity.user_id(),
                current_count,
                remaining = self.remaining(),
                "member joined"
            );
            Ok(JoinResult::Pending {
                current_count,
                remaining: self.min_members - current_count,
            })
        }
    }

    /// Organizer cancellation: the only path to FAILED.
    ///
    /// # Errors
    /// - `InvalidState` unless the group is still OPEN
    /// - `NotOrganizer` unless `requested_by` is member 0
    pub(crate) fn cancel(&mut self, requested_by: UserId) -> Result<(), CoreError> {
        if self.status != GroupStatus::Open {
            return Err(CoreError::InvalidState {
                group_id: self.group_id,
                status: self.status,
            });
        }
        if requested_by != self.organizer_id() {
            return Err(CoreError::NotOrganizer {
                user_id: requested_by,
                group_id: self.group_id,
            });
        }

        self.status = GroupStatus::Failed;
        self.closed_at = Some(Utc::now());
        info!(
            group_id = self.group_id,
            product = %self.product_name,
            members = self.member_count(),
            "group cancelled by organizer"
        );
        Ok(())
    }

    /// Broadcast the final price over the fixed membership list and flip the
    /// status. Only reachable from the threshold-crossing `join`, so it can
    /// never run twice.
    fn settle(&mut self) -> SettlementReport {
        let price_per_person = self.price_per_person();
        let savings_per_person = self.base_price - price_per_person;
        let member_count = self.member_count();
        let total_revenue = price_per_person * Decimal::from(member_count);
        let total_savings = savings_per_person * Decimal::from(member_count);

        for membership in &mut self.memberships {
            membership.settle(price_per_person, savings_per_person);
        }

        self.status = GroupStatus::Settled;
        let closed_at = Utc::now();
        self.closed_at = Some(closed_at);

        SettlementReport {
            group_id: self.group_id,
            product_id: self.product_id,
            product_name: self.product_name.clone(),
            member_count,
            price_per_person,
            savings_per_person,
            total_revenue,
            total_savings,
            closed_at,
            buyers: self
                .memberships
                .iter()
                .map(|m| BuyerLine {
                    user_id: m.user_id(),
                    username: m.username().to_string(),
                    settled_price: price_per_person,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(user_id: UserId, name: &str) -> Identity {
        Identity::new(user_id, name.to_string(), "pass1234").unwrap()
    }

    fn entry(price_cents: i64, discount: u32, min: u32) -> CatalogEntry {
        CatalogEntry {
            product_id: 0,
            name: "Xiaomi Earbuds".to_string(),
            base_price: Decimal::new(price_cents, 2),
            discount_percent: discount,
            min_members: min,
            description: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn test_organizer_is_member_zero() {
        let alice = ident(0, "alice");
        let group = GroupBuy::new(0, &entry(150_00, 30, 3), &alice);

        assert_eq!(group.status(), GroupStatus::Open);
        assert_eq!(group.member_count(), 1);
        assert_eq!(group.organizer_id(), 0);
        assert_eq!(group.remaining(), 2);
        assert!(group.contains(0));
        assert!(group.closed_at().is_none());
    }

    #[test]
    fn test_threshold_boundary() {
        let mut group = GroupBuy::new(0, &entry(150_00, 30, 3), &ident(0, "alice"));

        // Second member: one short of the threshold, no settlement
        let res = group.join(&ident(1, "bob")).unwrap();
        assert!(!res.triggered_settlement());
        match res {
            JoinResult::Pending {
                current_count,
                remaining,
            } => {
                assert_eq!(current_count, 2);
                assert_eq!(remaining, 1);
            }
            JoinResult::Settled(_) => panic!("settled below threshold"),
        }
        assert!(group.is_open());

        // Third member crosses the threshold inside the same call
        let res = group.join(&ident(2, "carol")).unwrap();
        assert!(res.triggered_settlement());
        assert_eq!(group.status(), GroupStatus::Settled);
        assert!(group.closed_at().is_some());
    }

    #[test]
    fn test_settlement_arithmetic() {
        // base 150, discount 30%, min 3 => 105.00 / 45.00 / 315.00
        let mut group = GroupBuy::new(0, &entry(150_00, 30, 3), &ident(0, "alice"));
        group.join(&ident(1, "bob")).unwrap();

        let report = match group.join(&ident(2, "carol")).unwrap() {
            JoinResult::Settled(report) => report,
            JoinResult::Pending { .. } => panic!("threshold join must settle"),
        };

        assert_eq!(report.member_count, 3);
        assert_eq!(report.price_per_person, Decimal::new(105_00, 2));
        assert_eq!(report.savings_per_person, Decimal::new(45_00, 2));
        assert_eq!(report.total_revenue, Decimal::new(315_00, 2));
        assert_eq!(report.total_savings, Decimal::new(135_00, 2));

        // Broadcast: every membership carries the same settled values
        for m in group.memberships() {
            assert_eq!(m.settled_price(), Some(Decimal::new(105_00, 2)));
            assert_eq!(m.savings(), Some(Decimal::new(45_00, 2)));
        }

        // Buyer lines keep join order
        let names: Vec<&str> = report.buyers.iter().map(|b| b.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_midpoint_rounds_half_up() {
        // 10.01 at 50% => 5.005, which must display as 5.01
        let mut group = GroupBuy::new(0, &entry(10_01, 50, 2), &ident(0, "alice"));
        let report = match group.join(&ident(1, "bob")).unwrap() {
            JoinResult::Settled(report) => report,
            JoinResult::Pending { .. } => panic!("threshold join must settle"),
        };
        assert_eq!(report.price_per_person, Decimal::new(5_01, 2));
        assert_eq!(report.savings_per_person, Decimal::new(5_00, 2));
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let alice = ident(0, "alice");
        let mut group = GroupBuy::new(0, &entry(150_00, 30, 3), &alice);

        assert_eq!(
            group.join(&alice).unwrap_err(),
            CoreError::DuplicateMembership {
                user_id: 0,
                group_id: 0
            }
        );
        // Failed join leaves the group untouched
        assert_eq!(group.member_count(), 1);
    }

    #[test]
    fn test_join_after_settled_is_invalid_state() {
        let mut group = GroupBuy::new(7, &entry(150_00, 30, 2), &ident(0, "alice"));
        group.join(&ident(1, "bob")).unwrap();
        assert_eq!(group.status(), GroupStatus::Settled);

        // A brand-new user is refused
        assert_eq!(
            group.join(&ident(2, "carol")).unwrap_err(),
            CoreError::InvalidState {
                group_id: 7,
                status: GroupStatus::Settled
            }
        );
        // So is an existing member: the status guard runs first
        assert_eq!(
            group.join(&ident(1, "bob")).unwrap_err(),
            CoreError::InvalidState {
                group_id: 7,
                status: GroupStatus::Settled
            }
        );
        assert_eq!(group.member_count(), 2);
    }

    #[test]
    fn test_min_members_one_still_needs_a_join() {
        // Threshold is met at creation, but settlement only ever fires from
        // a join. The first join settles with two members.
        let mut group = GroupBuy::new(0, &entry(20_00, 25, 1), &ident(0, "alice"));
        assert!(group.is_open());

        let report = match group.join(&ident(1, "bob")).unwrap() {
            JoinResult::Settled(report) => report,
            JoinResult::Pending { .. } => panic!("count >= min_members must settle"),
        };
        assert_eq!(report.member_count, 2);
    }

    #[test]
    fn test_cancel_requires_organizer() {
        let mut group = GroupBuy::new(3, &entry(150_00, 30, 3), &ident(0, "alice"));
        group.join(&ident(1, "bob")).unwrap();

        assert_eq!(
            group.cancel(1).unwrap_err(),
            CoreError::NotOrganizer {
                user_id: 1,
                group_id: 3
            }
        );
        assert!(group.is_open());

        group.cancel(0).unwrap();
        assert_eq!(group.status(), GroupStatus::Failed);
        assert!(group.closed_at().is_some());
        // Memberships are history: they survive the cancellation, unsettled
        assert_eq!(group.member_count(), 2);
        assert!(group.memberships().iter().all(|m| !m.is_settled()));
    }

    #[test]
    fn test_cancelled_group_rejects_everything() {
        let mut group = GroupBuy::new(0, &entry(150_00, 30, 3), &ident(0, "alice"));
        group.cancel(0).unwrap();

        assert!(matches!(
            group.join(&ident(1, "bob")).unwrap_err(),
            CoreError::InvalidState {
                status: GroupStatus::Failed,
                ..
            }
        ));
        assert!(matches!(
            group.cancel(0).unwrap_err(),
            CoreError::InvalidState {
                status: GroupStatus::Failed,
                ..
            }
        ));
    }
}
