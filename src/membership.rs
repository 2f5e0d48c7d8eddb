//! One buyer's participation record within a campaign.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core_types::UserId;
use crate::identity::Identity;

/// A membership is created at join time with settlement fields unset and
/// written exactly once, when the group settles. It is history: never
/// removed, never rewritten.
///
/// The username is copied out of the identity at join time; identities are
/// immutable, so the copy cannot go stale.
#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    user_id: UserId,
    username: String,
    joined_at: DateTime<Utc>,
    settled_price: Option<Decimal>,
    savings: Option<Decimal>,
}

impl Membership {
    pub(crate) fn new(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id(),
            username: identity.username().to_string(),
            joined_at: Utc::now(),
            settled_price: None,
            savings: None,
        }
    }

    #[inline]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Final per-person price, set at settlement.
    #[inline]
    pub fn settled_price(&self) -> Option<Decimal> {
        self.settled_price
    }

    /// Per-person savings against the base price, set at settlement.
    #[inline]
    pub fn savings(&self) -> Option<Decimal> {
        self.savings
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.settled_price.is_some()
    }

    /// Settlement broadcast target. The group's status machine guarantees
    /// this runs at most once per membership.
    pub(crate) fn settle(&mut self, price: Decimal, savings: Decimal) {
        debug_assert!(self.settled_price.is_none(), "membership settled twice");
        self.settled_price = Some(price);
        self.savings = Some(savings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_fields_start_unset() {
        let alice = Identity::new(7, "alice".to_string(), "hunter22").unwrap();
        let mut m = Membership::new(&alice);

        assert_eq!(m.user_id(), 7);
        assert_eq!(m.username(), "alice");
        assert!(!m.is_settled());
        assert_eq!(m.settled_price(), None);
        assert_eq!(m.savings(), None);

        m.settle(Decimal::new(10500, 2), Decimal::new(4500, 2));
        assert!(m.is_settled());
        assert_eq!(m.settled_price(), Some(Decimal::new(10500, 2)));
        assert_eq!(m.savings(), Some(Decimal::new(4500, 2)));
    }
}
