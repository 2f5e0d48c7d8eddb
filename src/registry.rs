//! Registry: the single owner of identities, campaigns, catalog, and ledger.
//!
//! Everything runs on one logical thread of control, so each operation here
//! is one atomic step from the caller's perspective. A multi-user port must
//! put a mutual-exclusion boundary around `join_group`: its
//! read-check-then-append is not atomic once real concurrency exists.
//!
//! The registry is an explicit owned value, never ambient state. Tests
//! construct a fresh one each; the presentation layer holds exactly one.

use rustc_hash::FxHashMap;
use tracing::info;

use crate::catalog::{Catalog, CatalogEntry};
use crate::core_types::{GroupId, ProductId, UserId};
use crate::error::CoreError;
use crate::groupbuy::{GroupBuy, JoinResult};
use crate::identity::{self, Identity};
use crate::ledger::{Ledger, LedgerView};
use crate::membership::Membership;

pub struct Registry {
    catalog: Catalog,
    identities: Vec<Identity>, // user_id = index
    username_index: FxHashMap<String, UserId>,
    groups: Vec<GroupBuy>, // group_id = index, creation order
    ledger: Ledger,
}

impl Registry {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            identities: Vec::new(),
            username_index: FxHashMap::default(),
            groups: Vec::new(),
            ledger: Ledger::new(),
        }
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Register a new user.
    ///
    /// # Errors
    /// - `TooShort` on invalid username/password
    /// - `DuplicateUsername` if the name is taken
    pub fn register(&mut self, username: &str, password: &str) -> Result<UserId, CoreError> {
        identity::validate_registration(username, password)?;
        let username = username.trim();

        if self.username_index.contains_key(username) {
            return Err(CoreError::DuplicateUsername(username.to_string()));
        }

        let user_id = self.identities.len() as UserId;
        let identity = Identity::new(user_id, username.to_string(), password)?;
        self.username_index.insert(username.to_string(), user_id);
        self.identities.push(identity);

        info!(user_id, username, "user registered");
        Ok(user_id)
    }

    /// Verify a login attempt.
    ///
    /// # Errors
    /// - `NotFound` for an unknown username
    /// - `BadCredential` for a wrong password
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&Identity, CoreError> {
        let username = username.trim();
        let user_id = self
            .username_index
            .get(username)
            .copied()
            .ok_or_else(|| CoreError::NotFound(username.to_string()))?;

        let identity = &self.identities[user_id as usize];
        if !identity.verify_password(password) {
            return Err(CoreError::BadCredential(username.to_string()));
        }
        Ok(identity)
    }

    pub fn identity(&self, user_id: UserId) -> Result<&Identity, CoreError> {
        self.identities
            .get(user_id as usize)
            .ok_or(CoreError::UnknownUser(user_id))
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn catalog_list(&self) -> &[CatalogEntry] {
        self.catalog.entries()
    }

    // ========================================================================
    // Campaigns
    // ========================================================================

    /// Open a new campaign with `starter` as organizer.
    ///
    /// # Errors
    /// - `UnknownProduct` / `UnknownUser` on dangling ids
    /// - `AlreadyParticipating` if the starter already holds an open
    ///   membership for the same product, in any group
    pub fn create_group(
        &mut self,
        product_id: ProductId,
        starter: UserId,
    ) -> Result<GroupId, CoreError> {
        let entry = self
            .catalog
            .get(product_id)
            .ok_or(CoreError::UnknownProduct(product_id))?
            .clone();
        let identity = self
            .identities
            .get(starter as usize)
            .ok_or(CoreError::UnknownUser(starter))?;

        if self.holds_open_membership(product_id, starter, None) {
            return Err(CoreError::AlreadyParticipating {
                user_id: starter,
                product: entry.name,
            });
        }

        let group_id = self.groups.len() as GroupId;
        let group = GroupBuy::new(group_id, &entry, identity);
        self.groups.push(group);
        self.ledger.record_created();

        info!(group_id, product = %entry.name, organizer = starter, "group created");
        Ok(group_id)
    }

    /// Join an open campaign; on the threshold-crossing join the settlement
    /// report is folded into the ledger before it is returned.
    ///
    /// # Errors
    /// - `UnknownGroup` / `UnknownUser` on dangling ids
    /// - `AlreadyParticipating` if the user holds an open membership in a
    ///   *different* group for the same product
    /// - `InvalidState` / `DuplicateMembership` from the group itself
    pub fn join_group(&mut self, group_id: GroupId, user: UserId) -> Result<JoinResult, CoreError> {
        let product_id = self
            .groups
            .get(group_id as usize)
            .ok_or(CoreError::UnknownGroup(group_id))?
            .product_id();
        let identity = self
            .identities
            .get(user as usize)
            .ok_or(CoreError::UnknownUser(user))?;

        // Cross-group exclusivity, independent of the within-group duplicate
        // check the group performs itself.
        if self.holds_open_membership(product_id, user, Some(group_id)) {
            return Err(CoreError::AlreadyParticipating {
                user_id: user,
                product: self.groups[group_id as usize].product_name().to_string(),
            });
        }

        let result = self.groups[group_id as usize].join(identity)?;
        if let JoinResult::Settled(report) = &result {
            self.ledger.record_settlement(report);
        }
        Ok(result)
    }

    /// Organizer cancellation; counts as a failed campaign.
    pub fn cancel_group(&mut self, group_id: GroupId, user: UserId) -> Result<(), CoreError> {
        let group = self
            .groups
            .get_mut(group_id as usize)
            .ok_or(CoreError::UnknownGroup(group_id))?;
        group.cancel(user)?;
        self.ledger.record_failure();
        Ok(())
    }

    pub fn group(&self, group_id: GroupId) -> Result<&GroupBuy, CoreError> {
        self.groups
            .get(group_id as usize)
            .ok_or(CoreError::UnknownGroup(group_id))
    }

    /// Open campaigns in creation order, optionally filtered by product.
    pub fn list_open_groups(&self, product: Option<ProductId>) -> Vec<&GroupBuy> {
        self.groups
            .iter()
            .filter(|g| g.is_open())
            .filter(|g| product.is_none_or(|p| g.product_id() == p))
            .collect()
    }

    /// Every membership a user ever held, across all campaigns, in campaign
    /// creation order.
    pub fn user_history(&self, user: UserId) -> Vec<(&GroupBuy, &Membership)> {
        self.groups
            .iter()
            .filter_map(|g| g.membership_of(user).map(|m| (g, m)))
            .collect()
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    #[inline]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_snapshot(&self) -> LedgerView {
        self.ledger.snapshot()
    }

    /// True if `user` is a member of any OPEN group for `product_id`,
    /// excluding `exclude` (the group a join is being attempted on).
    fn holds_open_membership(
        &self,
        product_id: ProductId,
        user: UserId,
        exclude: Option<GroupId>,
    ) -> bool {
        self.groups.iter().any(|g| {
            g.is_open()
                && g.product_id() == product_id
                && exclude != Some(g.group_id())
                && g.contains(user)
        })
    }
}
