//! Crate-wide error type.
//!
//! Every public operation returns these as values. An error always leaves
//! the data model untouched: validation runs before any mutation.

use thiserror::Error;

use crate::core_types::{GroupId, ProductId, UserId};
use crate::groupbuy::GroupStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("username '{0}' is already registered")]
    DuplicateUsername(String),

    #[error("no account registered under '{0}'")]
    NotFound(String),

    #[error("wrong password for '{0}'")]
    BadCredential(String),

    #[error("invalid {field}: must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("user {user_id} is already a member of group {group_id}")]
    DuplicateMembership { user_id: UserId, group_id: GroupId },

    #[error("user {user_id} already holds an open membership for product '{product}'")]
    AlreadyParticipating { user_id: UserId, product: String },

    #[error("group {group_id} is {status} and no longer accepts operations")]
    InvalidState {
        group_id: GroupId,
        status: GroupStatus,
    },

    #[error("user {user_id} is not the organizer of group {group_id}")]
    NotOrganizer { user_id: UserId, group_id: GroupId },

    #[error("credential hashing failed")]
    CredentialHash,

    #[error("unknown group id {0}")]
    UnknownGroup(GroupId),

    #[error("unknown user id {0}")]
    UnknownUser(UserId),

    #[error("unknown product id {0}")]
    UnknownProduct(ProductId),
}
