use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Contact, ContactPatch, NewContact, NewUser, User};
use crate::types::{ContactId, UserId};

/// Persistence for credential records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `email` is compared exactly; callers normalize it first.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with [`DatabaseError::UniqueViolation`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;
}

/// Persistence for contacts. Every method takes the owner and never
/// touches rows belonging to anyone else.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, owner: UserId, contact: NewContact) -> Result<Contact, DatabaseError>;

    /// Owner's contacts in the store's natural order. With `search`, only rows
    /// whose name or phone contains it, ignoring case.
    async fn find_contacts(&self, owner: UserId, search: Option<&str>) -> Result<Vec<Contact>, DatabaseError>;

    async fn find_contact(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>, DatabaseError>;

    /// `None` when no contact with `id` belongs to `owner`
    async fn update_contact(
        &self,
        owner: UserId,
        id: ContactId,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete_contact(&self, owner: UserId, id: ContactId) -> Result<bool, DatabaseError>;
}

/// A complete backend: both record kinds plus lifecycle hooks
#[async_trait]
pub trait Store: UserStore + ContactStore {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn close(&self);
}
