use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Contact, ContactPatch, NewContact, NewUser, User};
use crate::database::store::{ContactStore, Store, UserStore};
use crate::types::{ContactId, UserId};

/// Process-local store. Data lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    contacts: RwLock<Vec<Contact>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation("users.email".to_string()));
        }

        let record = User {
            id: UserId::new(),
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_contact(&self, owner: UserId, contact: NewContact) -> Result<Contact, DatabaseError> {
        let now = Utc::now();
        let record = Contact {
            id: ContactId::new(),
            user_id: owner,
            name: contact.name,
            phone: contact.phone,
            created_at: now,
            updated_at: now,
        };
        self.contacts.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_contacts(&self, owner: UserId, search: Option<&str>) -> Result<Vec<Contact>, DatabaseError> {
        let needle = search.map(str::to_lowercase);
        let contacts = self.contacts.read().await;
        Ok(contacts
            .iter()
            .filter(|c| c.user_id == owner)
            .filter(|c| needle.as_deref().map_or(true, |n| c.matches_search(n)))
            .cloned()
            .collect())
    }

    async fn find_contact(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>, DatabaseError> {
        let contacts = self.contacts.read().await;
        Ok(contacts
            .iter()
            .find(|c| c.id == id && c.user_id == owner)
            .cloned())
    }

    async fn update_contact(
        &self,
        owner: UserId,
        id: ContactId,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, DatabaseError> {
        let mut contacts = self.contacts.write().await;
        let Some(contact) = contacts.iter_mut().find(|c| c.id == id && c.user_id == owner) else {
            return Ok(None);
        };
        patch.apply_to(contact);
        contact.updated_at = Utc::now();
        Ok(Some(contact.clone()))
    }

    async fn delete_contact(&self, owner: UserId, id: ContactId) -> Result<bool, DatabaseError> {
        let mut contacts = self.contacts.write().await;
        let before = contacts.len();
        contacts.retain(|c| !(c.id == id && c.user_id == owner));
        Ok(contacts.len() != before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {}
}
