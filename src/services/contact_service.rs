use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::database::store::ContactStore;
use crate::types::{ContactId, UserId};

use super::validation::{clean_text_field, ValidationError};

#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Contact CRUD scoped to one owner per call.
///
/// Update and delete never report whether an id exists under a different
/// owner: a missing id and someone else's id produce the same outcome
/// (`None` from update, a plain success from delete). Callers therefore
/// cannot tell "not found" from "not yours".
#[derive(Clone)]
pub struct ContactService {
    contacts: Arc<dyn ContactStore>,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactStore>) -> Self {
        Self { contacts }
    }

    pub async fn add(&self, owner: UserId, contact: NewContact) -> Result<Contact, ContactError> {
        let contact = NewContact {
            name: clean_text_field("name", &contact.name)?,
            phone: clean_text_field("phone", &contact.phone)?,
        };
        let created = self.contacts.insert_contact(owner, contact).await?;
        debug!("User {} added contact {}", owner, created.id);
        Ok(created)
    }

    /// All of the owner's contacts, optionally narrowed by a case-insensitive
    /// substring of name or phone. A whitespace-only term means no filter;
    /// any other term is matched as given, surrounding spaces included.
    /// No ordering is promised.
    pub async fn list(&self, owner: UserId, search: Option<&str>) -> Result<Vec<Contact>, ContactError> {
        let search = search.filter(|term| !term.trim().is_empty());
        Ok(self.contacts.find_contacts(owner, search).await?)
    }

    /// `None` when the id does not name one of the owner's contacts
    pub async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, ContactError> {
        let patch = Self::clean_patch(patch)?;

        if patch.is_empty() {
            return Ok(self.contacts.find_contact(owner, id).await?);
        }

        let updated = self.contacts.update_contact(owner, id, &patch).await?;
        if updated.is_none() {
            debug!("Update of contact {} by user {} matched nothing", id, owner);
        }
        Ok(updated)
    }

    /// Trim the fields present in `patch`, rejecting any that end up blank
    pub fn clean_patch(patch: ContactPatch) -> Result<ContactPatch, ValidationError> {
        Ok(ContactPatch {
            name: patch.name.as_deref().map(|v| clean_text_field("name", v)).transpose()?,
            phone: patch.phone.as_deref().map(|v| clean_text_field("phone", v)).transpose()?,
        })
    }

    /// Succeeds whether or not anything was removed
    pub async fn delete(&self, owner: UserId, id: ContactId) -> Result<(), ContactError> {
        let removed = self.contacts.delete_contact(owner, id).await?;
        debug!("Delete of contact {} by user {} removed={}", id, owner, removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    fn service() -> ContactService {
        ContactService::new(Arc::new(MemoryStore::new()))
    }

    fn new_contact(name: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn add_trims_and_requires_fields() {
        let contacts = service();
        let owner = UserId::new();

        let c = contacts.add(owner, new_contact("  Bob ", " 555 ")).await.unwrap();
        assert_eq!((c.name.as_str(), c.phone.as_str()), ("Bob", "555"));
        assert_eq!(c.user_id, owner);

        assert!(matches!(
            contacts.add(owner, new_contact("", "555")).await,
            Err(ContactError::Validation(ValidationError { field: "name", .. }))
        ));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let contacts = service();
        let owner = UserId::new();
        contacts.add(owner, new_contact("Alice", "555-0100")).await.unwrap();
        contacts.add(owner, new_contact("Bob", "555-0200")).await.unwrap();

        for term in ["ali", "ALI", "lice"] {
            let hits = contacts.list(owner, Some(term)).await.unwrap();
            assert_eq!(hits.len(), 1, "term {:?}", term);
            assert_eq!(hits[0].name, "Alice");
        }

        assert_eq!(contacts.list(owner, Some("555")).await.unwrap().len(), 2);
        assert_eq!(contacts.list(owner, Some("   ")).await.unwrap().len(), 2);
        assert!(contacts.list(owner, Some("a.*")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_keeps_surrounding_spaces() {
        let contacts = service();
        let owner = UserId::new();
        contacts.add(owner, new_contact("Eve", "555-0300")).await.unwrap();
        contacts.add(owner, new_contact("Joe Smith", "555-0400")).await.unwrap();

        let hits = contacts.list(owner, Some("e ")).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Joe Smith"]);

        let hits = contacts.list(owner, Some(" smith")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(contacts.list(owner, Some(" eve")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_users_cannot_see_or_touch_contacts() {
        let contacts = service();
        let alice = UserId::new();
        let bob = UserId::new();
        let c = contacts.add(alice, new_contact("Carol", "555")).await.unwrap();

        assert!(contacts.list(bob, None).await.unwrap().is_empty());

        let patch = ContactPatch {
            name: Some("Hijacked".to_string()),
            phone: None,
        };
        assert!(contacts.update(bob, c.id, patch).await.unwrap().is_none());
        contacts.delete(bob, c.id).await.unwrap();

        let still_there = contacts.list(alice, None).await.unwrap();
        assert_eq!(still_there, vec![c]);
    }

    #[tokio::test]
    async fn update_is_partial_and_empty_patch_returns_current() {
        let contacts = service();
        let owner = UserId::new();
        let c = contacts.add(owner, new_contact("Bob", "555")).await.unwrap();

        let unchanged = contacts.update(owner, c.id, ContactPatch::default()).await.unwrap();
        assert_eq!(unchanged, Some(c.clone()));

        let patch = ContactPatch {
            name: None,
            phone: Some("777".to_string()),
        };
        let updated = contacts.update(owner, c.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Bob");
        assert_eq!(updated.phone, "777");
    }

    #[tokio::test]
    async fn update_rejects_blank_values() {
        let contacts = service();
        let owner = UserId::new();
        let c = contacts.add(owner, new_contact("Bob", "555")).await.unwrap();
        let patch = ContactPatch {
            name: Some(" ".to_string()),
            phone: None,
        };
        assert!(matches!(contacts.update(owner, c.id, patch).await, Err(ContactError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_ids_are_silent_no_ops() {
        let contacts = service();
        let owner = UserId::new();
        let patch = ContactPatch {
            name: Some("X".to_string()),
            phone: None,
        };
        assert!(contacts.update(owner, ContactId::new(), patch).await.unwrap().is_none());
        assert!(contacts.delete(owner, ContactId::new()).await.is_ok());
    }
}
