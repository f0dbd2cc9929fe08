//! Contact storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contact_validation::NormalizedContact;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A stored contact. Field values are always in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub cpf_cnpj: String,
    pub telefone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(normalized: NormalizedContact) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            nome: normalized.nome,
            email: normalized.email,
            cpf_cnpj: normalized.cpf_cnpj,
            telefone: normalized.telefone,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{field} already registered")]
    Duplicate { field: &'static str },

    #[error("contact {0} not found")]
    NotFound(Uuid),
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: Contact) -> Result<Contact, RepositoryError>;

    /// All contacts, oldest first
    async fn list(&self) -> Result<Vec<Contact>, RepositoryError>;

    async fn get(&self, id: Uuid) -> Result<Contact, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[derive(Debug, Default)]
struct Contacts {
    by_id: HashMap<Uuid, Contact>,
    /// Insertion order
    order: Vec<Uuid>,
}

/// Process-local repository
#[derive(Debug, Default)]
pub struct InMemoryContactRepository {
    contacts: RwLock<Contacts>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, contact: Contact) -> Result<Contact, RepositoryError> {
        let mut contacts = self.contacts.write().await;

        for existing in contacts.by_id.values() {
            if existing.email == contact.email {
                return Err(RepositoryError::Duplicate { field: "email" });
            }
            if existing.cpf_cnpj == contact.cpf_cnpj {
                return Err(RepositoryError::Duplicate { field: "cpf_cnpj" });
            }
        }

        contacts.order.push(contact.id);
        contacts.by_id.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn list(&self) -> Result<Vec<Contact>, RepositoryError> {
        let contacts = self.contacts.read().await;
        Ok(contacts
            .order
            .iter()
            .filter_map(|id| contacts.by_id.get(id).cloned())
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Contact, RepositoryError> {
        self.contacts
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut contacts = self.contacts.write().await;
        contacts
            .by_id
            .remove(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        contacts.order.retain(|existing| *existing != id);
        Ok(())
    }
}
