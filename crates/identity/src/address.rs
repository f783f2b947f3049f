//! Address book with the single-default invariant.
//!
//! # Invariants
//! - A user with at least one address always has exactly one default.
//! - The first address ever inserted becomes the default regardless of the
//!   caller's request.
//! - Inserting or updating an address as default unsets every other default.
//! - Removing the default promotes the most recently created remaining
//!   address.
//!
//! The book is a pure in-memory structure; the address store mutates one
//! book per user under a single lock, which makes the default swap atomic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gymgrid_core::{AddressId, DomainError, DomainResult, UserId};

/// A user address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    /// Short tag such as "Home" or "Work".
    pub label: String,
    /// Full address text in one field.
    pub text: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub label: String,
    pub text: String,
    pub is_default: bool,
}

/// Partial update of an address; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPatch {
    pub label: Option<String>,
    pub text: Option<String>,
    pub is_default: Option<bool>,
}

/// All addresses of one user, normalized after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBook {
    user_id: UserId,
    addresses: Vec<Address>,
}

impl AddressBook {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            addresses: Vec::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Insert an address, applying the single-default rules.
    pub fn insert(&mut self, new: NewAddress, now: DateTime<Utc>) -> Address {
        // First-ever address is the default no matter what was requested.
        let is_default = new.is_default || self.addresses.is_empty();
        if is_default {
            self.clear_defaults();
        }

        let address = Address {
            id: AddressId::new(),
            user_id: self.user_id,
            label: new.label,
            text: new.text,
            is_default,
            created_at: now,
            updated_at: now,
        };
        self.addresses.push(address.clone());
        address
    }

    /// Apply a partial update, re-normalizing defaults if the flag changed.
    ///
    /// Clearing the default flag on the current default is rejected: it
    /// would leave the user with addresses but no default. Pick a new
    /// default instead.
    pub fn update(&mut self, id: AddressId, patch: AddressPatch, now: DateTime<Utc>) -> DomainResult<Address> {
        let position = self
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or(DomainError::NotFound)?;

        if patch.is_default == Some(false) && self.addresses[position].is_default {
            return Err(DomainError::invariant(
                "cannot unset the default address directly; set another address as default",
            ));
        }

        if patch.is_default == Some(true) {
            self.clear_defaults();
        }

        let address = &mut self.addresses[position];
        if let Some(label) = patch.label {
            address.label = label;
        }
        if let Some(text) = patch.text {
            address.text = text;
        }
        if let Some(is_default) = patch.is_default {
            address.is_default = is_default;
        }
        address.updated_at = now;
        Ok(address.clone())
    }

    /// Remove an address.
    ///
    /// If the default was removed, the most recently created remaining
    /// address is promoted so the invariant survives deletion.
    pub fn remove(&mut self, id: AddressId) -> DomainResult<()> {
        let position = self
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or(DomainError::NotFound)?;

        let removed = self.addresses.remove(position);
        if removed.is_default {
            if let Some(newest) = self
                .addresses
                .iter_mut()
                .max_by_key(|a| (a.created_at, a.id.as_uuid().as_u128()))
            {
                newest.is_default = true;
            }
        }
        Ok(())
    }

    fn clear_defaults(&mut self) {
        for address in &mut self.addresses {
            address.is_default = false;
        }
    }

    #[cfg(test)]
    fn default_count(&self) -> usize {
        self.addresses.iter().filter(|a| a.is_default).count()
    }
}
