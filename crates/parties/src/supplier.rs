use serde::{Deserialize, Serialize};

use stockkeep_core::validate::required_text;
use stockkeep_core::{DomainError, DomainResult, Entity, SupplierId};

/// Supplier status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierStatus {
    Active,
    Inactive,
}

/// Contact information for a supplier. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl ContactInfo {
    fn validate(&self) -> DomainResult<()> {
        required_text("contact person", &self.contact_person, 100)?;
        required_text("email", &self.email, 100)?;
        required_text("phone", &self.phone, 20)?;
        required_text("address", &self.address, 200)?;

        if !looks_like_email(&self.email) {
            return Err(DomainError::validation("email is not a valid address"));
        }
        if !self
            .phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'))
        {
            return Err(DomainError::validation("phone contains invalid characters"));
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// A supplier of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    contact: ContactInfo,
    status: SupplierStatus,
}

impl Supplier {
    pub const NAME_MAX: usize = 100;

    /// Register a supplier. New suppliers start active.
    pub fn new(id: SupplierId, name: impl Into<String>, contact: ContactInfo) -> DomainResult<Self> {
        let name = name.into();
        required_text("supplier name", &name, Self::NAME_MAX)?;
        contact.validate()?;
        Ok(Self {
            id,
            name,
            contact,
            status: SupplierStatus::Active,
        })
    }

    pub fn update_details(&mut self, name: impl Into<String>, contact: ContactInfo) -> DomainResult<()> {
        let name = name.into();
        required_text("supplier name", &name, Self::NAME_MAX)?;
        contact.validate()?;
        self.name = name;
        self.contact = contact;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.status = SupplierStatus::Active;
    }

    pub fn deactivate(&mut self) {
        self.status = SupplierStatus::Inactive;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn status(&self) -> SupplierStatus {
        self.status
    }

    /// Inactive suppliers cannot receive new purchase orders.
    pub fn is_active(&self) -> bool {
        self.status == SupplierStatus::Active
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }
}
