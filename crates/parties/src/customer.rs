use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storefront_core::{CustomerId, DomainError, Entity};

/// Customer classification, shared by customers, sales orders and return orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Walk-In")]
    WalkIn,
    #[serde(rename = "Contract")]
    Contract,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::WalkIn => "Walk-In",
            Classification::Contract => "Contract",
        }
    }
}

impl core::fmt::Display for Classification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walk-in" | "walkin" | "walk in" => Ok(Classification::WalkIn),
            "contract" => Ok(Classification::Contract),
            other => Err(DomainError::validation(format!(
                "classification must be one of: Walk-In, Contract (got '{other}')"
            ))),
        }
    }
}

/// Contact information for a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Customer record as supplied by the directory. Read-only to the RMA workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub classification: Classification,
    #[serde(default)]
    pub contact: ContactInfo,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>, classification: Classification) -> Self {
        Self {
            id,
            name: name.into(),
            classification,
            contact: ContactInfo::default(),
        }
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
