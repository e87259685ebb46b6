//! Garage model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(alias = "postalCode")]
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 1))]
    pub country: String,
}

/// A garage (workshop) belonging to one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garage {
    pub id: String,
    pub name: String,
    pub address: Address,
    #[serde(alias = "companyId")]
    pub company_id: String,
}

/// Request body for creating a garage.
///
/// The server also provisions the garage's service account with the given
/// password.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewGarage {
    #[validate(length(min = 1, message = "garage name is required"))]
    pub name: String,
    #[validate(nested)]
    pub address: Address,
    pub company_id: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub service_account_password: String,
}

/// Request body for updating a garage. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateGarage {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "garage name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub email: String,
}

/// Response to garage creation.
#[derive(Debug, Clone, Deserialize)]
pub struct GarageCreateResponse {
    #[serde(default)]
    pub message: String,
    pub garage: Garage,
    pub service_account: ServiceAccount,
}
