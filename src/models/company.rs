//! Company model.

use super::Address;
use serde::{Deserialize, Serialize};

/// The tenant owning garages and users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub address: Address,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub siret: String,
}
