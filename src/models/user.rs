//! User model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role, numeric on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum UserRole {
    User,
    ServiceAccount,
    Administrator,
    SuperAdministrator,
}

impl TryFrom<i64> for UserRole {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UserRole::User),
            1 => Ok(UserRole::ServiceAccount),
            2 => Ok(UserRole::Administrator),
            3 => Ok(UserRole::SuperAdministrator),
            other => Err(format!("unknown user role {}", other)),
        }
    }
}

impl From<UserRole> for i64 {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => 0,
            UserRole::ServiceAccount => 1,
            UserRole::Administrator => 2,
            UserRole::SuperAdministrator => 3,
        }
    }
}

impl UserRole {
    /// Roles that can badge in on a workstation.
    pub fn is_worker(&self) -> bool {
        !matches!(self, UserRole::ServiceAccount | UserRole::SuperAdministrator)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Administrator | UserRole::SuperAdministrator)
    }
}

/// User profile as the client sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UserDto")]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub company_id: String,
    pub company_name: Option<String>,
    /// Set for accounts bound to a single garage
    pub garage_id: Option<String>,
    pub is_service_account: bool,
    /// UID of the NFC card associated with this user
    pub card_uid: Option<String>,
    /// Task the user is currently working on
    pub task_id: Option<String>,
    /// Open task record for `task_id`
    pub record_task_id: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_working(&self) -> bool {
        self.record_task_id.is_some()
    }
}

/// Wire shape of a user, tolerant of the legacy camelCase spellings.
#[derive(Deserialize)]
struct UserDto {
    id: String,
    email: String,
    role: UserRole,
    #[serde(default, alias = "firstName")]
    first_name: String,
    #[serde(default, alias = "lastName")]
    last_name: String,
    company_id: Option<String>,
    #[serde(rename = "companyId")]
    company_id_legacy: Option<String>,
    #[serde(default, alias = "companyName")]
    company_name: Option<String>,
    garage_id: Option<String>,
    #[serde(rename = "garageId")]
    garage_id_legacy: Option<String>,
    #[serde(default, alias = "isServiceAccount")]
    is_service_account: bool,
    card_uid: Option<String>,
    #[serde(rename = "cardUid")]
    card_uid_legacy: Option<String>,
    #[serde(default, alias = "taskId")]
    task_id: Option<String>,
    #[serde(default, alias = "recordTaskId")]
    record_task_id: Option<String>,
}

/// Platform accounts carry no company; `company_id` is then empty and
/// company-scoped operations fail with `MissingScope`.
impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        let company_id = dto
            .company_id
            .filter(|id| !id.is_empty())
            .or(dto.company_id_legacy)
            .unwrap_or_default();
        let is_service_account = dto.is_service_account || dto.role == UserRole::ServiceAccount;

        Self {
            id: dto.id,
            email: dto.email,
            role: dto.role,
            first_name: dto.first_name,
            last_name: dto.last_name,
            company_id,
            company_name: dto.company_name,
            garage_id: dto.garage_id.or(dto.garage_id_legacy).filter(|id| !id.is_empty()),
            is_service_account,
            card_uid: dto.card_uid.or(dto.card_uid_legacy),
            task_id: dto.task_id,
            record_task_id: dto.record_task_id,
        }
    }
}

/// Local task-linkage patch applied to a cached user after a start or stop.
///
/// Card changes are not patched; the server's copy replaces the cached user.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub task_id: Option<Option<String>>,
    pub record_task_id: Option<Option<String>>,
}

impl UserPatch {
    /// Link the user to an open task record.
    pub fn working_on(task_id: &str, record_id: &str) -> Self {
        Self {
            task_id: Some(Some(task_id.to_string())),
            record_task_id: Some(Some(record_id.to_string())),
        }
    }

    /// Clear the task linkage.
    pub fn idle() -> Self {
        Self {
            task_id: Some(None),
            record_task_id: Some(None),
        }
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(task_id) = &self.task_id {
            user.task_id = task_id.clone();
        }
        if let Some(record_task_id) = &self.record_task_id {
            user.record_task_id = record_task_id.clone();
        }
    }
}

/// Request body for creating a user.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: UserRole,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub company_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garage_id: Option<String>,
}

/// Request body for updating a user. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garage_id: Option<String>,
}
