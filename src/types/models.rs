use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccessLevel, Category, Gender, MaritalStatus};

pub const DEFAULT_PAGE_PREFERENCE: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    /// Argon2 PHC string. `None` for accounts that cannot log in.
    #[serde(skip)]
    pub password: Option<String>,
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: i64,
    pub bio: Option<String>,
    pub birthday: Option<DateTime<Utc>>,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub location: Option<String>,
    pub page_preference: i64,
}

impl UserProfile {
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            bio: None,
            birthday: None,
            gender: Gender::default(),
            marital_status: MaritalStatus::default(),
            location: None,
            page_preference: DEFAULT_PAGE_PREFERENCE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub user_profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationCode {
    pub id: i64,
    pub code: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
    pub used: bool,
    pub user_id: i64,
}

impl ConfirmationCode {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp < now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub category: Category,
    pub open_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEmployeeRole {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub role_level: i64,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEmployee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub employment_date: Option<DateTime<Utc>>,
    pub termination_date: Option<DateTime<Utc>>,
    pub salary: f64,
    pub store_employee_role_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// One shift per (store, employee) pair; the pair is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreShift {
    pub store_id: i64,
    pub store_employee_id: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub nickname: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetails {
    #[serde(flatten)]
    pub store: Store,
    pub store_shifts: Vec<StoreShift>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEmployeeRoleDetails {
    #[serde(flatten)]
    pub role: StoreEmployeeRole,
    pub store_employees: Vec<StoreEmployee>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEmployeeDetails {
    #[serde(flatten)]
    pub employee: StoreEmployee,
    pub store_employee_role: Option<StoreEmployeeRole>,
    pub store_shifts: Vec<StoreShift>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreShiftDetails {
    #[serde(flatten)]
    pub shift: StoreShift,
    pub store: Store,
    pub store_employee: StoreEmployee,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSalaryReport {
    pub id: i64,
    pub name: String,
    pub average_salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHeadcountReport {
    pub id: i64,
    pub name: String,
    pub headcount: i64,
}
