use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccessLevel, Category, Gender, MaritalStatus, UserWithProfile};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryFilterParams {
    pub min_salary: f64,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Body of the register and login calls.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: i64,
    pub code: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserWithProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub bio: Option<String>,
    pub birthday: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    pub location: Option<String>,
    pub page_preference: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
    #[serde(default)]
    pub user_profile: Option<ProfileRequest>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub access_level: Option<AccessLevel>,
    pub user_profile: Option<ProfileRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub category: Category,
    pub open_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub role_level: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub gender: Gender,
    pub employment_date: Option<DateTime<Utc>>,
    pub termination_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub salary: f64,
    pub store_employee_role_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShiftRequest {
    pub store_id: i64,
    pub store_employee_id: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShiftRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub nickname: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_request_uses_camel_case_and_defaults() {
        let req: EmployeeRequest = serde_json::from_str(
            r#"{"firstName":"Jo","lastName":"Doe","salary":1200.5,"storeEmployeeRoleId":3}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "Jo");
        assert_eq!(req.gender, Gender::Male);
        assert_eq!(req.store_employee_role_id, Some(3));
        assert!(req.employment_date.is_none());
    }

    #[test]
    fn test_store_request_category_as_integer() {
        let req: StoreRequest =
            serde_json::from_str(r#"{"name":"Acme","category":2}"#).unwrap();
        assert_eq!(req.category, Category::Electronics);

        let bad = serde_json::from_str::<StoreRequest>(r#"{"name":"Acme","category":99}"#);
        assert!(bad.is_err());
    }
}
