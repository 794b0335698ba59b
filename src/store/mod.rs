mod schema;
pub mod seed;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// DataStore defines the database interface.
///
/// Key, uniqueness and cascade rules are enforced by the storage engine:
/// deleting a user removes its profile, confirmation codes and tokens;
/// deleting a store or employee removes their shifts; deleting a role or an
/// owning user nulls the references to it.
pub trait DataStore: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    /// Inserts a user together with its mandatory profile and returns the new id.
    fn create_user(&self, user: &User, profile: &UserProfile) -> Result<i64>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;
    fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>>;
    fn search_users(&self, query: &str, limit: i64) -> Result<Vec<User>>;
    /// Updates a user and, when given, its profile in one transaction.
    fn update_user_with_profile(&self, user: &User, profile: Option<&UserProfile>) -> Result<()>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn has_admin_user(&self) -> Result<bool>;

    // Profile operations
    fn get_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>>;
    /// Sets the page preference on every profile, returning the number updated.
    fn set_all_page_preferences(&self, value: i64) -> Result<u64>;

    // Confirmation code operations
    fn create_confirmation_code(&self, code: &ConfirmationCode) -> Result<i64>;
    fn get_confirmation_code(&self, code: &str) -> Result<Option<ConfirmationCode>>;
    fn list_user_confirmation_codes(&self, user_id: i64) -> Result<Vec<ConfirmationCode>>;
    /// Marks the code used and promotes its unconfirmed user to regular.
    fn confirm_user(&self, code_id: i64, user_id: i64) -> Result<()>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn list_user_tokens(&self, user_id: i64) -> Result<Vec<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Store operations
    fn create_store(&self, store: &Store) -> Result<i64>;
    fn get_store(&self, id: i64) -> Result<Option<Store>>;
    fn list_stores(&self, offset: i64, limit: i64) -> Result<Vec<Store>>;
    fn search_stores(&self, query: &str, limit: i64) -> Result<Vec<Store>>;
    fn update_store(&self, store: &Store) -> Result<()>;
    fn delete_store(&self, id: i64) -> Result<bool>;

    // Store employee role operations
    fn create_role(&self, role: &StoreEmployeeRole) -> Result<i64>;
    fn get_role(&self, id: i64) -> Result<Option<StoreEmployeeRole>>;
    fn list_roles(&self, offset: i64, limit: i64) -> Result<Vec<StoreEmployeeRole>>;
    fn search_roles(&self, query: &str, limit: i64) -> Result<Vec<StoreEmployeeRole>>;
    fn update_role(&self, role: &StoreEmployeeRole) -> Result<()>;
    fn delete_role(&self, id: i64) -> Result<bool>;
    fn list_role_employees(&self, role_id: i64) -> Result<Vec<StoreEmployee>>;

    // Store employee operations
    fn create_employee(&self, employee: &StoreEmployee) -> Result<i64>;
    fn get_employee(&self, id: i64) -> Result<Option<StoreEmployee>>;
    fn list_employees(&self, offset: i64, limit: i64) -> Result<Vec<StoreEmployee>>;
    fn search_employees(&self, query: &str, limit: i64) -> Result<Vec<StoreEmployee>>;
    fn filter_employees_by_salary(
        &self,
        min_salary: f64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StoreEmployee>>;
    fn update_employee(&self, employee: &StoreEmployee) -> Result<()>;
    fn delete_employee(&self, id: i64) -> Result<bool>;

    // Store shift operations (composite key)
    fn create_shift(&self, shift: &StoreShift) -> Result<()>;
    fn get_shift(&self, store_id: i64, employee_id: i64) -> Result<Option<StoreShift>>;
    fn list_shifts(&self, offset: i64, limit: i64) -> Result<Vec<StoreShift>>;
    fn search_shifts(&self, query: &str, limit: i64) -> Result<Vec<StoreShift>>;
    fn list_store_shifts(&self, store_id: i64) -> Result<Vec<StoreShift>>;
    fn list_employee_shifts(&self, employee_id: i64) -> Result<Vec<StoreShift>>;
    fn update_shift(&self, shift: &StoreShift) -> Result<()>;
    fn delete_shift(&self, store_id: i64, employee_id: i64) -> Result<bool>;

    // Chat message operations
    fn create_chat_message(&self, message: &ChatMessage) -> Result<i64>;
    fn get_chat_message(&self, id: i64) -> Result<Option<ChatMessage>>;
    fn list_chat_messages(&self, offset: i64, limit: i64) -> Result<Vec<ChatMessage>>;
    fn search_chat_messages(&self, query: &str, limit: i64) -> Result<Vec<ChatMessage>>;
    fn update_chat_message(&self, message: &ChatMessage) -> Result<()>;
    fn delete_chat_message(&self, id: i64) -> Result<bool>;

    // Reports
    fn store_salary_report(&self, offset: i64, limit: i64) -> Result<Vec<StoreSalaryReport>>;
    fn store_headcount_report(&self, offset: i64, limit: i64)
    -> Result<Vec<StoreHeadcountReport>>;

    // Bulk operations
    /// Generates up to `count` synthetic rows owned by `owner_id`; returns rows inserted.
    fn seed(&self, target: BulkTarget, count: u32, owner_id: Option<i64>) -> Result<u64>;
    /// Deletes the first `count` rows by ascending key; returns rows deleted.
    fn purge(&self, target: BulkTarget, count: u32) -> Result<u64>;
}
