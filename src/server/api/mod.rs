pub mod access;
mod account;
mod bulk;
mod chat;
mod employees;
mod reports;
mod roles;
mod shifts;
mod stores;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::server::AppState;

/// Entity routes. Paged listings reuse the `{id}` segment as the offset.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Account
        .route("/users/register", post(account::register))
        .route("/users/register/confirm/{code}", post(account::confirm))
        .route("/users/login", post(account::login))
        .route("/users/logout", post(account::logout))
        .route("/users/me", get(account::me))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/search", get(users::search_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Paging (offset/limit) and admin bulk operations (target/count) share
        // one path shape; parameter names must agree at each position.
        .route(
            "/users/{id}/{count}",
            get(users::list_users_page)
                .post(bulk::seed)
                .delete(bulk::purge),
        )
        .route(
            "/users/pagepreferences/{value}",
            patch(bulk::set_page_preferences),
        )
        // Stores
        .route("/stores", get(stores::list_stores).post(stores::create_store))
        .route("/stores/search", get(stores::search_stores))
        .route("/stores/salaryreport", get(reports::salary_report))
        .route("/stores/headcountreport", get(reports::headcount_report))
        .route(
            "/stores/{id}",
            get(stores::get_store)
                .put(stores::update_store)
                .delete(stores::delete_store),
        )
        .route("/stores/{id}/{limit}", get(stores::list_stores_page))
        // Store employee roles
        .route(
            "/storeemployeeroles",
            get(roles::list_roles).post(roles::create_role),
        )
        .route("/storeemployeeroles/search", get(roles::search_roles))
        .route(
            "/storeemployeeroles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/storeemployeeroles/{id}/{limit}",
            get(roles::list_roles_page),
        )
        // Store employees
        .route(
            "/storeemployees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route("/storeemployees/search", get(employees::search_employees))
        .route("/storeemployees/filter", get(employees::filter_employees))
        .route(
            "/storeemployees/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route(
            "/storeemployees/{id}/{limit}",
            get(employees::list_employees_page),
        )
        // Store shifts (composite key)
        .route(
            "/storeshifts",
            get(shifts::list_shifts).post(shifts::create_shift),
        )
        .route("/storeshifts/search", get(shifts::search_shifts))
        .route(
            "/storeshifts/page/{offset}/{limit}",
            get(shifts::list_shifts_page),
        )
        .route(
            "/storeshifts/{store_id}/{employee_id}",
            get(shifts::get_shift)
                .put(shifts::update_shift)
                .delete(shifts::delete_shift),
        )
        // Chat messages
        .route(
            "/chatmessages",
            get(chat::list_messages).post(chat::create_message),
        )
        .route("/chatmessages/search", get(chat::search_messages))
        .route(
            "/chatmessages/{id}",
            get(chat::get_message)
                .put(chat::update_message)
                .delete(chat::delete_message),
        )
        .route(
            "/chatmessages/{id}/{limit}",
            get(chat::list_messages_page),
        )
}
