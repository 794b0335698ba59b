use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{EmployeeRequest, PageParams, SalaryFilterParams, SearchParams};
use crate::server::response::{
    ApiError, SEARCH_LIMIT, StoreOptionExt, StoreResultExt, page_window,
};
use crate::server::validation::{validate_date_order, validate_label, validate_salary};
use crate::types::{StoreEmployee, StoreEmployeeDetails};

use super::access::require_owner_or_moderator;

fn validate(req: &EmployeeRequest) -> Result<(), ApiError> {
    validate_label(&req.first_name, "First name")?;
    validate_label(&req.last_name, "Last name")?;
    validate_salary(req.salary)?;
    validate_date_order(
        req.employment_date,
        req.termination_date,
        "Employment date",
        "Termination date",
    )
}

fn apply(employee: &mut StoreEmployee, req: EmployeeRequest) {
    employee.first_name = req.first_name;
    employee.last_name = req.last_name;
    employee.gender = req.gender;
    employee.employment_date = req.employment_date;
    employee.termination_date = req.termination_date;
    employee.salary = req.salary;
    employee.store_employee_role_id = req.store_employee_role_id;
}

fn list(
    state: &AppState,
    offset: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<StoreEmployee>, ApiError> {
    let (offset, limit) = page_window(offset, limit, state.config.max_page_size)?;
    state
        .store
        .list_employees(offset, limit)
        .api_err("Failed to list store employees")
}

pub async fn list_employees(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let employees = list(&state, params.offset, params.limit)?;
    Ok::<_, ApiError>(Json(employees))
}

pub async fn list_employees_page(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((offset, limit)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let employees = list(&state, Some(offset), Some(limit))?;
    Ok::<_, ApiError>(Json(employees))
}

pub async fn search_employees(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let employees = state
        .store
        .search_employees(query, SEARCH_LIMIT)
        .api_err("Failed to search store employees")?;

    Ok::<_, ApiError>(Json(employees))
}

/// Employees earning strictly more than `minSalary`.
pub async fn filter_employees(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SalaryFilterParams>,
) -> impl IntoResponse {
    if !params.min_salary.is_finite() {
        return Err(ApiError::bad_request("minSalary must be a number"));
    }
    let (offset, limit) = page_window(params.offset, params.limit, state.config.max_page_size)?;

    let employees = state
        .store
        .filter_employees_by_salary(params.min_salary, offset, limit)
        .api_err("Failed to filter store employees")?;

    Ok::<_, ApiError>(Json(employees))
}

pub async fn get_employee(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let employee = store
        .get_employee(id)
        .api_err("Failed to get store employee")?
        .or_not_found("Store employee not found")?;

    let store_employee_role = match employee.store_employee_role_id {
        Some(role_id) => store
            .get_role(role_id)
            .api_err("Failed to get store employee role")?,
        None => None,
    };

    let store_shifts = store
        .list_employee_shifts(id)
        .api_err("Failed to list employee shifts")?;

    Ok::<_, ApiError>(Json(StoreEmployeeDetails {
        employee,
        store_employee_role,
        store_shifts,
    }))
}

pub async fn create_employee(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmployeeRequest>,
) -> impl IntoResponse {
    validate(&req)?;

    let mut employee = StoreEmployee {
        id: 0,
        first_name: String::new(),
        last_name: String::new(),
        gender: req.gender,
        employment_date: None,
        termination_date: None,
        salary: 0.0,
        store_employee_role_id: None,
        user_id: Some(session.user.id),
    };
    apply(&mut employee, req);

    employee.id = state
        .store
        .create_employee(&employee)
        .api_err("Failed to create store employee")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(employee)))
}

pub async fn update_employee(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<EmployeeRequest>,
) -> impl IntoResponse {
    validate(&req)?;

    let store = state.store.as_ref();
    let mut employee = store
        .get_employee(id)
        .api_err("Failed to get store employee")?
        .or_not_found("Store employee not found")?;

    require_owner_or_moderator(&session, employee.user_id)?;

    apply(&mut employee, req);
    store
        .update_employee(&employee)
        .api_err("Failed to update store employee")?;

    Ok::<_, ApiError>(Json(employee))
}

pub async fn delete_employee(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let employee = store
        .get_employee(id)
        .api_err("Failed to get store employee")?
        .or_not_found("Store employee not found")?;

    require_owner_or_moderator(&session, employee.user_id)?;

    store
        .delete_employee(id)
        .api_err("Failed to delete store employee")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
