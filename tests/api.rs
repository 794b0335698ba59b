mod common;

use common::test_server::{ADMIN_NAME, ADMIN_PASSWORD, MAX_PAGE_SIZE, TestServer};
use reqwest::StatusCode;
use serde_json::{Value, json};

fn len(value: &Value) -> usize {
    value.as_array().map(Vec::len).unwrap_or_default()
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_requests_without_token_are_challenged() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .get(server.url("/api/stores"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("www-authenticate"));

    let resp = server.get("/api/stores", "storekeep_deadbeef_nope").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_confirm_login_flow() {
    let server = TestServer::start().await;
    let creds = json!({ "name": "jordan", "password": "correct-horse" });

    let resp = server
        .client
        .post(server.url("/api/users/register"))
        .json(&creds)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered: Value = resp.json().await.unwrap();
    let code = registered["code"].as_str().unwrap().to_string();

    // Taken name
    let resp = server
        .client
        .post(server.url("/api/users/register"))
        .json(&creds)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Unconfirmed accounts cannot log in
    let resp = server
        .client
        .post(server.url("/api/users/login"))
        .json(&creds)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let confirm_url = server.url(&format!("/api/users/register/confirm/{code}"));
    let resp = server.client.post(&confirm_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server.client.post(&confirm_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = server
        .client
        .post(server.url("/api/users/register/confirm/doesnotexist"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .post(server.url("/api/users/login"))
        .json(&json!({ "name": "jordan", "password": "wrong-horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server
        .client
        .post(server.url("/api/users/login"))
        .json(&creds)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = resp.json().await.unwrap();
    let token = login["token"].as_str().unwrap();
    assert!(token.starts_with("storekeep_"));
    assert_eq!(login["user"]["accessLevel"], 1);
    assert_eq!(login["user"]["userProfile"]["pagePreference"], 5);

    let me = server.get_json("/api/users/me", token).await;
    assert_eq!(me["name"], "jordan");
    assert!(me.get("password").is_none());
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let server = TestServer::start().await;
    let (_, token) = server.login_new_user("leaver").await;

    let resp = server.post("/api/users/logout", &token, &json!({})).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = server.get("/api/users/me", &token).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_can_log_in_with_password() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/api/users/login"))
        .json(&json!({ "name": ADMIN_NAME, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = resp.json().await.unwrap();
    assert_eq!(login["user"]["accessLevel"], 3);
}

#[tokio::test]
async fn test_store_employee_shift_lifecycle() {
    let server = TestServer::start().await;
    let (user_id, token) = server.login_new_user("manager").await;

    let store = server
        .create(
            "/api/stores",
            &token,
            json!({ "name": "Acme", "city": "Cluj-Napoca", "category": 1 }),
        )
        .await;
    let store_id = store["id"].as_i64().unwrap();
    assert_eq!(store["userId"], user_id);

    let role = server
        .create(
            "/api/storeemployeeroles",
            &token,
            json!({ "name": "Cashier", "roleLevel": 2 }),
        )
        .await;
    let role_id = role["id"].as_i64().unwrap();

    let employee = server
        .create(
            "/api/storeemployees",
            &token,
            json!({
                "firstName": "Jo",
                "lastName": "Doe",
                "salary": 2500.0,
                "storeEmployeeRoleId": role_id
            }),
        )
        .await;
    let employee_id = employee["id"].as_i64().unwrap();

    server
        .create(
            "/api/storeshifts",
            &token,
            json!({
                "storeId": store_id,
                "storeEmployeeId": employee_id,
                "startDate": "2024-03-01T08:00:00Z",
                "endDate": "2024-03-01T16:00:00Z"
            }),
        )
        .await;

    // One shift per pair
    let resp = server
        .post(
            "/api/storeshifts",
            &token,
            &json!({ "storeId": store_id, "storeEmployeeId": employee_id }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let details = server
        .get_json(&format!("/api/storeshifts/{store_id}/{employee_id}"), &token)
        .await;
    assert_eq!(details["store"]["name"], "Acme");
    assert_eq!(details["storeEmployee"]["firstName"], "Jo");

    let employee = server
        .get_json(&format!("/api/storeemployees/{employee_id}"), &token)
        .await;
    assert_eq!(employee["storeEmployeeRole"]["name"], "Cashier");
    assert_eq!(len(&employee["storeShifts"]), 1);

    let role = server
        .get_json(&format!("/api/storeemployeeroles/{role_id}"), &token)
        .await;
    assert_eq!(len(&role["storeEmployees"]), 1);

    let resp = server
        .delete(&format!("/api/stores/{store_id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = server
        .get(&format!("/api/storeshifts/{store_id}/{employee_id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The employee outlives the store
    let employee = server
        .get_json(&format!("/api/storeemployees/{employee_id}"), &token)
        .await;
    assert_eq!(len(&employee["storeShifts"]), 0);

    // Removing the role leaves the employee without one
    let resp = server
        .delete(&format!("/api/storeemployeeroles/{role_id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let employee = server
        .get_json(&format!("/api/storeemployees/{employee_id}"), &token)
        .await;
    assert!(employee["storeEmployeeRoleId"].is_null());
}

#[tokio::test]
async fn test_shift_with_missing_references_is_rejected() {
    let server = TestServer::start().await;
    let store = server
        .create("/api/stores", &server.admin_token, json!({ "name": "Solo" }))
        .await;

    let resp = server
        .post(
            "/api/storeshifts",
            &server.admin_token,
            &json!({ "storeId": store["id"], "storeEmployeeId": 999 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    let resp = server
        .post(
            "/api/stores",
            token,
            &json!({
                "name": "Backwards",
                "openDate": "2024-01-02T00:00:00Z",
                "closeDate": "2024-01-01T00:00:00Z"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server.post("/api/stores", token, &json!({ "name": "  " })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .post(
            "/api/storeemployees",
            token,
            &json!({ "firstName": "Neg", "lastName": "Pay", "salary": -1.0 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .post(
            "/api/chatmessages",
            token,
            &json!({ "nickname": "", "message": "hi" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_owner_or_moderator_may_edit() {
    let server = TestServer::start().await;
    let (_, owner) = server.login_new_user("owner").await;
    let (_, other) = server.login_new_user("other").await;

    let store = server
        .create("/api/stores", &owner, json!({ "name": "Mine" }))
        .await;
    let path = format!("/api/stores/{}", store["id"]);

    let resp = server.put(&path, &other, &json!({ "name": "Stolen" })).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server.delete(&path, &other).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .put(&path, &server.admin_token, &json!({ "name": "Audited" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Audited");
}

#[tokio::test]
async fn test_bulk_operations_require_admin() {
    let server = TestServer::start().await;
    let (_, token) = server.login_new_user("regular").await;

    let resp = server.post("/api/users/stores/5", &token, &json!({})).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server.delete("/api/users/stores/5", &token).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bulk_count_and_target_validation() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    for path in [
        "/api/users/stores/0",
        "/api/users/stores/10000000",
        "/api/users/stores/-3",
        "/api/users/stores/many",
        "/api/users/warehouses/5",
    ] {
        let resp = server.post(path, token, &json!({})).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "POST {path}");
    }

    let resp = server.delete("/api/users/stores/0", token).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seed_and_purge() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    let resp = server.post("/api/users/stores/12", token, &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "Successfully generated 12 stores");

    let page = server.get_json("/api/stores/0/5", token).await;
    assert_eq!(len(&page), 5);
    let next = server.get_json("/api/stores/10/5", token).await;
    assert_eq!(len(&next), 2);

    let resp = server.delete("/api/users/stores/4", token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "Successfully deleted 4 stores");

    let all = server.get_json("/api/stores?limit=100", token).await;
    assert_eq!(len(&all), 8);
}

#[tokio::test]
async fn test_seed_shifts_needs_stores_and_employees() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    let resp = server
        .post("/api/users/storeshifts/3", token, &json!({}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    for path in ["/api/users/stores/2", "/api/users/storeemployees/2"] {
        let resp = server.post(path, token, &json!({})).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // Only four (store, employee) pairs exist
    let resp = server
        .post("/api/users/storeshifts/10", token, &json!({}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().starts_with("Generated 4 of 10"));

    let shifts = server.get_json("/api/storeshifts/page/0/50", token).await;
    assert_eq!(len(&shifts), 4);
}

#[tokio::test]
async fn test_paging_bounds() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    let resp = server
        .post(&format!("/api/users/chatmessages/{}", MAX_PAGE_SIZE + 20), token, &json!({}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let capped = server.get_json("/api/chatmessages?limit=5000", token).await;
    assert_eq!(len(&capped), MAX_PAGE_SIZE as usize);

    let resp = server.get("/api/chatmessages/-1/10", token).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server.get("/api/chatmessages/0/0", token).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_preferences_broadcast() {
    let server = TestServer::start().await;
    let (_, token) = server.login_new_user("reader").await;

    let resp = server
        .client
        .patch(server.url("/api/users/pagepreferences/25"))
        .bearer_auth(&server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let me = server.get_json("/api/users/me", &token).await;
    assert_eq!(me["userProfile"]["pagePreference"], 25);

    let resp = server
        .client
        .patch(server.url("/api/users/pagepreferences/0"))
        .bearer_auth(&server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    for name in ["Corner Market", "Big Depot", "market hall"] {
        server
            .create("/api/stores", token, json!({ "name": name }))
            .await;
    }

    let found = server.get_json("/api/stores/search?query=MARKET", token).await;
    assert_eq!(len(&found), 2);

    let blank = server.get_json("/api/stores/search?query=%20%20", token).await;
    assert_eq!(len(&blank), 0);

    let missing = server.get_json("/api/stores/search", token).await;
    assert_eq!(len(&missing), 0);
}

#[tokio::test]
async fn test_reports_and_salary_filter() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    let north = server
        .create("/api/stores", token, json!({ "name": "North" }))
        .await["id"]
        .as_i64()
        .unwrap();
    let south = server
        .create("/api/stores", token, json!({ "name": "South" }))
        .await["id"]
        .as_i64()
        .unwrap();

    let mut employees = Vec::new();
    for (first, salary) in [("Ann", 1000.0), ("Ben", 3000.0), ("Cat", 8000.0)] {
        let employee = server
            .create(
                "/api/storeemployees",
                token,
                json!({ "firstName": first, "lastName": "Lee", "salary": salary }),
            )
            .await;
        employees.push(employee["id"].as_i64().unwrap());
    }

    for (store_id, employee_id) in [
        (north, employees[0]),
        (north, employees[1]),
        (south, employees[2]),
    ] {
        server
            .create(
                "/api/storeshifts",
                token,
                json!({ "storeId": store_id, "storeEmployeeId": employee_id }),
            )
            .await;
    }

    let salaries = server.get_json("/api/stores/salaryreport", token).await;
    assert_eq!(salaries[0]["name"], "South");
    assert_eq!(salaries[0]["averageSalary"], 8000.0);
    assert_eq!(salaries[1]["averageSalary"], 2000.0);

    let headcount = server.get_json("/api/stores/headcountreport", token).await;
    assert_eq!(headcount[0]["name"], "North");
    assert_eq!(headcount[0]["headcount"], 2);

    let filtered = server
        .get_json("/api/storeemployees/filter?minSalary=2500", token)
        .await;
    assert_eq!(len(&filtered), 2);
}

#[tokio::test]
async fn test_chat_edits_need_moderator() {
    let server = TestServer::start().await;
    let (_, token) = server.login_new_user("chatty").await;

    let message = server
        .create(
            "/api/chatmessages",
            &token,
            json!({ "nickname": "chatty", "message": "hello" }),
        )
        .await;
    assert!(message["timestamp"].is_string());
    let path = format!("/api/chatmessages/{}", message["id"]);

    let resp = server.delete(&path, &token).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server.delete(&path, &server.admin_token).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_users_cannot_promote_themselves() {
    let server = TestServer::start().await;
    let (user_id, token) = server.login_new_user("climber").await;
    let path = format!("/api/users/{user_id}");

    let resp = server.put(&path, &token, &json!({ "accessLevel": 3 })).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .put(&path, &token, &json!({ "userProfile": { "bio": "hi" } }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server
        .put(&path, &server.admin_token, &json!({ "accessLevel": 2 }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let user = server.get_json(&path, &token).await;
    assert_eq!(user["accessLevel"], 2);
    assert_eq!(user["userProfile"]["bio"], "hi");
}

#[tokio::test]
async fn test_deleting_user_revokes_tokens() {
    let server = TestServer::start().await;
    let (user_id, token) = server.login_new_user("goner").await;

    let resp = server
        .delete(&format!("/api/users/{user_id}"), &server.admin_token)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = server.get("/api/users/me", &token).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_user_update_changes_nothing() {
    let server = TestServer::start().await;
    let (user_id, token) = server.login_new_user("original").await;
    let path = format!("/api/users/{user_id}");

    let resp = server
        .put(
            &path,
            &token,
            &json!({ "name": "renamed", "userProfile": { "pagePreference": 0 } }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let user = server.get_json(&path, &token).await;
    assert_eq!(user["name"], "original");
    assert_eq!(user["userProfile"]["pagePreference"], 5);

    let resp = server
        .put(
            &path,
            &token,
            &json!({ "name": "renamed", "userProfile": { "pagePreference": 40 } }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let user = server.get_json(&path, &token).await;
    assert_eq!(user["name"], "renamed");
    assert_eq!(user["userProfile"]["pagePreference"], 40);
}

#[tokio::test]
async fn test_search_ignores_accented_case() {
    let server = TestServer::start().await;
    let token = &server.admin_token;

    server
        .create(
            "/api/storeemployees",
            token,
            json!({ "firstName": "Élena", "lastName": "Örn", "salary": 1.0 }),
        )
        .await;

    let found = server
        .get_json("/api/storeemployees/search?query=%C3%A9LENA%20%C3%B6rn", token)
        .await;
    assert_eq!(len(&found), 1);
}
