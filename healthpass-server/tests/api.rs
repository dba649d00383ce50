mod common;

use common::{PASSWORD, TestApp};
use healthpass_server::Config;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_login_and_me() {
    let t = TestApp::new().await;
    let id = t.register("lyle", "17366637777").await;

    let reply = t
        .post("/users/login", None, json!({"phone": "17366637777", "password": PASSWORD}))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["success"], true);
    assert_eq!(reply.body["detail"], serde_json::Value::Null);
    let token = reply.data()["user_token"].as_str().unwrap().to_owned();
    let cookie = reply.set_cookie.unwrap();
    assert!(cookie.starts_with(&format!("user-token={token}")));

    let me = t.get("/users/me", Some(&token)).await;
    assert_eq!(me.code(), 200);
    assert_eq!(me.data()["id"], id);
    assert_eq!(me.data()["user_identity"], 0);
    assert!(me.data().get("password").is_none());
}

#[tokio::test]
async fn test_auth_failures() {
    let t = TestApp::new().await;
    t.register("lyle", "17366637777").await;

    let reply = t
        .post("/users/login", None, json!({"phone": "17366637777", "password": "nope"}))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.code(), 101002);

    let reply = t.get("/users/me", None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.code(), 101001);

    let reply = t.get("/users/me", Some("not-a-token")).await;
    assert_eq!(reply.code(), 101001);
}

#[tokio::test]
async fn test_duplicate_phone_and_bad_body() {
    let t = TestApp::new().await;
    t.register("lyle", "17366637777").await;

    let reply = t
        .post(
            "/users/register",
            None,
            json!({"name": "other", "sex": 2, "phone": "17366637777", "password": "pw"}),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.code(), 100003);

    let reply = t
        .post("/users/register", None, json!({"name": "x", "sex": 9, "phone": "17366637778"}))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.code(), 100002);
    assert!(reply.body["fields"].is_array());
}

#[tokio::test]
async fn test_update_me_and_reset_password() {
    let t = TestApp::new().await;
    t.register("lyle", "17366637777").await;
    let token = t.login("17366637777").await;

    let reply = t
        .request(
            "PUT",
            "/users/me",
            Some(&token),
            Some(json!({"address": "No.1 road", "phone": "17366637777", "sex": 2, "nation": 1, "birthday": 0})),
        )
        .await;
    assert_eq!(reply.code(), 200);
    assert_eq!(reply.data()["sex"], 2);
    assert_eq!(reply.data()["address"], "No.1 road");

    let reply = t.post("/users/reset-password", Some(&token), json!("new-password")).await;
    assert_eq!(reply.code(), 200);

    let reply = t
        .post("/users/login", None, json!({"phone": "17366637777", "password": "new-password"}))
        .await;
    assert_eq!(reply.code(), 200);
}

#[tokio::test]
async fn test_delete_own_account() {
    let t = TestApp::new().await;
    t.register("lyle", "17366637777").await;
    let token = t.login("17366637777").await;

    let reply = t.request("DELETE", "/users/delete", Some(&token), None).await;
    assert_eq!(reply.code(), 200);
    assert_eq!(reply.data(), &serde_json::Value::Null);

    // The token outlives the account but no longer resolves
    let reply = t.get("/users/me", Some(&token)).await;
    assert_eq!(reply.code(), 101001);
}

#[tokio::test]
async fn test_role_tree_visibility_and_management() {
    let t = TestApp::new().await;
    let root = t.superuser().await;
    let a = t.create_role(&root, "A", 0).await;
    let b = t.create_role(&root, "B", a).await;
    let c = t.create_role(&root, "C", b).await;

    let reply = t.get("/role?page_size=5", Some(&root)).await;
    assert_eq!(reply.body["count"], 3);
    assert_eq!(reply.data()[2]["grand_id"], format!("|{a}|{b}|"));

    let owner_a = t.register("owner-a", "13218655811").await;
    let owner_b = t.register("owner-b", "13218655812").await;
    assert_eq!(t.post(&format!("/role/{a}/users:add"), Some(&root), json!([owner_a])).await.code(), 200);
    assert_eq!(t.post(&format!("/role/{b}/users:add"), Some(&root), json!([owner_b])).await.code(), 200);

    let token_a = t.login("13218655811").await;
    let token_b = t.login("13218655812").await;

    // ADMIN bit follows membership
    assert_eq!(t.get("/users/me", Some(&token_a)).await.data()["user_identity"], 1);

    let reply = t.get("/role", Some(&token_a)).await;
    assert_eq!(reply.body["count"], 3);
    let reply = t.get("/role", Some(&token_b)).await;
    assert_eq!(reply.body["count"], 2);
    let ids: Vec<i64> = reply.data().as_array().unwrap().iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![b, c]);

    // B cannot reach its parent, A reaches its grandchild
    let reply = t.get(&format!("/role/{a}/users"), Some(&token_b)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.code(), 101003);
    assert_eq!(t.get(&format!("/role/{c}/users"), Some(&token_a)).await.code(), 200);

    let reply = t
        .request("PUT", &format!("/role/{c}"), Some(&token_b), Some(json!({"name": "C2"})))
        .await;
    assert_eq!(reply.data()["name"], "C2");
    let reply = t
        .request("PUT", &format!("/role/{c}"), Some(&token_b), Some(json!({"name": "A"})))
        .await;
    assert_eq!(reply.code(), 100003);

    let reply = t.get("/role/9999/users", Some(&token_a)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_role_without_membership_sees_empty_page() {
    let t = TestApp::new().await;
    t.register("lyle", "17366637777").await;
    let token = t.login("17366637777").await;

    let reply = t.get("/role", Some(&token)).await;
    assert_eq!(reply.code(), 200);
    assert_eq!(reply.body["count"], 0);
    assert_eq!(reply.data(), &json!([]));
    assert_eq!(reply.body["next"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_superuser_only_routes() {
    let t = TestApp::new().await;
    t.register("lyle", "17366637777").await;
    let token = t.login("17366637777").await;

    for (method, path) in [("POST", "/role"), ("GET", "/permissions"), ("DELETE", "/role/1")] {
        let body = (method == "POST").then(|| json!({"name": "x"}));
        let reply = t.request(method, path, Some(&token), body).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{method} {path}");
        assert_eq!(reply.code(), 101004);
    }
}

#[tokio::test]
async fn test_membership_removal_recomputes_admin() {
    let t = TestApp::new().await;
    let root = t.superuser().await;
    let a = t.create_role(&root, "A", 0).await;
    let b = t.create_role(&root, "B", 0).await;
    let u = t.register("lyle", "17366637777").await;

    t.post(&format!("/role/{a}/users:add"), Some(&root), json!([u, u])).await;
    t.post(&format!("/role/{b}/users:add"), Some(&root), json!([u])).await;

    // Duplicate rows list the user once
    let reply = t.get(&format!("/role/{a}/users"), Some(&root)).await;
    assert_eq!(reply.body["count"], 1);

    let reply = t.get(&format!("/role/search?user_id={u}"), Some(&root)).await;
    assert_eq!(reply.data().as_array().unwrap().len(), 2);

    t.post(&format!("/role/{a}/users:delete"), Some(&root), json!([u])).await;
    let token = t.login("17366637777").await;
    assert_eq!(t.get("/users/me", Some(&token)).await.data()["user_identity"], 1);

    t.post(&format!("/role/{b}/users:delete"), Some(&root), json!([u])).await;
    assert_eq!(t.get("/users/me", Some(&token)).await.data()["user_identity"], 0);
}

#[tokio::test]
async fn test_role_delete_refuses_parents() {
    let t = TestApp::new().await;
    let root = t.superuser().await;
    let a = t.create_role(&root, "A", 0).await;
    let b = t.create_role(&root, "B", a).await;
    let u = t.register("lyle", "17366637777").await;
    t.post(&format!("/role/{b}/users:add"), Some(&root), json!([u])).await;

    let reply = t.request("DELETE", &format!("/role/{a}"), Some(&root), None).await;
    assert_eq!(reply.code(), 100002);

    let reply = t.request("DELETE", &format!("/role/{b}"), Some(&root), None).await;
    assert_eq!(reply.code(), 200);
    assert_eq!(reply.data()["name"], "B");

    let token = t.login("17366637777").await;
    assert_eq!(t.get("/users/me", Some(&token)).await.data()["user_identity"], 0);
}

#[tokio::test]
async fn test_manage_user_through_role_permission() {
    let t = TestApp::new().await;
    let root = t.superuser().await;
    let a = t.create_role(&root, "A", 0).await;
    let b = t.create_role(&root, "B", a).await;

    let reply = t
        .post("/permissions", Some(&root), json!({"name": format!("manage-user:{b}")}))
        .await;
    let permission_id = reply.data()["id"].as_i64().unwrap();
    t.post(&format!("/role/{b}/permission:add"), Some(&root), json!([permission_id])).await;

    let manager = t.register("manager", "13218655811").await;
    let member = t.register("member", "13218655812").await;
    let outsider = t.register("outsider", "13218655813").await;
    t.post(&format!("/role/{b}/users:add"), Some(&root), json!([manager, member])).await;
    t.post(&format!("/role/{a}/users:add"), Some(&root), json!([outsider])).await;
    let token = t.login("13218655811").await;

    assert_eq!(t.get(&format!("/manage-user/{member}"), Some(&token)).await.code(), 200);
    let reply = t.get(&format!("/manage-user/{outsider}"), Some(&token)).await;
    assert_eq!(reply.code(), 101003);

    let reply = t
        .request(
            "PUT",
            &format!("/manage-user/{member}"),
            Some(&token),
            Some(json!({"name": "renamed", "phone": "13218655812", "sex": 2, "nation": null, "birthday": null})),
        )
        .await;
    assert_eq!(reply.data()["name"], "renamed");

    // Batch reset is all or nothing
    let reply = t.post("/manage-user/reset-password", Some(&token), json!([member, outsider])).await;
    assert_eq!(reply.code(), 101003);
    let reply = t.post("/manage-user/reset-password", Some(&token), json!([member, 4242])).await;
    assert_eq!(reply.data()["count"], 1);
    let reply = t
        .post("/users/login", None, json!({"phone": "13218655812", "password": "123456789"}))
        .await;
    assert_eq!(reply.code(), 200);

    // Search needs a role the caller manages
    let reply = t.get("/manage-user", Some(&token)).await;
    assert_eq!(reply.code(), 100002);
    let reply = t.get(&format!("/manage-user?role_id={b}&keyword_name=rena"), Some(&token)).await;
    assert_eq!(reply.body["count"], 1);
    assert_eq!(reply.data()[0]["id"], member);
    let reply = t.get(&format!("/manage-user?role_id={a}"), Some(&token)).await;
    assert_eq!(reply.code(), 101003);

    let reply = t.get("/manage-user/ids?keyword=out", Some(&token)).await;
    assert_eq!(reply.data(), &json!([outsider]));
}

#[tokio::test]
async fn test_manager_create_requires_permission() {
    let t = TestApp::new().await;
    let root = t.superuser().await;
    let a = t.create_role(&root, "A", 0).await;
    t.register("lyle", "17366637777").await;
    let token = t.login("17366637777").await;

    let new_user = json!({"name": "fresh", "sex": 1, "phone": "15012345678"});
    let reply = t.post("/manage-user", Some(&token), new_user.clone()).await;
    assert_eq!(reply.code(), 101004);

    let reply = t.post("/permissions", Some(&root), json!({"name": "create-user"})).await;
    let permission_id = reply.data()["id"].as_i64().unwrap();
    t.post(&format!("/role/{a}/permission:add"), Some(&root), json!([permission_id])).await;
    let lyle = t.get("/users/me", Some(&token)).await.data()["id"].as_i64().unwrap();
    t.post(&format!("/role/{a}/users:add"), Some(&root), json!([lyle])).await;

    let reply = t.post("/manage-user", Some(&token), new_user).await;
    assert_eq!(reply.code(), 200, "{}", reply.body);
    let reply = t
        .post("/users/login", None, json!({"phone": "15012345678", "password": "123456789"}))
        .await;
    assert_eq!(reply.code(), 200);
}

#[tokio::test]
async fn test_permission_crud() {
    let t = TestApp::new().await;
    let root = t.superuser().await;

    let id = t.post("/permissions", Some(&root), json!({"name": "p1"})).await.data()["id"]
        .as_i64()
        .unwrap();
    assert_eq!(t.post("/permissions", Some(&root), json!({"name": "p1"})).await.code(), 100003);

    let reply = t
        .request("PUT", &format!("/permissions/{id}"), Some(&root), Some(json!({"name": "p2"})))
        .await;
    assert_eq!(reply.data()["name"], "p2");

    let reply = t.get("/permissions", Some(&root)).await;
    assert_eq!(reply.body["count"], 1);

    assert_eq!(t.request("DELETE", &format!("/permissions/{id}"), Some(&root), None).await.code(), 200);
    let reply = t.request("DELETE", &format!("/permissions/{id}"), Some(&root), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_links_and_bounds() {
    let t = TestApp::new().await;
    let root = t.superuser().await;
    for name in ["A", "B", "C"] {
        t.create_role(&root, name, 0).await;
    }

    let reply = t.get("/role?page_size=1&page_id=2", Some(&root)).await;
    assert_eq!(reply.body["count"], 3);
    assert_eq!(
        reply.body["next"],
        "http://localhost:8000/api/v1/role?page_size=1&page_id=3"
    );
    assert_eq!(
        reply.body["previous"],
        "http://localhost:8000/api/v1/role?page_size=1&page_id=1"
    );
    assert_eq!(reply.data()[0]["name"], "B");

    let reply = t.get("/role?page_size=51", Some(&root)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.code(), 100002);
    let reply = t.get("/role?page_id=0", Some(&root)).await;
    assert_eq!(reply.code(), 100002);
}

fn form(name: &str, status: i64, in_real: i64, out_real: i64) -> serde_json::Value {
    json!({
        "name": name,
        "sex": 1,
        "phone": "13218655818",
        "IDCard": "410503198801010031",
        "org_name": "org",
        "car_id": "A88888",
        "reason": "visit",
        "guarantor": "wang",
        "guarantor_phone": "17366637777",
        "health_code_status": status,
        "is_been_epidemic_area_in_two_weeks": false,
        "is_cough": false,
        "in_time_applied": 100,
        "out_time_applied": 200,
        "in_time_real": in_real,
        "out_time_real": out_real
    })
}

#[tokio::test]
async fn test_forms() {
    let t = TestApp::new().await;
    let first = t.post("/form", None, form("zhang", 1, 100, 200)).await;
    assert_eq!(first.code(), 200);
    assert_eq!(first.data()["IDCard"], "410503198801010031");
    t.post("/form", None, form("li", 4, 300, 400)).await;

    let mut bad = form("wu", 1, 1, 2);
    bad["IDCard"] = json!("123");
    let reply = t.post("/form", None, bad).await;
    assert_eq!(reply.code(), 100002);

    assert_eq!(t.get("/form", None).await.code(), 101001);

    t.register("lyle", "17366637777").await;
    let token = t.login("17366637777").await;
    let reply = t.get("/form", Some(&token)).await;
    assert_eq!(reply.body["count"], 2);
    assert_eq!(reply.data()[0]["name"], "li");

    let reply = t.post("/form/search", Some(&token), json!({"health_code_status": 4})).await;
    assert_eq!(reply.body["count"], 1);
    let reply = t.post("/form/search", Some(&token), json!({"in_time": 150})).await;
    assert_eq!(reply.data()[0]["name"], "li");

    let id = first.data()["id"].as_i64().unwrap();
    let reply = t.request("DELETE", &format!("/form/{id}"), Some(&token), None).await;
    assert_eq!(reply.data()["name"], "zhang");
    let reply = t.request("DELETE", &format!("/form/{id}"), Some(&token), None).await;
    assert_eq!(reply.code(), 100001);
}

#[tokio::test]
async fn test_constants_and_fallback() {
    let t = TestApp::new().await;
    let reply = t.get("/constants", None).await;
    assert_eq!(reply.data()["sex"]["1"], "MALE");
    assert_eq!(reply.data()["health_code"]["4"], "RED");
    assert_eq!(reply.data()["user_identity"]["1"], "ADMIN");

    let reply = t.get("/nowhere", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.code(), 100001);
}

#[tokio::test]
async fn test_login_is_throttled() {
    let mut config = Config::local("sqlite::memory:");
    config.login_rate_limit = 2;
    let t = TestApp::with_config(config).await;

    for _ in 0..2 {
        let reply = t
            .post("/users/login", None, json!({"phone": "17366637777", "password": "x"}))
            .await;
        assert_eq!(reply.code(), 101002);
    }
    let reply = t
        .post("/users/login", None, json!({"phone": "17366637777", "password": "x"}))
        .await;
    assert_eq!(reply.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(reply.code(), 101005);
}
