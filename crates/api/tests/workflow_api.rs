//! HTTP-level integration tests for the approval workflow.
//!
//! Covers the full project lifecycle, the administrator queues, stage gates
//! under both policies, RBAC, the ownership rule and request validation.

mod common;

use axum::http::StatusCode;
use axum::Router;
use cipm_core::access::WorkflowPolicy;
use cipm_db::models::user::User;
use common::{body_json, get, get_auth, post_json_auth, put_json_auth, token_for};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Actors {
    admin: String,
    leader: String,
    stranger: String,
    leader_user: User,
}

async fn actors(pool: &PgPool) -> Actors {
    let admin = common::create_user(pool, "admin", "admin").await;
    let leader = common::create_user(pool, "leader", "user").await;
    let stranger = common::create_user(pool, "stranger", "user").await;
    Actors {
        admin: token_for(&admin),
        leader: token_for(&leader),
        stranger: token_for(&stranger),
        leader_user: leader,
    }
}

fn application(name: &str) -> Value {
    json!({
        "name": name,
        "applicant_name": "Li",
        "description": "Civic education in data structures",
        "design": "One module per semester",
        "planning_status": "planning",
        "start_date": "2024-03-01",
        "end_date": "2024-12-31",
    })
}

fn midterm_body(achievements: &str) -> Value {
    json!({
        "achievements": achievements,
        "next_steps": "Second cohort",
        "issues": "Scheduling",
        "solutions": "Online sessions",
    })
}

fn final_report_body() -> Value {
    json!({
        "results_summary": "Two cohorts completed",
        "main_content": "Course redesign",
        "significance": "Values-driven teaching",
    })
}

fn funding_body(project: &str, cents: i64) -> Value {
    json!({
        "project_name": project,
        "applicant_name": "Li",
        "requested_amount_cents": cents,
        "purpose": "Printing materials",
        "contact_info": "li@example.edu",
    })
}

async fn apply(app: &Router, token: &str, name: &str) -> StatusCode {
    post_json_auth(app.clone(), "/api/v1/projects", application(name), token)
        .await
        .status()
}

async fn decide(app: &Router, token: &str, uri: &str, decision: &str) -> (StatusCode, Value) {
    let response =
        post_json_auth(app.clone(), uri, json!({ "decision": decision }), token).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn put(app: &Router, token: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = put_json_auth(app.clone(), uri, body, token).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn pending(app: &Router, token: &str, stage: u8) -> Value {
    let response = get_auth(app.clone(), &format!("/api/v1/admin/pending/{stage}"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

fn project_names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            item.get("project")
                .unwrap_or(item)
                .get("name")
                .and_then(Value::as_str)
                .unwrap()
                .to_string()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Full lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_project_lifecycle(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    // Application.
    let response = post_json_auth(app.clone(), "/api/v1/projects", application("P1"), &who.leader)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["approval_status"], "pending");
    assert_eq!(json["data"]["leader_id"], who.leader_user.id);

    let queue = pending(&app, &who.admin, 1).await;
    assert_eq!(queue["stage"], "application");
    assert_eq!(project_names(&queue["items"]), vec!["P1"]);

    // Midterm is gated on the approved project.
    let (status, _) =
        put(&app, &who.leader, "/api/v1/projects/P1/midterm", midterm_body("x")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) =
        decide(&app, &who.admin, "/api/v1/admin/projects/P1/decision", "approve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["approval_status"], "approved");
    assert!(pending(&app, &who.admin, 1).await["items"].as_array().unwrap().is_empty());

    // Approved project with no midterm surfaces in stage 2 as not submitted.
    let queue = pending(&app, &who.admin, 2).await;
    assert_eq!(project_names(&queue["items"]), vec!["P1"]);
    assert!(queue["items"][0]["midterm_review"].is_null());

    let (status, json) =
        put(&app, &who.leader, "/api/v1/projects/P1/midterm", midterm_body("first")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["approval_status"], "pending");

    let queue = pending(&app, &who.admin, 2).await;
    assert_eq!(queue["items"][0]["midterm_review"]["achievements"], "first");

    // Final report is gated on the approved midterm.
    let (status, _) =
        put(&app, &who.leader, "/api/v1/projects/P1/final-report", final_report_body()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(pending(&app, &who.admin, 3).await["items"].as_array().unwrap().is_empty());

    let (status, _) =
        decide(&app, &who.admin, "/api/v1/admin/projects/P1/midterm/decision", "approve").await;
    assert_eq!(status, StatusCode::OK);
    assert!(pending(&app, &who.admin, 2).await["items"].as_array().unwrap().is_empty());

    let queue = pending(&app, &who.admin, 3).await;
    assert_eq!(queue["stage"], "final_report");
    assert_eq!(project_names(&queue["items"]), vec!["P1"]);
    assert!(queue["items"][0]["final_report"].is_null());
    assert_eq!(queue["items"][0]["midterm_review"]["approval_status"], "approved");

    let (status, _) =
        put(&app, &who.leader, "/api/v1/projects/P1/final-report", final_report_body()).await;
    assert_eq!(status, StatusCode::OK);

    // Not eligible for results until the final report is approved.
    let (status, _) = put(
        &app,
        &who.leader,
        "/api/v1/projects/P1/results",
        json!({ "artifact": "results/p1.mp4" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = decide(
        &app,
        &who.admin,
        "/api/v1/admin/projects/P1/final-report/decision",
        "approve",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(pending(&app, &who.admin, 3).await["items"].as_array().unwrap().is_empty());

    let response = get_auth(app.clone(), "/api/v1/results/eligible", &who.leader).await;
    assert_eq!(project_names(&body_json(response).await["data"]), vec!["P1"]);

    // Results, then an overwrite.
    let (status, json) = put(
        &app,
        &who.leader,
        "/api/v1/projects/P1/results",
        json!({ "artifact": "results/p1.mp4" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["results"], "results/p1.mp4");

    let (status, json) = put(
        &app,
        &who.leader,
        "/api/v1/projects/P1/results",
        json!({ "artifact": "results/p1-final.mp4" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["results"], "results/p1-final.mp4");

    let response = get_auth(app.clone(), "/api/v1/results/eligible", &who.leader).await;
    assert_eq!(project_names(&body_json(response).await["data"]), vec!["P1"]);

    let response = get_auth(app.clone(), "/api/v1/projects/P1", &who.leader).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["midterm_submitted"], true);
    assert_eq!(json["data"]["final_submitted"], true);
}

// ---------------------------------------------------------------------------
// Decisions and resubmission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_terminal_decisions_do_not_flip(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;

    let uri = "/api/v1/admin/projects/P1/decision";
    let (status, _) = decide(&app, &who.admin, uri, "reject").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = decide(&app, &who.admin, uri, "reject").await;
    assert_eq!(status, StatusCode::OK, "repeating a decision is a no-op");
    assert_eq!(json["data"]["approval_status"], "rejected");

    let (status, json) = decide(&app, &who.admin, uri, "approve").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_decision_is_rejected(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;

    let (status, json) =
        decide(&app, &who.admin, "/api/v1/admin/projects/P1/decision", "maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejected_midterm_can_be_resubmitted_but_approved_is_locked(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;
    decide(&app, &who.admin, "/api/v1/admin/projects/P1/decision", "approve").await;

    let midterm = "/api/v1/projects/P1/midterm";
    let decision = "/api/v1/admin/projects/P1/midterm/decision";

    put(&app, &who.leader, midterm, midterm_body("first")).await;
    let (status, json) = put(
        &app,
        &who.admin,
        "/api/v1/admin/projects/P1/midterm/comments",
        json!({ "comments": "Add attendance data" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["approval_status"], "pending");

    decide(&app, &who.admin, decision, "reject").await;

    let (status, json) = put(&app, &who.leader, midterm, midterm_body("second")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["approval_status"], "pending");
    assert_eq!(json["data"]["achievements"], "second");
    assert_eq!(json["data"]["review_comments"], "Add attendance data");

    decide(&app, &who.admin, decision, "approve").await;
    let (status, _) = put(&app, &who.leader, midterm, midterm_body("third")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let response = get_auth(app.clone(), midterm, &who.leader).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["achievements"], "second");
    assert_eq!(json["data"]["approval_status"], "approved");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_project_name_conflicts(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    assert_eq!(apply(&app, &who.leader, "P1").await, StatusCode::CREATED);
    assert_eq!(apply(&app, &who.stranger, "P1").await, StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Stage gates under the enforcing policy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_final_report_requires_approved_project(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;

    let (status, json) =
        put(&app, &who.leader, "/api/v1/projects/P1/final-report", final_report_body()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");

    let response = get_auth(app.clone(), "/api/v1/projects/P1/final-report", &who.leader).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND, "nothing was written");

    let response = get_auth(app, "/api/v1/projects/P1", &who.leader).await;
    assert_eq!(body_json(response).await["data"]["final_submitted"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_final_report_decision_requires_approved_midterm(pool: PgPool) {
    let who = actors(&pool).await;
    let lenient = common::build_test_app_with_policy(pool.clone(), WorkflowPolicy::permissive());
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;
    decide(&app, &who.admin, "/api/v1/admin/projects/P1/decision", "approve").await;
    put(&app, &who.leader, "/api/v1/projects/P1/midterm", midterm_body("m")).await;

    // A report filed while the gates were off.
    let (status, _) =
        put(&lenient, &who.leader, "/api/v1/projects/P1/final-report", final_report_body()).await;
    assert_eq!(status, StatusCode::OK);

    let uri = "/api/v1/admin/projects/P1/final-report/decision";
    let (status, json) = decide(&app, &who.admin, uri, "approve").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");

    let response = get_auth(app, "/api/v1/projects/P1/final-report", &who.leader).await;
    assert_eq!(body_json(response).await["data"]["approval_status"], "pending");
}

// ---------------------------------------------------------------------------
// Permissive policy: gates only apply to the listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stage_three_excludes_unapproved_midterm(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app_with_policy(pool, WorkflowPolicy::permissive());
    apply(&app, &who.leader, "P1").await;
    decide(&app, &who.admin, "/api/v1/admin/projects/P1/decision", "approve").await;

    put(&app, &who.leader, "/api/v1/projects/P1/midterm", midterm_body("m")).await;
    let (status, _) =
        put(&app, &who.leader, "/api/v1/projects/P1/final-report", final_report_body()).await;
    assert_eq!(status, StatusCode::OK, "permissive policy accepts the write");

    assert_eq!(project_names(&pending(&app, &who.admin, 2).await["items"]), vec!["P1"]);
    assert!(
        pending(&app, &who.admin, 3).await["items"].as_array().unwrap().is_empty(),
        "pending final report must stay hidden while the midterm is unapproved"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_permissive_policy_allows_any_user(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app_with_policy(pool, WorkflowPolicy::permissive());
    apply(&app, &who.leader, "P1").await;

    let (status, _) =
        put(&app, &who.stranger, "/api/v1/projects/P1/midterm", midterm_body("m")).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_requests_without_token_are_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/projects/mine").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/projects/mine", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_forbid_regular_users(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;

    let (status, json) =
        decide(&app, &who.leader, "/api/v1/admin/projects/P1/decision", "approve").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");

    let response = get_auth(app, "/api/v1/admin/pending/1", &who.leader).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_leader_or_admin_submit_for_project(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;
    decide(&app, &who.admin, "/api/v1/admin/projects/P1/decision", "approve").await;

    let (status, _) =
        put(&app, &who.stranger, "/api/v1/projects/P1/midterm", midterm_body("m")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/funding",
        funding_body("P1", 5_000),
        &who.stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (status, _) = put(&app, &who.admin, "/api/v1/projects/P1/midterm", midterm_body("m")).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Funding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_funding_requests_are_decided_independently(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;

    let mut ids = Vec::new();
    for cents in [150_000, 80_050] {
        let response =
            post_json_auth(app.clone(), "/api/v1/funding", funding_body("P1", cents), &who.leader)
                .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["approval_status"], "pending");
        ids.push(json["data"]["id"].as_i64().unwrap());
    }

    let queue = pending(&app, &who.admin, 0).await;
    assert_eq!(queue["stage"], "funding");
    assert_eq!(queue["items"].as_array().unwrap().len(), 2);

    let uri = format!("/api/v1/admin/funding/{}/decision", ids[0]);
    let (status, _) = decide(&app, &who.admin, &uri, "approve").await;
    assert_eq!(status, StatusCode::OK);

    let queue = pending(&app, &who.admin, 0).await;
    let remaining: Vec<i64> = queue["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(remaining, vec![ids[1]]);

    let response = get_auth(app.clone(), &format!("/api/v1/funding/{}", ids[1]), &who.leader).await;
    assert_eq!(body_json(response).await["data"]["approval_status"], "pending");

    let response = get_auth(app.clone(), "/api/v1/funding/mine", &who.leader).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["project"]["name"], "P1");
    assert_eq!(json["data"][0]["project"]["funding_submitted"], true);
    assert_eq!(json["data"][0]["reports"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_funding_for_unknown_project_is_not_found(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/funding", funding_body("Ghost", 100), &who.leader).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_bodies_report_fields(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;

    let mut body = funding_body("P1", 100);
    body["purpose"] = json!("   ");
    let response = post_json_auth(app.clone(), "/api/v1/funding", body, &who.leader).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["purpose"].is_array());

    let response =
        post_json_auth(app.clone(), "/api/v1/funding", funding_body("P1", 0), &who.leader).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = application("P2");
    body["planning_status"] = json!("someday");
    let response = post_json_auth(app.clone(), "/api/v1/projects", body, &who.leader).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["planning_status"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_stage_is_bad_request(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/pending/7", &who.admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_project_is_not_found(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/projects/Ghost", &who.leader).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Project 'Ghost' not found");

    let (status, _) =
        decide(&app, &who.admin, "/api/v1/admin/projects/Ghost/midterm/decision", "approve").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_incomplete_bodies_use_error_envelope(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    apply(&app, &who.leader, "P1").await;

    let uri = "/api/v1/admin/projects/P1/decision";
    let response = post_json_auth(app.clone(), uri, json!({}), &who.admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("decision"));

    decide(&app, &who.admin, uri, "approve").await;
    let mut body = midterm_body("m");
    body.as_object_mut().unwrap().remove("next_steps");
    let (status, json) = put(&app, &who.leader, "/api/v1/projects/P1/midterm", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("next_steps"));

    let response = get_auth(app, "/api/v1/projects/P1/midterm", &who.leader).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unparseable_path_parameters_use_error_envelope(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/admin/pending/300", &who.admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get_auth(app, "/api/v1/funding/abc", &who.leader).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reserved_project_name_is_rejected(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app.clone(), "/api/v1/projects", application("mine"), &who.leader).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["name"].is_array());

    let response = get_auth(app, "/api/v1/projects/mine", &who.leader).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}
