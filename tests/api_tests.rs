//! API integration tests
//!
//! These run against a live server with a fresh database:
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}", prefix, nanos)
}

/// Register a user with the given role and return a bearer token
async fn register_and_login(client: &Client, role: &str) -> String {
    let username = unique("user");
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "secret123",
            "full_name": "Test User",
            "role": role
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_equipment(client: &Client, token: &str, total: i32) -> i64 {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": unique("Microscope"),
            "category": "Lab",
            "total_quantity": total
        }))
        .send()
        .await
        .expect("Failed to create equipment");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["available_quantity"], body["total_quantity"]);
    body["id"].as_i64().unwrap()
}

async fn available_quantity(client: &Client, token: &str, equipment_id: i64) -> i64 {
    let body: Value = client
        .get(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["available_quantity"].as_i64().unwrap()
}

async fn submit_request(
    client: &Client,
    token: &str,
    equipment_id: i64,
    quantity: i32,
    from: &str,
    to: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/borrow-requests", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "equipment_id": equipment_id,
            "quantity": quantity,
            "from_date": from,
            "to_date": to,
            "reason": "physics class"
        }))
        .send()
        .await
        .expect("Failed to submit request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "no-such-user",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_student_cannot_manage_catalog_or_decide() {
    let client = Client::new();
    let student = register_and_login(&client, "STUDENT").await;

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&student)
        .json(&json!({"name": "X", "category": "Lab", "total_quantity": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/borrow-requests/1/approve", BASE_URL))
        .bearer_auth(&student)
        .json(&json!({"remarks": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_submit_validation() {
    let client = Client::new();
    let staff = register_and_login(&client, "ADMIN").await;
    let equipment_id = create_equipment(&client, &staff, 5).await;

    let today = Utc::now().date_naive();
    let future = (today + Duration::days(5)).to_string();
    let later = (today + Duration::days(8)).to_string();
    let past = (today - Duration::days(1)).to_string();

    // from date after to date
    let response = submit_request(&client, &staff, equipment_id, 1, &later, &future).await;
    assert_eq!(response.status(), 400);

    // from date in the past
    let response = submit_request(&client, &staff, equipment_id, 1, &past, &future).await;
    assert_eq!(response.status(), 400);

    // zero quantity
    let response = submit_request(&client, &staff, equipment_id, 0, &future, &later).await;
    assert_eq!(response.status(), 400);

    // unknown equipment is a hard not-found, never "available"
    let response = submit_request(&client, &staff, 99999999, 1, &future, &later).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_availability_check_rejects_unknown_equipment() {
    let client = Client::new();
    let staff = register_and_login(&client, "LAB_ASSISTANT").await;

    let today = Utc::now().date_naive();
    let from = (today + Duration::days(3)).to_string();
    let to = (today + Duration::days(4)).to_string();

    let response = client
        .get(format!(
            "{}/dashboard/equipment/99999999/availability?from_date={}&to_date={}",
            BASE_URL, from, to
        ))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

/// Full lifecycle: submission, contention at approval time, day coverage,
/// release on return, reject without side effects, invalid transitions.
#[tokio::test]
#[ignore]
async fn test_borrow_request_lifecycle() {
    let client = Client::new();
    let staff = register_and_login(&client, "ADMIN").await;
    let student = register_and_login(&client, "STUDENT").await;

    let equipment_id = create_equipment(&client, &staff, 10).await;
    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 10);

    let today = Utc::now().date_naive();
    let from = (today + Duration::days(10)).to_string();
    let to = (today + Duration::days(15)).to_string(); // 6 calendar days

    // Submission commits nothing, so overlapping pending requests may
    // oversubscribe; contention is resolved at approval time.
    let response = submit_request(&client, &student, equipment_id, 8, &from, &to).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "PENDING");
    let request_a = body["id"].as_i64().unwrap();

    let response = submit_request(&client, &student, equipment_id, 5, &from, &to).await;
    assert_eq!(response.status(), 201);
    let request_b = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    // Approve A: 6 active booking rows, counter drops to 2
    let response = client
        .post(format!("{}/borrow-requests/{}/approve", BASE_URL, request_a))
        .bearer_auth(&staff)
        .json(&json!({"remarks": "approved for class"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "APPROVED");
    assert!(body["approver_name"].is_string());

    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 2);

    let bookings: Value = client
        .get(format!("{}/borrow-requests/{}/bookings", BASE_URL, request_a))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = bookings.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    for row in rows {
        assert_eq!(row["quantity"], 8);
        assert_eq!(row["status"], 0);
    }

    // B lost the race: 8 + 5 > 10 on every shared day
    let response = client
        .post(format!("{}/borrow-requests/{}/approve", BASE_URL, request_b))
        .bearer_auth(&staff)
        .json(&json!({"remarks": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // 2 units remain: a quantity=2 request fits, then nothing does
    let response = submit_request(&client, &student, equipment_id, 2, &from, &to).await;
    assert_eq!(response.status(), 201);
    let request_c = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/borrow-requests/{}/approve", BASE_URL, request_c))
        .bearer_auth(&staff)
        .json(&json!({"remarks": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 0);

    let response = submit_request(&client, &student, equipment_id, 1, &from, &to).await;
    assert_eq!(response.status(), 409);

    // Per-day calendar reflects both active requests
    let calendar: Value = client
        .get(format!(
            "{}/dashboard/equipment/{}/availability?from_date={}&to_date={}",
            BASE_URL, equipment_id, from, to
        ))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let days = calendar["days"].as_array().unwrap();
    assert_eq!(days.len(), 6);
    for day in days {
        assert_eq!(day["booked"], 10);
        assert_eq!(day["available"], 0);
    }

    // Return A: all its bookings flip to released, counter rises to 8
    let return_date = (today + Duration::days(16)).to_string();
    let response = client
        .post(format!("{}/borrow-requests/{}/return", BASE_URL, request_a))
        .bearer_auth(&staff)
        .json(&json!({"return_date": return_date, "condition_after_use": "Good"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "RETURNED");
    assert_eq!(body["condition_after_use"], "Good");

    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 8);

    let bookings: Value = client
        .get(format!("{}/borrow-requests/{}/bookings", BASE_URL, request_a))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = bookings.as_array().unwrap();
    assert_eq!(rows.len(), 6); // rows are kept, never deleted
    for row in rows {
        assert_eq!(row["status"], 1);
    }

    // Reject B: no bookings were ever created, counter unchanged
    let response = client
        .post(format!("{}/borrow-requests/{}/reject", BASE_URL, request_b))
        .bearer_auth(&staff)
        .json(&json!({"remarks": "window closed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let bookings: Value = client
        .get(format!("{}/borrow-requests/{}/bookings", BASE_URL, request_b))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(bookings.as_array().unwrap().is_empty());
    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 8);

    // Terminal states refuse further transitions
    for (id, action) in [
        (request_a, "approve"),
        (request_a, "return"),
        (request_b, "approve"),
        (request_b, "reject"),
    ] {
        let payload = if action == "return" {
            json!({"return_date": return_date, "condition_after_use": null})
        } else {
            json!({"remarks": null})
        };
        let response = client
            .post(format!("{}/borrow-requests/{}/{}", BASE_URL, id, action))
            .bearer_auth(&staff)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 422, "{} on request {}", action, id);
    }
}

#[tokio::test]
#[ignore]
async fn test_single_day_request_creates_one_booking() {
    let client = Client::new();
    let staff = register_and_login(&client, "TEACHER").await;

    let equipment_id = create_equipment(&client, &staff, 3).await;
    let day = (Utc::now().date_naive() + Duration::days(2)).to_string();

    let response = submit_request(&client, &staff, equipment_id, 3, &day, &day).await;
    assert_eq!(response.status(), 201);
    let request_id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/borrow-requests/{}/approve", BASE_URL, request_id))
        .bearer_auth(&staff)
        .json(&json!({"remarks": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let bookings: Value = client
        .get(format!("{}/borrow-requests/{}/bookings", BASE_URL, request_id))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bookings.as_array().unwrap().len(), 1);
    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 0);
}

/// Availability is per day, so loans on disjoint date ranges may together
/// exceed capacity. The counter cache dips below zero in that window and
/// recovers as the loans come back; approvals must not fail on it.
#[tokio::test]
#[ignore]
async fn test_non_overlapping_loans_can_exceed_capacity() {
    let client = Client::new();
    let staff = register_and_login(&client, "ADMIN").await;

    let equipment_id = create_equipment(&client, &staff, 10).await;
    let today = Utc::now().date_naive();

    let mut request_ids = Vec::new();
    for (from_offset, to_offset) in [(5, 6), (20, 21)] {
        let from = (today + Duration::days(from_offset)).to_string();
        let to = (today + Duration::days(to_offset)).to_string();

        let response = submit_request(&client, &staff, equipment_id, 8, &from, &to).await;
        assert_eq!(response.status(), 201);
        let request_id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

        // Every day of this range has all 10 units free in the ledger
        let response = client
            .post(format!("{}/borrow-requests/{}/approve", BASE_URL, request_id))
            .bearer_auth(&staff)
            .json(&json!({"remarks": null}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        request_ids.push(request_id);
    }

    // Both loans are out at once; the cache reflects that
    assert_eq!(available_quantity(&client, &staff, equipment_id).await, -6);

    let return_date = (today + Duration::days(22)).to_string();
    for (request_id, expected) in [(request_ids[0], 2), (request_ids[1], 10)] {
        let response = client
            .post(format!("{}/borrow-requests/{}/return", BASE_URL, request_id))
            .bearer_auth(&staff)
            .json(&json!({"return_date": return_date, "condition_after_use": "Good"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(available_quantity(&client, &staff, equipment_id).await, expected);
    }
}

/// Capacity edits shift the counter by the delta instead of recomputing it,
/// so units on loan stay accounted for, and the return re-increment clamps
/// to the capacity in force at return time.
#[tokio::test]
#[ignore]
async fn test_capacity_change_preserves_outstanding_loans() {
    let client = Client::new();
    let staff = register_and_login(&client, "ADMIN").await;

    let equipment_id = create_equipment(&client, &staff, 10).await;
    let today = Utc::now().date_naive();
    let from = (today + Duration::days(3)).to_string();
    let to = (today + Duration::days(4)).to_string();

    let response = submit_request(&client, &staff, equipment_id, 8, &from, &to).await;
    assert_eq!(response.status(), 201);
    let request_id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/borrow-requests/{}/approve", BASE_URL, request_id))
        .bearer_auth(&staff)
        .json(&json!({"remarks": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 2);

    // Raising capacity by 2 frees 2 more units while 8 remain on loan
    let body: Value = client
        .put(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .bearer_auth(&staff)
        .json(&json!({"total_quantity": 12}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_quantity"], 12);
    assert_eq!(body["available_quantity"], 4);

    // Lowering it below the outstanding loan keeps the 8-unit gap
    let body: Value = client
        .put(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .bearer_auth(&staff)
        .json(&json!({"total_quantity": 9}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["available_quantity"], 1);

    // Return clamps at the reduced capacity
    let return_date = (today + Duration::days(5)).to_string();
    let response = client
        .post(format!("{}/borrow-requests/{}/return", BASE_URL, request_id))
        .bearer_auth(&staff)
        .json(&json!({"return_date": return_date, "condition_after_use": "Good"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(available_quantity(&client, &staff, equipment_id).await, 9);
}

#[tokio::test]
#[ignore]
async fn test_my_requests_and_filters() {
    let client = Client::new();
    let staff = register_and_login(&client, "ADMIN").await;
    let student = register_and_login(&client, "STUDENT").await;

    let equipment_id = create_equipment(&client, &staff, 4).await;
    let today = Utc::now().date_naive();
    let from = (today + Duration::days(1)).to_string();
    let to = (today + Duration::days(2)).to_string();

    let response = submit_request(&client, &student, equipment_id, 1, &from, &to).await;
    assert_eq!(response.status(), 201);
    let request_id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    // Student sees their own request
    let mine: Value = client
        .get(format!("{}/borrow-requests/my", BASE_URL))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"].as_i64() == Some(request_id)));

    // Students cannot use the staff listing
    let response = client
        .get(format!("{}/borrow-requests?status=PENDING", BASE_URL))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Staff filter by status finds it; an unknown status is rejected
    let pending: Value = client
        .get(format!("{}/borrow-requests?status=PENDING", BASE_URL))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"].as_i64() == Some(request_id)));

    let response = client
        .get(format!("{}/borrow-requests?status=BOGUS", BASE_URL))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Summary counts at least this pending request
    let summary: Value = client
        .get(format!("{}/dashboard/summary", BASE_URL))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(summary["pending"].as_i64().unwrap() >= 1);
    assert!(summary["total"].as_i64().unwrap() >= summary["pending"].as_i64().unwrap());
}
