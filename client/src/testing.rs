//! Local stand-in for the REST backend, served by axum on an ephemeral port.

use std::{collections::HashMap, rc::Rc, time::Duration};
use axum::{
  extract::{Path, Query},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
  routing::{delete, get, post},
  Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
  api::auth::AuthResponse,
  config::ApiConfig,
  dispatch::{Dispatcher, RecordingNavigator},
  session::{Role, SessionContext},
};

fn api_error(status: StatusCode, error: &str, message: &str, path: &str) -> impl IntoResponse {
  (status, Json(json!({
    "error": error,
    "status": status.as_u16(),
    "message": message,
    "path": path,
    "timestamp": "2025-06-02T10:15:30"
  })))
}

fn customer(id: u32, first: &str, last: &str) -> Value {
  json!({
    "customerId": id,
    "firstName": first,
    "lastName": last,
    "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
    "identityNumber": "12345678901",
    "tradingPermission": "FULL",
    "tradingEnabled": true,
    "accounts": [{
      "accountId": id * 10,
      "accountType": "INDIVIDUAL",
      "cashBalance": { "balanceId": id, "freeBalance": 1500.25, "blockedBalance": 100, "totalBalance": 1600.25 },
      "equities": [{
        "equityId": 3, "assetCode": "THYAO.E", "assetName": "Turk Hava Yollari",
        "totalQuantity": 40, "averageCost": 250.5, "closePrice": 262.75, "profitLossPercentage": 4.89
      }]
    }],
    "createdAt": "2025-05-01T09:00:00",
    "updatedAt": "2025-05-02T09:00:00"
  })
}

#[derive(Deserialize)]
struct SearchParams {
  search: Option<String>,
  size: Option<u32>,
}

async fn search_customers(Query(params): Query<SearchParams>) -> Json<Value> {
  let all = vec![customer(1, "Ayse", "Yilmaz"), customer(2, "Mehmet", "Demir"), customer(3, "Ayla", "Kaya")];
  let needle = params.search.unwrap_or_default().to_lowercase();
  let content: Vec<Value> = all.into_iter()
    .filter(|c| c["firstName"].as_str().unwrap_or_default().to_lowercase().contains(&needle))
    .take(params.size.unwrap_or(10) as usize)
    .collect();
  Json(json!({ "content": content, "totalElements": content.len(), "totalPages": 1, "number": 0, "size": 10 }))
}

async fn login(Json(body): Json<Value>) -> axum::response::Response {
  match body["email"].as_str() {
    Some("trader@fintra.com.tr") => Json(json!({
      "token": "jwt-trader", "email": "trader@fintra.com.tr", "role": "ROLE_TRADER",
      "id": 4, "firstName": "Ayse", "lastName": "Yilmaz"
    })).into_response(),
    _ => api_error(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid email or password", "/api/v1/auth/login").into_response(),
  }
}

async fn place_order(Json(body): Json<Value>) -> axum::response::Response {
  if body["orderQuantity"].as_u64().unwrap_or(0) > 1_000 {
    return api_error(StatusCode::EXPECTATION_FAILED, "Expectation Failed", "Insufficient free balance for order", "/api/v1/equity-order").into_response();
  }
  Json(json!({
    "orderId": 501,
    "accountId": body["accountId"],
    "equityId": body["equityId"],
    "orderSide": body["orderSide"],
    "orderQuantity": body["orderQuantity"],
    "price": body["price"],
    "finalStatus": "PENDING",
    "entryDate": "2025-06-02T10:15:30",
    "orderDate": "2025-06-02",
    "orderType": body["orderType"]
  })).into_response()
}

fn stored_order(order_id: u32) -> Value {
  json!({
    "orderId": order_id, "accountId": 10, "equityId": 3, "orderSide": "BUY",
    "orderQuantity": 10, "price": 261.5, "finalStatus": "PENDING",
    "entryDate": "2025-06-02T10:15:30", "orderDate": "2025-06-02", "orderType": "LIMIT"
  })
}

fn book(equity_id: u32, excluded: Option<u32>) -> Value {
  let bids: Vec<Value> = [(11, 262.5, 100, 26250), (13, 261.5, 10, 2615)]
    .into_iter()
    .filter(|(id, ..)| Some(*id) != excluded)
    .map(|(id, price, amount, total)| json!({ "orderId": id, "price": price, "amount": amount, "total": total }))
    .collect();
  json!({
    "equityId": equity_id, "equityCode": "THYAO.E",
    "bids": bids,
    "asks": [{ "orderId": 12, "price": 263.0, "amount": 50, "total": 13150 }]
  })
}

fn trader(customer_ids: &[u32]) -> Value {
  let customers: Vec<Value> = customer_ids.iter().map(|id| customer(*id, "Ayse", "Yilmaz")).collect();
  json!({
    "id": 4, "email": "trader@fintra.com.tr", "firstName": "Ayse", "lastName": "Yilmaz",
    "role": "ROLE_TRADER", "enabled": true, "customers": customers
  })
}

fn requested_ids(body: &Value) -> Vec<u32> {
  body["customerIds"].as_array()
    .map(|ids| ids.iter().filter_map(|id| id.as_u64()).map(|id| id as u32).collect())
    .unwrap_or_default()
}

fn backend() -> Router {
  let api = Router::new()
    .route("/echo-auth", get(|headers: HeaderMap| async move {
      let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or("").to_string();
      Json(json!(auth))
    }))
    .route("/employees-only", get(|| async {
      api_error(StatusCode::FORBIDDEN, "Forbidden", "Access denied - Insufficient privileges", "/api/v1/employees-only")
    }))
    .route("/expired", delete(|| async {
      api_error(StatusCode::UNAUTHORIZED, "Unauthorized", "Token expired", "/api/v1/expired")
    }))
    .route("/cash/withdraw", post(|| async {
      api_error(StatusCode::PRECONDITION_FAILED, "Precondition Failed", "Insufficient free balance", "/api/v1/cash/withdraw")
    }))
    .route("/cash/deposit", post(|| async { StatusCode::OK }))
    .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
    .route("/boom", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "") }))
    .route("/slow-unauthorized", get(|| async {
      tokio::time::sleep(Duration::from_secs(2)).await;
      StatusCode::UNAUTHORIZED
    }))
    .route("/auth/login", post(login))
    .route("/password/reset-request", post(|| async { Json(json!({ "message": "Reset code sent" })) }))
    .route("/password/verify-token", post(|Json(body): Json<Value>| async move {
      match body["token"].as_str() {
        Some("123456") => Json(json!({ "message": "Code verified" })).into_response(),
        _ => api_error(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid or expired code", "/api/v1/password/verify-token").into_response(),
      }
    }))
    .route("/password/reset-complete", post(|| async { Json(json!({ "message": "Password updated" })) }))
    .route("/customers", get(search_customers))
    .route("/customers/{id}", get(|Path(id): Path<u32>| async move { Json(customer(id, "Ayse", "Yilmaz")) }))
    .route("/accounts/{id}", delete(|| async { StatusCode::NO_CONTENT }))
    .route("/equity-order", post(place_order))
    .route("/equity-order/{id}", get(|Path(id): Path<u32>| async move { Json(stored_order(id)) })
      .patch(|Path(id): Path<u32>, Json(body): Json<Value>| async move {
        let mut order = stored_order(id);
        order["orderQuantity"] = body["orderQuantity"].clone();
        order["price"] = body["price"].clone();
        order["orderType"] = body["orderType"].clone();
        order["finalStatus"] = json!("UPDATED");
        Json(order)
      })
      .delete(|| async { StatusCode::NO_CONTENT }))
    .route("/order-histories", get(|Query(q): Query<HashMap<String, String>>| async move {
      let entries: Vec<Value> = [(1, 13, 3, "PENDING"), (2, 14, 5, "FILLED")]
        .into_iter()
        .filter(|(_, _, equity, _)| q.get("equityId").map_or(true, |e| *e == equity.to_string()))
        .map(|(history, order, equity, status)| json!({
          "historyId": history, "orderId": order, "accountId": 10, "equityId": equity,
          "firstName": "Ayse", "lastName": "Yilmaz", "orderStatus": status,
          "orderSide": "BUY", "orderType": "LIMIT", "oldOrderQuantity": 10, "oldPrice": 261.5,
          "transactionTime": "2025-06-02T10:15:30"
        }))
        .collect();
      Json(json!({ "content": entries, "totalElements": entries.len(), "totalPages": 1, "number": 0, "size": 20 }))
    }))
    .route("/orderbook/{equity_id}", get(|Path(equity_id): Path<u32>| async move { Json(book(equity_id, None)) }))
    .route("/orderbook/{equity_id}/exclude/{order_id}", get(|Path((equity_id, order_id)): Path<(u32, u32)>| async move {
      Json(book(equity_id, Some(order_id)))
    }))
    .route("/equities/{code}/info", get(|Path(code): Path<String>| async move {
      Json(json!({
        "equityId": 3, "assetCode": code, "ticker": "THYAO", "equityName": "Turk Hava Yollari",
        "market": "BIST", "country": "TR", "participation": true
      }))
    }))
    .route("/other-institution", get(|| async {
      Json(json!([{ "id": 1, "name": "Ziraat Yatirim" }, { "id": 2, "name": "Garanti BBVA Yatirim" }]))
    }))
    .route("/equity-transfers/portfolio-to-portfolio", post(|Json(body): Json<Value>| async move {
      if body["transferQuantity"].as_u64().unwrap_or(0) > 40 {
        return api_error(StatusCode::PRECONDITION_FAILED, "Precondition Failed", "Insufficient free quantity", "/api/v1/equity-transfers/portfolio-to-portfolio").into_response();
      }
      Json(json!({ "message": "Transfer completed" })).into_response()
    }))
    .route("/users", get(|| async {
      Json(json!({
        "content": [{
          "id": 4, "email": "trader@fintra.com.tr", "firstName": "Ayse", "lastName": "Yilmaz",
          "role": "ROLE_TRADER", "enabled": true, "customers": [customer(1, "Ayse", "Yilmaz")]
        }],
        "totalElements": 1, "totalPages": 1, "number": 0, "size": 10
      }))
    }).post(|Json(body): Json<Value>| async move {
      (StatusCode::CREATED, Json(json!({
        "id": 9, "email": body["email"], "firstName": body["firstName"], "lastName": body["lastName"],
        "role": body["role"], "enabled": true
      })))
    }))
    .route("/users/{id}", get(|| async { Json(trader(&[1, 3])) })
      .patch(|Json(body): Json<Value>| async move {
        let mut employee = trader(&[1, 3]);
        if let Some(fields) = body.as_object() {
          for (key, value) in fields {
            employee[key] = value.clone();
          }
        }
        Json(employee)
      }))
    .route("/users/{id}/customers", post(|Json(body): Json<Value>| async move {
      let mut ids = vec![1];
      ids.extend(requested_ids(&body));
      Json(trader(&ids))
    }).delete(|Json(body): Json<Value>| async move {
      let removed = requested_ids(&body);
      let kept: Vec<u32> = [1, 3].into_iter().filter(|id| !removed.contains(id)).collect();
      Json(trader(&kept))
    }))
    .route("/users/{id}/customers/all", delete(|| async { Json(trader(&[])) }))
    .route("/trades/settled", get(|| async {
      Json(json!([
        {
          "tradeId": 1, "matchId": 7, "equityOrderId": 13, "tradeQuantity": 5,
          "price": 261.5, "commission": 2.5, "transactionTime": "2025-06-02T10:20:00"
        },
        { "tradeId": 2, "matchId": null, "equityOrderId": 14, "tradeQuantity": 3, "price": 100, "commission": null }
      ]))
    }))
    .route("/system-date", get(|| async { Json(json!("2025-06-02")) }))
    .route("/system-date/trigger-eod", post(|| async {
      Json(json!({ "systemDate": "2025-06-02", "dateAfterEod": "2025-06-03", "message": "End of day completed" }))
    }))
    .route("/system-date/reset-to-today", post(|| async { Json(json!("2025-06-02")) }))
    .route("/report/portfolio", get(|Query(q): Query<HashMap<String, String>>| async move {
      Json(json!({
        "accountId": q.get("accountId").and_then(|s| s.parse::<u32>().ok()),
        "userFullName": "Ayse Yilmaz", "accountType": "INDIVIDUAL", "identityNumber": "12345678901",
        "freeCash": 1500.25, "blockedCash": 100, "totalCash": 1600.25,
        "holdings": [{
          "equityId": 3, "symbol": "THYAO.E", "freeQty": 40, "blockedQty": 0, "totalQty": 40,
          "avgCost": 250.5, "costBasis": 10020, "lastClosePrice": 262.75, "marketValue": 10510,
          "unrealizedPnl": 490, "unrealizedPnlPct": 4.89
        }],
        "holdingsValue": 10510, "portfolioValue": 12110.25, "totalUnrealizedPnl": 490, "totalUnrealizedPnlPct": 4.89
      }))
    }));

  Router::new().nest("/api/v1", api)
}

/// Serves the fake backend and returns its API base URL.
pub async fn spawn_backend() -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
  let addr = listener.local_addr().expect("listener address");
  tokio::spawn(async move {
    axum::serve(listener, backend()).await.expect("test backend crashed");
  });
  format!("http://{}/api/v1", addr)
}

/// Dispatcher against `base` with a session already established for `role`.
pub fn logged_in(base: &str, role: Role) -> (Dispatcher, Rc<RecordingNavigator>) {
  let session = SessionContext::in_memory();
  session.establish(&AuthResponse {
    token: format!("token-{}", role),
    role,
    id: Some(1),
    email: Some("user@fintra.com.tr".to_string()),
    first_name: Some("Test".to_string()),
    last_name: Some("User".to_string()),
  });
  anonymous_with(base, session)
}

pub fn anonymous(base: &str) -> (Dispatcher, Rc<RecordingNavigator>) {
  anonymous_with(base, SessionContext::in_memory())
}

fn anonymous_with(base: &str, session: SessionContext) -> (Dispatcher, Rc<RecordingNavigator>) {
  let nav = Rc::new(RecordingNavigator::new());
  let dispatcher = Dispatcher::new(Rc::new(ApiConfig::new(base)), session, nav.clone());
  (dispatcher, nav)
}
