use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use plateau_api::app;
use plateau_api::middleware::auth::Claims;
use plateau_api::state::{AppState, AuthConfig, CatalogPaging};
use plateau_catalog::{BulkTier, Product, ProductCategory, ProductDraft};
use plateau_order::{LogNotifier, MemoryStore, OrderService};

const TEST_SECRET: &str = "integration-test-secret";

fn product(name: &str, price_kobo: i64, stock: i64, tiers: Vec<BulkTier>) -> Product {
    Product::from_draft(ProductDraft {
        name: name.to_string(),
        description: format!("{name} from the plateau"),
        price_kobo,
        category: ProductCategory::Fresh,
        weight: "1kg".to_string(),
        stock,
        images: vec![],
        origin: "Jos".to_string(),
        is_active: true,
        bulk_pricing: tiers,
    })
}

fn tier(min_quantity: u32, discount: f64) -> BulkTier {
    BulkTier {
        min_quantity,
        discount,
    }
}

fn test_app(products: Vec<Product>) -> Router {
    let store = Arc::new(MemoryStore::with_products(products));
    let service = Arc::new(OrderService::new(
        store.clone(),
        store.clone(),
        Arc::new(LogNotifier),
    ));
    app(AppState {
        catalog: store,
        orders: service,
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            expiration: 3600,
        },
        paging: CatalogPaging {
            page_size: 10,
            max_page_size: 100,
        },
    })
}

fn token_for(sub: &str, role: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        name: Some("Test User".to_string()),
        email: Some(format!("{sub}@example.com")),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"));
    match body {
        Some(value) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn checkout_body(product_id: Uuid, quantity: i64) -> Value {
    json!({
        "items": [{ "product": product_id, "quantity": quantity }],
        "shippingAddress": {
            "street": "14 Farin Gada Road",
            "city": "Jos",
            "state": "Plateau",
            "zipCode": "930105",
            "phone": "08012345678"
        }
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app(vec![]);
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn catalog_listing_is_public_and_paginated() {
    let app = test_app(vec![
        product("Premium Plateau Potatoes", 1_500_000, 100, vec![]),
        product("Small Plateau Potatoes", 800_000, 150, vec![]),
        product("Plateau Potato Seeds", 2_500_000, 50, vec![]),
    ]);

    let response = app.clone().oneshot(get("/api/products")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["products"].as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(get("/api/products?limit=2&page=2"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let response = app
        .oneshot(get("/api/products?search=seeds"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["products"][0]["name"], "Plateau Potato Seeds");
}

#[tokio::test]
async fn product_detail_reports_missing_products() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![tier(5, 5.0)]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/products/{spuds_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Irish Potatoes");
    assert_eq!(body["price"], 1000);
    assert_eq!(body["bulkPricing"][0]["minQuantity"], 5);

    let response = app
        .oneshot(get(&format!("/api/products/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn checkout_prices_discounts_and_decrements() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![tier(10, 10.0)]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);
    let token = token_for("alice", "customer");

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/orders",
            &token,
            Some(checkout_body(spuds_id, 12)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["totalAmount"], 10_800);
    assert_eq!(body["discount"], 1200);
    assert_eq!(body["currency"], "NGN");
    assert_eq!(body["paymentStatus"], "pending");
    assert_eq!(body["orderStatus"], "pending");
    assert!(body["reference"].as_str().unwrap().starts_with("PP-"));
    assert_eq!(body["items"][0]["unitPrice"], 1000);
    assert_eq!(body["items"][0]["quantity"], 12);
    assert_eq!(body["items"][0]["lineTotal"], 10_800);
    assert_eq!(body["shippingAddress"]["zipCode"], "930105");

    let response = app
        .oneshot(get(&format!("/api/products/{spuds_id}")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["stock"], 8);
}

#[tokio::test]
async fn checkout_requires_a_valid_token() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("Content-Type", "application/json")
        .body(Body::from(checkout_body(spuds_id, 1).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Access token required");

    let response = app
        .oneshot(authed(
            "POST",
            "/api/orders",
            "not-a-real-token",
            Some(checkout_body(spuds_id, 1)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn checkout_rejects_overdraw_without_consuming_stock() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);
    let token = token_for("alice", "customer");

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/orders",
            &token,
            Some(checkout_body(spuds_id, 25)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Insufficient stock"));
    assert!(message.contains("requested 25"));
    assert!(message.contains("available 20"));

    let response = app
        .oneshot(get(&format!("/api/products/{spuds_id}")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["stock"], 20);
}

#[tokio::test]
async fn checkout_rejects_malformed_carts() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);
    let token = token_for("alice", "customer");

    // Empty cart
    let mut body = checkout_body(spuds_id, 1);
    body["items"] = json!([]);
    let response = app
        .clone()
        .oneshot(authed("POST", "/api/orders", &token, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Zero quantity
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/orders",
            &token,
            Some(checkout_body(spuds_id, 0)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown product
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/orders",
            &token,
            Some(checkout_body(Uuid::new_v4(), 1)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Product not found"));

    // Street missing from the address
    let mut body = checkout_body(spuds_id, 1);
    body["shippingAddress"]["street"] = json!("");
    let response = app
        .oneshot(authed("POST", "/api/orders", &token, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_access_is_scoped_to_its_owner() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);
    let alice = token_for("alice", "customer");
    let bob = token_for("bob", "customer");
    let admin = token_for("admin-1", "admin");

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/orders",
            &alice,
            Some(checkout_body(spuds_id, 1)),
        ))
        .await
        .unwrap();
    let order = body_json(response).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed("GET", &format!("/api/orders/{order_id}"), &bob, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed(
            "GET",
            &format!("/api/orders/{order_id}"),
            &alice,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed(
            "GET",
            &format!("/api/orders/{order_id}"),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed(
            "GET",
            &format!("/api/orders/{}", Uuid::new_v4()),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_history_is_scoped_and_newest_first() {
    let spuds = product("Irish Potatoes", 1000, 100, vec![]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);
    let alice = token_for("alice", "customer");
    let bob = token_for("bob", "customer");

    let mut ids = Vec::new();
    for token in [&alice, &bob, &alice] {
        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/orders",
                token,
                Some(checkout_body(spuds_id, 1)),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    let response = app
        .oneshot(authed("GET", "/api/orders", &alice, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["id"], ids[2].as_str());
    assert_eq!(history[1]["id"], ids[0].as_str());
}

#[tokio::test]
async fn admin_order_surfaces_require_the_admin_role() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);
    let alice = token_for("alice", "customer");
    let admin = token_for("admin-1", "admin");

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/orders",
            &alice,
            Some(checkout_body(spuds_id, 1)),
        ))
        .await
        .unwrap();
    let order = body_json(response).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/orders/admin/all", &alice, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Forbidden: Admins only");

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/orders/admin/all", &admin, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(authed(
            "PUT",
            &format!("/api/orders/admin/orders/{order_id}"),
            &alice,
            Some(json!({ "status": "shipped" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_updates_fulfillment_status_only() {
    let spuds = product("Irish Potatoes", 1000, 20, vec![]);
    let spuds_id = spuds.id;
    let app = test_app(vec![spuds]);
    let alice = token_for("alice", "customer");
    let admin = token_for("admin-1", "admin");

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/orders",
            &alice,
            Some(checkout_body(spuds_id, 1)),
        ))
        .await
        .unwrap();
    let order = body_json(response).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/orders/admin/orders/{order_id}"),
            &admin,
            Some(json!({ "status": "shipped" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["orderStatus"], "shipped");
    assert_eq!(body["paymentStatus"], "pending");
    assert_eq!(body["totalAmount"], order["totalAmount"]);

    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/orders/admin/orders/{order_id}"),
            &admin,
            Some(json!({ "status": "teleported" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid order status: teleported");

    let response = app
        .oneshot(authed(
            "PUT",
            &format!("/api/orders/admin/orders/{}", Uuid::new_v4()),
            &admin,
            Some(json!({ "status": "shipped" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_manages_the_catalog() {
    let app = test_app(vec![]);
    let alice = token_for("alice", "customer");
    let admin = token_for("admin-1", "admin");

    let new_product = json!({
        "name": "Roasted Potato Chips",
        "description": "Crunchy chips made from plateau potatoes.",
        "price": 350_000,
        "category": "processed",
        "weight": "500g",
        "stock": 40,
        "bulkPricing": [{ "minQuantity": 10, "discount": 10 }]
    });

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/admin/products",
            &alice,
            Some(new_product.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/admin/products",
            &admin,
            Some(new_product.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let product_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["origin"], "Jos Plateau");
    assert_eq!(created["isActive"], true);

    let mut updated_body = new_product.clone();
    updated_body["price"] = json!(400_000);
    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/admin/products/{product_id}"),
            &admin,
            Some(updated_body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["price"], 400_000);
    assert_eq!(updated["id"], created["id"]);

    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/admin/products/{product_id}"),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Product removed");

    let response = app
        .oneshot(get(&format!("/api/products/{product_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_product_payloads_are_validated() {
    let app = test_app(vec![]);
    let admin = token_for("admin-1", "admin");

    let mut bad_category = json!({
        "name": "Mystery Tubers",
        "description": "Unclassifiable.",
        "price": 1000,
        "category": "exotic",
        "weight": "1kg"
    });
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/admin/products",
            &admin,
            Some(bad_category.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("unknown category"));

    bad_category["category"] = json!("fresh");
    bad_category["name"] = json!("   ");
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/admin/products",
            &admin,
            Some(bad_category),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Tier discounts above 100 percent are impossible
    let bad_tier = json!({
        "name": "Generous Tubers",
        "description": "Too good to be true.",
        "price": 1000,
        "category": "fresh",
        "weight": "1kg",
        "bulkPricing": [{ "minQuantity": 5, "discount": 150 }]
    });
    let response = app
        .oneshot(authed("POST", "/api/admin/products", &admin, Some(bad_tier)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
