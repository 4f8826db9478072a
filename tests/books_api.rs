use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use libris_app::modules::{books, register_all};
use libris_app::{Book, BookCatalog};
use libris_db::{JsonFileStore, MemoryStore, Store};
use libris_kernel::{settings::Settings, InitCtx, Module, ModuleRegistry};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

// Helper to build the full application router over `store`
async fn setup_app(store: Arc<dyn Store>) -> Router {
    let settings = Settings::default();
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, &settings, Arc::new(BookCatalog::new(store)))
        .expect("Failed to register modules");
    registry
        .init_all(&InitCtx {
            settings: &settings,
        })
        .await
        .expect("Failed to init modules");
    libris_http::build_router(&registry, &settings)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn book(id: u64, title: &str, author: &str, available: bool) -> Book {
    Book {
        id,
        title: title.to_string(),
        author: author.to_string(),
        available,
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app(Arc::new(MemoryStore::with_books(vec![]))).await;

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "service": "Online Library Backend"}));
}

#[tokio::test]
async fn test_add_list_borrow_delete_scenario() {
    let app = setup_app(Arc::new(MemoryStore::with_books(vec![]))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({"id": 1, "title": "Dune", "author": "Herbert", "available": true})
    );

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"id": 1, "title": "Dune", "author": "Herbert", "available": true}])
    );

    let (status, body) = send(&app, "PUT", "/books/1/borrow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book borrowed");
    assert_eq!(body["book"]["available"], false);

    let (status, body) = send(&app, "PUT", "/books/1/borrow", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Book already borrowed"}));

    let (status, body) = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted");
    assert_eq!(body["book"]["id"], 1);
    assert_eq!(body["book"]["title"], "Dune");

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_return_round_trip_and_conflict() {
    let store = Arc::new(MemoryStore::with_books(vec![book(4, "Emma", "Austen", true)]));
    let app = setup_app(store.clone()).await;

    let (status, body) = send(&app, "PUT", "/books/4/return", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Book is not borrowed");
    assert_eq!(store.read_all().await.unwrap(), vec![book(4, "Emma", "Austen", true)]);

    send(&app, "PUT", "/books/4/borrow", None).await;
    let (status, body) = send(&app, "PUT", "/books/4/return", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book returned");
    assert_eq!(store.read_all().await.unwrap(), vec![book(4, "Emma", "Austen", true)]);
}

#[tokio::test]
async fn test_add_assigns_one_past_maximum() {
    let store = Arc::new(MemoryStore::with_books(vec![
        book(2, "Emma", "Austen", true),
        book(9, "Ulysses", "Joyce", false),
    ]));
    let app = setup_app(store.clone()).await;

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({"title": "Beloved", "author": "Morrison"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 10);
    assert_eq!(body["available"], true);
    assert_eq!(store.read_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_add_after_largest_id_answers_json_error() {
    let store = Arc::new(MemoryStore::with_books(vec![book(u64::MAX, "Last", "Anon", true)]));
    let app = setup_app(store.clone()).await;

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({"title": "Beloved", "author": "Morrison"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to add book"}));
    assert_eq!(store.read_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_rejects_missing_fields() {
    let store = Arc::new(MemoryStore::with_books(vec![]));
    let app = setup_app(store.clone()).await;

    for payload in [
        json!({"title": "Dune"}),
        json!({"author": "Herbert"}),
        json!({"title": "", "author": "Herbert"}),
        json!({}),
    ] {
        let (status, body) = send(&app, "POST", "/books", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body, json!({"error": "Missing fields"}));
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/books")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Missing fields"}));

    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let store = Arc::new(MemoryStore::with_books(vec![book(1, "Dune", "Herbert", true)]));
    let app = setup_app(store.clone()).await;

    for (method, uri) in [
        ("PUT", "/books/7/borrow"),
        ("PUT", "/books/7/return"),
        ("DELETE", "/books/7"),
        ("PUT", "/books/abc/borrow"),
        ("DELETE", "/books/-1"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "Book not found");
    }

    assert_eq!(
        store.read_all().await.unwrap(),
        vec![book(1, "Dune", "Herbert", true)]
    );
}

#[tokio::test]
async fn test_integral_numeric_ids_are_accepted() {
    let store = Arc::new(MemoryStore::with_books(vec![book(1, "Dune", "Herbert", true)]));
    let app = setup_app(store.clone()).await;

    let (status, body) = send(&app, "PUT", "/books/1.0/borrow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["id"], 1);

    let (status, _) = send(&app, "PUT", "/books/+1/return", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", "/books/%201", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted");
    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreadable_document_is_internal_error() {
    let path = std::env::temp_dir().join(format!("libris-api-{}.json", std::process::id()));
    std::fs::write(&path, "not a book list").unwrap();
    let app = setup_app(Arc::new(JsonFileStore::new(&path))).await;

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to read books");

    let (status, body) = send(&app, "PUT", "/books/1/borrow", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to borrow book");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_missing_document_is_created_on_init() {
    let dir = std::env::temp_dir().join(format!("libris-init-{}", std::process::id()));
    let path = dir.join("nested").join("books.json");
    let _ = std::fs::remove_dir_all(&dir);

    let mut settings = Settings::default();
    settings.storage.path = path.clone();
    let module = books::create_module(books::catalog_from_settings(&settings.storage));
    module
        .init(&InitCtx {
            settings: &settings,
        })
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_openapi_lists_book_routes() {
    let app = setup_app(Arc::new(MemoryStore::with_books(vec![]))).await;

    let (status, spec) = send(&app, "GET", "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    for path in ["/books", "/books/{id}/borrow", "/books/{id}/return", "/books/{id}"] {
        assert!(spec["paths"][path].is_object(), "missing {path}");
    }
    assert!(spec["components"]["schemas"]["Book"].is_object());
}
