pub mod catalog;
pub mod models;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use libris_db::JsonFileStore;
use libris_kernel::{settings::StorageSettings, InitCtx, Module};
use serde_json::json;

use catalog::BookCatalog;

/// Catalog module: the `/books` routes over the JSON document
pub struct BooksModule {
    catalog: Arc<BookCatalog>,
}

impl BooksModule {
    pub fn new(catalog: Arc<BookCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let storage = &ctx.settings.storage;

        if storage.create_if_missing {
            let created = self
                .catalog
                .bootstrap()
                .await
                .with_context(|| format!("failed to create {}", storage.path.display()))?;
            if created {
                tracing::info!(
                    module = self.name(),
                    path = %storage.path.display(),
                    "created empty catalog"
                );
            }
        }

        // An unreadable document is reported, not fatal: list requests answer 500 until fixed.
        match self.catalog.list().await {
            Ok(books) => tracing::info!(
                module = self.name(),
                path = %storage.path.display(),
                books = books.len(),
                "books module initialized"
            ),
            Err(e) => tracing::warn!(
                module = self.name(),
                path = %storage.path.display(),
                error = %e,
                "catalog document is not readable"
            ),
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let envelope = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/BookEnvelope" }
                    }
                }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Book id",
            "schema": { "type": "integer", "format": "int64", "minimum": 0 }
        }]);

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every book in document order",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error("Catalog could not be read")
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": error("Missing fields"),
                            "500": error("Catalog could not be written")
                        }
                    }
                },
                "/books/{id}/borrow": {
                    "put": {
                        "summary": "Borrow a book",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": envelope("Book borrowed"),
                            "400": error("Book already borrowed"),
                            "404": error("Book not found"),
                            "500": error("Catalog could not be written")
                        }
                    }
                },
                "/books/{id}/return": {
                    "put": {
                        "summary": "Return a book",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": envelope("Book returned"),
                            "400": error("Book is not borrowed"),
                            "404": error("Book not found"),
                            "500": error("Catalog could not be written")
                        }
                    }
                },
                "/books/{id}": {
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": envelope("Book deleted"),
                            "404": error("Book not found"),
                            "500": error("Catalog could not be written")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64", "description": "Unique identifier" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "available": { "type": "boolean", "description": "false while lent out" }
                        },
                        "required": ["id", "title", "author", "available"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "author": { "type": "string", "minLength": 1 }
                        },
                        "required": ["title", "author"]
                    },
                    "BookEnvelope": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "book": { "$ref": "#/components/schemas/Book" }
                        },
                        "required": ["message", "book"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Catalog backed by the JSON document configured in `storage`
pub fn catalog_from_settings(storage: &StorageSettings) -> Arc<BookCatalog> {
    Arc::new(BookCatalog::new(Arc::new(JsonFileStore::new(
        storage.path.clone(),
    ))))
}

/// Create a new instance of the books module
pub fn create_module(catalog: Arc<BookCatalog>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(catalog))
}
