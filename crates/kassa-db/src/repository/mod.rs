//! # Repository Module
//!
//! Database repository implementations for Kassa POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().search("cable", 10)                             │
//! │       ▼                                                                 │
//! │  ProductRepository                      SaleRepository                 │
//! │  ├── search(term, limit)                ├── create(payload)            │
//! │  ├── list_all()                         ├── get_by_id(id)              │
//! │  ├── get_by_id(id)                      ├── replace(id, payload)       │
//! │  ├── insert / insert_bulk               └── list(status)               │
//! │  └── update / delete                                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod sale;
