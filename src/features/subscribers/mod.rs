//! Newsletter subscriber feature.
//!
//! Public subscribe/unsubscribe endpoints plus admin listing and removal.
//! Email uniqueness is enforced at the store level; duplicate subscriptions
//! are rejected with a conflict, never merged.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/subscribers` | Subscribe an email address |
//! | GET | `/api/subscribers` | List all subscribers |
//! | DELETE | `/api/subscribers/{id}` | Remove a subscriber |
//! | POST | `/api/subscribers/unsubscribe` | Deactivate by email (idempotent) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::SubscriberService;
