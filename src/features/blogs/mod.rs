//! Blog post feature.
//!
//! CRUD over blog posts with an optional cover image stored alongside
//! newsletter artifacts.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/blogs` | Create (multipart, optional `image`) |
//! | GET | `/api/blogs` | List, newest first |
//! | GET | `/api/blogs/{id}` | Fetch one |
//! | PUT | `/api/blogs/{id}` | Partial update (multipart) |
//! | DELETE | `/api/blogs/{id}` | Delete post and cover image |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use handlers::BlogState;
pub use routes::routes;
pub use services::BlogService;
