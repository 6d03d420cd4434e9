//! Newsletter publication feature.
//!
//! A newsletter is either a single uploaded PDF or a `template_index` plus an
//! ordered list of sections, each with text and images. Uploaded artifacts
//! live on disk under the upload directory; database records and artifacts
//! are kept consistent by always writing files before records and cleaning
//! up best-effort in the other direction.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/newsletters` | Create (multipart: PDF or sections+images) |
//! | GET | `/api/newsletters` | List, newest first, optional published filter |
//! | GET | `/api/newsletters/{id}` | Fetch one |
//! | PUT | `/api/newsletters/{id}` | Partial update (multipart) |
//! | DELETE | `/api/newsletters/{id}` | Delete record and artifacts |
//! | GET | `/api/newsletters/{id}/download` | Download the stored PDF |
//! | POST | `/api/newsletters/{id}/send` | Notify active subscribers |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use handlers::NewsletterState;
pub use routes::routes;
pub use services::NewsletterService;
