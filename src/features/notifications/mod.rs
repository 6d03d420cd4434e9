//! Subscriber notification feature.
//!
//! Sends one email per active subscriber when a newsletter is published,
//! through a transactional email provider's HTTP API. Sends fan out with
//! bounded concurrency and individual failures are aggregated, never
//! aborting the remaining sends.

pub mod clients;
pub mod dtos;
pub mod services;

pub use clients::{EmailClient, Mailer};
pub use services::NotificationDispatcher;
