mod dispatcher_service;

pub use dispatcher_service::NotificationDispatcher;
