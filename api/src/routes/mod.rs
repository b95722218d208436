pub mod ask;
pub mod chat;
pub mod health_route;
pub mod ingest;
pub mod patient;
