pub mod admin;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod database;
pub mod error;
pub mod event_store;
pub mod handlers;
pub mod listing;
pub mod message_broker;
pub mod messaging;
pub mod payout;
pub mod profile;
pub mod query;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod storage;
