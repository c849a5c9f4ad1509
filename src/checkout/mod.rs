pub mod commands;
pub mod events;
pub mod model;
pub mod payment;
pub mod shipping;
