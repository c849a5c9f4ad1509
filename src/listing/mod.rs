pub mod commands;
pub mod images;
pub mod model;
pub mod pricing;
pub mod search;
pub mod wizard;
