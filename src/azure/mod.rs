pub mod classification_nodes;
pub mod client;
pub mod models;
pub mod projects;
pub mod pull_requests;
pub mod repositories;
pub mod work_items;
