pub mod binding;
pub mod cluster_client;
pub mod common;
pub mod node;
pub mod pod;
pub mod scheduler;
