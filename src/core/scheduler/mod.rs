pub mod context;
pub mod cycle_state;
pub mod interface;
pub mod kube_scheduler;
pub mod plugin;
pub mod rl_score;
