pub mod interface;
pub mod live;
pub mod simulated;
