//! Business logic services for the Mulch Dispatch server

pub mod dashboard;
pub mod delivery;
pub mod problem;
pub mod product;
pub mod route;
pub mod scout;
pub mod stop;
pub mod truck;

