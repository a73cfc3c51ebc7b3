//! HTTP handlers for the Mulch Dispatch API

pub mod dashboard;
pub mod delivery;
pub mod health;
pub mod problem;
pub mod product;
pub mod route;
pub mod scout;
pub mod stop;
pub mod truck;

pub use dashboard::*;
pub use delivery::*;
pub use health::*;
pub use problem::*;
pub use product::*;
pub use route::*;
pub use scout::*;
pub use stop::*;
pub use truck::*;
