//! Domain models for the Mulch Dispatch platform

mod problem;
mod product;
mod route;
mod scout;
mod stop;
mod truck;

pub use problem::*;
pub use product::*;
pub use route::*;
pub use scout::*;
pub use stop::*;
pub use truck::*;
