#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod active_workout;
mod batch;
mod error;
mod exercise;
mod exercise_set;
mod generator;
mod history;
mod id;
mod name;
mod progress;
mod service;
mod session;
mod settings;
mod timer;
mod training;
mod user;
mod workout;

pub use active_workout::*;
pub use batch::*;
pub use error::*;
pub use exercise::*;
pub use exercise_set::*;
pub use generator::*;
pub use history::*;
pub use name::*;
pub use progress::*;
pub use service::*;
pub use session::*;
pub use settings::*;
pub use timer::*;
pub use training::*;
pub use user::*;
pub use workout::*;
