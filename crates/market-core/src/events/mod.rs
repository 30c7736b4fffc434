pub mod seaport;

pub use seaport::{alt, primary, OrderCancelled};
