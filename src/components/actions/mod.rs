//! Action components - autonomously selected per turn

pub mod greeting;
pub mod smart_response;

pub use greeting::GreetingAction;
pub use smart_response::SmartResponseAction;
