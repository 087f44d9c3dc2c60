//! Services - orchestration between the matcher and command components

pub mod command_service;

pub use command_service::CommandService;
