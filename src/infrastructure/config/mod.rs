//! Configuration management - schema-driven store with typed coercion

pub mod schema;
pub mod store;

pub use schema::{ConfigField, ConfigSchema, ConfigSection, ConfigValue, FieldType};
pub use store::{ConfigEntry, ConfigStore};
