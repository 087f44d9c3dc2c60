//! Component registry - turns static declarations plus config flags into the
//! active component set

use std::sync::Arc;

use crate::domain::traits::{Action, Command};
use crate::infrastructure::config::ConfigStore;

/// Master switch; when off, nothing resolves.
pub const MASTER_ENABLE_FLAG: &str = "plugin.enabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Action,
    Command,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Action => "action",
            ComponentKind::Command => "command",
        }
    }
}

/// A constructed component, handed to the host which owns its lifecycle
pub enum ComponentInstance {
    Action(Arc<dyn Action>),
    Command(Arc<dyn Command>),
}

impl ComponentInstance {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentInstance::Action(_) => ComponentKind::Action,
            ComponentInstance::Command(_) => ComponentKind::Command,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ComponentInstance::Action(a) => a.name(),
            ComponentInstance::Command(c) => c.name(),
        }
    }
}

/// Factory receives the shared config store - components get their
/// dependencies at construction, no ambient config access.
pub type ComponentFactory = fn(Arc<ConfigStore>) -> ComponentInstance;

/// Static declaration of one component
pub struct ComponentDescriptor {
    pub name: &'static str,
    pub kind: ComponentKind,
    pub enable_flag: &'static str,
    pub factory: ComponentFactory,
}

/// Ordered descriptor list; resolution preserves declaration order because
/// the host tie-breaks ambiguous matches by registration order.
#[derive(Default)]
pub struct ComponentRegistry {
    descriptors: Vec<ComponentDescriptor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ComponentDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    /// Construct the active subset for the current configuration.
    ///
    /// A disabled component is a silent, normal outcome - never an error.
    pub fn resolve(&self, config: &Arc<ConfigStore>) -> Vec<ComponentInstance> {
        if !config.get_bool(MASTER_ENABLE_FLAG, true) {
            tracing::info!("plugin disabled, no components registered");
            return Vec::new();
        }

        let mut instances = Vec::new();
        for descriptor in &self.descriptors {
            if config.get_bool(descriptor.enable_flag, true) {
                instances.push((descriptor.factory)(Arc::clone(config)));
            } else {
                tracing::debug!(
                    "{} '{}' disabled via {}",
                    descriptor.kind.as_str(),
                    descriptor.name,
                    descriptor.enable_flag
                );
            }
        }
        tracing::info!("registered {} component(s)", instances.len());
        instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{config_schema, registry};
    use crate::infrastructure::config::ConfigStore;

    fn config() -> Arc<ConfigStore> {
        Arc::new(ConfigStore::from_schema(config_schema()).expect("valid schema"))
    }

    #[test]
    fn default_config_resolves_enabled_components() {
        let instances = registry().resolve(&config());
        let names: Vec<&str> = instances.iter().map(|i| i.name()).collect();
        // config_command is off by default
        assert_eq!(
            names,
            vec!["greeting_action", "smart_response_action", "help_command"]
        );
    }

    #[test]
    fn master_flag_short_circuits_everything() {
        let config = config();
        config.set("plugin.enabled", "false").unwrap();
        assert!(registry().resolve(&config).is_empty());
    }

    #[test]
    fn feature_flag_excludes_only_its_component() {
        let config = config();
        config.set("features.enable_greetings", "false").unwrap();
        config.set("features.enable_config_command", "true").unwrap();
        let names: Vec<String> = registry()
            .resolve(&config)
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["smart_response_action", "help_command", "config_command"]
        );
    }

    #[test]
    fn kinds_match_declarations() {
        let config = config();
        config.set("features.enable_config_command", "true").unwrap();
        let instances = registry().resolve(&config);
        let kinds: Vec<ComponentKind> = instances.iter().map(|i| i.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ComponentKind::Action,
                ComponentKind::Action,
                ComponentKind::Command,
                ComponentKind::Command
            ]
        );
    }
}
