//! Module registry: the explicit list of feature modules the shell can host.
//!
//! Populated once at startup and read-only afterwards.

use std::fmt;

use crate::error::ConfigError;
use crate::module::FeatureModule;

type Factory = Box<dyn Fn() -> Box<dyn FeatureModule>>;

/// Metadata plus a constructor for one feature module.
pub struct ModuleDescriptor {
    id: String,
    display_name: String,
    icon: String,
    factory: Factory,
}

impl ModuleDescriptor {
    pub fn new<F>(
        id: impl Into<String>,
        display_name: impl Into<String>,
        icon: impl Into<String>,
        factory: F,
    ) -> Self
    where
        F: Fn() -> Box<dyn FeatureModule> + 'static,
    {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            icon: icon.into(),
            factory: Box::new(factory),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Navigation label: icon followed by the display name.
    pub fn label(&self) -> String {
        if self.icon.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} {}", self.icon, self.display_name)
        }
    }

    /// Build a fresh, unmounted instance.
    pub fn instantiate(&self) -> Box<dyn FeatureModule> {
        (self.factory)()
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    descriptors: Vec<ModuleDescriptor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. Identifiers must be unique; duplicates are rejected.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<(), ConfigError> {
        if self.position(descriptor.id()).is_some() {
            return Err(ConfigError::DuplicateIdentifier(descriptor.id().to_string()));
        }
        tracing::debug!(id = descriptor.id(), "module registered");
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    pub fn resolve(&self, id: &str) -> Result<&ModuleDescriptor, ConfigError> {
        self.descriptors
            .iter()
            .find(|d| d.id() == id)
            .ok_or_else(|| ConfigError::UnknownModule(id.to_string()))
    }

    /// Registration index of `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.id() == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.descriptors.iter().map(|d| d.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleMountError;
    use crate::module::ModuleContext;
    use eframe::egui;

    struct Blank;

    impl FeatureModule for Blank {
        fn mount(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError> {
            Ok(())
        }
        fn unmount(&mut self, _cx: &mut ModuleContext<'_>) {}
        fn ui(&mut self, _ui: &mut egui::Ui, _cx: &mut ModuleContext<'_>) {}
    }

    fn blank(id: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(id, id.to_uppercase(), "", || Box::new(Blank))
    }

    #[test]
    fn test_register_and_list_in_order() {
        let mut registry = ModuleRegistry::new();
        for id in ["c", "a", "b"] {
            registry.register(blank(id)).unwrap();
        }
        assert_eq!(registry.ids(), vec!["c", "a", "b"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.position("a"), Some(1));
    }

    #[test]
    fn test_duplicate_is_rejected_not_overwritten() {
        let mut registry = ModuleRegistry::new();
        registry
            .register(ModuleDescriptor::new("notepad", "First", "", || Box::new(Blank)))
            .unwrap();
        let err = registry
            .register(ModuleDescriptor::new("notepad", "Second", "", || Box::new(Blank)))
            .unwrap_err();

        assert_eq!(err, ConfigError::DuplicateIdentifier("notepad".into()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("notepad").unwrap().display_name(), "First");
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.resolve("paint").unwrap_err(),
            ConfigError::UnknownModule("paint".into())
        );
    }

    #[test]
    fn test_label() {
        let with_icon = ModuleDescriptor::new("n", "Notepad", "📝", || Box::new(Blank));
        assert_eq!(with_icon.label(), "📝 Notepad");
        assert_eq!(blank("x").label(), "X");
    }
}
