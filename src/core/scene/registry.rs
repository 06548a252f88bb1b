//=========================================================================
// Scene Registry
//=========================================================================
//
// Maps scene names to constructors.
//
// Scenes are constructed fresh for every activation, so the registry
// stores factories rather than instances. Registration overwrites any
// prior entry for the same name; it does not validate uniqueness.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::Scene;

//=== Scene Factory =======================================================

/// Zero-argument scene constructor.
///
/// Factories must be repeatable: the scheduler may construct the same
/// scene name any number of times over the program's life.
pub type SceneFactory = Box<dyn Fn() -> Box<dyn Scene> + Send>;

//=== Scene Registry ======================================================

/// Name → factory mapping used by the scheduler to construct scenes.
pub struct SceneRegistry {
    factories: HashMap<String, SceneFactory>,
}

impl SceneRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers `factory` under `name`.
    ///
    /// A prior entry for the same name is silently replaced (with a log
    /// warning); callers wanting uniqueness must check
    /// [`contains`](SceneRegistry::contains) first.
    pub fn register<N, F>(&mut self, name: N, factory: F)
    where
        N: Into<String>,
        F: Fn() -> Box<dyn Scene> + Send + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            warn!("Scene factory '{}' was already registered and has been replaced", name);
        } else {
            debug!("Registered scene factory '{}'", name);
        }
    }

    /// Removes the factory for `name`, reporting whether one existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let existed = self.factories.remove(name).is_some();
        if existed {
            debug!("Unregistered scene factory '{}'", name);
        }
        existed
    }

    //--- Construction -----------------------------------------------------

    /// Constructs a fresh scene for `name`, or None if unregistered.
    pub fn construct(&self, name: &str) -> Option<Box<dyn Scene>> {
        match self.factories.get(name) {
            Some(factory) => Some(factory()),
            None => {
                warn!("No scene factory registered for '{}'", name);
                None
            }
        }
    }

    //--- Query API --------------------------------------------------------

    /// Returns true if a factory is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no factories are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank {
        label: &'static str,
    }

    impl Scene for Blank {
        fn name(&self) -> &str {
            self.label
        }

        fn update(&mut self, _dt: f32) {}
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = SceneRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("Game"));
    }

    #[test]
    fn register_and_construct() {
        let mut registry = SceneRegistry::new();
        registry.register("Game", || Box::new(Blank { label: "Game" }));

        assert!(registry.contains("Game"));
        let scene = registry.construct("Game").unwrap();
        assert_eq!(scene.name(), "Game");
    }

    #[test]
    fn construct_unknown_name_returns_none() {
        let registry = SceneRegistry::new();
        assert!(registry.construct("Missing").is_none());
    }

    #[test]
    fn register_same_name_overwrites() {
        let mut registry = SceneRegistry::new();
        registry.register("Game", || Box::new(Blank { label: "first" }));
        registry.register("Game", || Box::new(Blank { label: "second" }));

        assert_eq!(registry.len(), 1);
        let scene = registry.construct("Game").unwrap();
        assert_eq!(scene.name(), "second");
    }

    #[test]
    fn unregister_reports_existence() {
        let mut registry = SceneRegistry::new();
        registry.register("Game", || Box::new(Blank { label: "Game" }));

        assert!(registry.unregister("Game"));
        assert!(!registry.unregister("Game"));
        assert!(!registry.contains("Game"));
    }

    #[test]
    fn factories_are_repeatable() {
        let mut registry = SceneRegistry::new();
        registry.register("Game", || Box::new(Blank { label: "Game" }));

        let first = registry.construct("Game").unwrap();
        let second = registry.construct("Game").unwrap();
        assert_eq!(first.name(), second.name());
    }
}
