//! Extensions: versioned plug-ins that register Types, `ActionId`s,
//! `CompilerReturnCode`s, and checkers (`spec.md` §4.2, §4.9).
//!
//! Extensions load independently and in any order, so cross-extension
//! hookups ("extension B wants to contribute an `Addon` to extension A's
//! types") can't assume load order. `ExtensionRegistry::register_addon`
//! records a callback that fires for every extension as it loads — including
//! ones already loaded at registration time — so it doesn't matter whether
//! the Addon or its target extension shows up first.

use semver::{Version, VersionReq};

use crate::error::ExtensionLoadError;

/// One extension's declared dependency on another, by name and a `semver`
/// requirement against that extension's reported version.
pub struct ExtensionDependency {
    pub name: &'static str,
    pub requirement: VersionReq,
}

/// A versioned plug-in. Extensions contribute Types/Actions/Codes through
/// whatever registration calls they make against an `IR`/`Compiler` during
/// loading; this trait only carries the identity `ExtensionRegistry` needs
/// to order and gate that loading.
pub trait Extension: Send + Sync {
    fn name(&self) -> &'static str;
    fn version(&self) -> Version;

    /// Other extensions (by name + required version range) this one needs
    /// already loaded before it can load itself.
    fn dependencies(&self) -> Vec<ExtensionDependency> {
        Vec::new()
    }
}

struct LoadedExtension {
    name: String,
    version: Version,
}

/// Tracks which extensions have loaded and runs cross-extension
/// notification when a new one does.
#[derive(Default)]
pub struct ExtensionRegistry {
    loaded: Vec<LoadedExtension>,
    addons: Vec<Box<dyn Fn(&str, &Version) + Send + Sync>>,
}

impl ExtensionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.iter().any(|e| e.name == name)
    }

    #[must_use]
    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.loaded.iter().find(|e| e.name == name).map(|e| &e.version)
    }

    /// Verifies `dependency` is satisfied by what's already loaded.
    pub fn check_dependency(&self, dependency: &ExtensionDependency) -> Result<(), ExtensionLoadError> {
        match self.version_of(dependency.name) {
            Some(found) if dependency.requirement.matches(found) => Ok(()),
            Some(found) => Err(ExtensionLoadError::UnsatisfiedDependency {
                dependency: dependency.name,
                required: dependency.requirement.to_string(),
                found: found.to_string(),
            }),
            None => Err(ExtensionLoadError::UnsatisfiedDependency {
                dependency: dependency.name,
                required: dependency.requirement.to_string(),
                found: "not loaded".to_string(),
            }),
        }
    }

    /// Loads `extension`: checks its declared dependencies, records it, and
    /// runs every registered Addon callback (`notify_new_extension`) against
    /// it. Fails without recording anything if a dependency is unsatisfied
    /// or the extension is already loaded.
    pub fn load(&mut self, extension: &dyn Extension) -> Result<(), ExtensionLoadError> {
        if self.is_loaded(extension.name()) {
            return Err(ExtensionLoadError::AlreadyLoaded { name: extension.name() });
        }
        for dependency in extension.dependencies() {
            self.check_dependency(&dependency)?;
        }
        self.loaded.push(LoadedExtension { name: extension.name().to_string(), version: extension.version() });
        self.notify_addons(extension.name(), &extension.version());
        Ok(())
    }

    /// Registers an Addon callback, firing it immediately for every
    /// extension already loaded so registration order never matters.
    pub fn register_addon(&mut self, callback: impl Fn(&str, &Version) + Send + Sync + 'static) {
        for loaded in &self.loaded {
            callback(&loaded.name, &loaded.version);
        }
        self.addons.push(Box::new(callback));
    }

    fn notify_addons(&self, name: &str, version: &Version) {
        for addon in &self.addons {
            addon(name, version);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Base;
    impl Extension for Base {
        fn name(&self) -> &'static str {
            "forgeir.test.base"
        }
        fn version(&self) -> Version {
            Version::new(1, 0, 0)
        }
    }

    struct NeedsBase(VersionReq);
    impl Extension for NeedsBase {
        fn name(&self) -> &'static str {
            "forgeir.test.needs-base"
        }
        fn version(&self) -> Version {
            Version::new(1, 0, 0)
        }
        fn dependencies(&self) -> Vec<ExtensionDependency> {
            vec![ExtensionDependency { name: "forgeir.test.base", requirement: self.0.clone() }]
        }
    }

    #[test]
    fn loading_twice_is_rejected() {
        let mut registry = ExtensionRegistry::new();
        registry.load(&Base).unwrap();
        assert!(registry.load(&Base).is_err());
    }

    #[test]
    fn an_unsatisfied_dependency_blocks_loading() {
        let mut registry = ExtensionRegistry::new();
        let needs = NeedsBase(VersionReq::parse(">=1.0.0").unwrap());
        assert!(registry.load(&needs).is_err());
        registry.load(&Base).unwrap();
        assert!(registry.load(&needs).is_ok());
    }

    #[test]
    fn a_version_mismatch_is_reported_precisely() {
        let mut registry = ExtensionRegistry::new();
        registry.load(&Base).unwrap();
        let needs = NeedsBase(VersionReq::parse(">=2.0.0").unwrap());
        let err = registry.load(&needs).unwrap_err();
        assert!(matches!(err, ExtensionLoadError::UnsatisfiedDependency { .. }));
    }

    #[test]
    fn addons_fire_regardless_of_registration_order() {
        let registered_after = Arc::new(AtomicUsize::new(0));
        let registered_before = Arc::new(AtomicUsize::new(0));

        let mut registry = ExtensionRegistry::new();
        let before = Arc::clone(&registered_before);
        registry.register_addon(move |_name, _version| {
            before.fetch_add(1, Ordering::SeqCst);
        });
        registry.load(&Base).unwrap();

        let after = Arc::clone(&registered_after);
        registry.register_addon(move |_name, _version| {
            after.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(registered_before.load(Ordering::SeqCst), 1);
        assert_eq!(registered_after.load(Ordering::SeqCst), 1);
    }
}
