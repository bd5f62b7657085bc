use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{KnitlineError, KnitlineResult};
use crate::plugin::api::{HostUi, KnitPlugin};

/// Factory producing a plugin instance; registered per plugin name.
pub type PluginFactory = Box<dyn Fn() -> Arc<dyn KnitPlugin>>;

/// Discovery metadata carried by a plugin package's `plugin.json`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PluginManifest {
    /// Plugin name; must match a registered factory.
    pub name: String,
    /// Disabled plugins are registered but never auto-activated.
    #[serde(default)]
    pub disabled: bool,
}

/// Registry view of one discovered plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Plugin name.
    pub name: String,
    /// Disabled marker from the manifest.
    pub disabled: bool,
    /// Whether the registry has activated this plugin.
    pub active: bool,
}

struct RegisteredPlugin {
    descriptor: PluginDescriptor,
    instance: Arc<dyn KnitPlugin>,
}

/// Holds the set of known knitting-protocol plugins and the single enabled
/// one the rest of the system addresses.
///
/// Plugins are made known in two steps: factories are registered in code
/// (`register`), then `discover` matches on-disk plugin packages against the
/// registered names. A manifest marked disabled yields a descriptor but is
/// never auto-activated.
#[derive(Default)]
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
    plugins: BTreeMap<String, RegisteredPlugin>,
    enabled: Option<String>,
}

impl PluginRegistry {
    /// Empty registry with no factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for the given plugin name.
    pub fn register(&mut self, name: impl Into<String>, factory: PluginFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Scan plugin directories and register every package whose manifest
    /// names a registered factory. Non-disabled plugins are activated in
    /// discovery order; per-plugin failures are logged and do not abort the
    /// scan.
    pub fn discover(&mut self, directories: &[PathBuf]) -> KnitlineResult<Vec<PluginDescriptor>> {
        for dir in directories {
            let manifests = match collect_manifests(dir) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping plugin directory");
                    continue;
                }
            };
            for (path, manifest) in manifests {
                if let Err(e) = self.admit(&manifest) {
                    tracing::warn!(
                        manifest = %path.display(),
                        plugin = %manifest.name,
                        error = %e,
                        "skipping plugin package"
                    );
                }
            }
        }
        Ok(self.descriptors())
    }

    /// Register a plugin instance directly, bypassing directory discovery.
    /// Used for built-in plugins and tests.
    pub fn admit(&mut self, manifest: &PluginManifest) -> KnitlineResult<()> {
        if self.plugins.contains_key(&manifest.name) {
            return Err(KnitlineError::plugin(format!(
                "plugin '{}' already registered",
                manifest.name
            )));
        }
        let factory = self.factories.get(&manifest.name).ok_or_else(|| {
            KnitlineError::plugin(format!("no factory registered for '{}'", manifest.name))
        })?;
        let instance = factory();
        self.plugins.insert(
            manifest.name.clone(),
            RegisteredPlugin {
                descriptor: PluginDescriptor {
                    name: manifest.name.clone(),
                    disabled: manifest.disabled,
                    active: false,
                },
                instance,
            },
        );

        if manifest.disabled {
            tracing::info!(plugin = %manifest.name, "registered (disabled, not auto-activated)");
        } else {
            self.activate(&manifest.name)?;
        }
        Ok(())
    }

    /// Mark a plugin active. Idempotent; activating an already-active plugin
    /// is a no-op. This is the only path that can activate a plugin marked
    /// disabled in its metadata.
    pub fn activate(&mut self, name: &str) -> KnitlineResult<()> {
        let plugin = self.plugin_mut(name)?;
        if plugin.descriptor.active {
            return Ok(());
        }
        plugin.descriptor.active = true;
        tracing::info!(plugin = name, "plugin activated");
        Ok(())
    }

    /// Mark a plugin inactive. Idempotent. Deactivating the enabled plugin
    /// also clears the enabled slot.
    pub fn deactivate(&mut self, name: &str) -> KnitlineResult<()> {
        let plugin = self.plugin_mut(name)?;
        if !plugin.descriptor.active {
            return Ok(());
        }
        plugin.descriptor.active = false;
        if self.enabled.as_deref() == Some(name) {
            self.enabled = None;
        }
        tracing::info!(plugin = name, "plugin deactivated");
        Ok(())
    }

    /// Make `name` the single enabled plugin.
    ///
    /// The outgoing plugin's `cleanup_ui` always runs before the incoming
    /// plugin's `setup_ui`; failures of either hook are logged and never
    /// block the switch. Enabling the already-enabled plugin is a no-op.
    pub fn set_enabled(&mut self, name: &str, host: &mut dyn HostUi) -> KnitlineResult<()> {
        if self.enabled.as_deref() == Some(name) {
            return Ok(());
        }
        let incoming = self.plugin(name)?;
        if !incoming.descriptor.active {
            return Err(KnitlineError::plugin(format!(
                "plugin '{name}' is not active"
            )));
        }
        let incoming = incoming.instance.clone();

        if let Some(outgoing) = self.enabled.take() {
            if let Some(plugin) = self.plugins.get(&outgoing) {
                if let Err(e) = plugin.instance.cleanup_ui(host) {
                    tracing::warn!(plugin = %outgoing, error = %e, "plugin teardown failed");
                }
            }
        }

        if let Err(e) = incoming.setup_ui(host) {
            tracing::warn!(plugin = name, error = %e, "plugin setup failed");
        }
        self.enabled = Some(name.to_string());
        tracing::info!(plugin = name, "plugin enabled");
        Ok(())
    }

    /// The single enabled plugin, if any.
    pub fn enabled(&self) -> Option<Arc<dyn KnitPlugin>> {
        let name = self.enabled.as_deref()?;
        Some(self.plugins.get(name)?.instance.clone())
    }

    /// Name of the enabled plugin, if any.
    pub fn enabled_name(&self) -> Option<&str> {
        self.enabled.as_deref()
    }

    /// Look up a plugin instance by name.
    pub fn get(&self, name: &str) -> KnitlineResult<Arc<dyn KnitPlugin>> {
        Ok(self.plugin(name)?.instance.clone())
    }

    /// Descriptors for all registered plugins, in name order.
    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        self.plugins.values().map(|p| p.descriptor.clone()).collect()
    }

    fn plugin(&self, name: &str) -> KnitlineResult<&RegisteredPlugin> {
        self.plugins
            .get(name)
            .ok_or_else(|| KnitlineError::plugin(format!("unknown plugin '{name}'")))
    }

    fn plugin_mut(&mut self, name: &str) -> KnitlineResult<&mut RegisteredPlugin> {
        self.plugins
            .get_mut(name)
            .ok_or_else(|| KnitlineError::plugin(format!("unknown plugin '{name}'")))
    }
}

/// Find `plugin.json` manifests directly in `dir` and one level below (each
/// plugin package is a subdirectory carrying its own manifest).
fn collect_manifests(dir: &Path) -> KnitlineResult<Vec<(PathBuf, PluginManifest)>> {
    let mut found = Vec::new();

    let direct = dir.join("plugin.json");
    if direct.is_file() {
        found.push((direct.clone(), read_manifest(&direct)?));
        return Ok(found);
    }

    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read plugin dir '{}'", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    paths.sort();

    for package in paths {
        let manifest_path = package.join("plugin.json");
        if !manifest_path.is_file() {
            continue;
        }
        match read_manifest(&manifest_path) {
            Ok(manifest) => found.push((manifest_path, manifest)),
            Err(e) => {
                tracing::warn!(manifest = %manifest_path.display(), error = %e, "bad plugin manifest");
            }
        }
    }
    Ok(found)
}

fn read_manifest(path: &Path) -> KnitlineResult<PluginManifest> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read plugin manifest '{}'", path.display()))?;
    let manifest: PluginManifest = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse plugin manifest '{}'", path.display()))?;
    Ok(manifest)
}

#[cfg(test)]
#[path = "../../tests/unit/plugin/registry.rs"]
mod tests;
