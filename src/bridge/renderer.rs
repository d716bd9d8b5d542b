use serde_json::{Value, json};

use crate::bridge::dispatch::CapabilityCall;
use crate::bridge::host::SavedState;
use crate::bridge::registry::PluginRegistry;
use crate::content::{ContentError, ContentSource, PageManifest};

/// What the page asked for while loading.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub title: String,
    /// Required capabilities `isPluginAvailable` could not find.
    pub missing: Vec<String>,
    /// Startup calls ready to dispatch, in page order.
    pub calls: Vec<CapabilityCall>,
    pub warnings: Vec<String>,
}

/// Content-side half of the bridge. Created with the finished registry, so
/// every lookup it performs sees the complete set of capabilities.
#[derive(Debug)]
pub struct Renderer {
    session: u64,
    plugins: PluginRegistry,
    saved_state: Option<SavedState>,
    source: ContentSource,
    page: Option<PageManifest>,
    next_call_id: u64,
}

impl Renderer {
    pub fn new(
        session: u64,
        plugins: PluginRegistry,
        saved_state: Option<SavedState>,
        source: ContentSource,
    ) -> Self {
        Self {
            session,
            plugins,
            saved_state,
            source,
            page: None,
            next_call_id: 1,
        }
    }

    /// Bridge session this renderer belongs to. Every call it issues
    /// carries it.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn saved_state(&self) -> Option<&SavedState> {
        self.saved_state.as_ref()
    }

    pub fn page(&self) -> Option<&PageManifest> {
        self.page.as_ref()
    }

    /// Always true: content inside this host runs on the native side of the
    /// bridge.
    pub fn is_native_platform(&self) -> bool {
        true
    }

    pub fn platform(&self) -> &'static str {
        std::env::consts::OS
    }

    pub fn is_plugin_available(&self, name: &str) -> bool {
        self.plugins.contains(name)
    }

    /// Parse the page, check its required capabilities and turn its startup
    /// calls into bridge calls.
    pub fn load_content(&mut self) -> Result<LoadReport, ContentError> {
        let page = self.source.load()?;

        let missing: Vec<String> = page
            .page
            .requires
            .iter()
            .filter(|name| !self.is_plugin_available(name))
            .cloned()
            .collect();

        let mut report = LoadReport {
            title: page.page.title.clone(),
            ..Default::default()
        };

        for name in &missing {
            report
                .warnings
                .push(format!("page requires {name}, which is not available"));
        }
        report.missing = missing;

        for startup in &page.startup {
            match startup.args_json() {
                Ok(args) => {
                    let id = self.next_call_id;
                    self.next_call_id += 1;
                    report.calls.push(CapabilityCall {
                        session: self.session,
                        id,
                        capability: startup.capability.clone(),
                        method: startup.method.clone(),
                        args,
                    });
                }
                Err(err) => report.warnings.push(err.to_string()),
            }
        }

        tracing::info!(
            source = %self.source,
            title = %report.title,
            calls = report.calls.len(),
            "content loaded"
        );

        self.page = Some(page);
        Ok(report)
    }

    /// Snapshot for the platform to hand back on recreation.
    pub fn save_state(&self) -> SavedState {
        let generation = self
            .saved_state
            .as_ref()
            .and_then(|state| state.as_value().get("generation"))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        SavedState::new(json!({
            "generation": generation + 1,
            "page": self.page.as_ref().map(|page| page.page.title.clone()),
        }))
    }

    /// How many times this window's content has been recreated.
    pub fn generation(&self) -> u64 {
        self.saved_state
            .as_ref()
            .and_then(|state| state.as_value().get("generation"))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::bridge::capability::CapabilityDescriptor;
    use crate::bridge::registry::PluginRegistrar;
    use crate::plugin::system::System;

    fn registry_with_system() -> PluginRegistry {
        let mut registrar = PluginRegistrar::new();
        registrar
            .register(CapabilityDescriptor::new(System::new("Axion")))
            .unwrap();
        registrar.finish()
    }

    fn page_file(dir: &tempfile::TempDir, raw: &str) -> ContentSource {
        let path = dir.path().join("page.toml");
        fs::write(&path, raw).unwrap();
        ContentSource::File(path)
    }

    #[test]
    fn reports_native_platform() {
        let renderer = Renderer::new(1, registry_with_system(), None, ContentSource::Bundled);
        assert!(renderer.is_native_platform());
        assert_eq!(renderer.platform(), std::env::consts::OS);
        assert!(renderer.is_plugin_available("System"));
        assert!(!renderer.is_plugin_available("Camera"));
    }

    #[test]
    fn load_content_flags_missing_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let source = page_file(
            &dir,
            r#"
[page]
title = "Needs more"
requires = ["System", "Camera"]

[[startup]]
capability = "System"
method = "getInfo"

[[startup]]
capability = "Camera"
method = "snap"
"#,
        );

        let mut renderer = Renderer::new(1, registry_with_system(), None, source);
        let report = renderer.load_content().unwrap();

        assert_eq!(report.title, "Needs more");
        assert_eq!(report.missing, vec!["Camera".to_string()]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.calls.len(), 2);
        assert_eq!(report.calls[0].id, 1);
        assert!(report.calls.iter().all(|call| call.session == 1));
        assert_eq!(report.calls[1].id, 2);
        assert!(renderer.page().is_some());
    }

    #[test]
    fn save_state_counts_generations() {
        let mut first = Renderer::new(1, registry_with_system(), None, ContentSource::Bundled);
        first.load_content().unwrap();
        assert_eq!(first.generation(), 0);

        let snapshot = first.save_state();
        assert_eq!(snapshot.as_value()["generation"], json!(1));
        assert_eq!(snapshot.as_value()["page"], json!("Axion"));

        let second = Renderer::new(1, registry_with_system(), Some(snapshot), ContentSource::Bundled);
        assert_eq!(second.generation(), 1);
        assert_eq!(second.save_state().as_value()["generation"], json!(2));
    }
}
