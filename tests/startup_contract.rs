use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

use serde_json::{Value, json};

use axion_host::activity::{ActivityError, ActivityState, HostActivity};
use axion_host::bridge::{
    BridgeError, BridgeHost, Capability, CapabilityDescriptor, CapabilityError, CapabilityName,
    PluginRegistry, RegistryError, SavedState,
};
use axion_host::content::ContentSource;
use axion_host::msg::Msg;
use axion_host::plugin::{self, System};
use axion_host::window::WindowBridgeHost;

struct Stub(String);

impl Capability for Stub {
    fn name(&self) -> &str {
        &self.0
    }

    fn methods(&self) -> &[&'static str] {
        &["ping"]
    }

    fn invoke(&self, method: &str, _args: &Value) -> Result<Value, CapabilityError> {
        match method {
            "ping" => Ok(json!(self.0)),
            other => Err(CapabilityError::UnknownMethod {
                capability: self.0.clone(),
                method: other.to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct Entry {
    size_at_entry: usize,
    names: Vec<CapabilityName>,
    saved_state: Option<SavedState>,
}

/// Base routine that records what it was handed.
struct InstrumentedHost {
    entries: Rc<RefCell<Vec<Entry>>>,
}

impl BridgeHost for InstrumentedHost {
    fn start_bridge_host(
        &mut self,
        saved_state: Option<SavedState>,
        plugins: PluginRegistry,
    ) -> Result<(), BridgeError> {
        let names = plugins.names();
        self.entries.borrow_mut().push(Entry {
            size_at_entry: names.len(),
            names,
            saved_state,
        });
        Ok(())
    }
}

fn stub_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Stub{i}")).collect()
}

fn activity_with(
    names: Vec<String>,
) -> (HostActivity<InstrumentedHost>, Rc<RefCell<Vec<Entry>>>) {
    let entries = Rc::new(RefCell::new(Vec::new()));
    let host = InstrumentedHost {
        entries: Rc::clone(&entries),
    };
    let activity = HostActivity::new(host, move |registrar| {
        for name in &names {
            registrar.register(CapabilityDescriptor::new(Stub(name.clone())))?;
        }
        Ok(())
    });
    (activity, entries)
}

#[test]
fn registry_is_complete_when_the_base_routine_is_entered() {
    for n in [0, 1, 5, 32] {
        let (mut activity, entries) = activity_with(stub_names(n));
        activity.on_start(None).unwrap();

        let entries = entries.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].size_at_entry, n);
    }
}

#[test]
fn duplicate_names_fail_startup_and_skip_the_base() {
    let mut names = stub_names(3);
    names.push("Stub1".to_string());
    let (mut activity, entries) = activity_with(names);

    let err = activity.on_start(None).unwrap_err();
    match err {
        ActivityError::Registration(RegistryError::DuplicateCapability { name }) => {
            assert_eq!(name.as_str(), "Stub1");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(activity.state(), ActivityState::Failed);
    assert!(entries.borrow().is_empty());
}

#[test]
fn fresh_instances_reproduce_the_same_registry() {
    let (mut first, first_entries) = activity_with(stub_names(4));
    first.on_start(None).unwrap();
    first.on_destroy();

    let (mut second, second_entries) = activity_with(stub_names(4));
    second.on_start(Some(SavedState::new(json!({ "generation": 1 }))))
        .unwrap();

    assert_eq!(
        first_entries.borrow()[0].names,
        second_entries.borrow()[0].names
    );
}

#[test]
fn system_scenario() {
    let entries = Rc::new(RefCell::new(Vec::new()));
    let host = InstrumentedHost {
        entries: Rc::clone(&entries),
    };
    let mut activity = HostActivity::new(host, |registrar| {
        plugin::register_all(registrar, System::new("Axion"))
    });

    activity.on_start(None).unwrap();

    let entries = entries.borrow();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].names, vec![CapabilityName::from("System")]);
    assert!(entries[0].saved_state.is_none());
}

#[test]
fn content_load_runs_only_after_startup_returns() {
    let (tx, rx) = mpsc::channel::<Msg>();
    let host = WindowBridgeHost::new(tx, ContentSource::Bundled);
    let mut activity = HostActivity::new(host, |registrar| {
        plugin::register_all(registrar, System::new("Axion"))
    });

    activity.on_start(None).unwrap();

    // Nothing has been loaded yet: the load is queued behind startup.
    let renderer = activity.base().renderer().unwrap();
    assert!(renderer.page().is_none());
    assert!(renderer.is_plugin_available("System"));

    let Ok(Msg::LoadContent { session }) = rx.try_recv() else {
        panic!("content load was not queued");
    };
    let report = activity.base_mut().load_content(session).unwrap().unwrap();
    assert!(report.missing.is_empty());

    for _ in 0..report.calls.len() {
        match rx.recv().unwrap() {
            Msg::CallCompleted(outcome) => {
                assert!(outcome.is_ok(), "{}", outcome.summary());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    activity.on_destroy();
    assert!(activity.base().renderer().is_none());
}
