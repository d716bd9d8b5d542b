use std::sync::Arc;

use serde_json::{Value, json};

use crate::bridge::capability::{Capability, CapabilityError};

type ExitHook = Arc<dyn Fn() + Send + Sync>;

/// Host information and process control for embedded content.
#[derive(Clone)]
pub struct System {
    app_name: String,
    exit_hook: Option<ExitHook>,
}

impl System {
    pub const NAME: &'static str = "System";

    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            exit_hook: None,
        }
    }

    /// Called when content asks the host to exit.
    pub fn with_exit_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.exit_hook = Some(Arc::new(hook));
        self
    }

    fn info(&self) -> Value {
        json!({
            "app": self.app_name,
            "version": env!("CARGO_PKG_VERSION"),
            "platform": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "family": std::env::consts::FAMILY,
            "native": true,
        })
    }

    fn env(&self, args: &Value) -> Result<Value, CapabilityError> {
        let key = args
            .get("key")
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CapabilityError::InvalidArgs {
                method: "getEnv".to_string(),
                reason: "expected { key: string }".to_string(),
            })?;

        Ok(std::env::var(key).map(Value::String).unwrap_or(Value::Null))
    }

    fn exit(&self) -> Result<Value, CapabilityError> {
        let hook = self
            .exit_hook
            .as_ref()
            .ok_or_else(|| CapabilityError::Failed("exit is not supported by this host".to_string()))?;

        tracing::info!("content requested exit");
        hook();
        Ok(json!({ "requested": true }))
    }
}

impl Capability for System {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn methods(&self) -> &[&'static str] {
        &["getInfo", "getEnv", "exit"]
    }

    fn invoke(&self, method: &str, args: &Value) -> Result<Value, CapabilityError> {
        match method {
            "getInfo" => Ok(self.info()),
            "getEnv" => self.env(args),
            "exit" => self.exit(),
            other => Err(CapabilityError::UnknownMethod {
                capability: Self::NAME.to_string(),
                method: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn get_info_describes_the_host() {
        let info = System::new("Axion").invoke("getInfo", &Value::Null).unwrap();
        assert_eq!(info["app"], json!("Axion"));
        assert_eq!(info["platform"], json!(std::env::consts::OS));
        assert_eq!(info["native"], json!(true));
    }

    #[test]
    fn get_env_requires_a_key() {
        let system = System::new("Axion");
        let err = system.invoke("getEnv", &json!({})).unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidArgs { .. }));

        let missing = system
            .invoke("getEnv", &json!({ "key": "AXION_SURELY_UNSET_VARIABLE" }))
            .unwrap();
        assert_eq!(missing, Value::Null);
    }

    #[test]
    fn exit_runs_the_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let system = System::new("Axion").with_exit_hook(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(
            system.invoke("exit", &Value::Null).unwrap(),
            json!({ "requested": true })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exit_without_hook_fails() {
        let err = System::new("Axion").invoke("exit", &Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "exit is not supported by this host");
    }

    #[test]
    fn unknown_method_is_named() {
        let err = System::new("Axion").invoke("reboot", &Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "System has no method reboot");
    }
}
