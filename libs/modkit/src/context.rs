use sea_orm::DatabaseConnection;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    /// Returns raw JSON section for the module, if any.
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

#[derive(Clone)]
pub struct ModuleCtx {
    db: Option<DatabaseConnection>,
    config_provider: Option<Arc<dyn ConfigProvider>>,
    home_dir: PathBuf,
    module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: ModuleCtx {
                db: None,
                config_provider: None,
                home_dir: home_dir.into(),
                module_name: None,
            },
        }
    }

    pub fn with_db(mut self, db: DatabaseConnection) -> Self {
        self.inner.db = Some(db);
        self
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    /// Scope the context to one module so `module_config` reads its section.
    pub fn for_module(&self, name: &str) -> Self {
        let mut scoped = self.clone();
        scoped.module_name = Some(Arc::<str>::from(name));
        scoped
    }

    /// Shared pool handle; cloning it is cheap.
    pub fn db(&self) -> Option<DatabaseConnection> {
        self.db.clone()
    }

    /// Absolute server home; modules resolve their relative paths against it.
    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Deserialize the module's section into `T`.
    /// A missing section yields `T::default()`; a malformed one is an error.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> anyhow::Result<T> {
        let (Some(name), Some(provider)) = (&self.module_name, &self.config_provider) else {
            return Ok(T::default());
        };
        match provider.get_module_config(name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| anyhow::anyhow!("invalid {name} config: {e}")),
            None => Ok(T::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, serde_json::Value>);

    impl ConfigProvider for MapProvider {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Limits {
        #[serde(default)]
        max: u32,
    }

    fn ctx_with(sections: &[(&str, serde_json::Value)]) -> ModuleCtx {
        let map = sections
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        ModuleCtxBuilder::new("/tmp/amora")
            .with_config_provider(Arc::new(MapProvider(map)))
            .build()
    }

    #[test]
    fn unscoped_context_yields_defaults() {
        let ctx = ctx_with(&[("dating", serde_json::json!({ "max": 5 }))]);
        assert_eq!(ctx.module_config::<Limits>().unwrap(), Limits::default());
        assert!(ctx.current_module().is_none());
    }

    #[test]
    fn scoped_context_reads_its_section() {
        let ctx = ctx_with(&[("dating", serde_json::json!({ "max": 5 }))]).for_module("dating");
        assert_eq!(ctx.current_module(), Some("dating"));
        assert_eq!(ctx.module_config::<Limits>().unwrap().max, 5);
    }

    #[test]
    fn missing_section_defaults_and_malformed_section_fails() {
        let ctx = ctx_with(&[("dating", serde_json::json!({ "max": "lots" }))]);
        assert_eq!(
            ctx.for_module("api_ingress")
                .module_config::<Limits>()
                .unwrap(),
            Limits::default()
        );
        assert!(ctx.for_module("dating").module_config::<Limits>().is_err());
    }

    #[test]
    fn home_dir_and_db_are_exposed() {
        let ctx = ModuleCtxBuilder::new("/srv/amora").build();
        assert_eq!(ctx.home_dir(), Path::new("/srv/amora"));
        assert!(ctx.db().is_none());
    }
}
