use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tour_core::{
    autostart::AutoStartPolicy,
    config::Config,
    controller::TourController,
    kv::{FileStore, KeyValueStore},
    localize::{CatalogLocalizer, Localizer},
    paths,
    persist::TourPersistence,
    registry::{Registry, TourDefinition},
    runner::StepRunner,
    store::TourStore,
    TourError,
};

/// One process worth of engine: config, registry, and a controller backed
/// by the file store under `.tours/`.
pub struct Engine {
    pub root: PathBuf,
    pub config: Config,
    pub registry: Arc<Registry>,
    pub persistence: TourPersistence,
    pub controller: TourController,
}

impl Engine {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load config")?;

        let registry_path = config.registry_path(root);
        let registry = Registry::load(&registry_path)
            .with_context(|| format!("failed to load registry {}", registry_path.display()))?;

        let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(paths::store_path(root)));
        let persistence = TourPersistence::new(kv);
        let store = Arc::new(TourStore::open(persistence.clone()));

        Ok(Self {
            root: root.to_path_buf(),
            config,
            registry: Arc::new(registry),
            persistence,
            controller: TourController::new(store),
        })
    }

    /// Explicit role, else the configured one.
    pub fn role<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.config.role.as_deref())
    }

    pub fn tour(&self, id: &str) -> anyhow::Result<&TourDefinition> {
        self.controller
            .get_tour_config(id, &self.registry)
            .ok_or_else(|| TourError::TourNotFound(id.to_string()).into())
    }

    pub fn localizer(&self) -> anyhow::Result<Arc<dyn Localizer>> {
        let path = self.config.locale_path(&self.root);
        let catalog = CatalogLocalizer::load_or_empty(&path)
            .with_context(|| format!("failed to load locale catalog {}", path.display()))?;
        Ok(Arc::new(catalog))
    }

    pub fn runner(&self) -> anyhow::Result<StepRunner> {
        Ok(StepRunner::new(
            self.controller.clone(),
            self.registry.clone(),
            self.localizer()?,
        ))
    }

    pub fn auto_start(&self) -> AutoStartPolicy {
        AutoStartPolicy::new(
            self.controller.clone(),
            self.persistence.clone(),
            self.config.settle_delay(),
        )
    }
}

/// Single-threaded runtime for the commands that await timers or hooks.
pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
