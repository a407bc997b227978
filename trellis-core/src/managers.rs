// Per-controller registry of data-access managers

use crate::Error;
use crate::logging::{debug, trace};
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to the data-access connection (a pool, a client, ...)
pub type ConnectionHandle = Arc<dyn Any + Send + Sync>;

/// A constructed manager, type-erased
pub type ManagerInstance = Arc<dyn Any + Send + Sync>;

type ManagerFactoryFn =
    Arc<dyn Fn(&ConnectionHandle) -> Result<ManagerInstance, Error> + Send + Sync>;

/// Conventional name of the manager serving `module` over `api`
///
/// Used in diagnostics only; lookup goes through [`ManagerFactories`].
pub fn manager_name(module: &str, api: &str) -> String {
    format!("{}Manager_{}", module, api)
}

/// Factories keyed by (module, api), populated at startup
#[derive(Clone, Default)]
pub struct ManagerFactories {
    factories: HashMap<(String, String), ManagerFactoryFn>,
}

impl ManagerFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for the manager serving `module` over `api`
    ///
    /// A later registration for the same pair replaces the earlier one.
    pub fn register<M, F>(&mut self, module: impl Into<String>, api: impl Into<String>, factory: F)
    where
        M: Send + Sync + 'static,
        F: Fn(&ConnectionHandle) -> Result<M, Error> + Send + Sync + 'static,
    {
        let module = module.into();
        let api = api.into();
        debug!(
            manager = %manager_name(&module, &api),
            manager_type = type_name::<M>(),
            "Manager factory registered"
        );

        self.factories.insert(
            (module, api),
            Arc::new(move |connection: &ConnectionHandle| {
                factory(connection).map(|manager| Arc::new(manager) as ManagerInstance)
            }),
        );
    }

    /// Register a factory that needs the connection as a concrete type
    ///
    /// The connection handle is downcast to `C` on construction; a handle of
    /// another type fails with [`Error::InvalidArgument`].
    pub fn register_typed<C, M, F>(
        &mut self,
        module: impl Into<String>,
        api: impl Into<String>,
        factory: F,
    ) where
        C: Send + Sync + 'static,
        M: Send + Sync + 'static,
        F: Fn(Arc<C>) -> M + Send + Sync + 'static,
    {
        self.register(module, api, move |connection: &ConnectionHandle| {
            let typed = Arc::clone(connection).downcast::<C>().map_err(|_| {
                Error::InvalidArgument(format!(
                    "connection handle is not a {}",
                    type_name::<C>()
                ))
            })?;
            Ok(factory(typed))
        });
    }

    pub fn contains(&self, module: &str, api: &str) -> bool {
        self.factories
            .contains_key(&(module.to_string(), api.to_string()))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn build(
        &self,
        module: &str,
        api: &str,
        connection: &ConnectionHandle,
    ) -> Option<Result<ManagerInstance, Error>> {
        self.factories
            .get(&(module.to_string(), api.to_string()))
            .map(|factory| factory(connection))
    }
}

impl fmt::Debug for ManagerFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .factories
            .keys()
            .map(|(module, api)| manager_name(module, api))
            .collect();
        names.sort();
        f.debug_struct("ManagerFactories")
            .field("factories", &names)
            .finish()
    }
}

/// Lazily built, memoized managers for one controller
///
/// Each module's manager is constructed on first request and the same
/// instance is handed out afterwards. The registry lives exactly as long as
/// the controller owning it.
pub struct Managers {
    api: String,
    connection: ConnectionHandle,
    factories: Arc<ManagerFactories>,
    cache: HashMap<String, ManagerInstance>,
}

impl Managers {
    /// Create an empty registry bound to `api` and `connection`
    pub fn new(
        api: impl Into<String>,
        connection: ConnectionHandle,
        factories: Arc<ManagerFactories>,
    ) -> Result<Self, Error> {
        let api = api.into();
        if api.is_empty() {
            return Err(Error::InvalidArgument(
                "manager api must be a non-empty string".to_string(),
            ));
        }

        Ok(Self {
            api,
            connection,
            factories,
            cache: HashMap::new(),
        })
    }

    /// Get the manager for `module`, building it on first use
    ///
    /// Fails with [`Error::ManagerTypeNotFound`] when no factory is
    /// registered for the module and api, or when the manager is not an `M`.
    pub fn get<M>(&mut self, module: &str) -> Result<Arc<M>, Error>
    where
        M: Send + Sync + 'static,
    {
        if module.is_empty() {
            return Err(Error::InvalidArgument(
                "manager module must be a non-empty string".to_string(),
            ));
        }

        let instance = match self.cache.get(module) {
            Some(instance) => {
                trace!(module, api = self.api.as_str(), "Manager cache hit");
                Arc::clone(instance)
            }
            None => {
                let instance = self
                    .factories
                    .build(module, &self.api, &self.connection)
                    .ok_or_else(|| {
                        Error::ManagerTypeNotFound(manager_name(module, &self.api))
                    })??;
                debug!(
                    manager = %manager_name(module, &self.api),
                    "Manager constructed"
                );
                self.cache.insert(module.to_string(), Arc::clone(&instance));
                instance
            }
        };

        instance.downcast::<M>().map_err(|_| {
            Error::ManagerTypeNotFound(format!(
                "{} is not a {}",
                manager_name(module, &self.api),
                type_name::<M>()
            ))
        })
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Whether the manager for `module` has been built already
    pub fn is_cached(&self, module: &str) -> bool {
        self.cache.contains_key(module)
    }
}

impl fmt::Debug for Managers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cached: Vec<_> = self.cache.keys().collect();
        cached.sort();
        f.debug_struct("Managers")
            .field("api", &self.api)
            .field("cached", &cached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct NewsManager {
        dsn: String,
    }

    #[derive(Debug)]
    struct CommentsManager;

    fn connection() -> ConnectionHandle {
        Arc::new("sqlite::memory:".to_string())
    }

    fn factories() -> Arc<ManagerFactories> {
        let mut factories = ManagerFactories::new();
        factories.register_typed("News", "PDO", |dsn: Arc<String>| NewsManager {
            dsn: dsn.to_string(),
        });
        factories.register("Comments", "PDO", |_: &ConnectionHandle| Ok(CommentsManager));
        Arc::new(factories)
    }

    #[test]
    fn test_rejects_empty_api() {
        let result = Managers::new("", connection(), factories());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_empty_module() {
        let mut managers = Managers::new("PDO", connection(), factories()).unwrap();
        assert!(matches!(
            managers.get::<NewsManager>(""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_same_instance_returned() {
        let mut managers = Managers::new("PDO", connection(), factories()).unwrap();
        let first = managers.get::<NewsManager>("News").unwrap();
        let second = managers.get::<NewsManager>("News").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dsn, "sqlite::memory:");
    }

    #[test]
    fn test_factory_runs_once_per_registry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut factories = ManagerFactories::new();
        factories.register("News", "PDO", move |_: &ConnectionHandle| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(CommentsManager)
        });
        let factories = Arc::new(factories);

        let mut managers = Managers::new("PDO", connection(), Arc::clone(&factories)).unwrap();
        managers.get::<CommentsManager>("News").unwrap();
        managers.get::<CommentsManager>("News").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(managers.is_cached("News"));

        // A fresh registry builds its own instance
        let mut other = Managers::new("PDO", connection(), factories).unwrap();
        other.get::<CommentsManager>("News").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_factory() {
        let mut managers = Managers::new("PDO", connection(), factories()).unwrap();
        let err = managers.get::<NewsManager>("Users").unwrap_err();
        assert!(matches!(err, Error::ManagerTypeNotFound(ref name) if name == "UsersManager_PDO"));
    }

    #[test]
    fn test_api_selects_factory() {
        let mut managers = Managers::new("MySQL", connection(), factories()).unwrap();
        assert!(matches!(
            managers.get::<NewsManager>("News"),
            Err(Error::ManagerTypeNotFound(_))
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let mut managers = Managers::new("PDO", connection(), factories()).unwrap();
        assert!(matches!(
            managers.get::<CommentsManager>("News"),
            Err(Error::ManagerTypeNotFound(_))
        ));
    }

    #[test]
    fn test_wrong_connection_type() {
        let mut managers = Managers::new("PDO", Arc::new(42u32), factories()).unwrap();
        assert!(matches!(
            managers.get::<NewsManager>("News"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(!managers.is_cached("News"));
    }

    #[test]
    fn test_manager_name() {
        assert_eq!(manager_name("News", "PDO"), "NewsManager_PDO");
        assert!(factories().contains("News", "PDO"));
        assert!(!factories().contains("News", "MySQL"));
    }
}
