use std::error::Error;

use tracing::debug;

use crate::container::registry::binding_map::{BindingEntry, BindingMap};
use crate::container::registry::{Configurer, ConfigurerPrivate, RegistryError};
use crate::container::resolver::BindingMetadata;
use crate::provider::{Provider, SharedProvider};
use crate::scope::ScopeCallback;

pub struct ConfigurerImpl {
    bindings: BindingMap,
    errors: Vec<RegistryError>,
}

impl ConfigurerImpl {
    pub fn new() -> Self {
        Self {
            bindings: BindingMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<BindingMap, RegistryError> {
        match RegistryError::aggregate(self.errors) {
            Some(err) => Err(err),
            None => Ok(self.bindings),
        }
    }

    fn insert(&mut self, entry: BindingEntry) {
        if self.bindings.get(entry.key()).is_none() {
            debug!(key = %entry.key(), lifetime = entry.metadata().lifetime(), "registering binding");
            self.bindings.insert(entry);
        } else {
            self.errors.push(RegistryError::KeyDuplicated {
                key: entry.key().dyn_clone(),
            });
        }
    }
}

impl Configurer for ConfigurerImpl {
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate {
        self
    }

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>) {
        self.errors.push(RegistryError::ModuleInner {
            module,
            source: err,
        });
    }
}

impl ConfigurerPrivate for ConfigurerImpl {
    fn dyn_register(&mut self, metadata: BindingMetadata, provider: Box<dyn Provider>) {
        self.insert(BindingEntry::new_owned(metadata, provider));
    }

    fn dyn_register_shared(
        &mut self,
        metadata: BindingMetadata,
        provider: Box<dyn SharedProvider>,
        scope: ScopeCallback,
    ) {
        self.insert(BindingEntry::new_shared(metadata, provider, scope));
    }
}
