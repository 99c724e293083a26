use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use custom_scope::prelude::*;

fn main() {
    let kernel = Kernel::new(
        Configuration::new()
            .with(AppModule)
            .with(ResolutionRootModule),
    )
    .unwrap();

    for path in ["/", "/users", "/users/42"] {
        let scope = kernel.new_scope();
        let handler: Handler = scope.get(key::of()).unwrap();
        handler.handle(path);
    }

    let released = kernel.prune_cache();
    println!("released the objects of {released} finished requests");
}

struct AppModule;

impl Module for AppModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        bind::<Arc<AtomicUsize>>()
            .to_instance(Arc::new(AtomicUsize::new(0)))
            .in_singleton_scope()
            .set_on(configurer);

        bind::<Arc<RequestLog>>().in_custom_scope().set_on(configurer);

        bind::<Handler>().set_on(configurer);

        Ok(())
    }
}

/// One log per request, shared by everything constructed for that request.
struct RequestLog {
    id: usize,
}

#[component(Arc<RequestLog>, Arc::new)]
impl RequestLog {
    #[inject]
    fn new(counter: Arc<AtomicUsize>) -> Self {
        Self {
            id: counter.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn log(&self, message: &str) {
        println!("[request #{}] {}", self.id, message);
    }
}

struct Handler {
    log: Arc<RequestLog>,
    resolver: Arc<dyn Resolver>,
}

#[component]
impl Handler {
    #[inject]
    fn new(log: Arc<RequestLog>, resolver: Arc<dyn Resolver>) -> Self {
        Self { log, resolver }
    }

    fn handle(&self, path: &str) {
        self.log.log(&format!("handling {path}"));

        let log: Arc<RequestLog> = self.resolver.get(key::of()).unwrap();
        log.log("resolved again through the request's resolver");
        assert!(Arc::ptr_eq(&log, &self.log));
    }
}
