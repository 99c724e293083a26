use std::sync::Arc;

use custom_scope::prelude::*;

pub struct Test1 {
    pub port: u16,
    pub values: Vec<i32>,
    pub fallback: Option<Arc<String>>,
}

#[component]
impl Test1 {
    #[inject]
    pub fn new(
        #[argument("port")] port: u16,
        #[all] values: Vec<i32>,
        #[optional] fallback: Option<Arc<String>>,
    ) -> Self {
        Self {
            port,
            values,
            fallback,
        }
    }
}

pub struct Test2 {
    pub resolver: Arc<dyn Resolver>,
}

#[component(Arc<Test2>, Arc::new)]
impl Test2 {
    #[inject]
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

fn main() {}
