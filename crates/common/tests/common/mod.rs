//! Shared harness for access engine integration tests
#![allow(dead_code)]

use std::time::Duration;

use ::common::collaborators::{GroupResolver, ProfileFetcher};
use ::common::engine::{AccessEngine, EngineSettings};
use ::common::path::ResourcePath;
use ::common::store::{Blob, MemoryStore, ResourceStore};
use ::common::testkit::{write_acl, AuthorizationBuilder, JsonGraphParser};
use url::Url;

pub const BASE: &str = "https://pod.example/";

pub const ALICE: &str = "https://alice.example/profile/card#me";
pub const BOB: &str = "https://bob.example/profile/card#me";
pub const CAROL: &str = "https://carol.example/profile/card#me";

pub fn settings() -> EngineSettings {
    let mut settings = EngineSettings::new(Url::parse(BASE).unwrap());
    settings.group_timeout = Duration::from_millis(200);
    settings.trusted_app_timeout = Duration::from_millis(200);
    settings
}

pub fn path(s: &str) -> ResourcePath {
    ResourcePath::parse(s).unwrap()
}

/// Route engine logs to the test harness; RUST_LOG=debug shows each climb step
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An engine over `store` with no groups and no profiles
pub fn engine(store: &MemoryStore) -> AccessEngine<MemoryStore> {
    init_tracing();
    AccessEngine::builder(store.clone())
        .parser(JsonGraphParser)
        .settings(settings())
        .build()
        .unwrap()
}

pub fn engine_with(
    store: &MemoryStore,
    groups: impl GroupResolver + 'static,
    profiles: impl ProfileFetcher + 'static,
) -> AccessEngine<MemoryStore> {
    init_tracing();
    AccessEngine::builder(store.clone())
        .parser(JsonGraphParser)
        .groups(groups)
        .profiles(profiles)
        .settings(settings())
        .build()
        .unwrap()
}

/// Store a plain blob
pub async fn put(store: &MemoryStore, p: &str, body: &'static str) {
    store
        .blob(&path(p))
        .set_data("text/plain", body.into())
        .await
        .unwrap();
}

/// Write the authorization document adjacent to `resource`, one statement
///  per builder
pub async fn acl(store: &MemoryStore, resource: &str, statements: Vec<AuthorizationBuilder>) {
    let mut graph = ::common::graph::Graph::new();
    for statement in statements {
        statement.add_to(&mut graph);
    }
    write_acl(store, &path(resource), &graph).await.unwrap();
}
