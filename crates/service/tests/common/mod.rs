//! Shared harness for gatekeeper integration tests
#![allow(dead_code)]

use ::common::acl::AccessMode;
use ::common::engine::AccessEngine;
use ::common::path::ResourcePath;
use ::common::store::MemoryStore;
use ::common::testkit::{
    write_acl, AuthorizationBuilder, JsonGraphParser, StaticProfiles, StaticVerifier,
};
use service::{CachingParser, Config, Gatekeeper};

pub const BASE: &str = "https://pod.example/";
pub const AUDIENCE: &str = "https://pod.example";

pub const ALICE: &str = "https://alice.example/profile/card#me";
pub const BOB: &str = "https://bob.example/profile/card#me";

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

pub const APP: &str = "https://app.example";
pub const FRIENDLY: &str = "https://friendly.example";

pub fn config() -> Config {
    Config::from_toml_str(&format!(
        r#"
        base_url = "{BASE}"
        trusted_origins = ["{FRIENDLY}"]
        trusted_app_timeout_ms = 200
        group_timeout_ms = 200
        "#
    ))
    .unwrap()
}

pub fn path(s: &str) -> ResourcePath {
    ResourcePath::parse(s).unwrap()
}

pub fn verifier() -> StaticVerifier {
    StaticVerifier::new()
        .token(ALICE_TOKEN, ALICE, AUDIENCE)
        .token(BOB_TOKEN, BOB, AUDIENCE)
        .token("wrong-audience", ALICE, "https://elsewhere.example")
}

/// A store where ALICE owns everything and BOB may read and append under
///  /shared/. ALICE trusts APP to read and append on her behalf.
pub async fn setup(config: Config) -> (Gatekeeper<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();

    let mut root = ::common::graph::Graph::new();
    AuthorizationBuilder::new("owner")
        .agent(ALICE)
        .access_to("/")
        .default_for("/")
        .modes(&[AccessMode::Read, AccessMode::Write, AccessMode::Control])
        .add_to(&mut root);
    write_acl(&store, &ResourcePath::root(), &root).await.unwrap();

    let mut shared = ::common::graph::Graph::new();
    AuthorizationBuilder::new("owner")
        .agent(ALICE)
        .access_to("./")
        .default_for("./")
        .modes(&[AccessMode::Read, AccessMode::Write, AccessMode::Control])
        .add_to(&mut shared);
    AuthorizationBuilder::new("guest")
        .agent(BOB)
        .access_to("./")
        .default_for("./")
        .modes(&[AccessMode::Read, AccessMode::Append])
        .add_to(&mut shared);
    write_acl(&store, &path("/shared/"), &shared).await.unwrap();

    let profiles =
        StaticProfiles::new().trusting(ALICE, APP, &[AccessMode::Read, AccessMode::Append]);
    let engine = AccessEngine::builder(store.clone())
        .parser(CachingParser::new(JsonGraphParser, config.parse_cache_capacity))
        .profiles(profiles)
        .settings(config.engine_settings())
        .build()
        .unwrap();

    (Gatekeeper::new(engine, verifier(), config), store)
}
