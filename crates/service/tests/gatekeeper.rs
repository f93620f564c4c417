//! Integration tests for request authorization through the gatekeeper

mod common;

use ::common::acl::{AccessError, AccessMode};

use service::AccessRequest;

use crate::common::{config, path, setup, ALICE_TOKEN, APP, BOB_TOKEN, FRIENDLY};

use AccessMode::{Append, Control, Read, Write};

#[tokio::test]
async fn test_credentials_identify_the_requester() {
    let (gatekeeper, _store) = setup(config()).await;
    let notes = path("/shared/notes");

    let alice = AccessRequest::new(notes.clone(), &[Read]).token(ALICE_TOKEN);
    assert!(gatekeeper.authorize(&alice).await.is_ok());

    let anonymous = AccessRequest::new(notes.clone(), &[Read]);
    assert!(matches!(
        gatekeeper.authorize(&anonymous).await,
        Err(AccessError::Denied { mode: Read, .. })
    ));

    // a credential for another audience is ignored
    let misdirected = AccessRequest::new(notes.clone(), &[Read]).token("wrong-audience");
    assert!(matches!(
        gatekeeper.authorize(&misdirected).await,
        Err(AccessError::Denied { .. })
    ));

    let forged = AccessRequest::new(notes, &[Read]).token("forged");
    assert!(gatekeeper.authorize(&forged).await.is_err());
}

#[tokio::test]
async fn test_append_only_grant_is_reported() {
    let (gatekeeper, _store) = setup(config()).await;

    let bob = AccessRequest::new(path("/shared/notes"), &[Write]).token(BOB_TOKEN);
    let grant = gatekeeper.authorize(&bob).await.unwrap();
    assert!(grant.append_only);

    let alice = AccessRequest::new(path("/shared/notes"), &[Write]).token(ALICE_TOKEN);
    let grant = gatekeeper.authorize(&alice).await.unwrap();
    assert!(!grant.append_only);
}

#[tokio::test]
async fn test_own_and_configured_origins_skip_trust_check() {
    let (gatekeeper, _store) = setup(config()).await;

    for origin in ["https://pod.example", "https://pod.example/", FRIENDLY] {
        let request = AccessRequest::new(path("/private/diary"), &[Write])
            .token(ALICE_TOKEN)
            .origin(origin);
        assert!(gatekeeper.authorize(&request).await.is_ok(), "{}", origin);
    }
}

#[tokio::test]
async fn test_foreign_origin_needs_owner_trust() {
    let (gatekeeper, _store) = setup(config()).await;

    let read = AccessRequest::new(path("/shared/notes"), &[Read])
        .token(ALICE_TOKEN)
        .origin(APP);
    assert!(gatekeeper.authorize(&read).await.is_ok());

    let write = AccessRequest::new(path("/shared/notes"), &[Write])
        .token(ALICE_TOKEN)
        .origin(APP);
    assert!(matches!(
        gatekeeper.authorize(&write).await,
        Err(AccessError::UntrustedOrigin { mode: Write, .. })
    ));

    let unknown = AccessRequest::new(path("/shared/notes"), &[Read])
        .token(ALICE_TOKEN)
        .origin("https://evil.example");
    let result = gatekeeper.authorize(&unknown).await;
    assert!(matches!(result, Err(AccessError::UntrustedOrigin { .. })));
    assert!(result.unwrap_err().is_denial());
}

#[tokio::test]
async fn test_append_only_needs_only_append_trust() {
    let (gatekeeper, _store) = setup(config()).await;

    // Bob's write downgrades to append, which Alice trusts the app with
    let request = AccessRequest::new(path("/shared/notes"), &[Write])
        .token(BOB_TOKEN)
        .origin(APP);
    let grant = gatekeeper.authorize(&request).await.unwrap();
    assert!(grant.append_only);

    let request = AccessRequest::new(path("/shared/notes"), &[Append])
        .token(BOB_TOKEN)
        .origin(APP);
    assert!(gatekeeper.authorize(&request).await.is_ok());
}

#[tokio::test]
async fn test_acl_edits_need_control_trust() {
    let (gatekeeper, _store) = setup(config()).await;

    let request = AccessRequest::new(path("/shared/.acl"), &[Read])
        .token(ALICE_TOKEN)
        .origin(APP);
    assert!(matches!(
        gatekeeper.authorize(&request).await,
        Err(AccessError::UntrustedOrigin { mode: Control, .. })
    ));

    let request = AccessRequest::new(path("/shared/.acl"), &[Read]).token(ALICE_TOKEN);
    assert!(gatekeeper.authorize(&request).await.is_ok());

    let request = AccessRequest::new(path("/shared/.acl"), &[Read]).token(BOB_TOKEN);
    assert!(matches!(
        gatekeeper.authorize(&request).await,
        Err(AccessError::Denied { mode: Control, .. })
    ));
}

#[tokio::test]
async fn test_denial_precedes_origin_policy() {
    let (gatekeeper, _store) = setup(config()).await;

    let request = AccessRequest::new(path("/private/diary"), &[Read])
        .token(BOB_TOKEN)
        .origin("https://evil.example");
    assert!(matches!(
        gatekeeper.authorize(&request).await,
        Err(AccessError::Denied { .. })
    ));
}

#[tokio::test]
async fn test_lenient_origin_policy() {
    let mut config = config();
    config.strict_origin = false;
    let (gatekeeper, _store) = setup(config).await;

    let request = AccessRequest::new(path("/shared/notes"), &[Write])
        .token(ALICE_TOKEN)
        .origin("https://evil.example");
    assert!(gatekeeper.authorize(&request).await.is_ok());
}
