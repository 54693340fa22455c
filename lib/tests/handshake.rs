mod common;

use gssauth::{AuthError, Authenticator, EncodedToken, HandshakeState, ResultCode};

use common::{MockEngine, alice};

#[test]
fn initiate_then_step_exchanges_encoded_tokens() {
    let engine = MockEngine::gssapi_start(b"\x01\x02").then_step(ResultCode::CONTINUE, b"\x03\x04");
    let mut auth = Authenticator::new(engine.clone(), alice());

    let first = auth.initiate().expect("initiate succeeds");
    assert_eq!(first.as_str(), "AQI=");

    let reply = auth.step(&first).expect("step succeeds");
    assert_eq!(reply.as_str(), "AwQ=");
    assert_eq!(auth.state(), HandshakeState::Continuing);

    assert_eq!(*engine.received.borrow(), vec![b"\x01\x02".to_vec()]);
    assert_eq!(engine.auth_name.borrow().as_deref(), Some(&b"alice"[..]));
}

#[test]
fn step_failure_carries_code_and_diagnostic() {
    let engine = MockEngine::gssapi_start(b"\x01").then_step(ResultCode::FAIL, b"");
    let mut auth = Authenticator::new(engine, alice());
    auth.initiate().expect("initiate succeeds");

    match auth.step(&EncodedToken::from("AQI=")) {
        Err(AuthError::Negotiation { code, message, .. }) => {
            assert_eq!(code.get(), -1);
            assert_eq!(message, "bad token");
        }
        other => panic!("expected negotiation error, got {other:?}"),
    }

    let again = auth.step(&EncodedToken::from("AQI="));
    assert!(matches!(again, Err(AuthError::ProtocolState { .. })));
}

#[test]
fn failed_context_creation_is_reported_and_disposal_is_a_noop() {
    let engine = MockEngine::default();
    engine.fail_create.set(Some(ResultCode::NOMECH));
    let mut auth = Authenticator::new(engine.clone(), alice());

    let err = auth.initiate().expect_err("creation fails");
    assert_eq!(err.code(), Some(ResultCode::NOMECH));
    assert!(!auth.has_context());

    auth.dispose();
    drop(auth);
    assert_eq!(engine.disposed.get(), 0);
}

#[test]
fn dropping_after_explicit_dispose_releases_context_once() {
    let engine = MockEngine::gssapi_start(b"");
    let mut auth = Authenticator::new(engine.clone(), alice());
    auth.initiate().expect("initiate succeeds");

    auth.dispose();
    auth.dispose();
    drop(auth);
    assert_eq!(engine.disposed.get(), 1);
}

#[test]
fn mechanism_mismatch_leaves_context_for_disposal_only() {
    let engine = MockEngine::default();
    *engine.start.borrow_mut() = Some(gssauth::StartOutcome {
        code: ResultCode::CONTINUE,
        mechanism: Some("PLAIN".to_owned()),
        token: Vec::new(),
    });
    let mut auth = Authenticator::new(engine.clone(), alice());

    let err = auth.initiate().expect_err("PLAIN is refused");
    assert_eq!(
        err.to_string(),
        "negotiation engine selected an unexpected mechanism: PLAIN"
    );
    assert!(auth.step(&EncodedToken::from("")).is_err());
    assert!(engine.received.borrow().is_empty());

    drop(auth);
    assert_eq!(engine.disposed.get(), 1);
}
