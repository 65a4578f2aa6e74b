use cggmp2p::{
    cggmp::party::{Command, Phase, PhaseState, Reply},
    ecdsa,
    sdk::{api::CggmpError, wire::int_from_wire},
};
use serde_json::json;
use tracing::debug;

use crate::common::{run_phase, send, set_up_logs, setup_parties, sign};

/// Keygen, aux info, presigning and signing of "test" through the JSON command interface.
#[test]
fn basic_correctness() {
    set_up_logs();

    let mut a = cggmp2p::cggmp::party::Party::new_unsafe(0);
    let mut b = cggmp2p::cggmp::party::Party::new_unsafe(1);

    debug!("keygen...");
    let (x_a, x_b) = run_phase(&mut a, &mut b, 1);
    assert_eq!(x_a, x_b);
    assert_eq!(
        a.keygen_data().unwrap().ssid(),
        b.keygen_data().unwrap().ssid()
    );

    debug!("aux info...");
    let (n_a, n_b) = run_phase(&mut a, &mut b, 2);
    // each side announces the peer's modulus
    assert_eq!(
        &int_from_wire(&n_a["n"]).unwrap(),
        b.aux_data().unwrap().ek_i().n()
    );
    assert_eq!(
        &int_from_wire(&n_b["n"]).unwrap(),
        a.aux_data().unwrap().ek_i().n()
    );

    debug!("presigning...");
    let (r_a, r_b) = run_phase(&mut a, &mut b, 3);
    assert_eq!(r_a, r_b);
    assert!(a.has_presignature() && b.has_presignature());

    debug!("signing...");
    let mut rng = rand::thread_rng();
    for party in [&mut a, &mut b] {
        party.execute(&mut rng, Command::Start(Phase::Sign)).unwrap();
    }
    let sigma_a = a.execute(&mut rng, Command::Sign(b"test".to_vec())).unwrap();
    let sigma_b = b.execute(&mut rng, Command::Sign(b"test".to_vec())).unwrap();
    let (sigma_a, sigma_b) = match (sigma_a, sigma_b) {
        (Reply::SignatureShare(sa), Reply::SignatureShare(sb)) => (sa, sb),
        other => panic!("unexpected replies {:?}", other),
    };

    let sig_a = match a.execute(&mut rng, Command::Verify(sigma_b)).unwrap() {
        Reply::Verified(sig) => sig,
        other => panic!("unexpected reply {:?}", other),
    };
    let sig_b = match b.execute(&mut rng, Command::Verify(sigma_a)).unwrap() {
        Reply::Verified(sig) => sig,
        other => panic!("unexpected reply {:?}", other),
    };

    assert_eq!(sig_a, sig_b);
    assert!(!bool::from(sig_a.r().is_zero()));
    assert!(!bool::from(sig_a.s().is_zero()));
    assert!(ecdsa::verify(
        a.public_key().unwrap(),
        &ecdsa::message_hash(b"test"),
        &sig_a
    ));
    assert_eq!(a.phase_state(Phase::Sign), PhaseState::Completed);
}

#[test]
fn presignature_cleared_after_use() {
    set_up_logs();
    let (mut a, mut b) = setup_parties();

    run_phase(&mut a, &mut b, 3);
    let (out_a, out_b) = sign(&mut a, &mut b, b"first");
    assert_eq!(out_a, json!({ "verify": true }));
    assert_eq!(out_b, json!({ "verify": true }));

    // no second message for the same presignature
    assert!(!a.has_presignature());
    assert!(!b.has_presignature());
    assert_eq!(
        send(&mut a, 4, "start_phase", &json!({})),
        Err(CggmpError::OutOfOrder)
    );

    // a fresh presignature has a fresh nonce
    let (r1, _) = run_phase(&mut a, &mut b, 3);
    let (r2, _) = run_phase(&mut a, &mut b, 3);
    assert_ne!(r1, r2);
    let (out_a, _) = sign(&mut a, &mut b, b"second");
    assert_eq!(out_a, json!({ "verify": true }));
}

#[test]
fn presignature_dropped_at_sign_start() {
    set_up_logs();
    let (mut a, mut b) = setup_parties();
    run_phase(&mut a, &mut b, 3);

    // even if signing never finishes the presignature is gone
    send(&mut a, 4, "start_phase", &json!({})).unwrap();
    assert!(!a.has_presignature());
    assert_eq!(a.phase_state(Phase::Sign), PhaseState::Started);
}

#[test]
fn tampered_presign_message_aborts() {
    set_up_logs();
    let (mut a, mut b) = setup_parties();
    let empty = json!({});

    send(&mut a, 3, "start_phase", &empty).unwrap();
    send(&mut b, 3, "start_phase", &empty).unwrap();
    let a1 = send(&mut a, 3, "round1", &empty).unwrap();
    let b1 = send(&mut b, 3, "round1", &empty).unwrap();
    send(&mut a, 3, "round2", &b1).unwrap();
    let mut b2 = send(&mut b, 3, "round2", &a1).unwrap();

    // swap the two MtA ciphertexts
    let d = b2["D"].take();
    let d_hat = b2["_D"].take();
    b2["D"] = d_hat;
    b2["_D"] = d;

    assert_eq!(
        send(&mut a, 3, "round3", &b2),
        Err(CggmpError::Verification)
    );
    assert_eq!(a.phase_state(Phase::Presign), PhaseState::Failed);
    assert!(!a.has_presignature());

    // the failed engine is gone
    assert_eq!(
        send(&mut a, 3, "round3", &b2),
        Err(CggmpError::OutOfOrder)
    );

    // restart from scratch
    run_phase(&mut a, &mut b, 3);
    assert!(a.has_presignature());
}

#[test]
fn malformed_wire_rejected() {
    set_up_logs();
    let mut a = cggmp2p::cggmp::party::Party::new_unsafe(0);
    send(&mut a, 1, "start_phase", &json!({})).unwrap();
    send(&mut a, 1, "round1", &json!({})).unwrap();

    // commitment as a string instead of a number
    assert!(matches!(
        send(&mut a, 1, "round2", &json!({ "id": 1, "V": "12" })),
        Err(CggmpError::Malformed(_))
    ));
    // decoding failures never reach the engine
    assert_eq!(a.phase_state(Phase::Keygen), PhaseState::Round1Done);
    send(&mut a, 1, "round2", &json!({ "id": 1, "V": 12 })).unwrap();
}
