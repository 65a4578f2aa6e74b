use cggmp2p::{
    cggmp::party::{Command, Party},
    sdk::api::CggmpResult,
};
use serde_json::{json, Value};

pub fn set_up_logs() {
    // set up an event subscriber for logs
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Run one `(phase, action)` command with its JSON payload and return the JSON reply.
pub fn send(party: &mut Party, phase: u64, action: &str, data: &Value) -> CggmpResult<Value> {
    let command = Command::from_wire(phase, action, data)?;
    party.execute(&mut rand::thread_rng(), command)?.to_wire()
}

/// Drive a four-round phase between `a` and `b`, returning both final replies.
pub fn run_phase(a: &mut Party, b: &mut Party, phase: u64) -> (Value, Value) {
    let empty = json!({});
    send(a, phase, "start_phase", &empty).unwrap();
    send(b, phase, "start_phase", &empty).unwrap();

    let a1 = send(a, phase, "round1", &empty).unwrap();
    let b1 = send(b, phase, "round1", &empty).unwrap();
    let a2 = send(a, phase, "round2", &b1).unwrap();
    let b2 = send(b, phase, "round2", &a1).unwrap();
    let a3 = send(a, phase, "round3", &b2).unwrap();
    let b3 = send(b, phase, "round3", &a2).unwrap();
    let out_a = send(a, phase, "round_out", &b3).unwrap();
    let out_b = send(b, phase, "round_out", &a3).unwrap();
    (out_a, out_b)
}

/// Keygen and aux info for two fresh parties with fast Paillier keys.
pub fn setup_parties() -> (Party, Party) {
    let mut a = Party::new_unsafe(0);
    let mut b = Party::new_unsafe(1);
    run_phase(&mut a, &mut b, 1);
    run_phase(&mut a, &mut b, 2);
    (a, b)
}

/// Sign `message` with the current presignatures, returning both parties' replies.
pub fn sign(a: &mut Party, b: &mut Party, message: &[u8]) -> (Value, Value) {
    let empty = json!({});
    send(a, 4, "start_phase", &empty).unwrap();
    send(b, 4, "start_phase", &empty).unwrap();

    let data = json!({ "message": hex::encode(message) });
    let sigma_a = send(a, 4, "sign", &data).unwrap();
    let sigma_b = send(b, 4, "sign", &data).unwrap();
    let out_a = send(a, 4, "verify", &sigma_b).unwrap();
    let out_b = send(b, 4, "verify", &sigma_a).unwrap();
    (out_a, out_b)
}
