use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use cggmp2p::cggmp::party::{Command, Party, Reply};
use serde_json::{json, Value};
use tracing::debug;

use crate::common::{send, set_up_logs};

/// One end of a duplex channel carrying JSON text, as a socket would.
struct Link {
    out: Sender<String>,
    input: Receiver<String>,
}

impl Link {
    fn pair() -> (Self, Self) {
        let (a_out, b_in) = mpsc::channel();
        let (b_out, a_in) = mpsc::channel();
        (
            Self {
                out: a_out,
                input: a_in,
            },
            Self {
                out: b_out,
                input: b_in,
            },
        )
    }

    /// Send ours, wait for theirs.
    fn exchange(&self, msg: &Value) -> Value {
        self.out.send(msg.to_string()).expect("send fail");
        let text = self.input.recv().expect("recv fail");
        serde_json::from_str(&text).expect("peer sent invalid json")
    }
}

fn execute_party(id: u64, link: Link) -> (k256::ProjectivePoint, cggmp2p::ecdsa::Signature) {
    let mut party = Party::new_unsafe(id);
    let empty = json!({});

    for phase in 1..=3 {
        debug!("party {} phase {}", id, phase);
        send(&mut party, phase, "start_phase", &empty).unwrap();
        let msg1 = send(&mut party, phase, "round1", &empty).unwrap();
        let peer1 = link.exchange(&msg1);
        let msg2 = send(&mut party, phase, "round2", &peer1).unwrap();
        let peer2 = link.exchange(&msg2);
        let msg3 = send(&mut party, phase, "round3", &peer2).unwrap();
        let peer3 = link.exchange(&msg3);
        send(&mut party, phase, "round_out", &peer3).unwrap();
    }

    send(&mut party, 4, "start_phase", &empty).unwrap();
    let sigma = send(
        &mut party,
        4,
        "sign",
        &json!({ "message": hex::encode(b"test") }),
    )
    .unwrap();
    let peer_sigma = link.exchange(&sigma);
    let command = Command::from_wire(4, "verify", &peer_sigma).unwrap();
    let signature = match party.execute(&mut rand::thread_rng(), command).unwrap() {
        Reply::Verified(signature) => signature,
        other => panic!("unexpected reply {:?}", other),
    };

    (*party.public_key().unwrap(), signature)
}

#[test]
fn basic_correctness() {
    set_up_logs();
    let (link_a, link_b) = Link::pair();

    let a = thread::spawn(move || execute_party(0, link_a));
    let b = thread::spawn(move || execute_party(1, link_b));
    let (key_a, sig_a) = a.join().expect("party 0 panicked");
    let (key_b, sig_b) = b.join().expect("party 1 panicked");

    assert_eq!(key_a, key_b);
    assert_eq!(sig_a, sig_b);
}
