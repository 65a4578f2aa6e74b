//! A single participant: sequences the four phases and keeps their outputs.
//!
//! Every round is a [Command] fed to [Party::execute]. A command that arrives
//! before its round is rejected with [CggmpError::OutOfOrder] and changes
//! nothing. Any other error aborts the phase: its engine and secrets are
//! dropped and the phase must be started again.
use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::{
    cggmp::{
        aux_info::{self, AuxOutputData, AuxOutputMessage},
        keygen::{self, KeygenOutputData, KeygenOutputMessage, SecretRecoveryKey},
        presign::{self, PresigOutputData, PresigningOutputMessage},
        sign::{Signer, SigningMessage, Verifier},
    },
    crypto_tools::{constants::KEYGEN_RNG_TAG, curve::CurveParams, rng::rng_seed},
    ecdsa::Signature,
    sdk::{
        api::{CggmpError, CggmpResult, Malformed},
        wire::{field, WireMessage},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Keygen,
    Aux,
    Presign,
    Sign,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Keygen, Phase::Aux, Phase::Presign, Phase::Sign];

    /// Wire number of the phase, starting at 1.
    pub fn number(self) -> u64 {
        match self {
            Phase::Keygen => 1,
            Phase::Aux => 2,
            Phase::Presign => 3,
            Phase::Sign => 4,
        }
    }

    pub fn from_number(n: u64) -> CggmpResult<Self> {
        match n {
            1 => Ok(Phase::Keygen),
            2 => Ok(Phase::Aux),
            3 => Ok(Phase::Presign),
            4 => Ok(Phase::Sign),
            _ => {
                warn!("unknown phase {}", n);
                Err(CggmpError::Malformed(Malformed::Wire))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    NotStarted,
    Started,
    Round1Done,
    Round2Done,
    Round3Done,
    Completed,
    Failed,
}

/// One round call of one phase, with the counterparty message it consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start(Phase),
    KeygenRound1,
    KeygenRound2(keygen::Round1Message),
    KeygenRound3(keygen::Round2Message),
    KeygenRoundOut(keygen::Round3Message),
    AuxRound1,
    AuxRound2(aux_info::Round1Message),
    AuxRound3(aux_info::Round2Message),
    AuxRoundOut(aux_info::Round3Message),
    PresignRound1,
    PresignRound2(presign::Round1Message),
    PresignRound3(presign::Round2Message),
    PresignRoundOut(presign::Round3Message),
    Sign(Vec<u8>),
    Verify(SigningMessage),
}

impl Command {
    /// Decode the `(phase, action)` pair and its payload.
    pub fn from_wire(phase: u64, action: &str, data: &Value) -> CggmpResult<Self> {
        use Command::*;
        let phase = Phase::from_number(phase)?;
        Ok(match (phase, action) {
            (phase, "start_phase") => Start(phase),

            (Phase::Keygen, "round1") => KeygenRound1,
            (Phase::Keygen, "round2") => KeygenRound2(WireMessage::from_wire(data)?),
            (Phase::Keygen, "round3") => KeygenRound3(WireMessage::from_wire(data)?),
            (Phase::Keygen, "round_out") => KeygenRoundOut(WireMessage::from_wire(data)?),

            (Phase::Aux, "round1") => AuxRound1,
            (Phase::Aux, "round2") => AuxRound2(WireMessage::from_wire(data)?),
            (Phase::Aux, "round3") => AuxRound3(WireMessage::from_wire(data)?),
            (Phase::Aux, "round_out") => AuxRoundOut(WireMessage::from_wire(data)?),

            (Phase::Presign, "round1") => PresignRound1,
            (Phase::Presign, "round2") => PresignRound2(WireMessage::from_wire(data)?),
            (Phase::Presign, "round3") => PresignRound3(WireMessage::from_wire(data)?),
            (Phase::Presign, "round_out") => PresignRoundOut(WireMessage::from_wire(data)?),

            (Phase::Sign, "sign") => {
                let message = field(data, "message")?.as_str().ok_or_else(|| {
                    warn!("sign: message is not a string");
                    CggmpError::Malformed(Malformed::Wire)
                })?;
                Sign(hex::decode(message).map_err(|_| {
                    warn!("sign: message is not hex");
                    CggmpError::Malformed(Malformed::Wire)
                })?)
            }
            (Phase::Sign, "verify") => Verify(WireMessage::from_wire(data)?),

            (phase, action) => {
                warn!("unknown action {} for phase {}", action, phase.number());
                return Err(CggmpError::Malformed(Malformed::Wire));
            }
        })
    }

    pub fn phase(&self) -> Phase {
        use Command::*;
        match self {
            Start(phase) => *phase,
            KeygenRound1 | KeygenRound2(_) | KeygenRound3(_) | KeygenRoundOut(_) => Phase::Keygen,
            AuxRound1 | AuxRound2(_) | AuxRound3(_) | AuxRoundOut(_) => Phase::Aux,
            PresignRound1 | PresignRound2(_) | PresignRound3(_) | PresignRoundOut(_) => {
                Phase::Presign
            }
            Sign(_) | Verify(_) => Phase::Sign,
        }
    }
}

/// What a command produced: a message for the counterparty or a phase result.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Started(Phase),
    KeygenRound1(keygen::Round1Message),
    KeygenRound2(keygen::Round2Message),
    KeygenRound3(keygen::Round3Message),
    KeygenDone(KeygenOutputMessage),
    AuxRound1(aux_info::Round1Message),
    AuxRound2(aux_info::Round2Message),
    AuxRound3(aux_info::Round3Message),
    AuxDone(AuxOutputMessage),
    PresignRound1(presign::Round1Message),
    PresignRound2(presign::Round2Message),
    PresignRound3(presign::Round3Message),
    PresignDone(PresigningOutputMessage),
    SignatureShare(SigningMessage),
    Verified(Signature),
}

impl Reply {
    pub fn to_wire(&self) -> CggmpResult<Value> {
        use Reply::*;
        match self {
            Started(phase) => Ok(json!({ "message": format!("Started phase {}", phase.number()) })),
            KeygenRound1(m) => m.to_wire(),
            KeygenRound2(m) => m.to_wire(),
            KeygenRound3(m) => m.to_wire(),
            KeygenDone(m) => m.to_wire(),
            AuxRound1(m) => m.to_wire(),
            AuxRound2(m) => m.to_wire(),
            AuxRound3(m) => m.to_wire(),
            AuxDone(m) => m.to_wire(),
            PresignRound1(m) => m.to_wire(),
            PresignRound2(m) => m.to_wire(),
            PresignRound3(m) => m.to_wire(),
            PresignDone(m) => m.to_wire(),
            SignatureShare(m) => m.to_wire(),
            Verified(_) => Ok(json!({ "verify": true })),
        }
    }
}

/// Which Paillier primes aux info generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaillierPrimes {
    Safe,
    /// BEWARE: for testing only
    Unsafe,
}

struct KeygenSeed {
    key: SecretRecoveryKey,
    session_nonce: Vec<u8>,
}

enum KeygenStage {
    R1(keygen::R1),
    R2(keygen::R2),
    R3(keygen::R3),
    R4(keygen::R4),
}

enum AuxStage {
    R1(aux_info::R1),
    R2(aux_info::R2),
    R3(aux_info::R3),
    R4(aux_info::R4),
}

enum PresignStage {
    R1(presign::R1),
    R2(presign::R2),
    R3(presign::R3),
    R4(presign::R4),
}

enum SignStage {
    Signer(Signer),
    Verifier(Verifier),
}

/// The live engine of one phase and where it stands.
struct Slot<S> {
    state: PhaseState,
    stage: Option<S>,
}

impl<S> Slot<S> {
    fn new() -> Self {
        Self {
            state: PhaseState::NotStarted,
            stage: None,
        }
    }

    fn set(&mut self, stage: S, state: PhaseState) {
        self.stage = Some(stage);
        self.state = state;
    }

    fn complete(&mut self) {
        self.stage = None;
        self.state = PhaseState::Completed;
    }

    fn fail(&mut self) {
        self.stage = None;
        self.state = PhaseState::Failed;
    }
}

/// Take the engine out of `slot` if it is at `variant`, else leave it untouched.
macro_rules! take_stage {
    ($id:expr, $slot:expr, $variant:path) => {
        match $slot.stage.take() {
            Some($variant(round)) => round,
            other => {
                $slot.stage = other;
                warn!(
                    "party {} says: command out of order in state {:?}",
                    $id, $slot.state
                );
                return Err(CggmpError::OutOfOrder);
            }
        }
    };
}

pub struct Party {
    id: u64,
    curve: CurveParams,
    primes: PaillierPrimes,
    keygen_seed: Option<KeygenSeed>,

    keygen: Slot<KeygenStage>,
    aux: Slot<AuxStage>,
    presign: Slot<PresignStage>,
    sign: Slot<SignStage>,

    keygen_data: Option<KeygenOutputData>,
    aux_data: Option<AuxOutputData>,
    presig: Option<PresigOutputData>,
}

impl Party {
    pub fn new(id: u64) -> Self {
        Self::with_primes(id, PaillierPrimes::Safe)
    }

    /// BEWARE: aux info uses Paillier keys without safe primes. For testing only.
    pub fn new_unsafe(id: u64) -> Self {
        Self::with_primes(id, PaillierPrimes::Unsafe)
    }

    /// Keygen randomness is derived from `secret_recovery_key` and
    /// `session_nonce`, so a lost key share can be regenerated.
    pub fn with_recovery_key(
        id: u64,
        secret_recovery_key: &SecretRecoveryKey,
        session_nonce: &[u8],
    ) -> Self {
        let mut party = Self::new(id);
        party.keygen_seed = Some(KeygenSeed {
            key: secret_recovery_key.clone(),
            session_nonce: session_nonce.to_vec(),
        });
        party
    }

    fn with_primes(id: u64, primes: PaillierPrimes) -> Self {
        Self {
            id,
            curve: CurveParams::secp256k1(),
            primes,
            keygen_seed: None,
            keygen: Slot::new(),
            aux: Slot::new(),
            presign: Slot::new(),
            sign: Slot::new(),
            keygen_data: None,
            aux_data: None,
            presig: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase_state(&self, phase: Phase) -> PhaseState {
        match phase {
            Phase::Keygen => self.keygen.state,
            Phase::Aux => self.aux.state,
            Phase::Presign => self.presign.state,
            Phase::Sign => self.sign.state,
        }
    }

    pub fn keygen_data(&self) -> Option<&KeygenOutputData> {
        self.keygen_data.as_ref()
    }

    pub fn aux_data(&self) -> Option<&AuxOutputData> {
        self.aux_data.as_ref()
    }

    pub fn public_key(&self) -> Option<&k256::ProjectivePoint> {
        self.keygen_data.as_ref().map(KeygenOutputData::public_key)
    }

    /// A presignature is waiting to sign exactly one message.
    pub fn has_presignature(&self) -> bool {
        self.presig.is_some()
    }

    pub fn execute(
        &mut self,
        rng: &mut (impl CryptoRng + RngCore),
        command: Command,
    ) -> CggmpResult<Reply> {
        let phase = command.phase();
        let result = self.dispatch(rng, command);
        match &result {
            Err(CggmpError::OutOfOrder) | Ok(_) => {}
            Err(e) => {
                warn!(
                    "party {} says: phase {} failed: {}",
                    self.id,
                    phase.number(),
                    e
                );
                self.fail(phase);
            }
        }
        result
    }

    fn fail(&mut self, phase: Phase) {
        match phase {
            Phase::Keygen => self.keygen.fail(),
            Phase::Aux => self.aux.fail(),
            Phase::Presign => self.presign.fail(),
            Phase::Sign => self.sign.fail(),
        }
    }

    fn dispatch(
        &mut self,
        rng: &mut (impl CryptoRng + RngCore),
        command: Command,
    ) -> CggmpResult<Reply> {
        use Command::*;
        match command {
            Start(phase) => self.start(rng, phase),

            KeygenRound1 => {
                let r1 = take_stage!(self.id, self.keygen, KeygenStage::R1);
                let (r2, msg) = r1.round1();
                self.keygen.set(KeygenStage::R2(r2), PhaseState::Round1Done);
                Ok(Reply::KeygenRound1(msg))
            }
            KeygenRound2(msg_j) => {
                let r2 = take_stage!(self.id, self.keygen, KeygenStage::R2);
                let (r3, msg) = r2.round2(&msg_j);
                self.keygen.set(KeygenStage::R3(r3), PhaseState::Round2Done);
                Ok(Reply::KeygenRound2(msg))
            }
            KeygenRound3(msg_j) => {
                let r3 = take_stage!(self.id, self.keygen, KeygenStage::R3);
                let (r4, msg) = r3.round3(rng, &msg_j)?;
                self.keygen.set(KeygenStage::R4(r4), PhaseState::Round3Done);
                Ok(Reply::KeygenRound3(msg))
            }
            KeygenRoundOut(msg_j) => {
                let r4 = take_stage!(self.id, self.keygen, KeygenStage::R4);
                let data = r4.round_out(&msg_j)?;
                let msg = KeygenOutputMessage {
                    x: *data.public_key(),
                };
                // later outputs belong to the old key
                self.aux_data = None;
                self.presig = None;
                self.keygen_data = Some(data);
                self.keygen.complete();
                debug!("party {} completed keygen", self.id);
                Ok(Reply::KeygenDone(msg))
            }

            AuxRound1 => {
                let r1 = take_stage!(self.id, self.aux, AuxStage::R1);
                let (r2, msg) = r1.round1();
                self.aux.set(AuxStage::R2(r2), PhaseState::Round1Done);
                Ok(Reply::AuxRound1(msg))
            }
            AuxRound2(msg_j) => {
                let r2 = take_stage!(self.id, self.aux, AuxStage::R2);
                let (r3, msg) = r2.round2(&msg_j);
                self.aux.set(AuxStage::R3(r3), PhaseState::Round2Done);
                Ok(Reply::AuxRound2(msg))
            }
            AuxRound3(msg_j) => {
                let r3 = take_stage!(self.id, self.aux, AuxStage::R3);
                let (r4, msg) = r3.round3(rng, &msg_j)?;
                self.aux.set(AuxStage::R4(r4), PhaseState::Round3Done);
                Ok(Reply::AuxRound3(msg))
            }
            AuxRoundOut(msg_j) => {
                let r4 = take_stage!(self.id, self.aux, AuxStage::R4);
                let data = r4.round_out(&msg_j)?;
                let msg = AuxOutputMessage {
                    n: data.ek_j().n().clone(),
                };
                self.presig = None;
                self.aux_data = Some(data);
                self.aux.complete();
                debug!("party {} completed aux info", self.id);
                Ok(Reply::AuxDone(msg))
            }

            PresignRound1 => {
                let r1 = take_stage!(self.id, self.presign, PresignStage::R1);
                let (r2, msg) = r1.round1(rng)?;
                self.presign.set(PresignStage::R2(r2), PhaseState::Round1Done);
                Ok(Reply::PresignRound1(msg))
            }
            PresignRound2(msg_j) => {
                let r2 = take_stage!(self.id, self.presign, PresignStage::R2);
                let (r3, msg) = r2.round2(rng, &msg_j)?;
                self.presign.set(PresignStage::R3(r3), PhaseState::Round2Done);
                Ok(Reply::PresignRound2(msg))
            }
            PresignRound3(msg_j) => {
                let r3 = take_stage!(self.id, self.presign, PresignStage::R3);
                let (r4, msg) = r3.round3(rng, &msg_j)?;
                self.presign.set(PresignStage::R4(r4), PhaseState::Round3Done);
                Ok(Reply::PresignRound3(msg))
            }
            PresignRoundOut(msg_j) => {
                let r4 = take_stage!(self.id, self.presign, PresignStage::R4);
                let presig = r4.round_out(&msg_j)?;
                let msg = PresigningOutputMessage {
                    r_point: *presig.r_point(),
                };
                self.presig = Some(presig);
                self.presign.complete();
                debug!("party {} completed presigning", self.id);
                Ok(Reply::PresignDone(msg))
            }

            Sign(message) => {
                let signer = take_stage!(self.id, self.sign, SignStage::Signer);
                let (verifier, msg) = signer.sign(&message);
                self.sign
                    .set(SignStage::Verifier(verifier), PhaseState::Round1Done);
                Ok(Reply::SignatureShare(msg))
            }
            Verify(msg_j) => {
                let verifier = take_stage!(self.id, self.sign, SignStage::Verifier);
                let signature = verifier.verify(&msg_j)?;
                self.sign.complete();
                debug!("party {} completed signing", self.id);
                Ok(Reply::Verified(signature))
            }
        }
    }

    fn start(&mut self, rng: &mut (impl CryptoRng + RngCore), phase: Phase) -> CggmpResult<Reply> {
        match phase {
            Phase::Keygen => {
                let r1 = match &self.keygen_seed {
                    Some(seed) => {
                        let mut seeded = rng_seed(
                            KEYGEN_RNG_TAG,
                            self.id,
                            &seed.key,
                            &seed.session_nonce,
                        )?;
                        keygen::new_keygen(&mut seeded, self.id, &self.curve)
                    }
                    None => keygen::new_keygen(rng, self.id, &self.curve),
                };
                self.keygen.set(KeygenStage::R1(r1), PhaseState::Started);
            }
            Phase::Aux => {
                let keygen = self.require(self.keygen_data.as_ref(), "keygen")?;
                let ssid = keygen.ssid().clone();
                let dk = match self.primes {
                    PaillierPrimes::Safe => aux_info::paillier_keypair()?,
                    PaillierPrimes::Unsafe => aux_info::paillier_keypair_unsafe()?,
                };
                let r1 = aux_info::new_aux_info(rng, self.id, &ssid, &self.curve, dk)?;
                self.aux.set(AuxStage::R1(r1), PhaseState::Started);
            }
            Phase::Presign => {
                let keygen = self.require(self.keygen_data.as_ref(), "keygen")?;
                let aux = self.require(self.aux_data.as_ref(), "aux info")?;
                let r1 = presign::new_presign(rng, self.id, &self.curve, keygen, aux)?;
                self.presign.set(PresignStage::R1(r1), PhaseState::Started);
            }
            Phase::Sign => {
                let public_key = *self.require(self.public_key(), "keygen")?;
                // the presignature leaves the party here and is never reused
                let presig = self.presig.take().ok_or_else(|| {
                    error!("party {} says: no presignature to sign with", self.id);
                    CggmpError::OutOfOrder
                })?;
                let signer = Signer::new(presig, &public_key)?;
                self.sign.set(SignStage::Signer(signer), PhaseState::Started);
            }
        }
        debug!("party {} started phase {}", self.id, phase.number());
        Ok(Reply::Started(phase))
    }

    fn require<'a, T>(&self, data: Option<&'a T>, what: &str) -> CggmpResult<&'a T> {
        data.ok_or_else(|| {
            error!("party {} says: {} has not completed", self.id, what);
            CggmpError::OutOfOrder
        })
    }
}
