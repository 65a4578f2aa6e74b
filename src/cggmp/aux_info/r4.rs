use libpaillier::unknown_order::BigNumber;
use tracing::warn;

use crate::{
    crypto_tools::{
        curve::CurveParams,
        paillier::{
            zk::{fac, modulus, RingPedersen},
            DecryptionKey, EncryptionKey,
        },
    },
    sdk::api::{CggmpError, CggmpResult},
};

use super::{r3, AuxOutputData};

pub struct R4 {
    pub(super) id: u64,
    pub(super) curve: CurveParams,
    pub(super) dk: DecryptionKey,
    pub(super) setup: RingPedersen,
    /// `ssid xor rho`
    pub(super) session: BigNumber,
    pub(super) id_j: u64,
    pub(super) ek_j: EncryptionKey,
    pub(super) setup_j: RingPedersen,
}

impl R4 {
    pub fn round_out(self, msg_j: &r3::Round3Message) -> CggmpResult<AuxOutputData> {
        if !modulus::verify(&self.session, self.ek_j.n(), &msg_j.modulus) {
            warn!(
                "party {} says: bad mod proof from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }

        // the peer proved about its own modulus against our parameters
        if !fac::verify(
            &fac::Statement {
                ssid: &self.session,
                curve: &self.curve,
                n0: self.ek_j.n(),
                setup: &self.setup,
            },
            &msg_j.fac,
        ) {
            warn!(
                "party {} says: bad fac proof from party {}",
                self.id, self.id_j
            );
            return Err(CggmpError::Verification);
        }

        Ok(AuxOutputData::new(
            self.dk,
            self.setup,
            self.ek_j,
            self.setup_j,
        ))
    }
}
