mod api;
pub use api::*;

mod r1;
mod r2;
mod r3;
mod r4;

pub use r1::{Round1Message, R1};
pub use r2::{Round2Message, R2};
pub use r3::{Round3Message, R3};
pub use r4::R4;
