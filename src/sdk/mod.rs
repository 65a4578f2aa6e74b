pub mod api;
pub mod wire;

pub(crate) mod wire_bytes;
