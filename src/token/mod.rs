//! Playback token encoding and decoding
//!
//! The token is the only state that survives between platform callbacks;
//! it must round-trip the full remaining playlist plus cursor losslessly.

mod codec;
mod error;

pub use codec::{decode, encode, DecodedToken, TokenMeta, MAX_TOKEN_LEN, SAFE_TOKEN};
pub use error::TokenError;
