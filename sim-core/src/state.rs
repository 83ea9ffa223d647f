//! Contract state blob encoding
//!
//! The canonical on-account representation is the encoded form the VM runner
//! consumes: a map whose keys and values are standard base64. The external
//! API surface presents the decoded key/value mapping. Encode and decode are
//! exact inverses for well-formed input.

use crate::CoreResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::BTreeMap;

/// Decoded contract state: UTF-8 keys mapped to UTF-8 values
pub type State = BTreeMap<String, String>;

/// Encoded contract state as the VM runner consumes it: base64 keys and values
pub type EncodedState = BTreeMap<String, String>;

/// Encode a decoded state map into the runner-consumed form
pub fn encode_state(state: &State) -> EncodedState {
    state
        .iter()
        .map(|(key, value)| (STANDARD.encode(key), STANDARD.encode(value)))
        .collect()
}

/// Decode a runner-produced state map back into UTF-8 key/value pairs
pub fn decode_state(encoded: &EncodedState) -> CoreResult<State> {
    encoded
        .iter()
        .map(|(key, value)| {
            let key = String::from_utf8(STANDARD.decode(key)?)?;
            let value = String::from_utf8(STANDARD.decode(value)?)?;
            Ok((key, value))
        })
        .collect()
}
