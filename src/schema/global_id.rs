//! Opaque global identifiers (`Node.id`) and their decoding.

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use thiserror::Error;

/// Decoded global identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalId {
    /// Node type name.
    pub type_name: String,
    /// Type-local identifier.
    pub id: String,
}

/// Reasons a global identifier fails to decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GlobalIdError {
    /// Not valid base64.
    #[error("global id is not base64 encoded")]
    Encoding,
    /// Decoded bytes are not UTF-8.
    #[error("global id is not valid UTF-8")]
    Utf8,
    /// Missing the `Type:id` separator or one of its halves.
    #[error("global id must have the form 'Type:id'")]
    Format,
}

/// Encodes and decodes global identifiers.
pub trait GlobalIdCodec: Send + Sync {
    /// Decodes an opaque identifier.
    fn decode(&self, raw: &str) -> Result<GlobalId, GlobalIdError>;
    /// Encodes a type name and id.
    fn encode(&self, type_name: &str, id: &str) -> String;
}

/// Relay convention: base64 of `"TypeName:id"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelayGlobalId;

impl GlobalIdCodec for RelayGlobalId {
    fn decode(&self, raw: &str) -> Result<GlobalId, GlobalIdError> {
        let bytes = BASE64_ENGINE
            .decode(raw)
            .map_err(|_| GlobalIdError::Encoding)?;
        let text = String::from_utf8(bytes).map_err(|_| GlobalIdError::Utf8)?;
        match text.split_once(':') {
            Some((type_name, id)) if !type_name.is_empty() && !id.is_empty() => Ok(GlobalId {
                type_name: type_name.to_owned(),
                id: id.to_owned(),
            }),
            _ => Err(GlobalIdError::Format),
        }
    }

    fn encode(&self, type_name: &str, id: &str) -> String {
        BASE64_ENGINE.encode(format!("{type_name}:{id}"))
    }
}
