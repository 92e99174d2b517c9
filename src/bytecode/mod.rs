//! Bytecode comparison: does deployed code match a stored artifact?
//!
//! A `full` match includes the metadata trailer, so the sources are
//! byte-identical too. A `partial` match means the executable code is the
//! same but the trailer differs (comments, paths, or source layout changed).

pub mod link;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, Result};
use crate::ir::LinkReferences;

pub use link::{has_placeholders, link_by_references, link_placeholders};

/// CBOR map of two entries whose first key is `"ipfs"`.
pub const METADATA_MARKER: [u8; 6] = [0xa2, 0x64, 0x69, 0x70, 0x66, 0x73];

/// Bytes cut in front of the marker.
const LENGTH_TRAILER_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Full,
    Partial,
    None,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Partial => write!(f, "partial"),
            Self::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub kind: MatchKind,
    pub explanation: String,
}

impl MatchResult {
    fn new(kind: MatchKind, explanation: impl Into<String>) -> Self {
        Self {
            kind,
            explanation: explanation.into(),
        }
    }
}

/// Classify deployed code against an artifact's bytecode.
///
/// `artifact` may be `0x`-prefixed hex text, as stored in artifacts, or raw
/// bytes. When `libraries` is given, every linker placeholder in hex text is
/// replaced with the first library's address before decoding.
pub fn compare_bytecode(
    deployed: &[u8],
    artifact: &[u8],
    libraries: Option<&BTreeMap<String, String>>,
) -> Result<MatchResult> {
    let artifact_code = match hex_text(artifact) {
        Some(text) => {
            let linked = match libraries {
                Some(libraries) => link_placeholders(text, libraries)?,
                None if has_placeholders(text) => return Err(ArtifactError::UnlinkedLibraries),
                None => text.into(),
            };
            decode_hex(&linked)?
        }
        None => artifact.to_vec(),
    };
    Ok(classify(deployed, &artifact_code))
}

/// Like [`compare_bytecode`], linking each library at the offsets the
/// artifact's link references record for it.
pub fn compare_with_link_references(
    deployed: &[u8],
    artifact: &[u8],
    link_references: &LinkReferences,
    libraries: &BTreeMap<String, String>,
) -> Result<MatchResult> {
    let artifact_code = match hex_text(artifact) {
        Some(text) if !link_references.is_empty() => {
            decode_hex(&link_by_references(text, link_references, libraries)?)?
        }
        Some(text) if has_placeholders(text) => return Err(ArtifactError::UnlinkedLibraries),
        Some(text) => decode_hex(text)?,
        None => artifact.to_vec(),
    };
    Ok(classify(deployed, &artifact_code))
}

/// Drop the trailing metadata block.
///
/// Cuts at the last `ipfs` metadata marker, two bytes in front of it.
/// Input without the marker comes back unchanged.
pub fn strip_metadata(code: &[u8]) -> &[u8] {
    match code
        .windows(METADATA_MARKER.len())
        .rposition(|window| window == METADATA_MARKER)
    {
        Some(idx) => &code[..idx.saturating_sub(LENGTH_TRAILER_LEN)],
        None => code,
    }
}

fn classify(deployed: &[u8], artifact: &[u8]) -> MatchResult {
    if deployed.is_empty() {
        return MatchResult::new(MatchKind::None, "no code is deployed at the address");
    }
    if deployed == artifact {
        return MatchResult::new(
            MatchKind::Full,
            "deployed bytecode is identical to the artifact, including metadata",
        );
    }

    let deployed_code = strip_metadata(deployed);
    let artifact_code = strip_metadata(artifact);
    if !deployed_code.is_empty() && deployed_code == artifact_code {
        return MatchResult::new(
            MatchKind::Partial,
            "executable code matches but embedded metadata differs \
             (sources, comments or paths changed)",
        );
    }

    MatchResult::new(
        MatchKind::None,
        format!(
            "executable code differs (deployed {} bytes, artifact {} bytes)",
            deployed.len(),
            artifact.len()
        ),
    )
}

/// The hex digits of `0x`-prefixed text, if `bytes` is such text.
fn hex_text(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?.trim();
    text.strip_prefix("0x")
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(text)?)
}
