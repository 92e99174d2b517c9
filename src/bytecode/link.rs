//! Library linking: writing library addresses over linker placeholders.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ArtifactError, Result};
use crate::ir::{LinkOffset, LinkReferences};

/// `__$` + 34 hex chars + `$__`: a 20-byte address stand-in in hex text.
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__\$[0-9a-fA-F]{34}\$__").unwrap());

/// Hex characters in an address.
const ADDRESS_HEX_LEN: usize = 40;

/// Whether hex text still contains unlinked library placeholders.
pub fn has_placeholders(hex_text: &str) -> bool {
    PLACEHOLDER_RE.is_match(hex_text)
}

/// Replace every placeholder with one library address.
///
/// Placeholders are not told apart: all of them receive the same address.
/// With more than one library, the first by name is used. Use
/// [`link_by_references`] when the artifact's link references are at hand.
pub fn link_placeholders<'a>(
    hex_text: &'a str,
    libraries: &BTreeMap<String, String>,
) -> Result<Cow<'a, str>> {
    let Some((library, address)) = libraries.iter().next() else {
        return Ok(Cow::Borrowed(hex_text));
    };
    if libraries.len() > 1 {
        tracing::warn!(
            library = %library,
            count = libraries.len(),
            "several libraries supplied without link references, linking all placeholders to the first"
        );
    }
    let address = normalize_address(library, address)?;
    Ok(PLACEHOLDER_RE.replace_all(hex_text, address.as_str()))
}

/// Write each library's address at the offsets its link references record.
///
/// `libraries` keys may be fully qualified (`path:Name`) or bare names.
pub fn link_by_references(
    hex_text: &str,
    link_references: &LinkReferences,
    libraries: &BTreeMap<String, String>,
) -> Result<String> {
    let mut linked = hex_text.as_bytes().to_vec();

    for (file, libs) in link_references {
        for (name, offsets) in libs {
            let qualified = format!("{file}:{name}");
            let address = libraries
                .get(&qualified)
                .or_else(|| libraries.get(name))
                .ok_or_else(|| ArtifactError::UnresolvedLibrary(qualified.clone()))?;
            let address = normalize_address(&qualified, address)?;

            for offset in offsets {
                let range = hex_range(offset)
                    .filter(|range| range.len() == ADDRESS_HEX_LEN && range.end <= linked.len())
                    .ok_or_else(|| ArtifactError::Malformed {
                        file: qualified.clone(),
                        message: format!(
                            "link reference {}+{} does not fit the bytecode",
                            offset.start, offset.length
                        ),
                    })?;
                linked[range].copy_from_slice(address.as_bytes());
            }
        }
    }

    String::from_utf8(linked).map_err(|e| ArtifactError::Malformed {
        file: "bytecode".into(),
        message: e.to_string(),
    })
}

/// Byte offsets to hex character offsets, `None` on overflow.
fn hex_range(offset: &LinkOffset) -> Option<Range<usize>> {
    let start = offset.start.checked_mul(2)?;
    let end = start.checked_add(offset.length.checked_mul(2)?)?;
    Some(start..end)
}

/// Lower-case, strip `0x`, and check it is 20 bytes of hex.
fn normalize_address(library: &str, address: &str) -> Result<String> {
    let trimmed = address.trim();
    let bare = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .to_lowercase();
    if bare.len() != ADDRESS_HEX_LEN || !bare.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ArtifactError::InvalidLibraryAddress {
            library: library.to_string(),
            address: address.to_string(),
        });
    }
    Ok(bare)
}
