use crate::error::Result;

use super::Report;

/// Render a report as pretty-printed JSON.
pub fn render(report: Report<'_>) -> Result<String> {
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{MatchKind, MatchResult};

    #[test]
    fn match_result_is_flat_object() {
        let result = MatchResult {
            kind: MatchKind::Partial,
            explanation: "metadata differs".into(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&render(Report::Match(&result)).unwrap()).unwrap();
        assert_eq!(value["kind"], "partial");
        assert_eq!(value["explanation"], "metadata differs");
    }
}
