//! Load annuity definitions from JSON

use std::fs;
use std::io::Read;
use std::path::Path;

use super::AnnuityDefinition;
use crate::error::{EngineError, EngineResult};

/// Parse an annuity definition from a JSON document
///
/// Empty or whitespace-only input is rejected before parsing.
pub fn parse_annuity(text: &str) -> EngineResult<AnnuityDefinition> {
    if text.trim().is_empty() {
        return Err(EngineError::EmptyInput);
    }
    Ok(serde_json::from_str(text)?)
}

/// Load an annuity definition from any reader (e.g., request body, stdin)
pub fn load_annuity_from_reader<R: Read>(mut reader: R) -> EngineResult<AnnuityDefinition> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| EngineError::Serialization(e.to_string()))?;
    parse_annuity(&text)
}

/// Load an annuity definition from a JSON file
pub fn load_annuity<P: AsRef<Path>>(path: P) -> EngineResult<AnnuityDefinition> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| EngineError::Serialization(format!("{}: {}", path.display(), e)))?;
    parse_annuity(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annuity::FlowKind;

    #[test]
    fn test_empty_body_rejected() {
        assert!(matches!(parse_annuity(""), Err(EngineError::EmptyInput)));
        assert!(matches!(parse_annuity("  \n"), Err(EngineError::EmptyInput)));
        assert!(matches!(load_annuity_from_reader("".as_bytes()), Err(EngineError::EmptyInput)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_annuity("{\"CashFlows\": ["), Err(EngineError::Serialization(_))));
    }

    #[test]
    fn test_load_from_reader() {
        let body = r#"{"Compounding":"Annual","Unknown":true,"CashFlows":[
            {"CfType":"Invest","First":"2023-01-01","Number":1,"Amount":1000,"Frequency":"Annual"},
            {"CfType":"Return","First":"2024-01-01","Number":1,"Amount":1100,"Frequency":"Annual"}]}"#;
        let annuity = load_annuity_from_reader(body.as_bytes()).unwrap();
        assert!(annuity.unknown);
        assert_eq!(annuity.cash_flows.len(), 2);
        assert_eq!(annuity.cash_flows[0].kind, FlowKind::Invest);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_annuity("does/not/exist.json"),
            Err(EngineError::Serialization(_))
        ));
    }
}
