//! Read fitted coefficients back out of a generated report.
//!
//! The fit pipeline reads every report back before writing it, so both
//! renderings are known to describe the same function.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::FitParams;

const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

static NATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^//\s*(?P<a>{NUMBER})\s*\*\s*ln\(\{{(?P<signal>[^}}]+)\}}\s*(?P<b>{NUMBER})\)\s*(?P<c>{NUMBER})\s*$"
    ))
    .expect("native expression pattern is valid")
});

static CPP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"float\s+(?P<name>\w+)\s*\(\s*StateSignal\s*&\s*\w+\s*\)\s*\{{\s*return\s+(?P<a>{NUMBER})\s*\*\s*log\(\s*\w+\.value\(\)\s*(?P<b>{NUMBER})\s*\)\s*(?P<c>{NUMBER})\s*;\s*\}}"
    ))
    .expect("C++ function pattern is valid")
});

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

static SIGNAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^{}\s]+$").expect("signal pattern is valid"));

/// `true` for names usable as a C++ function name.
pub fn is_cpp_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// `true` for names that fit between the braces of a native expression.
pub fn is_signal_name(name: &str) -> bool {
    SIGNAL_RE.is_match(name)
}

/// Native expression recovered from a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    /// Signal name (without braces) or C++ function name.
    pub name: String,
    pub params: FitParams,
}

/// Find the first native expression line (`// a * ln({SIG} +b) +c`) in `text`.
pub fn parse_native_expression(text: &str) -> Option<ParsedExpression> {
    let caps = NATIVE_RE.captures(text)?;
    Some(ParsedExpression {
        name: caps.name("signal")?.as_str().to_string(),
        params: params_from(&caps)?,
    })
}

/// Find the first generated C++ function in `text`.
pub fn parse_cpp_function(text: &str) -> Option<ParsedExpression> {
    let caps = CPP_RE.captures(text)?;
    Some(ParsedExpression {
        name: caps.name("name")?.as_str().to_string(),
        params: params_from(&caps)?,
    })
}

fn params_from(caps: &regex::Captures<'_>) -> Option<FitParams> {
    let num = |key: &str| -> Option<f64> { caps.name(key)?.as_str().parse().ok() };
    Some(FitParams::new(num("a")?, num("b")?, num("c")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::format::{cpp_function, native_expression};

    #[test]
    fn name_rules() {
        assert!(is_cpp_identifier("oil_pressure_prediction"));
        assert!(is_cpp_identifier("_p2"));
        assert!(!is_cpp_identifier("oil-pressure prediction"));
        assert!(!is_cpp_identifier("2fast"));
        assert!(!is_cpp_identifier(""));

        assert!(is_signal_name("M400_rpm"));
        assert!(is_signal_name("P.Engine-rpm"));
        assert!(!is_signal_name("M400 rpm"));
        assert!(!is_signal_name("rpm}"));
        assert!(!is_signal_name(""));
    }

    #[test]
    fn parses_rendered_native_expression() {
        let p = FitParams::new(21.5, -1234.5678, -95.25);
        let text = format!("// WinDarab function:\n// {}\n", native_expression(&p, "M400_rpm"));
        let parsed = parse_native_expression(&text).unwrap();
        assert_eq!(parsed.name, "M400_rpm");
        assert_eq!(parsed.params, FitParams::new(21.5, -1234.568, -95.25));
    }

    #[test]
    fn parses_rendered_cpp_function() {
        let p = FitParams::new(7.0, 512.0, 3.0);
        let parsed = parse_cpp_function(&cpp_function(&p, "oilp_pred")).unwrap();
        assert_eq!(parsed.name, "oilp_pred");
        assert_eq!(parsed.params, p);
    }

    #[test]
    fn rejects_unrelated_text() {
        assert!(parse_native_expression("// nothing here\n").is_none());
        assert!(parse_cpp_function("int main(){ return 0; }").is_none());
    }
}
