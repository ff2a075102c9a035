use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Output line returned when no `print` literal was found in the code
pub const NO_OUTPUT_DETECTED: &str = "(no output detected)";

// ECMAScript whitespace: includes U+FEFF (a leading BOM), excludes U+0085.
const JS_WHITESPACE: &str =
    r"[\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]";

const PRINT_TEMPLATE: &str =
    r#"^WS*printWS*\((?:"([^\r\x{2028}\x{2029}]*)"|'([^\r\x{2028}\x{2029}]*)'|`([^\r\x{2028}\x{2029}]*)`)WS*\)WS*$"#;

lazy_static! {
    // One capture group per delimiter. The literal may not contain line
    // separators, and it must close with the character it opened with.
    static ref PRINT_LITERAL: Regex = Regex::new(&PRINT_TEMPLATE.replace("WS", JS_WHITESPACE))
        .expect("print literal pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax issue: {0}")]
pub struct SyntaxIssue(pub String);

/// Character counts gathered over the whole submitted text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceReport {
    /// Combined number of `"` and `'` characters
    pub quote_count: usize,
    pub paren_open: usize,
    pub paren_close: usize,
}

impl BalanceReport {
    pub fn is_balanced(&self) -> bool {
        self.quote_count % 2 == 0 && self.paren_open == self.paren_close
    }
}

/// Counts quotes and parentheses across the entire text.
///
/// This is deliberately not a tokenizer: quotes inside comments or string
/// literals count the same as any other.
pub fn check_balance(code: &str) -> BalanceReport {
    code.chars().fold(BalanceReport::default(), |mut report, c| {
        match c {
            '"' | '\'' => report.quote_count += 1,
            '(' => report.paren_open += 1,
            ')' => report.paren_close += 1,
            _ => {}
        }
        report
    })
}

/// Approximates running `code` by collecting the literal argument of every
/// line that is exactly one `print("...")` call.
///
/// Fails when the whole-text quote/parenthesis balance check fails. Lines that
/// are not a single literal print are skipped silently.
pub fn simulate(code: &str) -> Result<Vec<String>, SyntaxIssue> {
    let balance = check_balance(code);
    if !balance.is_balanced() {
        debug!(
            quotes = balance.quote_count,
            open = balance.paren_open,
            close = balance.paren_close,
            "Balance check failed"
        );
        return Err(SyntaxIssue("unbalanced quotes or parentheses".to_string()));
    }

    let mut outputs: Vec<String> = code.lines().filter_map(print_literal).collect();

    if outputs.is_empty() {
        outputs.push(NO_OUTPUT_DETECTED.to_string());
    }

    Ok(outputs)
}

/// Same as [`simulate`], with the output lines joined by `\n`
pub fn simulate_to_string(code: &str) -> Result<String, SyntaxIssue> {
    simulate(code).map(|lines| lines.join("\n"))
}

fn print_literal(line: &str) -> Option<String> {
    let caps = PRINT_LITERAL.captures(line)?;
    (1..=3)
        .find_map(|group| caps.get(group))
        .map(|m| m.as_str().to_string())
}
