//! Calculator tool — evaluates restricted arithmetic expressions.
//!
//! Input may only contain digits, `+ - * / ( ) .` and whitespace. The
//! expression is evaluated by a recursive-descent parser; nothing is ever
//! handed to a dynamic evaluator. Every outcome, including failures, is a
//! plain string.

use async_trait::async_trait;
use miniagent_core::error::ToolError;
use miniagent_core::tool::{Tool, ToolResult};
use tracing::debug;

/// Substrings that indicate an attempt at dynamic code execution.
const UNSAFE_PATTERNS: [&str; 3] = ["eval", "Function", "constructor"];

const INVALID_CHARACTERS: &str = "Error: Invalid characters in expression. Only numbers and basic math operators (+, -, *, /, (, )) are allowed.";
const UNSAFE_EXPRESSION: &str = "Error: Potentially unsafe expression detected.";
const INVALID_RESULT: &str = "Error: Invalid calculation result.";

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluates a math expression. Supports +, -, *, /, ** (power), parentheses, and decimal numbers."
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let expr = arguments["expression"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'expression' argument".into()))?;

        Ok(ToolResult::text(calculate(expr)))
    }
}

/// Evaluate `expression` and describe the outcome.
///
/// Returns `The result of <expr> is <value>` on success and an `Error: ...`
/// string otherwise. Never panics.
pub fn calculate(expression: &str) -> String {
    let clean = expression.trim();

    // Checked before the character whitelist so these are always reported
    // as unsafe.
    if UNSAFE_PATTERNS.iter().any(|p| clean.contains(p)) {
        return UNSAFE_EXPRESSION.into();
    }

    if !has_only_allowed_chars(clean) {
        return INVALID_CHARACTERS.into();
    }

    let value = match evaluate(clean) {
        Ok(value) => value,
        Err(e) => {
            debug!(expression = clean, error = %e, "Calculator could not evaluate expression");
            return format!(
                "Error: Could not calculate \"{expression}\". Please check your expression and try again."
            );
        }
    };

    if !value.is_finite() {
        return INVALID_RESULT.into();
    }

    format!("The result of {clean} is {}", format_value(value))
}

fn has_only_allowed_chars(expr: &str) -> bool {
    !expr.is_empty()
        && expr
            .chars()
            .all(|c| c.is_ascii_digit() || "+-*/().".contains(c) || c.is_whitespace())
}

/// Integers print without a fractional part, everything else with two decimals.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        if value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        }
    } else {
        format!("{value:.2}")
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Evaluate a mathematical expression string.
///
/// Division by zero is not an error here: it yields an infinite or NaN
/// value, which [`calculate`] reports as an invalid result.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!(
            "Unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        ));
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let token = match chars[i] {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Token::StarStar
            }
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| format!("Invalid number: {}", num_str))?;
                tokens.push(Token::Number(num));
                continue;
            }
            c => return Err(format!("Unexpected character: '{}'", c)),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.consume();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.consume();
                    left /= self.parse_unary()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = ('-' | '+') unary | power
    fn parse_unary(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                Ok(-self.parse_unary()?)
            }
            Some(Token::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // power = primary ('**' unary)?   (right-associative)
    fn parse_power(&mut self) -> Result<f64, String> {
        let base = self.parse_primary()?;
        if self.peek() == Some(&Token::StarStar) {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, String> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                let val = self.parse_expr()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err("Expected closing parenthesis".into()),
                }
            }
            Some(tok) => Err(format!("Unexpected token: {:?}", tok)),
            None => Err("Unexpected end of expression".into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_addition() {
        assert_eq!(calculate("2+2"), "The result of 2+2 is 4");
    }

    #[test]
    fn input_is_trimmed_in_output() {
        assert_eq!(calculate("  25 * 4 "), "The result of 25 * 4 is 100");
    }

    #[test]
    fn operator_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    }

    #[test]
    fn nested_parentheses() {
        assert_eq!(evaluate("((1 + 2) * (3 + 4))").unwrap(), 21.0);
    }

    #[test]
    fn fractional_results_use_two_decimals() {
        assert_eq!(calculate("10 / 4"), "The result of 10 / 4 is 2.50");
        assert_eq!(calculate("10 / 3"), "The result of 10 / 3 is 3.33");
    }

    #[test]
    fn exponentiation() {
        assert_eq!(calculate("2 ** 3"), "The result of 2 ** 3 is 8");
        assert_eq!(evaluate("2 ** 3 ** 2").unwrap(), 512.0);
        assert_eq!(evaluate("2 * 3 ** 2").unwrap(), 18.0);
        assert_eq!(evaluate("(1 + 1) ** -1").unwrap(), 0.5);
        assert!(calculate("2 ***3").starts_with("Error: Could not calculate"));
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
        assert_eq!(evaluate("+5 - -3").unwrap(), 8.0);
    }

    #[test]
    fn statement_separator_is_invalid() {
        assert_eq!(calculate("2+2; drop"), INVALID_CHARACTERS);
    }

    #[test]
    fn letters_are_invalid() {
        assert_eq!(calculate("2 ^ x"), INVALID_CHARACTERS);
    }

    #[test]
    fn unsafe_words_rejected_before_character_check() {
        assert_eq!(calculate("constructor"), UNSAFE_EXPRESSION);
        assert_eq!(calculate("1+1 constructor"), UNSAFE_EXPRESSION);
        assert_eq!(calculate("eval(1)"), UNSAFE_EXPRESSION);
        assert_eq!(calculate("Function"), UNSAFE_EXPRESSION);
    }

    #[test]
    fn division_by_zero_is_invalid_result() {
        assert_eq!(calculate("1 / 0"), INVALID_RESULT);
        assert_eq!(calculate("0 / 0"), INVALID_RESULT);
    }

    #[test]
    fn malformed_expression_reports_could_not_calculate() {
        let out = calculate("2 +");
        assert!(out.starts_with("Error: Could not calculate \"2 +\""));
        assert!(calculate("1.2.3").starts_with("Error: Could not calculate"));
        assert!(calculate("(1 + 2").starts_with("Error: Could not calculate"));
    }

    #[test]
    fn empty_expression_is_invalid() {
        assert_eq!(calculate("   "), INVALID_CHARACTERS);
    }

    #[tokio::test]
    async fn tool_execute() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "15 * 8"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "The result of 15 * 8 is 120");
    }

    #[tokio::test]
    async fn tool_error_text_is_not_success() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "abc"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.starts_with("Error:"));
    }

    #[tokio::test]
    async fn tool_missing_expression() {
        let tool = CalculatorTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(result.is_err());
    }
}
