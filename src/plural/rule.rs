//! CLDR plural rule conditions.
//!
//! ```text
//! condition     := and_condition ('or' and_condition)*
//! and_condition := relation ('and' relation)*
//! relation      := expr ('=' | '!=') range_list
//!                | expr 'is' 'not'? value
//!                | expr 'not'? ('in' | 'within') range_list
//! expr          := operand (('mod' | '%') value)?
//! range_list    := (value | value '..' value) (',' range_list)?
//! ```
//!
//! Sample lists (`@integer …`, `@decimal …`) end the condition and are
//! ignored. An empty condition never matches.

use crate::plural::{PluralOperands, RuleError};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    N,
    I,
    V,
    W,
    F,
    T,
    E,
}

impl Operand {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "n" => Operand::N,
            "i" => Operand::I,
            "v" => Operand::V,
            "w" => Operand::W,
            "f" => Operand::F,
            "t" => Operand::T,
            "e" | "c" => Operand::E,
            _ => return None,
        })
    }

    #[inline]
    fn value(self, o: &PluralOperands) -> f64 {
        match self {
            Operand::N => o.n,
            Operand::I => o.i as f64,
            Operand::V => f64::from(o.v),
            Operand::W => f64::from(o.w),
            Operand::F => o.f as f64,
            Operand::T => o.t as f64,
            Operand::E => f64::from(o.e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Relation {
    operand: Operand,
    modulus: Option<u64>,
    negated: bool,
    /// `within` admits non-integers inside a range; `in` does not.
    within: bool,
    ranges: SmallVec<[(u64, u64); 4]>,
}

impl Relation {
    fn matches(&self, o: &PluralOperands) -> bool {
        let mut x = self.operand.value(o);
        if let Some(m) = self.modulus {
            x %= m as f64;
        }
        let integral = x.fract() == 0.0;
        let hit = self
            .ranges
            .iter()
            .any(|&(lo, hi)| (self.within || integral) && x >= lo as f64 && x <= hi as f64);
        hit != self.negated
    }
}

/// A parsed rule condition: an `or` of `and`s of relations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rule {
    any: Vec<SmallVec<[Relation; 3]>>,
}

impl Rule {
    pub fn parse(source: &str) -> Result<Self, RuleError> {
        let end = memchr::memchr(b'@', source.as_bytes()).unwrap_or(source.len());
        let tokens = tokenize(source, &source[..end])?;
        Parser {
            source,
            tokens: &tokens,
            pos: 0,
        }
        .condition()
    }

    pub fn matches(&self, operands: &PluralOperands) -> bool {
        self.any
            .iter()
            .any(|all| all.iter().all(|relation| relation.matches(operands)))
    }

    /// True for a rule with no condition at all.
    pub fn is_empty(&self) -> bool {
        self.any.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Number(u64),
    Eq,
    NotEq,
    Comma,
    DotDot,
    Percent,
}

type Spanned<'a> = (usize, Token<'a>);

fn tokenize<'a>(source: &str, text: &'a str) -> Result<Vec<Spanned<'a>>, RuleError> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut at = 0;
    while at < bytes.len() {
        let start = at;
        let b = bytes[at];
        let token = match b {
            b if b.is_ascii_whitespace() => {
                at += 1;
                continue;
            }
            b'a'..=b'z' => {
                while at < bytes.len() && bytes[at].is_ascii_lowercase() {
                    at += 1;
                }
                Token::Word(&text[start..at])
            }
            b'0'..=b'9' => {
                while at < bytes.len() && bytes[at].is_ascii_digit() {
                    at += 1;
                }
                let n = text[start..at]
                    .parse()
                    .map_err(|_| syntax(source, start, "number too large"))?;
                Token::Number(n)
            }
            b'=' => {
                at += 1;
                Token::Eq
            }
            b'!' if bytes.get(at + 1) == Some(&b'=') => {
                at += 2;
                Token::NotEq
            }
            b',' => {
                at += 1;
                Token::Comma
            }
            b'.' if bytes.get(at + 1) == Some(&b'.') => {
                at += 2;
                Token::DotDot
            }
            b'%' => {
                at += 1;
                Token::Percent
            }
            _ => return Err(syntax(source, start, "unexpected character")),
        };
        out.push((start, token));
    }
    Ok(out)
}

fn syntax(rule: &str, position: usize, reason: &'static str) -> RuleError {
    RuleError::Syntax {
        rule: rule.to_owned(),
        position,
        reason,
    }
}

struct Parser<'t, 'a> {
    source: &'t str,
    tokens: &'t [Spanned<'a>],
    pos: usize,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<Token<'_>> {
        self.tokens.get(self.pos).map(|&(_, t)| t)
    }

    fn here(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |&(at, _)| at)
    }

    fn error(&self, reason: &'static str) -> RuleError {
        syntax(self.source, self.here(), reason)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek() == Some(Token::Word(word)) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn eat(&mut self, token: Token<'static>) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn number(&mut self) -> Result<u64, RuleError> {
        match self.peek() {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(n)
            }
            _ => Err(self.error("expected a number")),
        }
    }

    fn condition(mut self) -> Result<Rule, RuleError> {
        let mut rule = Rule::default();
        if self.peek().is_none() {
            return Ok(rule);
        }
        loop {
            let mut all = SmallVec::new();
            loop {
                all.push(self.relation()?);
                if !self.eat_word("and") {
                    break;
                }
            }
            rule.any.push(all);
            if !self.eat_word("or") {
                break;
            }
        }
        if self.peek().is_some() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(rule)
    }

    fn relation(&mut self) -> Result<Relation, RuleError> {
        let operand = match self.peek() {
            Some(Token::Word(w)) => Operand::from_name(w).ok_or_else(|| self.error("unknown operand"))?,
            _ => return Err(self.error("expected an operand")),
        };
        self.pos += 1;

        let modulus = if self.eat_word("mod") || self.eat(Token::Percent) {
            let m = self.number()?;
            if m == 0 {
                return Err(self.error("modulus must not be zero"));
            }
            Some(m)
        } else {
            None
        };

        let mut relation = Relation {
            operand,
            modulus,
            negated: false,
            within: false,
            ranges: SmallVec::new(),
        };

        if self.eat(Token::Eq) {
            relation.ranges = self.range_list()?;
        } else if self.eat(Token::NotEq) {
            relation.negated = true;
            relation.ranges = self.range_list()?;
        } else if self.eat_word("is") {
            relation.negated = self.eat_word("not");
            let n = self.number()?;
            relation.ranges.push((n, n));
        } else {
            relation.negated = self.eat_word("not");
            if self.eat_word("within") {
                relation.within = true;
            } else if !self.eat_word("in") {
                return Err(self.error("expected a relation"));
            }
            relation.ranges = self.range_list()?;
        }
        Ok(relation)
    }

    fn range_list(&mut self) -> Result<SmallVec<[(u64, u64); 4]>, RuleError> {
        let mut ranges = SmallVec::new();
        loop {
            let lo = self.number()?;
            let hi = if self.eat(Token::DotDot) {
                self.number()?
            } else {
                lo
            };
            if hi < lo {
                return Err(self.error("range bounds are reversed"));
            }
            ranges.push((lo, hi));
            if !self.eat(Token::Comma) {
                return Ok(ranges);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(rule: &str, n: &str) -> bool {
        Rule::parse(rule)
            .unwrap()
            .matches(&PluralOperands::from_decimal_str(n).unwrap())
    }

    #[test]
    fn english_one() {
        let rule = "i = 1 and v = 0 @integer 1";
        assert!(matches(rule, "1"));
        assert!(!matches(rule, "1.0"));
        assert!(!matches(rule, "2"));
    }

    #[test]
    fn russian_few_uses_modulus_and_ranges() {
        let rule = "v = 0 and i % 10 = 2..4 and i % 100 != 12..14";
        for yes in ["2", "3", "4", "22", "104"] {
            assert!(matches(rule, yes), "{yes}");
        }
        for no in ["1", "5", "12", "13", "2.5"] {
            assert!(!matches(rule, no), "{no}");
        }
    }

    #[test]
    fn legacy_keywords() {
        assert!(matches("n is 2", "2"));
        assert!(matches("n is not 2", "3"));
        assert!(matches("n mod 10 in 3..4,9", "13"));
        assert!(matches("n not in 1..3", "4"));
        assert!(matches("n within 0..2", "1.5"));
        assert!(!matches("n in 0..2", "1.5"));
        assert!(matches("n = 0 or n != 1 and n % 100 = 1..19", "0"));
    }

    #[test]
    fn empty_condition_never_matches() {
        let rule = Rule::parse(" @integer 0~15").unwrap();
        assert!(rule.is_empty());
        assert!(!rule.matches(&PluralOperands::from(0u64)));
    }

    #[test]
    fn reports_position_of_syntax_errors() {
        let err = Rule::parse("i = 1 and").unwrap_err();
        assert!(matches!(err, RuleError::Syntax { position: 9, .. }));
        let err = Rule::parse("q = 1").unwrap_err();
        assert!(matches!(err, RuleError::Syntax { position: 0, .. }));
        assert!(Rule::parse("n % 0 = 1").is_err());
        assert!(Rule::parse("n = 4..2").is_err());
        assert!(Rule::parse("n = 1 $").is_err());
    }
}
