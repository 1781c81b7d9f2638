//! Lossless PGN tokenizer.
//!
//! `tokenize` splits PGN text into [`Symbol`]s and `detokenize` glues them back together.
//! Every byte of the input ends up in exactly one symbol, so
//! `detokenize(&tokenize(s)) == s` holds for any string, well-formed PGN or not.
//!
//! # Example
//!
//! ```
//! use pgn_compression::pgn_tokens::{detokenize, tokenize, Symbol};
//!
//! let pgn = "1. e4 e5 2. Nf3!? {book} 1-0";
//! let symbols = tokenize(pgn);
//! assert_eq!(symbols[0], Symbol::MoveNumber { number: 1, dots: 1 });
//! assert_eq!(detokenize(&symbols), pgn);
//! ```

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use shakmaty::san::SanPlus;
use std::fmt;

/// Game termination markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Unknown,
}

impl GameResult {
    pub const ALL: [GameResult; 4] = [
        GameResult::WhiteWins,
        GameResult::BlackWins,
        GameResult::Draw,
        GameResult::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }

    fn from_word(word: &str) -> Option<GameResult> {
        GameResult::ALL.into_iter().find(|r| r.as_str() == word)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move-suffix annotations (`!`, `?!`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Annotation {
    Good,
    Mistake,
    Brilliant,
    Blunder,
    Interesting,
    Dubious,
}

impl Annotation {
    pub const ALL: [Annotation; 6] = [
        Annotation::Good,
        Annotation::Mistake,
        Annotation::Brilliant,
        Annotation::Blunder,
        Annotation::Interesting,
        Annotation::Dubious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Annotation::Good => "!",
            Annotation::Mistake => "?",
            Annotation::Brilliant => "!!",
            Annotation::Blunder => "??",
            Annotation::Interesting => "!?",
            Annotation::Dubious => "?!",
        }
    }

    fn from_word(word: &str) -> Option<Annotation> {
        Annotation::ALL.into_iter().find(|a| a.as_str() == word)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A SAN move (with its check or mate suffix) that prints back to exactly the
/// text it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SanMove(pub SanPlus);

impl SanMove {
    /// Parses `text` as SAN, rejecting spellings that shakmaty would print
    /// differently (`0-0`, `e8Q`, ...).
    pub fn parse_exact(text: &str) -> Option<SanMove> {
        let san_plus: SanPlus = text.parse().ok()?;
        if san_plus.to_string() == text {
            Some(SanMove(san_plus))
        } else {
            None
        }
    }
}

impl fmt::Display for SanMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SanMove {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for SanMove {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SanMove::parse_exact(&s).ok_or_else(|| D::Error::custom(format!("invalid SAN move {s:?}")))
    }
}

/// One unit of tokenized PGN text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Space,
    Newline,
    /// Run of whitespace other than `' '` and `'\n'`.
    Whitespace(String),
    /// `12.` has one dot, `12...` three.
    MoveNumber { number: u32, dots: u8 },
    Move(SanMove),
    Annotation(Annotation),
    Nag(u8),
    Result(GameResult),
    /// Body of a `{...}` comment.
    Comment(String),
    /// Body of a `;` comment, without the line break.
    LineComment(String),
    VariationStart,
    VariationEnd,
    Tag { name: String, value: String },
    Raw(String),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Space => f.write_str(" "),
            Symbol::Newline => f.write_str("\n"),
            Symbol::Whitespace(ws) => f.write_str(ws),
            Symbol::MoveNumber { number, dots } => {
                write!(f, "{number}")?;
                for _ in 0..*dots {
                    f.write_str(".")?;
                }
                Ok(())
            }
            Symbol::Move(san) => write!(f, "{san}"),
            Symbol::Annotation(annotation) => f.write_str(annotation.as_str()),
            Symbol::Nag(nag) => write!(f, "${nag}"),
            Symbol::Result(result) => f.write_str(result.as_str()),
            Symbol::Comment(text) => write!(f, "{{{text}}}"),
            Symbol::LineComment(text) => write!(f, ";{text}"),
            Symbol::VariationStart => f.write_str("("),
            Symbol::VariationEnd => f.write_str(")"),
            Symbol::Tag { name, value } => write!(f, "[{name} \"{value}\"]"),
            Symbol::Raw(text) => f.write_str(text),
        }
    }
}

/// Splits PGN text into symbols. Never fails: anything unrecognized becomes
/// [`Symbol::Raw`].
pub fn tokenize(pgn: &str) -> Vec<Symbol> {
    let bytes = pgn.as_bytes();
    let mut symbols = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &pgn[pos..];
        pos += match bytes[pos] {
            b' ' => {
                symbols.push(Symbol::Space);
                1
            }
            b'\n' => {
                symbols.push(Symbol::Newline);
                1
            }
            b'{' => match rest[1..].find('}') {
                Some(end) => {
                    symbols.push(Symbol::Comment(rest[1..1 + end].to_string()));
                    end + 2
                }
                None => {
                    symbols.push(Symbol::Raw(rest.to_string()));
                    rest.len()
                }
            },
            b';' => {
                let end = rest.find('\n').unwrap_or(rest.len());
                symbols.push(Symbol::LineComment(rest[1..end].to_string()));
                end
            }
            b'(' => {
                symbols.push(Symbol::VariationStart);
                1
            }
            b')' => {
                symbols.push(Symbol::VariationEnd);
                1
            }
            b'[' => match parse_tag(rest) {
                Some((tag, used)) => {
                    symbols.push(tag);
                    used
                }
                None => push_word(rest, &mut symbols),
            },
            c if c.is_ascii_whitespace() => {
                let end = rest
                    .bytes()
                    .position(|b| !b.is_ascii_whitespace() || b == b' ' || b == b'\n')
                    .unwrap_or(rest.len());
                symbols.push(Symbol::Whitespace(rest[..end].to_string()));
                end
            }
            _ => push_word(rest, &mut symbols),
        };
    }

    symbols
}

/// Concatenates the text of every symbol.
pub fn detokenize(symbols: &[Symbol]) -> String {
    symbols.iter().map(Symbol::to_string).collect()
}

fn is_word_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'(' | b')' | b';')
}

/// Classifies the word at the start of `rest` and returns its byte length.
/// The first character always belongs to the word.
fn push_word(rest: &str, symbols: &mut Vec<Symbol>) -> usize {
    let end = rest.as_bytes()[1..]
        .iter()
        .position(|&b| is_word_delimiter(b))
        .map_or(rest.len(), |i| i + 1);
    let word = &rest[..end];

    if let Some(result) = GameResult::from_word(word) {
        symbols.push(Symbol::Result(result));
    } else if let Some(nag) = parse_nag(word) {
        symbols.push(Symbol::Nag(nag));
    } else {
        match split_move_number(word) {
            Some((number, "")) => symbols.push(number),
            Some((number, move_text)) => {
                symbols.push(number);
                push_move_text(move_text, symbols);
            }
            None => push_move_text(word, symbols),
        }
    }

    end
}

/// SAN with an optional annotation suffix, a lone annotation, or raw text.
fn push_move_text(text: &str, symbols: &mut Vec<Symbol>) {
    let body = text.trim_end_matches(['!', '?']);
    let suffix = &text[body.len()..];

    let annotation = if suffix.is_empty() {
        None
    } else {
        match Annotation::from_word(suffix) {
            Some(annotation) => Some(annotation),
            None => {
                symbols.push(Symbol::Raw(text.to_string()));
                return;
            }
        }
    };

    if body.is_empty() {
        if let Some(annotation) = annotation {
            symbols.push(Symbol::Annotation(annotation));
        }
        return;
    }

    match SanMove::parse_exact(body) {
        Some(san) => {
            symbols.push(Symbol::Move(san));
            if let Some(annotation) = annotation {
                symbols.push(Symbol::Annotation(annotation));
            }
        }
        None => symbols.push(Symbol::Raw(text.to_string())),
    }
}

/// Parses digits without leading zeros.
fn parse_canonical_digits(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || (digits.len() > 1 && digits[0] == b'0') {
        return None;
    }
    btoi::btou(digits).ok()
}

fn parse_nag(word: &str) -> Option<u8> {
    let digits = word.strip_prefix('$')?;
    parse_canonical_digits(digits.as_bytes())?.try_into().ok()
}

/// `12.` / `12...` prefix of a word, returned with the remainder.
fn split_move_number(word: &str) -> Option<(Symbol, &str)> {
    let digit_len = word.bytes().take_while(u8::is_ascii_digit).count();
    let dots = word[digit_len..].bytes().take_while(|&b| b == b'.').count();
    if dots == 0 || dots > 3 {
        return None;
    }
    let number = parse_canonical_digits(word[..digit_len].as_bytes())?;
    let symbol = Symbol::MoveNumber {
        number,
        dots: dots as u8,
    };
    Some((symbol, &word[digit_len + dots..]))
}

/// `[Name "value"]` with a plain value.
fn parse_tag(rest: &str) -> Option<(Symbol, usize)> {
    let bytes = rest.as_bytes();
    let name_len = bytes[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if name_len == 0 {
        return None;
    }
    let value_start = 1 + name_len + 2;
    if bytes.get(1 + name_len..value_start)? != b" \"" {
        return None;
    }
    let value_len = bytes[value_start..]
        .iter()
        .position(|&b| matches!(b, b'"' | b'\\' | b'\n' | b'\r'))?;
    let close = value_start + value_len;
    if bytes.get(close..close + 2)? != b"\"]" {
        return None;
    }
    let tag = Symbol::Tag {
        name: rest[1..1 + name_len].to_string(),
        value: rest[value_start..close].to_string(),
    };
    Some((tag, close + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san(text: &str) -> Symbol {
        Symbol::Move(SanMove::parse_exact(text).unwrap())
    }

    #[test]
    fn test_tokenize_move_text() {
        let symbols = tokenize("1. e4 e5 2. Nf3 *");
        assert_eq!(
            symbols,
            vec![
                Symbol::MoveNumber { number: 1, dots: 1 },
                Symbol::Space,
                san("e4"),
                Symbol::Space,
                san("e5"),
                Symbol::Space,
                Symbol::MoveNumber { number: 2, dots: 1 },
                Symbol::Space,
                san("Nf3"),
                Symbol::Space,
                Symbol::Result(GameResult::Unknown),
            ]
        );
    }

    #[test]
    fn test_suffixes_and_annotations() {
        let symbols = tokenize("Bxf7+!! Qf7#? e8=Q+ O-O-O ?!");
        assert_eq!(symbols[0], san("Bxf7+"));
        assert_eq!(symbols[1], Symbol::Annotation(Annotation::Brilliant));
        assert_eq!(symbols[3], san("Qf7#"));
        assert_eq!(symbols[4], Symbol::Annotation(Annotation::Mistake));
        assert_eq!(symbols[6], san("e8=Q+"));
        assert_eq!(symbols[8], san("O-O-O"));
        assert_eq!(symbols[10], Symbol::Annotation(Annotation::Dubious));
    }

    #[test]
    fn test_black_move_number_and_glued_move() {
        let symbols = tokenize("12... Rxd1 3.d4");
        assert_eq!(symbols[0], Symbol::MoveNumber { number: 12, dots: 3 });
        assert_eq!(symbols[4], Symbol::MoveNumber { number: 3, dots: 1 });
        assert_eq!(symbols[5], san("d4"));
    }

    #[test]
    fn test_results_and_nags() {
        let symbols = tokenize("1-0 0-1 1/2-1/2 $14 $256 $01");
        assert_eq!(symbols[0], Symbol::Result(GameResult::WhiteWins));
        assert_eq!(symbols[2], Symbol::Result(GameResult::BlackWins));
        assert_eq!(symbols[4], Symbol::Result(GameResult::Draw));
        assert_eq!(symbols[6], Symbol::Nag(14));
        assert_eq!(symbols[8], Symbol::Raw("$256".to_string()));
        assert_eq!(symbols[10], Symbol::Raw("$01".to_string()));
    }

    #[test]
    fn test_comments_and_variations() {
        let symbols = tokenize("e4 {best by test} (1. d4; queen pawn\n) e5");
        assert_eq!(symbols[2], Symbol::Comment("best by test".to_string()));
        assert_eq!(symbols[4], Symbol::VariationStart);
        assert_eq!(symbols[8], Symbol::LineComment(" queen pawn".to_string()));
        assert_eq!(symbols[9], Symbol::Newline);
        assert_eq!(symbols[10], Symbol::VariationEnd);
    }

    #[test]
    fn test_tags() {
        let symbols = tokenize("[Event \"F/S Return Match\"]\n[Bad \"a\\\"b\"]");
        assert_eq!(
            symbols[0],
            Symbol::Tag {
                name: "Event".to_string(),
                value: "F/S Return Match".to_string(),
            }
        );
        assert_eq!(symbols[1], Symbol::Newline);
        assert!(matches!(symbols[2], Symbol::Raw(_)));
    }

    #[test]
    fn test_non_canonical_spellings_are_raw() {
        let symbols = tokenize("0-0 e8Q 01. xyz");
        assert_eq!(symbols[0], Symbol::Raw("0-0".to_string()));
        assert_eq!(symbols[2], Symbol::Raw("e8Q".to_string()));
        assert_eq!(symbols[4], Symbol::Raw("01.".to_string()));
        assert_eq!(symbols[6], Symbol::Raw("xyz".to_string()));
    }

    #[test]
    fn test_round_trip_is_exact() {
        let inputs = [
            "",
            "e",
            "}",
            "  \t\r\n\n",
            "1.e4 e5!? 2.Nf3 {unterminated",
            "[Event \"x\"]\r\n[Site \"?\"]\r\n\r\n1. e4 ⩲ e5 1/2-1/2",
            "((()))[[]]$$;\n;",
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 {This opening is called the Ruy Lopez.} 4. Ba4 Nf6 *",
            "Grüße 1... Kxe1 ½-½",
        ];
        for input in inputs {
            assert_eq!(detokenize(&tokenize(input)), input, "input {input:?}");
        }
    }
}
