//! File and directory name templates
//!
//! Templates are parsed once when the naming table is built, so an unknown
//! placeholder is a configuration error rather than a per-request failure.
//!
//! | Placeholder | Renders as |
//! |---|---|
//! | `{mm-dd-yyyy}` | effective date, e.g. `10-05-2023` |
//! | `{yyyymmdd}` | effective date, e.g. `20231005` |
//! | `{yymmdd}` | effective date, e.g. `231005` |
//! | `{index}` | part index, e.g. `3` |
//! | `{index2}` | part index padded to two digits, e.g. `03` |
//! | `{letter}` | part index as a volume letter, `1` → `A` |
//! | `{name}` | geography display name, e.g. `Dallas-Ft_Worth` |
//! | `{region}` | upper-case geography code, e.g. `NE` |
//! | `{cycle}` | cycle number of the record |

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{NamingError, NamingResult};

/// Values a template can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DateDashed,
    DateCompact,
    DateShort,
    Index,
    IndexPadded,
    Letter,
    Name,
    Region,
    Cycle,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "mm-dd-yyyy" => Some(Self::DateDashed),
            "yyyymmdd" => Some(Self::DateCompact),
            "yymmdd" => Some(Self::DateShort),
            "index" => Some(Self::Index),
            "index2" => Some(Self::IndexPadded),
            "letter" => Some(Self::Letter),
            "name" => Some(Self::Name),
            "region" => Some(Self::Region),
            "cycle" => Some(Self::Cycle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(Field),
}

/// Inputs for rendering one name
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub effective_date: NaiveDate,
    pub cycle: Option<&'a str>,
    pub index: u32,
    pub name: &'a str,
    pub region: &'a str,
}

/// Parsed name template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    tokens: Vec<Token>,
}

impl Template {
    /// Parse a template string
    pub fn parse(source: &str) -> NamingResult<Self> {
        let mut tokens = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                tokens.push(Token::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| NamingError::UnterminatedPlaceholder {
                    template: source.to_string(),
                })?;
            let name = &after[..close];
            let field = Field::from_name(name).ok_or_else(|| NamingError::UnknownPlaceholder {
                name: name.to_string(),
                template: source.to_string(),
            })?;
            tokens.push(Token::Field(field));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            tokens.push(Token::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    /// Template text as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template refers to `field`
    pub fn uses(&self, field: Field) -> bool {
        self.tokens.iter().any(|t| *t == Token::Field(field))
    }

    /// Render with the given context
    pub fn render(&self, ctx: &RenderContext<'_>) -> NamingResult<String> {
        let mut out = String::with_capacity(self.source.len() + 16);
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field(field) => self.render_field(*field, ctx, &mut out)?,
            }
        }
        Ok(out)
    }

    fn render_field(&self, field: Field, ctx: &RenderContext<'_>, out: &mut String) -> NamingResult<()> {
        use std::fmt::Write;

        // Writing into a String cannot fail
        let _ = match field {
            Field::DateDashed => write!(out, "{}", ctx.effective_date.format("%m-%d-%Y")),
            Field::DateCompact => write!(out, "{}", ctx.effective_date.format("%Y%m%d")),
            Field::DateShort => write!(out, "{}", ctx.effective_date.format("%y%m%d")),
            Field::Index => write!(out, "{}", ctx.index),
            Field::IndexPadded => write!(out, "{:02}", ctx.index),
            Field::Letter => {
                let letter = letter_for(ctx.index)?;
                write!(out, "{}", letter)
            }
            Field::Name => write!(out, "{}", ctx.name),
            Field::Region => write!(out, "{}", ctx.region),
            Field::Cycle => {
                let cycle = ctx.cycle.ok_or_else(|| NamingError::MissingCycleNumber {
                    template: self.source.clone(),
                })?;
                write!(out, "{}", cycle)
            }
        };
        Ok(())
    }
}

/// Volume letter for a one-based index
fn letter_for(index: u32) -> NamingResult<char> {
    if (1..=26).contains(&index) {
        Ok(char::from(b'A' + (index - 1) as u8))
    } else {
        Err(NamingError::LetterOutOfRange { index })
    }
}

impl FromStr for Template {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Template {
    type Error = NamingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
