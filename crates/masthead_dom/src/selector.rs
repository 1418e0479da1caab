//! CSS selector subset: parsing and matching
//!
//! Supports the selectors header locators are written with:
//!
//! - Type and universal selectors: `header`, `*`
//! - ID and class selectors: `#masthead`, `.wp-block-template-part`
//! - Attribute presence and equality: `[role]`, `[role="banner"]`
//! - Compound selectors: `header.site-header#top`
//! - Descendant and child combinators: `.wp-site-blocks header`, `.a > header`
//! - Selector lists: `header.x, .y > header`
//!
//! Pseudo-classes, pseudo-elements and the sibling combinators are reported
//! as [`SelectorError::Unsupported`]; anything else that does not parse is
//! [`SelectorError::Invalid`].

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt, value},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};
use smallvec::SmallVec;

use crate::error::SelectorError;

type ParseResult<'a, O> = IResult<&'a str, O>;

/// Read-only view of a tree that selectors can be matched against
pub trait SelectorSubject {
    /// Node handle
    type Node: Copy;

    /// Lowercase tag name
    fn tag_name(&self, node: Self::Node) -> &str;
    /// Value of the `id` attribute
    fn element_id(&self, node: Self::Node) -> Option<&str>;
    /// Whether the class list contains `class`
    fn has_class(&self, node: Self::Node, class: &str) -> bool;
    /// Attribute value by name
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
    /// Parent element, if any
    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;
}

/// Relationship between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor
    Descendant,
    /// `>`: direct parent
    Child,
}

/// Attribute condition inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    /// `None` tests presence only
    pub value: Option<String>,
}

/// A sequence of simple selectors with no combinator, e.g. `header.site#top`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Tag name; `None` for `*` or an omitted type selector
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: SmallVec<[String; 2]>,
    pub attributes: SmallVec<[AttributeSelector; 1]>,
}

impl CompoundSelector {
    /// Match this compound against a single node
    pub fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Node) -> bool {
        if let Some(tag) = &self.tag {
            if !subject.tag_name(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if subject.element_id(node) != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| subject.has_class(node, c)) {
            return false;
        }
        self.attributes.iter().all(|attr| {
            match (subject.attribute(node, &attr.name), &attr.value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }
}

/// Compound selectors joined by combinators, e.g. `.wp-site-blocks > header`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// Compounds in source order (leftmost first)
    pub compounds: Vec<CompoundSelector>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Match right-to-left: the last compound must match `node` itself
    pub fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Node) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_from(subject, n - 1, node),
        }
    }

    fn matches_from<S: SelectorSubject>(&self, subject: &S, index: usize, node: S::Node) -> bool {
        if !self.compounds[index].matches(subject, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => subject
                .parent_element(node)
                .is_some_and(|parent| self.matches_from(subject, index - 1, parent)),
            Combinator::Descendant => {
                let mut current = subject.parent_element(node);
                while let Some(ancestor) = current {
                    if self.matches_from(subject, index - 1, ancestor) {
                        return true;
                    }
                    current = subject.parent_element(ancestor);
                }
                false
            }
        }
    }
}

/// Comma-separated selector list; matches when any member matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    /// Parse a selector list, requiring the whole input to be consumed
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        match selector_list(trimmed) {
            Ok(("", list)) => Ok(list),
            Ok((rest, _)) => Err(error_at(trimmed, rest)),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(error_at(trimmed, e.input)),
            Err(nom::Err::Incomplete(_)) => Err(SelectorError::Invalid {
                column: trimmed.len() + 1,
                message: "unexpected end of selector".to_string(),
            }),
        }
    }

    pub fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Node) -> bool {
        self.0.iter().any(|selector| selector.matches(subject, node))
    }
}

/// Classify the point where parsing stopped
fn error_at(original: &str, rest: &str) -> SelectorError {
    let column = original.len() - rest.len() + 1;
    let rest = rest.trim_start();
    if rest.starts_with(':') || rest.starts_with('+') || rest.starts_with('~') {
        let fragment: String = rest.chars().take(20).collect();
        return SelectorError::Unsupported(fragment);
    }
    let message = match rest.chars().next() {
        Some(c) => format!("unexpected '{}'", c),
        None => "unexpected end of selector".to_string(),
    };
    SelectorError::Invalid { column, message }
}

// ============================================================================
// Grammar
// ============================================================================

/// Identifier (alphanumeric, hyphen, underscore)
fn identifier(input: &str) -> ParseResult<&str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

fn type_selector(input: &str) -> ParseResult<Option<String>> {
    alt((
        value(None, char('*')),
        map(identifier, |tag: &str| Some(tag.to_ascii_lowercase())),
    ))(input)
}

fn quoted(input: &str) -> ParseResult<&str> {
    alt((
        delimited(char('"'), map(opt(is_not("\"")), |s| s.unwrap_or("")), char('"')),
        delimited(char('\''), map(opt(is_not("'")), |s| s.unwrap_or("")), char('\'')),
    ))(input)
}

fn attribute_selector(input: &str) -> ParseResult<AttributeSelector> {
    let (input, _) = char('[')(input)?;
    let (input, name) = delimited(multispace0, identifier, multispace0)(input)?;
    let (input, attr_value) = opt(preceded(
        char('='),
        delimited(multispace0, alt((quoted, identifier)), multispace0),
    ))(input)?;
    let (input, _) = char(']')(input)?;

    Ok((
        input,
        AttributeSelector {
            name: name.to_ascii_lowercase(),
            value: attr_value.map(str::to_string),
        },
    ))
}

enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
}

fn simple_selector(input: &str) -> ParseResult<SimpleSelector> {
    alt((
        map(preceded(char('#'), identifier), |id: &str| {
            SimpleSelector::Id(id.to_string())
        }),
        map(preceded(char('.'), identifier), |class: &str| {
            SimpleSelector::Class(class.to_string())
        }),
        map(attribute_selector, SimpleSelector::Attribute),
    ))(input)
}

fn compound_selector(input: &str) -> ParseResult<CompoundSelector> {
    let (rest, tag) = opt(type_selector)(input)?;
    let (rest, simples) = many0(simple_selector)(rest)?;

    if tag.is_none() && simples.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let mut compound = CompoundSelector {
        tag: tag.flatten(),
        ..Default::default()
    };
    for simple in simples {
        match simple {
            SimpleSelector::Id(id) => compound.id = Some(id),
            SimpleSelector::Class(class) => compound.classes.push(class),
            SimpleSelector::Attribute(attr) => compound.attributes.push(attr),
        }
    }
    Ok((rest, compound))
}

fn combinator(input: &str) -> ParseResult<Combinator> {
    alt((
        value(
            Combinator::Child,
            delimited(multispace0, char('>'), multispace0),
        ),
        value(Combinator::Descendant, multispace1),
    ))(input)
}

fn complex_selector(input: &str) -> ParseResult<ComplexSelector> {
    let (mut input, first) = compound_selector(input)?;
    let mut selector = ComplexSelector {
        compounds: vec![first],
        combinators: Vec::new(),
    };

    // A trailing combinator with nothing after it is left unconsumed
    loop {
        let Ok((after_comb, comb)) = combinator(input) else {
            break;
        };
        let Ok((after_compound, compound)) = compound_selector(after_comb) else {
            break;
        };
        selector.combinators.push(comb);
        selector.compounds.push(compound);
        input = after_compound;
    }

    Ok((input, selector))
}

fn selector_list(input: &str) -> ParseResult<SelectorList> {
    let (input, first) = complex_selector(input)?;
    let (input, rest) = many0(preceded(
        delimited(multispace0, char(','), multispace0),
        complex_selector,
    ))(input)?;

    let mut selectors = Vec::with_capacity(rest.len() + 1);
    selectors.push(first);
    selectors.extend(rest);
    Ok((input, SelectorList(selectors)))
}

/// Split a comma-separated selector string at top-level commas
///
/// Commas nested inside `(...)` or `[...]` belong to a single selector.
/// Empty entries are dropped and every entry is trimmed.
pub fn split_selector_list(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
