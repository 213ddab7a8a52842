/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
/// pairs key-vector of values. Used for the render settings file: every title is a settings section, every key one option.
/// If some field i.e field_x is listed in the template but not found in the document it will be field_x:None.
///
/*
 render
   precision: 3
   columns: 2
 rewriter
   numeric_aliases: np, numpy
 units
   kNm: \mathrm{kNm}
*/
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type SectionMap = HashMap<String, Option<Vec<DocValue>>>;
pub type DocumentMap = HashMap<String, SectionMap>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl DocValue {
    pub fn as_string(&self) -> Option<&String> {
        if let DocValue::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let DocValue::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for DocValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocValue::String(s) => write!(f, "{}", s),
            DocValue::Float(val) => write!(f, "{}", val),
            DocValue::Integer(val) => write!(f, "{}", val),
            DocValue::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// Parses a title (word characters without spaces)
pub(crate) fn parse_title(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a key (word characters without spaces)
pub(crate) fn parse_key(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

pub(crate) fn parse_value(input: &str) -> IResult<&str, DocValue> {
    // a single value ends at a comma, whitespace or semicolon
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<DocValue, String> {
        if let Ok(val) = s.parse::<i64>() {
            Ok(DocValue::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(DocValue::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(DocValue::Boolean(val))
        } else {
            Ok(DocValue::String(s.to_string()))
        }
    });
    value_parser.parse(input)
}

/// comma separated values on the rest of the line; a key with nothing after the colon gets an empty list
pub(crate) fn parse_value_list(input: &str) -> IResult<&str, Vec<DocValue>> {
    let (input, _) = space0(input)?;
    let separator_comma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list0(separator_comma, parse_value);
    value_parser.parse(input)
}

/// Parses a key-value pair where value is a list
pub(crate) fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<DocValue>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_key, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a section with a title and multiple key-value pairs
pub(crate) fn parse_section(input: &str) -> IResult<&str, (String, HashMap<String, Vec<DocValue>>)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
pub(crate) fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a HashMap
pub fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let mut parser = many1(delimited(space0, parse_section, multispace0));
    let (input, sections) = parser.parse(input)?;

    let mut result = HashMap::new();
    for (title, section_map) in sections {
        // a repeated title extends the earlier section
        let title_map: &mut SectionMap = result.entry(title).or_default();
        for (key, values) in section_map {
            title_map.insert(key, Some(values));
        }
    }
    Ok((input, result))
}

/// Parses a document and merges with a template, ensuring all expected titles and keys exist
pub(crate) fn parse_document_with_template(
    input: &str,
    template: &DocumentMap,
) -> Result<DocumentMap, String> {
    let mut parsed = parse_complete(input)?;
    for (title, keys_map) in template {
        let section_map = parsed.entry(title.clone()).or_default();
        for key in keys_map.keys() {
            section_map.entry(key.clone()).or_insert(None);
        }
    }
    Ok(parsed)
}

fn parse_complete(input: &str) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    if filtered.trim().is_empty() {
        return Ok(HashMap::new());
    }
    match parse_document(&filtered) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            Ok(parsed)
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

/// Helper function to parse a document; comment lines are skipped, an empty document is an empty map
pub fn parse_document_as(
    input: &str,
    template: Option<&DocumentMap>,
) -> Result<DocumentMap, String> {
    match template {
        Some(template) => parse_document_with_template(input, template),
        None => parse_complete(input),
    }
}

/// template listing every key of `sections`, all set to None
pub fn template_of(sections: &[(&str, &[&str])]) -> DocumentMap {
    sections
        .iter()
        .map(|(title, keys)| {
            let keys: SectionMap = keys.iter().map(|k| (k.to_string(), None)).collect();
            (title.to_string(), keys)
        })
        .collect()
}
