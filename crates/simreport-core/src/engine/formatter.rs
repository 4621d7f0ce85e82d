use super::error::EngineError;
use crate::core::catalog::codes::AttributeSpec;
use crate::core::catalog::{AttributeDescriptor, AttributeResolver};
use crate::core::models::document::{Block, LabeledList, Paragraph, TextStyle};
use crate::core::models::metadata::AttributeValueSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FormatError {
    #[error("malformed composition token '{token}' in '{value}' (expected element:count)")]
    MalformedComposition { value: String, token: String },
}

/// One `element:count` pair of an atomic composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementCount {
    pub element: String,
    pub count: String,
}

fn with_unit(value: &str, unit: &str) -> String {
    if unit.is_empty() {
        value.to_string()
    } else {
        format!("{value} {unit}")
    }
}

/// Formats one attribute line.
///
/// Returns `None` when there are no values. A single value becomes a
/// `"<label>: <value> <unit>"` paragraph; several values become a labeled list
/// in input order.
pub fn format_attribute(
    descriptor: &AttributeDescriptor,
    values: &[String],
    unit: &str,
) -> Option<Block> {
    match values {
        [] => None,
        [value] => {
            let mut paragraph = Paragraph::new();
            paragraph
                .push(format!("{}: ", descriptor.label()), TextStyle::Label)
                .push(with_unit(value, unit), TextStyle::Normal);
            Some(Block::Text(paragraph))
        }
        many => Some(Block::List(LabeledList {
            label: descriptor.label().to_string(),
            items: many.iter().map(|v| with_unit(v, unit)).collect(),
        })),
    }
}

/// Parses a whitespace-separated `element:count` list such as `"C:6 H:12 O:6"`.
pub fn parse_composition(value: &str) -> Result<Vec<ElementCount>, FormatError> {
    value
        .split_whitespace()
        .map(|token| match token.split_once(':') {
            Some((element, count)) if !element.is_empty() && !count.is_empty() => {
                Ok(ElementCount {
                    element: element.to_string(),
                    count: count.to_string(),
                })
            }
            _ => Err(FormatError::MalformedComposition {
                value: value.to_string(),
                token: token.to_string(),
            }),
        })
        .collect()
}

/// Formats atomic compositions with subscripted counts, one composition per line.
pub fn format_composition(
    descriptor: &AttributeDescriptor,
    values: &[String],
) -> Result<Option<Block>, FormatError> {
    if values.is_empty() {
        return Ok(None);
    }
    let mut paragraph = Paragraph::new();
    paragraph.push(format!("{}: ", descriptor.label()), TextStyle::Label);
    for value in values {
        for pair in parse_composition(value)? {
            paragraph
                .push(pair.element, TextStyle::Normal)
                .push(pair.count, TextStyle::Subscript);
        }
        paragraph.push_break();
    }
    Ok(Some(Block::Text(paragraph)))
}

/// Pairs a resolver with the formatting rules.
///
/// A code is only resolved when it has values, so a catalog never has to know
/// about attributes an experiment does not use.
pub struct AttributeFormatter<'r> {
    resolver: &'r dyn AttributeResolver,
}

impl<'r> AttributeFormatter<'r> {
    pub fn new(resolver: &'r dyn AttributeResolver) -> Self {
        Self { resolver }
    }

    pub fn attribute(
        &self,
        metadata: &AttributeValueSet,
        spec: &AttributeSpec,
    ) -> Result<Option<Block>, EngineError> {
        self.values(spec.code, metadata.values(spec.code), spec.unit)
    }

    /// Formats explicit `values` under the label of `code`.
    pub fn values(
        &self,
        code: &str,
        values: &[String],
        unit: &str,
    ) -> Result<Option<Block>, EngineError> {
        if values.is_empty() {
            return Ok(None);
        }
        let descriptor = self.resolver.resolve(code)?;
        Ok(format_attribute(&descriptor, values, unit))
    }

    pub fn composition(
        &self,
        metadata: &AttributeValueSet,
        code: &str,
    ) -> Result<Option<Block>, EngineError> {
        let values = metadata.values(code);
        if values.is_empty() {
            return Ok(None);
        }
        let descriptor = self.resolver.resolve(code)?;
        format_composition(&descriptor, values).map_err(|source| EngineError::Format {
            code: code.to_string(),
            source,
        })
    }
}
