//! In-memory model of a report: sections made of text, list and table blocks.
//!
//! The model carries no layout coordinates. It is assembled by the engine and then
//! handed to a writer (see [`crate::core::io::pdf`]) that decides pagination.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    Title,
    Byline,
    Abstract,
    Heading,
    Label,
    Normal,
    /// Reduced size, lowered below the baseline.
    Subscript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text { text: String, style: TextStyle },
    Break,
}

impl Inline {
    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Self::Text {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            inlines: vec![Inline::text(text, style)],
        }
    }

    pub fn push(&mut self, text: impl Into<String>, style: TextStyle) -> &mut Self {
        self.inlines.push(Inline::text(text, style));
        self
    }

    pub fn push_break(&mut self) -> &mut Self {
        self.inlines.push(Inline::Break);
        self
    }

    /// Concatenated text of every inline, with breaks rendered as `'\n'`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text { text, .. } => out.push_str(text),
                Inline::Break => out.push('\n'),
            }
        }
        out
    }
}

/// A bold label followed by an unordered list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledList {
    pub label: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCell {
    pub path: PathBuf,
    pub padding: f32,
    pub alignment: Alignment,
    pub bordered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Image(ImageCell),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTable {
    pub columns: usize,
    pub rows: Vec<Vec<Cell>>,
}

impl ImageTable {
    pub fn image_count(&self) -> usize {
        self.cells()
            .filter(|c| matches!(c, Cell::Image(_)))
            .count()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(Paragraph),
    List(LabeledList),
    Table(ImageTable),
    /// Thin horizontal separator under a section heading.
    Rule,
    /// One empty line.
    Spacer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Title,
    MolecularSystem,
    ComputationalMethod,
    AnalysisData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: Option<String>,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(kind: SectionKind, heading: Option<String>) -> Self {
        Self {
            kind,
            heading,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn tables(&self) -> impl Iterator<Item = &ImageTable> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub creator: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub metadata: DocumentMetadata,
    pub sections: Vec<Section>,
}

impl ReportDocument {
    pub fn new(metadata: DocumentMetadata) -> Self {
        Self {
            metadata,
            sections: Vec::new(),
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn image_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(Section::tables)
            .map(ImageTable::image_count)
            .sum()
    }
}
