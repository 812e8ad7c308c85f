use std::fmt;

use crate::Entry;

/// A top-level deck section.
///
/// The derived order is the order sections appear in a rendered deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Environment,
    Method,
    Model,
    Variables,
    Responses,
}

impl SectionKind {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Method => "method",
            Self::Model => "model",
            Self::Variables => "variables",
            Self::Responses => "responses",
        }
    }
}

/// One section of a deck and its entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    kind: SectionKind,
    entries: Vec<Entry>,
}

impl Block {
    #[must_use]
    pub fn new(kind: SectionKind, entries: Vec<Entry>) -> Self {
        Self { kind, entries }
    }

    #[must_use]
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the first entry with `key`.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key() == key)
    }
}

/// A compiled input deck.
///
/// Blocks are kept in section order; blocks of the same kind keep the order
/// they were added in. A deck cannot be changed once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    blocks: Vec<Block>,
}

impl Deck {
    pub(crate) fn new(mut blocks: Vec<Block>) -> Self {
        blocks.sort_by_key(Block::kind);
        Self { blocks }
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterates the blocks of one section kind.
    pub fn section(&self, kind: SectionKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    /// Renders the deck text.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", block.kind.keyword())?;
            for entry in &block.entries {
                let indent = "  ".repeat(entry.depth() + 1);
                writeln!(f, "{indent}{entry}")?;
            }
        }
        Ok(())
    }
}
