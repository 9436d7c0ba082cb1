//! Everything domain building needs besides the catalog.

use crate::core::{EngineConfig, ParserConfig, Result};
use crate::parser::DescriptionParser;
use crate::reference::Reference;

/// Reference tables plus the compiled description parser.
///
/// Built once at startup. Rebuild workers share it by reference.
#[derive(Clone, Debug)]
pub struct DomainContext {
    pub reference: Reference,
    pub parser: DescriptionParser,
}

impl DomainContext {
    /// Compile a parser against the reference's attribute table.
    #[must_use]
    pub fn new(reference: Reference, parser: &ParserConfig) -> Self {
        let parser = DescriptionParser::new(parser, &reference.attributes);
        Self { reference, parser }
    }

    /// Load the reference files named by the config and compile the parser.
    pub fn load(config: &EngineConfig) -> Result<Self> {
        let reference = Reference::load(config)?;
        Ok(Self::new(reference, &config.parser))
    }
}
