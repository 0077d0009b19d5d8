/// Controls validation engine behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// When true, verdicts are cached per validator and argument tuple.
    pub memoize: bool,
    /// When true, schema validators reject additional properties not in the schema.
    pub strict_schemas: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memoize: true,
            strict_schemas: false,
        }
    }
}
