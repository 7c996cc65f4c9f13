use crate::Placeholder;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("unclosed placeholder at byte {0}")]
    Unclosed(usize),

    #[error("no value supplied for {{{0}}}")]
    MissingValue(Placeholder),

    #[error("value {value:?} for {{{placeholder}}} cannot be used in a file name")]
    InvalidValue {
        placeholder: Placeholder,
        value:       String,
    },

    #[error("{value:?} is not a valid {placeholder} (expected one of: {valid})")]
    InvalidChoice {
        placeholder: Placeholder,
        value:       String,
        valid:       String,
    },

    #[error("{rendered:?} does not read back as the values it was rendered from")]
    Ambiguous { rendered: String },

    #[error("failed to build matcher: {0}")]
    Pattern(#[from] regex::Error),
}
