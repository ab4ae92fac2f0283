use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("No font selected")]
    NoFontSelected,

    #[error("No pages defined")]
    EmptyDocument,

    #[error("Unbalanced graphics state: {0}")]
    UnbalancedState(String),

    #[error("Invalid resource handle: {0}")]
    InvalidResource(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
