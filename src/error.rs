use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Zip(zip::result::ZipError),
    Xml(roxmltree::Error),
    /// Image could not be fetched, decoded or embedded. Never aborts a render.
    Image(String),
    /// Formula could not be converted. Never aborts a render.
    Math(String),
    /// A cell or row policy ran with no table open.
    NoEnclosingTable,
    /// The container kind has no defined available-width computation, or the
    /// container id no longer points at a live container.
    UnsupportedContainer(String),
    /// The output tree would become structurally invalid.
    InvalidStructure(String),
}

impl Error {
    /// Content-shaped failures are logged and skipped; everything else aborts
    /// the current field.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Image(_) | Error::Math(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Zip(err) => write!(f, "zip error: {}", err),
            Error::Xml(err) => write!(f, "xml error: {}", err),
            Error::Image(message) => write!(f, "image error: {}", message),
            Error::Math(message) => write!(f, "math error: {}", message),
            Error::NoEnclosingTable => write!(f, "table cell rendered outside of a table"),
            Error::UnsupportedContainer(message) => {
                write!(f, "unsupported container operation: {}", message)
            }
            Error::InvalidStructure(message) => write!(f, "invalid document structure: {}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Zip(err) => Some(err),
            Error::Xml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(value: zip::result::ZipError) -> Self {
        Error::Zip(value)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(value: roxmltree::Error) -> Self {
        Error::Xml(value)
    }
}
