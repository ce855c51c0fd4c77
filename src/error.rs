use std::fmt;

#[derive(Debug)]
pub enum Error {
    MissingContainer,
    MalformedContainer(String),
    MissingPackageDocument(String),
    MissingManifest,
    MissingSpine,
    EntryNotReadable(String),
    Zip(zip::result::ZipError),
    Xml(roxmltree::Error),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Store(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingContainer => write!(f, "not a valid EPUB file: META-INF/container.xml not found"),
            Error::MalformedContainer(reason) => write!(f, "malformed container.xml: {reason}"),
            Error::MissingPackageDocument(path) => write!(f, "package document not found: {path}"),
            Error::MissingManifest => write!(f, "package document has no manifest"),
            Error::MissingSpine => write!(f, "package document has no spine"),
            Error::EntryNotReadable(path) => write!(f, "archive entry not readable: {path}"),
            Error::Zip(e) => write!(f, "ZIP error: {e}"),
            Error::Xml(e) => write!(f, "XML error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Serialization(e) => write!(f, "serialization error: {e}"),
            Error::Store(reason) => write!(f, "store error: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Zip(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Zip(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e)
    }
}
