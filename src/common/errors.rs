use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template not found in any search path: {0}")]
    TemplateNotFound(String),
    #[error("equipment not found: {0}")]
    EquipmentNotFound(String),
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),
    #[error("invalid ods package: {0}")]
    InvalidPackage(String),
    #[error("xml parse error: {0}")]
    XmlParseError(String),
    #[error("zip error: {0}")]
    ZipError(String),
    #[error("io error: {0}")]
    IoError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value.to_string())
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::ZipError(value.to_string())
    }
}

impl From<quick_xml::Error> for ExportError {
    fn from(value: quick_xml::Error) -> Self {
        Self::XmlParseError(value.to_string())
    }
}

impl From<xmltree::ParseError> for ExportError {
    fn from(value: xmltree::ParseError) -> Self {
        Self::XmlParseError(value.to_string())
    }
}

impl From<xmltree::Error> for ExportError {
    fn from(value: xmltree::Error) -> Self {
        Self::XmlParseError(value.to_string())
    }
}
