// ABOUTME: Owned node tree for SecureCRT XML exports, built from a roxmltree parse
// ABOUTME: Keeps only element children, their name attribute and text, which is all the importer reads

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read SecureCRT document: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed SecureCRT document: {0}")]
    Malformed(String),
}

/// A single element of a SecureCRT export.
///
/// SecureCRT stores everything as `<key name="...">` folders holding
/// `<string>`/`<dword>` leaves, so the element tag itself is irrelevant;
/// nodes are addressed by their `name` attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: Option<String>,
    text: Option<String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A node without a `name` attribute, such as the document root.
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn parse_str(content: &str) -> Result<Self, DocumentError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let document = roxmltree::Document::parse_with_options(content, options)
            .map_err(|e| DocumentError::Malformed(e.to_string()))?;
        Ok(Self::from_element(document.root_element()))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded SecureCRT document: {}", path.display());
        Self::parse_str(&content)
    }

    fn from_element(element: roxmltree::Node<'_, '_>) -> Self {
        Self {
            name: element.attribute("name").map(str::to_string),
            text: element.text().map(str::to_string),
            children: element
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_element)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VanDyke version="3.0">
    <!-- exported sessions -->
    <key name="Sessions">
        <key name="web">
            <string name="Hostname">web.example.com</string>
            <dword name="[SSH2] Port">2222</dword>
            <string name="Username"/>
        </key>
    </key>
</VanDyke>"#;

    #[test]
    fn test_parse_keeps_only_elements() {
        let root = XmlNode::parse_str(EXPORT).unwrap();

        assert_eq!(root.name(), None);
        assert_eq!(root.children().len(), 1);

        let sessions = &root.children()[0];
        assert_eq!(sessions.name(), Some("Sessions"));
        assert_eq!(sessions.children().len(), 1);

        let web = &sessions.children()[0];
        let names: Vec<_> = web.children().iter().filter_map(XmlNode::name).collect();
        assert_eq!(names, vec!["Hostname", "[SSH2] Port", "Username"]);
    }

    #[test]
    fn test_parse_reads_leaf_text() {
        let root = XmlNode::parse_str(EXPORT).unwrap();
        let web = &root.children()[0].children()[0];

        assert_eq!(web.children()[0].text(), Some("web.example.com"));
        assert_eq!(web.children()[1].text(), Some("2222"));
        assert_eq!(web.children()[2].text(), None);
    }

    #[test]
    fn test_parse_accepts_doctype() {
        let xml = r#"<?xml version="1.0"?><!DOCTYPE VanDyke><VanDyke><key name="Sessions"/></VanDyke>"#;

        let root = XmlNode::parse_str(xml).unwrap();

        assert_eq!(root.children()[0].name(), Some("Sessions"));
    }

    #[test]
    fn test_parse_malformed_document() {
        let result = XmlNode::parse_str("<VanDyke><key name=\"Sessions\"></VanDyke>");

        assert!(matches!(result, Err(DocumentError::Malformed(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let root = XmlNode::load_from_file(file.path()).unwrap();

        assert_eq!(root.children()[0].name(), Some("Sessions"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xml");

        let err = XmlNode::load_from_file(&path).unwrap_err();

        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(err.to_string().contains("missing.xml"));
    }

    #[test]
    fn test_builder_helpers() {
        let node = XmlNode::new("Sessions")
            .with_child(XmlNode::new("Hostname").with_text("example.com"));

        assert_eq!(node.name(), Some("Sessions"));
        assert_eq!(node.children()[0].text(), Some("example.com"));
    }
}
