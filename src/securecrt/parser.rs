// ABOUTME: Adapts a SecureCRT session tree into a host/group tree plus an optional SSH identity
// ABOUTME: Missing fields mean absence, never errors: hosts without a hostname are dropped silently

use crate::config::ImportConfig;
use crate::securecrt::document::XmlNode;
use crate::securecrt::identity::IdentityKeyPaths;
use crate::securecrt::tree::{HostEntry, HostTree, SessionGroup, TreeEntry};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

const SESSIONS: &str = "Sessions";
const HOSTNAME: &str = "Hostname";
const PORT: &str = "[SSH2] Port";
const USERNAME: &str = "Username";
const SSH2: &str = "SSH2";
const IDENTITY_FILENAME: &str = "Identity Filename V2";

pub const DEFAULT_META_SESSIONS: &[&str] = &["Default"];
pub const DEFAULT_PORT: &str = "22";

/// Things the importer skipped or overwrote. Only collected on request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportWarning {
    HostWithoutHostname { label: String },
    DuplicateLabel { label: String },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::HostWithoutHostname { label } => {
                write!(f, "session '{}' has an empty hostname and was skipped", label)
            }
            ImportWarning::DuplicateLabel { label } => {
                write!(f, "session '{}' overwrote an earlier entry with the same name", label)
            }
        }
    }
}

pub struct SecureCrtParser<'a> {
    document: &'a XmlNode,
    meta_sessions: Vec<String>,
    default_port: String,
    home_dir: Option<PathBuf>,
}

impl<'a> SecureCrtParser<'a> {
    pub fn new(document: &'a XmlNode) -> Self {
        Self {
            document,
            meta_sessions: DEFAULT_META_SESSIONS.iter().map(|s| s.to_string()).collect(),
            default_port: DEFAULT_PORT.to_string(),
            home_dir: None,
        }
    }

    pub fn from_config(document: &'a XmlNode, config: &ImportConfig) -> Self {
        Self {
            meta_sessions: config.meta_sessions.clone(),
            default_port: config.default_port.clone(),
            ..Self::new(document)
        }
    }

    /// Uses `home` instead of the platform home directory when resolving
    /// `$`-prefixed identity paths.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn parse_hosts(&self) -> HostTree {
        let mut warnings = Vec::new();
        self.build_tree(&mut warnings)
    }

    pub fn parse_hosts_with_warnings(&self) -> (HostTree, Vec<ImportWarning>) {
        let mut warnings = Vec::new();
        let tree = self.build_tree(&mut warnings);
        (tree, warnings)
    }

    fn build_tree(&self, warnings: &mut Vec<ImportWarning>) -> HostTree {
        let mut root = SessionGroup::new();

        match find_child_by_name(self.document.children(), SESSIONS) {
            Some(sessions) => self.parse_sessions(sessions.children(), &mut root, warnings),
            None => tracing::debug!("No Sessions node found, nothing to import"),
        }

        HostTree::new(root)
    }

    fn parse_sessions(
        &self,
        sessions: &[XmlNode],
        parent: &mut SessionGroup,
        warnings: &mut Vec<ImportWarning>,
    ) {
        for session in sessions {
            let name = session.name().unwrap_or_default();

            if self.is_meta_session(name) {
                tracing::debug!("Skipping meta session: {}", name);
                continue;
            }

            if is_session_group(session) {
                tracing::debug!("Importing session group: {}", name);
                insert_entry(parent, name.to_string(), TreeEntry::Group(SessionGroup::new()), warnings);
                if let Some(TreeEntry::Group(group)) = parent.get_mut(name) {
                    self.parse_sessions(session.children(), group, warnings);
                }
            } else if let Some(host) = self.make_host(session) {
                tracing::debug!("Importing host: {} -> {}", host.label, host.hostname);
                insert_entry(parent, host.label.clone(), TreeEntry::Host(host), warnings);
            } else {
                push_warning(
                    warnings,
                    ImportWarning::HostWithoutHostname {
                        label: name.to_string(),
                    },
                );
            }
        }
    }

    fn is_meta_session(&self, name: &str) -> bool {
        self.meta_sessions.iter().any(|meta| meta == name)
    }

    pub fn make_host(&self, session: &XmlNode) -> Option<HostEntry> {
        let attrs = session.children();

        let hostname = attribute_text(find_child_by_name(attrs, HOSTNAME))?;
        let port = attribute_text(find_child_by_name(attrs, PORT)).unwrap_or(self.default_port.as_str());
        let username = attribute_text(find_child_by_name(attrs, USERNAME));

        Some(HostEntry::new(
            session.name().unwrap_or_default().to_string(),
            hostname.to_string(),
            port.to_string(),
            username.map(str::to_string),
        ))
    }

    pub fn parse_identity(&self) -> Option<IdentityKeyPaths> {
        let identity = find_child_by_name(self.document.children(), SSH2)?;
        let filename = attribute_text(find_child_by_name(identity.children(), IDENTITY_FILENAME))?;

        let paths = IdentityKeyPaths::resolve(filename, &self.home_dir());
        tracing::debug!(
            "Resolved SSH2 identity: private={} public={}",
            paths.private_key_path,
            paths.public_key_path
        );
        Some(paths)
    }

    fn home_dir(&self) -> String {
        match self.home_dir.clone().or_else(dirs::home_dir) {
            Some(home) => home.to_string_lossy().into_owned(),
            None => {
                tracing::warn!("Failed to determine home directory, leaving '~' in identity path");
                "~".to_string()
            }
        }
    }
}

/// A session is a group iff none of its direct children is a `Hostname`.
pub fn is_session_group(session: &XmlNode) -> bool {
    find_child_by_name(session.children(), HOSTNAME).is_none()
}

pub fn find_child_by_name<'n>(nodes: &'n [XmlNode], name: &str) -> Option<&'n XmlNode> {
    nodes.iter().find(|node| node.name() == Some(name))
}

/// Text of `node` if it exists and is non-empty.
fn attribute_text(node: Option<&XmlNode>) -> Option<&str> {
    node.and_then(XmlNode::text).filter(|text| !text.is_empty())
}

fn insert_entry(
    parent: &mut SessionGroup,
    label: String,
    entry: TreeEntry,
    warnings: &mut Vec<ImportWarning>,
) {
    if parent.insert(label.clone(), entry).is_some() {
        push_warning(warnings, ImportWarning::DuplicateLabel { label });
    }
}

fn push_warning(warnings: &mut Vec<ImportWarning>, warning: ImportWarning) {
    tracing::debug!("{}", warning);
    warnings.push(warning);
}
