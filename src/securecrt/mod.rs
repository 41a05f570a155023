// ABOUTME: SecureCRT session import: XML document loading, session tree adaptation and identity keys
// ABOUTME: Produces a normalized host/group tree without touching the source export

pub mod document;
pub mod identity;
pub mod parser;
pub mod tree;

pub use document::{DocumentError, XmlNode};
pub use identity::{IdentityKeyPaths, KeyPair};
pub use parser::{ImportWarning, SecureCrtParser, find_child_by_name, is_session_group};
pub use tree::{HostEntry, HostTree, SessionGroup, TreeEntry};
