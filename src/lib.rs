// ABOUTME: Library root for the SecureCRT importer
// ABOUTME: Exposes session tree adaptation, configuration and logging to the crt-import binary

pub mod config;
pub mod logging;
pub mod securecrt;

pub use config::Config;
pub use securecrt::{HostEntry, HostTree, IdentityKeyPaths, ImportWarning, SecureCrtParser, XmlNode};
