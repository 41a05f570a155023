// ABOUTME: SSH identity key references resolved from a SecureCRT export
// ABOUTME: Turns the raw "Identity Filename V2" value into key paths and reads the referenced key files

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Separator SecureCRT appends after the key filename, e.g. `id_rsa::rawkey`.
const KEY_NAME_DELIMITER: &str = "::";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentityKeyPaths {
    pub private_key_path: String,
    pub public_key_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyPair {
    pub private_key: String,
    pub public_key: String,
}

impl IdentityKeyPaths {
    /// Resolves a raw `Identity Filename V2` value.
    ///
    /// The last path segment is cut at the first `::` to get the public key
    /// name, and at the first `.` of that to get the private key name. A first
    /// segment starting with `$` (a SecureCRT path variable) becomes `home`.
    pub fn resolve(raw: &str, home: &str) -> Self {
        let mut path: Vec<&str> = raw.split('/').collect();
        let last_index = path.len() - 1;

        let last = path[last_index];
        let public_key_name = last.split(KEY_NAME_DELIMITER).next().unwrap_or(last);
        let private_key_name = public_key_name.split('.').next().unwrap_or(public_key_name);

        if path[0].starts_with('$') {
            path[0] = home;
        }

        path[last_index] = public_key_name;
        let public_key_path = path.join("/");
        path[last_index] = private_key_name;
        let private_key_path = path.join("/");

        Self {
            private_key_path,
            public_key_path,
        }
    }

    pub fn read_keys(&self) -> Result<KeyPair> {
        Ok(KeyPair {
            private_key: read_key(&self.private_key_path, "private")?,
            public_key: read_key(&self.public_key_path, "public")?,
        })
    }
}

fn read_key(path: &str, kind: &str) -> Result<String> {
    fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read {} key file: {}", kind, path))
}
