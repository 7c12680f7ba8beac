//! Credential store for the login gate.
//!
//! The store is a JSON file mapping usernames to a display name and a
//! plain (unsalted) SHA-256 digest of the password. Verification hashes
//! the presented password and compares digests; the outcome never says
//! whether the username or the password was wrong.

use crate::error::ExtratoError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

/// One stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Lowercase hex SHA-256 of the password text.
    pub senha_hash: String,
    /// Display name shown after login.
    pub nome: String,
}

/// The full credential file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    pub credenciais: HashMap<String, Credential>,
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted { nome: String },
    Rejected,
}

/// SHA-256 of the password text, lowercase hex.
pub fn hash_senha(senha: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(senha.as_bytes());
    hex::encode(hasher.finalize())
}

impl CredentialStore {
    /// Load the store from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtratoError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ExtratoError::CredentialsUnreadable {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|e| ExtratoError::CredentialsUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Check a username/password pair against the store.
    pub fn verify(&self, usuario: &str, senha: &str) -> LoginOutcome {
        match self.credenciais.get(usuario) {
            Some(cred) if cred.senha_hash == hash_senha(senha) => LoginOutcome::Accepted {
                nome: cred.nome.clone(),
            },
            _ => LoginOutcome::Rejected,
        }
    }
}
