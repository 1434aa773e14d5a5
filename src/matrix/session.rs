//! Persistence of the Matrix login session.
//!
//! The session directory contains:
//! - `session`: JSON file with the user session and the last sync token
//! - `sqlite`: SQLite state store used by the Matrix SDK

use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use matrix_sdk::authentication::matrix;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Content of the session file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    /// Authentication data of the bot account.
    user_session: matrix::MatrixSession,

    /// Token of the last successful sync, omitted until the first sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// Matrix session stored in a directory.
#[derive(Clone)]
pub struct MatrixSession {
    /// Session loaded at startup, if any.
    stored: Option<StoredSession>,
    /// `dir/sqlite`
    sqlite_path: PathBuf,
    /// `dir/session`
    session_path: PathBuf,
}

impl MatrixSession {
    /// Opens the session directory, creating it when missing.
    ///
    /// A missing or unreadable session file is not an error: the bot will log
    /// in again and write a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn load(dir: &str) -> Result<MatrixSession, anyhow::Error> {
        debug!("read session at {}", dir);
        fs::create_dir_all(dir).await?;

        let sqlite_path = Path::new(dir).join("sqlite");
        let session_path = Path::new(dir).join("session");

        let stored = match read_session(&session_path).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!("no usable session in {}: {}", dir, e);
                None
            }
        };

        Ok(MatrixSession {
            stored,
            sqlite_path,
            session_path,
        })
    }

    /// Path of the SQLite state store.
    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// User session found at startup.
    pub fn user_session(&self) -> Option<&matrix::MatrixSession> {
        self.stored.as_ref().map(|s| &s.user_session)
    }

    /// Token of the last sync found at startup.
    pub fn sync_token(&self) -> Option<String> {
        self.stored.as_ref().and_then(|s| s.sync_token.clone())
    }

    /// Writes a fresh session file for `user_session`, without sync token.
    pub async fn persist_user_session(
        &self,
        user_session: &matrix::MatrixSession,
    ) -> anyhow::Result<()> {
        trace!("persist user session");

        let stored = StoredSession {
            user_session: user_session.clone(),
            sync_token: None,
        };
        fs::write(&self.session_path, serde_json::to_string(&stored)?).await?;

        trace!("user session persisted");
        Ok(())
    }

    /// Updates the sync token in the session file.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be read, parsed, or written.
    pub async fn persist_sync_token(&self, sync_token: String) -> anyhow::Result<()> {
        trace!("persist sync token {}", sync_token);

        let mut stored = read_session(&self.session_path).await?;
        stored.sync_token = Some(sync_token);
        fs::write(&self.session_path, serde_json::to_string(&stored)?).await?;

        trace!("sync token persisted");
        Ok(())
    }
}

async fn read_session(path: &Path) -> anyhow::Result<StoredSession> {
    if !fs::try_exists(path).await.unwrap_or_default() {
        anyhow::bail!("session file does not exist");
    }

    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}
