//! Data backend exposed to the view layer.
//!
//! Holds the account list and performs the (mock) post. The reload loop does
//! not depend on it; the backend is shared with the view layer through an
//! `Arc` and outlives every view instance.

use miette::Diagnostic;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Platforms an account can be added for.
pub const PLATFORMS: [&str; 6] = [
    "Bluesky",
    "Threads",
    "Instagram",
    "Facebook",
    "YouTube",
    "TikTok",
];

const AUTH_BASE_URL: &str = "https://bhejo.app/socials";

/// A connected social account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Platform name, e.g. `Bluesky`.
    pub platform: String,
    /// Handle on that platform.
    pub username: String,
    /// Stable id within this backend.
    pub id: String,
    /// Whether posts are sent to this account.
    pub selected: bool,
}

impl Account {
    fn new(platform: &str, username: &str, id: usize, selected: bool) -> Self {
        Self {
            platform: platform.to_string(),
            username: username.to_string(),
            id: id.to_string(),
            selected,
        }
    }
}

/// Errors raised while submitting a post.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendError {
    /// The post has no text.
    #[error("cannot post an empty message")]
    #[diagnostic(code(bhejo::backend::empty_post))]
    EmptyPost,
}

/// Result of a post submission, as shown by the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostOutcome {
    /// Whether the post went out.
    pub success: bool,
    /// Status line for the user.
    pub message: String,
}

/// Calls the view layer makes into the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Submit a post to every selected account.
    Post(String),
    /// List accounts.
    ListAccounts,
    /// Toggle an account by index.
    Select {
        /// Position in the account list.
        index: usize,
        /// New selection state.
        selected: bool,
    },
    /// Add a mock account.
    AddAccount {
        /// Platform name.
        platform: String,
        /// Handle on that platform.
        username: String,
    },
    /// Start the OAuth flow for a platform.
    OpenAuth(String),
}

/// Account list and post action.
#[derive(Debug)]
pub struct Backend {
    accounts: RwLock<Vec<Account>>,
}

impl Backend {
    /// Create a backend with the given accounts.
    #[must_use]
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    /// Snapshot of the account list.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.read().clone()
    }

    /// Platforms an account can be added for.
    #[must_use]
    pub const fn platforms(&self) -> &'static [&'static str] {
        &PLATFORMS
    }

    /// Select or deselect the account at `index`.
    ///
    /// Returns `false` if the index is out of range.
    pub fn set_account_selected(&self, index: usize, selected: bool) -> bool {
        let mut accounts = self.accounts.write();
        let Some(account) = accounts.get_mut(index) else {
            debug!(index, "account index out of range");
            return false;
        };
        account.selected = selected;
        info!(index, selected, "account selection changed");
        true
    }

    /// Add an account, selected, with the next id.
    pub fn add_account(&self, platform: &str, username: &str) -> Account {
        let mut accounts = self.accounts.write();
        let account = Account::new(platform, username, accounts.len() + 1, true);
        accounts.push(account.clone());
        info!(platform, username, "account added");
        account
    }

    /// OAuth landing page for `platform`.
    #[must_use]
    pub fn auth_url(platform: &str) -> String {
        format!("{AUTH_BASE_URL}/{}", platform.to_lowercase())
    }

    /// Post `text` to every selected account.
    ///
    /// Returns the number of accounts posted to.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::EmptyPost`] for blank text.
    pub fn try_post(&self, text: &str) -> Result<usize, BackendError> {
        if text.trim().is_empty() {
            return Err(BackendError::EmptyPost);
        }

        info!(text, "posting message");
        let accounts = self.accounts.read();
        let mut count = 0;
        for account in accounts.iter().filter(|a| a.selected) {
            info!(platform = %account.platform, username = %account.username, "posting to account");
            count += 1;
        }
        Ok(count)
    }

    /// Post `text`, turning failures into an unsuccessful outcome.
    #[must_use]
    pub fn submit_post(&self, text: &str) -> PostOutcome {
        match self.try_post(text) {
            Ok(count) => PostOutcome {
                success: true,
                message: format!("Posted to {count} accounts."),
            },
            Err(e) => {
                warn!(error = %e, "post failed");
                PostOutcome {
                    success: false,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Perform a view action and return its result as JSON for the view.
    pub fn perform(&self, action: ViewAction) -> serde_json::Value {
        match action {
            ViewAction::Post(text) => serde_json::json!(self.submit_post(&text)),

            ViewAction::ListAccounts => serde_json::json!({
                "accounts": self.accounts(),
                "platforms": self.platforms(),
            }),

            ViewAction::Select { index, selected } => serde_json::json!({
                "updated": self.set_account_selected(index, selected),
            }),

            ViewAction::AddAccount { platform, username } => {
                serde_json::json!(self.add_account(&platform, &username))
            }

            ViewAction::OpenAuth(platform) => {
                let url = Self::auth_url(&platform);
                info!(%platform, %url, "opening auth page");
                serde_json::json!({ "url": url })
            }
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::with_accounts(vec![
            Account::new("Bluesky", "demo.bsky.social", 1, true),
            Account::new("Twitter", "@demo_user", 2, false),
        ])
    }
}
