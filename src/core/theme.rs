//! Status page theme resolution.
//!
//! Two sources compete for a page's theme: the owner-set default and a
//! per-viewer local override. The resolve path is pure; mutations go
//! through an injected [`ThemeStore`] so the same logic works against
//! the database or an in-memory store in tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Theme error types.
#[derive(Error, Debug, PartialEq)]
pub enum ThemeError {
    #[error("invalid theme '{0}'. Valid themes: cyberpunk, matrix, retro, minimal")]
    InvalidTheme(String),
}

/// A status page visual theme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Cyberpunk,
    Matrix,
    Retro,
    Minimal,
}

impl Theme {
    /// System-wide default when neither source has a value.
    pub const DEFAULT: Theme = Theme::Cyberpunk;

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Cyberpunk => "cyberpunk",
            Theme::Matrix => "matrix",
            Theme::Retro => "retro",
            Theme::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cyberpunk" => Ok(Theme::Cyberpunk),
            "matrix" => Ok(Theme::Matrix),
            "retro" => Ok(Theme::Retro),
            "minimal" => Ok(Theme::Minimal),
            other => Err(ThemeError::InvalidTheme(other.to_string())),
        }
    }
}

/// Resolve the effective theme for a viewer.
///
/// A viewer override always wins, even when the viewer is the owner;
/// otherwise the owner default; otherwise the system default.
pub fn resolve_theme(owner_default: Option<Theme>, viewer_override: Option<Theme>) -> Theme {
    viewer_override.or(owner_default).unwrap_or(Theme::DEFAULT)
}

/// Persistence seam for theme state.
///
/// Owner defaults live on the monitor record; viewer overrides are keyed
/// by status page slug with the viewer identity implicit to the store's
/// scope (a browser local store, or a (viewer, slug) table server-side).
pub trait ThemeStore {
    type Error;

    fn owner_default(&self, slug: &str) -> Result<Option<Theme>, Self::Error>;
    fn write_owner_default(&mut self, slug: &str, theme: Theme) -> Result<(), Self::Error>;

    fn viewer_override(&self, slug: &str) -> Result<Option<Theme>, Self::Error>;
    fn write_viewer_override(&mut self, slug: &str, theme: Theme) -> Result<(), Self::Error>;
    fn delete_viewer_override(&mut self, slug: &str) -> Result<(), Self::Error>;

    /// Persist a new owner default and clear the caller's own override in
    /// one step, if the backing storage can make that atomic. The default
    /// implementation issues the two writes back to back.
    fn write_owner_default_and_clear_override(
        &mut self,
        slug: &str,
        theme: Theme,
    ) -> Result<(), Self::Error> {
        self.write_owner_default(slug, theme)?;
        self.delete_viewer_override(slug)
    }
}

/// Owner action: set the page default for everyone.
///
/// Also clears the owner's own override so they see the new default on
/// their next read instead of a stale override. Other viewers' overrides
/// are stored per viewer and are untouched.
pub fn set_owner_default<S: ThemeStore>(
    store: &mut S,
    slug: &str,
    theme: Theme,
) -> Result<(), S::Error> {
    store.write_owner_default_and_clear_override(slug, theme)
}

/// Viewer action: override the theme locally for this page.
pub fn set_viewer_override<S: ThemeStore>(
    store: &mut S,
    slug: &str,
    theme: Theme,
) -> Result<(), S::Error> {
    store.write_viewer_override(slug, theme)
}

/// Viewer action: drop the local override and fall back to the owner default.
pub fn clear_viewer_override<S: ThemeStore>(store: &mut S, slug: &str) -> Result<(), S::Error> {
    store.delete_viewer_override(slug)
}

/// Resolve the effective theme for a viewer through a store.
pub fn effective_theme<S: ThemeStore>(store: &S, slug: &str) -> Result<Theme, S::Error> {
    Ok(resolve_theme(
        store.owner_default(slug)?,
        store.viewer_override(slug)?,
    ))
}
