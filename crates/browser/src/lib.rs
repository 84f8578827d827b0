//! # Scanlog Browser
//!
//! Inspection of the raw artifacts extracted next to each report
//! (`<execution>/result/extracoes/**`).
//!
//! Artifacts can be arbitrarily large, so inline viewing is always bounded
//! ([`ArtifactBrowser::open_for_view`]) while the full content is only read on
//! explicit export ([`ArtifactBrowser::open_for_download`]). Listings are
//! recomputed on every call because artifacts may change between views.
//!
//! Which artifact is open is tracked per execution by [`SelectionStore`], a
//! two-state machine (`Listing` ⇄ `Viewing`) owned by the caller's session.

mod artifact;
mod browser;
mod error;
mod layout;
mod selection;
mod view;

pub use artifact::{ArtifactFileInfo, ArtifactListing};
pub use browser::ArtifactBrowser;
pub use error::{BrowserError, Result};
pub use layout::{preferred_height, MIN_TABLE_HEIGHT, ROW_HEIGHT};
pub use selection::{BrowserState, SelectionStore};
pub use view::{ArtifactDownload, ArtifactView, DEFAULT_VIEW_LIMIT_BYTES};
