//! Recipe handling for relsync.
//!
//! # Release sync, per repository
//!
//! ```text
//! relsync sync 20230612
//!   1. Load       ── RecipeDocument::load(<root>/<repo>/Dockerfile)
//!   2. Rewrite    ── every 8-digit date → 20230612, every ISO date → 2023-06-12
//!   3. Commit/tag ── relsync-vcs Committer (writes with LF line endings)
//! ```
//!
//! Rewriting is pure text substitution: no parsing of the recipe format, and
//! a recipe without date tokens is left as is.

pub mod recipe;

pub use recipe::{RecipeDocument, RecipeError, normalize_line_endings, rewrite, write_normalized};
