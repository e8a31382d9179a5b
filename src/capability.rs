//! The capability contract between a subsite and whatever site
//! embeds it: the embedding state promises these operations, the
//! subsite's handlers call them through the delegation handle in
//! their [`SubsiteContext`](crate::subsite::SubsiteContext) and never
//! learn the embedding type.

use anyhow::Result;

use crate::acontext::AContext;

/// The minimal capability every page-producing subsite needs: wrap a
/// content fragment into the embedding site's standard page shell.
/// Fragments and pages are plain HTML strings; how they are produced
/// is the embedder's business.
///
/// Subsites requiring more from their host declare further traits
/// and bound their `Subsite<H>` impl with them.
pub trait PageShell: Send + Sync {
    /// Build a whole page around `main`. `head_title` of None means
    /// the site's default title.
    fn render_shell(
        &self,
        context: &AContext,
        head_title: Option<&str>,
        main: &str,
    ) -> Result<String>;

    fn site_name(&self) -> &str;
}
