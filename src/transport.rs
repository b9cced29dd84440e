//! Wiki transport boundary
//!
//! The remote page store the publish manager writes through. Network
//! specifics stay behind this trait; [`crate::client::DokuWikiClient`]
//! is the production implementation and tests substitute recording
//! mocks.

use indexmap::IndexMap;

use crate::error::Result;

/// Listing options for [`WikiTransport::list_pages`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Recursion depth, 0 for unlimited
    pub depth: u32,
    /// Include an md5 hash of the page content
    pub hash: bool,
    /// List pages regardless of ACL restrictions
    pub skip_acl: bool,
}

/// Metadata of a listed wiki page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Page id including its namespace
    pub id: String,
    /// Latest revision
    pub rev: i64,
    /// Modification time as a unix timestamp
    pub mtime: i64,
    /// Page size in bytes
    pub size: i64,
}

/// Remote page store the publishing pipeline writes through.
pub trait WikiTransport {
    /// Log in to the wiki. Returns whether the login was accepted.
    fn login(&self, user: &str, password: &str) -> Result<bool>;

    /// List the pages below `namespace`, keyed by page id.
    fn list_pages(
        &self,
        namespace: &str,
        options: ListOptions,
    ) -> Result<IndexMap<String, PageInfo>>;

    /// Fetch the raw content of `page`.
    fn get_page(&self, page: &str) -> Result<String>;

    /// Overwrite `page` under `namespace` with `content`.
    ///
    /// Returns whether the wiki accepted the write; recoverable faults
    /// are reported as `Ok(false)` so batch publishes can continue.
    fn set_page(
        &self,
        page: &str,
        content: &str,
        summary: &str,
        namespace: &str,
        minor: bool,
    ) -> Result<bool>;
}
