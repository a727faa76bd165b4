//! Confluence content search: argument validation, CQL construction, response
//! normalization across API generations and the links-only projection.

pub mod cql;
pub mod links;
pub mod normalize;
pub mod options;
pub mod page;

pub use cql::build_cql;
pub use links::{link_base, links_only, project_links, LinksOnlyResult};
pub use normalize::{
    detect_generation, is_current_page, normalize, normalize_page, normalize_with_report,
    to_current_page, to_legacy_page, Generation, Normalized, RawPage,
};
pub use options::{
    ContentSearchArgs, ContentSearchOptions, ContentType, OutputFormat, PageRequest,
};
pub use page::{Page, PageLinks, PageVersion, SpaceRef, VersionAuthor};

/// Space searched when the caller names none.
pub const DEFAULT_SPACE_KEY: &str = "DEVOPS";
