//! Typed photo listing query.
//!
//! Listing requests are expressed as a [`PhotoQuery`] value (predicates, a
//! sort order and a page request) which the photo repository compiles into a
//! parameterized database query. Nothing here concatenates SQL.

use sea_orm::sea_query::{Alias, Expr, ExprTrait, Func};
use sea_orm::{ColumnTrait, Condition};

use crate::entities::photo::{self, ModerationStatus};

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u64 = 12;

/// Upper bound on requested page sizes.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Sort order for photo listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhotoSort {
    /// Most recent first (default).
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Most liked first.
    Popular,
    /// Highest average rating first.
    TopRated,
}

impl PhotoSort {
    /// Parse a sort keyword. Unknown values fall back to [`Self::Newest`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "oldest" => Self::Oldest,
            "popular" => Self::Popular,
            "rating" => Self::TopRated,
            _ => Self::Newest,
        }
    }
}

/// A validated page request.
///
/// Out-of-range values are clamped rather than rejected: page is floored at
/// 1, limit is clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Items per page.
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request, clamping out-of-range values.
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    /// Whether more pages exist beyond this one.
    #[must_use]
    pub const fn has_more(&self, total: u64) -> bool {
        self.page * self.limit < total
    }

    /// Total page count for the given total row count.
    #[must_use]
    pub const fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// A typed photo listing query.
#[derive(Debug, Clone, Default)]
pub struct PhotoQuery {
    /// Restrict to a category (`None` means all categories).
    pub category: Option<String>,
    /// Restrict to one creator's photos.
    pub creator_id: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Sort order.
    pub sort: PhotoSort,
    /// Page request.
    pub page: PageRequest,
}

impl PhotoQuery {
    /// Compile the query's predicates into a condition tree.
    ///
    /// Clause precedence is fixed: the approved-status predicate always
    /// applies, category and creator scoping stack on top, and the search
    /// disjunction is AND-ed to the rest. The same condition drives both the
    /// page query and the total count, so pagination metadata is exact.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all().add(photo::Column::Status.eq(ModerationStatus::Approved));

        if let Some(ref category) = self.category {
            cond = cond.add(photo::Column::Category.eq(category.as_str()));
        }

        if let Some(ref creator_id) = self.creator_id {
            cond = cond.add(photo::Column::CreatorId.eq(creator_id.as_str()));
        }

        if let Some(ref search) = self.search
            && !search.trim().is_empty()
        {
            cond = cond.add(search_condition(search));
        }

        cond
    }
}

/// Discovery search: the listing search clauses plus a location substring
/// match, used by the standalone search endpoint.
#[must_use]
pub fn discovery_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", term.trim().to_lowercase());
    search_condition(term)
        .add(Expr::expr(Func::lower(Expr::col(photo::Column::Location))).like(pattern))
}

/// Case-insensitive search over title and caption substrings, plus exact
/// membership of the lowercased term in the tags array.
fn search_condition(term: &str) -> Condition {
    let term = term.trim().to_lowercase();
    let pattern = format!("%{term}%");

    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(photo::Column::Title))).like(pattern.clone()))
        .add(Expr::expr(Func::lower(Expr::col(photo::Column::Caption))).like(pattern))
        // Tags are stored lowercased; matching the JSON-quoted term keeps
        // membership exact ("glow" does not match a "glowing" tag).
        .add(
            Expr::col(photo::Column::Tags)
                .cast_as(Alias::new("text"))
                .like(format!("%\"{term}\"%")),
        )
}
