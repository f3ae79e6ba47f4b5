//! Declarative view pipelines over the relational schema
//!
//! A [`PipelineSpec`] describes a denormalized read-only projection:
//! which collection to match, which predicates to AND together, which
//! joined documents to embed, which derived scalars to compute, and the
//! output field allow-list. The spec compiles to a single SQL statement
//! that returns one `jsonb` document per row.
//!
//! Collection, column, and output-field names are `'static` strings
//! supplied by the named-view constructors in [`crate::views`]; request
//! input only ever reaches the statement through bind parameters.

use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// A bindable predicate value
#[derive(Debug, Clone)]
pub enum Bind {
    Uuid(Uuid),
    Text(String),
    Bool(bool),
}

impl Bind {
    fn push(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Bind::Uuid(v) => qb.push_bind(*v),
            Bind::Text(v) => qb.push_bind(v.clone()),
            Bind::Bool(v) => qb.push_bind(*v),
        };
    }
}

/// A predicate term; all terms of a spec are ANDed together
#[derive(Debug, Clone)]
pub enum Filter {
    /// `column = value`
    Eq(&'static str, Bind),
    /// `column IS NOT NULL`
    NotNull(&'static str),
    /// Case-insensitive substring match against any of the columns.
    /// An empty needle matches everything and is skipped.
    ContainsFold(&'static [&'static str], String),
}

impl Filter {
    fn is_active(&self) -> bool {
        match self {
            Filter::ContainsFold(_, needle) => !needle.is_empty(),
            _ => true,
        }
    }

    fn push(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Filter::Eq(column, value) => {
                qb.push("base.").push(*column).push(" = ");
                value.push(qb);
            }
            Filter::NotNull(column) => {
                qb.push("base.").push(*column).push(" IS NOT NULL");
            }
            Filter::ContainsFold(columns, needle) => {
                qb.push("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push("base.").push(*column).push(" ILIKE ");
                    qb.push_bind(like_pattern(needle));
                }
                qb.push(")");
            }
        }
    }
}

/// Escape LIKE metacharacters and wrap the needle for substring match
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// A left-outer join embedding rows from `target` under `output_field`
///
/// The join emits a list of shaped documents, ordered by `order_by` when
/// given, with the target's `id` as tie-break so equal keys keep a stable
/// order. With `singular` set, the first matching document is embedded
/// instead, and a missing match becomes an empty object rather than an
/// error. One level of nesting is supported for owner-inside-video shapes.
#[derive(Debug, Clone)]
pub struct Join {
    pub target: &'static str,
    pub local_key: &'static str,
    pub foreign_key: &'static str,
    pub output_field: &'static str,
    pub shape: &'static [&'static str],
    pub order_by: Option<&'static str>,
    pub singular: bool,
    pub nested: Option<Box<Join>>,
}

impl Join {
    fn push(&self, qb: &mut QueryBuilder<'_, Postgres>, outer: &str, depth: usize) {
        let target_alias = format!("t{depth}");
        let doc_alias = format!("j{depth}");

        qb.push("COALESCE((SELECT ");
        if self.singular {
            qb.push("to_jsonb(").push(&doc_alias).push(")");
        } else {
            qb.push("jsonb_agg(to_jsonb(")
                .push(&doc_alias)
                .push("))");
        }
        qb.push(" FROM (SELECT ");
        for (i, column) in self.shape.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(&target_alias).push(".").push(*column);
        }
        if let Some(nested) = &self.nested {
            qb.push(", ");
            nested.push(qb, &target_alias, depth + 1);
            qb.push(" AS ").push(nested.output_field);
        }
        qb.push(" FROM ")
            .push(self.target)
            .push(" AS ")
            .push(&target_alias)
            .push(" WHERE ")
            .push(&target_alias)
            .push(".")
            .push(self.foreign_key)
            .push(" = ")
            .push(outer)
            .push(".")
            .push(self.local_key);
        if let Some(order_by) = self.order_by {
            qb.push(" ORDER BY ")
                .push(&target_alias)
                .push(".")
                .push(order_by)
                .push(", ")
                .push(&target_alias)
                .push(".id");
        }
        if self.singular {
            qb.push(" LIMIT 1");
        }
        qb.push(") AS ").push(&doc_alias).push("), '");
        qb.push(if self.singular { "{}" } else { "[]" });
        qb.push("'::jsonb)");
    }
}

/// A derived scalar computed per base row
#[derive(Debug, Clone)]
pub enum Derived {
    /// Count of rows in `target` whose `key` references the base row
    Count {
        field: &'static str,
        target: &'static str,
        key: &'static str,
    },
    /// Sum of `column` over rows in `target` whose `key` references the base row
    Sum {
        field: &'static str,
        target: &'static str,
        key: &'static str,
        column: &'static str,
    },
    /// Count of rows in `target` reached through `via` rows owned by the base row
    CountVia {
        field: &'static str,
        target: &'static str,
        target_key: &'static str,
        via: &'static str,
        via_key: &'static str,
    },
    /// Whether a row in `target` keyed to the base row carries the probe
    /// value in `probe_column`; constant false when no probe is supplied
    MemberOf {
        field: &'static str,
        target: &'static str,
        key: &'static str,
        probe_column: &'static str,
        probe: Option<Bind>,
    },
}

impl Derived {
    pub fn field(&self) -> &'static str {
        match self {
            Derived::Count { field, .. }
            | Derived::Sum { field, .. }
            | Derived::CountVia { field, .. }
            | Derived::MemberOf { field, .. } => field,
        }
    }

    fn push(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Derived::Count { target, key, .. } => {
                qb.push("(SELECT COUNT(*) FROM ")
                    .push(*target)
                    .push(" AS d WHERE d.")
                    .push(*key)
                    .push(" = base.id)");
            }
            Derived::Sum {
                target, key, column, ..
            } => {
                qb.push("COALESCE((SELECT SUM(d.")
                    .push(*column)
                    .push(") FROM ")
                    .push(*target)
                    .push(" AS d WHERE d.")
                    .push(*key)
                    .push(" = base.id), 0)");
            }
            Derived::CountVia {
                target,
                target_key,
                via,
                via_key,
                ..
            } => {
                qb.push("(SELECT COUNT(*) FROM ")
                    .push(*target)
                    .push(" AS d JOIN ")
                    .push(*via)
                    .push(" AS v ON d.")
                    .push(*target_key)
                    .push(" = v.id WHERE v.")
                    .push(*via_key)
                    .push(" = base.id)");
            }
            Derived::MemberOf {
                target,
                key,
                probe_column,
                probe,
                ..
            } => match probe {
                Some(value) => {
                    qb.push("EXISTS(SELECT 1 FROM ")
                        .push(*target)
                        .push(" AS d WHERE d.")
                        .push(*key)
                        .push(" = base.id AND d.")
                        .push(*probe_column)
                        .push(" = ");
                    value.push(qb);
                    qb.push(")");
                }
                None => {
                    qb.push("FALSE");
                }
            },
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn sql(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// Declared total order; ties are always broken by `id` ascending so that
/// repeated paginated reads stay stable under concurrent inserts
#[derive(Debug, Clone, Copy)]
pub struct Sort {
    pub field: &'static str,
    pub direction: Direction,
}

impl Sort {
    pub fn ascending(field: &'static str) -> Self {
        Sort {
            field,
            direction: Direction::Ascending,
        }
    }
}

/// The declarative description of a denormalized view
///
/// `shape` is a default-deny allow-list: only the listed base columns make
/// it into the output document. The sort field must be part of the shape.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    pub collection: &'static str,
    pub filters: Vec<Filter>,
    pub joins: Vec<Join>,
    pub derived: Vec<Derived>,
    pub shape: &'static [&'static str],
    pub sort: Sort,
}

impl PipelineSpec {
    pub(crate) fn push_select(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        window: Option<(i64, i64)>,
    ) {
        qb.push("SELECT to_jsonb(doc) FROM (SELECT ");
        let mut first = true;
        for column in self.shape {
            if !first {
                qb.push(", ");
            }
            first = false;
            qb.push("base.").push(*column);
        }
        for join in &self.joins {
            if !first {
                qb.push(", ");
            }
            first = false;
            join.push(qb, "base", 0);
            qb.push(" AS ").push(join.output_field);
        }
        for derived in &self.derived {
            if !first {
                qb.push(", ");
            }
            first = false;
            derived.push(qb);
            qb.push(" AS ").push(derived.field());
        }
        qb.push(" FROM ").push(self.collection).push(" AS base");
        self.push_where(qb);
        qb.push(") AS doc ORDER BY doc.")
            .push(self.sort.field)
            .push(" ")
            .push(self.sort.direction.sql())
            .push(", doc.id ASC");
        if let Some((limit, offset)) = window {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }
    }

    pub(crate) fn push_count(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("SELECT COUNT(*) FROM ")
            .push(self.collection)
            .push(" AS base");
        self.push_where(qb);
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let active: Vec<&Filter> = self.filters.iter().filter(|f| f.is_active()).collect();
        if active.is_empty() {
            return;
        }
        qb.push(" WHERE ");
        for (i, filter) in active.iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            filter.push(qb);
        }
    }

    /// Execute the pipeline and return every shaped document
    pub async fn fetch_all(&self, pool: &PgPool) -> sqlx::Result<Vec<Value>> {
        let mut qb = QueryBuilder::new("");
        self.push_select(&mut qb, None);
        qb.build_query_scalar::<Value>().fetch_all(pool).await
    }

    /// Execute the pipeline and return the first shaped document, if any
    pub async fn fetch_optional(&self, pool: &PgPool) -> sqlx::Result<Option<Value>> {
        let mut qb = QueryBuilder::new("");
        self.push_select(&mut qb, None);
        qb.build_query_scalar::<Value>().fetch_optional(pool).await
    }

    /// Count matching rows, independent of any window
    pub async fn count(&self, pool: &PgPool) -> sqlx::Result<i64> {
        let mut qb = QueryBuilder::new("");
        self.push_count(&mut qb);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Execute a single window of the pipeline
    pub async fn fetch_window(
        &self,
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Value>> {
        let mut qb = QueryBuilder::new("");
        self.push_select(&mut qb, Some((limit, offset)));
        qb.build_query_scalar::<Value>().fetch_all(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_select(spec: &PipelineSpec, window: Option<(i64, i64)>) -> String {
        let mut qb = QueryBuilder::new("");
        spec.push_select(&mut qb, window);
        qb.into_sql()
    }

    fn render_count(spec: &PipelineSpec) -> String {
        let mut qb = QueryBuilder::new("");
        spec.push_count(&mut qb);
        qb.into_sql()
    }

    fn minimal_spec() -> PipelineSpec {
        PipelineSpec {
            collection: "videos",
            filters: vec![],
            joins: vec![],
            derived: vec![],
            shape: &["id", "title", "created_at"],
            sort: Sort::ascending("created_at"),
        }
    }

    #[test]
    fn test_shape_is_an_allow_list() {
        let sql = render_select(&minimal_spec(), None);
        assert!(sql.contains("SELECT base.id, base.title, base.created_at FROM videos AS base"));
        assert!(!sql.contains("*"));
    }

    #[test]
    fn test_sort_always_tie_breaks_on_id() {
        let mut spec = minimal_spec();
        spec.sort = Sort {
            field: "created_at",
            direction: Direction::Descending,
        };
        let sql = render_select(&spec, None);
        assert!(sql.ends_with("ORDER BY doc.created_at DESC, doc.id ASC"));
    }

    #[test]
    fn test_window_binds_limit_and_offset() {
        let sql = render_select(&minimal_spec(), Some((10, 20)));
        assert!(sql.contains("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_filters_are_anded() {
        let mut spec = minimal_spec();
        spec.filters = vec![
            Filter::Eq("owner_id", Bind::Uuid(Uuid::nil())),
            Filter::Eq("is_published", Bind::Bool(true)),
        ];
        let sql = render_select(&spec, None);
        assert!(sql.contains("WHERE base.owner_id = $1 AND base.is_published = $2"));
    }

    #[test]
    fn test_substring_filter_spans_columns() {
        let mut spec = minimal_spec();
        spec.filters = vec![Filter::ContainsFold(
            &["title", "description"],
            "intro".to_string(),
        )];
        let sql = render_select(&spec, None);
        assert!(sql.contains("(base.title ILIKE $1 OR base.description ILIKE $2)"));
    }

    #[test]
    fn test_empty_needle_is_skipped() {
        let mut spec = minimal_spec();
        spec.filters = vec![Filter::ContainsFold(
            &["title", "description"],
            String::new(),
        )];
        let sql = render_select(&spec, None);
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("intro"), "%intro%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn test_singular_join_collapses_to_first_match() {
        let mut spec = minimal_spec();
        spec.joins = vec![Join {
            target: "users",
            local_key: "owner_id",
            foreign_key: "id",
            output_field: "owner",
            shape: &["id", "display_name", "avatar_url", "username"],
            order_by: None,
            singular: true,
            nested: None,
        }];
        let sql = render_select(&spec, None);
        assert!(sql.contains("COALESCE((SELECT to_jsonb(j0) FROM (SELECT t0.id, t0.display_name, t0.avatar_url, t0.username FROM users AS t0 WHERE t0.id = base.owner_id LIMIT 1) AS j0), '{}'::jsonb) AS owner"));
    }

    #[test]
    fn test_plural_join_defaults_to_empty_list() {
        let mut spec = minimal_spec();
        spec.collection = "users";
        spec.joins = vec![Join {
            target: "subscriptions",
            local_key: "id",
            foreign_key: "channel_id",
            output_field: "subscribers",
            shape: &["subscriber_id", "created_at"],
            order_by: Some("created_at"),
            singular: false,
            nested: None,
        }];
        let sql = render_select(&spec, None);
        assert!(sql.contains("jsonb_agg(to_jsonb(j0))"));
        assert!(sql.contains("ORDER BY t0.created_at, t0.id"));
        assert!(sql.contains("'[]'::jsonb) AS subscribers"));
    }

    #[test]
    fn test_nested_join_uses_distinct_aliases() {
        let mut spec = minimal_spec();
        spec.collection = "watch_history";
        spec.joins = vec![Join {
            target: "videos",
            local_key: "video_id",
            foreign_key: "id",
            output_field: "video",
            shape: &["id", "title"],
            order_by: None,
            singular: true,
            nested: Some(Box::new(Join {
                target: "users",
                local_key: "owner_id",
                foreign_key: "id",
                output_field: "owner",
                shape: &["id", "display_name", "avatar_url"],
                order_by: None,
                singular: true,
                nested: None,
            })),
        }];
        let sql = render_select(&spec, None);
        assert!(sql.contains("FROM users AS t1 WHERE t1.id = t0.owner_id"));
        assert!(sql.contains("AS j1), '{}'::jsonb) AS owner"));
        assert!(sql.contains("'{}'::jsonb) AS video"));
    }

    #[test]
    fn test_derived_scalars() {
        let mut spec = minimal_spec();
        spec.collection = "users";
        spec.derived = vec![
            Derived::Count {
                field: "subscriber_count",
                target: "subscriptions",
                key: "channel_id",
            },
            Derived::Sum {
                field: "total_views",
                target: "videos",
                key: "owner_id",
                column: "view_count",
            },
            Derived::CountVia {
                field: "total_likes",
                target: "likes",
                target_key: "video_id",
                via: "videos",
                via_key: "owner_id",
            },
            Derived::MemberOf {
                field: "is_subscribed",
                target: "subscriptions",
                key: "channel_id",
                probe_column: "subscriber_id",
                probe: None,
            },
        ];
        let sql = render_select(&spec, None);
        assert!(sql.contains(
            "(SELECT COUNT(*) FROM subscriptions AS d WHERE d.channel_id = base.id) AS subscriber_count"
        ));
        assert!(sql.contains(
            "COALESCE((SELECT SUM(d.view_count) FROM videos AS d WHERE d.owner_id = base.id), 0) AS total_views"
        ));
        assert!(sql.contains(
            "(SELECT COUNT(*) FROM likes AS d JOIN videos AS v ON d.video_id = v.id WHERE v.owner_id = base.id) AS total_likes"
        ));
        assert!(sql.contains("FALSE AS is_subscribed"));
    }

    #[test]
    fn test_member_of_with_probe_binds_the_viewer() {
        let mut spec = minimal_spec();
        spec.collection = "users";
        spec.derived = vec![Derived::MemberOf {
            field: "is_subscribed",
            target: "subscriptions",
            key: "channel_id",
            probe_column: "subscriber_id",
            probe: Some(Bind::Uuid(Uuid::nil())),
        }];
        let sql = render_select(&spec, None);
        assert!(sql.contains(
            "EXISTS(SELECT 1 FROM subscriptions AS d WHERE d.channel_id = base.id AND d.subscriber_id = $1) AS is_subscribed"
        ));
    }

    #[test]
    fn test_count_runs_over_the_same_filters() {
        let mut spec = minimal_spec();
        spec.filters = vec![Filter::Eq("is_published", Bind::Bool(true))];
        spec.joins = vec![Join {
            target: "users",
            local_key: "owner_id",
            foreign_key: "id",
            output_field: "owner",
            shape: &["id"],
            order_by: None,
            singular: true,
            nested: None,
        }];
        let sql = render_count(&spec);
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM videos AS base WHERE base.is_published = $1"
        );
    }

    #[test]
    fn test_not_null_filter() {
        let mut spec = minimal_spec();
        spec.collection = "likes";
        spec.filters = vec![
            Filter::Eq("liked_by", Bind::Uuid(Uuid::nil())),
            Filter::NotNull("video_id"),
        ];
        let sql = render_count(&spec);
        assert!(sql.contains("base.liked_by = $1 AND base.video_id IS NOT NULL"));
    }
}
