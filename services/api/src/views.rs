//! Named views: fixed compositions of the pipeline primitives
//!
//! Each function here is the single place where a view's filters, joins,
//! derived fields, and output shape are declared. Handlers never assemble
//! pipelines ad hoc.

use uuid::Uuid;

use crate::error::ApiError;
use crate::view::{Bind, Derived, Direction, Filter, Join, PipelineSpec, Sort};

/// Owner summary embedded in listings
const OWNER_SUMMARY: &[&str] = &["id", "display_name", "avatar_url", "username"];

/// Video fields exposed by listing-style views
const VIDEO_SHAPE: &[&str] = &[
    "id",
    "owner_id",
    "title",
    "description",
    "media_url",
    "thumbnail_url",
    "duration_seconds",
    "view_count",
    "is_published",
    "created_at",
    "updated_at",
];

/// Scalar video fields a caller may sort the listing by
const VIDEO_SORT_FIELDS: &[&str] = &[
    "created_at",
    "updated_at",
    "title",
    "duration_seconds",
    "view_count",
];

fn owner_join(local_key: &'static str) -> Join {
    Join {
        target: "users",
        local_key,
        foreign_key: "id",
        output_field: "owner",
        shape: OWNER_SUMMARY,
        order_by: None,
        singular: true,
        nested: None,
    }
}

/// Resolve requester-supplied sort parameters against the listing allow-list
pub fn video_sort(sort_by: Option<&str>, sort_type: Option<&str>) -> Result<Sort, ApiError> {
    let field = match sort_by {
        None | Some("") => "created_at",
        Some(requested) => VIDEO_SORT_FIELDS
            .iter()
            .find(|f| **f == requested)
            .copied()
            .ok_or_else(|| {
                ApiError::Validation(vec![format!(
                    "sortBy must be one of: {}",
                    VIDEO_SORT_FIELDS.join(", ")
                )])
            })?,
    };

    let direction = match sort_type {
        None | Some("") | Some("asc") | Some("ascending") | Some("1") => Direction::Ascending,
        Some("desc") | Some("descending") | Some("-1") => Direction::Descending,
        Some(_) => {
            return Err(ApiError::Validation(vec![
                "sortType must be ascending or descending".to_string(),
            ]))
        }
    };

    Ok(Sort { field, direction })
}

/// Video listing: substring search over title/description, optional owner
/// filter, owner summary embedded. Unpublished videos stay invisible unless
/// the requester filters for their own channel.
pub fn video_listing(query: &str, owner: Option<Uuid>, viewer: Uuid, sort: Sort) -> PipelineSpec {
    let mut filters = vec![Filter::ContainsFold(
        &["title", "description"],
        query.to_string(),
    )];
    if let Some(owner_id) = owner {
        filters.push(Filter::Eq("owner_id", Bind::Uuid(owner_id)));
    }
    if owner != Some(viewer) {
        filters.push(Filter::Eq("is_published", Bind::Bool(true)));
    }

    PipelineSpec {
        collection: "videos",
        filters,
        joins: vec![owner_join("owner_id")],
        derived: vec![],
        shape: VIDEO_SHAPE,
        sort,
    }
}

/// Channel profile: public fields plus subscriber counts and whether the
/// viewer is among the channel's subscribers
pub fn channel_profile(username: &str, viewer: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "users",
        filters: vec![Filter::Eq("username", Bind::Text(username.to_lowercase()))],
        joins: vec![],
        derived: vec![
            Derived::Count {
                field: "subscriber_count",
                target: "subscriptions",
                key: "channel_id",
            },
            Derived::Count {
                field: "subscribed_to_count",
                target: "subscriptions",
                key: "subscriber_id",
            },
            Derived::MemberOf {
                field: "is_subscribed",
                target: "subscriptions",
                key: "channel_id",
                probe_column: "subscriber_id",
                probe: Some(Bind::Uuid(viewer)),
            },
        ],
        shape: &[
            "id",
            "username",
            "display_name",
            "email",
            "avatar_url",
            "cover_url",
            "created_at",
        ],
        sort: Sort::ascending("created_at"),
    }
}

/// Channel statistics: scalar aggregates over everything a channel owns
pub fn channel_stats(owner: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "users",
        filters: vec![Filter::Eq("id", Bind::Uuid(owner))],
        joins: vec![],
        derived: vec![
            Derived::Count {
                field: "total_videos",
                target: "videos",
                key: "owner_id",
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
            Derived::CountVia {
                field: "total_comments",
                target: "comments",
                target_key: "video_id",
                via: "videos",
                via_key: "owner_id",
            },
            Derived::Count {
                field: "total_tweets",
                target: "tweets",
                key: "owner_id",
            },
            Derived::Count {
                field: "subscriber_count",
                target: "subscriptions",
                key: "channel_id",
            },
            Derived::Count {
                field: "subscribed_to_count",
                target: "subscriptions",
                key: "subscriber_id",
            },
        ],
        shape: &["id", "username"],
        sort: Sort::ascending("id"),
    }
}

/// Watch history: the user's ordered history rows, each resolved to the
/// full video with a reduced owner summary nested inside
pub fn watch_history(user: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "watch_history",
        filters: vec![Filter::Eq("user_id", Bind::Uuid(user))],
        joins: vec![Join {
            target: "videos",
            local_key: "video_id",
            foreign_key: "id",
            output_field: "video",
            shape: VIDEO_SHAPE,
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
        }],
        derived: vec![],
        shape: &["id", "position", "watched_at"],
        sort: Sort::ascending("position"),
    }
}

/// Comment listing for a video, owner summary embedded
pub fn comment_listing(video: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "comments",
        filters: vec![Filter::Eq("video_id", Bind::Uuid(video))],
        joins: vec![Join {
            target: "users",
            local_key: "owner_id",
            foreign_key: "id",
            output_field: "owner",
            shape: &["id", "username", "email", "display_name", "avatar_url"],
            order_by: None,
            singular: true,
            nested: None,
        }],
        derived: vec![],
        shape: &["id", "video_id", "content", "created_at", "updated_at"],
        sort: Sort::ascending("created_at"),
    }
}

/// Videos the user has liked, resolved with their owner summaries
pub fn liked_videos(user: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "likes",
        filters: vec![
            Filter::Eq("liked_by", Bind::Uuid(user)),
            Filter::NotNull("video_id"),
        ],
        joins: vec![Join {
            target: "videos",
            local_key: "video_id",
            foreign_key: "id",
            output_field: "video",
            shape: VIDEO_SHAPE,
            order_by: None,
            singular: true,
            nested: Some(Box::new(owner_join("owner_id"))),
        }],
        derived: vec![],
        shape: &["id", "video_id", "created_at"],
        sort: Sort::ascending("created_at"),
    }
}

/// Subscribers of a channel, each resolved to a user summary
pub fn channel_subscribers(channel: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "subscriptions",
        filters: vec![Filter::Eq("channel_id", Bind::Uuid(channel))],
        joins: vec![Join {
            target: "users",
            local_key: "subscriber_id",
            foreign_key: "id",
            output_field: "subscriber",
            shape: &[
                "id",
                "username",
                "email",
                "display_name",
                "avatar_url",
                "cover_url",
            ],
            order_by: None,
            singular: true,
            nested: None,
        }],
        derived: vec![],
        shape: &["id", "created_at"],
        sort: Sort::ascending("created_at"),
    }
}

/// Channels a user has subscribed to, each resolved to a user summary
pub fn subscribed_channels(subscriber: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "subscriptions",
        filters: vec![Filter::Eq("subscriber_id", Bind::Uuid(subscriber))],
        joins: vec![Join {
            target: "users",
            local_key: "channel_id",
            foreign_key: "id",
            output_field: "channel",
            shape: &[
                "id",
                "username",
                "email",
                "display_name",
                "avatar_url",
                "cover_url",
            ],
            order_by: None,
            singular: true,
            nested: None,
        }],
        derived: vec![],
        shape: &["id", "created_at"],
        sort: Sort::ascending("created_at"),
    }
}

/// Playlist with its ordered video entries
pub fn playlist_detail(playlist: Uuid) -> PipelineSpec {
    PipelineSpec {
        collection: "playlists",
        filters: vec![Filter::Eq("id", Bind::Uuid(playlist))],
        joins: vec![Join {
            target: "playlist_videos",
            local_key: "id",
            foreign_key: "playlist_id",
            output_field: "videos",
            shape: &["video_id", "position"],
            order_by: Some("position"),
            singular: false,
            nested: None,
        }],
        derived: vec![],
        shape: &["id", "owner_id", "name", "description", "created_at", "updated_at"],
        sort: Sort::ascending("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::QueryBuilder;

    fn render(spec: &PipelineSpec) -> String {
        let mut qb = QueryBuilder::new("");
        spec.push_select(&mut qb, None);
        qb.into_sql()
    }

    #[test]
    fn test_video_sort_defaults_and_allow_list() {
        let sort = video_sort(None, None).unwrap();
        assert_eq!(sort.field, "created_at");
        assert_eq!(sort.direction, Direction::Ascending);

        let sort = video_sort(Some("view_count"), Some("descending")).unwrap();
        assert_eq!(sort.field, "view_count");
        assert_eq!(sort.direction, Direction::Descending);

        assert!(video_sort(Some("password_hash"), None).is_err());
        assert!(video_sort(None, Some("sideways")).is_err());
    }

    #[test]
    fn test_video_listing_gates_unpublished_for_strangers() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();

        let sql = render(&video_listing(
            "intro",
            Some(other),
            viewer,
            Sort::ascending("created_at"),
        ));
        assert!(sql.contains("base.is_published"));

        let sql = render(&video_listing(
            "intro",
            Some(viewer),
            viewer,
            Sort::ascending("created_at"),
        ));
        assert!(!sql.contains("base.is_published = "));
    }

    #[test]
    fn test_video_listing_never_exposes_user_secrets() {
        let sql = render(&video_listing(
            "",
            None,
            Uuid::new_v4(),
            Sort::ascending("created_at"),
        ));
        assert!(!sql.contains("password_hash"));
        assert!(!sql.contains("refresh_token"));
        assert!(sql.contains("AS owner"));
    }

    #[test]
    fn test_channel_profile_shape_is_public_only() {
        let sql = render(&channel_profile("Creator_One", Uuid::new_v4()));
        assert!(!sql.contains("password_hash"));
        assert!(!sql.contains("refresh_token"));
        assert!(sql.contains("AS subscriber_count"));
        assert!(sql.contains("AS subscribed_to_count"));
        assert!(sql.contains("AS is_subscribed"));
    }

    #[test]
    fn test_channel_profile_lowercases_username() {
        let spec = channel_profile("Creator_One", Uuid::new_v4());
        match &spec.filters[0] {
            Filter::Eq("username", Bind::Text(v)) => assert_eq!(v, "creator_one"),
            other => panic!("unexpected filter: {other:?}"),
        }
    }

    #[test]
    fn test_channel_stats_covers_every_aggregate() {
        let sql = render(&channel_stats(Uuid::new_v4()));
        for field in [
            "total_videos",
            "total_views",
            "total_likes",
            "total_comments",
            "total_tweets",
            "subscriber_count",
            "subscribed_to_count",
        ] {
            assert!(sql.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_watch_history_is_ordered_and_nested() {
        let sql = render(&watch_history(Uuid::new_v4()));
        assert!(sql.contains("ORDER BY doc.position ASC, doc.id ASC"));
        assert!(sql.contains("AS video"));
        assert!(sql.contains("AS owner"));
    }

    #[test]
    fn test_playlist_detail_orders_entries_by_position() {
        let sql = render(&playlist_detail(Uuid::new_v4()));
        assert!(sql.contains("ORDER BY t0.position, t0.id"));
        assert!(sql.contains("'[]'::jsonb) AS videos"));
    }

    #[test]
    fn test_every_view_sorts_on_a_selected_field() {
        let viewer = Uuid::new_v4();
        let specs = vec![
            video_listing("", None, viewer, video_sort(None, None).unwrap()),
            channel_profile("creator_one", viewer),
            channel_stats(viewer),
            watch_history(viewer),
            comment_listing(viewer),
            liked_videos(viewer),
            channel_subscribers(viewer),
            subscribed_channels(viewer),
            playlist_detail(viewer),
        ];
        for spec in &specs {
            // The outer ORDER BY runs over the shaped subquery, so the sort
            // field and the id tie-break must both be selected.
            assert!(
                spec.shape.contains(&spec.sort.field),
                "view over {} sorts on `{}` which is not in its shape",
                spec.collection,
                spec.sort.field
            );
            assert!(spec.shape.contains(&"id"), "view over {}", spec.collection);
        }
        for field in VIDEO_SORT_FIELDS {
            let sort = video_sort(Some(field), None).unwrap();
            assert!(VIDEO_SHAPE.contains(&sort.field));
        }
    }
}
