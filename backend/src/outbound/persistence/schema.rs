//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate or update this
//! file to match (`diesel print-schema`).

diesel::table! {
    /// User accounts.
    ///
    /// `following_count` and `followers_count` are denormalised caches
    /// written only by the follow recompute step.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        user_name -> Varchar,
        /// Lowercased contact address; unique.
        email -> Varchar,
        /// Role label: user, moderator, or admin.
        role -> Varchar,
        /// Ban reason; NULL when the account is in good standing.
        ban_reason -> Nullable<Varchar>,
        /// Salted password hash.
        password_hash -> Varchar,
        /// Pending reset-token hash, if any.
        reset_token_hash -> Nullable<Varchar>,
        /// Reset-token expiry, paired with the hash.
        reset_token_expires_at -> Nullable<Timestamptz>,
        /// Derived size of the following list.
        following_count -> Int8,
        /// Derived size of the followers list.
        followers_count -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published posts.
    ///
    /// The vote tallies and `comment_count` are denormalised caches written
    /// only by the recompute steps.
    posts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        author_id -> Uuid,
        /// Headline, at most 300 characters.
        title -> Varchar,
        /// Body text, at most 3000 characters.
        content -> Text,
        /// Publication timestamp.
        created_at -> Timestamptz,
        /// Derived count of up votes.
        likes -> Int8,
        /// Derived count of down votes.
        dislikes -> Int8,
        /// Derived likes + dislikes.
        total_votes -> Int8,
        /// Derived like share in percent.
        like_percentage -> Float8,
        /// Derived number of comments.
        comment_count -> Int8,
    }
}

diesel::table! {
    /// Comments under posts; unique per (post, author).
    comments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        author_id -> Uuid,
        /// Parent post.
        post_id -> Uuid,
        /// Comment text.
        body -> Text,
        /// Publication timestamp.
        created_at -> Timestamptz,
        /// Derived count of up votes.
        likes -> Int8,
        /// Derived count of down votes.
        dislikes -> Int8,
        /// Derived likes + dislikes.
        total_votes -> Int8,
        /// Derived like share in percent.
        like_percentage -> Float8,
    }
}

diesel::table! {
    /// Vote edges; unique per (user, target).
    vote_edges (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The voting user.
        user_id -> Uuid,
        /// Target discriminator: post or comment.
        target_kind -> Varchar,
        /// Target identifier within its kind.
        target_id -> Uuid,
        /// Direction: -1, 0, or 1.
        direction -> Int2,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Following mirror: the users each user follows.
    following_lists (user_id) {
        /// Owning user; primary key.
        user_id -> Uuid,
        /// Member user ids, set semantics.
        members -> Array<Uuid>,
    }
}

diesel::table! {
    /// Followers mirror: the users following each user.
    follower_lists (user_id) {
        /// Owning user; primary key.
        user_id -> Uuid,
        /// Member user ids, set semantics.
        members -> Array<Uuid>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    posts,
    comments,
    vote_edges,
    following_lists,
    follower_lists,
);
