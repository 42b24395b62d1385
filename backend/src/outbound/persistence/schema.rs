//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Role definitions. `level` orders roles by privilege.
    roles (id) {
        id -> Int4,
        name -> Varchar,
        description -> Text,
        level -> Int4,
    }
}

diesel::table! {
    /// Accounts. Pending until their invitation is redeemed.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        is_active -> Bool,
        role_id -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Outstanding activation invitations, keyed by SHA-256 token digest.
    user_invitations (token_hash) {
        token_hash -> Varchar,
        user_id -> Uuid,
        expiry -> Timestamptz,
    }
}

diesel::table! {
    /// Posts with an optimistic-concurrency version counter.
    posts (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        content -> Text,
        tags -> Array<Text>,
        version -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Uuid,
        post_id -> Uuid,
        user_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Edge `(user_id, follower_id)`: `follower_id` follows `user_id`.
    followers (user_id, follower_id) {
        user_id -> Uuid,
        follower_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(users -> roles (role_id));
diesel::joinable!(user_invitations -> users (user_id));
diesel::joinable!(posts -> users (user_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    roles,
    users,
    user_invitations,
    posts,
    comments,
    followers,
);
