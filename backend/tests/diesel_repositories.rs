//! Integration tests for the Diesel adapters against PostgreSQL.
//!
//! Skipped unless `SOCIAL_TEST_DATABASE_URL` is set.

#[path = "support/database.rs"]
mod database;

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use rstest::rstest;

use social::domain::ports::{
    CommentRepository, CommentRepositoryError, FeedRepository, FollowerRepository,
    FollowerRepositoryError, Invitation, NewUser, PostRepository, PostRepositoryError,
    RoleRepository, UserRepository, UserRepositoryError,
};
use social::domain::{
    ActivationToken, CommentContent, CommentId, EmailAddress, FeedQuery, NewComment, NewPost,
    PasswordDigest, Post, PostContent, PostId, PostTitle, PostUpdate, PostVersion, RoleLevel,
    RoleName, Tags, User, UserId, Username,
};
use social::outbound::cache::CachingRoleRepository;
use social::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselFeedRepository, DieselFollowerRepository,
    DieselPostRepository, DieselRoleRepository, DieselUserRepository,
};

use database::{test_pool, unique_name};

fn new_user(name: &str) -> NewUser {
    NewUser {
        id: UserId::random(),
        username: Username::new(name).expect("valid username"),
        email: EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
        password: PasswordDigest::new("digest"),
        role: RoleName::user(),
    }
}

fn invitation(token: &ActivationToken, ttl: TimeDelta) -> Invitation {
    Invitation {
        token_hash: token.hash(),
        expires_at: Utc::now() + ttl,
    }
}

/// Register and activate a fresh user.
async fn active_user(pool: &DbPool, prefix: &str) -> User {
    let users = DieselUserRepository::new(pool.clone());
    let token = ActivationToken::generate();
    let user = users
        .create_and_invite(&new_user(&unique_name(prefix)), &invitation(&token, TimeDelta::hours(1)))
        .await
        .expect("user created");
    users
        .activate(&token.hash(), Utc::now())
        .await
        .expect("user activated");
    users
        .find_by_id(user.id())
        .await
        .expect("lookup succeeds")
        .expect("user exists")
}

async fn publish(pool: &DbPool, author: &User, title: &str, tags: &[&str]) -> Post {
    DieselPostRepository::new(pool.clone())
        .create(&NewPost {
            id: PostId::random(),
            author_id: *author.id(),
            title: PostTitle::new(title).expect("valid title"),
            content: PostContent::new("body text").expect("valid content"),
            tags: Tags::new(tags.iter().copied()).expect("valid tags"),
        })
        .await
        .expect("post created")
}

#[rstest]
#[tokio::test]
async fn registration_activation_and_credentials() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool.clone());
    let token = ActivationToken::generate();
    let pending = new_user(&unique_name("pending"));

    let created = users
        .create_and_invite(&pending, &invitation(&token, TimeDelta::hours(1)))
        .await
        .expect("user created");
    assert!(!created.is_active());
    assert!(
        users
            .find_credentials_by_email(&pending.email)
            .await
            .expect("lookup succeeds")
            .is_none(),
        "pending users cannot log in"
    );

    let activated = users
        .activate(&token.hash(), Utc::now())
        .await
        .expect("activation succeeds");
    assert_eq!(activated, pending.id);

    let stored = users
        .find_credentials_by_email(&pending.email)
        .await
        .expect("lookup succeeds")
        .expect("credentials exist");
    assert!(stored.user.is_active());
    assert_eq!(stored.password.as_str(), "digest");
    assert_eq!(stored.user.role().name(), &RoleName::user());

    let again = users
        .activate(&token.hash(), Utc::now())
        .await
        .expect_err("token consumed");
    assert!(matches!(again, UserRepositoryError::NotFound));
}

#[rstest]
#[tokio::test]
async fn duplicates_leave_no_rows_behind() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool.clone());
    let first = new_user(&unique_name("dup"));
    users
        .create_and_invite(&first, &invitation(&ActivationToken::generate(), TimeDelta::hours(1)))
        .await
        .expect("first user created");

    let same_email = NewUser {
        id: UserId::random(),
        username: Username::new(unique_name("other")).expect("valid username"),
        ..first.clone()
    };
    let token = ActivationToken::generate();
    let err = users
        .create_and_invite(&same_email, &invitation(&token, TimeDelta::hours(1)))
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, UserRepositoryError::DuplicateEmail));

    let same_username = NewUser {
        id: UserId::random(),
        email: EmailAddress::new(format!("{}@example.com", unique_name("mail")))
            .expect("valid email"),
        ..first.clone()
    };
    let err = users
        .create_and_invite(&same_username, &invitation(&token, TimeDelta::hours(1)))
        .await
        .expect_err("duplicate username");
    assert!(matches!(err, UserRepositoryError::DuplicateUsername));

    assert!(
        users
            .find_by_id(&same_email.id)
            .await
            .expect("lookup succeeds")
            .is_none()
    );
    let redeem = users
        .activate(&token.hash(), Utc::now())
        .await
        .expect_err("no invitation was stored");
    assert!(matches!(redeem, UserRepositoryError::NotFound));
}

#[rstest]
#[tokio::test]
async fn expired_invitations_are_not_found_and_delete_compensates() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool.clone());
    let token = ActivationToken::generate();
    let pending = new_user(&unique_name("late"));
    users
        .create_and_invite(&pending, &invitation(&token, TimeDelta::hours(1)))
        .await
        .expect("user created");

    let err = users
        .activate(&token.hash(), Utc::now() + TimeDelta::hours(2))
        .await
        .expect_err("invitation expired");
    assert!(matches!(err, UserRepositoryError::NotFound));

    users.delete(&pending.id).await.expect("user deleted");
    assert!(
        users
            .find_by_id(&pending.id)
            .await
            .expect("lookup succeeds")
            .is_none()
    );
    assert!(matches!(
        users.delete(&pending.id).await,
        Err(UserRepositoryError::NotFound)
    ));
}

#[rstest]
#[tokio::test]
async fn roles_are_seeded_and_cacheable() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let roles = CachingRoleRepository::new(DieselRoleRepository::new(pool));

    for (name, level) in [
        (RoleName::user(), 1),
        (RoleName::moderator(), 2),
        (RoleName::admin(), 3),
    ] {
        let role = roles
            .find_by_name(&name)
            .await
            .expect("lookup succeeds")
            .expect("role seeded");
        assert_eq!(role.level(), RoleLevel::new(level));
    }
    let missing = RoleName::new("superuser").expect("valid role name");
    assert!(
        roles
            .find_by_name(&missing)
            .await
            .expect("lookup succeeds")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn concurrent_updates_of_one_version_admit_one_writer() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let author = active_user(&pool, "writer").await;
    let post = publish(&pool, &author, "draft", &[]).await;
    let posts = Arc::new(DieselPostRepository::new(pool.clone()));

    let update = |title: &str| PostUpdate {
        id: *post.id(),
        expected_version: PostVersion::INITIAL,
        next_version: PostVersion::new(1),
        title: PostTitle::new(title).expect("valid title"),
        content: post.content().clone(),
    };
    let (left, right) = (update("left"), update("right"));
    let (left, right) = futures::join!(posts.update(&left), posts.update(&right));

    let successes = [&left, &right].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(
        [left, right]
            .into_iter()
            .filter_map(Result::err)
            .all(|err| matches!(err, PostRepositoryError::NotFound))
    );
    let stored = posts.find_by_id(post.id()).await.expect("post exists");
    assert_eq!(stored.version(), PostVersion::new(1));
    assert!(stored.updated_at() > stored.created_at());
}

#[rstest]
#[tokio::test]
async fn comments_require_their_post() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let author = active_user(&pool, "commenter").await;
    let post = publish(&pool, &author, "discussed", &[]).await;
    let comments = DieselCommentRepository::new(pool.clone());
    let comment = |post_id: PostId| NewComment {
        id: CommentId::random(),
        post_id,
        author_id: *author.id(),
        content: CommentContent::new("nice").expect("valid comment"),
    };

    let created = comments
        .create(&comment(*post.id()))
        .await
        .expect("comment created");
    assert_eq!(created.author_username, *author.username());

    let orphan = comments
        .create(&comment(PostId::random()))
        .await
        .expect_err("post missing");
    assert!(matches!(orphan, CommentRepositoryError::PostNotFound));

    let listed = comments
        .list_for_post(post.id())
        .await
        .expect("listing succeeds");
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[tokio::test]
async fn follows_shape_the_feed() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let viewer = active_user(&pool, "viewer").await;
    let author = active_user(&pool, "author").await;
    let stranger = active_user(&pool, "stranger").await;
    let followers = DieselFollowerRepository::new(pool.clone());

    followers
        .follow(author.id(), viewer.id())
        .await
        .expect("follow recorded");
    let twice = followers
        .follow(author.id(), viewer.id())
        .await
        .expect_err("edge exists");
    assert!(matches!(twice, FollowerRepositoryError::AlreadyFollowing));
    let ghost = followers
        .follow(&UserId::random(), viewer.id())
        .await
        .expect_err("no such user");
    assert!(matches!(ghost, FollowerRepositoryError::UserNotFound));

    let tagged = publish(&pool, &author, "tagged", &["rust"]).await;
    publish(&pool, &author, "untagged", &[]).await;
    publish(&pool, &stranger, "unfollowed", &["rust"]).await;

    let feed = DieselFeedRepository::new(pool.clone());
    let everything = feed
        .user_feed(viewer.id(), &FeedQuery::default())
        .await
        .expect("feed loads");
    assert_eq!(everything.len(), 2);
    assert!(everything.iter().all(|item| item.author_id == *author.id()));

    let query = FeedQuery::try_from_parts(None, None, None, Some("rust"), None)
        .expect("valid query");
    let filtered = feed
        .user_feed(viewer.id(), &query)
        .await
        .expect("feed loads");
    let ids: Vec<PostId> = filtered.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![*tagged.id()]);

    followers
        .unfollow(author.id(), viewer.id())
        .await
        .expect("unfollow recorded");
    assert!(
        feed.user_feed(viewer.id(), &FeedQuery::default())
            .await
            .expect("feed loads")
            .is_empty()
    );
    assert!(matches!(
        followers.unfollow(author.id(), viewer.id()).await,
        Err(FollowerRepositoryError::NotFound)
    ));
}
