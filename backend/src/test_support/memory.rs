//! In-memory implementation of every storage port.
//!
//! All tables live behind one mutex, so each port call is atomic with
//! respect to the others, mirroring the transactional guarantees of the
//! PostgreSQL adapters. The store can be flipped into an unavailable mode
//! where every call fails with a connection error.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, FeedRepository, FeedRepositoryError,
    FollowerRepository, FollowerRepositoryError, Invitation, NewUser, PostRepository,
    PostRepositoryError, RoleRepository, RoleRepositoryError, StoredCredentials, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    Comment, EmailAddress, FeedItem, FeedQuery, NewComment, NewPost, PasswordDigest, Post,
    PostId, PostParts, PostUpdate, PostVersion, Role, RoleLevel, RoleName, SortDirection,
    TokenHash, User, UserId, Username,
};

const UNAVAILABLE: &str = "in-memory store is unavailable";

struct StoredUser {
    user: User,
    password: PasswordDigest,
}

struct StoredInvitation {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    roles: HashMap<RoleName, Role>,
    users: HashMap<UserId, StoredUser>,
    invitations: HashMap<String, StoredInvitation>,
    posts: HashMap<PostId, Post>,
    comments: Vec<Comment>,
    /// `(followed, follower)` edges.
    followers: HashSet<(UserId, UserId)>,
    unavailable: bool,
}

impl Tables {
    fn seeded() -> Self {
        let roles = [
            (RoleName::user(), "regular user", 1),
            (RoleName::moderator(), "can edit any post", 2),
            (RoleName::admin(), "can edit and delete any post", 3),
        ]
        .into_iter()
        .map(|(name, description, level)| {
            (
                name.clone(),
                Role::new(name, description, RoleLevel::new(level)),
            )
        })
        .collect();
        Self {
            roles,
            ..Self::default()
        }
    }

    fn username_of(&self, id: &UserId) -> Option<Username> {
        self.users
            .get(id)
            .map(|stored| stored.user.username().clone())
    }

    fn remove_user(&mut self, id: &UserId) -> bool {
        if self.users.remove(id).is_none() {
            return false;
        }
        self.invitations.retain(|_, invitation| invitation.user_id != *id);
        let authored: HashSet<PostId> = self
            .posts
            .values()
            .filter(|post| post.author_id() == id)
            .map(|post| *post.id())
            .collect();
        self.posts.retain(|post_id, _| !authored.contains(post_id));
        self.comments
            .retain(|comment| comment.author_id != *id && !authored.contains(&comment.post_id));
        self.followers
            .retain(|(followed, follower)| followed != id && follower != id);
        true
    }
}

/// Shared in-memory database implementing every storage port.
///
/// Clones share the same tables.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// An empty store with the `user`, `moderator` and `admin` roles seeded.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::seeded())),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent port call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Insert an already activated user holding `role`.
    pub fn insert_active_user(
        &self,
        username: Username,
        email: EmailAddress,
        password: PasswordDigest,
        role: &RoleName,
    ) -> Result<User, UserRepositoryError> {
        let mut tables = self.lock();
        let role = tables
            .roles
            .get(role)
            .cloned()
            .ok_or_else(|| UserRepositoryError::unknown_role(role.as_str()))?;
        let user = User::new(UserId::random(), username, email, role, self.clock.utc()).activated();
        tables.users.insert(
            *user.id(),
            StoredUser {
                user: user.clone(),
                password,
            },
        );
        Ok(user)
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn invitation_count(&self) -> usize {
        self.lock().invitations.len()
    }

    /// Whether `follower` currently follows `followed`.
    pub fn is_following(&self, followed: &UserId, follower: &UserId) -> bool {
        self.lock().followers.contains(&(*followed, *follower))
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RoleRepositoryError> {
        let tables = self.lock();
        if tables.unavailable {
            return Err(RoleRepositoryError::connection(UNAVAILABLE));
        }
        Ok(tables.roles.get(name).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_and_invite(
        &self,
        user: &NewUser,
        invitation: &Invitation,
    ) -> Result<User, UserRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(UserRepositoryError::connection(UNAVAILABLE));
        }
        if tables
            .users
            .values()
            .any(|stored| stored.user.email() == &user.email)
        {
            return Err(UserRepositoryError::duplicate_email());
        }
        if tables
            .users
            .values()
            .any(|stored| stored.user.username() == &user.username)
        {
            return Err(UserRepositoryError::duplicate_username());
        }
        let role = tables
            .roles
            .get(&user.role)
            .cloned()
            .ok_or_else(|| UserRepositoryError::unknown_role(user.role.as_str()))?;

        let created = User::new(
            user.id,
            user.username.clone(),
            user.email.clone(),
            role,
            self.clock.utc(),
        );
        tables.users.insert(
            user.id,
            StoredUser {
                user: created.clone(),
                password: user.password.clone(),
            },
        );
        tables.invitations.insert(
            invitation.token_hash.as_str().to_owned(),
            StoredInvitation {
                user_id: user.id,
                expires_at: invitation.expires_at,
            },
        );
        Ok(created)
    }

    async fn activate(
        &self,
        token_hash: &TokenHash,
        now: DateTime<Utc>,
    ) -> Result<UserId, UserRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(UserRepositoryError::connection(UNAVAILABLE));
        }
        let user_id = tables
            .invitations
            .get(token_hash.as_str())
            .filter(|invitation| invitation.expires_at > now)
            .map(|invitation| invitation.user_id)
            .ok_or_else(UserRepositoryError::not_found)?;
        let stored = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(UserRepositoryError::not_found)?;
        stored.user = stored.user.clone().activated();
        tables
            .invitations
            .retain(|_, invitation| invitation.user_id != user_id);
        Ok(user_id)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(UserRepositoryError::connection(UNAVAILABLE));
        }
        if tables.remove_user(id) {
            Ok(())
        } else {
            Err(UserRepositoryError::not_found())
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.lock();
        if tables.unavailable {
            return Err(UserRepositoryError::connection(UNAVAILABLE));
        }
        Ok(tables.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let tables = self.lock();
        if tables.unavailable {
            return Err(UserRepositoryError::connection(UNAVAILABLE));
        }
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.is_active() && stored.user.email() == email)
            .map(|stored| StoredCredentials {
                user: stored.user.clone(),
                password: stored.password.clone(),
            }))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: &NewPost) -> Result<Post, PostRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(PostRepositoryError::connection(UNAVAILABLE));
        }
        if !tables.users.contains_key(&post.author_id) {
            return Err(PostRepositoryError::unknown_author());
        }
        let now = self.clock.utc();
        let created = Post::from(PostParts {
            id: post.id,
            author_id: post.author_id,
            title: post.title.clone(),
            content: post.content.clone(),
            tags: post.tags.clone(),
            version: PostVersion::INITIAL,
            created_at: now,
            updated_at: now,
        });
        tables.posts.insert(post.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Post, PostRepositoryError> {
        let tables = self.lock();
        if tables.unavailable {
            return Err(PostRepositoryError::connection(UNAVAILABLE));
        }
        tables
            .posts
            .get(id)
            .cloned()
            .ok_or_else(PostRepositoryError::not_found)
    }

    async fn update(&self, update: &PostUpdate) -> Result<Post, PostRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(PostRepositoryError::connection(UNAVAILABLE));
        }
        let now = self.clock.utc();
        let post = tables
            .posts
            .get_mut(&update.id)
            .filter(|post| post.version() == update.expected_version)
            .ok_or_else(PostRepositoryError::not_found)?;
        *post = post.clone().updated(update, update.next_version, now);
        Ok(post.clone())
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(PostRepositoryError::connection(UNAVAILABLE));
        }
        tables
            .posts
            .remove(id)
            .ok_or_else(PostRepositoryError::not_found)?;
        tables.comments.retain(|comment| comment.post_id != *id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(CommentRepositoryError::connection(UNAVAILABLE));
        }
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(CommentRepositoryError::post_not_found());
        }
        let author_username = tables
            .username_of(&comment.author_id)
            .ok_or_else(|| CommentRepositoryError::query("comment author does not exist"))?;
        let created = Comment {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username,
            content: comment.content.clone(),
            created_at: self.clock.utc(),
        };
        tables.comments.push(created.clone());
        Ok(created)
    }

    async fn list_for_post(&self, post_id: &PostId) -> Result<Vec<Comment>, CommentRepositoryError> {
        let tables = self.lock();
        if tables.unavailable {
            return Err(CommentRepositoryError::connection(UNAVAILABLE));
        }
        // Newest first; later insertions win ties.
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .rev()
            .filter(|comment| comment.post_id == *post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| Reverse(comment.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl FollowerRepository for InMemoryStore {
    async fn follow(
        &self,
        followed: &UserId,
        follower: &UserId,
    ) -> Result<(), FollowerRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(FollowerRepositoryError::connection(UNAVAILABLE));
        }
        if followed == follower {
            return Err(FollowerRepositoryError::query("followers_not_self violated"));
        }
        if !tables.users.contains_key(followed) || !tables.users.contains_key(follower) {
            return Err(FollowerRepositoryError::user_not_found());
        }
        if tables.followers.insert((*followed, *follower)) {
            Ok(())
        } else {
            Err(FollowerRepositoryError::already_following())
        }
    }

    async fn unfollow(
        &self,
        followed: &UserId,
        follower: &UserId,
    ) -> Result<(), FollowerRepositoryError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(FollowerRepositoryError::connection(UNAVAILABLE));
        }
        if tables.followers.remove(&(*followed, *follower)) {
            Ok(())
        } else {
            Err(FollowerRepositoryError::not_found())
        }
    }
}

fn matches_filters(post: &Post, query: &FeedQuery) -> bool {
    let tags_match = query.tags().is_empty()
        || post
            .tags()
            .as_slice()
            .iter()
            .any(|tag| query.tags().contains(tag));
    let search_match = query.search().is_none_or(|needle| {
        let needle = needle.to_lowercase();
        post.title().as_str().to_lowercase().contains(&needle)
            || post.content().as_str().to_lowercase().contains(&needle)
    });
    tags_match && search_match
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl FeedRepository for InMemoryStore {
    async fn user_feed(
        &self,
        viewer: &UserId,
        query: &FeedQuery,
    ) -> Result<Vec<FeedItem>, FeedRepositoryError> {
        let tables = self.lock();
        if tables.unavailable {
            return Err(FeedRepositoryError::connection(UNAVAILABLE));
        }
        let followed: HashSet<UserId> = tables
            .followers
            .iter()
            .filter(|(_, follower)| follower == viewer)
            .map(|(followed, _)| *followed)
            .collect();

        let mut posts: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| followed.contains(post.author_id()))
            .filter(|post| matches_filters(post, query))
            .collect();
        posts.sort_by_key(|post| (post.created_at(), *post.id()));
        if query.sort() == SortDirection::Desc {
            posts.reverse();
        }

        posts
            .into_iter()
            .skip(to_usize(query.offset()))
            .take(to_usize(query.limit()))
            .map(|post| {
                let author_username = tables
                    .username_of(post.author_id())
                    .ok_or_else(|| FeedRepositoryError::query("post author does not exist"))?;
                let comment_count = tables
                    .comments
                    .iter()
                    .filter(|comment| comment.post_id == *post.id())
                    .count();
                Ok(FeedItem {
                    id: *post.id(),
                    author_id: *post.author_id(),
                    author_username,
                    title: post.title().clone(),
                    content: post.content().clone(),
                    tags: post.tags().clone(),
                    version: post.version(),
                    created_at: post.created_at(),
                    comment_count: i64::try_from(comment_count).unwrap_or(i64::MAX),
                })
            })
            .collect()
    }
}
