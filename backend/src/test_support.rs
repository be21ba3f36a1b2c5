//! In-memory adapters for tests.
//!
//! These implement the driven ports over mutex-guarded maps so service and
//! HTTP tests can run the real use-case code without a database. The follow
//! store can additionally be armed to simulate the first-upsert race once
//! per call to [`InMemoryFollowGraphStore::fail_next_upsert_for`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::ports::{
    CommentStore, CommentStoreError, FixtureMailer, FollowGraphStore, FollowStoreError, PostPatch,
    PostStore, PostStoreError, UserStore, UserStoreError, VoteEdgeStore, VoteStoreError,
};
use crate::domain::{
    AccountService, Comment, CommentBody, CommentId, CommentService, EmailAddress, FollowList,
    FollowService, FollowStats, Page, Post, PostId, PostService, ResetTokenRecord, Role, TargetRef,
    User, UserAccount, UserId, UserName, VoteDirection, VoteEdge, VoteId, VoteService, VoteSummary,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::security::Sha256CredentialHasher;

fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.size() as usize)
        .collect()
}

/// In-memory [`UserStore`].
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserStore {
    /// Insert a minimal live account directly, for tests that need an
    /// existing user without running the signup flow.
    pub fn seed_account(&self, id: UserId) {
        let email = format!("{}@example.com", id.as_uuid().simple());
        let account = UserAccount {
            user: User {
                id,
                name: UserName::new("Seeded User").expect("valid name"),
                email: EmailAddress::new(email).expect("valid email"),
                role: Role::User,
                ban_reason: None,
                created_at: chrono::Utc::now(),
                follow_stats: FollowStats::default(),
            },
            password_hash: "seeded".to_owned(),
            reset_token: None,
        };
        self.accounts
            .lock()
            .expect("accounts lock")
            .insert(id, account);
    }

    /// Fetch a stored account by email, for assertions.
    pub fn account_by_email(&self, email: &str) -> Option<UserAccount> {
        let accounts = self.accounts.lock().expect("accounts lock");
        accounts
            .values()
            .find(|account| account.user.email.as_ref() == email)
            .cloned()
    }

    /// Mark an account as banned.
    pub fn ban(&self, id: &UserId, reason: &str) {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if let Some(account) = accounts.get_mut(id) {
            account.user.ban_reason = Some(reason.to_owned());
        }
    }

    /// Promote an account to a new role.
    pub fn set_role(&self, id: &UserId, role: crate::domain::Role) {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if let Some(account) = accounts.get_mut(id) {
            account.user.role = role;
        }
    }

    /// Stage a reset token directly, bypassing the mail flow.
    pub fn stage_reset_token(&self, id: &UserId, record: ResetTokenRecord) {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if let Some(account) = accounts.get_mut(id) {
            account.reset_token = Some(record);
        }
    }

    /// Read back the derived follow stats, for assertions.
    pub fn follow_stats_of(&self, id: &UserId) -> Option<FollowStats> {
        let accounts = self.accounts.lock().expect("accounts lock");
        accounts.get(id).map(|account| account.user.follow_stats)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserStoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if accounts
            .values()
            .any(|existing| existing.user.email == account.user.email)
        {
            return Err(UserStoreError::duplicate_email(
                account.user.email.as_ref(),
            ));
        }
        accounts.insert(account.user.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserStoreError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        Ok(accounts.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &crate::domain::EmailAddress,
    ) -> Result<Option<UserAccount>, UserStoreError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        Ok(accounts
            .values()
            .find(|account| account.user.email == *email)
            .cloned())
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserAccount>, UserStoreError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        Ok(accounts
            .values()
            .find(|account| {
                account
                    .reset_token
                    .as_ref()
                    .is_some_and(|record| record.token_hash == token_hash)
            })
            .cloned())
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserStoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if let Some(account) = accounts.get_mut(id) {
            account.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn set_reset_token<'a>(
        &self,
        id: &UserId,
        token: Option<&'a ResetTokenRecord>,
    ) -> Result<(), UserStoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if let Some(account) = accounts.get_mut(id) {
            account.reset_token = token.cloned();
        }
        Ok(())
    }

    async fn write_follow_stats(
        &self,
        id: &UserId,
        stats: FollowStats,
    ) -> Result<(), UserStoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if let Some(account) = accounts.get_mut(id) {
            account.user.follow_stats = stats;
        }
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, UserStoreError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        let mut users: Vec<User> = accounts.values().map(|account| account.user.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(users, page))
    }
}

/// In-memory [`PostStore`].
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    posts: Mutex<HashMap<PostId, Post>>,
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError> {
        let mut posts = self.posts.lock().expect("posts lock");
        posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        let posts = self.posts.lock().expect("posts lock");
        Ok(posts.get(id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Post>, PostStoreError> {
        let posts = self.posts.lock().expect("posts lock");
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(all, page))
    }

    async fn update_fields(&self, id: &PostId, patch: &PostPatch) -> Result<bool, PostStoreError> {
        let mut posts = self.posts.lock().expect("posts lock");
        match posts.get_mut(id) {
            Some(post) => {
                if let Some(title) = &patch.title {
                    post.title = title.clone();
                }
                if let Some(content) = &patch.content {
                    post.content = content.clone();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostStoreError> {
        let mut posts = self.posts.lock().expect("posts lock");
        Ok(posts.remove(id).is_some())
    }

    async fn write_vote_summary(
        &self,
        id: &PostId,
        summary: &VoteSummary,
    ) -> Result<(), PostStoreError> {
        let mut posts = self.posts.lock().expect("posts lock");
        if let Some(post) = posts.get_mut(id) {
            post.votes = *summary;
        }
        Ok(())
    }

    async fn write_comment_count(&self, id: &PostId, count: u64) -> Result<(), PostStoreError> {
        let mut posts = self.posts.lock().expect("posts lock");
        if let Some(post) = posts.get_mut(id) {
            post.comment_count = count;
        }
        Ok(())
    }
}

/// In-memory [`CommentStore`].
#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
    comments: Mutex<HashMap<CommentId, Comment>>,
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn insert(&self, comment: &Comment) -> Result<(), CommentStoreError> {
        let mut comments = self.comments.lock().expect("comments lock");
        if comments
            .values()
            .any(|existing| existing.post == comment.post && existing.author == comment.author)
        {
            return Err(CommentStoreError::duplicate_comment(
                comment.post.to_string(),
                comment.author.to_string(),
            ));
        }
        comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentStoreError> {
        let comments = self.comments.lock().expect("comments lock");
        Ok(comments.get(id).cloned())
    }

    async fn list_for_post(
        &self,
        post: &PostId,
        page: Page,
    ) -> Result<Vec<Comment>, CommentStoreError> {
        let comments = self.comments.lock().expect("comments lock");
        let mut matching: Vec<Comment> = comments
            .values()
            .filter(|comment| comment.post == *post)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matching, page))
    }

    async fn count_for_post(&self, post: &PostId) -> Result<u64, CommentStoreError> {
        let comments = self.comments.lock().expect("comments lock");
        Ok(comments
            .values()
            .filter(|comment| comment.post == *post)
            .count() as u64)
    }

    async fn update_body(
        &self,
        id: &CommentId,
        body: &CommentBody,
    ) -> Result<bool, CommentStoreError> {
        let mut comments = self.comments.lock().expect("comments lock");
        match comments.get_mut(id) {
            Some(comment) => {
                comment.body = body.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &CommentId) -> Result<bool, CommentStoreError> {
        let mut comments = self.comments.lock().expect("comments lock");
        Ok(comments.remove(id).is_some())
    }

    async fn write_vote_summary(
        &self,
        id: &CommentId,
        summary: &VoteSummary,
    ) -> Result<(), CommentStoreError> {
        let mut comments = self.comments.lock().expect("comments lock");
        if let Some(comment) = comments.get_mut(id) {
            comment.votes = *summary;
        }
        Ok(())
    }
}

/// In-memory [`VoteEdgeStore`].
#[derive(Debug, Default)]
pub struct InMemoryVoteEdgeStore {
    edges: Mutex<HashMap<VoteId, VoteEdge>>,
}

#[async_trait]
impl VoteEdgeStore for InMemoryVoteEdgeStore {
    async fn upsert(
        &self,
        user: &UserId,
        target: &TargetRef,
        direction: VoteDirection,
    ) -> Result<VoteEdge, VoteStoreError> {
        let mut edges = self.edges.lock().expect("edges lock");
        if let Some(existing) = edges
            .values_mut()
            .find(|edge| edge.user == *user && edge.target == *target)
        {
            existing.direction = direction;
            return Ok(existing.clone());
        }
        let edge = VoteEdge::new(*user, *target, direction);
        edges.insert(edge.id, edge.clone());
        Ok(edge)
    }

    async fn find_by_id(&self, id: &VoteId) -> Result<Option<VoteEdge>, VoteStoreError> {
        let edges = self.edges.lock().expect("edges lock");
        Ok(edges.get(id).cloned())
    }

    async fn update_direction(
        &self,
        id: &VoteId,
        direction: VoteDirection,
    ) -> Result<bool, VoteStoreError> {
        let mut edges = self.edges.lock().expect("edges lock");
        match edges.get_mut(id) {
            Some(edge) => {
                edge.direction = direction;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &VoteId) -> Result<bool, VoteStoreError> {
        let mut edges = self.edges.lock().expect("edges lock");
        Ok(edges.remove(id).is_some())
    }

    async fn directions_for(
        &self,
        target: &TargetRef,
    ) -> Result<Vec<VoteDirection>, VoteStoreError> {
        let edges = self.edges.lock().expect("edges lock");
        Ok(edges
            .values()
            .filter(|edge| edge.target == *target)
            .map(|edge| edge.direction)
            .collect())
    }

    async fn list_for_target(
        &self,
        target: &TargetRef,
        page: Page,
    ) -> Result<Vec<VoteEdge>, VoteStoreError> {
        let edges = self.edges.lock().expect("edges lock");
        let matching: Vec<VoteEdge> = edges
            .values()
            .filter(|edge| edge.target == *target)
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }
}

/// In-memory [`FollowGraphStore`] with an armable first-upsert race.
#[derive(Debug, Default)]
pub struct InMemoryFollowGraphStore {
    following: Mutex<HashMap<UserId, Vec<UserId>>>,
    followers: Mutex<HashMap<UserId, Vec<UserId>>>,
    fail_upserts_for: Mutex<Vec<UserId>>,
}

impl InMemoryFollowGraphStore {
    /// Arm the race: the next upsert owned by `owner` performs its write but
    /// reports the document as vanished, exactly once.
    pub fn fail_next_upsert_for(&self, owner: UserId) {
        self.fail_upserts_for
            .lock()
            .expect("race flags lock")
            .push(owner);
    }

    fn take_failure(&self, owner: &UserId) -> bool {
        let mut flags = self.fail_upserts_for.lock().expect("race flags lock");
        if let Some(index) = flags.iter().position(|flagged| flagged == owner) {
            flags.remove(index);
            return true;
        }
        false
    }

    fn add_member(
        map: &Mutex<HashMap<UserId, Vec<UserId>>>,
        owner: &UserId,
        member: &UserId,
    ) -> FollowList {
        let mut lists = map.lock().expect("follow lists lock");
        let members = lists.entry(*owner).or_default();
        if !members.contains(member) {
            members.push(*member);
        }
        FollowList {
            owner: *owner,
            members: members.clone(),
        }
    }

    fn remove_member(
        map: &Mutex<HashMap<UserId, Vec<UserId>>>,
        owner: &UserId,
        member: &UserId,
    ) {
        let mut lists = map.lock().expect("follow lists lock");
        if let Some(members) = lists.get_mut(owner) {
            members.retain(|existing| existing != member);
        }
    }

    fn read(
        map: &Mutex<HashMap<UserId, Vec<UserId>>>,
        owner: &UserId,
    ) -> Option<FollowList> {
        let lists = map.lock().expect("follow lists lock");
        lists.get(owner).map(|members| FollowList {
            owner: *owner,
            members: members.clone(),
        })
    }
}

#[async_trait]
impl FollowGraphStore for InMemoryFollowGraphStore {
    async fn following_of(&self, owner: &UserId) -> Result<Option<FollowList>, FollowStoreError> {
        Ok(Self::read(&self.following, owner))
    }

    async fn followers_of(&self, owner: &UserId) -> Result<Option<FollowList>, FollowStoreError> {
        Ok(Self::read(&self.followers, owner))
    }

    async fn add_to_following(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError> {
        // The write lands before the race fires: the document exists, the
        // upsert just failed to observe it.
        let list = Self::add_member(&self.following, owner, member);
        if self.take_failure(owner) {
            return Err(FollowStoreError::vanished_upsert(owner.to_string()));
        }
        Ok(list)
    }

    async fn add_to_followers(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError> {
        let list = Self::add_member(&self.followers, owner, member);
        if self.take_failure(owner) {
            return Err(FollowStoreError::vanished_upsert(owner.to_string()));
        }
        Ok(list)
    }

    async fn remove_from_following(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<(), FollowStoreError> {
        Self::remove_member(&self.following, owner, member);
        Ok(())
    }

    async fn remove_from_followers(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<(), FollowStoreError> {
        Self::remove_member(&self.followers, owner, member);
        Ok(())
    }
}

/// Handles onto the in-memory stores behind an [`HttpState`].
pub struct InMemoryHandles {
    /// User accounts.
    pub users: Arc<InMemoryUserStore>,
    /// Posts.
    pub posts: Arc<InMemoryPostStore>,
    /// Comments.
    pub comments: Arc<InMemoryCommentStore>,
    /// Vote edges.
    pub votes: Arc<InMemoryVoteEdgeStore>,
    /// Follow mirrors.
    pub graph: Arc<InMemoryFollowGraphStore>,
}

/// Build an [`HttpState`] running the real services over in-memory stores.
pub fn in_memory_state() -> (HttpState, InMemoryHandles) {
    let users = Arc::new(InMemoryUserStore::default());
    let posts = Arc::new(InMemoryPostStore::default());
    let comments = Arc::new(InMemoryCommentStore::default());
    let votes = Arc::new(InMemoryVoteEdgeStore::default());
    let graph = Arc::new(InMemoryFollowGraphStore::default());

    let accounts = Arc::new(AccountService::new(
        Arc::clone(&users),
        Arc::new(Sha256CredentialHasher::default()),
        Arc::new(FixtureMailer),
    ));
    let post_service = Arc::new(PostService::new(Arc::clone(&posts)));
    let comment_service = Arc::new(CommentService::new(
        Arc::clone(&comments),
        Arc::clone(&posts),
    ));
    let vote_service = Arc::new(VoteService::new(
        Arc::clone(&votes),
        Arc::clone(&posts),
        Arc::clone(&comments),
    ));
    let follow_service = Arc::new(FollowService::new(Arc::clone(&graph), Arc::clone(&users)));

    let state = HttpState {
        account_commands: accounts.clone(),
        accounts,
        post_commands: post_service.clone(),
        posts: post_service,
        comment_commands: comment_service.clone(),
        comments: comment_service,
        vote_commands: vote_service.clone(),
        votes: vote_service,
        follow_commands: follow_service.clone(),
        follows: follow_service,
    };

    (
        state,
        InMemoryHandles {
            users,
            posts,
            comments,
            votes,
            graph,
        },
    )
}
