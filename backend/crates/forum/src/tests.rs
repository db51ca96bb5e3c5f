//! Use case and router tests for the forum crate

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use auth::application::{RegisterInput, RegisterOutput, RegisterUseCase};
    use auth::domain::value_object::account_role::AccountRole;
    use auth::{AccountRepository, AuthConfig, MemoryAccountRepository};

    pub async fn register(
        accounts: &Arc<MemoryAccountRepository>,
        config: &Arc<AuthConfig>,
        handle: &str,
    ) -> RegisterOutput {
        RegisterUseCase::new(accounts.clone(), config.clone())
            .execute(RegisterInput {
                handle: handle.to_string(),
                email: format!("{handle}@example.com"),
                password: "correct-horse-42".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn promote(accounts: &Arc<MemoryAccountRepository>, output: &mut RegisterOutput) {
        let mut account = accounts
            .find_by_id(&output.account.account_id)
            .await
            .unwrap()
            .unwrap();
        account.role = AccountRole::Admin;
        accounts.put(account.clone()).await;
        output.account = account;
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use auth::application::{AuthenticateUseCase, UpdateProfileInput};
    use auth::{AccountRepository, AuthConfig, AuthError, MemoryAccountRepository, Principal};
    use chrono::{Duration, Utc};
    use kernel::id::{AccountId, Id};
    use kernel::pagination::PageRequest;
    use relay::{EngagementState, NotificationRelay, RelationshipAction, RelayEvent};

    use super::support::{promote, register};
    use crate::application::*;
    use crate::domain::engagement::VoteDirection;
    use crate::domain::post::Post;
    use crate::domain::repository::{PostRepository, RelationshipRepository};
    use crate::error::ForumError;
    use crate::infra::memory::MemoryForumRepository;

    struct Fixture {
        accounts: Arc<MemoryAccountRepository>,
        auth_config: Arc<AuthConfig>,
        repo: Arc<MemoryForumRepository>,
        relay: Arc<NotificationRelay>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                accounts: Arc::new(MemoryAccountRepository::new()),
                auth_config: Arc::new(AuthConfig::development()),
                repo: Arc::new(MemoryForumRepository::new()),
                relay: NotificationRelay::new(16),
            }
        }

        async fn principal(&self, handle: &str) -> Principal {
            register(&self.accounts, &self.auth_config, handle)
                .await
                .account
                .principal()
        }

        async fn admin(&self, handle: &str) -> Principal {
            let mut output = register(&self.accounts, &self.auth_config, handle).await;
            promote(&self.accounts, &mut output).await;
            output.account.principal()
        }

        fn follows(&self) -> FollowUseCase<MemoryAccountRepository, MemoryForumRepository> {
            FollowUseCase::new(self.accounts.clone(), self.repo.clone(), self.relay.clone())
        }

        fn engagement(&self) -> EngagementUseCase<MemoryForumRepository> {
            EngagementUseCase::new(self.repo.clone(), self.relay.clone())
        }

        fn posts(&self) -> PostUseCase<MemoryForumRepository> {
            PostUseCase::new(self.repo.clone(), self.relay.clone())
        }

        fn comments(&self) -> CommentUseCase<MemoryForumRepository> {
            CommentUseCase::new(self.repo.clone(), self.relay.clone())
        }

        fn profiles(&self) -> ProfileUseCase<MemoryAccountRepository, MemoryForumRepository> {
            ProfileUseCase::new(self.accounts.clone(), self.repo.clone())
        }

        fn moderation(&self) -> ModerationUseCase<MemoryAccountRepository, MemoryForumRepository> {
            ModerationUseCase::new(self.accounts.clone(), self.repo.clone(), self.relay.clone())
        }

        async fn post(&self, author: &Principal) -> Post {
            self.posts()
                .create(
                    author,
                    CreatePostInput {
                        category_id: Id::new(),
                        title: "Hello".to_string(),
                        content: "First post".to_string(),
                    },
                )
                .await
                .unwrap()
        }
    }

    // ========================================================================
    // Relationship Ledger
    // ========================================================================

    #[tokio::test]
    async fn test_follow_then_unfollow_scenario() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;
        let u2 = fx.principal("user_two").await;

        let pair = fx.follows().follow(&u1, &u2.account_id).await.unwrap();
        assert_eq!(pair.following, HashSet::from([u2.account_id]));
        assert_eq!(pair.followers, HashSet::from([u1.account_id]));

        let pair = fx.follows().unfollow(&u1, &u2.account_id).await.unwrap();
        assert!(pair.following.is_empty());
        assert!(pair.followers.is_empty());

        assert_eq!(fx.repo.follow_sets(&u1.account_id).await.unwrap(), Default::default());
        assert_eq!(fx.repo.follow_sets(&u2.account_id).await.unwrap(), Default::default());
    }

    #[tokio::test]
    async fn test_second_follow_conflicts() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;
        let u2 = fx.principal("user_two").await;

        fx.follows().follow(&u1, &u2.account_id).await.unwrap();
        let err = fx.follows().follow(&u1, &u2.account_id).await.unwrap_err();
        assert!(matches!(err, ForumError::AlreadyFollowing));
        assert_eq!(err.status_code(), 409);

        let err = fx.follows().unfollow(&u2, &u1.account_id).await.unwrap_err();
        assert!(matches!(err, ForumError::NotFollowing));
    }

    #[tokio::test]
    async fn test_self_follow_and_unknown_target() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;

        let err = fx.follows().follow(&u1, &u1.account_id).await.unwrap_err();
        assert!(matches!(err, ForumError::SelfFollow));
        assert_eq!(err.status_code(), 400);

        let stranger: AccountId = Id::new();
        let err = fx.follows().follow(&u1, &stranger).await.unwrap_err();
        assert!(matches!(err, ForumError::AccountNotFound));

        assert!(fx.repo.follow_sets(&u1.account_id).await.unwrap().following.is_empty());
    }

    #[tokio::test]
    async fn test_follow_publishes_event() {
        let fx = Fixture::new();
        let mut sub = fx.relay.subscribe();
        let u1 = fx.principal("user_one").await;
        let u2 = fx.principal("user_two").await;

        fx.follows().follow(&u1, &u2.account_id).await.unwrap();

        assert_eq!(
            sub.try_recv(),
            Some(RelayEvent::RelationshipChanged {
                actor: u1.account_id,
                target: u2.account_id,
                action: RelationshipAction::Follow,
            })
        );

        // failed operations publish nothing
        let _ = fx.follows().follow(&u1, &u2.account_id).await;
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn test_profile_and_follow_lists() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;
        let u2 = fx.principal("user_two").await;
        let u3 = fx.principal("user_three").await;

        fx.follows().follow(&u1, &u3.account_id).await.unwrap();
        fx.follows().follow(&u2, &u3.account_id).await.unwrap();

        let profile = ProfileUseCase::new(fx.accounts.clone(), fx.repo.clone())
            .execute(&u3.account_id)
            .await
            .unwrap();
        assert_eq!((profile.followers, profile.following), (2, 0));

        let followers = FollowListUseCase::new(fx.accounts.clone(), fx.repo.clone())
            .execute(&u3.account_id, FollowDirection::Followers)
            .await
            .unwrap();
        let handles: Vec<&str> = followers.iter().map(|a| a.handle.original()).collect();
        assert_eq!(handles, ["user_one", "user_two"]);
    }

    // ========================================================================
    // Engagement Ledger
    // ========================================================================

    #[tokio::test]
    async fn test_vote_up_then_down_scenario() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;
        let p1 = fx.post(&u1).await;

        let e = fx.engagement().vote(&u1, &p1.post_id, VoteDirection::Up).await.unwrap();
        assert_eq!(e.upvotes(), &HashSet::from([u1.account_id]));
        assert!(e.downvotes().is_empty());

        let e = fx.engagement().vote(&u1, &p1.post_id, VoteDirection::Down).await.unwrap();
        assert!(e.upvotes().is_empty());
        assert_eq!(e.downvotes(), &HashSet::from([u1.account_id]));
    }

    #[tokio::test]
    async fn test_repeat_vote_toggles_off() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;
        let p1 = fx.post(&u1).await;

        fx.engagement().vote(&u1, &p1.post_id, VoteDirection::Up).await.unwrap();
        let e = fx.engagement().vote(&u1, &p1.post_id, VoteDirection::Up).await.unwrap();
        assert!(e.upvotes().is_empty());
        assert_eq!(e.score(), 0);
    }

    #[tokio::test]
    async fn test_like_is_independent_and_publishes_state() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;
        let p1 = fx.post(&u1).await;
        let mut sub = fx.relay.subscribe();

        fx.engagement().vote(&u1, &p1.post_id, VoteDirection::Up).await.unwrap();
        let e = fx.engagement().toggle_like(&u1, &p1.post_id).await.unwrap();
        assert!(e.is_liked_by(&u1.account_id));
        assert_eq!(e.vote_of(&u1.account_id), Some(VoteDirection::Up));

        let states: Vec<EngagementState> = std::iter::from_fn(|| sub.try_recv())
            .filter_map(|event| match event {
                RelayEvent::EngagementChanged { new_state, .. } => Some(new_state),
                _ => None,
            })
            .collect();
        assert_eq!(states, [EngagementState::Up, EngagementState::Liked]);

        let e = fx.engagement().toggle_like(&u1, &p1.post_id).await.unwrap();
        assert!(e.likes().is_empty());
        assert_eq!(e.vote_of(&u1.account_id), Some(VoteDirection::Up));
    }

    #[tokio::test]
    async fn test_vote_on_unknown_post() {
        let fx = Fixture::new();
        let u1 = fx.principal("user_one").await;

        let err = fx
            .engagement()
            .vote(&u1, &Id::new(), VoteDirection::Down)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::PostNotFound));
    }

    // ========================================================================
    // Posts & comments
    // ========================================================================

    #[tokio::test]
    async fn test_only_author_or_admin_deletes_post() {
        let fx = Fixture::new();
        let author = fx.principal("author").await;
        let other = fx.principal("other").await;
        let admin = fx.admin("admin").await;

        let p1 = fx.post(&author).await;
        let err = fx.posts().delete(&other, &p1.post_id).await.unwrap_err();
        assert!(matches!(err, ForumError::NotOwner { target: "post", .. }));
        assert!(fx.repo.find_by_id(&p1.post_id).await.unwrap().is_some());

        fx.posts().delete(&admin, &p1.post_id).await.unwrap();
        let err = fx.posts().get(&p1.post_id).await.unwrap_err();
        assert!(matches!(err, ForumError::PostNotFound));

        let p2 = fx.post(&author).await;
        fx.posts().delete(&author, &p2.post_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let fx = Fixture::new();
        let author = fx.principal("author").await;
        let other = fx.principal("other").await;
        let p1 = fx.post(&author).await;

        let c1 = fx.comments().add(&other, &p1.post_id, "nice").await.unwrap();
        let c2 = fx.comments().add(&author, &p1.post_id, "thanks").await.unwrap();

        let post = fx.posts().get(&p1.post_id).await.unwrap();
        let ids: Vec<_> = post.comments.iter().map(|c| c.comment_id).collect();
        assert_eq!(ids, [c1.comment_id, c2.comment_id]);

        let err = fx
            .comments()
            .delete(&other, &p1.post_id, &c2.comment_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::NotOwner { target: "comment", .. }));

        fx.comments().delete(&other, &p1.post_id, &c1.comment_id).await.unwrap();
        let post = fx.posts().get(&p1.post_id).await.unwrap();
        assert_eq!(post.comments.len(), 1);

        let err = fx
            .comments()
            .delete(&other, &p1.post_id, &c1.comment_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::CommentNotFound));
    }

    #[tokio::test]
    async fn test_create_post_validates() {
        let fx = Fixture::new();
        let author = fx.principal("author").await;

        let err = fx
            .posts()
            .create(
                &author,
                CreatePostInput {
                    category_id: Id::new(),
                    title: "   ".to_string(),
                    content: "body".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    // ========================================================================
    // Moderation Gate
    // ========================================================================

    #[tokio::test]
    async fn test_non_admin_ban_is_forbidden_and_changes_nothing() {
        let fx = Fixture::new();
        let user = fx.principal("regular").await;
        let target = fx.principal("target").await;

        let err = fx
            .moderation()
            .ban(&user, &target.account_id, Some("spam".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::AdminRequired));
        assert_eq!(err.status_code(), 403);

        let stored = fx.accounts.find_by_id(&target.account_id).await.unwrap().unwrap();
        assert!(!stored.ban.is_banned());
    }

    #[tokio::test]
    async fn test_banned_account_is_rejected_by_guard() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;
        let u3 = register(&fx.accounts, &fx.auth_config, "user_three").await;

        let account = fx
            .moderation()
            .ban(&admin, &u3.account.account_id, Some("spam".to_string()), None)
            .await
            .unwrap();
        assert!(account.ban.is_banned());

        let err = AuthenticateUseCase::new(fx.accounts.clone(), fx.auth_config.clone())
            .execute(&u3.token.token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Banned { .. }));
        assert!(err.to_string().contains("spam"));

        fx.moderation().unban(&admin, &u3.account.account_id).await.unwrap();
        fx.moderation().unban(&admin, &u3.account.account_id).await.unwrap();
        AuthenticateUseCase::new(fx.accounts.clone(), fx.auth_config.clone())
            .execute(&u3.token.token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ban_rules() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;
        let target = fx.principal("target").await;

        let err = fx.moderation().ban(&admin, &admin.account_id, None, None).await.unwrap_err();
        assert!(matches!(err, ForumError::SelfBan));

        let past = Utc::now() - Duration::hours(1);
        let err = fx
            .moderation()
            .ban(&admin, &target.account_id, None, Some(past))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = fx.moderation().ban(&admin, &Id::new(), None, None).await.unwrap_err();
        assert!(matches!(err, ForumError::AccountNotFound));

        let until = Utc::now() + Duration::days(7);
        let account = fx
            .moderation()
            .ban(&admin, &target.account_id, None, Some(until))
            .await
            .unwrap();
        assert_eq!(account.ban.expires_at(), Some(until));
    }

    #[tokio::test]
    async fn test_admin_removes_content() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;
        let author = fx.principal("author").await;
        let p1 = fx.post(&author).await;
        let c1 = fx.comments().add(&author, &p1.post_id, "hi").await.unwrap();
        let mut sub = fx.relay.subscribe();

        let err = fx
            .moderation()
            .remove_post(&author, &p1.post_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::AdminRequired));

        fx.moderation()
            .remove_comment(&admin, &p1.post_id, &c1.comment_id)
            .await
            .unwrap();
        fx.moderation().remove_post(&admin, &p1.post_id).await.unwrap();

        assert_eq!(
            sub.try_recv(),
            Some(RelayEvent::CommentRemoved {
                post: p1.post_id,
                comment: c1.comment_id
            })
        );
        assert_eq!(sub.try_recv(), Some(RelayEvent::PostRemoved { post: p1.post_id }));

        let err = fx.moderation().remove_post(&admin, &p1.post_id).await.unwrap_err();
        assert!(matches!(err, ForumError::PostNotFound));
    }

    #[tokio::test]
    async fn test_admin_listings() {
        let fx = Fixture::new();
        let admin = fx.admin("admin").await;
        let author = fx.principal("author").await;
        fx.principal("bystander").await;
        for _ in 0..3 {
            fx.post(&author).await;
        }

        let page = PageRequest::new(Some(1), Some(2), 10, 100);
        let accounts = fx
            .moderation()
            .list_accounts(&admin, Some("AUTH"), page)
            .await
            .unwrap();
        assert_eq!(accounts.pagination.total, 1);

        let posts = fx
            .moderation()
            .list_posts(&admin, Some(author.account_id), page)
            .await
            .unwrap();
        assert_eq!(posts.items.len(), 2);
        assert_eq!(posts.pagination.pages, 2);

        let err = fx
            .moderation()
            .list_accounts(&author, None, page)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::AdminRequired));
    }

    #[tokio::test]
    async fn test_only_author_updates_post() {
        let fx = Fixture::new();
        let author = fx.principal("author").await;
        let other = fx.principal("other").await;
        let admin = fx.admin("admin").await;
        let post = fx.post(&author).await;

        let edit = |title: &str| UpdatePostInput {
            title: title.to_string(),
            content: "Edited body".to_string(),
            category_id: None,
        };

        for intruder in [&other, &admin] {
            let err = fx
                .posts()
                .update(intruder, &post.post_id, edit("Hijacked"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ForumError::NotOwner {
                    action: "update",
                    target: "post"
                }
            ));
        }

        let err = fx
            .posts()
            .update(&author, &post.post_id, edit("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::Validation(_)));

        let updated = fx
            .posts()
            .update(&author, &post.post_id, edit("  Edited  "))
            .await
            .unwrap();
        assert_eq!(updated.title, "Edited");
        assert_eq!(updated.category_id, post.category_id);

        let stored = fx.posts().get(&post.post_id).await.unwrap();
        assert_eq!(stored.title, "Edited");
        assert_eq!(stored.content, "Edited body");

        let err = fx
            .posts()
            .update(&author, &Id::new(), edit("Edited"))
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::PostNotFound));
    }

    #[tokio::test]
    async fn test_list_liked() {
        let fx = Fixture::new();
        let author = fx.principal("author").await;
        let fan = fx.principal("fan").await;
        let liked = fx.post(&author).await;
        fx.post(&author).await;

        fx.engagement()
            .toggle_like(&fan, &liked.post_id)
            .await
            .unwrap();

        let page = PageRequest::new(None, None, 10, 100);
        let posts = fx.posts().list_liked(&fan.account_id, page).await.unwrap();
        assert_eq!(posts.pagination.total, 1);
        assert_eq!(posts.items[0].post_id, liked.post_id);

        // unknown accounts simply have no likes
        let posts = fx.posts().list_liked(&Id::new(), page).await.unwrap();
        assert!(posts.items.is_empty());
    }

    #[tokio::test]
    async fn test_profile_update_by_self_or_admin() {
        let fx = Fixture::new();
        let alice = fx.principal("alice").await;
        let bob = fx.principal("bob_b").await;
        let admin = fx.admin("admin").await;

        let bio = |text: &str| UpdateProfileInput {
            bio: Some(text.to_string()),
            ..Default::default()
        };

        let account = fx
            .profiles()
            .update(&alice, &alice.account_id, bio("hello"))
            .await
            .unwrap();
        assert_eq!(account.bio.as_deref(), Some("hello"));

        let err = fx
            .profiles()
            .update(&bob, &alice.account_id, bio("pwned"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ForumError::NotOwner {
                target: "profile",
                ..
            }
        ));

        fx.profiles()
            .update(&admin, &alice.account_id, bio("moderated"))
            .await
            .unwrap();
        let stored = fx.accounts.find_by_id(&alice.account_id).await.unwrap().unwrap();
        assert_eq!(stored.bio.as_deref(), Some("moderated"));

        let err = fx
            .profiles()
            .update(&admin, &Id::new(), bio("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::AccountNotFound));

        let err = fx
            .profiles()
            .update(
                &alice,
                &alice.account_id,
                UpdateProfileInput {
                    handle: Some("BOB_B".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::Account(AuthError::HandleTaken)));
        assert_eq!(err.status_code(), 409);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use auth::{AuthAppState, AuthConfig, MemoryAccountRepository, auth_router_generic};
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use platform::rate_limit::RateLimitConfig;
    use relay::NotificationRelay;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::{promote, register};
    use crate::application::config::ForumConfig;
    use crate::infra::memory::MemoryForumRepository;
    use crate::presentation::{ForumAppState, forum_router_generic};

    struct TestApp {
        router: axum::Router,
        accounts: Arc<MemoryAccountRepository>,
        auth_config: Arc<AuthConfig>,
    }

    impl TestApp {
        fn new() -> Self {
            Self::with_config(ForumConfig::default())
        }

        fn with_config(config: ForumConfig) -> Self {
            let accounts = Arc::new(MemoryAccountRepository::new());
            let auth_config = Arc::new(AuthConfig::development());
            let auth_state = AuthAppState::new(accounts.clone(), auth_config.clone());
            let state = ForumAppState::new(
                accounts.clone(),
                Arc::new(MemoryForumRepository::new()),
                NotificationRelay::new(16),
                Arc::new(config),
            );

            let router = axum::Router::new()
                .nest("/api/auth", auth_router_generic(auth_state.clone()))
                .nest("/api", forum_router_generic(state, auth_state));

            Self {
                router,
                accounts,
                auth_config,
            }
        }

        /// Register and return (id, token)
        async fn user(&self, handle: &str) -> (String, String) {
            let output = register(&self.accounts, &self.auth_config, handle).await;
            (output.account.account_id.to_string(), output.token.token)
        }

        async fn admin(&self, handle: &str) -> (String, String) {
            let mut output = register(&self.accounts, &self.auth_config, handle).await;
            promote(&self.accounts, &mut output).await;
            (output.account.account_id.to_string(), output.token.token)
        }

        async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
            let (status, _, body) = self.send_with_headers(req).await;
            (status, body)
        }

        async fn send_with_headers(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
            let resp = self.router.clone().oneshot(req).await.unwrap();
            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            (status, headers, serde_json::from_slice(&bytes).unwrap())
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn create_post(app: &TestApp, token: &str) -> String {
        let (status, body) = app
            .send(request(
                "POST",
                "/api/posts",
                Some(token),
                Some(json!({
                    "categoryId": "6f1c1a9e-3a55-4d8e-9b44-0c7d1f1e2a10",
                    "title": "Hello",
                    "content": "World"
                })),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_follow_flow() {
        let app = TestApp::new();
        let (u1, t1) = app.user("user_one").await;
        let (u2, _) = app.user("user_two").await;

        let uri = format!("/api/users/{u2}/follow");
        let (status, body) = app.send(request("POST", &uri, Some(&t1), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["following"], json!([u2]));
        assert_eq!(body["data"]["followers"], json!([u1]));

        let (status, body) = app.send(request("POST", &uri, Some(&t1), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);

        let (_, body) = app
            .send(request("GET", &format!("/api/users/{u2}"), None, None))
            .await;
        assert_eq!(body["data"]["followersCount"], 1);
        assert_eq!(body["data"]["username"], "user_two");
        assert!(body["data"].get("email").is_none());

        let (status, body) = app
            .send(request("POST", &format!("/api/users/{u2}/unfollow"), Some(&t1), None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["following"], json!([]));
        assert_eq!(body["data"]["followers"], json!([]));
    }

    #[tokio::test]
    async fn test_self_follow_and_bad_id() {
        let app = TestApp::new();
        let (u1, t1) = app.user("user_one").await;

        let (status, body) = app
            .send(request("POST", &format!("/api/users/{u1}/follow"), Some(&t1), None))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You cannot follow yourself");

        let (status, body) = app
            .send(request("POST", "/api/users/not-a-uuid/follow", Some(&t1), None))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_anonymous_vote_is_unauthenticated() {
        let app = TestApp::new();
        let (_, t1) = app.user("user_one").await;
        let post_id = create_post(&app, &t1).await;

        let (status, body) = app
            .send(request(
                "PUT",
                &format!("/api/posts/{post_id}/vote"),
                None,
                Some(json!({ "direction": "up" })),
            ))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_vote_and_like_over_http() {
        let app = TestApp::new();
        let (u1, t1) = app.user("user_one").await;
        let post_id = create_post(&app, &t1).await;
        let uri = format!("/api/posts/{post_id}/vote");

        let (_, body) = app
            .send(request("PUT", &uri, Some(&t1), Some(json!({ "direction": "up" }))))
            .await;
        assert_eq!(body["data"]["upvotes"], json!([u1]));
        assert_eq!(body["data"]["downvotes"], json!([]));

        let (_, body) = app
            .send(request("PUT", &uri, Some(&t1), Some(json!({ "voteType": "downvote" }))))
            .await;
        assert_eq!(body["data"]["upvotes"], json!([]));
        assert_eq!(body["data"]["downvotes"], json!([u1]));
        assert_eq!(body["data"]["score"], -1);

        let (status, _) = app
            .send(request("PUT", &uri, Some(&t1), Some(json!({ "direction": "sideways" }))))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app
            .send(request("PUT", &format!("/api/posts/{post_id}/like"), Some(&t1), None))
            .await;
        assert_eq!(body["data"]["likeCount"], 1);
        assert_eq!(body["data"]["downvotes"], json!([u1]));

        let (_, body) = app
            .send(request("GET", &format!("/api/posts/{post_id}"), None, None))
            .await;
        assert_eq!(body["data"]["likes"], json!([u1]));
    }

    #[tokio::test]
    async fn test_banned_user_gets_forbidden_with_reason() {
        let app = TestApp::new();
        let (_, admin_token) = app.admin("admin").await;
        let (u2, _) = app.user("user_two").await;
        let (u3, t3) = app.user("user_three").await;

        let (status, body) = app
            .send(request(
                "PUT",
                &format!("/api/admin/users/{u3}/ban"),
                Some(&admin_token),
                Some(json!({ "isBanned": true, "banReason": "spam" })),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isBanned"], true);
        assert_eq!(body["data"]["banReason"], "spam");

        let (status, body) = app
            .send(request("POST", &format!("/api/users/{u2}/follow"), Some(&t3), None))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["message"].as_str().unwrap().contains("spam"));

        let (status, _) = app
            .send(request(
                "PUT",
                &format!("/api/admin/users/{u3}/ban"),
                Some(&admin_token),
                Some(json!({ "isBanned": false })),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send(request("POST", &format!("/api/users/{u2}/follow"), Some(&t3), None))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_use_admin_routes() {
        let app = TestApp::new();
        let (_, t1) = app.user("user_one").await;
        let (u2, _) = app.user("user_two").await;

        let (status, body) = app
            .send(request(
                "PUT",
                &format!("/api/admin/users/{u2}/ban"),
                Some(&t1),
                Some(json!({ "isBanned": true, "banReason": "spam" })),
            ))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized as an admin");

        let (status, _) = app
            .send(request("GET", "/api/admin/users", Some(&t1), None))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_lists_and_deletes() {
        let app = TestApp::new();
        let (_, admin_token) = app.admin("admin").await;
        let (_, t1) = app.user("user_one").await;
        let post_id = create_post(&app, &t1).await;

        let (status, body) = app
            .send(request("GET", "/api/admin/users?search=user&limit=5", Some(&admin_token), None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["username"], "user_one");

        let (status, body) = app
            .send(request("DELETE", &format!("/api/admin/posts/{post_id}"), Some(&admin_token), None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Post deleted successfully");

        let (status, _) = app
            .send(request("GET", &format!("/api/posts/{post_id}"), None, None))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_comments_over_http() {
        let app = TestApp::new();
        let (_, t1) = app.user("user_one").await;
        let (_, t2) = app.user("user_two").await;
        let post_id = create_post(&app, &t1).await;

        let (status, body) = app
            .send(request(
                "POST",
                &format!("/api/posts/{post_id}/comments"),
                Some(&t2),
                Some(json!({ "text": "first!" })),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let comment_id = body["data"]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/posts/{post_id}/comments/{comment_id}");
        let (status, _) = app.send(request("DELETE", &uri, Some(&t1), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send(request("DELETE", &uri, Some(&t2), None)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app
            .send(request("GET", "/api/posts?limit=5", None, None))
            .await;
        assert_eq!(body["data"][0]["comments"], json!([]));
        assert_eq!(body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_malformed_body_and_query_get_envelope() {
        let app = TestApp::new();
        let (_, t1) = app.user("user_one").await;
        let post_id = create_post(&app, &t1).await;

        let req = Request::builder()
            .method("PUT")
            .uri(format!("/api/posts/{post_id}/vote"))
            .header(header::AUTHORIZATION, format!("Bearer {t1}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = app.send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());

        let (status, body) = app
            .send(request(
                "PUT",
                &format!("/api/posts/{post_id}/vote"),
                Some(&t1),
                Some(json!({ "nope": "up" })),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = app
            .send(request("GET", "/api/posts?page=abc", None, None))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_update_post_over_http() {
        let app = TestApp::new();
        let (_, t1) = app.user("user_one").await;
        let (_, t2) = app.user("user_two").await;
        let post_id = create_post(&app, &t1).await;
        let uri = format!("/api/posts/{post_id}");
        let edit = json!({ "title": "Edited", "content": "New body" });

        let (status, _) = app.send(request("PUT", &uri, None, Some(edit.clone()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .send(request("PUT", &uri, Some(&t2), Some(edit.clone())))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized to update this post");

        let (status, body) = app
            .send(request(
                "PUT",
                &uri,
                Some(&t1),
                Some(json!({ "title": "t".repeat(201), "content": "x" })),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Title must be at most 200 characters");

        let (status, body) = app.send(request("PUT", &uri, Some(&t1), Some(edit))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Edited");

        let (_, body) = app.send(request("GET", &uri, None, None)).await;
        assert_eq!(body["data"]["content"], "New body");
    }

    #[tokio::test]
    async fn test_user_and_liked_listings() {
        let app = TestApp::new();
        let (u1, t1) = app.user("user_one").await;
        let (u2, t2) = app.user("user_two").await;
        let first = create_post(&app, &t1).await;
        create_post(&app, &t1).await;
        create_post(&app, &t2).await;

        let (status, body) = app
            .send(request("GET", &format!("/api/posts/user/{u1}?limit=1"), None, None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = app
            .send(request("PUT", &format!("/api/posts/{first}/like"), Some(&t2), None))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .send(request("GET", &format!("/api/posts/liked/{u2}"), None, None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["id"], first);

        let (_, body) = app
            .send(request("GET", &format!("/api/posts/liked/{u1}"), None, None))
            .await;
        assert_eq!(body["data"], json!([]));

        let (status, _) = app
            .send(request("GET", "/api/posts/liked/not-a-uuid", None, None))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_profile_over_http() {
        let app = TestApp::new();
        let (u1, t1) = app.user("user_one").await;
        let (_, t2) = app.user("user_two").await;
        let (_, admin) = app.admin("moderator").await;
        let uri = format!("/api/users/{u1}");

        let (status, body) = app
            .send(request(
                "PUT",
                &uri,
                Some(&t1),
                Some(json!({ "username": "User_Uno", "bio": "hi" })),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "User_Uno");
        assert_eq!(body["data"]["bio"], "hi");

        let (status, body) = app
            .send(request("PUT", &uri, Some(&t2), Some(json!({ "bio": "pwned" }))))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized to update this profile");

        let (status, _) = app
            .send(request("PUT", &uri, Some(&t1), Some(json!({ "email": "nope" }))))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send(request("PUT", &uri, Some(&admin), Some(json!({ "bio": "" }))))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["bio"], Value::Null);

        let (_, body) = app.send(request("GET", &uri, None, None)).await;
        assert_eq!(body["data"]["username"], "User_Uno");
    }

    #[tokio::test]
    async fn test_create_post_is_rate_limited_per_account() {
        let config = ForumConfig::default()
            .with_rate_limits(RateLimitConfig::default(), RateLimitConfig::new(1, 3600));
        let app = TestApp::with_config(config);
        let (_, t1) = app.user("user_one").await;
        let (_, t2) = app.user("user_two").await;

        create_post(&app, &t1).await;

        let body = json!({
            "categoryId": "6f1c1a9e-3a55-4d8e-9b44-0c7d1f1e2a10",
            "title": "Again",
            "content": "World"
        });
        let (status, headers, resp) = app
            .send_with_headers(request("POST", "/api/posts", Some(&t1), Some(body)))
            .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp["success"], false);
        assert_eq!(resp["message"], "Too many requests, please try again later");
        assert!(headers.contains_key(header::RETRY_AFTER));

        // the budget is per account
        create_post(&app, &t2).await;
    }

    #[tokio::test]
    async fn test_forum_routes_share_one_budget() {
        let config = ForumConfig::default()
            .with_rate_limits(RateLimitConfig::new(2, 60), RateLimitConfig::default());
        let app = TestApp::with_config(config);

        for _ in 0..2 {
            let (status, _) = app.send(request("GET", "/api/posts", None, None)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = app.send(request("GET", "/api/posts", None, None)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["success"], false);
    }
}
