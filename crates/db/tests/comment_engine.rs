//! Integration tests for comment threads and comment votes.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use ideaboard_core::error::CoreError;
use ideaboard_core::identity::{Identity, UNKNOWN_IP};
use ideaboard_core::types::{DbId, Timestamp};
use ideaboard_core::voting::{VoteDirection, VoteOutcome, VotePolicy};
use ideaboard_db::engine::comment_engine::{CommentEngine, CommentVoteRequest};
use ideaboard_db::engine::{EngineError, IdeaSubmission};
use ideaboard_db::models::idea::{CreateIdea, Idea};
use ideaboard_db::repositories::{CommentRepo, FeatureFlagRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session(token: &str) -> Identity {
    Identity::Session(token.to_string())
}

async fn submit(pool: &PgPool, author: &Identity, body: &str) -> Idea {
    let input = CreateIdea {
        body: body.to_string(),
        ..Default::default()
    };
    IdeaSubmission::submit(pool, author, &input).await.unwrap()
}

fn vote(voter: &Identity, comment_id: DbId, ip: &str, at: Timestamp) -> CommentVoteRequest {
    CommentVoteRequest {
        voter: voter.clone(),
        ip_address: ip.to_string(),
        comment_id,
        direction: VoteDirection::Up,
        at,
    }
}

fn core_err(result: Result<impl std::fmt::Debug, EngineError>) -> CoreError {
    match result {
        Err(EngineError::Core(err)) => err,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: Posting and thread shape
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_thread_resolves_one_level_of_replies(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to sketch UI wireframes").await;
    let alice = session("alice");
    let bob = session("bob");

    let first = CommentEngine::post(&pool, &alice, idea.id, None, "Which tool do you use?")
        .await
        .unwrap();
    let second = CommentEngine::post(&pool, &bob, idea.id, None, "Great idea")
        .await
        .unwrap();
    let reply = CommentEngine::reply(&pool, &bob, first.id, "Mostly the free tier")
        .await
        .unwrap();
    let nested = CommentEngine::reply(&pool, &alice, reply.id, "Thanks for sharing")
        .await
        .unwrap();
    assert_eq!(reply.idea_id, idea.id);
    assert_eq!(nested.parent_id, Some(reply.id));

    let thread = CommentEngine::thread(&pool, idea.id, Some(&alice)).await.unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].id, first.id);
    assert_eq!(thread[0].reply_count, 1);
    assert!(thread[0].is_own);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].id, reply.id);
    assert_eq!(thread[0].replies[0].reply_count, 1);
    assert!(thread[0].replies[0].replies.is_empty());
    assert_eq!(thread[1].id, second.id);
    assert!(!thread[1].is_own);
    assert!(thread[1].replies.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_on_missing_idea(pool: PgPool) {
    let result = CommentEngine::post(&pool, &session("alice"), 77, None, "hello there").await;
    assert_matches!(core_err(result), CoreError::NotFound { entity: "idea", id: 77 });

    let result = CommentEngine::reply(&pool, &session("alice"), 88, "hello there").await;
    assert_matches!(core_err(result), CoreError::NotFound { entity: "comment", id: 88 });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_parent_must_belong_to_same_idea(pool: PgPool) {
    let author = session("author");
    let one = submit(&pool, &author, "I use AI to generate quiz questions").await;
    let two = submit(&pool, &author, "I use AI to schedule social posts").await;
    let parent = CommentEngine::post(&pool, &author, one.id, None, "first!")
        .await
        .unwrap();

    let result = CommentEngine::post(&pool, &author, two.id, Some(parent.id), "wrong thread").await;
    assert_matches!(core_err(result), CoreError::Validation(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filtered_comment_is_rejected(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to explain legal jargon").await;
    let result = CommentEngine::post(&pool, &session("spammer"), idea.id, None, "visit my casino").await;
    assert_matches!(core_err(result), CoreError::ContentRejected(_));
    assert!(CommentRepo::list_top_level(&pool, idea.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_commenting_ignores_paywall(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to decode error messages").await;
    FeatureFlagRepo::set_paywall_enabled(&pool, true).await.unwrap();

    CommentEngine::post(&pool, &session("lurker"), idea.id, None, "How accurate is it?")
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test: Comment votes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_comment_vote_is_noop(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to name my side projects").await;
    let comment = CommentEngine::post(&pool, &session("alice"), idea.id, None, "Love this")
        .await
        .unwrap();
    let voter = session("voter");
    let policy = VotePolicy::default();
    let t0 = Utc::now();

    let first = CommentEngine::vote(&pool, &policy, &vote(&voter, comment.id, UNKNOWN_IP, t0))
        .await
        .unwrap();
    assert_eq!(first.vote_count, 1);
    assert_eq!(first.outcome, VoteOutcome::Recorded);

    for i in 0..3 {
        let again = CommentEngine::vote(
            &pool,
            &policy,
            &vote(&voter, comment.id, UNKNOWN_IP, t0 + Duration::milliseconds(100 * i)),
        )
        .await
        .unwrap();
        assert_eq!(again.vote_count, 1);
        assert_eq!(again.outcome, VoteOutcome::Unchanged);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_vote_identity_cooldown(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to summarize podcasts").await;
    let alice = session("alice");
    let one = CommentEngine::post(&pool, &alice, idea.id, None, "first comment").await.unwrap();
    let two = CommentEngine::post(&pool, &alice, idea.id, None, "second comment").await.unwrap();
    let voter = session("voter");
    let policy = VotePolicy::default();
    let t0 = Utc::now();

    CommentEngine::vote(&pool, &policy, &vote(&voter, one.id, UNKNOWN_IP, t0))
        .await
        .unwrap();
    let err = core_err(
        CommentEngine::vote(
            &pool,
            &policy,
            &vote(&voter, two.id, UNKNOWN_IP, t0 + Duration::seconds(1)),
        )
        .await,
    );
    assert_eq!(err.remaining_secs(), Some(1));

    let later = CommentEngine::vote(
        &pool,
        &policy,
        &vote(&voter, two.id, UNKNOWN_IP, t0 + Duration::seconds(2)),
    )
    .await
    .unwrap();
    assert_eq!(later.vote_count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_vote_ip_cooldown(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to reply to reviews").await;
    let comment = CommentEngine::post(&pool, &session("alice"), idea.id, None, "Nice one")
        .await
        .unwrap();
    let policy = VotePolicy::default();
    let t0 = Utc::now();

    CommentEngine::vote(&pool, &policy, &vote(&session("v1"), comment.id, "192.0.2.5", t0))
        .await
        .unwrap();
    let err = core_err(
        CommentEngine::vote(
            &pool,
            &policy,
            &vote(&session("v2"), comment.id, "192.0.2.5", t0 + Duration::milliseconds(500)),
        )
        .await,
    );
    assert_matches!(err, CoreError::RateLimited { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_comment_votes_from_one_ip(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to tag photo albums").await;
    let mut comments = Vec::new();
    for i in 0..5 {
        let comment = CommentEngine::post(&pool, &session("alice"), idea.id, None, &format!("Point {i}"))
            .await
            .unwrap();
        comments.push(comment);
    }
    let policy = VotePolicy::default();
    let at = Utc::now();

    let handles: Vec<_> = comments
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            let pool = pool.clone();
            let policy = policy.clone();
            let req = vote(&session(&format!("v{i}")), comment.id, "192.0.2.77", at);
            tokio::spawn(async move { CommentEngine::vote(&pool, &policy, &req).await })
        })
        .collect();

    let mut accepted = 0;
    for result in futures::future::join_all(handles).await {
        match result.unwrap() {
            Ok(_) => accepted += 1,
            Err(EngineError::Core(CoreError::RateLimited { .. })) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(accepted, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_vote_on_missing_comment(pool: PgPool) {
    let result = CommentEngine::vote(
        &pool,
        &VotePolicy::default(),
        &vote(&session("voter"), 5150, UNKNOWN_IP, Utc::now()),
    )
    .await;
    assert_matches!(core_err(result), CoreError::NotFound { entity: "comment", .. });
}

// ---------------------------------------------------------------------------
// Test: Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_permissions_and_cascade(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to design workout plans").await;
    let alice = session("alice");
    let parent = CommentEngine::post(&pool, &alice, idea.id, None, "Parent comment").await.unwrap();
    let reply = CommentEngine::reply(&pool, &session("bob"), parent.id, "Child reply")
        .await
        .unwrap();

    let stranger = session("mallory");
    let result = CommentEngine::delete(&pool, Some(&stranger), false, parent.id).await;
    assert_matches!(core_err(result), CoreError::Forbidden(_));

    let result = CommentEngine::delete(&pool, None, false, parent.id).await;
    assert_eq!(core_err(result), CoreError::IdentityRequired);

    CommentEngine::delete(&pool, Some(&alice), false, parent.id)
        .await
        .unwrap();
    assert!(CommentRepo::find_by_id(&pool, reply.id).await.unwrap().is_none());

    let result = CommentEngine::delete(&pool, Some(&alice), false, parent.id).await;
    assert_matches!(core_err(result), CoreError::NotFound { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_can_delete_any_comment(pool: PgPool) {
    let idea = submit(&pool, &session("author"), "I use AI to transcribe voice memos").await;
    let comment = CommentEngine::post(&pool, &session("alice"), idea.id, None, "Me too")
        .await
        .unwrap();

    CommentEngine::delete(&pool, None, true, comment.id).await.unwrap();
    assert!(CommentRepo::find_by_id(&pool, comment.id).await.unwrap().is_none());
}
