//! Gate and reward state for either kind of identity.
//!
//! Sessions live in `user_sessions` keyed by their token, accounts in
//! `accounts` keyed by the token subject. Both rows are created lazily on
//! first use.

use ideaboard_core::identity::Identity;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::{PgExecutor, Postgres};

use crate::models::participant::ParticipantRow;

const STATE_COLUMNS: &str = "has_submitted, shared_link_bypass, upvotes_given";

/// Table and key column backing an identity.
fn target(identity: &Identity) -> (&'static str, &'static str) {
    match identity {
        Identity::User(_) => ("accounts", "id"),
        Identity::Session(_) => ("user_sessions", "session_id"),
    }
}

fn bind_key_as<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    identity: &'q Identity,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match identity {
        Identity::User(id) => query.bind(*id),
        Identity::Session(token) => query.bind(token.as_str()),
    }
}

fn bind_key<'q>(
    query: Query<'q, Postgres, PgArguments>,
    identity: &'q Identity,
) -> Query<'q, Postgres, PgArguments> {
    match identity {
        Identity::User(id) => query.bind(*id),
        Identity::Session(token) => query.bind(token.as_str()),
    }
}

pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Upsert the participant row and touch its activity timestamp.
    ///
    /// Inside a transaction the upsert leaves the row locked until commit,
    /// which serializes every vote cast by the same identity.
    pub async fn ensure<'e, E: PgExecutor<'e>>(
        executor: E,
        identity: &Identity,
    ) -> Result<ParticipantRow, sqlx::Error> {
        let (table, key) = target(identity);
        let query = format!(
            "INSERT INTO {table} ({key}) VALUES ($1) \
             ON CONFLICT ({key}) DO UPDATE SET last_activity_at = NOW() \
             RETURNING {STATE_COLUMNS}"
        );
        bind_key_as(sqlx::query_as::<_, ParticipantRow>(&query), identity)
            .fetch_one(executor)
            .await
    }

    /// Read the participant state without creating a row.
    pub async fn find<'e, E: PgExecutor<'e>>(
        executor: E,
        identity: &Identity,
    ) -> Result<Option<ParticipantRow>, sqlx::Error> {
        let (table, key) = target(identity);
        let query = format!("SELECT {STATE_COLUMNS} FROM {table} WHERE {key} = $1");
        bind_key_as(sqlx::query_as::<_, ParticipantRow>(&query), identity)
            .fetch_optional(executor)
            .await
    }

    /// Record that the identity has submitted an idea. Idempotent.
    pub async fn mark_submitted<'e, E: PgExecutor<'e>>(
        executor: E,
        identity: &Identity,
    ) -> Result<(), sqlx::Error> {
        let (table, key) = target(identity);
        let query = format!(
            "INSERT INTO {table} ({key}, has_submitted) VALUES ($1, TRUE) \
             ON CONFLICT ({key}) DO UPDATE SET has_submitted = TRUE, last_activity_at = NOW()"
        );
        bind_key(sqlx::query(&query), identity)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Persist the shared-link bypass so later feed reads stay unlocked.
    pub async fn grant_shared_link_bypass<'e, E: PgExecutor<'e>>(
        executor: E,
        identity: &Identity,
    ) -> Result<ParticipantRow, sqlx::Error> {
        let (table, key) = target(identity);
        let query = format!(
            "INSERT INTO {table} ({key}, shared_link_bypass) VALUES ($1, TRUE) \
             ON CONFLICT ({key}) DO UPDATE SET shared_link_bypass = TRUE, last_activity_at = NOW() \
             RETURNING {STATE_COLUMNS}"
        );
        bind_key_as(sqlx::query_as::<_, ParticipantRow>(&query), identity)
            .fetch_one(executor)
            .await
    }

    /// Bump the given-upvotes counter and return its new value.
    ///
    /// The row must already exist (see [`ParticipantRepo::ensure`]).
    pub async fn increment_upvotes_given<'e, E: PgExecutor<'e>>(
        executor: E,
        identity: &Identity,
    ) -> Result<i32, sqlx::Error> {
        let (table, key) = target(identity);
        let query = format!(
            "UPDATE {table} SET upvotes_given = upvotes_given + 1 \
             WHERE {key} = $1 RETURNING upvotes_given"
        );
        bind_key_as(sqlx::query_as::<_, (i32,)>(&query), identity)
            .fetch_one(executor)
            .await
            .map(|(count,)| count)
    }
}
