//! Test harness for database repository testing.
//!
//! Provides an in-memory SQLite pool with real migrations applied, plus
//! fixture helpers for seeding entity and auxiliary rows.

use crate::db::DbPool;

/// Create an in-memory database with migrations applied.
pub async fn create_test_db() -> DbPool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    let db = DbPool::from_sqlite(pool);
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    db
}

/// Row seeding helpers. Ids are fresh v4 UUIDs, returned for the test to use.
pub mod fixtures {
    use chrono::{DateTime, Utc};
    use sqlx::{Row, SqlitePool};
    use uuid::Uuid;

    pub async fn insert_account(pool: &SqlitePool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO accounts (id, email, created_at) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(format!("{id}@example.com"))
            .bind(Utc::now())
            .execute(pool)
            .await
            .expect("Failed to insert account");
        id
    }

    pub async fn insert_profile(pool: &SqlitePool, account_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO profiles (id, account_id, display_name, bio, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(account_id.to_string())
        .bind("Test Profile")
        .bind(Option::<String>::None)
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert profile");
        id
    }

    pub async fn insert_post(pool: &SqlitePool, author_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO posts (id, author_id, title, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(author_id.to_string())
        .bind("Hello world")
        .bind("First post")
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert post");
        id
    }

    pub async fn insert_comment(pool: &SqlitePool, post_id: Uuid, author_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, body, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(post_id.to_string())
        .bind(author_id.to_string())
        .bind("Nice post")
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert comment");
        id
    }

    pub async fn insert_listing(pool: &SqlitePool, seller_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO listings (id, seller_id, title, price_cents, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(seller_id.to_string())
        .bind("Used bicycle")
        .bind(12500_i64)
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert listing");
        id
    }

    pub async fn insert_post_reaction(pool: &SqlitePool, post_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO post_reactions (id, post_id, account_id, emoji, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(post_id.to_string())
        .bind(Uuid::new_v4().to_string())
        .bind("+1")
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert post reaction");
        id
    }

    pub async fn insert_post_tag(pool: &SqlitePool, post_id: Uuid, tag: &str) {
        sqlx::query("INSERT INTO post_tags (post_id, tag) VALUES (?, ?)")
            .bind(post_id.to_string())
            .bind(tag)
            .execute(pool)
            .await
            .expect("Failed to insert post tag");
    }

    pub async fn insert_comment_reaction(pool: &SqlitePool, comment_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO comment_reactions (id, comment_id, account_id, emoji, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(comment_id.to_string())
        .bind(Uuid::new_v4().to_string())
        .bind("heart")
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert comment reaction");
        id
    }

    pub async fn insert_listing_bookmark(pool: &SqlitePool, listing_id: Uuid) {
        sqlx::query(
            "INSERT INTO listing_bookmarks (listing_id, account_id, created_at) \
             VALUES (?, ?, ?)",
        )
        .bind(listing_id.to_string())
        .bind(Uuid::new_v4().to_string())
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert listing bookmark");
    }

    pub async fn insert_listing_image(pool: &SqlitePool, listing_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO listing_images (id, listing_id, url, position) VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(listing_id.to_string())
        .bind("https://img.example.com/1.jpg")
        .bind(0_i64)
        .execute(pool)
        .await
        .expect("Failed to insert listing image");
        id
    }

    pub async fn insert_profile_follow(pool: &SqlitePool, follower_id: Uuid, followee_id: Uuid) {
        sqlx::query(
            "INSERT INTO profile_follows (follower_id, followee_id, created_at) \
             VALUES (?, ?, ?)",
        )
        .bind(follower_id.to_string())
        .bind(followee_id.to_string())
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to insert profile follow");
    }

    pub async fn insert_session(pool: &SqlitePool, account_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO sessions (id, account_id, token_hash, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(account_id.to_string())
        .bind("deadbeef")
        .bind(Utc::now())
        .bind(Utc::now() + chrono::Duration::days(7))
        .execute(pool)
        .await
        .expect("Failed to insert session");
        id
    }

    /// Raw audit row with a chosen timestamp, for retention tests.
    pub async fn insert_audit_entry_backdated(
        pool: &SqlitePool,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO audit_logs (id, action, metadata, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind("soft_delete")
        .bind("{}")
        .bind(created_at)
        .execute(pool)
        .await
        .expect("Failed to insert audit entry");
        id
    }

    /// COUNT(*) of rows in `table` whose `column` equals `id`. Table and
    /// column names come from test code only.
    pub async fn count_rows(pool: &SqlitePool, table: &str, column: &str, id: Uuid) -> i64 {
        let sql = format!("SELECT COUNT(*) AS count FROM {table} WHERE {column} = ?");
        sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_one(pool)
            .await
            .expect("Failed to count rows")
            .get("count")
    }
}
