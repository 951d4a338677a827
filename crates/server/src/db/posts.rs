//! Post repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use academy_core::{PostId, PostStatus, PostType, Slug, UserId};

use super::RepositoryError;
use crate::models::{Post, PostInput, PostFilter};

/// Columns selected for every post query; `p` is the post, `u` the author.
const POST_SELECT: &str = "SELECT p.id, p.title, p.slug, p.content, p.excerpt, p.cover_image,
        p.post_type, p.status, p.published_at, p.author_id, u.name AS author_name,
        p.views, p.created_at, p.updated_at
    FROM academy.post p
    LEFT JOIN academy.user u ON u.id = p.author_id";

/// Internal row type for post queries.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i32,
    title: String,
    slug: String,
    content: String,
    excerpt: Option<String>,
    cover_image: Option<String>,
    post_type: PostType,
    status: PostStatus,
    published_at: Option<DateTime<Utc>>,
    author_id: Option<i32>,
    author_name: Option<String>,
    views: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = RepositoryError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid post slug: {e}")))?;

        Ok(Self {
            id: PostId::new(row.id),
            title: row.title,
            slug,
            content: row.content,
            excerpt: row.excerpt,
            cover_image: row.cover_image,
            post_type: row.post_type,
            status: row.status,
            published_at: row.published_at,
            author_id: row.author_id.map(UserId::new),
            author_name: row.author_name,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for post database operations.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List posts matching a filter.
    ///
    /// Published posts sort by publication date, drafts by creation date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY COALESCE(p.published_at, p.created_at) DESC, p.id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let rows = qb.build_query_as::<PostRow>().fetch_all(self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count posts matching a filter, ignoring pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &PostFilter) -> Result<i64, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM academy.post p");
        push_filter(&mut qb, filter);

        let (count,): (i64,) = qb.build_query_as().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.slug = $1"))
            .bind(slug.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a post. `published_at` is stamped when created as published.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(
        &self,
        input: &PostInput,
        slug: &Slug,
        author_id: Option<UserId>,
    ) -> Result<Post, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO academy.post
                (title, slug, content, excerpt, cover_image, post_type, status, published_at, author_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     CASE WHEN $7 = 'published'::academy.post_status THEN NOW() END, $8)
             RETURNING id",
        )
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&input.cover_image)
        .bind(input.post_type)
        .bind(input.status)
        .bind(author_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        self.get_by_id(PostId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace the content fields of a post. `status` is written only when
    /// given; `None` keeps whatever is stored.
    ///
    /// The first transition to published stamps `published_at`; later
    /// updates keep the original date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: PostId,
        input: &PostInput,
        slug: &Slug,
        status: Option<PostStatus>,
    ) -> Result<Post, RepositoryError> {
        let result = sqlx::query(
            "UPDATE academy.post SET
                title = $2, slug = $3, content = $4, excerpt = $5, cover_image = $6,
                post_type = $7, status = COALESCE($8, status),
                published_at = CASE
                    WHEN COALESCE($8, status) = 'published'::academy.post_status
                        THEN COALESCE(published_at, NOW())
                    ELSE published_at
                END
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&input.cover_image)
        .bind(input.post_type)
        .bind(status)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Set a post's status, stamping `published_at` on first publication.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    pub async fn set_status(
        &self,
        id: PostId,
        status: PostStatus,
    ) -> Result<Post, RepositoryError> {
        let result = sqlx::query(
            "UPDATE academy.post SET
                status = $2,
                published_at = CASE
                    WHEN $2 = 'published'::academy.post_status THEN COALESCE(published_at, NOW())
                    ELSE published_at
                END
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Bump the view counter of a post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn increment_views(&self, id: PostId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE academy.post SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    pub async fn delete(&self, id: PostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM academy.post WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Append the `WHERE` clause for a post filter.
fn push_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q PostFilter) {
    qb.push(" WHERE TRUE");
    if let Some(post_type) = filter.post_type {
        qb.push(" AND p.post_type = ").push_bind(post_type);
    }
    if let Some(status) = filter.status {
        qb.push(" AND p.status = ").push_bind(status);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.excerpt ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
