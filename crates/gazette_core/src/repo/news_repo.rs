//! News and comment repository contracts and SQLite implementation.
//!
//! # Invariants
//! - News lists are sorted by `date DESC, id ASC`.
//! - Comment lists are sorted by `created_at ASC, id ASC`.
//! - Comment mutations are scoped by `author_id`; zero affected rows is
//!   reported as `NotFound` whether the row is missing or foreign.

use crate::model::news::{Comment, CommentId, NewComment, NewNews, News, NewsId};
use crate::model::require_text;
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const NEWS_SELECT_SQL: &str = "SELECT id, title, text, date FROM news";
const COMMENT_SELECT_SQL: &str = "SELECT
    c.id,
    c.news_id,
    c.author_id,
    u.username AS author_username,
    c.text,
    c.created_at
FROM comments c
INNER JOIN users u ON u.id = c.author_id";

/// Window over the date-ordered news list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsListQuery {
    pub limit: u32,
    pub offset: u32,
}

/// Repository interface for news items and their comments.
pub trait NewsRepository {
    fn create_news(&self, news: &NewNews) -> RepoResult<News>;
    fn get_news(&self, id: NewsId) -> RepoResult<Option<News>>;
    fn list_news(&self, query: &NewsListQuery) -> RepoResult<Vec<News>>;
    fn count_news(&self) -> RepoResult<u64>;

    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Looks up a comment only if `author_id` wrote it.
    fn get_comment_for_author(
        &self,
        id: CommentId,
        author_id: UserId,
    ) -> RepoResult<Option<Comment>>;
    fn list_comments(&self, news_id: NewsId) -> RepoResult<Vec<Comment>>;
    fn update_comment_text(&self, id: CommentId, author_id: UserId, text: &str)
        -> RepoResult<()>;
    fn delete_comment(&self, id: CommentId, author_id: UserId) -> RepoResult<()>;
    fn count_comments(&self) -> RepoResult<u64>;
}

/// SQLite-backed news/comment repository.
pub struct SqliteNewsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNewsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NewsRepository for SqliteNewsRepository<'_> {
    fn create_news(&self, news: &NewNews) -> RepoResult<News> {
        news.validate()?;

        self.conn.execute(
            "INSERT INTO news (title, text, date) VALUES (?1, ?2, ?3);",
            params![news.title.as_str(), news.text.as_str(), news.date],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_news(id)?
            .ok_or_else(|| RepoError::not_found("news", id))
    }

    fn get_news(&self, id: NewsId) -> RepoResult<Option<News>> {
        let news = self
            .conn
            .query_row(
                &format!("{NEWS_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_news_row,
            )
            .optional()?;
        Ok(news)
    }

    fn list_news(&self, query: &NewsListQuery) -> RepoResult<Vec<News>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NEWS_SELECT_SQL} ORDER BY date DESC, id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let rows = stmt.query_map(
            params![i64::from(query.limit), i64::from(query.offset)],
            parse_news_row,
        )?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn count_news(&self) -> RepoResult<u64> {
        count_rows(self.conn, "news")
    }

    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment> {
        comment.validate()?;

        self.conn.execute(
            "INSERT INTO comments (news_id, author_id, text, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                comment.news_id,
                comment.author_id,
                comment.text.as_str(),
                comment.created_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_comment(id)?
            .ok_or_else(|| RepoError::not_found("comment", id))
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let comment = self
            .conn
            .query_row(
                &format!("{COMMENT_SELECT_SQL} WHERE c.id = ?1;"),
                [id],
                parse_comment_row,
            )
            .optional()?;
        Ok(comment)
    }

    fn get_comment_for_author(
        &self,
        id: CommentId,
        author_id: UserId,
    ) -> RepoResult<Option<Comment>> {
        let comment = self
            .conn
            .query_row(
                &format!("{COMMENT_SELECT_SQL} WHERE c.id = ?1 AND c.author_id = ?2;"),
                params![id, author_id],
                parse_comment_row,
            )
            .optional()?;
        Ok(comment)
    }

    fn list_comments(&self, news_id: NewsId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE c.news_id = ?1
             ORDER BY c.created_at ASC, c.id ASC;"
        ))?;
        let rows = stmt.query_map([news_id], parse_comment_row)?;

        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    fn update_comment_text(
        &self,
        id: CommentId,
        author_id: UserId,
        text: &str,
    ) -> RepoResult<()> {
        require_text("text", text)?;

        let changed = self.conn.execute(
            "UPDATE comments SET text = ?3 WHERE id = ?1 AND author_id = ?2;",
            params![id, author_id, text],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("comment", id));
        }
        Ok(())
    }

    fn delete_comment(&self, id: CommentId, author_id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM comments WHERE id = ?1 AND author_id = ?2;",
            params![id, author_id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("comment", id));
        }
        Ok(())
    }

    fn count_comments(&self) -> RepoResult<u64> {
        count_rows(self.conn, "comments")
    }
}

fn parse_news_row(row: &Row<'_>) -> rusqlite::Result<News> {
    Ok(News {
        id: row.get("id")?,
        title: row.get("title")?,
        text: row.get("text")?,
        date: row.get("date")?,
    })
}

fn parse_comment_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        news_id: row.get("news_id")?,
        author_id: row.get("author_id")?,
        author_username: row.get("author_username")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn count_rows(conn: &Connection, table: &'static str) -> RepoResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count in {table}")))
}
