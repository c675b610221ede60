//! News use-case service: home page, detail page and comment lifecycle.
//!
//! # Invariants
//! - The home page shows at most `per_page` items, newest date first.
//! - Detail comments are oldest first.
//! - Only a comment's author can load it for editing, edit it or delete it.

use crate::form::comment_form::CommentForm;
use crate::form::FormErrors;
use crate::model::news::{Comment, CommentId, NewComment, NewNews, News, NewsId};
use crate::model::user::UserId;
use crate::repo::news_repo::{NewsListQuery, NewsRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default number of news items on the home page.
pub const NEWS_COUNT_ON_HOME_PAGE: u32 = 10;

#[derive(Debug)]
pub enum NewsServiceError {
    NewsNotFound(NewsId),
    /// Missing, or written by someone other than the requester.
    CommentNotFound(CommentId),
    /// Submitted comment failed validation.
    Invalid(FormErrors),
    Repo(RepoError),
}

impl Display for NewsServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewsNotFound(id) => write!(f, "news not found: {id}"),
            Self::CommentNotFound(id) => write!(f, "comment not found: {id}"),
            Self::Invalid(_) => write!(f, "comment form is invalid"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NewsServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NewsServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One page of the news list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePage {
    /// Sorted by `date DESC, id ASC`.
    pub object_list: Vec<News>,
    /// 1-based page number actually served.
    pub page: u32,
    pub per_page: u32,
    pub has_next: bool,
}

/// Context of the news detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsDetail {
    pub news: News,
    /// Sorted by `created_at ASC, id ASC`.
    pub comments: Vec<Comment>,
    /// The comment form is offered to authenticated viewers only.
    pub form_enabled: bool,
}

/// News service facade over repository implementations.
pub struct NewsService<R: NewsRepository> {
    repo: R,
    per_page: u32,
}

impl<R: NewsRepository> NewsService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_page_size(repo, NEWS_COUNT_ON_HOME_PAGE)
    }

    /// Page size is floored at 1.
    pub fn with_page_size(repo: R, per_page: u32) -> Self {
        Self {
            repo,
            per_page: per_page.max(1),
        }
    }

    /// Adds a news item. There is no public form for this; seeding and the
    /// CLI use it.
    pub fn publish(&self, news: &NewNews) -> Result<News, NewsServiceError> {
        let created = self.repo.create_news(news)?;
        info!(
            "event=news_publish module=news status=ok news_id={} date={}",
            created.id, created.date
        );
        Ok(created)
    }

    /// Serves page `page` (1-based; `None` or 0 means the first page).
    pub fn home_page(&self, page: Option<u32>) -> Result<HomePage, NewsServiceError> {
        let page = page.filter(|value| *value > 0).unwrap_or(1);
        let offset = (page - 1).saturating_mul(self.per_page);
        let object_list = self.repo.list_news(&NewsListQuery {
            limit: self.per_page,
            offset,
        })?;
        let total = self.repo.count_news()?;
        let shown = u64::from(offset) + object_list.len() as u64;

        Ok(HomePage {
            object_list,
            page,
            per_page: self.per_page,
            has_next: total > shown,
        })
    }

    pub fn detail(
        &self,
        news_id: NewsId,
        viewer: Option<UserId>,
    ) -> Result<NewsDetail, NewsServiceError> {
        let news = self.require_news(news_id)?;
        let comments = self.repo.list_comments(news_id)?;
        Ok(NewsDetail {
            news,
            comments,
            form_enabled: viewer.is_some(),
        })
    }

    pub fn add_comment(
        &self,
        news_id: NewsId,
        author_id: UserId,
        form: &CommentForm,
    ) -> Result<Comment, NewsServiceError> {
        self.require_news(news_id)?;
        let text = self.clean(news_id, form)?;

        let comment = self
            .repo
            .create_comment(&NewComment::new(news_id, author_id, text))?;
        info!(
            "event=comment_create module=news status=ok news_id={} comment_id={} author_id={}",
            news_id, comment.id, author_id
        );
        Ok(comment)
    }

    /// Loads a comment for its author's edit/delete pages.
    pub fn comment_for_author(
        &self,
        comment_id: CommentId,
        author_id: UserId,
    ) -> Result<Comment, NewsServiceError> {
        self.repo
            .get_comment_for_author(comment_id, author_id)?
            .ok_or(NewsServiceError::CommentNotFound(comment_id))
    }

    pub fn edit_comment(
        &self,
        comment_id: CommentId,
        author_id: UserId,
        form: &CommentForm,
    ) -> Result<Comment, NewsServiceError> {
        let existing = self.comment_for_author(comment_id, author_id)?;
        let text = self.clean(existing.news_id, form)?;

        self.repo
            .update_comment_text(comment_id, author_id, &text)
            .map_err(|err| scoped_not_found(err, comment_id))?;
        info!(
            "event=comment_edit module=news status=ok news_id={} comment_id={}",
            existing.news_id, comment_id
        );
        self.comment_for_author(comment_id, author_id)
    }

    /// Deletes the comment and returns the news item it belonged to.
    pub fn delete_comment(
        &self,
        comment_id: CommentId,
        author_id: UserId,
    ) -> Result<NewsId, NewsServiceError> {
        let existing = self.comment_for_author(comment_id, author_id)?;
        self.repo
            .delete_comment(comment_id, author_id)
            .map_err(|err| scoped_not_found(err, comment_id))?;
        info!(
            "event=comment_delete module=news status=ok news_id={} comment_id={}",
            existing.news_id, comment_id
        );
        Ok(existing.news_id)
    }

    pub fn count_comments(&self) -> RepoResult<u64> {
        self.repo.count_comments()
    }

    fn require_news(&self, news_id: NewsId) -> Result<News, NewsServiceError> {
        self.repo
            .get_news(news_id)?
            .ok_or(NewsServiceError::NewsNotFound(news_id))
    }

    fn clean(&self, news_id: NewsId, form: &CommentForm) -> Result<String, NewsServiceError> {
        form.clean().map_err(|errors| {
            info!(
                "event=comment_validate module=news status=rejected news_id={} error_count={}",
                news_id,
                errors.field("text").len()
            );
            NewsServiceError::Invalid(errors)
        })
    }
}

fn scoped_not_found(err: RepoError, comment_id: CommentId) -> NewsServiceError {
    match err {
        RepoError::NotFound { .. } => NewsServiceError::CommentNotFound(comment_id),
        other => NewsServiceError::Repo(other),
    }
}
