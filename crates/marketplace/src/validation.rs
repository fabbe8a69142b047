//! Client-side input checks, performed before any network call.
//!
//! Lengths are counted in bytes, the same way the contracts count them.

use derive_more::{Display, Error};

use crate::model::{MetadataUpdate, PublishParams};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_TAGS: usize = 10;
pub const MAX_COMMENT_LEN: usize = 500;

/// Input validation errors.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[display(fmt = "contract name must be between 1 and {} characters", MAX_NAME_LEN)]
    InvalidName,

    #[display(
        fmt = "description must be between 1 and {} characters",
        MAX_DESCRIPTION_LEN
    )]
    InvalidDescription,

    #[display(fmt = "source URL is required")]
    MissingSourceUrl,

    #[display(fmt = "at most {} tags are allowed, got {}", MAX_TAGS, _0)]
    TooManyTags(#[error(ignore)] usize),

    #[display(fmt = "rating must be between 1 and 5, got {}", _0)]
    InvalidRating(#[error(ignore)] u32),

    #[display(fmt = "review comment is empty")]
    EmptyComment,

    #[display(
        fmt = "review comment must be {} characters or less",
        MAX_COMMENT_LEN
    )]
    CommentTooLong,
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.is_empty() || description.len() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::InvalidDescription);
    }

    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags(tags.len()));
    }

    Ok(())
}

/// Validate new contract parameters.
pub fn validate_publish(params: &PublishParams) -> Result<(), ValidationError> {
    if params.name.is_empty() || params.name.len() > MAX_NAME_LEN {
        return Err(ValidationError::InvalidName);
    }

    validate_description(&params.description)?;

    if params.source_url.is_empty() {
        return Err(ValidationError::MissingSourceUrl);
    }

    validate_tags(&params.tags)
}

/// Validate metadata update, checking only the supplied fields.
pub fn validate_update(update: &MetadataUpdate) -> Result<(), ValidationError> {
    if let Some(description) = &update.description {
        validate_description(description)?;
    }

    if let Some(tags) = &update.tags {
        validate_tags(tags)?;
    }

    Ok(())
}

/// Validate a review, returning the trimmed comment.
pub fn validate_review(rating: u32, comment: &str) -> Result<&str, ValidationError> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::InvalidRating(rating));
    }

    let comment = comment.trim();

    if comment.is_empty() {
        return Err(ValidationError::EmptyComment);
    }

    if comment.len() > MAX_COMMENT_LEN {
        return Err(ValidationError::CommentTooLong);
    }

    Ok(comment)
}
