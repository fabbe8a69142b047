use std::collections::HashMap;

use common::strkey::{self, AddressKind};
use futures_util::future::join_all;
use tracing::{info, warn};

use super::{ClientError, ContractClient};
use crate::{
    bindings::Arg,
    model::{Review, ReviewSummary},
    transaction::TransactionPipeline,
    validation::validate_review,
};

/// Review system client.
pub struct ReviewSystemClient<'a> {
    pub(crate) inner: ContractClient<'a>,
}

impl ReviewSystemClient<'_> {
    /// Review system contract address.
    pub fn address(&self) -> &str {
        self.inner.address()
    }

    /// Submit a review on behalf of the connected account. Returns the new review id.
    pub async fn submit_review(
        &self,
        pipeline: &TransactionPipeline<'_>,
        contract_id: u32,
        rating: u32,
        comment: &str,
    ) -> Result<u32, ClientError> {
        let comment = validate_review(rating, comment)?;
        let reviewer = pipeline.source()?;

        let call = self
            .inner
            .call("submit_review")
            .arg(contract_id)
            .arg(Arg::Address(reviewer))
            .arg(rating)
            .arg(Arg::String(comment.to_owned()));

        let review_id = self.inner.write(pipeline, call).await?;

        info!(review_id, contract_id, rating, "review submitted");

        Ok(review_id)
    }

    /// Upvote a review on behalf of the provided voter.
    pub async fn upvote_review(
        &self,
        pipeline: &TransactionPipeline<'_>,
        review_id: u32,
        voter: &str,
    ) -> Result<(), ClientError> {
        strkey::validate(AddressKind::Account, voter).map_err(ClientError::InvalidAddress)?;

        let call = self
            .inner
            .call("upvote_review")
            .arg(review_id)
            .arg(Arg::Address(voter.to_owned()));

        self.inner.write(pipeline, call).await
    }

    pub async fn get_review(&self, review_id: u32) -> Result<Review, ClientError> {
        self.inner
            .read(self.inner.call("get_review").arg(review_id))
            .await
    }

    pub async fn get_reviews_for_contract(
        &self,
        contract_id: u32,
    ) -> Result<Vec<Review>, ClientError> {
        self.inner
            .read(self.inner.call("get_reviews_for_contract").arg(contract_id))
            .await
    }

    pub async fn get_reviews_by_user(&self, reviewer: &str) -> Result<Vec<Review>, ClientError> {
        self.inner
            .read(
                self.inner
                    .call("get_reviews_by_user")
                    .arg(Arg::Address(reviewer.to_owned())),
            )
            .await
    }

    pub async fn get_review_summary(&self, contract_id: u32) -> Result<ReviewSummary, ClientError> {
        self.inner
            .read(self.inner.call("get_review_summary").arg(contract_id))
            .await
    }

    /// Total number of submitted reviews.
    pub async fn get_review_count(&self) -> Result<u32, ClientError> {
        self.inner.read(self.inner.call("get_review_count")).await
    }

    /// Load review summaries of multiple contracts concurrently.
    ///
    /// Summaries that fail to load are logged and left out of the result.
    pub async fn load_review_summaries(
        &self,
        contract_ids: impl IntoIterator<Item = u32>,
    ) -> HashMap<u32, ReviewSummary> {
        let requests = contract_ids.into_iter().map(|contract_id| async move {
            (contract_id, self.get_review_summary(contract_id).await)
        });

        join_all(requests)
            .await
            .into_iter()
            .filter_map(|(contract_id, result)| match result {
                Ok(summary) => Some((contract_id, summary)),
                Err(error) => {
                    warn!(contract_id, %error, "unable to load review summary");
                    None
                }
            })
            .collect()
    }
}
