//! Catalog and deployment history views over already loaded contract data.

use std::{collections::HashMap, str::FromStr};

use derive_more::{Display, Error};
use itertools::Itertools;

use crate::model::{Category, ContractMetadata, DeploymentRecord, ReviewSummary};

/// Catalog sort order.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recently published first.
    #[default]
    #[display(fmt = "newest")]
    Newest,

    /// Most deployed first.
    #[display(fmt = "most-deployed")]
    MostDeployed,

    /// Highest average rating first.
    #[display(fmt = "top-rated")]
    TopRated,
}

/// Unknown sort order name.
#[derive(Debug, Display, Error)]
#[display(fmt = "unknown sort order: {}", _0)]
pub struct UnknownSortOrder(#[error(ignore)] String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "newest" => Ok(SortOrder::Newest),
            "most-deployed" | "popular" => Ok(SortOrder::MostDeployed),
            "top-rated" | "rating" => Ok(SortOrder::TopRated),
            _ => Err(UnknownSortOrder(s.to_owned())),
        }
    }
}

/// Catalog filter and sort options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive term matched against names, descriptions and tags.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Check if a contract matches the search term and the category.
    pub fn matches(&self, contract: &ContractMetadata) -> bool {
        if let Some(category) = self.category {
            if contract.category != category {
                return false;
            }
        }

        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };

        contract.name.to_lowercase().contains(&term)
            || contract.description.to_lowercase().contains(&term)
            || contract
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&term))
    }

    /// Filter and sort the catalog.
    ///
    /// Contracts without a review summary have a zero rating.
    pub fn apply(
        &self,
        contracts: &[ContractMetadata],
        summaries: &HashMap<u32, ReviewSummary>,
    ) -> Vec<ContractMetadata> {
        let rating = |contract: &ContractMetadata| {
            summaries
                .get(&contract.id)
                .map(|summary| summary.average_rating)
                .unwrap_or(0)
        };

        contracts
            .iter()
            .filter(|contract| self.matches(contract))
            .sorted_by(|a, b| match self.sort {
                SortOrder::Newest => b.published_at.cmp(&a.published_at),
                SortOrder::MostDeployed => b.total_deployments.cmp(&a.total_deployments),
                SortOrder::TopRated => rating(b).cmp(&rating(a)),
            })
            .cloned()
            .collect()
    }
}

/// Deployment history statistics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentStats {
    /// Number of deployed instances.
    pub total: usize,

    /// Number of distinct published contracts deployed.
    pub unique_contracts: usize,
}

impl DeploymentStats {
    pub fn of(deployments: &[DeploymentRecord]) -> Self {
        Self {
            total: deployments.len(),
            unique_contracts: deployments
                .iter()
                .map(|deployment| deployment.contract_id)
                .unique()
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{deployment, metadata, summary};

    fn catalog() -> Vec<ContractMetadata> {
        let contracts = [
            (1, "Token", Category::DeFi, 100, 5, vec!["sep-41"]),
            (2, "Collectibles", Category::Nft, 300, 1, vec!["art"]),
            (3, "Treasury", Category::Dao, 200, 9, vec!["token", "voting"]),
        ];

        contracts
            .into_iter()
            .map(|(id, name, category, published_at, deployments, tags)| {
                let mut contract: ContractMetadata =
                    serde_json::from_value(metadata(id, name)).unwrap();
                contract.category = category;
                contract.published_at = published_at;
                contract.total_deployments = deployments;
                contract.tags = tags.into_iter().map(String::from).collect();
                contract
            })
            .collect()
    }

    fn ids(contracts: &[ContractMetadata]) -> Vec<u32> {
        contracts.iter().map(|contract| contract.id).collect()
    }

    #[test]
    fn default_is_newest_first() {
        let result = CatalogQuery::default().apply(&catalog(), &HashMap::new());

        assert_eq!(ids(&result), vec![2, 3, 1]);
    }

    #[test]
    fn search_matches_names_and_tags() {
        let query = CatalogQuery {
            search: Some(String::from("TOKEN")),
            ..Default::default()
        };

        assert_eq!(ids(&query.apply(&catalog(), &HashMap::new())), vec![3, 1]);
    }

    #[test]
    fn category_filter() {
        let query = CatalogQuery {
            category: Some(Category::Nft),
            ..Default::default()
        };

        assert_eq!(ids(&query.apply(&catalog(), &HashMap::new())), vec![2]);
    }

    #[test]
    fn sort_orders() {
        let summaries = HashMap::from([
            (1, serde_json::from_value(summary(1, 2, 450)).unwrap()),
            (2, serde_json::from_value(summary(2, 1, 300)).unwrap()),
        ]);

        let by_deployments = CatalogQuery {
            sort: SortOrder::MostDeployed,
            ..Default::default()
        };
        let by_rating = CatalogQuery {
            sort: SortOrder::TopRated,
            ..Default::default()
        };

        assert_eq!(
            ids(&by_deployments.apply(&catalog(), &summaries)),
            vec![3, 1, 2]
        );
        assert_eq!(ids(&by_rating.apply(&catalog(), &summaries)), vec![1, 2, 3]);
    }

    #[test]
    fn sort_order_names() {
        assert_eq!("top_rated".parse::<SortOrder>().unwrap(), SortOrder::TopRated);
        assert_eq!(
            "Most-Deployed".parse::<SortOrder>().unwrap(),
            SortOrder::MostDeployed
        );
        assert!("cheapest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn stats() {
        let deployments: Vec<DeploymentRecord> = [(1, 3), (2, 3), (3, 4)]
            .into_iter()
            .map(|(id, contract_id)| serde_json::from_value(deployment(id, contract_id)).unwrap())
            .collect();

        assert_eq!(
            DeploymentStats::of(&deployments),
            DeploymentStats {
                total: 3,
                unique_contracts: 2
            }
        );
        assert_eq!(DeploymentStats::of(&[]), DeploymentStats::default());
    }
}
