//! Marketplace entities, as returned by the registry, deployment manager and review system contracts.
//!
//! Contract bindings render 32-byte values either as hex strings or as arrays of bytes, and
//! `u64` values either as JSON numbers or as decimal strings. Both shapes are accepted here.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use derive_more::{Display, Error, From};
use rand::{thread_rng, Rng};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Errors that may occur while parsing a 32-byte hex value.
#[derive(Debug, Display, From, Error, PartialEq)]
pub enum Bytes32ParseError {
    /// Value is not valid hex of the expected length.
    #[display(fmt = "expected 64 hex characters: {}", _0)]
    Hex(hex::FromHexError),
}

/// Serialization representation of a 32-byte value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Bytes32Repr {
    Hex(String),
    Bytes(Vec<u8>),
}

fn parse_bytes32(value: &str) -> Result<[u8; 32], Bytes32ParseError> {
    let mut buf = [0; 32];
    hex::decode_to_slice(value.trim().trim_start_matches("0x"), &mut buf)?;
    Ok(buf)
}

fn deserialize_bytes32<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
where
    D: Deserializer<'de>,
{
    match Bytes32Repr::deserialize(deserializer)? {
        Bytes32Repr::Hex(value) => parse_bytes32(&value).map_err(de::Error::custom),
        Bytes32Repr::Bytes(bytes) => {
            let len = bytes.len();
            bytes
                .try_into()
                .map_err(|_| de::Error::invalid_length(len, &"32 bytes"))
        }
    }
}

macro_rules! bytes32 {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Raw byte value.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = Bytes32ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_bytes32(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_bytes32(deserializer).map(Self)
            }
        }
    };
}

bytes32!(
    /// SHA-256 hash of a WASM blob, which identifies installed contract code.
    WasmHash
);

bytes32!(
    /// Salt used to derive the address of a deployed contract instance.
    Salt
);

impl WasmHash {
    /// Compute hash of the provided WASM blob.
    pub fn of(wasm: &[u8]) -> Self {
        Self(common::hash::sha256(wasm))
    }
}

impl Salt {
    /// Generate new random salt.
    pub fn random() -> Self {
        Self(thread_rng().gen())
    }
}

/// Deserialize `u64` from either a JSON number or a decimal string.
fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        String(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(value) => Ok(value),
        Repr::String(value) => value.parse().map_err(de::Error::custom),
    }
}

/// Contract category.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum Category {
    DeFi,
    #[display(fmt = "NFT")]
    Nft,
    #[display(fmt = "DAO")]
    Dao,
    Gaming,
    #[default]
    Utility,
    Oracle,
    Other,
}

/// Unknown category name or index.
#[derive(Debug, Display, Error, PartialEq, Eq)]
#[display(fmt = "unknown category: {}", _0)]
pub struct UnknownCategory(#[error(ignore)] pub String);

impl Category {
    /// All categories, ordered by their on-chain index.
    pub const ALL: [Category; 7] = [
        Category::DeFi,
        Category::Nft,
        Category::Dao,
        Category::Gaming,
        Category::Utility,
        Category::Oracle,
        Category::Other,
    ];

    /// On-chain index of the category.
    pub fn index(self) -> u32 {
        match self {
            Category::DeFi => 0,
            Category::Nft => 1,
            Category::Dao => 2,
            Category::Gaming => 3,
            Category::Utility => 4,
            Category::Oracle => 5,
            Category::Other => 6,
        }
    }

    /// Get category by its on-chain index.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<u32>() {
            return Self::from_index(index).ok_or_else(|| UnknownCategory(s.to_owned()));
        }

        Self::ALL
            .into_iter()
            .find(|category| category.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(u32),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(index) => Category::from_index(index)
                .ok_or_else(|| de::Error::custom(UnknownCategory(index.to_string()))),
            Repr::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// Published contract information stored in the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractMetadata {
    pub id: u32,
    pub wasm_hash: WasmHash,
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source_url: String,
    #[serde(default)]
    pub documentation_url: String,
    pub license: String,
    #[serde(deserialize_with = "deserialize_u64")]
    pub published_at: u64,
    #[serde(deserialize_with = "deserialize_u64")]
    pub updated_at: u64,
    pub total_deployments: u32,
    pub verified: bool,
}

/// Parameters of a newly published contract.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PublishParams {
    pub wasm_hash: WasmHash,
    pub name: String,
    pub description: String,
    pub version: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub source_url: String,
    pub documentation_url: String,
    pub license: String,
}

impl PublishParams {
    /// Create new publish parameters with the default version, license and category.
    pub fn new(
        wasm_hash: WasmHash,
        name: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            wasm_hash,
            name: name.into(),
            description: description.into(),
            version: String::from("1.0.0"),
            category: Category::default(),
            tags: Vec::new(),
            source_url: source_url.into(),
            documentation_url: String::new(),
            license: String::from("MIT"),
        }
    }
}

/// Metadata fields that can be changed after publishing.
///
/// Fields left as [`None`] keep their current values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetadataUpdate {
    pub description: Option<String>,
    pub documentation_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Parse a comma-separated list of tags, dropping empty entries.
pub fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Deployed contract instance information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployment_id: u32,
    pub contract_id: u32,
    pub deployer: String,
    pub deployed_contract_address: String,
    #[serde(deserialize_with = "deserialize_u64")]
    pub deployed_at: u64,
    pub wasm_hash: WasmHash,
    pub salt: Salt,
}

/// User review of a published contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: u32,
    pub contract_id: u32,
    pub reviewer: String,
    pub rating: u32,
    pub comment: String,
    #[serde(deserialize_with = "deserialize_u64")]
    pub created_at: u64,
    pub upvotes: u32,
}

/// Aggregated review statistics of a contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub contract_id: u32,
    pub total_reviews: u32,

    /// Average rating multiplied by 100, e.g. 450 is 4.5 stars.
    pub average_rating: u32,

    /// Review counts for 1 to 5 stars.
    pub rating_distribution: Vec<u32>,
}

impl ReviewSummary {
    /// Average rating in stars.
    pub fn average_stars(&self) -> f64 {
        f64::from(self.average_rating) / 100.0
    }

    /// Number of reviews with the provided star rating.
    pub fn count(&self, rating: u32) -> u32 {
        rating
            .checked_sub(1)
            .and_then(|index| self.rating_distribution.get(index as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Share of reviews with the provided star rating, in range from 0 to 1.
    pub fn share(&self, rating: u32) -> f64 {
        if self.total_reviews == 0 {
            return 0.0;
        }

        f64::from(self.count(rating)) / f64::from(self.total_reviews)
    }
}
