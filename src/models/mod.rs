pub mod group;
pub mod identity;
pub mod task;

pub use group::{GroupDetails, GroupSummary, Member};
pub use identity::{Identity, Role};
pub use task::{TaskDetails, TaskSummary};

use serde::{Deserialize, Deserializer, Serialize};

/// Result of a create call. An empty success body means the server
/// accepted the record without echoing an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub success: bool,
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
}

impl Created {
    pub fn accepted() -> Self {
        Self {
            success: true,
            id: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// The backend sends ids as either strings or integers.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
