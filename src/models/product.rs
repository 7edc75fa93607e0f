use serde::{Deserialize, Serialize};

/// A catalog entry. Each product may sell one-time, by subscription, or both;
/// the two price ids partition what a checkout in a given mode may contain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_price_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_price_id: Option<String>,
}
