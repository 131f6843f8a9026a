use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one entry in the recent-plans list.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecentPlan {
    pub url: String,
    pub name: String,
    pub location_count: usize,
    pub last_opened: DateTime<Utc>,
}
