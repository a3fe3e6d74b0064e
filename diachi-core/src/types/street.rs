//! Street autocomplete request.

use serde::{Deserialize, Serialize};

/// An autocomplete request: typed text plus optional division codes.
///
/// Empty codes mean "not selected".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetQuery {
    /// Text typed by the user
    pub query: String,
    /// Ward code
    #[serde(default)]
    pub ward: String,
    /// District code
    #[serde(default)]
    pub district: String,
    /// Province code
    #[serde(default)]
    pub province: String,
}

impl StreetQuery {
    /// Creates a request with no division filter.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Sets the ward code.
    pub fn ward(mut self, code: impl Into<String>) -> Self {
        self.ward = code.into();
        self
    }

    /// Sets the district code.
    pub fn district(mut self, code: impl Into<String>) -> Self {
        self.district = code.into();
        self
    }

    /// Sets the province code.
    pub fn province(mut self, code: impl Into<String>) -> Self {
        self.province = code.into();
        self
    }
}
