//! Batch apply policies

use paychan_transform::TransformConfig;
use serde::{Deserialize, Serialize};

/// Marker of the namespaced trade query response
pub const TRADE_QUERY_RESPONSE: &str = "$.alipay_trade_query_response";

/// Batch apply configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Markers that put a channel field under the namespaced-response
    /// convention when they occur anywhere in it
    pub response_namespaces: Vec<String>,
    /// Settings of the transform engine used for each mapping
    pub transform: TransformConfig,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            response_namespaces: vec![TRADE_QUERY_RESPONSE.to_string()],
            transform: TransformConfig::default(),
        }
    }
}

impl ApplyConfig {
    /// Add a namespaced-response marker
    #[must_use]
    pub fn with_response_namespace(mut self, marker: impl Into<String>) -> Self {
        self.response_namespaces.push(marker.into());
        self
    }

    /// Replace all namespaced-response markers
    #[must_use]
    pub fn with_response_namespaces<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_namespaces = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    /// Whether a channel field addresses a whole provider response
    ///
    /// Such a field is a JSONPath into the payload rather than a key of it.
    #[must_use]
    pub fn is_namespaced(&self, channel_field: &str) -> bool {
        self.response_namespaces
            .iter()
            .any(|marker| !marker.is_empty() && channel_field.contains(marker.as_str()))
    }
}

/// Output key for a channel field
///
/// Namespaced fields keep only their last dot-separated segment.
#[must_use]
pub fn output_key(channel_field: &str, namespaced: bool) -> &str {
    if namespaced {
        channel_field.rsplit('.').next().unwrap_or(channel_field)
    } else {
        channel_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace() {
        let config = ApplyConfig::default();
        assert!(config.is_namespaced("$.alipay_trade_query_response.trade_status"));
        assert!(config.is_namespaced("$.alipay_trade_query_response"));
        assert!(!config.is_namespaced("trade_status"));
        assert!(!config.is_namespaced("$.alipay_trade_refund_response.refund_fee"));
    }

    #[test]
    fn test_configured_namespaces() {
        let config = ApplyConfig::default().with_response_namespaces(["$.wechat_order_response"]);
        assert!(config.is_namespaced("$.wechat_order_response.amount.total"));
        assert!(!config.is_namespaced("$.alipay_trade_query_response.trade_status"));

        let config = ApplyConfig::default().with_response_namespace("$.alipay_trade_refund_response");
        assert!(config.is_namespaced("$.alipay_trade_refund_response.refund_fee"));
        assert!(config.is_namespaced("$.alipay_trade_query_response.trade_status"));
    }

    #[test]
    fn test_empty_marker_matches_nothing() {
        let config = ApplyConfig::default().with_response_namespaces([""]);
        assert!(!config.is_namespaced("trade_status"));
    }

    #[test]
    fn test_output_key() {
        assert_eq!(
            output_key("$.alipay_trade_query_response.trade_status", true),
            "trade_status"
        );
        assert_eq!(output_key("$.a.b", false), "$.a.b");
        assert_eq!(output_key("plain", true), "plain");
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ApplyConfig = serde_json::from_str(r#"{"transform": {}}"#).unwrap();
        assert_eq!(config, ApplyConfig::default());

        let config: ApplyConfig =
            serde_json::from_str(r#"{"response_namespaces": []}"#).unwrap();
        assert!(config.response_namespaces.is_empty());
        assert!(!config.is_namespaced(TRADE_QUERY_RESPONSE));
    }
}
