//! The structured configuration: a strongly-typed view of the rendered
//! document, parsed through the runtime's bootstrap schema.
//!
//! Parsing is delegated to `serde_yaml_ng`; a document that does not
//! conform fails with [`BootfigError::SchemaViolation`]. Deeply nested
//! extension payloads (typed filter configs, load assignments) stay opaque
//! as [`Value`] — they belong to the runtime's extensions, not to this
//! crate. Every struct derives `PartialEq`, so two materializations can be
//! compared structurally to prove renderer/materializer agreement.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml_ng::Value;
use tracing::debug;

use crate::error::BootfigError;

/// Parse rendered document text into a [`Bootstrap`].
pub fn materialize(text: &str) -> Result<Bootstrap, BootfigError> {
    let bootstrap: Bootstrap =
        serde_yaml_ng::from_str(text).map_err(|e| BootfigError::SchemaViolation(e.to_string()))?;
    debug!(
        listeners = bootstrap.static_resources.listeners.len(),
        clusters = bootstrap.static_resources.clusters.len(),
        "materialized bootstrap"
    );
    Ok(bootstrap)
}

/// The complete bootstrap configuration consumed by the proxy runtime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bootstrap {
    #[serde(default)]
    pub admin: Option<Admin>,
    pub typed_dns_resolver_config: DnsResolverConfig,
    #[serde(default)]
    pub dynamic_resources: Option<DynamicResources>,
    pub static_resources: StaticResources,
    pub stats_flush_interval: String,
    #[serde(default)]
    pub stats_sinks: Option<Vec<Value>>,
    pub node: Node,
    pub layered_runtime: LayeredRuntime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Admin {
    pub address: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DnsResolverConfig {
    pub name: String,
    pub typed_config: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicResources {
    pub ads_config: AdsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdsConfig {
    pub api_type: String,
    pub transport_api_version: String,
    pub set_node_on_first_message_only: bool,
    pub grpc_services: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticResources {
    pub listeners: Vec<Listener>,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Listener {
    pub name: String,
    pub address: Value,
    pub api_listener: ApiListener,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiListener {
    pub stat_prefix: String,
    pub stream_idle_timeout: String,
    pub route_config: Value,
    pub http_filters: Vec<HttpFilter>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpFilter {
    pub name: String,
    pub typed_config: Value,
}

/// An upstream cluster. The two built-in clusters differ in shape beyond
/// the common fields, so the remainder is kept as an ordered map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub connect_timeout: String,
    pub lb_policy: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub id: String,
    pub cluster: String,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayeredRuntime {
    pub layers: Vec<RuntimeLayer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeLayer {
    pub name: String,
    #[serde(default)]
    pub static_layer: Option<Value>,
    #[serde(default)]
    pub rtds_layer: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Composer;
    use crate::options::OptionStore;
    use crate::render::render;
    use crate::template;

    fn default_document() -> String {
        render(
            template::DEFAULT_TEMPLATE,
            &OptionStore::default(),
            &Composer::default(),
        )
        .unwrap()
    }

    #[test]
    fn default_document_materializes() {
        let bootstrap = materialize(&default_document()).unwrap();
        assert_eq!(bootstrap.static_resources.listeners.len(), 1);
        assert_eq!(bootstrap.static_resources.clusters.len(), 2);
        assert_eq!(bootstrap.stats_flush_interval, "60s");
        assert!(bootstrap.admin.is_none());
        assert!(bootstrap.dynamic_resources.is_none());
        assert!(bootstrap.stats_sinks.is_none());
    }

    #[test]
    fn default_filter_chain_ends_with_router() {
        let bootstrap = materialize(&default_document()).unwrap();
        let filters = &bootstrap.static_resources.listeners[0]
            .api_listener
            .http_filters;
        assert_eq!(filters.last().unwrap().name, "router");
    }

    #[test]
    fn materialization_is_deterministic() {
        let text = default_document();
        assert_eq!(materialize(&text).unwrap(), materialize(&text).unwrap());
    }

    #[test]
    fn malformed_yaml_is_a_schema_violation() {
        let err = materialize("admin: [unbalanced").unwrap_err();
        assert!(matches!(err, BootfigError::SchemaViolation(_)));
    }

    #[test]
    fn unknown_top_level_section_is_a_schema_violation() {
        let mut text = default_document();
        text.push_str("surprise_section: true\n");
        let err = materialize(&text).unwrap_err();
        match err {
            BootfigError::SchemaViolation(detail) => {
                assert!(detail.contains("surprise_section"), "{detail}");
            }
            other => panic!("Expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn runtime_layer_shape_matches_static_layer() {
        let bootstrap = materialize(&default_document()).unwrap();
        let layers = &bootstrap.layered_runtime.layers;
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "static_layer_0");
        assert!(layers[0].static_layer.is_some());
        assert!(layers[0].rtds_layer.is_none());
    }
}
