//! The bootstrap document template and marker substitution.
//!
//! The template is a build-time constant: YAML for the proxy runtime's
//! bootstrap schema with `#{key}` markers at every position an option can
//! influence. A marker may appear more than once (a placeholder family);
//! substitution replaces every occurrence in a single pass. Conditional
//! sections (admin interface, ADS, feature filters) are markers bound to
//! either a pre-indented fragment or the empty string, so the renderer
//! never branches.

use std::collections::HashMap;

use crate::error::BootfigError;

pub(crate) const DEFAULT_TEMPLATE: &str = r#"#{admin_block}
typed_dns_resolver_config:
  name: #{dns_resolver_name}
  typed_config: {}
#{ads_block}
static_resources:
  listeners:
    - name: base_api_listener
      address:
        socket_address: { protocol: TCP, address: 0.0.0.0, port_value: 10000 }
      api_listener:
        stat_prefix: hcm
        stream_idle_timeout: #{stream_idle_timeout}
        route_config:
          name: api_router
          virtual_hosts:
            - name: api
              domains: ['*']
              virtual_clusters: #{virtual_clusters}
              routes:
                - match: { prefix: / }
                  route:
                    cluster: base
                    timeout: 0s
                    retry_policy:
                      per_try_idle_timeout: #{per_try_idle_timeout}
                      retry_back_off: { base_interval: 0.25s, max_interval: 60s }
        http_filters:
#{custom_filters}
#{alt_svc_cache_filter}
#{gzip_decompressor_filter}
#{brotli_decompressor_filter}
#{socket_tag_filter}
          - name: network_configuration
            typed_config:
              enable_drain_post_dns_refresh: #{enable_drain_post_dns_refresh}
              enable_interface_binding: #{enable_interface_binding}
          - name: local_error
            typed_config: {}
          - name: dynamic_forward_proxy
            typed_config:
              dns_cache_config:
                name: base_dns_cache
                preresolve_hostnames: #{dns_preresolve_hostnames}
                dns_lookup_family: #{dns_lookup_family}
                host_ttl: 86400s
                dns_refresh_rate: #{dns_refresh_rate}
                dns_min_refresh_rate: #{dns_min_refresh_rate}
                dns_query_timeout: #{dns_query_timeout}
                dns_failure_refresh_rate:
                  base_interval: #{dns_fail_base_interval}
                  max_interval: #{dns_fail_max_interval}
                key_value_config: #{dns_persistent_cache}
          - name: router
            typed_config: {}
  clusters:
    - name: stats
      type: LOGICAL_DNS
      connect_timeout: #{connect_timeout}
      dns_refresh_rate: #{dns_refresh_rate}
      lb_policy: ROUND_ROBIN
      load_assignment:
        cluster_name: stats
        endpoints:
          - lb_endpoints:
              - endpoint:
                  address:
                    socket_address: { address: #{stats_domain}, port_value: 443 }
      transport_socket:
        name: tls
        typed_config:
          common_tls_context:
            validation_context:
#{cert_validation_context}
              trust_chain_verification: #{trust_chain_verification}
    - name: base
      connect_timeout: #{connect_timeout}
      lb_policy: CLUSTER_PROVIDED
      cluster_type:
        name: dynamic_forward_proxy
      upstream_connection_options:
        tcp_keepalive:
          keepalive_interval: 5
          keepalive_probes: 1
          keepalive_time: 10
      circuit_breakers:
        per_host_thresholds:
          - priority: DEFAULT
            max_connections: #{max_connections_per_host}
      http2_protocol_options:
        connection_keepalive:
          connection_idle_interval: #{h2_keepalive_idle_interval}
          timeout: #{h2_keepalive_timeout}
      transport_socket:
        name: tls
        typed_config:
          common_tls_context:
            validation_context:
#{cert_validation_context}
              trust_chain_verification: #{trust_chain_verification}
stats_flush_interval: #{stats_flush_interval}
#{stats_sinks_block}
node:
  id: proxy-mobile
  cluster: proxy-mobile
  metadata: #{node_metadata}
layered_runtime:
  layers:
    - name: static_layer_0
      static_layer:
        always_use_v6: #{force_ipv6}
        skip_dns_lookup_for_proxied_requests: #{skip_dns_lookup_for_proxied_requests}
#{rtds_layer}
"#;

pub(crate) const ADMIN_INSERT: &str = r#"admin:
  address:
    socket_address: { address: 127.0.0.1, port_value: 9901 }"#;

pub(crate) const ALT_SVC_CACHE_FILTER_INSERT: &str = r#"          - name: alternate_protocols_cache
            typed_config:
              cache_options:
                name: default_alternate_protocols_cache"#;

pub(crate) const GZIP_DECOMPRESSOR_FILTER_INSERT: &str = r#"          - name: gzip_decompressor
            typed_config:
              decompressor_library:
                name: gzip
                window_bits: 15
              response_direction_config:
                ignore_no_transform_header: true"#;

pub(crate) const BROTLI_DECOMPRESSOR_FILTER_INSERT: &str = r#"          - name: brotli_decompressor
            typed_config:
              decompressor_library:
                name: brotli"#;

pub(crate) const SOCKET_TAG_FILTER_INSERT: &str = r#"          - name: socket_tag
            typed_config: {}"#;

pub(crate) const STATIC_TRUST_BUNDLE_INSERT: &str =
    r#"              trusted_ca:
                filename: /etc/ssl/certs/ca-certificates.crt"#;

pub(crate) const PLATFORM_CERT_VALIDATION_INSERT: &str =
    r#"              custom_validator_config:
                name: platform_bridge_cert_validator"#;

pub(crate) fn native_filter_insert(name: &str, typed_config: &str) -> String {
    format!("          - name: {name}\n            typed_config: {typed_config}")
}

pub(crate) fn platform_filter_insert(name: &str) -> String {
    format!(
        "          - name: platform_bridge\n            typed_config:\n              platform_filter_name: {name}"
    )
}

pub(crate) fn persistent_dns_cache_insert(save_interval_seconds: u64) -> String {
    format!(
        "{{ config: {{ name: platform_key_value_store, key: dns_persistent_cache, save_interval: {save_interval_seconds}s, max_entries: 100 }} }}"
    )
}

pub(crate) fn ads_insert(host: &str, port: u16) -> String {
    format!(
        r#"dynamic_resources:
  ads_config:
    api_type: GRPC
    transport_api_version: V3
    set_node_on_first_message_only: true
    grpc_services:
      - google_grpc:
          target_uri: '{host}:{port}'
          stat_prefix: ads"#
    )
}

pub(crate) fn rtds_layer_insert(name: &str, initial_fetch_timeout_seconds: u64) -> String {
    format!(
        r#"    - name: {name}
      rtds_layer:
        name: {name}
        rtds_config:
          initial_fetch_timeout: {initial_fetch_timeout_seconds}s
          resource_api_version: V3
          ads: {{}}"#
    )
}

/// Substitute every `#{key}` marker in `template` from `bindings` in a
/// single left-to-right pass.
///
/// Substituted values are emitted verbatim and never rescanned, so a marker
/// sequence inside an opaque fragment cannot trigger a second round of
/// substitution. Markers with no binding are collected and reported together:
/// a partially rendered document is never returned.
pub(crate) fn substitute(
    template: &str,
    bindings: &HashMap<&'static str, String>,
) -> Result<String, BootfigError> {
    let mut out = String::with_capacity(template.len());
    let mut unresolved: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("#{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match bindings.get(key) {
                    Some(value) => out.push_str(value),
                    None => unresolved.push(key.to_string()),
                }
                rest = &after[end + 1..];
            }
            None => {
                // An opening marker with no closing brace can never resolve.
                unresolved.push(after.lines().next().unwrap_or(after).to_string());
                rest = "";
            }
        }
    }
    out.push_str(rest);

    if unresolved.is_empty() {
        Ok(out)
    } else {
        unresolved.sort();
        unresolved.dedup();
        Err(BootfigError::UnresolvedTemplate(unresolved))
    }
}
