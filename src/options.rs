//! The typed option store: one field per option, with the documented
//! defaults and the rendering rule that turns each value into its
//! placeholder binding.
//!
//! Every option maps to exactly one placeholder family. Setting a field
//! overwrites the previous value (last write wins); list-typed options
//! append and are handled by the composer, not here. The store holds plain
//! values only — no runtime resources — so it is freely cloneable and has
//! no teardown behavior.

use std::collections::HashMap;

use crate::template;

/// Aggregated-discovery-service endpoint: where dynamic configuration is
/// fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AdsEndpoint {
    pub host: String,
    pub port: u16,
}

/// A runtime-discovery-service layer. Requires an [`AdsEndpoint`] to fetch
/// from; the validator enforces that pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RtdsLayer {
    pub name: String,
    pub initial_fetch_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct OptionStore {
    pub connect_timeout_seconds: u64,
    pub dns_refresh_seconds: u64,
    pub dns_min_refresh_seconds: u64,
    pub dns_query_timeout_seconds: u64,
    pub dns_fail_base_interval_seconds: u64,
    pub dns_fail_max_interval_seconds: u64,
    pub dns_preresolve_hostnames: Vec<String>,
    /// `true` renders `ALL` (use every resolved address); `false` renders
    /// `V4_PREFERRED`.
    pub use_all_address_families: bool,
    /// Persistent DNS cache save interval in seconds; `None` disables the
    /// cache entirely.
    pub dns_cache_save_interval_seconds: Option<u64>,
    pub force_ipv6: bool,
    pub skip_dns_lookup_for_proxied_requests: bool,
    pub h2_keepalive_idle_interval_ms: u64,
    pub h2_keepalive_timeout_seconds: u64,
    pub max_connections_per_host: u32,
    pub stats_domain: String,
    pub stats_flush_seconds: u64,
    pub stream_idle_timeout_seconds: u64,
    pub per_try_idle_timeout_seconds: u64,
    pub enforce_trust_chain_verification: bool,
    /// `true` selects the platform certificate-validator branch, `false`
    /// the static trust-bundle branch. Exactly one branch is always
    /// rendered; the two are never combined.
    pub platform_certificates_validation: bool,
    pub admin_interface_enabled: bool,
    pub http3_enabled: bool,
    pub gzip_decompression_enabled: bool,
    pub brotli_decompression_enabled: bool,
    pub socket_tagging_enabled: bool,
    pub interface_binding_enabled: bool,
    pub drain_post_dns_refresh_enabled: bool,
    pub device_os: Option<String>,
    pub app_version: Option<String>,
    pub app_id: Option<String>,
    pub ads: Option<AdsEndpoint>,
    pub rtds: Option<RtdsLayer>,
}

impl Default for OptionStore {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 30,
            dns_refresh_seconds: 60,
            dns_min_refresh_seconds: 60,
            dns_query_timeout_seconds: 25,
            dns_fail_base_interval_seconds: 2,
            dns_fail_max_interval_seconds: 10,
            dns_preresolve_hostnames: Vec::new(),
            use_all_address_families: true,
            dns_cache_save_interval_seconds: None,
            force_ipv6: false,
            skip_dns_lookup_for_proxied_requests: false,
            h2_keepalive_idle_interval_ms: 100_000_000,
            h2_keepalive_timeout_seconds: 10,
            max_connections_per_host: 7,
            stats_domain: "127.0.0.1".to_string(),
            stats_flush_seconds: 60,
            stream_idle_timeout_seconds: 15,
            per_try_idle_timeout_seconds: 15,
            enforce_trust_chain_verification: true,
            platform_certificates_validation: false,
            admin_interface_enabled: false,
            http3_enabled: true,
            gzip_decompression_enabled: true,
            brotli_decompression_enabled: false,
            socket_tagging_enabled: false,
            interface_binding_enabled: false,
            drain_post_dns_refresh_enabled: false,
            device_os: None,
            app_version: None,
            app_id: None,
            ads: None,
            rtds: None,
        }
    }
}

impl OptionStore {
    /// Produce the placeholder binding for every option this store covers.
    ///
    /// A pure function of the stored values: calling it twice yields the
    /// same map, which is what makes rendering deterministic.
    pub(crate) fn bindings(&self) -> HashMap<&'static str, String> {
        let mut b: HashMap<&'static str, String> = HashMap::new();

        b.insert("connect_timeout", seconds(self.connect_timeout_seconds));
        b.insert("dns_refresh_rate", seconds(self.dns_refresh_seconds));
        b.insert(
            "dns_min_refresh_rate",
            seconds(self.dns_min_refresh_seconds),
        );
        b.insert(
            "dns_query_timeout",
            seconds(self.dns_query_timeout_seconds),
        );
        b.insert(
            "dns_fail_base_interval",
            seconds(self.dns_fail_base_interval_seconds),
        );
        b.insert(
            "dns_fail_max_interval",
            seconds(self.dns_fail_max_interval_seconds),
        );
        b.insert(
            "dns_preresolve_hostnames",
            inline_list(&self.dns_preresolve_hostnames),
        );
        b.insert(
            "dns_lookup_family",
            if self.use_all_address_families {
                "ALL".to_string()
            } else {
                "V4_PREFERRED".to_string()
            },
        );
        b.insert(
            "dns_persistent_cache",
            match self.dns_cache_save_interval_seconds {
                Some(interval) => template::persistent_dns_cache_insert(interval),
                None => "null".to_string(),
            },
        );
        b.insert("dns_resolver_name", default_resolver_name().to_string());
        b.insert("force_ipv6", self.force_ipv6.to_string());
        b.insert(
            "skip_dns_lookup_for_proxied_requests",
            self.skip_dns_lookup_for_proxied_requests.to_string(),
        );
        b.insert(
            "h2_keepalive_idle_interval",
            seconds_from_millis(self.h2_keepalive_idle_interval_ms),
        );
        b.insert(
            "h2_keepalive_timeout",
            seconds(self.h2_keepalive_timeout_seconds),
        );
        b.insert(
            "max_connections_per_host",
            self.max_connections_per_host.to_string(),
        );
        b.insert("stats_domain", self.stats_domain.clone());
        b.insert("stats_flush_interval", seconds(self.stats_flush_seconds));
        b.insert(
            "stream_idle_timeout",
            seconds(self.stream_idle_timeout_seconds),
        );
        b.insert(
            "per_try_idle_timeout",
            seconds(self.per_try_idle_timeout_seconds),
        );
        b.insert(
            "trust_chain_verification",
            if self.enforce_trust_chain_verification {
                "VERIFY_TRUST_CHAIN".to_string()
            } else {
                "ACCEPT_UNTRUSTED".to_string()
            },
        );
        b.insert(
            "cert_validation_context",
            if self.platform_certificates_validation {
                template::PLATFORM_CERT_VALIDATION_INSERT.to_string()
            } else {
                template::STATIC_TRUST_BUNDLE_INSERT.to_string()
            },
        );
        b.insert(
            "admin_block",
            conditional(self.admin_interface_enabled, template::ADMIN_INSERT),
        );
        b.insert(
            "alt_svc_cache_filter",
            conditional(self.http3_enabled, template::ALT_SVC_CACHE_FILTER_INSERT),
        );
        b.insert(
            "gzip_decompressor_filter",
            conditional(
                self.gzip_decompression_enabled,
                template::GZIP_DECOMPRESSOR_FILTER_INSERT,
            ),
        );
        b.insert(
            "brotli_decompressor_filter",
            conditional(
                self.brotli_decompression_enabled,
                template::BROTLI_DECOMPRESSOR_FILTER_INSERT,
            ),
        );
        b.insert(
            "socket_tag_filter",
            conditional(self.socket_tagging_enabled, template::SOCKET_TAG_FILTER_INSERT),
        );
        b.insert(
            "enable_interface_binding",
            self.interface_binding_enabled.to_string(),
        );
        b.insert(
            "enable_drain_post_dns_refresh",
            self.drain_post_dns_refresh_enabled.to_string(),
        );
        b.insert("node_metadata", self.node_metadata());
        b.insert(
            "ads_block",
            match &self.ads {
                Some(ads) => template::ads_insert(&ads.host, ads.port),
                None => String::new(),
            },
        );
        b.insert(
            "rtds_layer",
            match &self.rtds {
                Some(rtds) => {
                    template::rtds_layer_insert(&rtds.name, rtds.initial_fetch_timeout_seconds)
                }
                None => String::new(),
            },
        );

        b
    }

    /// Node metadata as an inline mapping. Keys appear in a fixed order and
    /// only when set; with nothing set this is the empty mapping.
    fn node_metadata(&self) -> String {
        let mut entries: Vec<String> = Vec::new();
        if let Some(os) = &self.device_os {
            entries.push(format!("device_os: {os}"));
        }
        if let Some(version) = &self.app_version {
            entries.push(format!("app_version: {version}"));
        }
        if let Some(id) = &self.app_id {
            entries.push(format!("app_id: {id}"));
        }
        if entries.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", entries.join(", "))
        }
    }
}

/// The platform-default DNS resolver. Apple targets get the system
/// resolver; everything else falls back to getaddrinfo.
pub(crate) fn default_resolver_name() -> &'static str {
    if cfg!(any(target_os = "macos", target_os = "ios")) {
        "apple_system_resolver"
    } else {
        "getaddrinfo_resolver"
    }
}

fn seconds(n: u64) -> String {
    format!("{n}s")
}

/// Millisecond durations render as fractional seconds with trailing zeros
/// trimmed, e.g. 222ms is `0.222s` and 1500ms is `1.5s`.
fn seconds_from_millis(ms: u64) -> String {
    if ms % 1000 == 0 {
        return format!("{}s", ms / 1000);
    }
    let fraction = format!("{:03}", ms % 1000);
    format!("{}.{}s", ms / 1000, fraction.trim_end_matches('0'))
}

fn inline_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

fn conditional(enabled: bool, fragment: &str) -> String {
    if enabled {
        fragment.to_string()
    } else {
        String::new()
    }
}
