//! The engine builder: the typed configuration surface callers use to
//! assemble, render, and materialize a bootstrap configuration.
//!
//! Setters are chained and validate their input before storing it — a value
//! that fails its check produces [`BootfigError::InvalidOption`] and stores
//! nothing. Rendering and materialization borrow the builder immutably and
//! recompute from current state on every call, so the builder is reusable
//! across cycles: mutate, render, mutate again, render again.

use std::sync::Arc;

use tracing::debug;

use crate::bootstrap::{self, Bootstrap};
use crate::compose::Composer;
use crate::engine::Engine;
use crate::error::BootfigError;
use crate::options::{AdsEndpoint, OptionStore, RtdsLayer};
use crate::registry::{StringAccessor, StringAccessorRegistry};
use crate::render;
use crate::template;

pub struct EngineBuilder {
    template: String,
    options: OptionStore,
    composer: Composer,
    accessors: Vec<(String, Arc<dyn StringAccessor>)>,
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("template", &self.template)
            .field("options", &self.options)
            .field("composer", &self.composer)
            .field(
                "accessors",
                &self.accessors.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            template: template::DEFAULT_TEMPLATE.to_string(),
            options: OptionStore::default(),
            composer: Composer::default(),
            accessors: Vec::new(),
        }
    }

    /// Replace the whole template. Intended for tests; the
    /// unresolved-marker scan is the safety net for markers the option
    /// surface does not know about.
    pub fn override_template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    // --- Network timeouts ---

    pub fn connect_timeout_seconds(mut self, seconds: u64) -> Self {
        self.options.connect_timeout_seconds = seconds;
        self
    }

    pub fn stream_idle_timeout_seconds(mut self, seconds: u64) -> Self {
        self.options.stream_idle_timeout_seconds = seconds;
        self
    }

    pub fn per_try_idle_timeout_seconds(mut self, seconds: u64) -> Self {
        self.options.per_try_idle_timeout_seconds = seconds;
        self
    }

    pub fn h2_keepalive_idle_interval_ms(mut self, milliseconds: u64) -> Self {
        self.options.h2_keepalive_idle_interval_ms = milliseconds;
        self
    }

    pub fn h2_keepalive_timeout_seconds(mut self, seconds: u64) -> Self {
        self.options.h2_keepalive_timeout_seconds = seconds;
        self
    }

    pub fn max_connections_per_host(mut self, count: u32) -> Result<Self, BootfigError> {
        if count == 0 {
            return Err(BootfigError::invalid_option(
                "max_connections_per_host",
                "must be at least 1",
            ));
        }
        self.options.max_connections_per_host = count;
        Ok(self)
    }

    // --- DNS behavior ---

    pub fn dns_refresh_seconds(mut self, seconds: u64) -> Self {
        self.options.dns_refresh_seconds = seconds;
        self
    }

    pub fn dns_min_refresh_seconds(mut self, seconds: u64) -> Self {
        self.options.dns_min_refresh_seconds = seconds;
        self
    }

    pub fn dns_query_timeout_seconds(mut self, seconds: u64) -> Self {
        self.options.dns_query_timeout_seconds = seconds;
        self
    }

    /// Base and max intervals for the failure backoff; the base must not
    /// exceed the max.
    pub fn dns_failure_refresh_seconds(
        mut self,
        base: u64,
        max: u64,
    ) -> Result<Self, BootfigError> {
        if base > max {
            return Err(BootfigError::invalid_option(
                "dns_failure_refresh_seconds",
                "base interval must not exceed max interval",
            ));
        }
        self.options.dns_fail_base_interval_seconds = base;
        self.options.dns_fail_max_interval_seconds = max;
        Ok(self)
    }

    pub fn dns_preresolve_hostnames(
        mut self,
        hostnames: Vec<String>,
    ) -> Result<Self, BootfigError> {
        if hostnames.iter().any(|h| h.is_empty()) {
            return Err(BootfigError::invalid_option(
                "dns_preresolve_hostnames",
                "hostnames must not be empty",
            ));
        }
        self.options.dns_preresolve_hostnames = hostnames;
        Ok(self)
    }

    /// `true` (the default) keeps every resolved address family in play;
    /// `false` prefers IPv4.
    pub fn use_all_address_families(mut self, enabled: bool) -> Self {
        self.options.use_all_address_families = enabled;
        self
    }

    /// Enable or disable the persistent DNS cache. The save interval only
    /// applies when enabling and must be at least one second.
    pub fn dns_cache(
        mut self,
        enabled: bool,
        save_interval_seconds: u64,
    ) -> Result<Self, BootfigError> {
        if enabled && save_interval_seconds == 0 {
            return Err(BootfigError::invalid_option(
                "dns_cache",
                "save interval must be at least 1s",
            ));
        }
        self.options.dns_cache_save_interval_seconds =
            enabled.then_some(save_interval_seconds);
        Ok(self)
    }

    pub fn force_ipv6(mut self, enabled: bool) -> Self {
        self.options.force_ipv6 = enabled;
        self
    }

    pub fn skip_dns_lookup_for_proxied_requests(mut self, enabled: bool) -> Self {
        self.options.skip_dns_lookup_for_proxied_requests = enabled;
        self
    }

    // --- TLS / trust policy ---

    pub fn enforce_trust_chain_verification(mut self, enabled: bool) -> Self {
        self.options.enforce_trust_chain_verification = enabled;
        self
    }

    /// Validate peer certificates through the platform's verifier instead
    /// of the static trust bundle. Exactly one of the two mechanisms is
    /// rendered.
    pub fn platform_certificates_validation(mut self, enabled: bool) -> Self {
        self.options.platform_certificates_validation = enabled;
        self
    }

    // --- Stats ---

    pub fn stats_domain(mut self, domain: &str) -> Result<Self, BootfigError> {
        if domain.is_empty() {
            return Err(BootfigError::invalid_option(
                "stats_domain",
                "must not be empty",
            ));
        }
        self.options.stats_domain = domain.to_string();
        Ok(self)
    }

    pub fn stats_flush_seconds(mut self, seconds: u64) -> Self {
        self.options.stats_flush_seconds = seconds;
        self
    }

    pub fn add_stats_sink(mut self, fragment: &str) -> Result<Self, BootfigError> {
        validate_fragment("stats_sink", fragment)?;
        self.composer.add_stats_sink(fragment);
        Ok(self)
    }

    pub fn add_stats_sinks(mut self, fragments: Vec<String>) -> Result<Self, BootfigError> {
        for fragment in fragments {
            self = self.add_stats_sink(&fragment)?;
        }
        Ok(self)
    }

    // --- Filters and virtual clusters ---

    pub fn add_native_filter(
        mut self,
        name: &str,
        typed_config: &str,
    ) -> Result<Self, BootfigError> {
        if name.is_empty() {
            return Err(BootfigError::invalid_option(
                "native_filter",
                "name must not be empty",
            ));
        }
        validate_fragment("native_filter", typed_config)?;
        self.composer.add_native_filter(name, typed_config);
        Ok(self)
    }

    pub fn add_platform_filter(mut self, name: &str) -> Result<Self, BootfigError> {
        if name.is_empty() {
            return Err(BootfigError::invalid_option(
                "platform_filter",
                "name must not be empty",
            ));
        }
        self.composer.add_platform_filter(name);
        Ok(self)
    }

    pub fn add_virtual_cluster(mut self, fragment: &str) -> Result<Self, BootfigError> {
        validate_fragment("virtual_cluster", fragment)?;
        self.composer.add_virtual_cluster(fragment);
        Ok(self)
    }

    // --- Admin / debug and feature toggles ---

    pub fn admin_interface(mut self, enabled: bool) -> Self {
        self.options.admin_interface_enabled = enabled;
        self
    }

    pub fn http3(mut self, enabled: bool) -> Self {
        self.options.http3_enabled = enabled;
        self
    }

    pub fn gzip_decompression(mut self, enabled: bool) -> Self {
        self.options.gzip_decompression_enabled = enabled;
        self
    }

    pub fn brotli_decompression(mut self, enabled: bool) -> Self {
        self.options.brotli_decompression_enabled = enabled;
        self
    }

    pub fn socket_tagging(mut self, enabled: bool) -> Self {
        self.options.socket_tagging_enabled = enabled;
        self
    }

    pub fn interface_binding(mut self, enabled: bool) -> Self {
        self.options.interface_binding_enabled = enabled;
        self
    }

    pub fn drain_post_dns_refresh(mut self, enabled: bool) -> Self {
        self.options.drain_post_dns_refresh_enabled = enabled;
        self
    }

    // --- Platform metadata ---

    pub fn device_os(mut self, os: &str) -> Self {
        self.options.device_os = Some(os.to_string());
        self
    }

    pub fn app_version(mut self, version: &str) -> Self {
        self.options.app_version = Some(version.to_string());
        self
    }

    pub fn app_id(mut self, id: &str) -> Self {
        self.options.app_id = Some(id.to_string());
        self
    }

    // --- Control plane ---

    pub fn ads(mut self, host: &str, port: u16) -> Result<Self, BootfigError> {
        if host.is_empty() {
            return Err(BootfigError::invalid_option("ads", "host must not be empty"));
        }
        self.options.ads = Some(AdsEndpoint {
            host: host.to_string(),
            port,
        });
        Ok(self)
    }

    /// Add a runtime-discovery-service layer. Rendering fails with
    /// [`BootfigError::MissingDependency`] unless an ADS endpoint is also
    /// configured.
    pub fn rtds_layer(
        mut self,
        name: &str,
        initial_fetch_timeout_seconds: u64,
    ) -> Result<Self, BootfigError> {
        if name.is_empty() {
            return Err(BootfigError::invalid_option(
                "rtds_layer",
                "name must not be empty",
            ));
        }
        self.options.rtds = Some(RtdsLayer {
            name: name.to_string(),
            initial_fetch_timeout_seconds,
        });
        Ok(self)
    }

    // --- Accessors ---

    /// Queue a string accessor for registration into the engine's registry
    /// at [`build`](Self::build) time. The rendered document references it
    /// by name only.
    pub fn add_string_accessor(mut self, name: &str, accessor: Arc<dyn StringAccessor>) -> Self {
        self.accessors.push((name.to_string(), accessor));
        self
    }

    // --- Pipeline ---

    /// Validate and render the document text.
    pub fn render(&self) -> Result<String, BootfigError> {
        render::render(&self.template, &self.options, &self.composer)
    }

    /// Validate, render, and parse into the structured configuration.
    pub fn bootstrap(&self) -> Result<Bootstrap, BootfigError> {
        bootstrap::materialize(&self.render()?)
    }

    /// Full construction: render, materialize, and hand off an [`Engine`]
    /// with all queued accessors registered.
    pub fn build(self) -> Result<Engine, BootfigError> {
        let bootstrap = self.bootstrap()?;
        let registry = StringAccessorRegistry::new();
        for (name, accessor) in self.accessors {
            registry.register(&name, accessor);
        }
        debug!("engine configuration built");
        Ok(Engine::new(bootstrap, Arc::new(registry)))
    }
}

/// Opaque fragments are spliced into the document verbatim, so they must be
/// single-line inline YAML mappings — anything else would corrupt the
/// surrounding indentation or fail the schema later with a worse message.
fn validate_fragment(option: &str, fragment: &str) -> Result<(), BootfigError> {
    if fragment.contains('\n') {
        return Err(BootfigError::invalid_option(
            option,
            "fragment must be a single-line inline mapping",
        ));
    }
    let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(fragment)
        .map_err(|e| BootfigError::invalid_option(option, format!("fragment is not valid YAML: {e}")))?;
    if !parsed.is_mapping() {
        return Err(BootfigError::invalid_option(
            option,
            "fragment must be a mapping",
        ));
    }
    Ok(())
}
