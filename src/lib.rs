//! Typed bootstrap-configuration assembly for an embedded network-proxy
//! runtime. Configure knobs through a builder, render a complete document,
//! and hand the runtime a validated, strongly-typed configuration.
//!
//! ```ignore
//! let engine = EngineBuilder::new()
//!     .connect_timeout_seconds(30)
//!     .stats_domain("stats.example.com")?
//!     .add_platform_filter("header_mutator")?
//!     .build()?;
//! ```
//!
//! # Why bootfig
//!
//! A proxy runtime embedded in a host application boots from one large
//! structured configuration document. Assembling that document by hand
//! couples every host to the runtime's schema; exposing raw text invites
//! half-formed configurations that fail deep inside the runtime. Bootfig
//! sits between: hosts set typed options and append filter, sink, and
//! virtual-cluster fragments, and the crate guarantees the result is either
//! a fully resolved, schema-valid configuration or a precise error.
//!
//! # Design: template as source of truth
//!
//! The document is produced from a build-time template whose `#{key}`
//! markers name every position an option can influence:
//!
//! - Every option binds exactly one marker family; a family may occur at
//!   several positions and all of them receive the same value.
//! - Conditional sections (the admin interface, ADS, feature filters) are
//!   markers bound to either a fragment or the empty string, so rendering
//!   is a single uniform substitution pass with no branching.
//! - After substitution the text is scanned for leftover markers and any
//!   finding is fatal, naming every unresolved key. A partially rendered
//!   configuration is never returned.
//!
//! # Pipeline
//!
//! ```text
//! setters            EngineBuilder (option store + composer)
//!      ↓ validate    cross-option rules (e.g. RTDS requires ADS)
//!      ↓ render      document text, deterministic per builder state
//!      ↓ materialize Bootstrap, parsed through the runtime schema
//!      ↓ build       Engine: Bootstrap + string-accessor registry
//! ```
//!
//! Render and materialize recompute from current state on every call, so a
//! builder can be mutated and re-rendered across cycles, and rendering the
//! same state twice yields byte-identical text. [`EngineBuilder::build`]
//! produces the same structure as rendering and materializing by hand —
//! the two paths are interchangeable and comparable with `==`.
//!
//! # Ordered composition
//!
//! Filters, stats sinks, and virtual clusters are opaque fragments appended
//! in call order and spliced into the document verbatim, in that order,
//! without deduplication. Duplicate-name conflicts are the runtime's to
//! detect; this layer only promises faithful ordering.
//!
//! # String accessors
//!
//! The rendered document may reference named host-side callbacks (for
//! dynamic metadata read per request). The callbacks live in a
//! [`StringAccessorRegistry`] owned by the built [`Engine`], safe for
//! concurrent lookup from runtime threads.
//!
//! # Error handling
//!
//! All fallible operations return [`BootfigError`]. Errors are fatal to the
//! attempt and synchronous: invalid values are rejected at set time,
//! cross-option violations before rendering, unresolved markers after
//! substitution, and schema violations at materialization. There is no
//! partial-success mode.

pub mod bootstrap;
pub mod error;

mod builder;
mod compose;
mod engine;
mod options;
mod registry;
mod render;
mod template;
mod validate;

pub use bootstrap::{Bootstrap, materialize};
pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::BootfigError;
pub use registry::{StringAccessor, StringAccessorRegistry};
