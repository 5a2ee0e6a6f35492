//! # rankscout
//!
//! Collects "top apps" rankings from two differently shaped sources and
//! delivers one ranked list per platform to an ingestion endpoint.
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator → SourceAdapter → RawEntry → Normalizer → Entry → DeliveryClient
//! ```
//!
//! - [`source`]: JSON ranking feed, fetched with over-fetch
//! - [`render`]: JavaScript-rendered storefront, scraped after zoom + scroll
//! - [`normalizer`]: title cleaning, dedup, caps and ranks
//! - [`delivery`]: one POST per platform
//! - [`orchestrator`]: per-category and per-platform failure isolation
//!
//! ## Quick Start
//!
//! ```bash
//! # Collect both platforms and deliver
//! RANKSCOUT_SECRET_KEY=... rankscout run
//!
//! # Preview one platform without delivering
//! rankscout show apple --category games
//!
//! # Everything except the delivery call
//! rankscout run --dry-run
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the adapters,
/// normalizer and delivery client from a [`Config`](config::Config).
pub mod app;

/// Command-line interface using clap.
///
/// - `run [--platform] [--dry-run]` - Collect and deliver
/// - `show <platform> [--category]` - Collect and print
/// - `config` - Print the effective configuration
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/rankscout/config.toml`; the delivery secret can be
/// supplied through `RANKSCOUT_SECRET_KEY` instead.
pub mod config;

/// Ingestion endpoint client.
pub mod delivery;

/// Core domain models.
///
/// - [`Entry`](domain::Entry): ranked app as delivered
/// - [`RawEntry`](domain::RawEntry): adapter output
/// - [`Category`](domain::Category) / [`Platform`](domain::Platform): fixed enumerations
/// - [`Identifier`](domain::Identifier): dedup key derived from a link
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for GET requests
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Title cleaning, dedup, caps and rank assignment.
pub mod normalizer;

/// Runs the pipeline per platform and reports what happened.
pub mod orchestrator;

/// Headless-browser source for the storefront listing pages.
///
/// - [`ChromeRenderer`](render::ChromeRenderer): chromiumoxide-based renderer
/// - [`ExtractionRules`](render::ExtractionRules): selector fallback chains
/// - [`RenderedPageAdapter`](render::RenderedPageAdapter): the storefront source
pub mod render;

/// Source adapter trait and the ranking feed source.
pub mod source;
