//! # logseq-clipper
//!
//! In-page content picker for clipping web pages into a Logseq graph.
//!
//! A [`Picker`] runs one interactive session over a loaded [`Page`]: it
//! indexes the capturable blocks of the main content, lets the user include
//! or exclude them and draw coloured highlights, and finally serializes the
//! chosen blocks into a [`CapturePayload`]. Ending a session by any path
//! leaves the page exactly as it was found.
//!
//! ## Quick Start
//!
//! ```rust
//! use logseq_clipper::{Mode, Page, Picker, VecSink};
//!
//! let body = "Rust is a language empowering everyone to build reliable software. ".repeat(10);
//! let html = format!(
//!     "<html><head><title>Rust</title></head><body>\
//!      <article><h2>Why choose Rust?</h2><p>{body}</p></article></body></html>"
//! );
//! let page = Page::parse(&html, "https://www.rust-lang.org/");
//!
//! let mut picker = Picker::new(&page, VecSink::new());
//! picker.start(Mode::Remove);
//! let count = picker.capture()?;
//! assert_eq!(count, 2);
//!
//! let payload = picker.sink().last().expect("payload");
//! assert_eq!(payload.title, "Rust");
//! let blocks = logseq_clipper::logseq::html_to_blocks(&payload.html, 0);
//! assert!(blocks.starts_with("- **Why choose Rust?**"));
//! # Ok::<(), logseq_clipper::Error>(())
//! ```
//!
//! ## Layout
//!
//! - [`index`]: the anti-chain of capturable elements
//! - [`picker`]: session state machine, event routing, toolbar
//! - [`highlight`]: palettes, word-aligned text ranges, highlight markers
//! - [`capture`]: the payload and where it is delivered
//! - [`markdown`] and [`logseq`]: turning captured HTML into Logseq blocks
//! - [`templates`], [`settings`], [`vault`], [`native_host`]: saving clips

mod error;
mod options;
mod patterns;

/// DOM helpers over `dom_query` nodes.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// The loaded page.
pub mod page;

/// Selectable-element index.
pub mod index;

/// Highlight colours, text ranges and markers.
pub mod highlight;

/// Picker controller and session.
pub mod picker;

/// Capture payload and sinks.
pub mod capture;

/// HTML to Markdown conversion.
pub mod markdown;

/// Logseq block formatting and file naming.
pub mod logseq;

/// Clip templates.
pub mod templates;

/// Persisted user settings.
pub mod settings;

/// Graph folder and deep-link destinations.
pub mod vault;

/// Native messaging host.
pub mod native_host;

// Public API - re-exports
pub use capture::{CapturePayload, CaptureSink, ChannelSink, HighlightRecord, VecSink};
pub use error::{Error, Result};
pub use highlight::{Color, PaletteKind, TextPoint, TextRange};
pub use index::{Candidate, CandidateIndex, TagCategory};
pub use options::{IndexOptions, PickerOptions, Platform};
pub use page::Page;
pub use picker::{Effect, EventOutcome, Key, Modifiers, Mode, Picker, PickerEvent, StartOutcome};
