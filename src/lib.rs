/*!
 * xmindctl - Inspect, convert and edit XMind mind maps
 *
 * This library reads XML-based and JSON-based mind-map packages into a
 * single tree model, renders that model as a text tree or Markdown, and
 * applies title-addressed structural edits before writing it back.
 */

pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
pub mod package;
pub mod render;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use codec::{detect, Codec, Fidelity, FormatError, FormatKind, LegacyCodec, Workbook, ZenCodec};
pub use config::Config;
pub use editor::{Editor, NewTopic, TopicEdit};
pub use error::{Result, XmindError};
pub use package::Package;
pub use render::{Style, View};
pub use types::{Document, Sheet, Topic, TopicAddress};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
