//! Package codecs for the two mind-map container formats
//!
//! Both codecs map a [`Package`] to and from the [`Document`] model. The
//! model is the single source of truth: every encode walks the whole tree and
//! regenerates the codec's own entries, while entries the codec does not own
//! are carried through untouched.

mod error;
pub mod legacy;
mod xml;
pub mod zen;

pub use error::{FormatError, FormatResult};
pub use legacy::LegacyCodec;
pub use zen::ZenCodec;

use std::path::Path;

use clap::ValueEnum;
use log::{info, warn};
use strum::{Display, EnumString};

use crate::error::Result;
use crate::package::Package;
use crate::types::Document;

/// Container variants understood by xmindctl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum FormatKind {
    /// JSON-based package (`content.json`)
    Zen,
    /// XML-based package (`content.xml`)
    Legacy,
}

/// Which topic fields a codec can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum Fidelity {
    /// Title, note, comment, markers and labels
    #[default]
    Full,
    /// Title, note and labels; comments and markers are dropped
    NotesAndLabelsOnly,
}

/// A field that an encode will not write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossyField {
    /// Title of the topic carrying the field
    pub topic: String,
    /// Field name (`comment` or `markers`)
    pub field: &'static str,
}

impl Fidelity {
    pub fn supports_comments(self) -> bool {
        matches!(self, Fidelity::Full)
    }

    pub fn supports_markers(self) -> bool {
        matches!(self, Fidelity::Full)
    }

    /// List every populated field the given document would lose on encode
    pub fn lossy_fields(self, document: &Document) -> Vec<LossyField> {
        let mut lossy = Vec::new();
        for (_, topic) in document.walk() {
            if topic.comment.is_some() && !self.supports_comments() {
                lossy.push(LossyField {
                    topic: topic.title.clone(),
                    field: "comment",
                });
            }
            if !topic.markers.is_empty() && !self.supports_markers() {
                lossy.push(LossyField {
                    topic: topic.title.clone(),
                    field: "markers",
                });
            }
        }
        lossy
    }
}

/// Interface shared by the package codecs
pub trait Codec {
    /// Container variant handled by this codec
    fn kind(&self) -> FormatKind;

    /// Fields this codec round-trips
    fn fidelity(&self) -> Fidelity;

    /// Decode the document held by `package`
    fn decode(&self, package: &Package) -> FormatResult<Document> {
        self.decode_with_skipped(package).map(|(document, _)| document)
    }

    /// Decode, also listing populated fields found in the package that this
    /// codec did not read into the model
    fn decode_with_skipped(
        &self,
        package: &Package,
    ) -> FormatResult<(Document, Vec<LossyField>)>;

    /// Regenerate this codec's entries in `package` from `document`
    fn encode(&self, document: &Document, package: &mut Package) -> FormatResult<()>;
}

/// Decide which container variant a package uses
///
/// The JSON entry wins when both are present: Zen packages ship a
/// placeholder `content.xml` for older readers.
pub fn detect(package: &Package) -> FormatResult<FormatKind> {
    if package.contains(zen::CONTENT_ENTRY) {
        Ok(FormatKind::Zen)
    } else if package.contains(legacy::CONTENT_ENTRY) {
        Ok(FormatKind::Legacy)
    } else {
        Err(FormatError::Unsupported(format!(
            "package has neither {} nor {}",
            zen::CONTENT_ENTRY,
            legacy::CONTENT_ENTRY
        )))
    }
}

/// Construct the codec for a container variant
pub fn codec_for(kind: FormatKind, zen_fidelity: Fidelity) -> Box<dyn Codec> {
    match kind {
        FormatKind::Zen => Box::new(ZenCodec::new(zen_fidelity)),
        FormatKind::Legacy => Box::new(LegacyCodec::new()),
    }
}

/// A decoded document bound to the codec and package it is saved through
pub struct Workbook {
    /// The in-memory model
    pub document: Document,
    codec: Box<dyn Codec>,
    package: Package,
    skipped: Vec<LossyField>,
}

impl Workbook {
    /// Wrap a freshly created document for the given format
    pub fn new(document: Document, kind: FormatKind, zen_fidelity: Fidelity) -> Self {
        Self {
            document,
            codec: codec_for(kind, zen_fidelity),
            package: Package::new(),
            skipped: Vec::new(),
        }
    }

    /// Load and decode a package from disk
    pub fn open(path: &Path, zen_fidelity: Fidelity) -> Result<Self> {
        let package = Package::open(path)?;
        let kind = detect(&package)?;
        let codec = codec_for(kind, zen_fidelity);
        let (document, skipped) = codec.decode_with_skipped(&package)?;

        info!(
            "Loaded {} ({} format, {} sheet(s))",
            path.display(),
            kind,
            document.sheets.len()
        );

        Ok(Self {
            document,
            codec,
            package,
            skipped,
        })
    }

    pub fn format(&self) -> FormatKind {
        self.codec.kind()
    }

    pub fn fidelity(&self) -> Fidelity {
        self.codec.fidelity()
    }

    /// Fields a save would lose: those left unread on load plus those the
    /// codec cannot write from the current model
    pub fn lossy_fields(&self) -> Vec<LossyField> {
        let mut lossy = self.skipped.clone();
        lossy.extend(self.fidelity().lossy_fields(&self.document));
        lossy
    }

    /// Encode the whole document and replace the file at `path`
    ///
    /// Nothing is written if encoding fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        for lossy in self.lossy_fields() {
            warn!(
                "{} format ({}) cannot store the {} of topic '{}'; it will be dropped",
                self.format(),
                self.fidelity(),
                lossy.field,
                lossy.topic
            );
        }

        let mut package = self.package.clone();
        self.codec.encode(&self.document, &mut package)?;
        package.write_atomic(path)?;

        info!("Saved {} ({} format)", path.display(), self.format());
        Ok(())
    }
}
