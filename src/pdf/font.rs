//! Embedded Type 1 fonts, subset at finalization
//!
//! A font gets its object id when it is registered, because page dictionaries
//! refer to it long before the glyphs it needs are known. Pages mark the
//! characters they use; `finish` then asks a [`FontSubsetter`] for a reduced
//! font program and writes, in order, the font program stream, the font
//! descriptor and the font dictionary (into the reserved id).

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::pdf::dict::{array, Dictionary};
use crate::pdf::ledger::ObjectId;
use crate::pdf::object::PdfObject;
use crate::pdf::options::GapPolicy;
use crate::pdf::stream::StreamPayload;
use crate::pdf::writer::Writer;

/// `/Flags` value of the descriptor: symbolic font
const SYMBOLIC_FLAGS: u32 = 4;

/// Highest codepoint accepted by [`Writer::mark_codepoints`]
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Handle to a font registered with a [`Writer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontRef(pub(crate) usize);

/// Failure reported by a [`FontSubsetter`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubsetterError {
    /// The font file cannot be read or parsed
    #[error("{0}")]
    Load(String),

    /// The requested characters cannot be subset
    #[error("{message}")]
    Subset {
        codepoint: Option<u32>,
        message: String,
    },
}

/// Reduced font program and metrics for a set of codepoints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubsetFont {
    /// Cleartext, encrypted and zero-fill segments of the font program
    pub segments: [Vec<u8>; 3],
    /// Six-letter tag that prefixes the font name
    pub subset_id: String,
    pub font_name: String,
    pub bbox: [i32; 4],
    pub italic_angle: i32,
    pub ascender: i32,
    pub descender: i32,
    pub cap_height: i32,
    pub x_height: i32,
    /// Names of the glyphs kept in the subset, for `/CharSet`
    pub glyph_names: Vec<String>,
    /// Advance width per codepoint, in glyph space units
    pub widths: BTreeMap<u32, i32>,
}

impl SubsetFont {
    pub fn width_of(&self, codepoint: u32) -> Option<i32> {
        self.widths.get(&codepoint).copied()
    }

    /// `subset_id+font_name`
    pub fn subset_name(&self) -> String {
        format!("{}+{}", self.subset_id, self.font_name)
    }
}

/// Produces reduced font programs. Parsing fonts is outside this crate.
pub trait FontSubsetter {
    /// Subset `font_file` to `codepoints`, which are distinct and ascending.
    fn subset(
        &self,
        font_file: &Path,
        codepoints: &[u32],
    ) -> std::result::Result<SubsetFont, SubsetterError>;
}

impl<F> FontSubsetter for F
where
    F: Fn(&Path, &[u32]) -> std::result::Result<SubsetFont, SubsetterError>,
{
    fn subset(
        &self,
        font_file: &Path,
        codepoints: &[u32],
    ) -> std::result::Result<SubsetFont, SubsetterError> {
        self(font_file, codepoints)
    }
}

/// A registered font and the characters used from it so far
#[derive(Debug)]
pub struct Font {
    object: PdfObject,
    internal_name: String,
    path: PathBuf,
    used: BTreeSet<u32>,
}

impl Font {
    pub(crate) fn new(object: PdfObject, internal_name: String, path: PathBuf) -> Self {
        Self {
            object,
            internal_name,
            path,
            used: BTreeSet::new(),
        }
    }

    /// Reserved id of the font dictionary
    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// Resource name such as `/F1`
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mark_used<I: IntoIterator<Item = u32>>(&mut self, codepoints: I) {
        self.used.extend(codepoints);
    }

    /// Used codepoints, ascending
    pub fn used(&self) -> &BTreeSet<u32> {
        &self.used
    }

    pub(crate) fn ensure_used(&self) -> Result<()> {
        if self.used.is_empty() {
            return Err(Error::EmptySubset {
                font: self.internal_name.clone(),
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}

/// Glyph name for `codepoint` when the subsetter reports none: the character
/// itself for ASCII letters and digits, `uniXXXX` otherwise.
fn fallback_glyph_name(codepoint: u32) -> String {
    match char::from_u32(codepoint) {
        Some(c) if c.is_ascii_alphanumeric() => c.to_string(),
        _ => format!("uni{:04X}", codepoint),
    }
}

/// `/CharSet` string: the subset's glyph names, or names derived from the
/// used codepoints when the subsetter returned none.
pub fn charset(used: &BTreeSet<u32>, subset: &SubsetFont) -> String {
    let names: String = if subset.glyph_names.is_empty() {
        used.iter()
            .map(|&cp| format!("/{}", fallback_glyph_name(cp)))
            .collect()
    } else {
        subset.glyph_names.iter().map(|name| format!("/{}", name)).collect()
    };
    format!("({})", names)
}

/// Widths for every codepoint in `first..=last` of the used set, gaps included.
pub fn width_array(
    used: &BTreeSet<u32>,
    subset: &SubsetFont,
    policy: GapPolicy,
    path: &Path,
) -> Result<Vec<i32>> {
    let (first, last) = match (used.first(), used.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(Vec::new()),
    };

    let mut widths = Vec::with_capacity((last - first) as usize + 1);
    for codepoint in first..=last {
        let width = match (subset.width_of(codepoint), policy) {
            (Some(width), _) => width,
            (None, GapPolicy::ZeroWidth) => {
                warn!(
                    "No width for codepoint {} in {}, using 0",
                    codepoint,
                    path.display()
                );
                0
            }
            (None, GapPolicy::Fail) => {
                return Err(Error::MissingWidth {
                    path: path.to_path_buf(),
                    codepoint,
                })
            }
        };
        widths.push(width);
    }
    Ok(widths)
}

impl<W: Write + Seek> Writer<W> {
    /// Subset `font` and write its program, descriptor and dictionary.
    pub(crate) fn finish_font(&mut self, font: Font, subsetter: &dyn FontSubsetter) -> Result<()> {
        font.ensure_used()?;
        let Font {
            object,
            internal_name,
            path,
            used,
        } = font;

        let codepoints: Vec<u32> = used.iter().copied().collect();
        let subset = subsetter
            .subset(&path, &codepoints)
            .map_err(|e| match e {
                SubsetterError::Load(message) => Error::FontLoad {
                    path: path.clone(),
                    message,
                },
                SubsetterError::Subset { codepoint, message } => Error::Subset {
                    path: path.clone(),
                    codepoint,
                    message,
                },
            })?;

        // Computed before anything is written so a missing width leaves no
        // partial font objects behind.
        let widths = width_array(&used, &subset, self.options().gap_policy, &path)?;

        let program = self.write_font_program(&subset)?;
        let descriptor = self.write_font_descriptor(&subset, &used, program)?;

        let mut dict = Dictionary::new();
        dict.set("/Type", "/Font");
        dict.set("/Subtype", "/Type1");
        dict.set("/BaseFont", format!("/{}", subset.subset_name()));
        dict.set("/FirstChar", codepoints[0].to_string());
        dict.set("/LastChar", codepoints[codepoints.len() - 1].to_string());
        dict.set("/Widths", array(&widths));
        dict.set("/FontDescriptor", descriptor.reference());

        let mut object = object;
        object.dict(&dict);
        let id = self.commit(object)?;

        debug!(
            "Wrote font {} ({}) as object {}: {} glyphs, {} widths",
            internal_name,
            subset.subset_name(),
            id,
            codepoints.len(),
            widths.len()
        );
        Ok(())
    }

    fn write_font_program(&mut self, subset: &SubsetFont) -> Result<ObjectId> {
        let mut dict = Dictionary::new();
        for (i, segment) in subset.segments.iter().enumerate() {
            dict.set(format!("/Length{}", i + 1), segment.len().to_string());
        }
        let data = subset.segments.concat();
        self.write_stream(StreamPayload::with_dict(data, dict))
    }

    fn write_font_descriptor(
        &mut self,
        subset: &SubsetFont,
        used: &BTreeSet<u32>,
        program: ObjectId,
    ) -> Result<ObjectId> {
        let mut dict = Dictionary::new();
        dict.set("/Type", "/FontDescriptor");
        dict.set("/FontName", format!("/{}", subset.subset_name()));
        dict.set("/Flags", SYMBOLIC_FLAGS.to_string());
        dict.set("/FontBBox", array(subset.bbox));
        dict.set("/ItalicAngle", subset.italic_angle.to_string());
        dict.set("/Ascent", subset.ascender.to_string());
        dict.set("/Descent", subset.descender.to_string());
        dict.set("/CapHeight", subset.cap_height.to_string());
        dict.set("/XHeight", subset.x_height.to_string());
        dict.set("/StemV", "0");
        dict.set("/FontFile", program.reference());
        dict.set("/CharSet", charset(used, subset));
        self.write_dict(&dict)
    }
}
