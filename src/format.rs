//! Media format descriptors for component ports.
//!
//! A port's format is the triple (width, height, encoding). Before resolution any
//! subset of the three may be unknown, so [`PortFormat`] keeps each attribute as an
//! independent `Option`. Once resolution succeeds every required port has a fixed
//! [`VideoFormat`].
//!
//! # Design Principles
//!
//! - **Type safety**: closed enums for encodings and patterns, no strings past the loader
//! - **Explicit unknowns**: "not known yet" is `None`, never a sentinel value
//! - **Exact matching**: formats on either end of a connection must be identical
//!
//! The short names accepted in configuration are case-insensitive:
//!
//! ```rust
//! use rilgraph::format::Encoding;
//!
//! let encoding: Encoding = "I420".parse().unwrap();
//! assert_eq!(encoding, Encoding::I420);
//! assert_eq!(encoding.runtime_name(), "MMAL_ENCODING_I420");
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed parameter passed along with every source pattern selection.
pub const SOURCE_PATTERN_SEED: u32 = 0xdead_beaf;

/// A short name that is not part of a closed lexicon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {lexicon} '{name}'")]
pub struct UnknownName {
    /// Which lexicon was consulted (e.g. "encoding").
    pub lexicon: &'static str,
    /// The rejected name, as written.
    pub name: String,
}

impl UnknownName {
    pub(crate) fn new(lexicon: &'static str, name: impl Into<String>) -> Self {
        Self {
            lexicon,
            name: name.into(),
        }
    }
}

/// Pixel encodings a port can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Encoding {
    /// RGB 8-bit per channel, packed (24 bits/pixel).
    Rgb24,
    /// RGBA 8-bit per channel, packed (32 bits/pixel).
    Rgba,
    /// YUV 4:2:0 planar.
    I420,
    /// Runtime-negotiated encoding.
    ///
    /// Distinct from "unknown": an opaque port has a resolved encoding whose concrete
    /// layout is left to the components on either side of the tunnel.
    Opaque,
}

impl Encoding {
    /// All encodings, in lexicon order.
    pub const ALL: [Encoding; 4] = [
        Encoding::Rgb24,
        Encoding::Rgba,
        Encoding::I420,
        Encoding::Opaque,
    ];

    /// Short configuration name.
    pub fn short_name(self) -> &'static str {
        match self {
            Encoding::Rgb24 => "rgb24",
            Encoding::Rgba => "rgba",
            Encoding::I420 => "i420",
            Encoding::Opaque => "opaque",
        }
    }

    /// Name of the runtime constant for this encoding.
    pub fn runtime_name(self) -> &'static str {
        match self {
            Encoding::Rgb24 => "MMAL_ENCODING_RGB24",
            Encoding::Rgba => "MMAL_ENCODING_RGBA",
            Encoding::I420 => "MMAL_ENCODING_I420",
            Encoding::Opaque => "MMAL_ENCODING_OPAQUE",
        }
    }
}

impl FromStr for Encoding {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::ALL
            .into_iter()
            .find(|e| e.short_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownName::new("encoding", s))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.runtime_name())
    }
}

/// Generated test patterns for the synthetic source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourcePattern {
    /// Solid white.
    White,
    /// Solid black.
    Black,
    /// Diagonal stripes.
    Diagonal,
    /// Noise.
    Noise,
    /// Random.
    Random,
    /// Multi-colour bars.
    Colour,
    /// Block pattern.
    Blocks,
    /// Swirl.
    Swirly,
}

impl SourcePattern {
    /// All patterns, in lexicon order.
    pub const ALL: [SourcePattern; 8] = [
        SourcePattern::White,
        SourcePattern::Black,
        SourcePattern::Diagonal,
        SourcePattern::Noise,
        SourcePattern::Random,
        SourcePattern::Colour,
        SourcePattern::Blocks,
        SourcePattern::Swirly,
    ];

    /// Short configuration name.
    pub fn short_name(self) -> &'static str {
        match self {
            SourcePattern::White => "white",
            SourcePattern::Black => "black",
            SourcePattern::Diagonal => "diagonal",
            SourcePattern::Noise => "noise",
            SourcePattern::Random => "random",
            SourcePattern::Colour => "colour",
            SourcePattern::Blocks => "blocks",
            SourcePattern::Swirly => "swirly",
        }
    }

    /// Name of the runtime constant for this pattern.
    pub fn runtime_name(self) -> &'static str {
        match self {
            SourcePattern::White => "MMAL_VIDEO_SOURCE_PATTERN_WHITE",
            SourcePattern::Black => "MMAL_VIDEO_SOURCE_PATTERN_BLACK",
            SourcePattern::Diagonal => "MMAL_VIDEO_SOURCE_PATTERN_DIAGONAL",
            SourcePattern::Noise => "MMAL_VIDEO_SOURCE_PATTERN_NOISE",
            SourcePattern::Random => "MMAL_VIDEO_SOURCE_PATTERN_RANDOM",
            SourcePattern::Colour => "MMAL_VIDEO_SOURCE_PATTERN_COLOUR",
            SourcePattern::Blocks => "MMAL_VIDEO_SOURCE_PATTERN_BLOCKS",
            SourcePattern::Swirly => "MMAL_VIDEO_SOURCE_PATTERN_SWIRLY",
        }
    }
}

impl FromStr for SourcePattern {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourcePattern::ALL
            .into_iter()
            .find(|p| p.short_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownName::new("source pattern", s))
    }
}

impl fmt::Display for SourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.runtime_name())
    }
}

/// Destination rectangle on a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// How a renderer input is placed on screen.
///
/// A rectangle and the fullscreen flag cannot both be set on one port, which this
/// type makes unrepresentable after loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRegion {
    /// Draw into a destination rectangle.
    Rect(Rect),
    /// Toggle fullscreen output.
    Fullscreen(bool),
}

/// One of the three format attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Frame width.
    Width,
    /// Frame height.
    Height,
    /// Pixel encoding.
    Encoding,
}

impl Attribute {
    /// All attributes, in propagation order.
    pub const ALL: [Attribute; 3] = [Attribute::Width, Attribute::Height, Attribute::Encoding];
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::Encoding => "encoding",
        })
    }
}

/// The value of a single attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    /// Width or height.
    Dimension(u32),
    /// Encoding.
    Encoding(Encoding),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Dimension(v) => write!(f, "{v}"),
            AttributeValue::Encoding(e) => write!(f, "{e}"),
        }
    }
}

/// Partially known format of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PortFormat {
    /// Frame width, if known.
    pub width: Option<u32>,
    /// Frame height, if known.
    pub height: Option<u32>,
    /// Pixel encoding, if known.
    pub encoding: Option<Encoding>,
}

impl PortFormat {
    /// A format with nothing known.
    pub const UNKNOWN: PortFormat = PortFormat {
        width: None,
        height: None,
        encoding: None,
    };

    /// Fully specified format.
    pub fn new(width: u32, height: u32, encoding: Encoding) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            encoding: Some(encoding),
        }
    }

    /// Get one attribute.
    pub fn get(&self, attribute: Attribute) -> Option<AttributeValue> {
        match attribute {
            Attribute::Width => self.width.map(AttributeValue::Dimension),
            Attribute::Height => self.height.map(AttributeValue::Dimension),
            Attribute::Encoding => self.encoding.map(AttributeValue::Encoding),
        }
    }

    /// Set one attribute.
    ///
    /// A value of the wrong shape for the attribute (e.g. an encoding for `Width`)
    /// is ignored.
    pub fn set(&mut self, attribute: Attribute, value: AttributeValue) {
        match (attribute, value) {
            (Attribute::Width, AttributeValue::Dimension(v)) => self.width = Some(v),
            (Attribute::Height, AttributeValue::Dimension(v)) => self.height = Some(v),
            (Attribute::Encoding, AttributeValue::Encoding(e)) => self.encoding = Some(e),
            _ => {}
        }
    }

    /// True if no attribute is known.
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.encoding.is_none()
    }

    /// Attributes that are still unknown.
    pub fn missing(&self) -> impl Iterator<Item = Attribute> + '_ {
        Attribute::ALL
            .into_iter()
            .filter(|&a| self.get(a).is_none())
    }

    /// Convert to a fixed format if all three attributes are known.
    pub fn fixate(&self) -> Option<VideoFormat> {
        Some(VideoFormat {
            width: self.width?,
            height: self.height?,
            encoding: self.encoding?,
        })
    }
}

impl fmt::Display for PortFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_any<T: fmt::Display>(v: Option<T>) -> String {
            v.map_or_else(|| "?".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "{}x{} {}",
            or_any(self.width),
            or_any(self.height),
            or_any(self.encoding)
        )
    }
}

/// Fully resolved port format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VideoFormat {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Pixel encoding.
    pub encoding: Encoding,
}

impl From<VideoFormat> for PortFormat {
    fn from(format: VideoFormat) -> Self {
        PortFormat::new(format.width, format.height, format.encoding)
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_lexicon_is_case_insensitive() {
        assert_eq!("RGB24".parse::<Encoding>().unwrap(), Encoding::Rgb24);
        assert_eq!("rgba".parse::<Encoding>().unwrap(), Encoding::Rgba);
        assert_eq!("Opaque".parse::<Encoding>().unwrap(), Encoding::Opaque);

        let err = "yuyv".parse::<Encoding>().unwrap_err();
        assert_eq!(err.lexicon, "encoding");
        assert_eq!(err.name, "yuyv");
    }

    #[test]
    fn test_source_pattern_lexicon() {
        assert_eq!(
            "Colour".parse::<SourcePattern>().unwrap(),
            SourcePattern::Colour
        );
        assert_eq!(
            SourcePattern::Swirly.runtime_name(),
            "MMAL_VIDEO_SOURCE_PATTERN_SWIRLY"
        );
        assert!("color".parse::<SourcePattern>().is_err());
    }

    #[test]
    fn test_port_format_get_set() {
        let mut format = PortFormat::default();
        assert!(format.is_empty());
        assert_eq!(format.missing().count(), 3);

        format.set(Attribute::Width, AttributeValue::Dimension(640));
        format.set(Attribute::Encoding, AttributeValue::Encoding(Encoding::I420));
        // Shape mismatch is ignored
        format.set(Attribute::Height, AttributeValue::Encoding(Encoding::Rgba));

        assert_eq!(format.get(Attribute::Width), Some(AttributeValue::Dimension(640)));
        assert_eq!(format.missing().collect::<Vec<_>>(), vec![Attribute::Height]);
        assert!(format.fixate().is_none());

        format.set(Attribute::Height, AttributeValue::Dimension(480));
        let fixed = format.fixate().unwrap();
        assert_eq!(fixed.to_string(), "640x480 MMAL_ENCODING_I420");
    }

    #[test]
    fn test_port_format_display_marks_unknowns() {
        let format = PortFormat {
            width: Some(1920),
            ..PortFormat::UNKNOWN
        };
        assert_eq!(format.to_string(), "1920x? ?");
    }
}
