use crate::modal::PathExtension;
use crate::primitives::{AString, NString, OffsetTable, PointList, PropertyValue, Real, Repetition, Validation};
use crate::reference::Ref;

#[derive(Debug, Clone, PartialEq)]
pub struct Start {
    pub version: AString,
    pub unit: Real,
    pub offset_table: Option<OffsetTable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct End {
    pub offset_table: Option<OffsetTable>,
    pub padding: Vec<u8>,
    pub validation: Validation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellName {
    pub name: NString,
    pub refnum: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextString {
    pub string: AString,
    pub refnum: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropName {
    pub name: NString,
    pub refnum: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropString {
    pub string: AString,
    pub refnum: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerName {
    pub name: NString,
    pub layer_interval: crate::primitives::Interval,
    pub type_interval: crate::primitives::Interval,
    pub is_text_layer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub reference: Ref<NString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XyMode {
    pub relative: bool,
}

impl XyMode {
    /// The complement of `relative`.
    #[must_use]
    pub fn absolute(&self) -> bool {
        !self.relative
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placement {
    pub name: Option<Ref<NString>>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
    pub flip: bool,
    /// Degrees, always a multiple of 90 when `magnification` is `None` or 1.0.
    pub angle: Option<f64>,
    pub magnification: Option<f64>,
}

impl Placement {
    /// Whether this placement can be encoded with the compact id-17 form:
    /// angle a multiple of 90 degrees and no non-unit magnification.
    #[must_use]
    pub fn fits_simple_id(&self) -> bool {
        let angle_is_right = self.angle.is_none_or(|a| a.rem_euclid(90.0) == 0.0);
        let magnification_is_unit = self.magnification.is_none_or(|m| m == 1.0);
        angle_is_right && magnification_is_unit
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub text: Option<Ref<AString>>,
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rectangle {
    pub is_square: bool,
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

impl Rectangle {
    /// Construction-time check: a square rectangle must not carry an
    /// explicit height.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.is_square && self.height.is_some() {
            return Err(crate::error::Error::MalformedRecord(
                "square rectangle must not carry an explicit height",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub point_list: Option<PointList>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

impl Polygon {
    pub fn validate(&self) -> crate::error::Result<()> {
        if let Some(points) = &self.point_list {
            if points.len() < 3 {
                return Err(crate::error::Error::MalformedRecord(
                    "polygon point list has fewer than 3 vertices",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub half_width: Option<u64>,
    pub extension_start: Option<PathExtension>,
    pub extension_end: Option<PathExtension>,
    pub point_list: Option<PointList>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trapezoid {
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub is_vertical: bool,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub delta_a: i64,
    pub delta_b: i64,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

impl Trapezoid {
    pub fn validate(&self) -> crate::error::Result<()> {
        let span = self.delta_b - self.delta_a;
        let bound = if self.is_vertical { self.height } else { self.width };
        if let Some(bound) = bound {
            if span > bound as i64 {
                return Err(crate::error::Error::MalformedRecord(
                    "trapezoid delta_b - delta_a exceeds the bounding dimension",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CTrapezoid {
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub ctrapezoid_type: Option<u8>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

impl CTrapezoid {
    pub fn validate(&self) -> crate::error::Result<()> {
        let Some(kind) = self.ctrapezoid_type else {
            return Ok(());
        };
        if matches!(kind, 20 | 21) && self.width.is_some() {
            return Err(crate::error::Error::MalformedRecord(
                "ctrapezoid type 20/21 forbids width",
            ));
        }
        if matches!(kind, 16..=19 | 22 | 23 | 25) && self.height.is_some() {
            return Err(crate::error::Error::MalformedRecord(
                "ctrapezoid type forbids height",
            ));
        }
        if let (Some(w), Some(h)) = (self.width, self.height) {
            let ok = match kind {
                0..=3 => w >= h,
                4..=7 => w >= 2 * h,
                8..=11 => w <= h,
                12..=15 => 2 * w <= h,
                _ => true,
            };
            if !ok {
                return Err(crate::error::Error::MalformedRecord(
                    "ctrapezoid width/height violate the type's constraint",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circle {
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub radius: Option<u64>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Property {
    pub name: Option<Ref<NString>>,
    pub values: Option<Vec<PropertyValue>>,
    pub is_standard: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XName {
    pub attribute: u64,
    pub bytes: Vec<u8>,
    pub refnum: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XElement {
    pub attribute: u64,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XGeometry {
    pub attribute: u64,
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub bytes: Vec<u8>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub repetition: Option<Repetition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CBlock {
    pub compression_type: u64,
    pub decompressed_byte_count: u64,
    pub compressed_bytes: Vec<u8>,
}

/// A single record of any variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Pad,
    Start(Start),
    End(End),
    CellName(CellName),
    TextString(TextString),
    PropName(PropName),
    PropString(PropString),
    LayerName(LayerName),
    Cell(Cell),
    XyMode(XyMode),
    Placement(Placement),
    Text(Text),
    Rectangle(Rectangle),
    Polygon(Polygon),
    Path(Path),
    Trapezoid(Trapezoid),
    CTrapezoid(CTrapezoid),
    Circle(Circle),
    Property(Property),
    XName(XName),
    XElement(XElement),
    XGeometry(XGeometry),
    CBlock(CBlock),
}

impl Record {
    /// Returns true if this is a `CBlock`.
    #[must_use]
    pub fn is_cblock(&self) -> bool {
        matches!(self, Self::CBlock(_))
    }

    /// If this is a `CBlock`, returns the associated value.
    #[must_use]
    pub fn as_cblock(&self) -> Option<&CBlock> {
        match self {
            Self::CBlock(block) => Some(block),
            _ => None,
        }
    }

    /// Whether this record type resets the entire modal bank on both
    /// merge and dedup.
    #[must_use]
    pub fn resets_modals(&self) -> bool {
        matches!(
            self,
            Self::Start(_)
                | Self::CellName(_)
                | Self::PropName(_)
                | Self::TextString(_)
                | Self::PropString(_)
                | Self::LayerName(_)
                | Self::XName(_)
                | Self::Cell(_)
        )
    }
}
