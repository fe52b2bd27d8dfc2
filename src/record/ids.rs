use num_enum::TryFromPrimitive;

/// The numeric record id that tags a record's start byte.
///
/// Several record types split into two or three ids differing only in
/// which optional trailing field is present (a reference number, a
/// delta, or a coordinate mode); each such id still gets its own variant
/// here so that dispatch is a single `match`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum RecordId {
    Pad = 0,
    Start = 1,
    End = 2,
    CellNameImplicit = 3,
    CellNameExplicit = 4,
    TextStringImplicit = 5,
    TextStringExplicit = 6,
    PropNameImplicit = 7,
    PropNameExplicit = 8,
    PropStringImplicit = 9,
    PropStringExplicit = 10,
    LayerName = 11,
    LayerNameText = 12,
    CellByRef = 13,
    CellByName = 14,
    XyAbsolute = 15,
    XyRelative = 16,
    PlacementSimple = 17,
    PlacementGeneral = 18,
    Text = 19,
    Rectangle = 20,
    Polygon = 21,
    Path = 22,
    TrapezoidBothDeltas = 23,
    TrapezoidDeltaAOnly = 24,
    TrapezoidDeltaBOnly = 25,
    CTrapezoid = 26,
    Circle = 27,
    Property = 28,
    PropertyRepeat = 29,
    XNameImplicit = 30,
    XNameExplicit = 31,
    XElement = 32,
    XGeometry = 33,
    CBlock = 34,
}
