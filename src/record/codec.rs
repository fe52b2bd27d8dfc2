//! Per-variant wire encode/decode. A record's on-wire form is
//! `write_uint(id)` followed by the payload described for that id; there is
//! no length prefix at the record level.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::modal::PathExtension;
use crate::primitives::{
    read_astring, read_bool_byte, read_bstring, read_interval, read_nstring, read_point_list,
    read_property_value, read_real, read_repetition, read_sint, read_uint, read_validation,
    write_astring, write_bool_byte, write_bstring, write_interval, write_nstring, write_point_list,
    write_property_value, write_real, write_repetition, write_sint, write_uint, write_validation,
    AString, NString, PointListKind, Real,
};
use crate::primitives::{read_offset_table, write_offset_table, OffsetTable};
use crate::reference::Ref;

use super::types::*;

fn read_ref_name<R: Read>(r: &mut R, by_number: bool) -> Result<Ref<NString>> {
    if by_number {
        Ok(Ref::Number(read_uint(r)?))
    } else {
        Ok(Ref::Literal(read_nstring(r)?))
    }
}

fn write_ref_name<W: Write>(w: &mut W, value: &Ref<NString>) -> Result<()> {
    match value {
        Ref::Literal(name) => write_nstring(w, name),
        Ref::Number(n) => write_uint(w, *n),
    }
}

fn read_ref_string<R: Read>(r: &mut R, by_number: bool) -> Result<Ref<AString>> {
    if by_number {
        Ok(Ref::Number(read_uint(r)?))
    } else {
        Ok(Ref::Literal(read_astring(r)?))
    }
}

fn write_ref_string<W: Write>(w: &mut W, value: &Ref<AString>) -> Result<()> {
    match value {
        Ref::Literal(s) => write_astring(w, s),
        Ref::Number(n) => write_uint(w, *n),
    }
}

// --- Start / End -----------------------------------------------------------

pub fn read_start<R: Read>(r: &mut R) -> Result<Start> {
    let version = read_astring(r)?;
    if version.as_str() != "1.0" {
        return Err(Error::MalformedRecord("Start.version must be \"1.0\""));
    }
    let unit = read_real(r)?;
    if !unit.is_finite_positive() {
        return Err(Error::MalformedRecord("Start.unit must be a finite positive real"));
    }
    let has_offset_table = read_uint(r)?;
    let offset_table = match has_offset_table {
        0 => None,
        1 => Some(read_offset_table(r)?),
        _ => return Err(Error::MalformedRecord("Start.has_offset_table must be 0 or 1")),
    };
    Ok(Start {
        version,
        unit,
        offset_table,
    })
}

pub fn write_start<W: Write>(w: &mut W, value: &Start) -> Result<()> {
    if value.version.as_str() != "1.0" {
        return Err(Error::MalformedRecord("Start.version must be \"1.0\""));
    }
    if !value.unit.is_finite_positive() {
        return Err(Error::MalformedRecord("Start.unit must be a finite positive real"));
    }
    write_astring(w, &value.version)?;
    write_real(w, value.unit)?;
    match &value.offset_table {
        Some(table) => {
            write_uint(w, 1)?;
            write_offset_table(w, table)?;
        }
        None => write_uint(w, 0)?,
    }
    Ok(())
}

pub fn read_end<R: Read>(r: &mut R, offset_table_present: bool) -> Result<End> {
    let offset_table = if offset_table_present {
        Some(read_offset_table(r)?)
    } else {
        None
    };
    let padding = read_bstring(r)?;
    let validation = read_validation(r)?;
    Ok(End {
        offset_table,
        padding,
        validation,
    })
}

/// `End`'s padding isn't real payload: it's a deliberately overlong-encoded
/// empty `bstring` (a run of `0x80` continuation bytes followed by a `0x00`
/// terminator, decoding to length 0) whose sole purpose is to stretch the
/// record out to exactly 256 bytes. It's computed fresh on write rather than
/// replayed from `value.padding`.
pub fn write_end<W: Write>(w: &mut W, value: &End) -> Result<()> {
    // The `End` id (2) always fits the varint in a single byte.
    let mut size = 1usize;
    let mut offset_table_bytes = Vec::new();
    if let Some(table) = &value.offset_table {
        write_offset_table(&mut offset_table_bytes, table)?;
    }
    size += offset_table_bytes.len();

    let mut validation_bytes = Vec::new();
    write_validation(&mut validation_bytes, value.validation)?;

    w.write_all(&offset_table_bytes)?;

    if let Some(pad_len) = 256usize.checked_sub(size + validation_bytes.len()) {
        if pad_len > 0 {
            let mut pad = vec![0x80u8; pad_len - 1];
            pad.push(0x00);
            w.write_all(&pad)?;
        }
    }

    w.write_all(&validation_bytes)?;
    Ok(())
}

// --- Naming records ---------------------------------------------------------

macro_rules! nstring_naming_record {
    ($read_fn:ident, $write_fn:ident, $ty:ident, $field:ident) => {
        pub fn $read_fn<R: Read>(r: &mut R, has_refnum: bool) -> Result<$ty> {
            let $field = read_nstring(r)?;
            let refnum = if has_refnum { Some(read_uint(r)?) } else { None };
            Ok($ty { $field, refnum })
        }

        pub fn $write_fn<W: Write>(w: &mut W, value: &$ty) -> Result<()> {
            write_nstring(w, &value.$field)?;
            if let Some(refnum) = value.refnum {
                write_uint(w, refnum)?;
            }
            Ok(())
        }
    };
}

macro_rules! astring_naming_record {
    ($read_fn:ident, $write_fn:ident, $ty:ident, $field:ident) => {
        pub fn $read_fn<R: Read>(r: &mut R, has_refnum: bool) -> Result<$ty> {
            let $field = read_astring(r)?;
            let refnum = if has_refnum { Some(read_uint(r)?) } else { None };
            Ok($ty { $field, refnum })
        }

        pub fn $write_fn<W: Write>(w: &mut W, value: &$ty) -> Result<()> {
            write_astring(w, &value.$field)?;
            if let Some(refnum) = value.refnum {
                write_uint(w, refnum)?;
            }
            Ok(())
        }
    };
}

nstring_naming_record!(read_cell_name, write_cell_name, CellName, name);
nstring_naming_record!(read_prop_name, write_prop_name, PropName, name);
astring_naming_record!(read_text_string, write_text_string, TextString, string);
astring_naming_record!(read_prop_string, write_prop_string, PropString, string);

pub fn read_layer_name<R: Read>(r: &mut R, is_text_layer: bool) -> Result<LayerName> {
    let name = read_nstring(r)?;
    let layer_interval = read_interval(r)?;
    let type_interval = read_interval(r)?;
    Ok(LayerName {
        name,
        layer_interval,
        type_interval,
        is_text_layer,
    })
}

pub fn write_layer_name<W: Write>(w: &mut W, value: &LayerName) -> Result<()> {
    write_nstring(w, &value.name)?;
    write_interval(w, value.layer_interval)?;
    write_interval(w, value.type_interval)?;
    Ok(())
}

pub fn read_cell<R: Read>(r: &mut R, by_refnum: bool) -> Result<Cell> {
    let reference = if by_refnum {
        Ref::Number(read_uint(r)?)
    } else {
        Ref::Literal(read_nstring(r)?)
    };
    Ok(Cell { reference })
}

pub fn write_cell<W: Write>(w: &mut W, value: &Cell) -> Result<()> {
    write_ref_name(w, &value.reference)
}

// --- XYMode ------------------------------------------------------------------

#[must_use]
pub fn xy_mode_id(relative: bool) -> u8 {
    if relative {
        16
    } else {
        15
    }
}

// --- Placement -----------------------------------------------------------

pub fn read_placement<R: Read>(r: &mut R, id: u8) -> Result<Placement> {
    let bits = read_bool_byte(r)?;
    let (c, n, x, y, rep) = (bits[0], bits[1], bits[2], bits[3], bits[4]);

    let name = if c {
        Some(read_ref_name(r, n)?)
    } else {
        None
    };

    // Payload order is name, magnification, angle, x, y, repetition — the
    // header's bit order (C,N,X,Y,R,...) doesn't match the field order on
    // the wire.
    match id {
        17 => {
            let (a1, a2, flip) = (bits[5], bits[6], bits[7]);
            let angle_quarter_turns = u8::from(a1) * 2 + u8::from(a2);
            let xval = if x { Some(read_sint(r)?) } else { None };
            let yval = if y { Some(read_sint(r)?) } else { None };
            let repetition = if rep { Some(read_repetition(r)?) } else { None };
            Ok(Placement {
                name,
                x: xval,
                y: yval,
                repetition,
                flip,
                angle: Some(f64::from(angle_quarter_turns) * 90.0),
                magnification: None,
            })
        }
        18 => {
            let (m, a, flip) = (bits[5], bits[6], bits[7]);
            let magnification = if m { Some(read_real(r)?.to_f64()) } else { None };
            let angle = if a { Some(read_real(r)?.to_f64()) } else { None };
            let xval = if x { Some(read_sint(r)?) } else { None };
            let yval = if y { Some(read_sint(r)?) } else { None };
            let repetition = if rep { Some(read_repetition(r)?) } else { None };
            Ok(Placement {
                name,
                x: xval,
                y: yval,
                repetition,
                flip,
                angle,
                magnification,
            })
        }
        other => Err(Error::UnexpectedId(u64::from(other))),
    }
}

pub fn write_placement<W: Write>(w: &mut W, value: &Placement) -> Result<u8> {
    let c = value.name.is_some();
    let n = matches!(value.name, Some(Ref::Number(_)));
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();

    let id = if value.fits_simple_id() { 17 } else { 18 };

    if id == 17 {
        let quarter_turns = ((value.angle.unwrap_or(0.0) / 90.0).round() as i64).rem_euclid(4) as u8;
        let a1 = quarter_turns & 0b10 != 0;
        let a2 = quarter_turns & 0b01 != 0;
        write_bool_byte(w, [c, n, x, y, rep, a1, a2, value.flip])?;
    } else {
        let m = value.magnification.is_some();
        let a = value.angle.is_some();
        write_bool_byte(w, [c, n, x, y, rep, m, a, value.flip])?;
    }

    if let Some(name) = &value.name {
        write_ref_name(w, name)?;
    }
    if id == 18 {
        if let Some(mag) = value.magnification {
            write_real(w, Real::Float64(mag))?;
        }
        if let Some(angle) = value.angle {
            write_real(w, Real::Float64(angle))?;
        }
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(repv) = &value.repetition {
        write_repetition(w, repv)?;
    }
    Ok(id)
}

// --- Text ------------------------------------------------------------------

pub fn read_text<R: Read>(r: &mut R) -> Result<Text> {
    let bits = read_bool_byte(r)?;
    if bits[0] {
        return Err(Error::MalformedHeader("Text header reserved bit is nonzero"));
    }
    let (c, n, x, y, rep, d, l) = (bits[1], bits[2], bits[3], bits[4], bits[5], bits[6], bits[7]);

    let text = if c { Some(read_ref_string(r, n)?) } else { None };
    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    Ok(Text {
        text,
        layer,
        datatype,
        x: xval,
        y: yval,
        repetition,
    })
}

pub fn write_text<W: Write>(w: &mut W, value: &Text) -> Result<()> {
    let c = value.text.is_some();
    let n = matches!(value.text, Some(Ref::Number(_)));
    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    write_bool_byte(w, [false, c, n, x, y, rep, d, l])?;

    if let Some(text) = &value.text {
        write_ref_string(w, text)?;
    }
    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(())
}

// --- Rectangle ---------------------------------------------------------------

pub fn read_rectangle<R: Read>(r: &mut R) -> Result<Rectangle> {
    let bits = read_bool_byte(r)?;
    let (s, wbit, hbit, x, y, rep, d, l) =
        (bits[0], bits[1], bits[2], bits[3], bits[4], bits[5], bits[6], bits[7]);
    if s && hbit {
        return Err(Error::MalformedHeader("square rectangle must not set the height bit"));
    }

    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let width = if wbit { Some(read_uint(r)?) } else { None };
    let height = if hbit { Some(read_uint(r)?) } else { None };
    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    let rect = Rectangle {
        is_square: s,
        layer,
        datatype,
        width,
        height,
        x: xval,
        y: yval,
        repetition,
    };
    rect.validate()?;
    Ok(rect)
}

pub fn write_rectangle<W: Write>(w: &mut W, value: &Rectangle) -> Result<()> {
    value.validate()?;
    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let wbit = value.width.is_some();
    let hbit = value.height.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    write_bool_byte(w, [value.is_square, wbit, hbit, x, y, rep, d, l])?;

    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    if let Some(width) = value.width {
        write_uint(w, width)?;
    }
    if let Some(height) = value.height {
        write_uint(w, height)?;
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(())
}

// --- Polygon -------------------------------------------------------------

pub fn read_polygon<R: Read>(r: &mut R) -> Result<Polygon> {
    let bits = read_bool_byte(r)?;
    if bits[0] || bits[1] {
        return Err(Error::MalformedHeader("Polygon header reserved bits are nonzero"));
    }
    let (p, x, y, rep, d, l) = (bits[2], bits[3], bits[4], bits[5], bits[6], bits[7]);

    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let point_list = if p {
        Some(read_point_list(r)?.1)
    } else {
        None
    };
    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    let polygon = Polygon {
        layer,
        datatype,
        point_list,
        x: xval,
        y: yval,
        repetition,
    };
    polygon.validate()?;
    Ok(polygon)
}

pub fn write_polygon<W: Write>(w: &mut W, value: &Polygon) -> Result<()> {
    value.validate()?;
    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let p = value.point_list.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    write_bool_byte(w, [false, false, p, x, y, rep, d, l])?;

    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    if let Some(points) = &value.point_list {
        write_point_list(w, PointListKind::General, points)?;
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(())
}

// --- Path ------------------------------------------------------------------

fn extension_scheme(ext: Option<PathExtension>) -> u64 {
    match ext {
        None => 0,
        Some(PathExtension::Flush) => 1,
        Some(PathExtension::HalfWidth) => 2,
        Some(PathExtension::Arbitrary(_)) => 3,
    }
}

pub fn read_path<R: Read>(r: &mut R) -> Result<Path> {
    let bits = read_bool_byte(r)?;
    let (e, wbit, p, x, y, rep, d, l) =
        (bits[0], bits[1], bits[2], bits[3], bits[4], bits[5], bits[6], bits[7]);

    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let half_width = if wbit { Some(read_uint(r)?) } else { None };

    let (extension_start, extension_end) = if e {
        let code = read_uint(r)?;
        let end_scheme = code & 0x3;
        let start_scheme = (code >> 2) & 0x3;
        let start = if start_scheme == 3 {
            Some(PathExtension::Arbitrary(read_sint(r)?))
        } else {
            decode_scheme(start_scheme)
        };
        let end = if end_scheme == 3 {
            Some(PathExtension::Arbitrary(read_sint(r)?))
        } else {
            decode_scheme(end_scheme)
        };
        (start, end)
    } else {
        (None, None)
    };

    let point_list = if p {
        Some(read_point_list(r)?.1)
    } else {
        None
    };
    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    Ok(Path {
        layer,
        datatype,
        half_width,
        extension_start,
        extension_end,
        point_list,
        x: xval,
        y: yval,
        repetition,
    })
}

fn decode_scheme(code: u64) -> Option<PathExtension> {
    match code {
        1 => Some(PathExtension::Flush),
        2 => Some(PathExtension::HalfWidth),
        _ => None,
    }
}

pub fn write_path<W: Write>(w: &mut W, value: &Path) -> Result<()> {
    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let wbit = value.half_width.is_some();
    let p = value.point_list.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    let e = value.extension_start.is_some() || value.extension_end.is_some();
    write_bool_byte(w, [e, wbit, p, x, y, rep, d, l])?;

    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    if let Some(half_width) = value.half_width {
        write_uint(w, half_width)?;
    }
    if e {
        let start_scheme = extension_scheme(value.extension_start);
        let end_scheme = extension_scheme(value.extension_end);
        write_uint(w, (start_scheme << 2) | end_scheme)?;
        if let Some(PathExtension::Arbitrary(v)) = value.extension_start {
            write_sint(w, v)?;
        }
        if let Some(PathExtension::Arbitrary(v)) = value.extension_end {
            write_sint(w, v)?;
        }
    }
    if let Some(points) = &value.point_list {
        write_point_list(w, PointListKind::General, points)?;
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(())
}

// --- Trapezoid -------------------------------------------------------------

pub fn read_trapezoid<R: Read>(r: &mut R, id: u8) -> Result<Trapezoid> {
    let bits = read_bool_byte(r)?;
    let (v, wbit, hbit, x, y, rep, d, l) =
        (bits[0], bits[1], bits[2], bits[3], bits[4], bits[5], bits[6], bits[7]);

    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let width = if wbit { Some(read_uint(r)?) } else { None };
    let height = if hbit { Some(read_uint(r)?) } else { None };

    let delta_a = if id != 25 { read_sint(r)? } else { 0 };
    let delta_b = if id != 24 { read_sint(r)? } else { 0 };

    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    let trap = Trapezoid {
        layer,
        datatype,
        is_vertical: v,
        width,
        height,
        delta_a,
        delta_b,
        x: xval,
        y: yval,
        repetition,
    };
    trap.validate()?;
    Ok(trap)
}

pub fn write_trapezoid<W: Write>(w: &mut W, value: &Trapezoid) -> Result<u8> {
    value.validate()?;
    let id = if value.delta_b == 0 && value.delta_a != 0 {
        24
    } else if value.delta_a == 0 && value.delta_b != 0 {
        25
    } else if value.delta_a == 0 && value.delta_b == 0 {
        24
    } else {
        23
    };

    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let wbit = value.width.is_some();
    let hbit = value.height.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    write_bool_byte(w, [value.is_vertical, wbit, hbit, x, y, rep, d, l])?;

    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    if let Some(width) = value.width {
        write_uint(w, width)?;
    }
    if let Some(height) = value.height {
        write_uint(w, height)?;
    }
    if id != 25 {
        write_sint(w, value.delta_a)?;
    }
    if id != 24 {
        write_sint(w, value.delta_b)?;
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(id)
}

// --- CTrapezoid -----------------------------------------------------------

pub fn read_ctrapezoid<R: Read>(r: &mut R) -> Result<CTrapezoid> {
    let bits = read_bool_byte(r)?;
    let (t, wbit, hbit, x, y, rep, d, l) =
        (bits[0], bits[1], bits[2], bits[3], bits[4], bits[5], bits[6], bits[7]);

    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let ctrapezoid_type = if t { Some(read_uint(r)?.try_into().map_err(|_| {
        Error::MalformedRecord("ctrapezoid type does not fit in a byte")
    })?) } else { None };
    let width = if wbit { Some(read_uint(r)?) } else { None };
    let height = if hbit { Some(read_uint(r)?) } else { None };
    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    let trap = CTrapezoid {
        layer,
        datatype,
        ctrapezoid_type,
        width,
        height,
        x: xval,
        y: yval,
        repetition,
    };
    trap.validate()?;
    Ok(trap)
}

pub fn write_ctrapezoid<W: Write>(w: &mut W, value: &CTrapezoid) -> Result<()> {
    value.validate()?;
    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let t = value.ctrapezoid_type.is_some();
    let wbit = value.width.is_some();
    let hbit = value.height.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    write_bool_byte(w, [t, wbit, hbit, x, y, rep, d, l])?;

    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    if let Some(kind) = value.ctrapezoid_type {
        write_uint(w, u64::from(kind))?;
    }
    if let Some(width) = value.width {
        write_uint(w, width)?;
    }
    if let Some(height) = value.height {
        write_uint(w, height)?;
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(())
}

// --- Circle ----------------------------------------------------------------

pub fn read_circle<R: Read>(r: &mut R) -> Result<Circle> {
    let bits = read_bool_byte(r)?;
    if bits[0] || bits[1] {
        return Err(Error::MalformedHeader("Circle header reserved bits are nonzero"));
    }
    let (s, x, y, rep, d, l) = (bits[2], bits[3], bits[4], bits[5], bits[6], bits[7]);

    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let radius = if s { Some(read_uint(r)?) } else { None };
    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    Ok(Circle {
        layer,
        datatype,
        radius,
        x: xval,
        y: yval,
        repetition,
    })
}

pub fn write_circle<W: Write>(w: &mut W, value: &Circle) -> Result<()> {
    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let s = value.radius.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    write_bool_byte(w, [false, false, s, x, y, rep, d, l])?;

    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    if let Some(radius) = value.radius {
        write_uint(w, radius)?;
    }
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(())
}

// --- Property --------------------------------------------------------------

pub fn read_property<R: Read>(r: &mut R, id: u8) -> Result<Property> {
    if id == 29 {
        return Ok(Property {
            name: None,
            values: None,
            is_standard: None,
        });
    }

    let mut byte = [0u8; 1];
    r.read_exact(&mut byte)?;
    let byte = byte[0];
    let count_tag = byte >> 4;
    let v = (byte >> 3) & 1 != 0;
    let c = (byte >> 2) & 1 != 0;
    let n = (byte >> 1) & 1 != 0;
    let s = byte & 1 != 0;

    if v && count_tag != 0 {
        return Err(Error::MalformedHeader("Property header: V=1 requires a zero count nibble"));
    }

    let name = if c { Some(read_ref_name(r, n)?) } else { None };

    let values = if v {
        None
    } else {
        let count = if count_tag < 15 {
            u64::from(count_tag)
        } else {
            read_uint(r)?
        };
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            values.push(read_property_value(r)?);
        }
        Some(values)
    };

    Ok(Property {
        name,
        values,
        is_standard: Some(s),
    })
}

pub fn write_property<W: Write>(w: &mut W, value: &Property) -> Result<u8> {
    if value.name.is_none() && value.values.is_none() && value.is_standard.is_none() {
        return Ok(29);
    }

    let c = value.name.is_some();
    let n = matches!(value.name, Some(Ref::Number(_)));
    let s = value.is_standard.unwrap_or(false);
    let v = value.values.is_none();

    let count = value.values.as_ref().map_or(0, Vec::len);
    let count_tag: u8 = if v {
        0
    } else if count < 15 {
        count as u8
    } else {
        15
    };

    let byte = (count_tag << 4) | (u8::from(v) << 3) | (u8::from(c) << 2) | (u8::from(n) << 1) | u8::from(s);
    w.write_all(&[byte])?;

    if let Some(name) = &value.name {
        write_ref_name(w, name)?;
    }
    if !v {
        if count_tag == 15 {
            write_uint(w, count as u64)?;
        }
        for value in value.values.as_ref().unwrap() {
            write_property_value(w, value)?;
        }
    }
    Ok(28)
}

// --- XName / XElement / XGeometry -------------------------------------------

pub fn read_xname<R: Read>(r: &mut R, has_refnum: bool) -> Result<XName> {
    let attribute = read_uint(r)?;
    let bytes = read_bstring(r)?;
    let refnum = if has_refnum { Some(read_uint(r)?) } else { None };
    Ok(XName {
        attribute,
        bytes,
        refnum,
    })
}

pub fn write_xname<W: Write>(w: &mut W, value: &XName) -> Result<()> {
    write_uint(w, value.attribute)?;
    write_bstring(w, &value.bytes)?;
    if let Some(refnum) = value.refnum {
        write_uint(w, refnum)?;
    }
    Ok(())
}

pub fn read_xelement<R: Read>(r: &mut R) -> Result<XElement> {
    let attribute = read_uint(r)?;
    let bytes = read_bstring(r)?;
    Ok(XElement { attribute, bytes })
}

pub fn write_xelement<W: Write>(w: &mut W, value: &XElement) -> Result<()> {
    write_uint(w, value.attribute)?;
    write_bstring(w, &value.bytes)?;
    Ok(())
}

pub fn read_xgeometry<R: Read>(r: &mut R) -> Result<XGeometry> {
    let bits = read_bool_byte(r)?;
    if bits[0] || bits[1] || bits[2] {
        return Err(Error::MalformedHeader("XGeometry header reserved bits are nonzero"));
    }
    let (x, y, rep, d, l) = (bits[3], bits[4], bits[5], bits[6], bits[7]);

    let attribute = read_uint(r)?;
    let layer = if l { Some(read_uint(r)?) } else { None };
    let datatype = if d { Some(read_uint(r)?) } else { None };
    let bytes = read_bstring(r)?;
    let xval = if x { Some(read_sint(r)?) } else { None };
    let yval = if y { Some(read_sint(r)?) } else { None };
    let repetition = if rep { Some(read_repetition(r)?) } else { None };

    Ok(XGeometry {
        attribute,
        layer,
        datatype,
        bytes,
        x: xval,
        y: yval,
        repetition,
    })
}

pub fn write_xgeometry<W: Write>(w: &mut W, value: &XGeometry) -> Result<()> {
    let l = value.layer.is_some();
    let d = value.datatype.is_some();
    let x = value.x.is_some();
    let y = value.y.is_some();
    let rep = value.repetition.is_some();
    write_bool_byte(w, [false, false, false, x, y, rep, d, l])?;

    write_uint(w, value.attribute)?;
    if let Some(layer) = value.layer {
        write_uint(w, layer)?;
    }
    if let Some(datatype) = value.datatype {
        write_uint(w, datatype)?;
    }
    write_bstring(w, &value.bytes)?;
    if let Some(xv) = value.x {
        write_sint(w, xv)?;
    }
    if let Some(yv) = value.y {
        write_sint(w, yv)?;
    }
    if let Some(rep) = &value.repetition {
        write_repetition(w, rep)?;
    }
    Ok(())
}

// --- CBlock ------------------------------------------------------------------

pub fn read_cblock_payload<R: Read>(r: &mut R) -> Result<CBlock> {
    let compression_type = read_uint(r)?;
    let decompressed_byte_count = read_uint(r)?;
    let compressed_bytes = read_bstring(r)?;
    Ok(CBlock {
        compression_type,
        decompressed_byte_count,
        compressed_bytes,
    })
}

pub fn write_cblock_payload<W: Write>(w: &mut W, value: &CBlock) -> Result<()> {
    write_uint(w, value.compression_type)?;
    write_uint(w, value.decompressed_byte_count)?;
    write_bstring(w, &value.compressed_bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pad_record_bytes() {
        let mut buf = Vec::new();
        write_uint(&mut buf, 0).unwrap();
        assert_eq!(buf, vec![0x00]);
    }

    #[test]
    fn test_xy_mode_toggle_bytes() {
        let mut buf = Vec::new();
        write_uint(&mut buf, u64::from(xy_mode_id(false))).unwrap();
        assert_eq!(buf, vec![0x0f]);

        let mut buf = Vec::new();
        write_uint(&mut buf, u64::from(xy_mode_id(true))).unwrap();
        assert_eq!(buf, vec![0x10]);
    }

    #[test]
    fn test_rectangle_square_rejects_height() {
        let rect = Rectangle {
            is_square: true,
            height: Some(5),
            ..Default::default()
        };
        let mut buf = Vec::new();
        assert!(write_rectangle(&mut buf, &rect).is_err());
    }

    #[test]
    fn test_rectangle_roundtrip() {
        let rect = Rectangle {
            is_square: false,
            layer: Some(1),
            datatype: Some(0),
            width: Some(100),
            height: Some(50),
            x: Some(10),
            y: Some(20),
            repetition: None,
        };
        let mut buf = Vec::new();
        write_rectangle(&mut buf, &rect).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_rectangle(&mut cursor).unwrap(), rect);
    }

    #[test]
    fn test_trapezoid_id_selection() {
        let trap = Trapezoid {
            layer: None,
            datatype: None,
            is_vertical: false,
            width: Some(100),
            height: Some(50),
            delta_a: 10,
            delta_b: 0,
            x: None,
            y: None,
            repetition: None,
        };
        let mut buf = Vec::new();
        let id = write_trapezoid(&mut buf, &trap).unwrap();
        assert_eq!(id, 24);
        let mut cursor = Cursor::new(buf);
        let decoded = read_trapezoid(&mut cursor, id).unwrap();
        assert_eq!(decoded.delta_b, 0);
        assert_eq!(decoded.delta_a, 10);
    }

    #[test]
    fn test_property_id_choice() {
        let empty = Property::default();
        let mut buf = Vec::new();
        assert_eq!(write_property(&mut buf, &empty).unwrap(), 29);

        let standard = Property {
            is_standard: Some(true),
            ..Default::default()
        };
        let mut buf = Vec::new();
        let id = write_property(&mut buf, &standard).unwrap();
        assert_eq!(id, 28);
        assert_eq!(buf[0], 0b0000_0001);
    }

    #[test]
    fn test_placement_id_selection() {
        let simple = Placement {
            angle: Some(180.0),
            magnification: None,
            ..Default::default()
        };
        assert!(simple.fits_simple_id());

        let general = Placement {
            angle: Some(180.0),
            magnification: Some(2.0),
            ..Default::default()
        };
        assert!(!general.fits_simple_id());
    }

    #[test]
    fn test_placement_general_payload_order_is_name_mag_angle_xy() {
        let placement = Placement {
            name: Some(Ref::Literal(crate::primitives::NString::new("CELL").unwrap())),
            x: Some(5),
            y: Some(7),
            repetition: None,
            flip: false,
            angle: Some(45.0),
            magnification: Some(2.0),
        };
        let mut buf = Vec::new();
        let id = write_placement(&mut buf, &placement).unwrap();
        assert_eq!(id, 18);
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_placement(&mut cursor, id).unwrap(), placement);
    }

    #[test]
    fn test_ctrapezoid_type_20_forbids_width_but_allows_height() {
        let bad = CTrapezoid {
            ctrapezoid_type: Some(20),
            width: Some(5),
            ..Default::default()
        };
        let mut buf = Vec::new();
        assert!(write_ctrapezoid(&mut buf, &bad).is_err());

        let good = CTrapezoid {
            ctrapezoid_type: Some(20),
            height: Some(5),
            ..Default::default()
        };
        let mut buf = Vec::new();
        write_ctrapezoid(&mut buf, &good).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_ctrapezoid(&mut cursor).unwrap(), good);
    }

    #[test]
    fn test_ctrapezoid_type_16_forbids_height() {
        let bad = CTrapezoid {
            ctrapezoid_type: Some(16),
            height: Some(5),
            ..Default::default()
        };
        let mut buf = Vec::new();
        assert!(write_ctrapezoid(&mut buf, &bad).is_err());
    }
}
