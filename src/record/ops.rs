//! Per-variant merge (decode-side fill) and dedup (encode-side strip)
//! functions. Each one is a fixed-order sequence of calls into
//! [`crate::modal`]; no record type touches the [`Modals`] bank any other
//! way.

use crate::error::Result;
use crate::modal::{
    dedup_coordinates, dedup_field, dedup_repetition, merge_coordinates, merge_field, merge_repetition,
    Modals,
};

use super::types::*;

/// Applies an `XyMode` record's effect: switches the bank's relative/absolute
/// coordinate mode for every later record. Not a merge/dedup in the field
/// sense — `XyMode` never carries an optional value, so there is nothing to
/// fill or strip.
pub fn apply_xy_mode(modals: &mut Modals, mode: XyMode) {
    modals.xy_relative = mode.relative;
}

pub fn merge_placement(record: &mut Placement, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.name, &mut modals.placement_cell, "placement name")?;
    merge_coordinates(
        &mut record.x,
        &mut record.y,
        &mut modals.placement_x,
        &mut modals.placement_y,
        modals.xy_relative,
    );
    merge_repetition(&mut record.repetition, &mut modals.repetition)?;
    Ok(())
}

pub fn dedup_placement(record: &mut Placement, modals: &mut Modals) -> Result<()> {
    dedup_field(&mut record.name, &mut modals.placement_cell, "placement name")?;
    dedup_coordinates(
        &mut record.x,
        &mut record.y,
        &mut modals.placement_x,
        &mut modals.placement_y,
        modals.xy_relative,
    );
    dedup_repetition(&mut record.repetition, &mut modals.repetition);
    Ok(())
}

pub fn merge_text(record: &mut Text, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.text, &mut modals.text_string, "text string")?;
    merge_field(&mut record.layer, &mut modals.text_layer, "text layer")?;
    merge_field(&mut record.datatype, &mut modals.text_datatype, "text datatype")?;
    merge_coordinates(
        &mut record.x,
        &mut record.y,
        &mut modals.text_x,
        &mut modals.text_y,
        modals.xy_relative,
    );
    merge_repetition(&mut record.repetition, &mut modals.repetition)?;
    Ok(())
}

pub fn dedup_text(record: &mut Text, modals: &mut Modals) -> Result<()> {
    dedup_field(&mut record.text, &mut modals.text_string, "text string")?;
    dedup_field(&mut record.layer, &mut modals.text_layer, "text layer")?;
    dedup_field(&mut record.datatype, &mut modals.text_datatype, "text datatype")?;
    dedup_coordinates(
        &mut record.x,
        &mut record.y,
        &mut modals.text_x,
        &mut modals.text_y,
        modals.xy_relative,
    );
    dedup_repetition(&mut record.repetition, &mut modals.repetition);
    Ok(())
}

fn merge_geometry_common(
    layer: &mut Option<u64>,
    datatype: &mut Option<u64>,
    x: &mut Option<i64>,
    y: &mut Option<i64>,
    repetition: &mut Option<crate::primitives::Repetition>,
    modals: &mut Modals,
) -> Result<()> {
    merge_field(layer, &mut modals.layer, "layer")?;
    merge_field(datatype, &mut modals.datatype, "datatype")?;
    merge_coordinates(x, y, &mut modals.geometry_x, &mut modals.geometry_y, modals.xy_relative);
    merge_repetition(repetition, &mut modals.repetition)?;
    Ok(())
}

fn dedup_geometry_common(
    layer: &mut Option<u64>,
    datatype: &mut Option<u64>,
    x: &mut Option<i64>,
    y: &mut Option<i64>,
    repetition: &mut Option<crate::primitives::Repetition>,
    modals: &mut Modals,
) -> Result<()> {
    dedup_field(layer, &mut modals.layer, "layer")?;
    dedup_field(datatype, &mut modals.datatype, "datatype")?;
    dedup_coordinates(x, y, &mut modals.geometry_x, &mut modals.geometry_y, modals.xy_relative);
    dedup_repetition(repetition, &mut modals.repetition);
    Ok(())
}

pub fn merge_rectangle(record: &mut Rectangle, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.width, &mut modals.geometry_w, "width")?;
    if record.is_square {
        let mut mirror = record.width;
        merge_field(&mut mirror, &mut modals.geometry_h, "height")?;
        record.height = None;
    } else {
        merge_field(&mut record.height, &mut modals.geometry_h, "height")?;
    }
    merge_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn dedup_rectangle(record: &mut Rectangle, modals: &mut Modals) -> Result<()> {
    if record.is_square {
        let side = record.width;
        let mut width_mirror = side;
        dedup_field(&mut width_mirror, &mut modals.geometry_w, "width")?;
        record.width = width_mirror;
        let mut height_mirror = side;
        dedup_field(&mut height_mirror, &mut modals.geometry_h, "height")?;
        record.height = None;
    } else {
        dedup_field(&mut record.width, &mut modals.geometry_w, "width")?;
        dedup_field(&mut record.height, &mut modals.geometry_h, "height")?;
    }
    dedup_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn merge_polygon(record: &mut Polygon, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.point_list, &mut modals.polygon_point_list, "point list")?;
    merge_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn dedup_polygon(record: &mut Polygon, modals: &mut Modals) -> Result<()> {
    dedup_field(&mut record.point_list, &mut modals.polygon_point_list, "point list")?;
    dedup_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

/// A path's extensions have a well-defined default (the device's implicit
/// end cap) when neither the record nor the modal bank has ever set one, so
/// — unlike the other per-variant fields — absence on both sides is not an
/// error.
fn merge_optional<T: Clone>(record: &mut Option<T>, modal: &mut Option<T>) {
    if let Some(value) = record.as_ref() {
        *modal = Some(value.clone());
    } else if let Some(value) = modal.as_ref() {
        *record = Some(value.clone());
    }
}

fn dedup_optional<T: Clone + PartialEq>(record: &mut Option<T>, modal: &mut Option<T>) {
    match record.as_ref() {
        Some(value) if Some(value) == modal.as_ref() => *record = None,
        Some(value) => *modal = Some(value.clone()),
        None => {}
    }
}

pub fn merge_path(record: &mut Path, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.half_width, &mut modals.path_halfwidth, "half width")?;
    merge_optional(&mut record.extension_start, &mut modals.path_extension_start);
    merge_optional(&mut record.extension_end, &mut modals.path_extension_end);
    merge_field(&mut record.point_list, &mut modals.path_point_list, "point list")?;
    merge_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn dedup_path(record: &mut Path, modals: &mut Modals) -> Result<()> {
    dedup_field(&mut record.half_width, &mut modals.path_halfwidth, "half width")?;
    dedup_optional(&mut record.extension_start, &mut modals.path_extension_start);
    dedup_optional(&mut record.extension_end, &mut modals.path_extension_end);
    dedup_field(&mut record.point_list, &mut modals.path_point_list, "point list")?;
    dedup_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn merge_trapezoid(record: &mut Trapezoid, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.width, &mut modals.geometry_w, "width")?;
    merge_field(&mut record.height, &mut modals.geometry_h, "height")?;
    merge_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )?;
    record.validate()
}

pub fn dedup_trapezoid(record: &mut Trapezoid, modals: &mut Modals) -> Result<()> {
    record.validate()?;
    dedup_field(&mut record.width, &mut modals.geometry_w, "width")?;
    dedup_field(&mut record.height, &mut modals.geometry_h, "height")?;
    dedup_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

/// `CTrapezoid` validates unconditionally after merge — unlike `Trapezoid`,
/// whose deltas are always present and checked before modal fill, a
/// `CTrapezoid`'s width/height may only become known once filled from the
/// modal bank, so the type-constraint check has to come after.
/// Type 20/21 carries no width; types 16-19, 22, 23, 25 carry no height.
/// Those fields are left untouched by modal fill/dedup for the types that
/// forbid them, instead of unconditionally reading from or writing to the
/// shared geometry modal.
fn ctrapezoid_has_width(kind: Option<u8>) -> bool {
    !matches!(kind, Some(20 | 21))
}

fn ctrapezoid_has_height(kind: Option<u8>) -> bool {
    !matches!(kind, Some(16..=19 | 22 | 23 | 25))
}

pub fn merge_ctrapezoid(record: &mut CTrapezoid, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.ctrapezoid_type, &mut modals.ctrapezoid_type, "ctrapezoid type")?;
    if ctrapezoid_has_width(record.ctrapezoid_type) {
        merge_field(&mut record.width, &mut modals.geometry_w, "width")?;
    }
    if ctrapezoid_has_height(record.ctrapezoid_type) {
        merge_field(&mut record.height, &mut modals.geometry_h, "height")?;
    }
    merge_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )?;
    record.validate()
}

pub fn dedup_ctrapezoid(record: &mut CTrapezoid, modals: &mut Modals) -> Result<()> {
    record.validate()?;
    dedup_field(&mut record.ctrapezoid_type, &mut modals.ctrapezoid_type, "ctrapezoid type")?;
    if ctrapezoid_has_width(record.ctrapezoid_type) {
        dedup_field(&mut record.width, &mut modals.geometry_w, "width")?;
    }
    if ctrapezoid_has_height(record.ctrapezoid_type) {
        dedup_field(&mut record.height, &mut modals.geometry_h, "height")?;
    }
    dedup_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn merge_circle(record: &mut Circle, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.radius, &mut modals.circle_radius, "radius")?;
    merge_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn dedup_circle(record: &mut Circle, modals: &mut Modals) -> Result<()> {
    dedup_field(&mut record.radius, &mut modals.circle_radius, "radius")?;
    dedup_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn merge_xgeometry(record: &mut XGeometry, modals: &mut Modals) -> Result<()> {
    merge_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

pub fn dedup_xgeometry(record: &mut XGeometry, modals: &mut Modals) -> Result<()> {
    dedup_geometry_common(
        &mut record.layer,
        &mut record.datatype,
        &mut record.x,
        &mut record.y,
        &mut record.repetition,
        modals,
    )
}

/// `Property`'s value list is never unfillable: an unset modal simply means
/// no property has been seen yet in this cell, so it fills to an empty list
/// rather than erroring like the other mandatory fields.
pub fn merge_property(record: &mut Property, modals: &mut Modals) -> Result<()> {
    merge_field(&mut record.name, &mut modals.property_name, "property name")?;
    if record.values.is_none() {
        record.values = Some(modals.property_value_list.clone().unwrap_or_default());
    } else {
        modals.property_value_list.clone_from(&record.values);
    }
    if record.is_standard.is_none() {
        record.is_standard = Some(modals.property_is_standard.unwrap_or(false));
    } else {
        modals.property_is_standard = record.is_standard;
    }
    Ok(())
}

/// `is_standard` only collapses to `None` (letting the record fall to the
/// all-modal id) when `name` and `values` both end up unset too — otherwise
/// the record is going on the wire as the explicit id anyway, which always
/// carries the `is_standard` bit, so there is nothing to gain by clearing it.
pub fn dedup_property(record: &mut Property, modals: &mut Modals) -> Result<()> {
    dedup_field(&mut record.name, &mut modals.property_name, "property name")?;

    let values_match_modal = record.values == modals.property_value_list;
    if values_match_modal {
        record.values = None;
    } else {
        modals.property_value_list.clone_from(&record.values);
    }

    if record.name.is_none() && record.values.is_none() {
        if record.is_standard == modals.property_is_standard {
            record.is_standard = None;
        } else if let Some(s) = record.is_standard {
            modals.property_is_standard = Some(s);
        }
    } else if let Some(s) = record.is_standard {
        modals.property_is_standard = Some(s);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Repetition;
    use crate::reference::Ref;

    #[test]
    fn test_rectangle_square_mirrors_height_into_modal() {
        let mut modals = Modals::new();
        let mut rect = Rectangle {
            is_square: true,
            layer: Some(1),
            datatype: Some(0),
            width: Some(42),
            height: None,
            x: Some(0),
            y: Some(0),
            repetition: None,
        };
        merge_rectangle(&mut rect, &mut modals).unwrap();
        assert_eq!(modals.geometry_h, Some(42));
        assert_eq!(rect.height, None);
    }

    #[test]
    fn test_placement_merges_relative_coordinates() {
        let mut modals = Modals::new();
        modals.xy_relative = true;
        modals.placement_x = 100;
        let mut placement = Placement {
            name: Some(Ref::Number(3)),
            x: Some(5),
            y: None,
            repetition: None,
            flip: false,
            angle: Some(0.0),
            magnification: None,
        };
        merge_placement(&mut placement, &mut modals).unwrap();
        assert_eq!(placement.x, Some(105));
        assert_eq!(placement.y, Some(0));
    }

    #[test]
    fn test_property_collapses_to_modal_id_when_matching() {
        let mut modals = Modals::new();
        modals.property_name = Some(Ref::Literal(crate::primitives::NString::new("WIDTH").unwrap()));
        modals.property_value_list = Some(vec![]);
        modals.property_is_standard = Some(true);

        let mut prop = Property {
            name: Some(Ref::Literal(crate::primitives::NString::new("WIDTH").unwrap())),
            values: Some(vec![]),
            is_standard: Some(true),
        };
        dedup_property(&mut prop, &mut modals).unwrap();
        assert_eq!(prop.name, None);
        assert_eq!(prop.values, None);
        assert_eq!(prop.is_standard, None);
    }

    #[test]
    fn test_repetition_reuse_requires_modal_via_merge_placement() {
        let mut modals = Modals::new();
        let mut placement = Placement {
            repetition: Some(Repetition::Reuse),
            ..Default::default()
        };
        assert!(merge_placement(&mut placement, &mut modals).is_err());
    }

    #[test]
    fn test_ctrapezoid_merge_does_not_leak_modal_height_into_type_16() {
        // Type 16 forbids height entirely; a modal geometry_h left over from
        // an earlier record must not be merged into it.
        let mut modals = Modals::new();
        modals.geometry_h = Some(99);
        let mut trap = CTrapezoid {
            ctrapezoid_type: Some(16),
            width: Some(10),
            height: None,
            x: Some(0),
            y: Some(0),
            ..Default::default()
        };
        merge_ctrapezoid(&mut trap, &mut modals).unwrap();
        assert_eq!(trap.height, None);
    }

    #[test]
    fn test_ctrapezoid_merge_fills_height_for_type_that_allows_it() {
        let mut modals = Modals::new();
        modals.geometry_h = Some(7);
        let mut trap = CTrapezoid {
            ctrapezoid_type: Some(20),
            width: None,
            height: None,
            x: Some(0),
            y: Some(0),
            ..Default::default()
        };
        merge_ctrapezoid(&mut trap, &mut modals).unwrap();
        assert_eq!(trap.height, Some(7));
        assert_eq!(trap.width, None);
    }
}
