//! The modal-variable bank and the four primitive operations by which
//! records read from and write to it.
//!
//! Records never touch modal state directly; every interaction goes
//! through [`merge_field`]/[`dedup_field`], [`merge_coordinates`]/
//! [`dedup_coordinates`], or [`merge_repetition`]/[`dedup_repetition`].
//! A record variant's merge/dedup function (in [`crate::record`]) is
//! simply a fixed-order sequence of calls into this module.

use crate::error::{Error, Result};
use crate::primitives::{PointList, PropertyValue, Repetition};
use crate::reference::Ref;
use crate::primitives::{AString, NString};

/// End of a path, after an explicit extension scheme is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathExtension {
    Flush,
    HalfWidth,
    Arbitrary(i64),
}

/// One modal-variable bank, owned by a single stream direction.
///
/// Reset to its `Default` on `Start` and on every `CellName`/`Cell`/
/// text-name/layer-name/property-name boundary record, per §4.1.
#[derive(Debug, Clone, PartialEq)]
pub struct Modals {
    pub repetition: Option<Repetition>,
    pub placement_x: i64,
    pub placement_y: i64,
    pub placement_cell: Option<Ref<NString>>,
    pub layer: Option<u64>,
    pub datatype: Option<u64>,
    pub text_layer: Option<u64>,
    pub text_datatype: Option<u64>,
    pub text_x: i64,
    pub text_y: i64,
    pub text_string: Option<Ref<AString>>,
    pub geometry_x: i64,
    pub geometry_y: i64,
    pub xy_relative: bool,
    pub geometry_w: Option<u64>,
    pub geometry_h: Option<u64>,
    pub polygon_point_list: Option<PointList>,
    pub path_point_list: Option<PointList>,
    pub path_halfwidth: Option<u64>,
    pub path_extension_start: Option<PathExtension>,
    pub path_extension_end: Option<PathExtension>,
    pub ctrapezoid_type: Option<u8>,
    pub circle_radius: Option<u64>,
    pub property_value_list: Option<Vec<PropertyValue>>,
    pub property_name: Option<Ref<NString>>,
    pub property_is_standard: Option<bool>,
}

impl Default for Modals {
    fn default() -> Self {
        Self {
            repetition: None,
            placement_x: 0,
            placement_y: 0,
            placement_cell: None,
            layer: None,
            datatype: None,
            text_layer: None,
            text_datatype: None,
            text_x: 0,
            text_y: 0,
            text_string: None,
            geometry_x: 0,
            geometry_y: 0,
            xy_relative: false,
            geometry_w: None,
            geometry_h: None,
            polygon_point_list: None,
            path_point_list: None,
            path_halfwidth: None,
            path_extension_start: None,
            path_extension_end: None,
            ctrapezoid_type: None,
            circle_radius: None,
            property_value_list: None,
            property_name: None,
            property_is_standard: None,
        }
    }
}

impl Modals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the whole bank, as required on `Start`, `CellName`, `Cell`,
    /// `TextString`, `LayerName`, `PropName`, `PropString`, `XName`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `merge_field(record.f, modals.m)`: fills an unset record field from the
/// modal bank, or seeds the modal bank from a set record field.
pub fn merge_field<T: Clone>(record: &mut Option<T>, modal: &mut Option<T>, field: &'static str) -> Result<()> {
    if let Some(value) = record.as_ref() {
        *modal = Some(value.clone());
    } else if let Some(value) = modal.as_ref() {
        *record = Some(value.clone());
    } else {
        return Err(Error::UnfillableField(field));
    }
    Ok(())
}

/// `dedup_field(record.f, modals.m)`: strips a record field equal to the
/// modal value, or seeds the modal bank from a differing record field.
pub fn dedup_field<T: Clone + PartialEq>(
    record: &mut Option<T>,
    modal: &mut Option<T>,
    field: &'static str,
) -> Result<()> {
    match record.as_ref() {
        Some(value) if Some(value) == modal.as_ref() => {
            *record = None;
        }
        Some(value) => {
            *modal = Some(value.clone());
        }
        None => {
            if modal.is_none() {
                return Err(Error::UnfillableField(field));
            }
        }
    }
    Ok(())
}

fn merge_axis(record: &mut Option<i64>, modal: &mut i64, relative: bool) {
    match record {
        Some(value) => {
            if relative {
                *value += *modal;
            } else {
                *modal = *value;
            }
        }
        None => {
            *record = Some(*modal);
        }
    }
}

fn dedup_axis(record: &mut Option<i64>, modal: &mut i64, relative: bool) {
    if let Some(value) = record {
        if relative {
            *value -= *modal;
        } else if *value == *modal {
            *record = None;
        } else {
            *modal = *value;
        }
    }
}

/// `merge_coordinates`: never fails, since modal coordinates have a
/// defined zero initial value.
pub fn merge_coordinates(
    record_x: &mut Option<i64>,
    record_y: &mut Option<i64>,
    modal_x: &mut i64,
    modal_y: &mut i64,
    relative: bool,
) {
    merge_axis(record_x, modal_x, relative);
    merge_axis(record_y, modal_y, relative);
}

pub fn dedup_coordinates(
    record_x: &mut Option<i64>,
    record_y: &mut Option<i64>,
    modal_x: &mut i64,
    modal_y: &mut i64,
    relative: bool,
) {
    dedup_axis(record_x, modal_x, relative);
    dedup_axis(record_y, modal_y, relative);
}

/// `merge_repetition`: a `Reuse` repetition demands a set modal (else
/// `UnfillableRepetition`) and is replaced by a deep copy of it; any other
/// repetition overwrites the modal. Records with unset repetition are
/// untouched.
pub fn merge_repetition(record: &mut Option<Repetition>, modal: &mut Option<Repetition>) -> Result<()> {
    match record.as_ref() {
        Some(Repetition::Reuse) => {
            let filled = modal.clone().ok_or(Error::UnfillableRepetition)?;
            *record = Some(filled);
        }
        Some(other) => {
            *modal = Some(other.clone());
        }
        None => {}
    }
    Ok(())
}

/// `dedup_repetition`: a repetition equal to the modal collapses to
/// `Reuse`; otherwise it overwrites the modal.
pub fn dedup_repetition(record: &mut Option<Repetition>, modal: &mut Option<Repetition>) {
    if let Some(rep) = record.as_ref() {
        if Some(rep) == modal.as_ref() {
            *record = Some(Repetition::Reuse);
        } else {
            *modal = Some(rep.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_field_fills_from_modal() {
        let mut record: Option<u64> = None;
        let mut modal = Some(7u64);
        merge_field(&mut record, &mut modal, "layer").unwrap();
        assert_eq!(record, Some(7));
    }

    #[test]
    fn test_merge_field_fails_when_both_unset() {
        let mut record: Option<u64> = None;
        let mut modal: Option<u64> = None;
        assert!(merge_field(&mut record, &mut modal, "layer").is_err());
    }

    #[test]
    fn test_dedup_field_clears_when_equal() {
        let mut record = Some(5u64);
        let mut modal = Some(5u64);
        dedup_field(&mut record, &mut modal, "layer").unwrap();
        assert_eq!(record, None);
    }

    #[test]
    fn test_dedup_field_keeps_when_different() {
        let mut record = Some(5u64);
        let mut modal = Some(9u64);
        dedup_field(&mut record, &mut modal, "layer").unwrap();
        assert_eq!(record, Some(5));
        assert_eq!(modal, Some(5));
    }

    #[test]
    fn test_merge_coordinates_relative() {
        let mut x = Some(5i64);
        let mut y = None;
        let mut modal_x = 100i64;
        let mut modal_y = 0i64;
        merge_coordinates(&mut x, &mut y, &mut modal_x, &mut modal_y, true);
        assert_eq!(x, Some(105));
        assert_eq!(modal_x, 100);
        assert_eq!(y, Some(0));
    }

    #[test]
    fn test_merge_coordinates_absolute() {
        let mut x = Some(5i64);
        let mut y = None;
        let mut modal_x = 100i64;
        let mut modal_y = 0i64;
        merge_coordinates(&mut x, &mut y, &mut modal_x, &mut modal_y, false);
        assert_eq!(x, Some(5));
        assert_eq!(modal_x, 5);
    }

    #[test]
    fn test_merge_repetition_reuse_requires_modal() {
        let mut record = Some(Repetition::Reuse);
        let mut modal = None;
        assert!(matches!(
            merge_repetition(&mut record, &mut modal),
            Err(Error::UnfillableRepetition)
        ));
    }

    #[test]
    fn test_dedup_repetition_collapses_to_reuse() {
        let grid = Repetition::OrthogonalGrid {
            x_pitch: 10,
            x_count: 3,
            y_pitch: 0,
            y_count: 1,
        };
        let mut record = Some(grid.clone());
        let mut modal = Some(grid);
        dedup_repetition(&mut record, &mut modal);
        assert_eq!(record, Some(Repetition::Reuse));
    }
}
