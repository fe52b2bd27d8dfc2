//! OASIS layout-interchange record layer: modal compression over a binary
//! record stream, plus the `CBlock` DEFLATE wrapper.

pub mod cblock;
pub mod error;
pub mod modal;
pub mod primitives;
pub mod record;
pub mod reference;
pub mod stream;

pub use crate::error::{Error, Result};
pub use crate::modal::Modals;
pub use crate::record::Record;
pub use crate::stream::{CollectingVisitor, RecordReader, RecordVisitor, RecordWriter};
