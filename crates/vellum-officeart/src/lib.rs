//! Legacy OfficeArt (pre-XML drawing layer) record decoding.
//!
//! Word 97 and Excel 97 binary documents embed their drawing layer as a flat
//! byte range of nested *OfficeArt* records: an 8-byte header (options +
//! record id + payload length) followed by either an opaque payload (*atom*)
//! or a contiguous run of nested records (*container*). This crate decodes
//! such a range into an owned [`RecordTree`] and provides the depth-first
//! lookup and role-grouping queries the document model layers need.
//!
//! Decoding is deliberately tolerant: real-world files routinely contain
//! record ids this crate does not recognize (vendor extensions, newer
//! writers). Unknown ids are kept as opaque atoms and logged at `warn`
//! level; only a record whose declared length would run past the supplied
//! range fails the decode, and even then the partially-decoded tree is
//! recoverable from the error (see [`DecodeError`]).
//!
//! This crate performs no I/O and holds no global state; the surrounding
//! container-format reader is responsible for locating the byte range (and,
//! for protected documents, decrypting it first).

mod record;
mod tree;

pub use record::{record_name, Record, RecordHeader};
pub use record::{
    RECORD_BSTORE_CONTAINER, RECORD_DGG_CONTAINER, RECORD_DG_CONTAINER, RECORD_SPGR_CONTAINER,
    RECORD_SP_CONTAINER,
};
pub use tree::{DecodeError, RecordTree};
