use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::record::{Record, RecordHeader, HEADER_LEN, RECORD_ID_MIN};
use crate::{
    RECORD_BSTORE_CONTAINER, RECORD_DGG_CONTAINER, RECORD_DG_CONTAINER, RECORD_SPGR_CONTAINER,
    RECORD_SP_CONTAINER,
};

/// Errors returned while decoding an OfficeArt byte range.
///
/// A malformed record does not throw away work already done: everything
/// decoded before the failure is carried in the error and can be recovered
/// with [`DecodeError::into_partial_tree`], so callers can decide whether a
/// partial drawing layer is still usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The `(offset, size)` range does not lie inside the supplied buffer.
    #[error("record range at offset {offset} with size {size} lies outside the {len}-byte input")]
    RangeOutOfBounds {
        offset: usize,
        size: usize,
        len: usize,
    },
    /// A record header declares a payload extending past the end of the
    /// supplied range.
    #[error(
        "record 0x{id:04X} at offset {offset} declares a {declared}-byte payload but only \
         {available} bytes remain"
    )]
    MalformedRecord {
        id: u16,
        offset: usize,
        declared: u32,
        available: usize,
        partial: RecordTree,
    },
    /// Fewer than 8 bytes remain where a record header was expected.
    #[error("truncated record header at offset {offset}: only {available} bytes remain")]
    TruncatedHeader {
        offset: usize,
        available: usize,
        partial: RecordTree,
    },
}

impl DecodeError {
    /// The records successfully decoded before the failure, in order.
    pub fn partial_tree(&self) -> Option<&RecordTree> {
        match self {
            DecodeError::RangeOutOfBounds { .. } => None,
            DecodeError::MalformedRecord { partial, .. }
            | DecodeError::TruncatedHeader { partial, .. } => Some(partial),
        }
    }

    /// Consume the error, recovering the partial tree (empty for a
    /// [`DecodeError::RangeOutOfBounds`]).
    pub fn into_partial_tree(self) -> RecordTree {
        match self {
            DecodeError::RangeOutOfBounds { .. } => RecordTree::default(),
            DecodeError::MalformedRecord { partial, .. }
            | DecodeError::TruncatedHeader { partial, .. } => partial,
        }
    }
}

// Failure site of a decode, before the partially-built tree is attached.
enum Malformed {
    Record {
        id: u16,
        offset: usize,
        declared: u32,
        available: usize,
    },
    Header {
        offset: usize,
        available: usize,
    },
}

/// An ordered, owning tree of decoded OfficeArt records.
///
/// Built once from a `(bytes, offset, size)` triple and read-only afterward.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordTree {
    records: Vec<Record>,
}

impl RecordTree {
    /// Decode the byte range `data[offset..offset + size]` into a record
    /// tree.
    ///
    /// Top-level records are separated by exactly one pad byte; records
    /// nested inside a container payload are contiguous. Unknown record ids
    /// are kept as opaque atoms (logged at `warn` level, once per id per
    /// decode). The decoder never reads outside the supplied range.
    pub fn decode(data: &[u8], offset: usize, size: usize) -> Result<RecordTree, DecodeError> {
        let end = match offset.checked_add(size) {
            Some(end) if end <= data.len() => end,
            _ => {
                return Err(DecodeError::RangeOutOfBounds {
                    offset,
                    size,
                    len: data.len(),
                })
            }
        };

        let mut records = Vec::new();
        let mut warned = BTreeSet::new();
        match decode_level(data, offset, end, true, &mut warned, &mut records) {
            Ok(()) => Ok(RecordTree { records }),
            Err(Malformed::Record {
                id,
                offset,
                declared,
                available,
            }) => Err(DecodeError::MalformedRecord {
                id,
                offset,
                declared,
                available,
                partial: RecordTree { records },
            }),
            Err(Malformed::Header { offset, available }) => Err(DecodeError::TruncatedHeader {
                offset,
                available,
                partial: RecordTree { records },
            }),
        }
    }

    /// Top-level records in document order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// First record with the given id: the current sibling level is checked
    /// in order first, then containers are descended into in sibling order.
    pub fn find_first_with_id(&self, id: u16) -> Option<&Record> {
        find_first_with_id(&self.records, id)
    }

    /// First top-level container of any id, if present. Most drawing streams
    /// put all content under a single top-level container.
    pub fn first_container(&self) -> Option<&Record> {
        self.records.iter().find(|r| r.is_container())
    }

    /// Top-level drawing-group containers (id 0xF000), in encounter order.
    pub fn drawing_group_containers(&self) -> Vec<&Record> {
        containers_with_id(&self.records, RECORD_DGG_CONTAINER)
    }

    /// Blip-store containers (id 0xF001): direct children of each top-level
    /// drawing-group container.
    pub fn blip_store_containers(&self) -> Vec<&Record> {
        children_of(&self.drawing_group_containers(), RECORD_BSTORE_CONTAINER)
    }

    /// Top-level per-sheet drawing containers (id 0xF002), in encounter
    /// order.
    pub fn drawing_containers(&self) -> Vec<&Record> {
        containers_with_id(&self.records, RECORD_DG_CONTAINER)
    }

    /// Shape-group containers (id 0xF003): direct children of each top-level
    /// drawing container.
    pub fn shape_group_containers(&self) -> Vec<&Record> {
        children_of(&self.drawing_containers(), RECORD_SPGR_CONTAINER)
    }

    /// Shape containers (id 0xF004): direct children of each shape-group
    /// container.
    pub fn shape_containers(&self) -> Vec<&Record> {
        children_of(&self.shape_group_containers(), RECORD_SP_CONTAINER)
    }
}

impl fmt::Display for RecordTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return writeln!(f, "no drawing records decoded");
        }
        for record in &self.records {
            write!(f, "{record}")?;
        }
        Ok(())
    }
}

fn find_first_with_id(records: &[Record], id: u16) -> Option<&Record> {
    // Check this sibling level first, then each container's subtree in
    // sibling order.
    records.iter().find(|r| r.id() == id).or_else(|| {
        records
            .iter()
            .filter(|r| r.is_container())
            .find_map(|r| find_first_with_id(r.children(), id))
    })
}

fn containers_with_id(records: &[Record], id: u16) -> Vec<&Record> {
    records
        .iter()
        .filter(|r| r.is_container() && r.id() == id)
        .collect()
}

fn children_of<'a>(parents: &[&'a Record], id: u16) -> Vec<&'a Record> {
    parents
        .iter()
        .flat_map(|parent| containers_with_id(parent.children(), id))
        .collect()
}

fn decode_level(
    data: &[u8],
    start: usize,
    end: usize,
    top_level: bool,
    warned: &mut BTreeSet<u16>,
    out: &mut Vec<Record>,
) -> Result<(), Malformed> {
    let mut pos = start;
    while pos < end {
        if end - pos < HEADER_LEN {
            return Err(Malformed::Header {
                offset: pos,
                available: end - pos,
            });
        }
        // Bounds re-checked by `read`, but `end` is the binding limit here.
        let header = RecordHeader::read(data, pos).ok_or(Malformed::Header {
            offset: pos,
            available: end - pos,
        })?;

        let payload_start = pos + HEADER_LEN;
        let payload_len = header.length as usize;
        let available = end - payload_start;
        if payload_len > available {
            return Err(Malformed::Record {
                id: header.id,
                offset: pos,
                declared: header.length,
                available,
            });
        }
        let payload_end = payload_start + payload_len;

        if header.id < RECORD_ID_MIN && warned.insert(header.id) {
            log::warn!(
                "unrecognized drawing record id 0x{:04X} at offset {pos}; keeping as opaque atom",
                header.id
            );
        }

        if header.is_container() {
            // Container payloads are a contiguous run of nested records: no
            // pad byte between them.
            let mut children = Vec::new();
            decode_level(data, payload_start, payload_end, false, warned, &mut children)?;
            out.push(Record::Container { header, children });
        } else {
            out.push(Record::Atom {
                header,
                payload: data[payload_start..payload_end].to_vec(),
            });
        }

        pos = payload_end;
        if top_level {
            // One pad byte separates consecutive top-level records.
            pos += 1;
        }
    }
    Ok(())
}
