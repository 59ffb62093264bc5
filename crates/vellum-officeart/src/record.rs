use std::fmt;

/// OfficeArt drawing-group container (`OfficeArtDggContainer`), top level.
pub const RECORD_DGG_CONTAINER: u16 = 0xF000;
/// OfficeArt blip store container (`OfficeArtBStoreContainer`), child of a
/// drawing-group container.
pub const RECORD_BSTORE_CONTAINER: u16 = 0xF001;
/// OfficeArt per-sheet drawing container (`OfficeArtDgContainer`), top level.
pub const RECORD_DG_CONTAINER: u16 = 0xF002;
/// OfficeArt shape-group container (`OfficeArtSpgrContainer`), child of a
/// drawing container.
pub const RECORD_SPGR_CONTAINER: u16 = 0xF003;
/// OfficeArt shape container (`OfficeArtSpContainer`), child of a shape-group
/// container.
pub const RECORD_SP_CONTAINER: u16 = 0xF004;

// Well-known atom/container ids beyond the grouping-query set, used only for
// diagnostics. The OfficeArt id space is 0xF000..=0xFFFF; anything outside it
// is treated as an unrecognized (but still decodable) record.
const RECORD_SOLVER_CONTAINER: u16 = 0xF005;
const RECORD_DGG: u16 = 0xF006;
const RECORD_BSE: u16 = 0xF007;
const RECORD_DG: u16 = 0xF008;
const RECORD_SPGR: u16 = 0xF009;
const RECORD_SP: u16 = 0xF00A;
const RECORD_OPT: u16 = 0xF00B;
const RECORD_CLIENT_TEXTBOX: u16 = 0xF00D;
const RECORD_CHILD_ANCHOR: u16 = 0xF00F;
const RECORD_CLIENT_ANCHOR: u16 = 0xF010;
const RECORD_CLIENT_DATA: u16 = 0xF011;
const RECORD_SPLIT_MENU_COLORS: u16 = 0xF11E;

/// First id of the OfficeArt record id range.
pub(crate) const RECORD_ID_MIN: u16 = 0xF000;

/// Human-readable name for a well-known OfficeArt record id, if any.
pub fn record_name(id: u16) -> Option<&'static str> {
    match id {
        RECORD_DGG_CONTAINER => Some("DggContainer"),
        RECORD_BSTORE_CONTAINER => Some("BStoreContainer"),
        RECORD_DG_CONTAINER => Some("DgContainer"),
        RECORD_SPGR_CONTAINER => Some("SpgrContainer"),
        RECORD_SP_CONTAINER => Some("SpContainer"),
        RECORD_SOLVER_CONTAINER => Some("SolverContainer"),
        RECORD_DGG => Some("Dgg"),
        RECORD_BSE => Some("BSE"),
        RECORD_DG => Some("Dg"),
        RECORD_SPGR => Some("Spgr"),
        RECORD_SP => Some("Sp"),
        RECORD_OPT => Some("Opt"),
        RECORD_CLIENT_TEXTBOX => Some("ClientTextbox"),
        RECORD_CHILD_ANCHOR => Some("ChildAnchor"),
        RECORD_CLIENT_ANCHOR => Some("ClientAnchor"),
        RECORD_CLIENT_DATA => Some("ClientData"),
        RECORD_SPLIT_MENU_COLORS => Some("SplitMenuColors"),
        _ => None,
    }
}

/// Size in bytes of an OfficeArt record header.
pub(crate) const HEADER_LEN: usize = 8;

/// Decoded OfficeArt record header.
///
/// Wire layout (little-endian): `options` (u16, low nibble = version, high 12
/// bits = instance), record id (u16), payload length (u32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub options: u16,
    pub id: u16,
    pub length: u32,
}

impl RecordHeader {
    /// Read a header from `data` at `offset`. Returns `None` if fewer than 8
    /// bytes remain.
    pub(crate) fn read(data: &[u8], offset: usize) -> Option<RecordHeader> {
        let bytes = data.get(offset..offset.checked_add(HEADER_LEN)?)?;
        Some(RecordHeader {
            options: u16::from_le_bytes([bytes[0], bytes[1]]),
            id: u16::from_le_bytes([bytes[2], bytes[3]]),
            length: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Version nibble from the options field.
    pub fn version(&self) -> u8 {
        (self.options & 0x000F) as u8
    }

    /// Instance (high 12 bits of the options field).
    pub fn instance(&self) -> u16 {
        self.options >> 4
    }

    /// A record is a container iff its version nibble is `0xF`; the payload
    /// of a container is itself a contiguous run of nested records.
    pub fn is_container(&self) -> bool {
        self.options & 0x000F == 0x000F
    }
}

/// One decoded OfficeArt record: an opaque-payload atom or a container of
/// nested records. Owned by its parent container (or the tree root) and
/// immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Atom {
        header: RecordHeader,
        payload: Vec<u8>,
    },
    Container {
        header: RecordHeader,
        children: Vec<Record>,
    },
}

impl Record {
    pub fn header(&self) -> &RecordHeader {
        match self {
            Record::Atom { header, .. } | Record::Container { header, .. } => header,
        }
    }

    pub fn id(&self) -> u16 {
        self.header().id
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Record::Container { .. })
    }

    /// Raw payload bytes. Empty for containers.
    pub fn payload(&self) -> &[u8] {
        match self {
            Record::Atom { payload, .. } => payload,
            Record::Container { .. } => &[],
        }
    }

    /// Nested records in document order. Empty for atoms.
    pub fn children(&self) -> &[Record] {
        match self {
            Record::Container { children, .. } => children,
            Record::Atom { .. } => &[],
        }
    }

    /// Direct children with the given record id, in encounter order.
    pub fn children_with_id(&self, id: u16) -> impl Iterator<Item = &Record> {
        self.children().iter().filter(move |r| r.id() == id)
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        let name = record_name(self.id()).unwrap_or("Unknown");
        match self {
            Record::Atom { header, payload } => {
                writeln!(
                    f,
                    "{name} atom id=0x{:04X} inst=0x{:03X} len={}",
                    header.id,
                    header.instance(),
                    payload.len()
                )
            }
            Record::Container { header, children } => {
                writeln!(
                    f,
                    "{name} container id=0x{:04X} inst=0x{:03X} children={}",
                    header.id,
                    header.instance(),
                    children.len()
                )?;
                for child in children {
                    child.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_reads_little_endian_fields() {
        let bytes = [0x0F, 0x20, 0x00, 0xF0, 0x10, 0x00, 0x00, 0x00];
        let header = RecordHeader::read(&bytes, 0).expect("header");
        assert_eq!(header.options, 0x200F);
        assert_eq!(header.id, 0xF000);
        assert_eq!(header.length, 16);
        assert_eq!(header.version(), 0x0F);
        assert_eq!(header.instance(), 0x200);
        assert!(header.is_container());
    }

    #[test]
    fn header_read_is_bounds_checked() {
        assert!(RecordHeader::read(&[0u8; 7], 0).is_none());
        assert!(RecordHeader::read(&[0u8; 16], 9).is_none());
        assert!(RecordHeader::read(&[0u8; 8], usize::MAX).is_none());
    }

    #[test]
    fn atom_version_nibbles_are_not_containers() {
        for version in 0x0..=0xE_u16 {
            let header = RecordHeader {
                options: version,
                id: 0xF00B,
                length: 0,
            };
            assert!(!header.is_container(), "version 0x{version:X}");
        }
    }
}
