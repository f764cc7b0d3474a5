//! DAF (Double precision Array File) container, the binary layout of SPK kernels.
//!
//! A DAF file is a sequence of 1024-byte records. Addresses inside the file count
//! 8-byte words starting at 1.
//!
//! | Records           | Content                                                    |
//! |-------------------|------------------------------------------------------------|
//! | 1                 | file record, [`DafHeader`]                                 |
//! | 2 .. FWARD − 1    | comment area                                               |
//! | FWARD, ...        | linked summary records, each followed by a name record     |
//!
//! A summary record starts with three control words (next record, previous record,
//! number of summaries) followed by the packed [`Summary`] of each array.
//!
//! Only little-endian IEEE kernels (`LTL-IEEE`) are read, which covers the JPL
//! planetary kernels distributed by NAIF.

use std::io::{Read, Seek, SeekFrom};

use nom::{
    bytes::complete::take,
    number::complete::{le_f64, le_i32},
    IResult, Parser,
};

use crate::skyward_errors::SkywardError;

/// Size of a DAF record in bytes.
pub const RECORD_BYTES: usize = 1024;

/// Summary layout of SPK arrays: two doubles, six integers.
const SPK_ND: i32 = 2;
const SPK_NI: i32 = 6;

/// The first record of a DAF file.
#[derive(Debug, Clone, PartialEq)]
pub struct DafHeader {
    /// File type, `DAF/SPK` for an ephemeris kernel
    pub idword: String,
    /// Number of double components of a summary
    pub nd: i32,
    /// Number of integer components of a summary
    pub ni: i32,
    pub internal_filename: String,
    /// Record number of the first summary record
    pub fward: i32,
    /// Record number of the last summary record
    pub bward: i32,
    /// First free address of the file
    pub free: i32,
    /// Binary format, `LTL-IEEE` or `BIG-IEEE`
    pub locfmt: String,
}

fn trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

fn malformed(what: &str, err: nom::Err<nom::error::Error<&[u8]>>) -> SkywardError {
    SkywardError::EphemerisError(format!("malformed {what}: {err}"))
}

pub(crate) fn read_failure(what: &str, err: std::io::Error) -> SkywardError {
    SkywardError::EphemerisError(format!("unable to read {what}: {err}"))
}

impl DafHeader {
    /// Decode the fields of the file record used by the reader.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, idword) = take(8usize).parse(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, ifname) = take(60usize).parse(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize).parse(input)?;
        Ok((
            input,
            DafHeader {
                idword: trimmed(idword),
                nd,
                ni,
                internal_filename: trimmed(ifname),
                fward,
                bward,
                free,
                locfmt: trimmed(locfmt),
            },
        ))
    }

    /// Read and check the file record of an SPK kernel.
    ///
    /// Return
    /// ------
    /// * the header
    /// * [`SkywardError::EphemerisError`] if the file is not a little-endian SPK kernel
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, SkywardError> {
        let mut buffer = [0u8; RECORD_BYTES];
        reader
            .seek(SeekFrom::Start(0))
            .and_then(|_| reader.read_exact(&mut buffer))
            .map_err(|e| read_failure("the DAF file record", e))?;
        let (_, header) = Self::parse(&buffer).map_err(|e| malformed("DAF file record", e))?;

        if header.idword != "DAF/SPK" {
            return Err(SkywardError::EphemerisError(format!(
                "not an SPK kernel (file type {:?})",
                header.idword
            )));
        }
        if header.locfmt != "LTL-IEEE" {
            return Err(SkywardError::EphemerisError(format!(
                "unsupported binary format {:?}, only LTL-IEEE kernels are read",
                header.locfmt
            )));
        }
        if header.nd != SPK_ND || header.ni != SPK_NI || header.fward < 2 {
            return Err(SkywardError::EphemerisError(format!(
                "inconsistent DAF layout: ND = {}, NI = {}, FWARD = {}",
                header.nd, header.ni, header.fward
            )));
        }
        Ok(header)
    }

    /// Size of a packed summary, in 8-byte words.
    pub fn summary_words(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

/// Descriptor of one SPK array (segment).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Start of coverage, TDB seconds past J2000
    pub start_epoch: f64,
    /// End of coverage, TDB seconds past J2000
    pub end_epoch: f64,
    /// NAIF id of the body described
    pub target: i32,
    /// NAIF id of the origin of the states
    pub center: i32,
    /// Reference frame, 1 for J2000
    pub frame_id: i32,
    /// SPK data type, 2 for position-only Chebyshev records
    pub data_type: i32,
    /// First word of the array
    pub initial_addr: i32,
    /// Last word of the array
    pub final_addr: i32,
}

impl Summary {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, start_epoch) = le_f64(input)?;
        let (input, end_epoch) = le_f64(input)?;
        let (input, target) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, frame_id) = le_i32(input)?;
        let (input, data_type) = le_i32(input)?;
        let (input, initial_addr) = le_i32(input)?;
        let (input, final_addr) = le_i32(input)?;
        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target,
                center,
                frame_id,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    /// Whether `et` (TDB seconds past J2000) is inside the coverage of the array.
    pub fn covers(&self, et: f64) -> bool {
        (self.start_epoch..=self.end_epoch).contains(&et)
    }
}

/// Control words heading a summary record: next record, number of summaries.
fn control_words(input: &[u8]) -> IResult<&[u8], (f64, f64)> {
    let (input, next) = le_f64(input)?;
    let (input, _previous) = le_f64(input)?;
    let (input, nsum) = le_f64(input)?;
    Ok((input, (next, nsum)))
}

/// Walk the linked summary records and collect every array descriptor.
///
/// Arguments
/// ---------
/// * `reader`: the kernel, positioned anywhere
/// * `header`: its file record
///
/// Return
/// ------
/// * the summaries in file order
/// * [`SkywardError::EphemerisError`] on a truncated or inconsistent summary record
pub fn read_summaries<R: Read + Seek>(
    reader: &mut R,
    header: &DafHeader,
) -> Result<Vec<Summary>, SkywardError> {
    let summary_bytes = header.summary_words() * 8;
    let mut buffer = [0u8; RECORD_BYTES];
    let mut summaries = Vec::new();
    let mut record = header.fward as u64;

    while record > 0 {
        reader
            .seek(SeekFrom::Start((record - 1) * RECORD_BYTES as u64))
            .and_then(|_| reader.read_exact(&mut buffer))
            .map_err(|e| read_failure(&format!("summary record {record}"), e))?;

        let (packed, (next, nsum)) =
            control_words(&buffer).map_err(|e| malformed("summary record", e))?;
        let nsum = nsum as usize;
        if nsum * summary_bytes > packed.len() {
            return Err(SkywardError::EphemerisError(format!(
                "summary record {record} announces {nsum} summaries"
            )));
        }

        for chunk in packed.chunks_exact(summary_bytes).take(nsum) {
            let (_, summary) = Summary::parse(chunk).map_err(|e| malformed("summary", e))?;
            summaries.push(summary);
        }

        // Summary records are chained forward; anything else ends the walk
        let next = next as u64;
        record = if next > record { next } else { 0 };
    }

    Ok(summaries)
}
