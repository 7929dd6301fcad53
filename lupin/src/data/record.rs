use rust_htslib::bam::{self, record::Aux};

/// Typed value of a record tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Int(i64),
    Float(f64),
    Text(Box<str>),
}

impl TagValue {
    /// Integer reading of the value: floats truncate toward zero and
    /// numeric text parses
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(x) => Some(*x),
            TagValue::Float(x) => Some(*x as i64),
            TagValue::Text(x) => x.trim().parse::<i64>().ok(),
        }
    }

    /// Integer reading only when the value is numerically whole
    pub fn as_whole_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(x) => Some(*x),
            TagValue::Float(x) if x.fract() == 0.0 => Some(*x as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(x) => Some(x.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for TagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValue::Int(x) => write!(f, "{}", x),
            TagValue::Float(x) => write!(f, "{}", x),
            TagValue::Text(x) => write!(f, "{}", x),
        }
    }
}

/// Displayed tag value; a missing tag degrades to a sentinel
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone)]
pub enum TagLabel {
    Value(Box<str>),
    Missing,
}

impl std::fmt::Display for TagLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let x: Box<str> = self.clone().into();
        write!(f, "{}", x)
    }
}

impl From<TagLabel> for Box<str> {
    fn from(label: TagLabel) -> Self {
        match label {
            TagLabel::Missing => Box::from("None"),
            TagLabel::Value(boxed_str) => boxed_str,
        }
    }
}

impl From<Option<TagValue>> for TagLabel {
    fn from(value: Option<TagValue>) -> Self {
        match value {
            Some(x) => TagLabel::Value(x.to_string().into_boxed_str()),
            None => TagLabel::Missing,
        }
    }
}

/// The record fields the counting pipeline reads. Implemented over
/// `rust_htslib::bam::Record`; unit tests build records from SAM text.
pub trait TaggedRecord {
    fn mapping_quality(&self) -> u8;
    fn is_unmapped(&self) -> bool;
    fn is_paired(&self) -> bool;
    fn tag(&self, name: &str) -> Option<TagValue>;
}

impl TaggedRecord for bam::Record {
    fn mapping_quality(&self) -> u8 {
        self.mapq()
    }

    fn is_unmapped(&self) -> bool {
        bam::Record::is_unmapped(self)
    }

    fn is_paired(&self) -> bool {
        bam::Record::is_paired(self)
    }

    fn tag(&self, name: &str) -> Option<TagValue> {
        match self.aux(name.as_bytes()) {
            Ok(aux) => decode_aux(&aux),
            Err(_) => None,
        }
    }
}

/// Scalar tag payloads become typed values; array payloads carry no
/// key semantics and read as missing
pub fn decode_aux(aux: &Aux) -> Option<TagValue> {
    match aux {
        Aux::Char(x) => Some(TagValue::Text((*x as char).to_string().into_boxed_str())),
        Aux::I8(x) => Some(TagValue::Int(*x as i64)),
        Aux::U8(x) => Some(TagValue::Int(*x as i64)),
        Aux::I16(x) => Some(TagValue::Int(*x as i64)),
        Aux::U16(x) => Some(TagValue::Int(*x as i64)),
        Aux::I32(x) => Some(TagValue::Int(*x as i64)),
        Aux::U32(x) => Some(TagValue::Int(*x as i64)),
        Aux::Float(x) => Some(TagValue::Float(*x as f64)),
        Aux::Double(x) => Some(TagValue::Float(*x)),
        Aux::String(x) => Some(TagValue::Text((*x).into())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sam_header, sam_record};

    #[test]
    fn typed_tags_decode_from_sam_text() -> anyhow::Result<()> {
        let header = sam_header("chr1", 10_000);
        let record = sam_record(
            &header,
            "r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII\tSM:Z:cell1\tNH:i:3\tXS:f:0.5",
        )?;

        assert_eq!(record.tag("SM"), Some(TagValue::Text("cell1".into())));
        assert_eq!(record.tag("NH"), Some(TagValue::Int(3)));
        assert_eq!(record.tag("XS"), Some(TagValue::Float(0.5)));
        assert_eq!(record.tag("ZZ"), None);

        Ok(())
    }

    #[test]
    fn integer_readings() {
        assert_eq!(TagValue::Int(7).as_int(), Some(7));
        assert_eq!(TagValue::Float(1999.7).as_int(), Some(1999));
        assert_eq!(TagValue::Text("1999".into()).as_int(), Some(1999));
        assert_eq!(TagValue::Text("19.5".into()).as_int(), None);

        assert_eq!(TagValue::Int(1).as_whole_int(), Some(1));
        assert_eq!(TagValue::Float(1.0).as_whole_int(), Some(1));
        assert_eq!(TagValue::Float(1.5).as_whole_int(), None);
        assert_eq!(TagValue::Text("1".into()).as_whole_int(), None);
    }

    #[test]
    fn missing_tags_display_as_sentinel() {
        let label: TagLabel = None.into();
        assert_eq!(label, TagLabel::Missing);
        assert_eq!(format!("{}", label), "None");

        let label: TagLabel = Some(TagValue::Int(42)).into();
        assert_eq!(format!("{}", label), "42");
    }

    #[test]
    fn flag_fields_follow_sam_flags() -> anyhow::Result<()> {
        let header = sam_header("chr1", 10_000);

        // flag 99: paired, proper pair, mate reverse, first in pair
        let paired = sam_record(&header, "r1\t99\tchr1\t100\t60\t4M\t=\t200\t104\tACGT\tIIII")?;
        assert!(TaggedRecord::is_paired(&paired));
        assert!(!TaggedRecord::is_unmapped(&paired));
        assert_eq!(paired.mapping_quality(), 60);

        // flag 4: unmapped
        let unmapped = sam_record(&header, "r2\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tIIII")?;
        assert!(TaggedRecord::is_unmapped(&unmapped));

        Ok(())
    }
}
