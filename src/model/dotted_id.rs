use std::cmp::Ordering;
use std::fmt;

/// A hierarchical identifier such as `1.2.3.1`.
///
/// Each segment encodes a position within the parent's ordering. Parsing is
/// lenient: tokens that are not unsigned integers become `0`, and an empty
/// string yields an id with no segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DottedId {
    segments: Vec<u64>,
}

impl DottedId {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::default();
        }
        let segments = raw
            .split('.')
            .map(|token| token.trim().parse::<u64>().unwrap_or(0))
            .collect();
        Self { segments }
    }

    pub fn from_segments(segments: Vec<u64>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `self` extended by one trailing segment.
    pub fn child(&self, position: u64) -> Self {
        let mut segments = self.segments.clone();
        segments.push(position);
        Self { segments }
    }

    /// `self` without its last segment.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Segment-wise prefix test: `1.10` does not start with `1.1`.
    pub fn starts_with(&self, prefix: &DottedId) -> bool {
        !prefix.is_empty() && self.segments.starts_with(&prefix.segments)
    }

    /// Swap a leading `old` prefix for `new`. Returns `None` when `old` is
    /// not a prefix of `self`.
    pub fn replace_prefix(&self, old: &DottedId, new: &DottedId) -> Option<Self> {
        if !self.starts_with(old) {
            return None;
        }
        let mut segments = new.segments.clone();
        segments.extend_from_slice(&self.segments[old.segments.len()..]);
        Some(Self { segments })
    }

    /// Token-by-token numeric ordering; missing tokens compare as `0`.
    pub fn numeric_cmp(&self, other: &DottedId) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for DottedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Compare two raw id strings numerically.
pub fn compare_raw(a: &str, b: &str) -> Ordering {
    DottedId::parse(a).numeric_cmp(&DottedId::parse(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numeric_order_beats_lexicographic() {
        let mut ids = vec!["1.1.10", "1.1.2", "1.1.1"];
        ids.sort_by(|a, b| compare_raw(a, b));
        assert_eq!(ids, vec!["1.1.1", "1.1.2", "1.1.10"]);
    }

    #[test]
    fn malformed_tokens_compare_as_zero() {
        assert_eq!(compare_raw("1.a", "1.0"), Ordering::Equal);
        assert_eq!(compare_raw("", "0"), Ordering::Equal);
        assert_eq!(compare_raw("1", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_raw("2.x", "1.9"), Ordering::Greater);
    }

    #[test]
    fn prefix_is_dot_boundary_aware() {
        let short = DottedId::parse("1.1");
        assert!(DottedId::parse("1.1.4").starts_with(&short));
        assert!(!DottedId::parse("1.10").starts_with(&short));
        assert!(!DottedId::parse("1.10.2").starts_with(&short));
        assert!(!DottedId::parse("1.1").starts_with(&DottedId::default()));
    }

    #[test]
    fn replace_prefix_keeps_tail() {
        let id = DottedId::parse("2.1.3.4");
        let moved = id
            .replace_prefix(&DottedId::parse("2.1"), &DottedId::parse("2.2"))
            .unwrap();
        assert_eq!(moved.to_string(), "2.2.3.4");
        assert!(id
            .replace_prefix(&DottedId::parse("2.10"), &DottedId::parse("2.2"))
            .is_none());
    }

    #[test]
    fn child_and_parent() {
        let imo = DottedId::parse("1.2.3");
        assert_eq!(imo.child(4).to_string(), "1.2.3.4");
        assert_eq!(imo.parent().to_string(), "1.2");
        assert_eq!(DottedId::parse("").to_string(), "");
    }

    proptest! {
        #[test]
        fn comparator_agrees_with_segment_order(a in proptest::collection::vec(0u64..50, 1..5),
                                                 b in proptest::collection::vec(0u64..50, 1..5)) {
            let left = DottedId::from_segments(a.clone());
            let right = DottedId::from_segments(b.clone());
            let reparsed = DottedId::parse(&left.to_string());
            prop_assert_eq!(&reparsed, &left);
            prop_assert_eq!(left.numeric_cmp(&right), right.numeric_cmp(&left).reverse());
        }
    }
}
