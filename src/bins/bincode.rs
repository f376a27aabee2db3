use core::fmt::Debug;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::Display;

use crate::{EnrichError, EnrichResult, ROOT_CODE};

/// The hierarchical code of a bin, e.g. `29.5.11`
///
/// The code encodes the position of the bin in the hierarchy. The parent
/// of a bin is identified by removing the last dot-separated segment of the
/// code, top level bins (without a dot) are children of the root bin `0`.
///
/// # Examples
///
/// ```
/// use binenrich::BinCode;
///
/// let code = BinCode::try_from("29.5.11").unwrap();
/// assert_eq!(code.depth(), 3);
/// assert_eq!(code.parent().unwrap(), "29.5");
///
/// let top = BinCode::try_from("29").unwrap();
/// assert!(top.parent().unwrap().is_root());
///
/// assert!(BinCode::root().parent().is_none());
/// assert!(BinCode::try_from("29..1").is_err());
/// ```
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct BinCode {
    inner: String,
}

impl BinCode {
    /// Returns the code of the root bin
    pub fn root() -> Self {
        Self {
            inner: ROOT_CODE.to_string(),
        }
    }

    /// Returns the code as `&str`
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns `true` if the code is the root sentinel
    pub fn is_root(&self) -> bool {
        self.inner == ROOT_CODE
    }

    /// Returns the code of the parent bin
    ///
    /// Returns `None` only for the root code
    pub fn parent(&self) -> Option<BinCode> {
        if self.is_root() {
            return None;
        }
        match self.inner.rsplit_once('.') {
            Some((parent, _)) => Some(BinCode {
                inner: parent.to_string(),
            }),
            None => Some(BinCode::root()),
        }
    }

    /// Returns the number of segments of the code, the root has depth `0`
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.segments().count()
        }
    }

    /// Returns an iterator of the dot-separated segments
    pub fn segments(&self) -> std::str::Split<'_, char> {
        self.inner.split('.')
    }

    /// Returns the codes of all ancestors, nearest first, ending with the root
    pub fn ancestors(&self) -> Vec<BinCode> {
        let mut res = Vec::with_capacity(self.depth());
        let mut current = self.parent();
        while let Some(code) = current {
            current = code.parent();
            res.push(code);
        }
        res
    }
}

impl TryFrom<&str> for BinCode {
    type Error = EnrichError;
    fn try_from(value: &str) -> EnrichResult<Self> {
        let value = value.trim();
        if value.is_empty() || value.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(EnrichError::InvalidCode(value.to_string()));
        }
        Ok(BinCode {
            inner: value.to_string(),
        })
    }
}

impl TryFrom<String> for BinCode {
    type Error = EnrichError;
    fn try_from(value: String) -> EnrichResult<Self> {
        BinCode::try_from(value.as_str())
    }
}

/// Codes are compared segment by segment, numeric segments by value
///
/// `2` is sorted before `10` and `1.2` before `1.10`.
impl Ord for BinCode {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut lhs = self.segments();
        let mut rhs = other.segments();
        loop {
            match (lhs.next(), rhs.next()) {
                (Some(a), Some(b)) => {
                    let ord = match (a.parse::<u64>(), b.parse::<u64>()) {
                        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
                        _ => a.cmp(b),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

impl PartialOrd for BinCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Debug for BinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BinCode({})", self.inner)
    }
}

impl Display for BinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Borrow<str> for BinCode {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl PartialEq<str> for BinCode {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for BinCode {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parent_codes() {
        let code = BinCode::try_from("1.2.3").unwrap();
        assert_eq!(code.parent().unwrap(), "1.2");
        assert_eq!(code.parent().unwrap().parent().unwrap(), "1");
        assert_eq!(
            code.parent().unwrap().parent().unwrap().parent().unwrap(),
            BinCode::root()
        );
    }

    #[test]
    fn ancestors_end_with_root() {
        let code = BinCode::try_from("35.1.40").unwrap();
        let ancestors = code.ancestors();
        assert_eq!(ancestors.len(), 3);
        assert_eq!(ancestors[0], "35.1");
        assert_eq!(ancestors[1], "35");
        assert!(ancestors[2].is_root());
        assert!(BinCode::root().ancestors().is_empty());
    }

    #[test]
    fn invalid_codes() {
        assert!(BinCode::try_from("").is_err());
        assert!(BinCode::try_from("  ").is_err());
        assert!(BinCode::try_from("1.").is_err());
        assert!(BinCode::try_from(".1").is_err());
        assert!(BinCode::try_from("1..2").is_err());
    }

    #[test]
    fn numeric_ordering() {
        let mut codes: Vec<BinCode> = ["10", "2", "1.10", "1.2", "1", "0"]
            .into_iter()
            .map(|c| BinCode::try_from(c).unwrap())
            .collect();
        codes.sort();
        let codes: Vec<&str> = codes.iter().map(BinCode::as_str).collect();
        assert_eq!(codes, vec!["0", "1", "1.2", "1.10", "2", "10"]);
    }

    #[test]
    fn ordering_is_consistent_with_eq() {
        let a = BinCode::try_from("01").unwrap();
        let b = BinCode::try_from("1").unwrap();
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn depth() {
        assert_eq!(BinCode::root().depth(), 0);
        assert_eq!(BinCode::try_from("4").unwrap().depth(), 1);
        assert_eq!(BinCode::try_from("4.1.1.2").unwrap().depth(), 4);
    }
}
