//! The fixed set of body-weight classes the face model predicts

/// Number of output logits the classifier produces
pub const NUM_CLASSES: i64 = 3;

/// A body-weight class inferred from a face photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyClass {
    Underweight = 0,
    Normal = 1,
    Overweight = 2,
}

impl BodyClass {
    pub const ALL: [BodyClass; 3] = [Self::Underweight, Self::Normal, Self::Overweight];

    /// Map a model output index back to its class
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
        }
    }

    /// The user-facing message, in Thai
    pub fn message(self) -> &'static str {
        match self {
            Self::Underweight => "คุณมีน้ำหนักต่ำกว่าเกณฑ์ 🥺",
            Self::Normal => "คุณมีน้ำหนักอยู่ในเกณฑ์ปกติ 👍",
            Self::Overweight => "คุณมีน้ำหนักเกินเกณฑ์ 😅",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index() {
        assert_eq!(BodyClass::from_index(0), Some(BodyClass::Underweight));
        assert_eq!(BodyClass::from_index(1), Some(BodyClass::Normal));
        assert_eq!(BodyClass::from_index(2), Some(BodyClass::Overweight));
        assert_eq!(BodyClass::from_index(3), None);
        assert_eq!(BodyClass::from_index(-1), None);
    }

    #[test]
    fn test_table_is_consistent() {
        assert_eq!(BodyClass::ALL.len() as i64, NUM_CLASSES);
        for (i, class) in BodyClass::ALL.iter().enumerate() {
            assert_eq!(class.id() as usize, i);
        }
        assert_eq!(BodyClass::Normal.name(), "normal");
        assert_eq!(BodyClass::Normal.message(), "คุณมีน้ำหนักอยู่ในเกณฑ์ปกติ 👍");
    }
}
