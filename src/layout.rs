//! Page geometry

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::letter()
    }
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_inches(8.5),
            height: Length::from_inches(11.0),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// Look up a paper size by name (`letter`, `a4`), case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "letter" => Some(Self::letter()),
            "a4" => Some(Self::a4()),
            _ => None,
        }
    }

    /// `/MediaBox` corners in whole points: `[0 0 width height]`
    pub fn media_box(&self) -> [i64; 4] {
        [
            0,
            0,
            self.width.pt().round() as i64,
            self.height.pt().round() as i64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let len = Length::from_inches(1.0);
        assert!((len.mm() - 25.4).abs() < 0.01);
        assert!((len.pt() - 72.0).abs() < 0.01);
        assert!((Length::from_pt(72.0).mm() - 25.4).abs() < 0.01);
    }

    #[test]
    fn test_letter_media_box() {
        assert_eq!(PageDimensions::letter().media_box(), [0, 0, 612, 792]);
        assert_eq!(PageDimensions::default(), PageDimensions::letter());
    }

    #[test]
    fn test_a4_media_box() {
        assert_eq!(PageDimensions::a4().media_box(), [0, 0, 595, 842]);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PageDimensions::from_name("A4"), Some(PageDimensions::a4()));
        assert_eq!(PageDimensions::from_name("letter"), Some(PageDimensions::letter()));
        assert_eq!(PageDimensions::from_name("tabloid"), None);
    }
}
