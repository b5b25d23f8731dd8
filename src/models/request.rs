use serde::Serialize;

/// Range the color control may move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorLimits {
    pub min: u16,
    pub max: u16,
}

impl ColorLimits {
    /// Clamp `count` into the range; an inverted range collapses to `min`
    pub fn clamp(&self, count: i64) -> u16 {
        let max = self.max.max(self.min);
        count.clamp(self.min as i64, max as i64) as u16
    }
}

/// One state of the color controls.
///
/// Every change of the slider or the monochrome switch produces a new
/// request; later requests supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QuantizationRequest {
    pub color_count: u16,
    pub monochrome: bool,
}

impl QuantizationRequest {
    pub fn new(color_count: u16, monochrome: bool) -> Self {
        Self {
            color_count,
            monochrome,
        }
    }

    /// Request from a raw control value, clamped into `limits`.
    pub fn clamped(count: i64, monochrome: bool, limits: ColorLimits) -> Self {
        Self::new(limits.clamp(count), monochrome)
    }

    /// One scroll step up (`delta > 0`) or down, clamped into `limits`.
    pub fn stepped(self, delta: i64, limits: ColorLimits) -> Self {
        Self::clamped(self.color_count as i64 + delta, self.monochrome, limits)
    }

    /// Same count with the monochrome switch flipped.
    pub fn toggled(self) -> Self {
        Self::new(self.color_count, !self.monochrome)
    }

    pub fn with_monochrome(self, monochrome: bool) -> Self {
        Self::new(self.color_count, monochrome)
    }
}

impl std::fmt::Display for QuantizationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} colors", self.color_count)?;
        if self.monochrome {
            write!(f, ", monochrome")?;
        }
        Ok(())
    }
}
