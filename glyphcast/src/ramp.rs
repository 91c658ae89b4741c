use crate::error::Error;

/// One bucket of a [`BrightnessRamp`]: brightness strictly below `threshold` selects `glyph`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStep {
    pub threshold: f64,
    pub glyph: char,
}

/// Ordered threshold-to-glyph mapping used to quantize cell brightness.
///
/// Thresholds are strictly ascending. The ramp is total: a brightness at or
/// above the last threshold maps to the last glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessRamp {
    steps: Vec<RampStep>,
}

/// Upper bounds of the default brightness buckets.
pub const DEFAULT_THRESHOLDS: [f64; 7] = [51.0, 102.0, 140.0, 170.0, 200.0, 210.0, 255.0];
/// Glyphs of the default ramp, darkest first.
pub const DEFAULT_GLYPHS: [char; 7] = [' ', '\'', ':', 'i', 'I', 'J', '$'];

// alternative glyph sets, darkest first
const COMPACT: &str = " .:-=+*#%@"; // 10 chars
const BLOCKS: &str = " ░▒▓█"; // 5 chars

pub enum RampPreset {
    Default,
    Compact,
    Blocks,
    Custom(Vec<char>),
}

impl RampPreset {
    pub fn ramp(self) -> Result<BrightnessRamp, Error> {
        match self {
            RampPreset::Default => Ok(BrightnessRamp::default()),
            RampPreset::Compact => BrightnessRamp::from_glyphs(COMPACT.chars()),
            RampPreset::Blocks => BrightnessRamp::from_glyphs(BLOCKS.chars()),
            RampPreset::Custom(chars) => BrightnessRamp::from_glyphs(chars),
        }
    }

    /// Resolves a preset name, treating anything unknown as a literal glyph string.
    pub fn parse(name: &str) -> Self {
        match name {
            "default" => RampPreset::Default,
            "compact" => RampPreset::Compact,
            "blocks" => RampPreset::Blocks,
            chars => RampPreset::Custom(chars.chars().collect()),
        }
    }
}

impl Default for BrightnessRamp {
    fn default() -> Self {
        Self {
            steps: DEFAULT_THRESHOLDS
                .iter()
                .zip(DEFAULT_GLYPHS)
                .map(|(&threshold, glyph)| RampStep { threshold, glyph })
                .collect(),
        }
    }
}

impl BrightnessRamp {
    /// Builds a ramp from explicit buckets.
    pub fn new(steps: Vec<RampStep>) -> Result<Self, Error> {
        if steps.is_empty() {
            return Err(Error::Config("brightness ramp needs at least one glyph".into()));
        }
        if let Some(pair) = steps
            .windows(2)
            .find(|pair| !(pair[0].threshold < pair[1].threshold))
        {
            return Err(Error::Config(format!(
                "ramp thresholds must be strictly ascending ({} then {})",
                pair[0].threshold, pair[1].threshold
            )));
        }
        Ok(Self { steps })
    }

    /// Spreads `glyphs` evenly over the 0..=255 brightness range, darkest first.
    pub fn from_glyphs(glyphs: impl IntoIterator<Item = char>) -> Result<Self, Error> {
        let glyphs: Vec<char> = glyphs.into_iter().collect();
        let n = glyphs.len();
        Self::new(
            glyphs
                .into_iter()
                .enumerate()
                .map(|(i, glyph)| RampStep {
                    threshold: 256.0 * (i + 1) as f64 / n as f64,
                    glyph,
                })
                .collect(),
        )
    }

    /// Returns the glyph of the first bucket whose threshold is strictly greater than
    /// `brightness`, or the last glyph when no such bucket exists. NaN compares below
    /// no threshold and so maps to the last glyph.
    pub fn glyph_for(&self, brightness: f64) -> char {
        let idx = self
            .steps
            .partition_point(|step| brightness.is_nan() || step.threshold <= brightness);
        self.steps
            .get(idx)
            .or_else(|| self.steps.last())
            .map_or(' ', |step| step.glyph)
    }

    pub fn steps(&self) -> &[RampStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_scan(ramp: &BrightnessRamp, b: f64) -> char {
        for step in ramp.steps() {
            if b < step.threshold {
                return step.glyph;
            }
        }
        ramp.steps().last().unwrap().glyph
    }

    #[test]
    fn threshold_ties_select_the_next_bucket() {
        let ramp = BrightnessRamp::default();
        assert_eq!(ramp.glyph_for(50.0), ' ');
        assert_eq!(ramp.glyph_for(51.0), '\'');
        assert_eq!(ramp.glyph_for(101.99), '\'');
        assert_eq!(ramp.glyph_for(102.0), ':');
        assert_eq!(ramp.glyph_for(254.0), '$');
        assert_eq!(ramp.glyph_for(255.0), '$');
    }

    #[test]
    fn out_of_range_values_clamp_to_the_ends() {
        let ramp = BrightnessRamp::default();
        assert_eq!(ramp.glyph_for(-40.0), ' ');
        assert_eq!(ramp.glyph_for(1000.0), '$');
    }

    #[test]
    fn nan_matches_linear_scan() {
        let ramp = BrightnessRamp::default();
        assert_eq!(ramp.glyph_for(f64::NAN), '$');
        assert_eq!(ramp.glyph_for(f64::NAN), linear_scan(&ramp, f64::NAN));
    }

    #[test]
    fn binary_search_agrees_with_linear_scan() {
        let ramp = BrightnessRamp::default();
        for tenth in 0..=2600 {
            let b = tenth as f64 / 10.0;
            assert_eq!(ramp.glyph_for(b), linear_scan(&ramp, b), "brightness {b}");
        }
    }

    #[test]
    fn rejects_unordered_or_empty_ramps() {
        assert!(BrightnessRamp::new(vec![]).is_err());
        let steps = vec![
            RampStep { threshold: 100.0, glyph: 'a' },
            RampStep { threshold: 100.0, glyph: 'b' },
        ];
        assert!(matches!(BrightnessRamp::new(steps), Err(Error::Config(_))));
    }

    #[test]
    fn evenly_spread_glyphs_cover_the_range() {
        let ramp = RampPreset::Compact.ramp().unwrap();
        assert_eq!(ramp.steps().len(), 10);
        assert_eq!(ramp.glyph_for(0.0), ' ');
        assert_eq!(ramp.glyph_for(255.0), '@');
    }

    #[test]
    fn unknown_preset_names_are_literal_glyphs() {
        let ramp = RampPreset::parse(" #").ramp().unwrap();
        assert_eq!(ramp.glyph_for(10.0), ' ');
        assert_eq!(ramp.glyph_for(200.0), '#');
    }
}
