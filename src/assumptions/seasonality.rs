//! Regional seasonality profiles and the month-to-season calendar
//!
//! AC runtime varies dramatically by month and region: northern peak-summer
//! usage runs 1.7x baseline while deep winter drops to 0.05x. Southern
//! profiles are flatter. Plan hour buckets key off the coarser three-season
//! calendar rather than the raw monthly multipliers.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Geographic region of a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    North,
    South,
    West,
    East,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::West, Region::East];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "north",
            Region::South => "south",
            Region::West => "west",
            Region::East => "east",
        }
    }
}

/// Season used for plan hour buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Shoulder,
    Summer,
}

/// Region mix of the customer population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionMix {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl Default for RegionMix {
    fn default() -> Self {
        // AC market share by region
        Self {
            north: 0.35,
            south: 0.30,
            west: 0.25,
            east: 0.10,
        }
    }
}

impl RegionMix {
    pub fn get(&self, region: Region) -> f64 {
        match region {
            Region::North => self.north,
            Region::South => self.south,
            Region::West => self.west,
            Region::East => self.east,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        let sum: f64 = Region::ALL.iter().map(|&r| self.get(r)).sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ModelError::config(format!(
                "region proportions must sum to 1.0, got {sum:.6}"
            )));
        }
        Ok(())
    }
}

/// Monthly usage multipliers by region, Jan through Dec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityProfiles {
    pub north: [f64; 12],
    pub south: [f64; 12],
    pub west: [f64; 12],
    pub east: [f64; 12],
}

impl Default for SeasonalityProfiles {
    fn default() -> Self {
        Self {
            north: [0.05, 0.15, 0.60, 1.40, 1.70, 1.30, 0.80, 0.70, 0.80, 0.50, 0.15, 0.05],
            south: [0.40, 0.50, 0.80, 1.20, 1.30, 1.10, 0.90, 0.90, 0.90, 0.70, 0.50, 0.40],
            west: [0.20, 0.30, 0.70, 1.30, 1.50, 1.20, 0.80, 0.80, 0.90, 0.60, 0.30, 0.20],
            east: [0.15, 0.25, 0.65, 1.35, 1.60, 1.25, 0.85, 0.85, 0.90, 0.55, 0.25, 0.15],
        }
    }
}

impl SeasonalityProfiles {
    /// Usage multiplier for a region in a given month of year (0 = Jan).
    pub fn multiplier(&self, region: Region, month_of_year: u32) -> f64 {
        let profile = match region {
            Region::North => &self.north,
            Region::South => &self.south,
            Region::West => &self.west,
            Region::East => &self.east,
        };
        profile[(month_of_year % 12) as usize]
    }
}

/// Month-to-season mapping per region.
///
/// All four regions currently share the same calendar: Nov through Feb is
/// winter, May through Aug is summer, the rest shoulder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonCalendar {
    north: [Season; 12],
    south: [Season; 12],
    west: [Season; 12],
    east: [Season; 12],
}

const DEFAULT_CALENDAR: [Season; 12] = [
    Season::Winter,   // Jan
    Season::Winter,   // Feb
    Season::Shoulder, // Mar
    Season::Shoulder, // Apr
    Season::Summer,   // May
    Season::Summer,   // Jun
    Season::Summer,   // Jul
    Season::Summer,   // Aug
    Season::Shoulder, // Sep
    Season::Shoulder, // Oct
    Season::Winter,   // Nov
    Season::Winter,   // Dec
];

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self {
            north: DEFAULT_CALENDAR,
            south: DEFAULT_CALENDAR,
            west: DEFAULT_CALENDAR,
            east: DEFAULT_CALENDAR,
        }
    }
}

impl SeasonCalendar {
    /// Season for a region in a given month of year (0 = Jan).
    pub fn season_for(&self, region: Region, month_of_year: u32) -> Season {
        let calendar = match region {
            Region::North => &self.north,
            Region::South => &self.south,
            Region::West => &self.west,
            Region::East => &self.east,
        };
        calendar[(month_of_year % 12) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_mix_sums_to_one() {
        assert!(RegionMix::default().validate().is_ok());
    }

    #[test]
    fn test_bad_region_mix_rejected() {
        let mix = RegionMix {
            north: 0.5,
            south: 0.5,
            west: 0.5,
            east: 0.5,
        };
        assert!(mix.validate().is_err());
    }

    #[test]
    fn test_north_peaks_in_may() {
        let profiles = SeasonalityProfiles::default();
        assert_eq!(profiles.multiplier(Region::North, 4), 1.70);
        assert_eq!(profiles.multiplier(Region::North, 11), 0.05);
    }

    #[test]
    fn test_month_wraps_modulo_twelve() {
        let profiles = SeasonalityProfiles::default();
        assert_eq!(
            profiles.multiplier(Region::West, 16),
            profiles.multiplier(Region::West, 4)
        );
    }

    #[test]
    fn test_season_calendar() {
        let calendar = SeasonCalendar::default();
        assert_eq!(calendar.season_for(Region::North, 0), Season::Winter); // Jan
        assert_eq!(calendar.season_for(Region::South, 3), Season::Shoulder); // Apr
        assert_eq!(calendar.season_for(Region::East, 6), Season::Summer); // Jul
        assert_eq!(calendar.season_for(Region::West, 10), Season::Winter); // Nov
    }
}
