//! Catalog identifiers understood by the image search API.
//!
//! The wire strings are the values stored in the image catalog, so they
//! are not a uniform case convention (`L1b` next to `CLOUD_MOISTURE_IMAGERY`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SiteError;

macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every known value, in catalog order.
            pub const ALL: &'static [$name] = &[$( $name::$variant, )+];

            /// Wire string sent to and received from the API.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = SiteError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err(SiteError::UnknownValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

catalog_enum! {
    /// Product family of an image.
    pub enum Acronym ("acronym") {
        /// Level 1b radiances.
        L1b => "L1b",
        CloudTopHeight => "CLOUD_TOP_HEIGHT",
        CloudTopTemperature => "CLOUD_TOP_TEMPERATURE",
        ClearSkyMasks => "CLEAR_SKY_MASKS",
        CloudTopPhase => "CLOUD_TOP_PHASE",
        AerosolOpticalDepth => "AEROSOL_OPTICAL_DEPTH",
        CloudMoistureImagery => "CLOUD_MOISTURE_IMAGERY",
        MultibandCloudMoistureImagery => "MULTIBAND_CLOUD_MOISTURE_IMAGERY",
        CloudOpticalDepth => "CLOUD_OPTICAL_DEPTH",
        CloudParticleSizeDistribution => "CLOUD_PARTICLE_SIZE_DISTRIBUTION",
        CloudTopPressure => "CLOUD_TOP_PRESSURE",
        DerivedMotionWind => "DERIVED_MOTION_WIND",
        DerivedMotionWindBand8 => "DERIVED_MOTION_WIND_BAND8",
        DerivedStabilityIndex => "DERIVED_STABILITY_INDEX",
        DownwardShortwaveSurface => "DOWNWARD_SHORTWAVE_SURFACE",
        FireHotCharacterization => "FIRE_HOT_CHARACTERIZATION",
        SnowCover => "SNOW_COVER",
        LandSkinTemperature => "LAND_SKIN_TEMPERATURE",
        LegacyVerticalMoistureProfile => "LEGACY_VERTICAL_MOISTURE_PROFILE",
        LegacyVerticalTemperatureProfile => "LEGACY_VERTICAL_TEMPERATURE_PROFILE",
        RainfallRate => "RAINFALL_RATE",
        ReflectedShortwave => "REFLECTED_SHORTWAVE",
        SeaSkinTemperature => "SEA_SKIN_TEMPERATURE",
        TotalPrecipitableWater => "TOTAL_PRECIPITABLE_WATER",
    }
}

catalog_enum! {
    /// ABI band, plus the two composite full color products.
    pub enum Channel ("channel") {
        Blue => "BLUE",
        Red => "RED",
        Veggie => "VEGGIE",
        Cirrus => "CIRRUS",
        SnowIce => "SNOWICE",
        CloudParticleSize => "CLOUD_PARTICLE_SIZE",
        ShortwaveWindow => "SHORTWAVE_WINDOW",
        UpperLevelTroposphericWaterVapor => "UPPER_LEVEL_TROPOSPHERIC_WATER_VAPOR",
        MidLevelTroposphericWaterVapor => "MID_LEVEL_TROPOSPHERIC_WATER_VAPOR",
        LowerLevelWaterVapor => "LOWER_LEVEL_WATER_VAPOR",
        CloudTopPhase => "CLOUD_TOP_PHASE",
        Ozone => "OZONE",
        CleanIr => "CLEAN_IR",
        Ir => "IR",
        DirtyIr => "DIRTY_IR",
        Co2 => "CO2",
        FullColor => "FULL_COLOR",
        /// Full color with country outlines.
        FullColorLines => "FULL_COLOR_LINES",
    }
}

catalog_enum! {
    /// Imaged coverage area.
    pub enum Sector ("sector") {
        FullDisk => "FULL_DISK",
        Conus => "CONUS",
        Mesoscale1 => "MESOSCALE1",
        Mesoscale2 => "MESOSCALE2",
    }
}

catalog_enum! {
    /// GOES-R series platform.
    pub enum Satellite ("satellite") {
        Goes16 => "GOES16",
        Goes17 => "GOES17",
        Goes18 => "GOES18",
        Goes19 => "GOES19",
    }
}

impl Acronym {
    /// Whether images of this product family are split by channel.
    pub fn has_channel(self) -> bool {
        matches!(
            self,
            Acronym::L1b | Acronym::CloudMoistureImagery | Acronym::DerivedMotionWind
        )
    }
}

impl Channel {
    /// Channel selected whenever a channel-bearing acronym is picked.
    pub const DEFAULT: Channel = Channel::FullColorLines;
}

/// Parse an optional form value, treating an empty string as absent.
pub fn parse_optional<T>(value: &str) -> Result<Option<T>, SiteError>
where
    T: FromStr<Err = SiteError>,
{
    let value = value.trim();
    if value.is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}
