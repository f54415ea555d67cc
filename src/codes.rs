//! Classification code tables for the RadioReference directory service.
//!
//! The service describes talkgroups, systems and frequencies with bare
//! numeric codes that it extends over time. Every mapping here is total:
//! a code without a table entry resolves to the `Unknown` (or `None`)
//! member instead of failing, so one unrecognized record never aborts an
//! acquisition run.
//!
//! Persisted form is `{"name": ..., "value": ...}` for every enum, and
//! deserialization resolves by `name` alone. New table entries therefore
//! never re-label values in old snapshots.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Serialize)]
struct NamedValue<'a, V: Serialize> {
    name: &'a str,
    value: V,
}

/// Captures only the `name` field of a persisted enum; `value` is ignored.
#[derive(Deserialize)]
struct NamedRef {
    name: String,
}

/// Category label for a talkgroup or conventional frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Unknown,
    Dispatch,
    Tactical,
    Talk,
    Emergency,
    Rescue,
    Hospital,
    Interop,
    Police,
    PoliceDispatch,
    PoliceTactical,
    PoliceTalk,
    Fire,
    FireDispatch,
    FireTactical,
    FireTalk,
    Ems,
    EmsDispatch,
    EmsTactical,
    EmsTalk,
    Military,
    Aircraft,
    Transportation,
    PublicWorks,
    Schools,
    Business,
    HamRadio,
    Federal,
    Railroad,
    Media,
    Security,
    Utilities,
    Data,
    Corrections,
}

impl Tag {
    /// Map a service tag code to a `Tag`. Unlisted codes become `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Tag::Dispatch,
            2 => Tag::PoliceDispatch,
            3 => Tag::FireDispatch,
            4 => Tag::EmsDispatch,
            6 => Tag::Tactical,
            7 => Tag::PoliceTactical,
            8 => Tag::FireTactical,
            9 => Tag::EmsTactical,
            11 => Tag::Interop,
            12 => Tag::Hospital,
            13 => Tag::HamRadio,
            14 => Tag::PublicWorks,
            15 => Tag::Aircraft,
            16 => Tag::Federal,
            17 => Tag::Business,
            20 => Tag::Railroad,
            21 => Tag::Unknown,
            22 => Tag::Talk,
            23 => Tag::PoliceTalk,
            24 => Tag::FireTalk,
            25 => Tag::EmsTalk,
            26 => Tag::Transportation,
            29 => Tag::Emergency,
            30 => Tag::Military,
            31 => Tag::Media,
            32 => Tag::Schools,
            33 => Tag::Security,
            34 => Tag::Utilities,
            35 => Tag::Data,
            36 => Tag::Unknown,
            37 => Tag::Corrections,
            _ => Tag::Unknown,
        }
    }

    /// Symbolic name used in persisted snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Unknown => "UNKNOWN",
            Tag::Dispatch => "DISPATCH",
            Tag::Tactical => "TACTICAL",
            Tag::Talk => "TALK",
            Tag::Emergency => "EMERGENCY",
            Tag::Rescue => "RESCUE",
            Tag::Hospital => "HOSPITAL",
            Tag::Interop => "INTEROP",
            Tag::Police => "POLICE",
            Tag::PoliceDispatch => "POLICE_DISPATCH",
            Tag::PoliceTactical => "POLICE_TACTICAL",
            Tag::PoliceTalk => "POLICE_TALK",
            Tag::Fire => "FIRE",
            Tag::FireDispatch => "FIRE_DISPATCH",
            Tag::FireTactical => "FIRE_TACTICAL",
            Tag::FireTalk => "FIRE_TALK",
            Tag::Ems => "EMS",
            Tag::EmsDispatch => "EMS_DISPATCH",
            Tag::EmsTactical => "EMS_TACTICAL",
            Tag::EmsTalk => "EMS_TALK",
            Tag::Military => "MILITARY",
            Tag::Aircraft => "AIRCRAFT",
            Tag::Transportation => "TRANSPORTATION",
            Tag::PublicWorks => "PUBLIC_WORKS",
            Tag::Schools => "SCHOOLS",
            Tag::Business => "BUSINESS",
            Tag::HamRadio => "HAM_RADIO",
            Tag::Federal => "FEDERAL",
            Tag::Railroad => "RAILROAD",
            Tag::Media => "MEDIA",
            Tag::Security => "SECURITY",
            Tag::Utilities => "UTILITIES",
            Tag::Data => "DATA",
            Tag::Corrections => "CORRECTIONS",
        }
    }

    /// Display label, e.g. for the playlist `group` attribute.
    pub fn display(&self) -> &'static str {
        match self {
            Tag::Unknown => "Unknown",
            Tag::Dispatch => "Dispatch",
            Tag::Tactical => "Tactical",
            Tag::Talk => "Talk",
            Tag::Emergency => "Emergency",
            Tag::Rescue => "Rescue",
            Tag::Hospital => "Hospital",
            Tag::Interop => "Interop",
            Tag::Police => "Police",
            Tag::PoliceDispatch => "Police Dispatch",
            Tag::PoliceTactical => "Police Tactical",
            Tag::PoliceTalk => "Police Talk",
            Tag::Fire => "Fire",
            Tag::FireDispatch => "Fire Dispatch",
            Tag::FireTactical => "Fire Tactical",
            Tag::FireTalk => "Fire Talk",
            Tag::Ems => "EMS",
            Tag::EmsDispatch => "EMS Dispatch",
            Tag::EmsTactical => "EMS Tactical",
            Tag::EmsTalk => "EMS Talk",
            Tag::Military => "Military",
            Tag::Aircraft => "Aircraft",
            Tag::Transportation => "Transportation",
            Tag::PublicWorks => "Public Works",
            Tag::Schools => "Schools",
            Tag::Business => "Business",
            Tag::HamRadio => "Ham Radio",
            Tag::Federal => "Federal",
            Tag::Railroad => "Railroad",
            Tag::Media => "Media",
            Tag::Security => "Security",
            Tag::Utilities => "Utilities",
            Tag::Data => "Data",
            Tag::Corrections => "Corrections",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        const ALL: [Tag; 34] = [
            Tag::Unknown,
            Tag::Dispatch,
            Tag::Tactical,
            Tag::Talk,
            Tag::Emergency,
            Tag::Rescue,
            Tag::Hospital,
            Tag::Interop,
            Tag::Police,
            Tag::PoliceDispatch,
            Tag::PoliceTactical,
            Tag::PoliceTalk,
            Tag::Fire,
            Tag::FireDispatch,
            Tag::FireTactical,
            Tag::FireTalk,
            Tag::Ems,
            Tag::EmsDispatch,
            Tag::EmsTactical,
            Tag::EmsTalk,
            Tag::Military,
            Tag::Aircraft,
            Tag::Transportation,
            Tag::PublicWorks,
            Tag::Schools,
            Tag::Business,
            Tag::HamRadio,
            Tag::Federal,
            Tag::Railroad,
            Tag::Media,
            Tag::Security,
            Tag::Utilities,
            Tag::Data,
            Tag::Corrections,
        ];
        ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NamedValue { name: self.name(), value: self.display() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named = NamedRef::deserialize(deserializer)?;
        Tag::from_name(&named.name)
            .ok_or_else(|| D::Error::custom(format!("unknown Tag name '{}'", named.name)))
    }
}

/// Physical/protocol modulation of a trunked system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modulation {
    Unknown,
    P25,
    P25Phase1,
    P25Phase2,
    Dmr,
    Nxdn,
    Fm,
    Am,
}

impl Modulation {
    /// Derive a modulation from the service's system type and flavor codes.
    ///
    /// The type code selects a modulation family; for the P25 family the
    /// flavor narrows to Phase 1 (20) or Phase 2 (33), any other flavor
    /// stays generic P25. Unlisted type codes become `Unknown`.
    pub fn from_system_type(s_type: i64, s_flavor: i64) -> Self {
        match s_type {
            8 => match s_flavor {
                20 => Modulation::P25Phase1,
                33 => Modulation::P25Phase2,
                _ => Modulation::P25,
            },
            12 => Modulation::Dmr,
            11 => Modulation::Nxdn,
            7 | 1 => Modulation::Unknown,
            _ => Modulation::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Modulation::Unknown => "UNKNOWN",
            Modulation::P25 => "P25",
            Modulation::P25Phase1 => "P25_P1",
            Modulation::P25Phase2 => "P25_P2",
            Modulation::Dmr => "DMR",
            Modulation::Nxdn => "NXDN",
            Modulation::Fm => "FM",
            Modulation::Am => "AM",
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            Modulation::Unknown => 0,
            Modulation::P25 => 1,
            Modulation::P25Phase1 => 2,
            Modulation::P25Phase2 => 3,
            Modulation::Dmr => 4,
            Modulation::Nxdn => 5,
            Modulation::Fm => 6,
            Modulation::Am => 7,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        const ALL: [Modulation; 8] = [
            Modulation::Unknown,
            Modulation::P25,
            Modulation::P25Phase1,
            Modulation::P25Phase2,
            Modulation::Dmr,
            Modulation::Nxdn,
            Modulation::Fm,
            Modulation::Am,
        ];
        ALL.into_iter().find(|m| m.name() == name)
    }
}

impl Serialize for Modulation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NamedValue { name: self.name(), value: self.value() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Modulation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named = NamedRef::deserialize(deserializer)?;
        Modulation::from_name(&named.name)
            .ok_or_else(|| D::Error::custom(format!("unknown Modulation name '{}'", named.name)))
    }
}

/// Audio/data mode of a conventional channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Unknown,
    Fm,
    P25,
    Am,
    Fmn,
    Telemetry,
    Dmr,
    Nxdn48,
    DStar,
    Usb,
    Lsb,
    Ysf,
    Nxdn96,
}

impl Mode {
    /// Direct numeric lookup; unlisted codes become `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Mode::Fm,
            2 => Mode::P25,
            3 => Mode::Am,
            4 => Mode::Fmn,
            5 => Mode::Telemetry,
            6 => Mode::Dmr,
            7 => Mode::Nxdn48,
            8 => Mode::DStar,
            9 => Mode::Usb,
            10 => Mode::Lsb,
            11 => Mode::Ysf,
            12 => Mode::Nxdn96,
            _ => Mode::Unknown,
        }
    }

    /// Digital trunked modes belong to the System/Talkgroup model and are
    /// excluded from conventional agency frequency lists.
    pub fn is_digital_trunked(&self) -> bool {
        matches!(self, Mode::P25 | Mode::Dmr | Mode::Nxdn48 | Mode::Nxdn96)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Unknown => "UNKNOWN",
            Mode::Fm => "FM",
            Mode::P25 => "P25",
            Mode::Am => "AM",
            Mode::Fmn => "FMN",
            Mode::Telemetry => "TELEMETRY",
            Mode::Dmr => "DMR",
            Mode::Nxdn48 => "NXDN48",
            Mode::DStar => "D_STAR",
            Mode::Usb => "USB",
            Mode::Lsb => "LSB",
            Mode::Ysf => "YSF",
            Mode::Nxdn96 => "NXDN96",
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            Mode::Unknown => 0,
            Mode::Fm => 1,
            Mode::P25 => 2,
            Mode::Am => 3,
            Mode::Fmn => 4,
            Mode::Telemetry => 5,
            Mode::Dmr => 6,
            Mode::Nxdn48 => 7,
            Mode::DStar => 8,
            Mode::Usb => 9,
            Mode::Lsb => 10,
            Mode::Ysf => 11,
            Mode::Nxdn96 => 12,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        const ALL: [Mode; 13] = [
            Mode::Unknown,
            Mode::Fm,
            Mode::P25,
            Mode::Am,
            Mode::Fmn,
            Mode::Telemetry,
            Mode::Dmr,
            Mode::Nxdn48,
            Mode::DStar,
            Mode::Usb,
            Mode::Lsb,
            Mode::Ysf,
            Mode::Nxdn96,
        ];
        ALL.into_iter().find(|m| m.name() == name)
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NamedValue { name: self.name(), value: self.value() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named = NamedRef::deserialize(deserializer)?;
        Mode::from_name(&named.name)
            .ok_or_else(|| D::Error::custom(format!("unknown Mode name '{}'", named.name)))
    }
}

/// Sub-audible squelch signaling type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneType {
    #[default]
    None,
    Ctcss,
    Dcs,
}

impl ToneType {
    pub fn name(&self) -> &'static str {
        match self {
            ToneType::None => "NONE",
            ToneType::Ctcss => "CTCSS",
            ToneType::Dcs => "DCS",
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            ToneType::None => 0,
            ToneType::Ctcss => 1,
            ToneType::Dcs => 2,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "NONE" => Some(ToneType::None),
            "CTCSS" => Some(ToneType::Ctcss),
            "DCS" => Some(ToneType::Dcs),
            _ => None,
        }
    }
}

impl Serialize for ToneType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NamedValue { name: self.name(), value: self.value() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToneType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named = NamedRef::deserialize(deserializer)?;
        ToneType::from_name(&named.name)
            .ok_or_else(|| D::Error::custom(format!("unknown ToneType name '{}'", named.name)))
    }
}

/// A squelch tone: CTCSS frequency in Hz or DCS code number, 0 when none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub tone_type: ToneType,
    pub tone_value: f64,
}

impl Tone {
    pub fn none() -> Self {
        Tone { tone_type: ToneType::None, tone_value: 0.0 }
    }

    /// Parse the service's tone string.
    ///
    /// A trailing `" PL"` marks CTCSS, a trailing `"DPL"` marks DCS, with
    /// the value in the prefix ("151.4 PL", "023DPL"). Anything else,
    /// including an absent tone or an unparsable prefix, is no tone.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Tone::none();
        };
        if let Some(prefix) = raw.strip_suffix(" PL") {
            if let Ok(value) = prefix.trim().parse::<f64>() {
                return Tone { tone_type: ToneType::Ctcss, tone_value: value };
            }
        } else if let Some(prefix) = raw.strip_suffix("DPL") {
            if let Ok(value) = prefix.trim().parse::<f64>() {
                return Tone { tone_type: ToneType::Dcs, tone_value: value };
            }
        }
        Tone::none()
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::none()
    }
}
