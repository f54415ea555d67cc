//! Normalized in-memory model of the directory data.
//!
//! Field names match the persisted JSON snapshot format, so these types
//! round-trip through `serde_json` verbatim. All frequencies are MHz.

use serde::{Deserialize, Serialize};

use crate::codes::{Mode, Modulation, Tag, Tone};

/// A talkgroup within a trunked system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talkgroup {
    pub tg_id: i64,
    pub tg_name: String,
    pub tg_tag: Tag,
}

/// A physical transmitter site of a trunked system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub site_id: i64,
    /// Control (signaling) frequencies, in service order.
    pub control: Vec<f64>,
    /// Traffic/voice channel frequencies, in service order.
    pub channels: Vec<f64>,
    pub lat: f64,
    pub long: f64,
    /// Coverage radius in miles.
    pub range: f64,
}

/// A trunked radio system with its sites and talkgroups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    pub system_id: i64,
    pub modulation: Modulation,
    pub talkgroups: Vec<Talkgroup>,
    pub sites: Vec<Site>,
}

/// One conventional frequency of an agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyFreq {
    pub name: String,
    pub tone: Tone,
    /// Output frequency in MHz.
    pub freq: f64,
    pub tag: Tag,
    pub mode: Mode,
}

/// A conventional radio user entity. The id is the directory service's
/// subcategory id; `county_name` is the state name for state-level agencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub agency_id: i64,
    pub county_name: String,
    pub agency_name: String,
    pub freqs: Vec<AgencyFreq>,
}

/// Top-level aggregate: the unit of persistence and of export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub systems: Vec<System>,
    pub agencies: Vec<Agency>,
}
