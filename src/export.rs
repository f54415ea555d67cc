//! sdrtrunk playlist exporter.
//!
//! Renders a [`Database`] into a version-4 `playlist` document: alias
//! entries for every trunked talkgroup, control-channel entries for P25
//! Phase 1/2 sites, and alias/channel pairs for conventional agency
//! frequencies.
//!
//! The conventional passes share a sequential talkgroup-style identifier
//! assigned in encounter order starting at 1. Aliases and channels are
//! rendered in the same iteration order with the same counter, so each
//! channel's `talkgroup` attribute matches its alias's `value` attribute.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::codes::{Mode, Modulation, ToneType};
use crate::error::{Error, Result};
use crate::model::{Database, System};

type XmlResult<T> = std::result::Result<T, quick_xml::Error>;

/// Delay between hops of a multiple-frequency tuner source, in ms.
const FREQUENCY_ROTATION_DELAY: &str = "400";

/// Render the playlist document and write it to `path` atomically
/// (temp file in the same directory, then rename).
pub async fn export_playlist(db: &Database, path: &Path) -> Result<()> {
    let bytes = render_playlist(db)?;

    let tmp = match path.file_name() {
        Some(name) => {
            let mut tmp_name = name.to_os_string();
            tmp_name.push(".tmp");
            path.with_file_name(tmp_name)
        }
        None => {
            return Err(Error::Persistence {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "playlist path has no file name",
                ),
            });
        }
    };

    fs::write(&tmp, &bytes)
        .await
        .map_err(|source| Error::Persistence { path: tmp.clone(), source })?;
    fs::rename(&tmp, path)
        .await
        .map_err(|source| Error::Persistence { path: path.to_path_buf(), source })?;

    info!(path = %path.display(), bytes = bytes.len(), "exported playlist");
    Ok(())
}

/// Render the playlist document as pretty-printed XML bytes.
pub fn render_playlist(db: &Database) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer.write_event(Event::Start(element("playlist", &[("version", "4")])))?;

    write_talkgroup_aliases(&mut writer, db)?;
    write_control_channels(&mut writer, db)?;
    write_agency_aliases(&mut writer, db)?;
    write_agency_channels(&mut writer, db)?;

    writer.write_event(Event::End(BytesEnd::new("playlist")))?;
    Ok(writer.into_inner())
}

/// MHz to whole Hz.
fn hz(mhz: f64) -> i64 {
    (mhz * 1e6).round() as i64
}

fn is_fm_family(mode: Mode) -> bool {
    matches!(mode, Mode::Fm | Mode::Fmn)
}

/// Conventional modes the exporter can emit; everything else is skipped.
fn is_exportable(mode: Mode) -> bool {
    matches!(mode, Mode::Fm | Mode::Fmn | Mode::Am)
}

/// Channels are only generated for P25 Phase 1/2 systems.
fn emits_control_channel(system: &System) -> bool {
    matches!(system.modulation, Modulation::P25Phase1 | Modulation::P25Phase2)
}

fn element(name: &'static str, attrs: &[(&str, &str)]) -> BytesStart<'static> {
    let mut elem = BytesStart::new(name);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    elem
}

fn write_empty(
    writer: &mut Writer<Vec<u8>>,
    name: &'static str,
    attrs: &[(&str, &str)],
) -> XmlResult<()> {
    writer.write_event(Event::Empty(element(name, attrs)))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &'static str,
    text: &str,
) -> XmlResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn write_talkgroup_aliases(writer: &mut Writer<Vec<u8>>, db: &Database) -> XmlResult<()> {
    for system in &db.systems {
        for talkgroup in &system.talkgroups {
            writer.write_event(Event::Start(element(
                "alias",
                &[
                    ("color", "0"),
                    ("group", talkgroup.tg_tag.display()),
                    ("list", &system.name),
                    ("name", &talkgroup.tg_name),
                ],
            )))?;
            write_empty(
                writer,
                "id",
                &[
                    ("type", "talkgroup"),
                    ("protocol", "APCO25"),
                    ("value", &talkgroup.tg_id.to_string()),
                ],
            )?;
            writer.write_event(Event::End(BytesEnd::new("alias")))?;
        }
    }
    Ok(())
}

fn write_control_channels(writer: &mut Writer<Vec<u8>>, db: &Database) -> XmlResult<()> {
    for system in &db.systems {
        for site in &system.sites {
            if site.control.is_empty() || !emits_control_channel(system) {
                continue;
            }
            debug!(system = %system.name, site = %site.name, "emitting control channel");

            writer.write_event(Event::Start(element(
                "channel",
                &[
                    ("system", &system.name),
                    ("site", &site.name),
                    ("name", "Control Channels"),
                    ("order", "0"),
                    ("enabled", "false"),
                ],
            )))?;

            writer.write_event(Event::Start(BytesStart::new("event_log_configuration")))?;
            write_text_element(writer, "logger", "DECODED_MESSAGE")?;
            writer.write_event(Event::End(BytesEnd::new("event_log_configuration")))?;

            write_empty(writer, "aux_decode_configuration", &[])?;
            write_empty(writer, "record_configuration", &[])?;

            if site.control.len() > 1 {
                writer.write_event(Event::Start(element(
                    "source_configuration",
                    &[
                        ("type", "sourceConfigTunerMultipleFrequency"),
                        ("frequency_rotation_delay", FREQUENCY_ROTATION_DELAY),
                        ("source_type", "TUNER_MULTIPLE_FREQUENCIES"),
                    ],
                )))?;
                for freq in &site.control {
                    write_text_element(writer, "frequency", &hz(*freq).to_string())?;
                }
                writer.write_event(Event::End(BytesEnd::new("source_configuration")))?;
            } else {
                write_empty(
                    writer,
                    "source_configuration",
                    &[
                        ("type", "sourceConfigTuner"),
                        ("frequency", &hz(site.control[0]).to_string()),
                        ("source_type", "TUNER"),
                    ],
                )?;
            }

            match system.modulation {
                Modulation::P25Phase1 => write_empty(
                    writer,
                    "decode_configuration",
                    &[
                        ("type", "decodeConfigP25Phase1"),
                        ("modulation", "C4FM"),
                        ("traffic_channel_pool_size", "20"),
                        ("ignore_data_calls", "false"),
                    ],
                )?,
                _ => write_empty(
                    writer,
                    "decode_configuration",
                    &[
                        ("type", "decodeConfigP25Phase2"),
                        ("auto_detect_scramble_parameters", "true"),
                        ("traffic_channel_pool_size", "20"),
                        ("ignore_data_calls", "false"),
                    ],
                )?,
            }

            write_text_element(writer, "alias_list_name", &system.name)?;
            writer.write_event(Event::End(BytesEnd::new("channel")))?;
        }
    }
    Ok(())
}

fn write_agency_aliases(writer: &mut Writer<Vec<u8>>, db: &Database) -> XmlResult<()> {
    let mut counter: i64 = 1;
    for agency in &db.agencies {
        for freq in &agency.freqs {
            if !is_exportable(freq.mode) {
                continue;
            }
            let protocol = if is_fm_family(freq.mode) { "NBFM" } else { "AM" };

            writer.write_event(Event::Start(element(
                "alias",
                &[
                    ("color", "0"),
                    ("group", freq.tag.display()),
                    ("list", "Agencies"),
                    ("name", &freq.name),
                ],
            )))?;
            write_empty(
                writer,
                "id",
                &[
                    ("type", "talkgroup"),
                    ("value", &counter.to_string()),
                    ("protocol", protocol),
                ],
            )?;
            if is_fm_family(freq.mode) && freq.tone.tone_type == ToneType::Dcs {
                let code = format!("N{:03}", freq.tone.tone_value as i64);
                write_empty(writer, "id", &[("type", "dcs"), ("code", &code)])?;
            }
            writer.write_event(Event::End(BytesEnd::new("alias")))?;
            counter += 1;
        }
    }
    Ok(())
}

fn write_agency_channels(writer: &mut Writer<Vec<u8>>, db: &Database) -> XmlResult<()> {
    // Same iteration order and counter as write_agency_aliases.
    let mut counter: i64 = 1;
    for agency in &db.agencies {
        for freq in &agency.freqs {
            if !is_exportable(freq.mode) {
                continue;
            }
            let talkgroup = counter.to_string();

            writer.write_event(Event::Start(element(
                "channel",
                &[
                    ("system", &agency.county_name),
                    ("site", &agency.agency_name),
                    ("name", &freq.name),
                    ("order", "1"),
                    ("enabled", "false"),
                ],
            )))?;

            if is_fm_family(freq.mode) && freq.tone.tone_type == ToneType::Dcs {
                writer.write_event(Event::Start(BytesStart::new("aux_decode_configuration")))?;
                write_text_element(writer, "aux_decoder", "DCS")?;
                writer.write_event(Event::End(BytesEnd::new("aux_decode_configuration")))?;
            } else {
                write_empty(writer, "aux_decode_configuration", &[])?;
            }
            write_empty(writer, "record_configuration", &[])?;
            write_empty(writer, "event_log_configuration", &[])?;

            write_empty(
                writer,
                "source_configuration",
                &[
                    ("type", "sourceConfigTuner"),
                    ("frequency", &hz(freq.freq).to_string()),
                    ("source_type", "TUNER"),
                ],
            )?;

            write_text_element(writer, "alias_list_name", "Agencies")?;

            if is_fm_family(freq.mode) {
                write_empty(
                    writer,
                    "decode_configuration",
                    &[
                        ("type", "decodeConfigNBFM"),
                        ("audioFilter", "true"),
                        ("bandwidth", "BW_12_5"),
                        ("squelch", "-78"),
                        ("autoTrack", "true"),
                        ("talkgroup", &talkgroup),
                    ],
                )?;
            } else {
                write_empty(
                    writer,
                    "decode_configuration",
                    &[
                        ("type", "decodeConfigAM"),
                        ("bandwidth", "BW_15_0"),
                        ("squelch", "-78"),
                        ("autoTrack", "true"),
                        ("talkgroup", &talkgroup),
                    ],
                )?;
            }

            writer.write_event(Event::End(BytesEnd::new("channel")))?;
            counter += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{Tag, Tone};
    use crate::model::{Agency, AgencyFreq, Site, Talkgroup};

    fn p25_site(control: Vec<f64>) -> Site {
        Site {
            name: "North Tower".to_string(),
            site_id: 1,
            control,
            channels: vec![852.3375],
            lat: 35.05,
            long: -78.71,
            range: 25.0,
        }
    }

    fn fire_freq() -> AgencyFreq {
        AgencyFreq {
            name: "Fire Dispatch".to_string(),
            tone: Tone { tone_type: ToneType::Ctcss, tone_value: 151.4 },
            freq: 154.265,
            tag: Tag::Fire,
            mode: Mode::Fm,
        }
    }

    /// One P25 Phase 1 system with a two-control-frequency site and one
    /// county agency with a single FM frequency.
    fn reference_database() -> Database {
        Database {
            systems: vec![System {
                name: "Statewide P25".to_string(),
                system_id: 5,
                modulation: Modulation::P25Phase1,
                talkgroups: vec![Talkgroup {
                    tg_id: 100,
                    tg_name: "County Dispatch".to_string(),
                    tg_tag: Tag::Dispatch,
                }],
                sites: vec![p25_site(vec![851.0125, 851.5125])],
            }],
            agencies: vec![Agency {
                agency_id: 9,
                county_name: "County A".to_string(),
                agency_name: "County A Fire".to_string(),
                freqs: vec![fire_freq()],
            }],
        }
    }

    fn render(db: &Database) -> String {
        String::from_utf8(render_playlist(db).unwrap()).unwrap()
    }

    #[test]
    fn test_reference_document() {
        let xml = render(&reference_database());

        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<playlist version=\"4\">"));

        // Talkgroup alias grouped under the system name.
        assert!(xml.contains(
            "<alias color=\"0\" group=\"Dispatch\" list=\"Statewide P25\" name=\"County Dispatch\">"
        ));
        assert!(xml.contains(
            "<id type=\"talkgroup\" protocol=\"APCO25\" value=\"100\"/>"
        ));

        // Multi-frequency control channel with both frequencies in Hz.
        assert!(xml.contains("name=\"Control Channels\""));
        assert!(xml.contains("type=\"sourceConfigTunerMultipleFrequency\""));
        assert!(xml.contains("frequency_rotation_delay=\"400\""));
        assert!(xml.contains("<frequency>851012500</frequency>"));
        assert!(xml.contains("<frequency>851512500</frequency>"));
        assert!(xml.contains("type=\"decodeConfigP25Phase1\" modulation=\"C4FM\""));
        assert!(xml.contains("<alias_list_name>Statewide P25</alias_list_name>"));

        // Agency alias: NBFM protocol, sequential id 1, no DCS sub-id for
        // a CTCSS tone.
        assert!(xml.contains(
            "<id type=\"talkgroup\" value=\"1\" protocol=\"NBFM\"/>"
        ));
        assert!(!xml.contains("type=\"dcs\""));

        // Agency channel: NBFM decoder, same id, frequency in Hz.
        assert!(xml.contains("frequency=\"154265000\""));
        assert!(xml.contains("type=\"decodeConfigNBFM\""));
        assert!(xml.contains("talkgroup=\"1\""));
        assert!(xml.contains(
            "<channel system=\"County A\" site=\"County A Fire\" name=\"Fire Dispatch\""
        ));

        // Pretty-printed for human diffing.
        assert!(xml.contains("\n    <"));
    }

    #[test]
    fn test_single_control_frequency_uses_plain_tuner_source() {
        let mut db = reference_database();
        db.systems[0].sites = vec![p25_site(vec![851.0125])];
        let xml = render(&db);

        assert!(xml.contains(
            "type=\"sourceConfigTuner\" frequency=\"851012500\" source_type=\"TUNER\""
        ));
        assert!(!xml.contains("sourceConfigTunerMultipleFrequency"));
    }

    #[test]
    fn test_phase2_decoder_autodetects_scramble_parameters() {
        let mut db = reference_database();
        db.systems[0].modulation = Modulation::P25Phase2;
        let xml = render(&db);

        assert!(xml.contains("type=\"decodeConfigP25Phase2\""));
        assert!(xml.contains("auto_detect_scramble_parameters=\"true\""));
    }

    #[test]
    fn test_non_p25_system_emits_no_control_channels() {
        let mut db = reference_database();
        db.systems[0].modulation = Modulation::Fm;
        let xml = render(&db);

        // The aliases are still there, the channels are not.
        assert!(xml.contains("value=\"100\""));
        assert!(!xml.contains("Control Channels"));
    }

    #[test]
    fn test_digital_agency_frequency_emits_nothing() {
        let mut db = reference_database();
        db.agencies[0].freqs[0].mode = Mode::Dmr;
        let xml = render(&db);

        assert!(!xml.contains("list=\"Agencies\""));
        assert!(!xml.contains("decodeConfigNBFM"));
    }

    #[test]
    fn test_dcs_tone_adds_sub_id_and_aux_decoder() {
        let mut db = reference_database();
        db.agencies[0].freqs[0].tone = Tone { tone_type: ToneType::Dcs, tone_value: 23.0 };
        let xml = render(&db);

        assert!(xml.contains("<id type=\"dcs\" code=\"N023\"/>"));
        assert!(xml.contains("<aux_decoder>DCS</aux_decoder>"));
    }

    #[test]
    fn test_am_frequency_uses_am_protocol_and_decoder() {
        let mut db = reference_database();
        db.agencies[0].freqs.push(AgencyFreq {
            name: "Tower".to_string(),
            tone: Tone::none(),
            freq: 118.9,
            tag: Tag::Aircraft,
            mode: Mode::Am,
        });
        let xml = render(&db);

        // The counter keeps increasing across frequencies, and alias and
        // channel identifiers line up pass to pass.
        assert!(xml.contains("<id type=\"talkgroup\" value=\"1\" protocol=\"NBFM\"/>"));
        assert!(xml.contains("<id type=\"talkgroup\" value=\"2\" protocol=\"AM\"/>"));
        assert!(xml.contains("type=\"decodeConfigNBFM\""));
        assert!(xml.contains("talkgroup=\"1\""));
        assert!(xml.contains("type=\"decodeConfigAM\" bandwidth=\"BW_15_0\""));
        assert!(xml.contains("talkgroup=\"2\""));
        assert!(xml.contains("frequency=\"118900000\""));
    }

    #[test]
    fn test_export_is_deterministic() {
        let db = reference_database();
        assert_eq!(render_playlist(&db).unwrap(), render_playlist(&db).unwrap());
    }

    #[tokio::test]
    async fn test_export_writes_file_atomically() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("playlist.xml");

        export_playlist(&reference_database(), &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml"));
        let names: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("playlist.xml")]);
    }
}
