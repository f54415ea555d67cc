//! Acquisition pipeline: walks the directory hierarchy and assembles the
//! normalized [`Database`].
//!
//! The walk is state → county → system/agency → site/subcategory →
//! frequency. Systems and subcategories are reachable through multiple
//! counties (and again at state level); their ids are checked against a
//! set *before* the detail fetch, so every distinct entity is fetched and
//! materialized exactly once. Output order is discovery order, which makes
//! repeated runs over unchanged data deterministic.
//!
//! All remote calls are sequential awaits. Any remote or shape error is
//! fatal to the run and propagates with the operation name and entity id;
//! unrecognized classification codes are not errors (see [`crate::codes`]).

use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::api::{Directory, Subcategory};
use crate::cache;
use crate::codes::{Mode, Modulation, Tag, Tone};
use crate::error::Result;
use crate::model::{Agency, AgencyFreq, Database, Site, System, Talkgroup};

/// Observer for acquisition progress.
///
/// Purely observational: increments are coarse per entity and fractional
/// per frequency within a subcategory, and `completed` never decreases
/// within a phase. Implementations drive progress bars or logs.
pub trait Progress {
    fn on_progress(&mut self, completed: f64, total: f64);
}

/// Discards all progress signals.
pub struct NullProgress;

impl Progress for NullProgress {
    fn on_progress(&mut self, _completed: f64, _total: f64) {}
}

/// One acquisition run over a [`Directory`] implementation.
pub struct Acquirer<'a, D: Directory, P: Progress = NullProgress> {
    directory: &'a D,
    progress: P,
}

impl<'a, D: Directory> Acquirer<'a, D, NullProgress> {
    pub fn new(directory: &'a D) -> Self {
        Acquirer { directory, progress: NullProgress }
    }
}

impl<'a, D: Directory, P: Progress> Acquirer<'a, D, P> {
    /// Attach a progress observer, replacing the current one.
    pub fn with_progress<Q: Progress>(self, progress: Q) -> Acquirer<'a, D, Q> {
        Acquirer { directory: self.directory, progress }
    }

    /// Produce a complete database for one state: systems, then agencies.
    pub async fn acquire(&mut self, stid: i64) -> Result<Database> {
        let systems = self.acquire_systems(stid).await?;
        let agencies = self.acquire_agencies(stid).await?;
        Ok(Database { systems, agencies })
    }

    /// Return the persisted snapshot at `path` if one exists, otherwise
    /// acquire from the service and save the result there.
    pub async fn load_or_acquire(&mut self, stid: i64, path: &Path) -> Result<Database> {
        if let Some(db) = cache::load_cached(path).await? {
            info!(path = %path.display(), "using cached database, skipping acquisition");
            return Ok(db);
        }
        let db = self.acquire(stid).await?;
        cache::save(&db, path).await?;
        Ok(db)
    }

    /// Walk every county's system list, then the state-level list, fetching
    /// each distinct system exactly once.
    pub async fn acquire_systems(&mut self, stid: i64) -> Result<Vec<System>> {
        let state = self.directory.get_state_info(stid).await?;
        info!(
            state = %state.state_name,
            counties = state.county_list.len(),
            "walking trunked systems"
        );

        // Prefetch county info so the total amount of work is known before
        // the per-system phase starts.
        let prefetch_total = state.county_list.len() as f64;
        let mut county_infos = Vec::with_capacity(state.county_list.len());
        for (i, county) in state.county_list.iter().enumerate() {
            county_infos.push(self.directory.get_county_info(county.ctid).await?);
            self.progress.on_progress((i + 1) as f64, prefetch_total);
        }

        let total = (county_infos.iter().map(|c| c.trs_list.len() + 1).sum::<usize>()
            + state.trs_list.len()) as f64;
        let mut done = 0.0;
        let mut seen: HashSet<i64> = HashSet::new();
        let mut systems = Vec::new();

        for county_info in &county_infos {
            for trs in &county_info.trs_list {
                if seen.insert(trs.sid) {
                    let system = self.fetch_system(trs.sid).await?;
                    systems.push(system);
                }
                done += 1.0;
                self.progress.on_progress(done, total);
            }
            done += 1.0;
            self.progress.on_progress(done, total);
        }

        for trs in &state.trs_list {
            if seen.insert(trs.sid) {
                let system = self.fetch_system(trs.sid).await?;
                systems.push(system);
            }
            done += 1.0;
            self.progress.on_progress(done, total);
        }

        info!(count = systems.len(), "assembled trunked systems");
        Ok(systems)
    }

    /// Walk county-level and state-level agencies, collect their distinct
    /// subcategories, then fetch each subcategory's frequency list.
    pub async fn acquire_agencies(&mut self, stid: i64) -> Result<Vec<Agency>> {
        let state = self.directory.get_state_info(stid).await?;
        info!(
            state = %state.state_name,
            counties = state.county_list.len(),
            "walking agencies"
        );

        // County id 0 stands for the state itself, so state-level agencies
        // carry the state name instead of a county name.
        let mut counties: HashMap<i64, String> = HashMap::new();
        counties.insert(0, state.state_name.clone());
        for county in &state.county_list {
            counties.insert(county.ctid, county.county_name.clone());
        }

        let walk_total = (state.county_list.len() + state.agency_list.len()) as f64;
        let mut done = 0.0;
        let mut seen: HashSet<i64> = HashSet::new();
        let mut subcats: Vec<(Subcategory, String)> = Vec::new();

        for county in &state.county_list {
            let county_info = self.directory.get_county_info(county.ctid).await?;
            if county_info.agency_list.is_empty() {
                done += 1.0;
                self.progress.on_progress(done, walk_total);
                continue;
            }
            let interval = 1.0 / county_info.agency_list.len() as f64;
            for agency in &county_info.agency_list {
                self.collect_subcats(agency.aid, &counties, &state.state_name, &mut seen, &mut subcats)
                    .await?;
                done += interval;
                self.progress.on_progress(done, walk_total);
            }
        }

        for agency in &state.agency_list {
            self.collect_subcats(agency.aid, &counties, &state.state_name, &mut seen, &mut subcats)
                .await?;
            done += 1.0;
            self.progress.on_progress(done, walk_total);
        }

        debug!(count = subcats.len(), "collected distinct subcategories");

        let total = subcats.len() as f64;
        let mut done = 0.0;
        let mut agencies = Vec::with_capacity(subcats.len());

        for (subcat, county_name) in subcats {
            let records = self.directory.get_subcat_freqs(subcat.scid).await?;
            let interval = if records.is_empty() {
                done += 1.0;
                self.progress.on_progress(done, total);
                0.0
            } else {
                1.0 / records.len() as f64
            };

            let mut freqs = Vec::new();
            for record in &records {
                // Input-only records have no output frequency and are not
                // materialized. Digital trunked modes belong to the
                // System/Talkgroup model, not here.
                if let Some(out) = record.out {
                    let mode = Mode::from_code(record.mode);
                    if !mode.is_digital_trunked() {
                        let tag = record
                            .tags
                            .first()
                            .map(|t| Tag::from_code(t.tag_id))
                            .unwrap_or(Tag::Unknown);
                        freqs.push(AgencyFreq {
                            name: record.descr.clone(),
                            tone: Tone::parse(record.tone.as_deref()),
                            freq: out,
                            tag,
                            mode,
                        });
                    }
                }
                done += interval;
                self.progress.on_progress(done, total);
            }

            agencies.push(Agency {
                agency_id: subcat.scid,
                county_name,
                agency_name: subcat.sc_name,
                freqs,
            });
        }

        info!(count = agencies.len(), "assembled agencies");
        Ok(agencies)
    }

    async fn collect_subcats(
        &self,
        aid: i64,
        counties: &HashMap<i64, String>,
        state_name: &str,
        seen: &mut HashSet<i64>,
        out: &mut Vec<(Subcategory, String)>,
    ) -> Result<()> {
        let info = self.directory.get_agency_info(aid).await?;
        let county_name = counties
            .get(&info.ctid)
            .cloned()
            .unwrap_or_else(|| state_name.to_string());
        for cat in info.cats {
            for subcat in cat.subcats {
                if seen.insert(subcat.scid) {
                    out.push((subcat, county_name.clone()));
                }
            }
        }
        Ok(())
    }

    async fn fetch_system(&self, sid: i64) -> Result<System> {
        let details = self.directory.get_trs_details(sid).await?;
        let modulation = Modulation::from_system_type(details.s_type, details.s_flavor);
        let sites = self.fetch_sites(sid).await?;
        let talkgroups = self.fetch_talkgroups(sid).await?;
        debug!(
            sid,
            name = %details.s_name,
            sites = sites.len(),
            talkgroups = talkgroups.len(),
            "fetched system"
        );
        Ok(System {
            name: details.s_name,
            system_id: sid,
            modulation,
            talkgroups,
            sites,
        })
    }

    async fn fetch_sites(&self, sid: i64) -> Result<Vec<Site>> {
        let records = self.directory.get_trs_sites(sid).await?;
        let sites = records
            .into_iter()
            .map(|record| {
                let mut control = Vec::new();
                let mut channels = Vec::new();
                // A present textual use marker means a control frequency.
                for freq in &record.site_freqs {
                    if freq.use_field.is_some() {
                        control.push(freq.freq);
                    } else {
                        channels.push(freq.freq);
                    }
                }
                Site {
                    name: record.site_descr,
                    site_id: record.sid,
                    control,
                    channels,
                    lat: record.lat,
                    long: record.lon,
                    range: record.range,
                }
            })
            .collect();
        Ok(sites)
    }

    async fn fetch_talkgroups(&self, sid: i64) -> Result<Vec<Talkgroup>> {
        let records = self.directory.get_trs_talkgroups(sid).await?;
        let talkgroups = records
            .into_iter()
            .map(|record| Talkgroup {
                tg_id: record.tg_dec,
                tg_name: record.tg_descr,
                tg_tag: record
                    .tags
                    .first()
                    .map(|t| Tag::from_code(t.tag_id))
                    .unwrap_or(Tag::Unknown),
            })
            .collect();
        Ok(talkgroups)
    }
}
