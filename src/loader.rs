use crate::assignment::RunResult;
use crate::character::Character;
use crate::error::{MfResult, ModForgeError};
use crate::mods::{Mod, ModStat, SecondaryStat, SetKind, Slot};
use crate::stats::{Fixed, ModStatKind};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// A roster plus the mod pool, as exported by the collection tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub characters: Vec<Character>,
    #[serde(default)]
    pub mods: Vec<Mod>,
}

impl Profile {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MfResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let profile: Profile = serde_json::from_str(&content)?;
        info!(
            "Loaded profile {:?}: {} characters, {} mods",
            path.as_ref(),
            profile.characters.len(),
            profile.mods.len()
        );
        Ok(profile)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> MfResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }
}

/// One CSV row. Secondaries are `kind:value` or `kind:value:rolls`.
#[derive(Debug, Deserialize)]
struct ModRow {
    id: String,
    slot: String,
    set: String,
    pips: u8,
    level: u8,
    tier: Option<u8>,
    primary: String,
    primary_value: f64,
    sec1: Option<String>,
    sec2: Option<String>,
    sec3: Option<String>,
    sec4: Option<String>,
    locked: Option<bool>,
    assigned_to: Option<String>,
}

fn parse_enum<T: FromStr>(row: usize, what: &str, s: &str) -> MfResult<T> {
    T::from_str(s.trim()).map_err(|_| {
        ModForgeError::Validation(format!("row {}: unknown {} '{}'", row, what, s))
    })
}

fn parse_secondary(row: usize, s: &str) -> MfResult<SecondaryStat> {
    let mut parts = s.split(':');
    let kind: ModStatKind = parse_enum(row, "secondary", parts.next().unwrap_or(""))?;
    let value: f64 = parts
        .next()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| {
            ModForgeError::Validation(format!("row {}: secondary '{}' has no value", row, s))
        })?;
    let rolls = match parts.next() {
        Some(r) => r.trim().parse().map_err(|_| {
            ModForgeError::Validation(format!("row {}: bad roll count in '{}'", row, s))
        })?,
        None => 1,
    };
    Ok(SecondaryStat {
        kind,
        value: Fixed::from_f64(value),
        rolls,
    })
}

impl ModRow {
    fn into_mod(self, row: usize) -> MfResult<Mod> {
        let slot: Slot = parse_enum(row, "slot", &self.slot)?;
        let set: SetKind = parse_enum(row, "set", &self.set)?;
        let primary: ModStatKind = parse_enum(row, "primary", &self.primary)?;

        let secondaries = [self.sec1, self.sec2, self.sec3, self.sec4]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_secondary(row, &s))
            .collect::<MfResult<Vec<_>>>()?;

        let m = Mod {
            id: self.id,
            slot,
            set,
            pips: self.pips,
            level: self.level,
            tier: self.tier.unwrap_or(1),
            primary: ModStat {
                kind: primary,
                value: Fixed::from_f64(self.primary_value),
            },
            secondaries,
            locked: self.locked.unwrap_or(false),
            assigned_to: self.assigned_to.filter(|s| !s.is_empty()),
        };
        m.validate().map_err(ModForgeError::Validation)?;
        Ok(m)
    }
}

/// Reads a mod pool from CSV (header row required).
pub fn load_mods_csv<P: AsRef<Path>>(path: P) -> MfResult<Vec<Mod>> {
    let file = File::open(path.as_ref())?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut mods = Vec::new();
    for (i, record) in rdr.deserialize::<ModRow>().enumerate() {
        // Row numbers count the header as row 1.
        mods.push(record?.into_mod(i + 2)?);
    }
    debug!("Parsed {} mods from {:?}", mods.len(), path.as_ref());
    Ok(mods)
}

pub fn load_results<P: AsRef<Path>>(path: P) -> MfResult<RunResult> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_results<P: AsRef<Path>>(path: P, result: &RunResult) -> MfResult<()> {
    let json = serde_json::to_string_pretty(result)?;
    fs::write(path, json)?;
    Ok(())
}
